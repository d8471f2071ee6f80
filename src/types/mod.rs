//! 类型模块：任务描述、任务输出、服务绑定以及线上 JSON 结构。
//!
//! # Types Module
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TaskDescriptor`] | What to run: translation, asr, tts, or the chained pipeline |
//! | [`TaskOutput`] | The extracted result for each descriptor variant |
//! | [`ServiceBinding`] | Resolved service ids, callback URL and inference auth header |
//! | [`wire`] | Request/response schemas of the discovery and invocation endpoints |

pub mod task;
pub mod wire;

pub use task::{
    AsrSettings, AudioInput, ChainOutput, Gender, LanguagePair, PipelineTask, ServiceBinding,
    SpeechAudio, TaskDescriptor, TaskOutput, TaskType, TtsSettings,
};
