//! # ulca-pipeline
//!
//! 面向 ULCA 多语言管道 API 的类型化客户端（翻译、语音识别、语音合成）。
//!
//! Typed client for the ULCA multilingual pipeline API: machine translation,
//! speech-to-text and text-to-speech for 23 languages.
//!
//! ## Overview
//!
//! Every task runs the same two-phase protocol:
//!
//! 1. **Discovery**: POST the task list and language configuration to the
//!    pipeline-discovery endpoint with the account credentials; receive a
//!    service id per task, a callback URL and an inference auth header.
//! 2. **Invocation**: POST the compute payload to the callback URL with that
//!    auth header and extract the task's output field.
//!
//! [`PipelineClient`] implements both phases once, for all task types, and for
//! the chained asr → translation → tts pipeline which resolves all three tasks
//! in a single discovery round trip.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ulca_pipeline::PipelineClient;
//!
//! #[tokio::main]
//! async fn main() -> ulca_pipeline::Result<()> {
//!     // ULCA_USER_ID, ULCA_API_KEY and ULCA_PIPELINE_ID must be set.
//!     let client = PipelineClient::from_env()?;
//!     let hindi = client.translate_text("hello", "en", "hi").await?;
//!     println!("{hindi}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`language`] | Closed language table and lookups |
//! | [`client`] | Two-phase client, builder and retry policy |
//! | [`types`] | Task descriptors, outputs, bindings and wire schemas |
//! | [`backend`] | `TaskDescriptor → TaskOutput` trait shared by all backends |
//! | [`service`] | Framework-agnostic request/response boundary |
//! | [`config`] | Credentials and client settings |
//! | [`error_code`] | Stable error codes and HTTP status mapping |

pub mod backend;
pub mod client;
pub mod config;
pub mod error_code;
pub mod language;
pub mod service;
pub mod transport;
pub mod types;

pub use backend::{RetryingBackend, TaskBackend};
pub use client::{CallStats, PipelineClient, PipelineClientBuilder, RequestPhase, RetryPolicy};
pub use config::{CredentialContext, PipelineConfig};
pub use language::{is_valid_language, IntoLanguage, Language};
pub use types::{
    AudioInput, ChainOutput, LanguagePair, ServiceBinding, SpeechAudio, TaskDescriptor,
    TaskOutput, TaskType,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, Stage};
