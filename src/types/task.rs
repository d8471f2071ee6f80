//! Task descriptors, outputs and the resolved service binding.

use crate::language::Language;
use crate::{Error, Result};
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Task type tag as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Translation,
    Asr,
    Tts,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Translation => "translation",
            TaskType::Asr => "asr",
            TaskType::Tts => "tts",
        }
    }

    /// Output field the invocation response carries for this task.
    pub fn output_field(&self) -> &'static str {
        match self {
            TaskType::Translation => "target",
            TaskType::Asr => "source",
            TaskType::Tts => "audioContent",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source language plus, for translation, the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Option<Language>,
}

impl LanguagePair {
    pub fn single(source: Language) -> Self {
        Self {
            source,
            target: None,
        }
    }

    pub fn translation(source: Language, target: Language) -> Self {
        Self {
            source,
            target: Some(target),
        }
    }
}

/// One entry of a pipeline task list: what to run and in which language(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineTask {
    pub task_type: TaskType,
    pub languages: LanguagePair,
}

/// Audio handed to speech recognition.
#[derive(Clone, PartialEq, Eq)]
pub enum AudioInput {
    /// Raw file bytes; base64-encoded before sending.
    Raw(Bytes),
    /// Already base64-encoded content.
    Base64(String),
    /// Publicly reachable audio the platform fetches itself.
    Uri(String),
}

impl AudioInput {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        AudioInput::Raw(bytes.into())
    }

    pub fn from_base64(encoded: impl Into<String>) -> Self {
        AudioInput::Base64(encoded.into())
    }

    pub fn from_uri(uri: impl Into<String>) -> Self {
        AudioInput::Uri(uri.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AudioInput::Raw(b) => b.is_empty(),
            AudioInput::Base64(s) | AudioInput::Uri(s) => s.trim().is_empty(),
        }
    }

    /// Base64 content for the `audioContent` field, if this is inline audio.
    pub fn encoded_content(&self) -> Option<String> {
        match self {
            AudioInput::Raw(b) => Some(base64::engine::general_purpose::STANDARD.encode(b)),
            AudioInput::Base64(s) => Some(s.clone()),
            AudioInput::Uri(_) => None,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            AudioInput::Uri(u) => Some(u),
            _ => None,
        }
    }
}

impl fmt::Debug for AudioInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioInput::Raw(b) => write!(f, "AudioInput::Raw({} bytes)", b.len()),
            AudioInput::Base64(s) => write!(f, "AudioInput::Base64({} chars)", s.len()),
            AudioInput::Uri(u) => write!(f, "AudioInput::Uri({})", u),
        }
    }
}

/// A unit of work for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDescriptor {
    Translation {
        source: Language,
        target: Language,
        text: String,
    },
    SpeechToText {
        source: Language,
        audio: AudioInput,
    },
    TextToSpeech {
        language: Language,
        text: String,
    },
    /// asr → translation → tts, resolved and invoked as one call each.
    ChainedPipeline {
        source: Language,
        target: Language,
        audio: AudioInput,
    },
}

impl TaskDescriptor {
    /// Task list sent to discovery, in execution order.
    pub fn pipeline_tasks(&self) -> Vec<PipelineTask> {
        match self {
            TaskDescriptor::Translation { source, target, .. } => vec![PipelineTask {
                task_type: TaskType::Translation,
                languages: LanguagePair::translation(*source, *target),
            }],
            TaskDescriptor::SpeechToText { source, .. } => vec![PipelineTask {
                task_type: TaskType::Asr,
                languages: LanguagePair::single(*source),
            }],
            TaskDescriptor::TextToSpeech { language, .. } => vec![PipelineTask {
                task_type: TaskType::Tts,
                languages: LanguagePair::single(*language),
            }],
            TaskDescriptor::ChainedPipeline { source, target, .. } => vec![
                PipelineTask {
                    task_type: TaskType::Asr,
                    languages: LanguagePair::single(*source),
                },
                PipelineTask {
                    task_type: TaskType::Translation,
                    languages: LanguagePair::translation(*source, *target),
                },
                PipelineTask {
                    task_type: TaskType::Tts,
                    languages: LanguagePair::single(*target),
                },
            ],
        }
    }

    /// Reject empty payloads before anything goes on the wire.
    pub fn validate(&self) -> Result<()> {
        match self {
            TaskDescriptor::Translation { text, .. } | TaskDescriptor::TextToSpeech { text, .. } => {
                if text.trim().is_empty() {
                    return Err(Error::invalid_input("text must not be empty"));
                }
            }
            TaskDescriptor::SpeechToText { audio, .. }
            | TaskDescriptor::ChainedPipeline { audio, .. } => {
                if audio.is_empty() {
                    return Err(Error::invalid_input("audio must not be empty"));
                }
            }
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskDescriptor::Translation { .. } => "translation",
            TaskDescriptor::SpeechToText { .. } => "asr",
            TaskDescriptor::TextToSpeech { .. } => "tts",
            TaskDescriptor::ChainedPipeline { .. } => "asr+translation+tts",
        }
    }
}

/// Base64 audio returned by speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechAudio {
    pub audio_content: String,
}

impl SpeechAudio {
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.audio_content.trim())
            .map_err(|e| Error::invalid_input(format!("audio content is not valid base64: {}", e)))
    }
}

/// Result of the chained asr → translation → tts pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOutput {
    pub transcript: Option<String>,
    pub translation: Option<String>,
    pub audio: SpeechAudio,
}

/// Output of a task, matching the descriptor variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
    Translation(String),
    Transcript(String),
    Speech(SpeechAudio),
    Chained(ChainOutput),
}

impl TaskOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TaskOutput::Translation(t) | TaskOutput::Transcript(t) => Some(t),
            _ => None,
        }
    }

    pub fn audio(&self) -> Option<&SpeechAudio> {
        match self {
            TaskOutput::Speech(a) => Some(a),
            TaskOutput::Chained(c) => Some(&c.audio),
            _ => None,
        }
    }
}

/// Where and how to invoke resolved services.
///
/// `service_ids` holds one id per requested task, in task-list order.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceBinding {
    pub service_ids: Vec<String>,
    pub callback_url: Url,
    pub auth_header_name: String,
    pub auth_header_value: String,
}

impl ServiceBinding {
    pub fn new(
        service_id: impl Into<String>,
        callback_url: Url,
        auth_header_name: impl Into<String>,
        auth_header_value: impl Into<String>,
    ) -> Self {
        Self {
            service_ids: vec![service_id.into()],
            callback_url,
            auth_header_name: auth_header_name.into(),
            auth_header_value: auth_header_value.into(),
        }
    }

    /// Service id of the first (or only) task.
    pub fn service_id(&self) -> &str {
        self.service_ids.first().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service_ids", &self.service_ids)
            .field("callback_url", &self.callback_url.as_str())
            .field("auth_header_name", &self.auth_header_name)
            .field("auth_header_value", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

/// Extra asr config sent with every speech-recognition invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsrSettings {
    pub audio_format: String,
    pub sampling_rate: u32,
}

impl Default for AsrSettings {
    fn default() -> Self {
        Self {
            audio_format: "wav".to_string(),
            sampling_rate: 16_000,
        }
    }
}

/// Extra tts config sent with every synthesis invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    pub gender: Gender,
    pub sampling_rate: u32,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            gender: Gender::Female,
            sampling_rate: 8_000,
        }
    }
}
