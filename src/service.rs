//! 服务边界：与 HTTP 框架无关的请求/响应封装。
//!
//! Consumer-facing boundary, independent of any HTTP framework.
//!
//! A hosting layer deserializes one of the request types, calls the matching
//! [`PipelineService`] method and serializes the returned [`ServiceResponse`]
//! with `status_code` as its HTTP status. Failures never carry upstream bodies:
//! the message comes from [`crate::Error::public_message`].
//!
//! Language fields accept either a table index (`1`) or a code (`"hi"`).

use crate::backend::TaskBackend;
use crate::language::{IntoLanguage, Language, ALL_LANGUAGES};
use crate::types::{AudioInput, TaskDescriptor, TaskOutput};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// A language given as a table index or a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguageSelector {
    Index(i64),
    Code(String),
}

impl IntoLanguage for &LanguageSelector {
    fn into_language(self) -> Result<Language> {
        match self {
            LanguageSelector::Index(i) => (*i).into_language(),
            LanguageSelector::Code(c) => c.as_str().into_language(),
        }
    }
}

impl From<Language> for LanguageSelector {
    fn from(lang: Language) -> Self {
        LanguageSelector::Code(lang.code().to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationRequest {
    pub source_language: LanguageSelector,
    pub target_language: LanguageSelector,
    pub content: String,
}

/// Audio is sent base64-encoded (`audio_content`) or by reference (`audio_uri`).
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechToTextRequest {
    pub language: LanguageSelector,
    #[serde(default)]
    pub audio_content: Option<String>,
    #[serde(default)]
    pub audio_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextToSpeechRequest {
    pub language: LanguageSelector,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechTranslationRequest {
    pub source_language: LanguageSelector,
    pub target_language: LanguageSelector,
    #[serde(default)]
    pub audio_content: Option<String>,
    #[serde(default)]
    pub audio_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranslationPayload {
    pub translated_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptionPayload {
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeechPayload {
    pub audio_content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpeechTranslationPayload {
    pub transcript: Option<String>,
    pub translated_content: Option<String>,
    pub audio_content: Option<String>,
}

/// `{status_code, message, ...payload}`; payload fields are `null` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceResponse<T> {
    pub status_code: u16,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Default> ServiceResponse<T> {
    fn ok(message: &str, payload: T) -> Self {
        Self {
            status_code: 200,
            message: message.to_string(),
            payload,
        }
    }

    fn from_error(err: &Error) -> Self {
        Self {
            status_code: err.http_status(),
            message: err.public_message(),
            payload: T::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

fn audio_from(content: Option<String>, uri: Option<String>) -> Result<AudioInput> {
    match (content, uri) {
        (Some(c), _) if !c.trim().is_empty() => Ok(AudioInput::from_base64(c)),
        (_, Some(u)) if !u.trim().is_empty() => Ok(AudioInput::from_uri(u)),
        _ => Err(Error::invalid_input("either audio_content or audio_uri is required")),
    }
}

impl TranslationRequest {
    /// Languages are checked here, before anything reaches a backend.
    pub fn to_task(&self) -> Result<TaskDescriptor> {
        Ok(TaskDescriptor::Translation {
            source: (&self.source_language).into_language()?,
            target: (&self.target_language).into_language()?,
            text: self.content.clone(),
        })
    }
}

impl SpeechToTextRequest {
    pub fn to_task(&self) -> Result<TaskDescriptor> {
        Ok(TaskDescriptor::SpeechToText {
            source: (&self.language).into_language()?,
            audio: audio_from(self.audio_content.clone(), self.audio_uri.clone())?,
        })
    }
}

impl TextToSpeechRequest {
    pub fn to_task(&self) -> Result<TaskDescriptor> {
        Ok(TaskDescriptor::TextToSpeech {
            language: (&self.language).into_language()?,
            text: self.content.clone(),
        })
    }
}

impl SpeechTranslationRequest {
    pub fn to_task(&self) -> Result<TaskDescriptor> {
        Ok(TaskDescriptor::ChainedPipeline {
            source: (&self.source_language).into_language()?,
            target: (&self.target_language).into_language()?,
            audio: audio_from(self.audio_content.clone(), self.audio_uri.clone())?,
        })
    }
}

/// Request handlers shared by every hosting layer.
#[derive(Clone)]
pub struct PipelineService {
    backend: Arc<dyn TaskBackend>,
}

impl PipelineService {
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        Self { backend }
    }

    /// Index → capitalised code (`"Hi"`, `"Gom"`), for the language listing
    /// endpoint. Full names are available from [`crate::language::languages`].
    pub fn languages(&self) -> BTreeMap<usize, String> {
        ALL_LANGUAGES
            .iter()
            .map(|l| (l.index(), capitalize(l.code())))
            .collect()
    }

    async fn run(&self, task: Result<TaskDescriptor>) -> Result<TaskOutput> {
        let task = task?;
        self.backend.execute(&task).await.map_err(|err| {
            warn!(
                backend = self.backend.name(),
                task = task.label(),
                error_code = err.code().code(),
                http_status = err.http_status(),
                error = %err,
                "service request failed"
            );
            err
        })
    }

    pub async fn translate(&self, req: &TranslationRequest) -> ServiceResponse<TranslationPayload> {
        match self.run(req.to_task()).await {
            Ok(TaskOutput::Translation(t)) => ServiceResponse::ok(
                "Translation successful",
                TranslationPayload {
                    translated_content: Some(t),
                },
            ),
            Ok(_) => ServiceResponse::from_error(&mismatch()),
            Err(e) => ServiceResponse::from_error(&e),
        }
    }

    pub async fn speech_to_text(&self, req: &SpeechToTextRequest) -> ServiceResponse<TranscriptionPayload> {
        match self.run(req.to_task()).await {
            Ok(TaskOutput::Transcript(t)) => ServiceResponse::ok(
                "Transcription successful",
                TranscriptionPayload {
                    transcript: Some(t),
                },
            ),
            Ok(_) => ServiceResponse::from_error(&mismatch()),
            Err(e) => ServiceResponse::from_error(&e),
        }
    }

    pub async fn text_to_speech(&self, req: &TextToSpeechRequest) -> ServiceResponse<SpeechPayload> {
        match self.run(req.to_task()).await {
            Ok(TaskOutput::Speech(a)) => ServiceResponse::ok(
                "Speech synthesis successful",
                SpeechPayload {
                    audio_content: Some(a.audio_content),
                },
            ),
            Ok(_) => ServiceResponse::from_error(&mismatch()),
            Err(e) => ServiceResponse::from_error(&e),
        }
    }

    pub async fn speech_translate(
        &self,
        req: &SpeechTranslationRequest,
    ) -> ServiceResponse<SpeechTranslationPayload> {
        match self.run(req.to_task()).await {
            Ok(TaskOutput::Chained(c)) => ServiceResponse::ok(
                "Speech translation successful",
                SpeechTranslationPayload {
                    transcript: c.transcript,
                    translated_content: c.translation,
                    audio_content: Some(c.audio.audio_content),
                },
            ),
            Ok(_) => ServiceResponse::from_error(&mismatch()),
            Err(e) => ServiceResponse::from_error(&e),
        }
    }
}

fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn mismatch() -> Error {
    Error::configuration("backend returned an output that does not match the task")
}
