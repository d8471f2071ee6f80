use crate::config::CredentialContext;
use crate::error::Stage;
use crate::language::IntoLanguage;
use crate::transport::{HttpReply, HttpTransport};
use crate::types::wire::{DiscoveryResponse, InvocationResponse};
use crate::types::{
    AsrSettings, AudioInput, ChainOutput, LanguagePair, PipelineTask, ServiceBinding,
    SpeechAudio, TaskDescriptor, TaskOutput, TaskType, TtsSettings,
};
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::builder::PipelineClientBuilder;
use super::{discovery, invocation};

/// Client for the two-phase pipeline protocol.
///
/// Cheap to clone; clones share the connection pool and the read-only
/// credentials. Nothing else is shared between calls: every request resolves
/// its own [`ServiceBinding`] and drops it when done.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    pub(crate) transport: HttpTransport,
    pub(crate) credentials: Arc<CredentialContext>,
    pub(crate) discovery_url: String,
    pub(crate) asr: AsrSettings,
    pub(crate) tts: TtsSettings,
}

/// Per-request progress: `Idle → Resolving → Resolved → Invoking → {Succeeded | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    Resolving,
    Resolved,
    Invoking,
    Succeeded,
    Failed,
}

/// Facts about one executed request.
#[derive(Debug, Clone)]
pub struct CallStats {
    pub request_id: String,
    pub task: &'static str,
    /// Last phase reached; `Failed` carries no information on where, use
    /// `failed_in` for that.
    pub phase: RequestPhase,
    pub failed_in: Option<RequestPhase>,
    pub discovery_ms: Option<u128>,
    pub invocation_ms: Option<u128>,
}

impl CallStats {
    fn new(task: &'static str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            task,
            phase: RequestPhase::Idle,
            failed_in: None,
            discovery_ms: None,
            invocation_ms: None,
        }
    }

    fn advance(&mut self, phase: RequestPhase) {
        debug!(request_id = %self.request_id, task = self.task, from = ?self.phase, to = ?phase, "request phase");
        self.phase = phase;
    }

    fn fail(&mut self) {
        self.failed_in = Some(self.phase);
        self.advance(RequestPhase::Failed);
    }
}

impl PipelineClient {
    pub fn builder() -> PipelineClientBuilder {
        PipelineClientBuilder::new()
    }

    /// Client configured entirely from `ULCA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        PipelineClientBuilder::new().from_env()?.build()
    }

    pub fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }

    pub fn discovery_url(&self) -> &str {
        &self.discovery_url
    }

    /// Resolve a single task type for the given language(s).
    pub async fn resolve_service(
        &self,
        task_type: TaskType,
        languages: LanguagePair,
    ) -> Result<ServiceBinding> {
        if task_type == TaskType::Translation && languages.target.is_none() {
            return Err(Error::invalid_input("translation requires a target language"));
        }
        let request_id = Uuid::new_v4().to_string();
        self.discover(&[PipelineTask { task_type, languages }], &request_id)
            .await
    }

    /// Resolve every task of a descriptor in one discovery call.
    pub async fn resolve(&self, task: &TaskDescriptor) -> Result<ServiceBinding> {
        let request_id = Uuid::new_v4().to_string();
        self.discover(&task.pipeline_tasks(), &request_id).await
    }

    /// Run a descriptor against an already resolved binding.
    pub async fn invoke(&self, binding: &ServiceBinding, task: &TaskDescriptor) -> Result<TaskOutput> {
        let request_id = Uuid::new_v4().to_string();
        self.call(binding, task, &request_id).await
    }

    /// Validate, resolve and invoke.
    pub async fn execute(&self, task: &TaskDescriptor) -> Result<TaskOutput> {
        self.execute_with_stats(task).await.0
    }

    pub async fn execute_with_stats(&self, task: &TaskDescriptor) -> (Result<TaskOutput>, CallStats) {
        let mut stats = CallStats::new(task.label());
        let result = self.run(task, &mut stats).await;
        match &result {
            Ok(_) => {
                stats.advance(RequestPhase::Succeeded);
                info!(
                    request_id = %stats.request_id,
                    task = stats.task,
                    discovery_ms = stats.discovery_ms.unwrap_or_default() as u64,
                    invocation_ms = stats.invocation_ms.unwrap_or_default() as u64,
                    "pipeline request succeeded"
                );
            }
            Err(err) => {
                stats.fail();
                warn!(
                    request_id = %stats.request_id,
                    task = stats.task,
                    failed_in = ?stats.failed_in,
                    error_code = err.code().code(),
                    error = %err,
                    "pipeline request failed"
                );
            }
        }
        (result, stats)
    }

    async fn run(&self, task: &TaskDescriptor, stats: &mut CallStats) -> Result<TaskOutput> {
        task.validate()
            .map_err(|e| e.with_request_id(&stats.request_id))?;

        stats.advance(RequestPhase::Resolving);
        let started = Instant::now();
        let binding = self.discover(&task.pipeline_tasks(), &stats.request_id).await;
        stats.discovery_ms = Some(started.elapsed().as_millis());
        let binding = binding?;
        stats.advance(RequestPhase::Resolved);

        stats.advance(RequestPhase::Invoking);
        let started = Instant::now();
        let output = self.call(&binding, task, &stats.request_id).await;
        stats.invocation_ms = Some(started.elapsed().as_millis());
        output
    }

    pub async fn translate_text(
        &self,
        text: &str,
        source: impl IntoLanguage,
        target: impl IntoLanguage,
    ) -> Result<String> {
        let task = TaskDescriptor::Translation {
            source: source.into_language()?,
            target: target.into_language()?,
            text: text.to_string(),
        };
        match self.execute(&task).await? {
            TaskOutput::Translation(t) => Ok(t),
            other => Err(unexpected(&task, &other)),
        }
    }

    pub async fn speech_to_text(&self, audio: AudioInput, source: impl IntoLanguage) -> Result<String> {
        let task = TaskDescriptor::SpeechToText {
            source: source.into_language()?,
            audio,
        };
        match self.execute(&task).await? {
            TaskOutput::Transcript(t) => Ok(t),
            other => Err(unexpected(&task, &other)),
        }
    }

    pub async fn text_to_speech(&self, text: &str, language: impl IntoLanguage) -> Result<SpeechAudio> {
        let task = TaskDescriptor::TextToSpeech {
            language: language.into_language()?,
            text: text.to_string(),
        };
        match self.execute(&task).await? {
            TaskOutput::Speech(a) => Ok(a),
            other => Err(unexpected(&task, &other)),
        }
    }

    /// asr → translation → tts with one discovery call and one invocation call.
    pub async fn chained_pipeline(
        &self,
        audio: AudioInput,
        source: impl IntoLanguage,
        target: impl IntoLanguage,
    ) -> Result<ChainOutput> {
        let task = TaskDescriptor::ChainedPipeline {
            source: source.into_language()?,
            target: target.into_language()?,
            audio,
        };
        match self.execute(&task).await? {
            TaskOutput::Chained(c) => Ok(c),
            other => Err(unexpected(&task, &other)),
        }
    }

    async fn discover(&self, tasks: &[PipelineTask], request_id: &str) -> Result<ServiceBinding> {
        // Header names are case-insensitive; the platform documents them as
        // `userID` and `ulcaApiKey`.
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("userid"),
            header_value("userID", &self.credentials.user_id)?,
        );
        headers.insert(
            HeaderName::from_static("ulcaapikey"),
            header_value("ulcaApiKey", self.credentials.api_key())?,
        );

        let body = discovery::build_request(tasks, &self.credentials.pipeline_id);
        debug!(request_id, tasks = tasks.len(), "resolving pipeline services");

        let started = Instant::now();
        let reply = self
            .transport
            .post_json(&self.discovery_url, headers, &body, request_id)
            .await?;
        ensure_ok(&reply, Stage::Discovery, request_id, started)?;

        let response: DiscoveryResponse = reply.json().map_err(|e| {
            debug!(request_id, error = %e, "discovery body is not the expected JSON");
            Error::MalformedResponse {
                stage: Stage::Discovery,
                field: "<body>".to_string(),
                context: ErrorContext::new()
                    .with_request_id(request_id)
                    .with_source("discovery")
                    .with_details(e.to_string()),
            }
        })?;
        let binding = discovery::decode_binding(response, tasks.len(), request_id)?;
        debug!(
            request_id,
            service_ids = ?binding.service_ids,
            callback_host = binding.callback_url.host_str().unwrap_or_default(),
            "resolved pipeline services"
        );
        Ok(binding)
    }

    async fn call(&self, binding: &ServiceBinding, task: &TaskDescriptor, request_id: &str) -> Result<TaskOutput> {
        // Invocation authenticates with the binding's own key, never with the
        // discovery credentials.
        let name = HeaderName::from_bytes(binding.auth_header_name.as_bytes()).map_err(|_| {
            Error::MalformedResponse {
                stage: Stage::Discovery,
                field: discovery::FIELD_AUTH_NAME.to_string(),
                context: ErrorContext::new().with_request_id(request_id),
            }
        })?;
        let value = HeaderValue::from_str(&binding.auth_header_value).map_err(|_| {
            Error::MalformedResponse {
                stage: Stage::Discovery,
                field: discovery::FIELD_AUTH_VALUE.to_string(),
                context: ErrorContext::new().with_request_id(request_id),
            }
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(name, value);

        let tasks = task.pipeline_tasks();
        let body = invocation::build_request(binding, task, &tasks, &self.asr, &self.tts)?;
        debug!(request_id, task = task.label(), "invoking pipeline");

        let started = Instant::now();
        let reply = self
            .transport
            .post_json(binding.callback_url.as_str(), headers, &body, request_id)
            .await?;
        ensure_ok(&reply, Stage::Invocation, request_id, started)?;

        let primary = tasks.last().map(|t| t.task_type).unwrap_or(TaskType::Translation);
        let response: InvocationResponse = reply.json().map_err(|e| {
            debug!(request_id, error = %e, "invocation body is not the expected JSON");
            Error::EmptyOutput {
                task: primary,
                field: primary.output_field().to_string(),
                context: ErrorContext::new()
                    .with_request_id(request_id)
                    .with_source("invocation")
                    .with_details(e.to_string()),
            }
        })?;
        invocation::extract_output(task, &response, request_id)
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| Error::Configuration {
        message: format!("credential for header '{}' contains invalid characters", name),
        context: ErrorContext::new().with_source("credentials"),
    })
}

fn ensure_ok(reply: &HttpReply, stage: Stage, request_id: &str, started: Instant) -> Result<()> {
    let duration_ms = started.elapsed().as_millis() as u64;
    if reply.is_ok() {
        debug!(request_id, stage = stage.as_str(), http_status = reply.status, duration_ms, "upstream call ok");
        return Ok(());
    }
    warn!(
        request_id,
        stage = stage.as_str(),
        http_status = reply.status,
        duration_ms,
        "upstream call failed"
    );
    debug!(request_id, stage = stage.as_str(), body = %reply.body_snippet(), "upstream error body");
    Err(Error::UpstreamUnavailable {
        stage,
        status: reply.status,
        context: ErrorContext::new()
            .with_request_id(request_id)
            .with_source(stage.as_str()),
    })
}

fn unexpected(task: &TaskDescriptor, output: &TaskOutput) -> Error {
    Error::Configuration {
        message: format!("{} backend returned {:?}", task.label(), output),
        context: ErrorContext::new().with_source("pipeline_client"),
    }
}
