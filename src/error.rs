use crate::error_code::PipelineErrorCode;
use crate::types::TaskType;
use std::fmt;
use thiserror::Error;

/// Which phase of the two-call protocol produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Discovery,
    Invocation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Discovery => "discovery",
            Stage::Invocation => "invocation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error context for logging and debugging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Correlation id sent upstream as `x-request-id`
    pub request_id: Option<String>,
    /// Additional context such as a decode error; never upstream body text
    pub details: Option<String>,
    /// Component that raised the error (e.g. "discovery", "language_table")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the pipeline client.
///
/// Upstream failures keep their cause apart (`UpstreamUnavailable`,
/// `MalformedResponse`, `EmptyOutput`) so logs can tell them apart, while
/// [`Error::http_status`] and [`Error::public_message`] give a consumer-facing
/// layer a generic answer that leaks nothing from upstream.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid language: '{selector}' is not a supported language{}", format_context(.context))]
    InvalidLanguage {
        selector: String,
        context: ErrorContext,
    },

    #[error("Invalid input: {message}{}", format_context(.context))]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    #[error("Missing credentials: {variable} is not set")]
    MissingCredentials { variable: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Upstream unavailable: {stage} returned HTTP {status}{}", format_context(.context))]
    UpstreamUnavailable {
        stage: Stage,
        status: u16,
        context: ErrorContext,
    },

    #[error("Malformed response: {stage} response is missing '{field}'{}", format_context(.context))]
    MalformedResponse {
        stage: Stage,
        field: String,
        context: ErrorContext,
    },

    #[error("Empty output: {task} response has no '{field}'{}", format_context(.context))]
    EmptyOutput {
        task: TaskType,
        field: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref id) = ctx.request_id {
        parts.push(format!("request_id: {}", id));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn missing_credentials(variable: impl Into<String>) -> Self {
        Error::MissingCredentials {
            variable: variable.into(),
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> PipelineErrorCode {
        match self {
            Error::InvalidLanguage { .. } => PipelineErrorCode::InvalidLanguage,
            Error::InvalidInput { .. } => PipelineErrorCode::InvalidInput,
            Error::MissingCredentials { .. } => PipelineErrorCode::MissingCredentials,
            Error::Configuration { .. } => PipelineErrorCode::Configuration,
            Error::UpstreamUnavailable { .. } => PipelineErrorCode::UpstreamUnavailable,
            Error::MalformedResponse { .. } => PipelineErrorCode::MalformedResponse,
            Error::EmptyOutput { .. } => PipelineErrorCode::EmptyOutput,
            Error::Transport(_) => PipelineErrorCode::Transport,
            Error::Serialization(_) | Error::Io(_) => PipelineErrorCode::Internal,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }

    /// Message safe to hand to an end user. Upstream bodies, URLs and header
    /// values never appear here.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidLanguage { selector, .. } => {
                format!("Invalid language code '{}' provided", selector)
            }
            Error::InvalidInput { message, .. } => format!("Invalid request input: {}", message),
            Error::MissingCredentials { variable } => {
                format!("Pipeline credentials are not configured ({} is missing)", variable)
            }
            other => other.code().public_message().to_string(),
        }
    }

    /// Upstream HTTP status, when upstream answered at all.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Error::UpstreamUnavailable { status, .. } => Some(*status),
            Error::Transport(t) => t.status(),
            _ => None,
        }
    }

    /// Whether a caller-configured retry policy may attempt the call again.
    ///
    /// Only transient upstream conditions qualify: 5xx, 408 and 429 statuses,
    /// and transport timeouts or connection failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::UpstreamUnavailable { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            Error::Transport(t) => t.is_transient(),
            _ => false,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::InvalidLanguage { context, .. }
            | Error::InvalidInput { context, .. }
            | Error::Configuration { context, .. }
            | Error::UpstreamUnavailable { context, .. }
            | Error::MalformedResponse { context, .. }
            | Error::EmptyOutput { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Attach a request id to errors that carry a context.
    pub fn with_request_id(mut self, id: &str) -> Self {
        match &mut self {
            Error::InvalidLanguage { context, .. }
            | Error::InvalidInput { context, .. }
            | Error::Configuration { context, .. }
            | Error::UpstreamUnavailable { context, .. }
            | Error::MalformedResponse { context, .. }
            | Error::EmptyOutput { context, .. } => {
                context.request_id = Some(id.to_string());
            }
            _ => {}
        }
        self
    }
}
