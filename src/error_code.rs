//! 标准错误码：为每个失败类别定义稳定的代码、类别、HTTP 状态和重试语义。
//!
//! Stable error codes for pipeline failures.
//!
//! Each [`crate::Error`] maps onto one code. Callers use the code for metrics and
//! dashboards, the HTTP status for their own response, and the retryable flag to
//! drive an explicit [`crate::client::RetryPolicy`].
//!
//! | Prefix | Category | Description |
//! |--------|----------|-------------|
//! | P1xxx | client | Caller input rejected before any network call |
//! | P2xxx | config | Process configuration missing or invalid |
//! | P3xxx | upstream | Discovery or invocation endpoint misbehaved |
//! | P9xxx | internal | Everything else |
//!
//! ```rust
//! use ulca_pipeline::error_code::PipelineErrorCode;
//!
//! let code = PipelineErrorCode::UpstreamUnavailable;
//! assert_eq!(code.code(), "P3001");
//! assert_eq!(code.http_status(), 502);
//! assert_eq!(code.category(), "upstream");
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineErrorCode {
    /// P1001: Language selector is not in the supported table
    InvalidLanguage,
    /// P1002: Request input is empty or otherwise unusable
    InvalidInput,
    /// P2001: Credentials are absent from configuration
    MissingCredentials,
    /// P2002: Configuration present but invalid
    Configuration,
    /// P3001: Upstream answered with a non-200 status
    UpstreamUnavailable,
    /// P3002: Discovery answered 200 without the fields needed to bind a service
    MalformedResponse,
    /// P3003: Invocation answered 200 without the expected output
    EmptyOutput,
    /// P3004: Request could not reach upstream or timed out
    Transport,
    /// P9999: Unclassified
    Internal,
}

impl PipelineErrorCode {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLanguage => "P1001",
            Self::InvalidInput => "P1002",
            Self::MissingCredentials => "P2001",
            Self::Configuration => "P2002",
            Self::UpstreamUnavailable => "P3001",
            Self::MalformedResponse => "P3002",
            Self::EmptyOutput => "P3003",
            Self::Transport => "P3004",
            Self::Internal => "P9999",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidLanguage => "invalid_language",
            Self::InvalidInput => "invalid_input",
            Self::MissingCredentials => "missing_credentials",
            Self::Configuration => "configuration",
            Self::UpstreamUnavailable => "upstream_unavailable",
            Self::MalformedResponse => "malformed_response",
            Self::EmptyOutput => "empty_output",
            Self::Transport => "transport",
            Self::Internal => "internal",
        }
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidLanguage | Self::InvalidInput => "client",
            Self::MissingCredentials | Self::Configuration => "config",
            Self::UpstreamUnavailable
            | Self::MalformedResponse
            | Self::EmptyOutput
            | Self::Transport => "upstream",
            Self::Internal => "internal",
        }
    }

    /// Status a consumer-facing HTTP layer should answer with.
    ///
    /// Upstream failures collapse onto 502/504 so the upstream's own status and
    /// structure are not exposed.
    #[inline]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidLanguage | Self::InvalidInput => 400,
            Self::MissingCredentials => 401,
            Self::UpstreamUnavailable | Self::MalformedResponse | Self::EmptyOutput => 502,
            Self::Transport => 504,
            Self::Configuration | Self::Internal => 500,
        }
    }

    /// Default retryability. The precise decision for upstream statuses lives in
    /// [`crate::Error::is_retryable`].
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable | Self::Transport)
    }

    /// Client-safe message for this code.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidLanguage => "Invalid language codes provided",
            Self::InvalidInput => "Invalid request input",
            Self::MissingCredentials => "Pipeline credentials are not configured",
            Self::Configuration => "Pipeline client is misconfigured",
            Self::UpstreamUnavailable => "Upstream pipeline service is unavailable",
            Self::MalformedResponse => "Upstream pipeline returned an unexpected response",
            Self::EmptyOutput => "Upstream pipeline returned no output",
            Self::Transport => "Upstream pipeline could not be reached",
            Self::Internal => "Internal error",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P1001" => Some(Self::InvalidLanguage),
            "P1002" => Some(Self::InvalidInput),
            "P2001" => Some(Self::MissingCredentials),
            "P2002" => Some(Self::Configuration),
            "P3001" => Some(Self::UpstreamUnavailable),
            "P3002" => Some(Self::MalformedResponse),
            "P3003" => Some(Self::EmptyOutput),
            "P3004" => Some(Self::Transport),
            "P9999" => Some(Self::Internal),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}
