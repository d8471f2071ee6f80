//! 配置模块：凭据上下文与客户端设置（环境变量 / YAML 文件）。
//!
//! Configuration for the pipeline client.
//!
//! Credentials are never compiled in. They come from the environment
//! (`ULCA_USER_ID`, `ULCA_API_KEY`, `ULCA_PIPELINE_ID`), from the `credentials`
//! section of a YAML settings file, or, for the API key only, from the OS
//! keyring under service `ulca-pipeline` keyed by user id.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `ULCA_DISCOVERY_URL` | public `getModelsPipeline` endpoint | discovery endpoint |
//! | `ULCA_HTTP_TIMEOUT_SECS` | 30 | per-call request timeout |
//! | `ULCA_HTTP_CONNECT_TIMEOUT_SECS` | 10 | connect timeout |
//! | `ULCA_HTTP_POOL_MAX_IDLE_PER_HOST` | 16 | idle connections kept per host |
//! | `ULCA_PROXY_URL` | unset | proxy for all outbound calls |

use crate::types::{AsrSettings, TtsSettings};
use crate::{Error, ErrorContext, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const DEFAULT_DISCOVERY_URL: &str =
    "https://meity-auth.ulcacontrib.org/ulca/apis/v0/model/getModelsPipeline";

pub const ENV_USER_ID: &str = "ULCA_USER_ID";
pub const ENV_API_KEY: &str = "ULCA_API_KEY";
pub const ENV_PIPELINE_ID: &str = "ULCA_PIPELINE_ID";

const KEYRING_SERVICE: &str = "ulca-pipeline";

/// Identity used for discovery calls. Read-only once constructed.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialContext {
    pub user_id: String,
    api_key: String,
    pub pipeline_id: String,
}

impl CredentialContext {
    /// Blank values count as missing.
    pub fn new(
        user_id: impl Into<String>,
        api_key: impl Into<String>,
        pipeline_id: impl Into<String>,
    ) -> Result<Self> {
        let ctx = Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
            pipeline_id: pipeline_id.into(),
        };
        ctx.validate()?;
        Ok(ctx)
    }

    /// Read credentials from the process environment, falling back to the OS
    /// keyring for the API key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), keyring_api_key)
    }

    /// Credential lookup with injectable sources.
    pub fn from_lookup<E, K>(env: E, keyring: K) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
        K: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let user_id = non_blank(ENV_USER_ID).ok_or_else(|| Error::missing_credentials(ENV_USER_ID))?;
        let pipeline_id =
            non_blank(ENV_PIPELINE_ID).ok_or_else(|| Error::missing_credentials(ENV_PIPELINE_ID))?;
        let api_key = non_blank(ENV_API_KEY)
            .or_else(|| keyring(user_id.as_str()).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| Error::missing_credentials(ENV_API_KEY))?;

        Ok(Self {
            user_id,
            api_key,
            pipeline_id,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::missing_credentials(ENV_USER_ID));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_credentials(ENV_API_KEY));
        }
        if self.pipeline_id.trim().is_empty() {
            return Err(Error::missing_credentials(ENV_PIPELINE_ID));
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("pipeline_id", &self.pipeline_id)
            .finish()
    }
}

fn keyring_api_key(user_id: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, user_id)
        .ok()?
        .get_password()
        .ok()
}

/// Client settings. Credentials are optional here; when absent they are taken
/// from the environment at build time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub discovery_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub proxy_url: Option<String>,
    pub asr: AsrSettings,
    pub tts: TtsSettings,
    pub credentials: Option<CredentialContext>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 16,
            proxy_url: None,
            asr: AsrSettings::default(),
            tts: TtsSettings::default(),
            credentials: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `ULCA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| Error::Configuration {
            message: format!("Invalid settings file: {}", e),
            context: ErrorContext::new().with_source("config"),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn with_env_overrides<E>(mut self, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        if let Some(url) = env("ULCA_DISCOVERY_URL") {
            self.discovery_url = url;
        }
        if let Some(v) = env("ULCA_HTTP_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("ULCA_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("ULCA_HTTP_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_env("ULCA_HTTP_CONNECT_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("ULCA_HTTP_POOL_MAX_IDLE_PER_HOST") {
            self.pool_max_idle_per_host = parse_env("ULCA_HTTP_POOL_MAX_IDLE_PER_HOST", &v)?;
        }
        if let Some(v) = env("ULCA_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        self.validate()?;
        Ok(self)
    }

    /// Credentials from the settings file if present, else from the environment.
    pub fn resolve_credentials(&self) -> Result<CredentialContext> {
        match &self.credentials {
            Some(creds) => {
                creds.validate()?;
                Ok(creds.clone())
            }
            None => CredentialContext::from_env(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.discovery_url).map_err(|e| Error::Configuration {
            message: format!("Invalid discovery URL: {}", e),
            context: ErrorContext::new().with_source("config"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration(format!(
                "Discovery URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::configuration("timeout_secs must be greater than zero"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::configuration(
                "connect_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| Error::Configuration {
        message: format!("{} has an invalid value '{}'", name, value),
        context: ErrorContext::new().with_source("config"),
    })
}
