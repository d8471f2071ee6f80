use crate::client::core::PipelineClient;
use crate::config::{CredentialContext, PipelineConfig};
use crate::transport::HttpTransport;
use crate::types::{AsrSettings, TtsSettings};
use crate::Result;
use std::sync::Arc;

/// Builder for [`PipelineClient`].
///
/// Keep this surface small: everything beyond credentials and the discovery
/// URL lives in [`PipelineConfig`].
pub struct PipelineClientBuilder {
    config: PipelineConfig,
    credentials: Option<CredentialContext>,
}

impl PipelineClientBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            credentials: None,
        }
    }

    /// Replace the settings with `ULCA_*` environment overrides on top of the
    /// defaults. Credentials are still read lazily at build time unless set.
    pub fn from_env(mut self) -> Result<Self> {
        self.config = PipelineConfig::from_env()?;
        Ok(self)
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn credentials(mut self, credentials: CredentialContext) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the discovery endpoint (primarily for tests against a stub).
    pub fn discovery_url(mut self, url: impl Into<String>) -> Self {
        self.config.discovery_url = url.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn asr_settings(mut self, settings: AsrSettings) -> Self {
        self.config.asr = settings;
        self
    }

    pub fn tts_settings(mut self, settings: TtsSettings) -> Self {
        self.config.tts = settings;
        self
    }

    /// Fails with `MissingCredentials` when no credentials were given and none
    /// can be found in the settings file or environment.
    pub fn build(self) -> Result<PipelineClient> {
        self.config.validate()?;
        let credentials = match self.credentials {
            Some(c) => c,
            None => self.config.resolve_credentials()?,
        };
        let transport = HttpTransport::new(&self.config)?;

        Ok(PipelineClient {
            transport,
            credentials: Arc::new(credentials),
            discovery_url: self.config.discovery_url,
            asr: self.config.asr,
            tts: self.config.tts,
        })
    }
}

impl Default for PipelineClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
