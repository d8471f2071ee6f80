use crate::config::PipelineConfig;
use crate::Result;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Longest body excerpt kept for debug logs.
const BODY_SNIPPET_LIMIT: usize = 512;

/// Thin JSON-over-HTTP transport shared by both protocol phases.
///
/// Every call is bounded by the configured request timeout; there are no
/// retries at this layer.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

/// Status and raw body of an upstream reply.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Truncated, lossy body text for debug logs.
    pub fn body_snippet(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        if text.len() <= BODY_SNIPPET_LIMIT {
            return text.into_owned();
        }
        let mut end = BODY_SNIPPET_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}

impl HttpTransport {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| crate::Error::configuration(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST `body` as JSON and collect the whole reply.
    ///
    /// Non-2xx statuses are returned as data, not errors: the caller decides
    /// how to classify them.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        mut headers: HeaderMap,
        body: &B,
        request_id: &str,
    ) -> Result<HttpReply> {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(v) = HeaderValue::from_str(request_id) {
            headers.insert("x-request-id", v);
        }

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| crate::Error::Transport(TransportError::Http(e)))?;

        Ok(HttpReply { status, body })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Timeouts and connection failures; nothing reached a handler upstream.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Http(e) => e.is_timeout() || e.is_connect(),
        }
    }
}
