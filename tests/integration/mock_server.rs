//! Mock pipeline platform for integration tests
//!
//! One mockito server plays both roles: `/discover` answers discovery and
//! hands out `/compute` on the same server as the callback URL.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use ulca_pipeline::{CredentialContext, PipelineClient};

pub const USER_ID: &str = "test-user";
pub const API_KEY: &str = "test-ulca-key";
pub const PIPELINE_ID: &str = "test-pipeline";
pub const AUTH_NAME: &str = "Authorization";
pub const AUTH_VALUE: &str = "inference-token";

/// Test fixture that owns the mock server
pub struct PipelineStub {
    pub server: ServerGuard,
}

impl PipelineStub {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    pub fn discovery_url(&self) -> String {
        format!("{}/discover", self.server.url())
    }

    pub fn callback_url(&self) -> String {
        format!("{}/compute", self.server.url())
    }

    /// Client pointed at the stub with fixed test credentials
    pub fn client(&self) -> PipelineClient {
        self.client_with_timeout(5)
    }

    pub fn client_with_timeout(&self, timeout_secs: u64) -> PipelineClient {
        let credentials = CredentialContext::new(USER_ID, API_KEY, PIPELINE_ID).unwrap();
        PipelineClient::builder()
            .discovery_url(self.discovery_url())
            .credentials(credentials)
            .timeout_secs(timeout_secs)
            .build()
            .expect("client should build against the stub")
    }

    /// Discovery body resolving `service_ids` to this stub's callback URL
    pub fn discovery_body(&self, service_ids: &[&str]) -> Value {
        self.discovery_body_with_key(service_ids, AUTH_NAME, AUTH_VALUE)
    }

    /// Same, with a custom inference header name and value
    pub fn discovery_body_with_key(&self, service_ids: &[&str], name: &str, value: &str) -> Value {
        let entries: Vec<Value> = service_ids
            .iter()
            .map(|id| json!({ "config": [{ "serviceId": id }] }))
            .collect();
        json!({
            "pipelineResponseConfig": entries,
            "pipelineInferenceAPIEndPoint": {
                "callbackUrl": self.callback_url(),
                "inferenceApiKey": { "name": name, "value": value }
            }
        })
    }

    /// Successful discovery that also checks the credentials and request body
    pub async fn mock_discovery(&mut self, request: Value, service_ids: &[&str], hits: usize) -> Mock {
        let body = self.discovery_body(service_ids);
        self.server
            .mock("POST", "/discover")
            .match_header("userid", USER_ID)
            .match_header("ulcaapikey", API_KEY)
            .match_body(Matcher::Json(request))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create_async()
            .await
    }

    /// Discovery answering with an arbitrary status and body
    pub async fn mock_discovery_raw(&mut self, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", "/discover")
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Invocation authenticated with the inference key only
    pub async fn mock_invocation(&mut self, request: Matcher, status: usize, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", "/compute")
            .match_header("authorization", AUTH_VALUE)
            .match_header("ulcaapikey", Matcher::Missing)
            .match_header("userid", Matcher::Missing)
            .match_body(request)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Catch-all that must never be hit
    pub async fn mock_untouched(&mut self, path: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(500)
            .expect(0)
            .create_async()
            .await
    }
}

pub fn translation_discovery_request(source: &str, target: &str) -> Value {
    json!({
        "pipelineTasks": [{
            "taskType": "translation",
            "config": { "language": { "sourceLanguage": source, "targetLanguage": target } }
        }],
        "pipelineRequestConfig": { "pipelineId": PIPELINE_ID }
    })
}

pub fn single_language_discovery_request(task: &str, language: &str) -> Value {
    json!({
        "pipelineTasks": [{
            "taskType": task,
            "config": { "language": { "sourceLanguage": language } }
        }],
        "pipelineRequestConfig": { "pipelineId": PIPELINE_ID }
    })
}
