//! Serde schemas for the discovery and invocation bodies.
//!
//! Request types borrow from the caller. Response types make every field
//! optional so that absence is decoded into `None` and reported as a typed
//! error by the client, instead of failing deep inside serde.

use crate::language::Language;
use crate::types::task::{Gender, TaskType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLanguage {
    pub source_language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_language: Option<Language>,
}

// ---- discovery ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest<'a> {
    pub pipeline_tasks: Vec<DiscoveryTask>,
    pub pipeline_request_config: PipelineRequestConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryTask {
    pub task_type: TaskType,
    pub config: DiscoveryTaskConfig,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryTaskConfig {
    pub language: WireLanguage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequestConfig<'a> {
    pub pipeline_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    pub pipeline_response_config: Option<Vec<ResponseConfigEntry>>,
    #[serde(rename = "pipelineInferenceAPIEndPoint")]
    pub pipeline_inference_api_end_point: Option<InferenceEndpoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConfigEntry {
    pub task_type: Option<String>,
    pub config: Option<Vec<ServiceConfigEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfigEntry {
    pub service_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceEndpoint {
    pub callback_url: Option<String>,
    pub inference_api_key: Option<InferenceApiKey>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InferenceApiKey {
    pub name: Option<String>,
    pub value: Option<String>,
}

// ---- invocation ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest<'a> {
    pub pipeline_tasks: Vec<InvocationTask<'a>>,
    pub input_data: InputData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationTask<'a> {
    pub task_type: TaskType,
    pub config: InvocationTaskConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationTaskConfig<'a> {
    pub language: WireLanguage,
    pub service_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

#[derive(Debug, Default, Serialize)]
pub struct InputData<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<TextInput<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<AudioItem>>,
}

#[derive(Debug, Serialize)]
pub struct TextInput<'a> {
    pub source: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub pipeline_response: Option<Vec<TaskResponse>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub task_type: Option<String>,
    pub output: Option<Vec<OutputItem>>,
    pub audio: Option<Vec<AudioOutItem>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub source: Option<String>,
    pub target: Option<String>,
    pub audio_content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioOutItem {
    pub audio_content: Option<String>,
}

fn non_empty(s: Option<&String>) -> Option<&str> {
    s.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl TaskResponse {
    fn first_output(&self) -> Option<&OutputItem> {
        self.output.as_ref()?.first()
    }

    /// The task's output field, if present and non-blank.
    pub fn output_for(&self, task: TaskType) -> Option<&str> {
        match task {
            TaskType::Translation => non_empty(self.first_output()?.target.as_ref()),
            TaskType::Asr => non_empty(self.first_output()?.source.as_ref()),
            // Synthesized audio is normally under `audio`; some deployments put
            // it in `output` instead.
            TaskType::Tts => self
                .audio
                .as_ref()
                .and_then(|a| a.first())
                .and_then(|a| non_empty(a.audio_content.as_ref()))
                .or_else(|| non_empty(self.first_output()?.audio_content.as_ref())),
        }
    }
}

impl InvocationResponse {
    pub fn task(&self, index: usize) -> Option<&TaskResponse> {
        self.pipeline_response.as_ref()?.get(index)
    }
}
