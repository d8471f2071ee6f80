//! 服务发现：构造发现请求并把响应解码为 [`ServiceBinding`]。
//!
//! Discovery phase of the two-call protocol.

use crate::error::Stage;
use crate::types::wire::{
    DiscoveryRequest, DiscoveryResponse, DiscoveryTask, DiscoveryTaskConfig,
    PipelineRequestConfig, WireLanguage,
};
use crate::types::{PipelineTask, ServiceBinding};
use crate::{Error, ErrorContext};
use url::Url;

pub(crate) const FIELD_SERVICE_ID: &str = "pipelineResponseConfig[].config[0].serviceId";
pub(crate) const FIELD_CALLBACK_URL: &str = "pipelineInferenceAPIEndPoint.callbackUrl";
pub(crate) const FIELD_AUTH_NAME: &str = "pipelineInferenceAPIEndPoint.inferenceApiKey.name";
pub(crate) const FIELD_AUTH_VALUE: &str = "pipelineInferenceAPIEndPoint.inferenceApiKey.value";

pub(crate) fn wire_language(task: &PipelineTask) -> WireLanguage {
    WireLanguage {
        source_language: task.languages.source,
        target_language: task.languages.target,
    }
}

pub(crate) fn build_request<'a>(tasks: &[PipelineTask], pipeline_id: &'a str) -> DiscoveryRequest<'a> {
    DiscoveryRequest {
        pipeline_tasks: tasks
            .iter()
            .map(|t| DiscoveryTask {
                task_type: t.task_type,
                config: DiscoveryTaskConfig {
                    language: wire_language(t),
                },
            })
            .collect(),
        pipeline_request_config: PipelineRequestConfig { pipeline_id },
    }
}

fn malformed(field: &str, request_id: &str) -> Error {
    Error::MalformedResponse {
        stage: Stage::Discovery,
        field: field.to_string(),
        context: ErrorContext::new()
            .with_request_id(request_id)
            .with_source("discovery"),
    }
}

fn present(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Turn a decoded discovery body into a binding for `expected_tasks` tasks.
///
/// Every task needs its own service id; the callback URL and inference key
/// are shared by the whole task list.
pub(crate) fn decode_binding(
    response: DiscoveryResponse,
    expected_tasks: usize,
    request_id: &str,
) -> Result<ServiceBinding, Error> {
    let entries = response.pipeline_response_config.unwrap_or_default();
    let mut service_ids = Vec::with_capacity(expected_tasks);
    for i in 0..expected_tasks {
        let id = entries
            .get(i)
            .and_then(|e| e.config.as_ref())
            .and_then(|c| c.first())
            .and_then(|c| present(c.service_id.clone()))
            .ok_or_else(|| {
                malformed(
                    &FIELD_SERVICE_ID.replace("[]", &format!("[{}]", i)),
                    request_id,
                )
            })?;
        service_ids.push(id);
    }

    let endpoint = response
        .pipeline_inference_api_end_point
        .unwrap_or_default();

    let callback_url = present(endpoint.callback_url)
        .ok_or_else(|| malformed(FIELD_CALLBACK_URL, request_id))?;
    let callback_url = Url::parse(&callback_url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| malformed(FIELD_CALLBACK_URL, request_id))?;

    let key = endpoint.inference_api_key.unwrap_or_default();
    let auth_header_name =
        present(key.name).ok_or_else(|| malformed(FIELD_AUTH_NAME, request_id))?;
    let auth_header_value =
        present(key.value).ok_or_else(|| malformed(FIELD_AUTH_VALUE, request_id))?;

    Ok(ServiceBinding {
        service_ids,
        callback_url,
        auth_header_name,
        auth_header_value,
    })
}
