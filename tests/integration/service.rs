//! Service boundary over the real client and the stub

use super::mock_server::*;
use mockito::Matcher;
use std::sync::Arc;
use ulca_pipeline::service::{PipelineService, TranslationRequest};

#[tokio::test]
async fn service_translate_wraps_output_in_envelope() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(
            Matcher::Any,
            200,
            r#"{"pipelineResponse": [{"output": [{"target": "नमस्ते"}]}]}"#,
            1,
        )
        .await;

    let service = PipelineService::new(Arc::new(stub.client()));
    let req: TranslationRequest = serde_json::from_str(
        r#"{"source_language": 0, "target_language": "hi", "content": "hello"}"#,
    )
    .unwrap();
    let resp = service.translate(&req).await;

    assert_eq!(resp.status_code, 200);
    assert!(resp.is_success());
    let body = serde_json::to_value(&resp).unwrap();
    assert_eq!(body["translated_content"], "नमस्ते");
}

#[tokio::test]
async fn service_maps_upstream_failure_to_gateway_error() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery_raw(503, r#"{"error": "node-42 overloaded"}"#, 1)
        .await;

    let service = PipelineService::new(Arc::new(stub.client()));
    let req: TranslationRequest = serde_json::from_str(
        r#"{"source_language": "en", "target_language": "hi", "content": "hello"}"#,
    )
    .unwrap();
    let resp = service.translate(&req).await;

    assert_eq!(resp.status_code, 502);
    assert!(!resp.message.contains("node-42"));
    assert!(resp.payload.translated_content.is_none());
}
