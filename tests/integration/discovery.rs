//! Discovery phase against the stub

use super::mock_server::*;
use std::io::Write;
use std::time::{Duration, Instant};
use ulca_pipeline::error::Stage;
use ulca_pipeline::{Error, Language, LanguagePair, TaskType};

#[tokio::test]
async fn resolve_service_returns_the_advertised_binding() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub
        .mock_discovery(
            translation_discovery_request("en", "hi"),
            &["ai4bharat/indictrans-v2"],
            1,
        )
        .await;

    let binding = stub
        .client()
        .resolve_service(
            TaskType::Translation,
            LanguagePair::translation(Language::English, Language::Hindi),
        )
        .await
        .unwrap();

    assert_eq!(binding.service_id(), "ai4bharat/indictrans-v2");
    assert_eq!(binding.callback_url.as_str(), stub.callback_url());
    assert_eq!(binding.auth_header_name, AUTH_NAME);
    assert_eq!(binding.auth_header_value, AUTH_VALUE);
    discovery.assert_async().await;
}

#[tokio::test]
async fn missing_callback_url_is_malformed() {
    let mut stub = PipelineStub::new().await;
    let body = r#"{
        "pipelineResponseConfig": [{"config": [{"serviceId": "svc"}]}],
        "pipelineInferenceAPIEndPoint": {"inferenceApiKey": {"name": "Authorization", "value": "k"}}
    }"#;
    let discovery = stub.mock_discovery_raw(200, body, 1).await;
    let compute = stub.mock_untouched("/compute").await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    match err {
        Error::MalformedResponse { stage, field, .. } => {
            assert_eq!(stage, Stage::Discovery);
            assert_eq!(field, "pipelineInferenceAPIEndPoint.callbackUrl");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn missing_service_id_names_the_task_index() {
    let mut stub = PipelineStub::new().await;
    let body = format!(
        r#"{{
            "pipelineResponseConfig": [{{"config": []}}],
            "pipelineInferenceAPIEndPoint": {{
                "callbackUrl": "{}",
                "inferenceApiKey": {{"name": "Authorization", "value": "k"}}
            }}
        }}"#,
        stub.callback_url()
    );
    let _discovery = stub.mock_discovery_raw(200, &body, 1).await;

    let err = stub.client().text_to_speech("नमस्ते", "hi").await.unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedResponse { ref field, .. } if field == "pipelineResponseConfig[0].config[0].serviceId"
    ));
}

#[tokio::test]
async fn non_json_discovery_body_is_malformed() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub.mock_discovery_raw(200, "<html>gateway</html>", 1).await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { stage: Stage::Discovery, .. }));
}

#[tokio::test]
async fn discovery_failure_status_is_upstream_unavailable() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub
        .mock_discovery_raw(503, r#"{"message": "internal trace: db-7 down"}"#, 1)
        .await;
    let compute = stub.mock_untouched("/compute").await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(503));
    assert!(matches!(
        err,
        Error::UpstreamUnavailable { stage: Stage::Discovery, status: 503, .. }
    ));
    assert_eq!(err.http_status(), 502);
    assert!(!err.to_string().contains("db-7"));
    assert!(!err.public_message().contains("db-7"));
    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn hanging_discovery_is_cut_off_by_the_timeout() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .server
        .mock("POST", "/discover")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_secs(4));
            w.write_all(b"{}")
        })
        .create_async()
        .await;

    let started = Instant::now();
    let err = stub
        .client_with_timeout(1)
        .translate_text("hello", "en", "hi")
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(err.is_retryable());
    assert_eq!(err.http_status(), 504);
}

#[tokio::test]
async fn translation_without_target_is_rejected_before_discovery() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub.mock_untouched("/discover").await;

    let err = stub
        .client()
        .resolve_service(TaskType::Translation, LanguagePair::single(Language::English))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
    assert_eq!(err.http_status(), 400);
    discovery.assert_async().await;
}

#[tokio::test]
async fn undecodable_discovery_body_keeps_decode_details_only() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub.mock_discovery_raw(200, "<html>gateway-node-9</html>", 1).await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    let details = err
        .context()
        .and_then(|c| c.details.clone())
        .expect("decode error should be recorded");
    assert!(!details.is_empty());
    assert!(!details.contains("gateway-node-9"));
    assert!(!err.public_message().contains("gateway-node-9"));
}
