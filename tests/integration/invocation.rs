//! Full resolve → invoke round trips for single tasks

use super::mock_server::*;
use mockito::Matcher;
use serde_json::json;
use ulca_pipeline::error::Stage;
use ulca_pipeline::{AudioInput, Error, TaskType};

fn translation_response(target: &str) -> String {
    json!({
        "pipelineResponse": [{
            "taskType": "translation",
            "output": [{ "source": "hello", "target": target }]
        }]
    })
    .to_string()
}

#[tokio::test]
async fn translate_text_round_trip() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 1)
        .await;
    let compute = stub
        .mock_invocation(
            Matcher::Json(json!({
                "pipelineTasks": [{
                    "taskType": "translation",
                    "config": {
                        "language": { "sourceLanguage": "en", "targetLanguage": "hi" },
                        "serviceId": "nmt-svc"
                    }
                }],
                "inputData": { "input": [{ "source": "hello" }] }
            })),
            200,
            &translation_response("नमस्ते"),
            1,
        )
        .await;

    let out = stub.client().translate_text("hello", "en", "hi").await.unwrap();
    assert_eq!(out, "नमस्ते");
    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn numeric_selectors_resolve_through_the_table() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(translation_discovery_request("en", "ta"), &["nmt-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(Matcher::Any, 200, &translation_response("வணக்கம்"), 1)
        .await;

    let out = stub.client().translate_text("hello", 0, 7).await.unwrap();
    assert_eq!(out, "வணக்கம்");
}

#[tokio::test]
async fn identical_requests_give_identical_results() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 2)
        .await;
    let compute = stub
        .mock_invocation(Matcher::Any, 200, &translation_response("नमस्ते"), 2)
        .await;

    let client = stub.client();
    let first = client.translate_text("hello", "en", "hi").await.unwrap();
    let second = client.translate_text("hello", "en", "hi").await.unwrap();
    assert_eq!(first, second);
    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn invalid_language_makes_no_network_call() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub.mock_untouched("/discover").await;
    let compute = stub.mock_untouched("/compute").await;

    let err = stub.client().text_to_speech("hello", 99).await.unwrap_err();
    assert!(matches!(err, Error::InvalidLanguage { ref selector, .. } if selector == "99"));
    assert_eq!(err.http_status(), 400);

    let err = stub.client().translate_text("hello", "en", "xx").await.unwrap_err();
    assert!(matches!(err, Error::InvalidLanguage { .. }));

    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn speech_to_text_sends_inline_audio_and_asr_config() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(single_language_discovery_request("asr", "hi"), &["asr-svc"], 1)
        .await;
    let compute = stub
        .mock_invocation(
            Matcher::Json(json!({
                "pipelineTasks": [{
                    "taskType": "asr",
                    "config": {
                        "language": { "sourceLanguage": "hi" },
                        "serviceId": "asr-svc",
                        "audioFormat": "wav",
                        "samplingRate": 16000
                    }
                }],
                "inputData": { "audio": [{ "audioContent": "AQID" }] }
            })),
            200,
            r#"{"pipelineResponse": [{"taskType": "asr", "output": [{"source": "नमस्ते दुनिया"}]}]}"#,
            1,
        )
        .await;

    let text = stub
        .client()
        .speech_to_text(AudioInput::from_bytes(vec![1u8, 2, 3]), "hi")
        .await
        .unwrap();
    assert_eq!(text, "नमस्ते दुनिया");
    compute.assert_async().await;
}

#[tokio::test]
async fn text_to_speech_reads_audio_content() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(single_language_discovery_request("tts", "ta"), &["tts-svc"], 1)
        .await;
    let compute = stub
        .mock_invocation(
            Matcher::PartialJson(json!({
                "inputData": { "input": [{ "source": "வணக்கம்" }] }
            })),
            200,
            r#"{"pipelineResponse": [{"taskType": "tts", "audio": [{"audioContent": "UklGRg=="}]}]}"#,
            1,
        )
        .await;

    let audio = stub.client().text_to_speech("வணக்கம்", "ta").await.unwrap();
    assert_eq!(audio.audio_content, "UklGRg==");
    assert_eq!(audio.decode().unwrap(), b"RIFF");
    compute.assert_async().await;
}

#[tokio::test]
async fn missing_target_is_empty_output() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(
            Matcher::Any,
            200,
            r#"{"pipelineResponse": [{"taskType": "translation", "output": [{"source": "hello"}]}]}"#,
            1,
        )
        .await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    match err {
        Error::EmptyOutput { task, field, .. } => {
            assert_eq!(task, TaskType::Translation);
            assert_eq!(field, "target");
        }
        other => panic!("expected EmptyOutput, got {other:?}"),
    }
}

#[tokio::test]
async fn invocation_failure_status_is_upstream_unavailable() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(Matcher::Any, 500, r#"{"detail": "Traceback (most recent call last)"}"#, 1)
        .await;

    let err = stub.client().translate_text("hello", "en", "hi").await.unwrap_err();
    assert!(matches!(
        err,
        Error::UpstreamUnavailable { stage: Stage::Invocation, status: 500, .. }
    ));
    assert!(err.is_retryable());
    assert!(!err.to_string().contains("Traceback"));
}

#[tokio::test]
async fn execute_with_stats_records_both_phases() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(translation_discovery_request("en", "hi"), &["nmt-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(Matcher::Any, 200, &translation_response("नमस्ते"), 1)
        .await;

    let task = ulca_pipeline::TaskDescriptor::Translation {
        source: ulca_pipeline::Language::English,
        target: ulca_pipeline::Language::Hindi,
        text: "hello".into(),
    };
    let (result, stats) = stub.client().execute_with_stats(&task).await;
    assert!(result.is_ok());
    assert_eq!(stats.phase, ulca_pipeline::RequestPhase::Succeeded);
    assert!(stats.discovery_ms.is_some());
    assert!(stats.invocation_ms.is_some());
    assert!(stats.failed_in.is_none());
}

#[tokio::test]
async fn inference_header_name_comes_from_discovery() {
    let mut stub = PipelineStub::new().await;
    let body = stub.discovery_body_with_key(&["nmt-svc"], "x-inference-key", "per-pipeline-key");
    let discovery = stub
        .server
        .mock("POST", "/discover")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;
    let compute = stub
        .server
        .mock("POST", "/compute")
        .match_header("x-inference-key", "per-pipeline-key")
        .match_header("authorization", Matcher::Missing)
        .match_header("ulcaapikey", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(translation_response("नमस्ते"))
        .expect(1)
        .create_async()
        .await;

    let out = stub.client().translate_text("hello", "en", "hi").await.unwrap();
    assert_eq!(out, "नमस्ते");
    discovery.assert_async().await;
    compute.assert_async().await;
}
