//! asr → translation → tts in one discovery and one invocation

use super::mock_server::*;
use mockito::Matcher;
use serde_json::json;
use ulca_pipeline::{AudioInput, Error, TaskType};

fn chain_discovery_request() -> serde_json::Value {
    json!({
        "pipelineTasks": [
            { "taskType": "asr", "config": { "language": { "sourceLanguage": "hi" } } },
            { "taskType": "translation", "config": { "language": { "sourceLanguage": "hi", "targetLanguage": "en" } } },
            { "taskType": "tts", "config": { "language": { "sourceLanguage": "en" } } }
        ],
        "pipelineRequestConfig": { "pipelineId": PIPELINE_ID }
    })
}

#[tokio::test]
async fn chained_pipeline_uses_one_call_per_phase() {
    let mut stub = PipelineStub::new().await;
    let discovery = stub
        .mock_discovery(chain_discovery_request(), &["asr-svc", "nmt-svc", "tts-svc"], 1)
        .await;
    let compute = stub
        .mock_invocation(
            Matcher::Json(json!({
                "pipelineTasks": [
                    {
                        "taskType": "asr",
                        "config": {
                            "language": { "sourceLanguage": "hi" },
                            "serviceId": "asr-svc",
                            "audioFormat": "wav",
                            "samplingRate": 16000
                        }
                    },
                    {
                        "taskType": "translation",
                        "config": {
                            "language": { "sourceLanguage": "hi", "targetLanguage": "en" },
                            "serviceId": "nmt-svc"
                        }
                    },
                    {
                        "taskType": "tts",
                        "config": {
                            "language": { "sourceLanguage": "en" },
                            "serviceId": "tts-svc",
                            "samplingRate": 8000,
                            "gender": "female"
                        }
                    }
                ],
                "inputData": { "audio": [{ "audioContent": "AQID" }] }
            })),
            200,
            &json!({
                "pipelineResponse": [
                    { "taskType": "asr", "output": [{ "source": "नमस्ते" }] },
                    { "taskType": "translation", "output": [{ "source": "नमस्ते", "target": "hello" }] },
                    { "taskType": "tts", "audio": [{ "audioContent": "UklGRg==" }] }
                ]
            })
            .to_string(),
            1,
        )
        .await;

    let out = stub
        .client()
        .chained_pipeline(AudioInput::from_bytes(vec![1u8, 2, 3]), "hi", "en")
        .await
        .unwrap();

    assert_eq!(out.audio.audio_content, "UklGRg==");
    assert_eq!(out.transcript.as_deref(), Some("नमस्ते"));
    assert_eq!(out.translation.as_deref(), Some("hello"));
    discovery.assert_async().await;
    compute.assert_async().await;
}

#[tokio::test]
async fn chained_pipeline_by_uri_without_intermediates() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(chain_discovery_request(), &["asr-svc", "nmt-svc", "tts-svc"], 1)
        .await;
    let compute = stub
        .mock_invocation(
            Matcher::PartialJson(json!({
                "inputData": { "audio": [{ "audioUri": "https://audio.example.test/clip.wav" }] }
            })),
            200,
            r#"{"pipelineResponse": [{}, {}, {"output": [{"audioContent": "UklGRg=="}]}]}"#,
            1,
        )
        .await;

    let out = stub
        .client()
        .chained_pipeline(AudioInput::from_uri("https://audio.example.test/clip.wav"), "hi", "en")
        .await
        .unwrap();

    assert_eq!(out.audio.audio_content, "UklGRg==");
    assert!(out.transcript.is_none());
    assert!(out.translation.is_none());
    compute.assert_async().await;
}

#[tokio::test]
async fn chained_pipeline_without_final_audio_is_empty_output() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(chain_discovery_request(), &["asr-svc", "nmt-svc", "tts-svc"], 1)
        .await;
    let _compute = stub
        .mock_invocation(
            Matcher::Any,
            200,
            r#"{"pipelineResponse": [{"output": [{"source": "नमस्ते"}]}]}"#,
            1,
        )
        .await;

    let err = stub
        .client()
        .chained_pipeline(AudioInput::from_bytes(vec![1u8, 2, 3]), "hi", "en")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyOutput { task: TaskType::Tts, .. }));
}

#[tokio::test]
async fn chain_discovery_short_of_services_is_malformed() {
    let mut stub = PipelineStub::new().await;
    let _discovery = stub
        .mock_discovery(chain_discovery_request(), &["asr-svc", "nmt-svc"], 1)
        .await;
    let compute = stub.mock_untouched("/compute").await;

    let err = stub
        .client()
        .chained_pipeline(AudioInput::from_bytes(vec![1u8, 2, 3]), "hi", "en")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedResponse { ref field, .. } if field == "pipelineResponseConfig[2].config[0].serviceId"
    ));
    compute.assert_async().await;
}
