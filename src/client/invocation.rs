//! Invocation phase: compute payloads and output extraction.

use super::discovery::wire_language;
use crate::error::Stage;
use crate::types::wire::{
    AudioItem, InputData, InvocationRequest, InvocationResponse, InvocationTask,
    InvocationTaskConfig, TextInput,
};
use crate::types::{
    AsrSettings, AudioInput, ChainOutput, PipelineTask, ServiceBinding, SpeechAudio,
    TaskDescriptor, TaskOutput, TaskType, TtsSettings,
};
use crate::{Error, ErrorContext, Result};

fn audio_items(audio: &AudioInput) -> Vec<AudioItem> {
    vec![AudioItem {
        audio_content: audio.encoded_content(),
        audio_uri: audio.uri().map(str::to_string),
    }]
}

pub(crate) fn build_request<'a>(
    binding: &'a ServiceBinding,
    task: &'a TaskDescriptor,
    tasks: &[PipelineTask],
    asr: &'a AsrSettings,
    tts: &TtsSettings,
) -> Result<InvocationRequest<'a>> {
    if binding.service_ids.len() < tasks.len() {
        return Err(Error::invalid_input(format!(
            "binding resolves {} service(s) but the task list has {}",
            binding.service_ids.len(),
            tasks.len()
        )));
    }

    let pipeline_tasks = tasks
        .iter()
        .zip(binding.service_ids.iter())
        .map(|(t, service_id)| {
            let (audio_format, sampling_rate, gender) = match t.task_type {
                TaskType::Asr => (Some(asr.audio_format.as_str()), Some(asr.sampling_rate), None),
                TaskType::Tts => (None, Some(tts.sampling_rate), Some(tts.gender)),
                TaskType::Translation => (None, None, None),
            };
            InvocationTask {
                task_type: t.task_type,
                config: InvocationTaskConfig {
                    language: wire_language(t),
                    service_id: service_id.as_str(),
                    audio_format,
                    sampling_rate,
                    gender,
                },
            }
        })
        .collect();

    let input_data = match task {
        TaskDescriptor::Translation { text, .. } | TaskDescriptor::TextToSpeech { text, .. } => {
            InputData {
                input: Some(vec![TextInput { source: text }]),
                audio: None,
            }
        }
        TaskDescriptor::SpeechToText { audio, .. }
        | TaskDescriptor::ChainedPipeline { audio, .. } => InputData {
            input: None,
            audio: Some(audio_items(audio)),
        },
    };

    Ok(InvocationRequest {
        pipeline_tasks,
        input_data,
    })
}

fn empty(task: TaskType, request_id: &str) -> Error {
    Error::EmptyOutput {
        task,
        field: task.output_field().to_string(),
        context: ErrorContext::new()
            .with_request_id(request_id)
            .with_source(Stage::Invocation.as_str()),
    }
}

fn required(response: &InvocationResponse, index: usize, task: TaskType, request_id: &str) -> Result<String> {
    response
        .task(index)
        .and_then(|r| r.output_for(task))
        .map(str::to_string)
        .ok_or_else(|| empty(task, request_id))
}

/// Pull the output matching `task` out of an invocation body.
///
/// For the chain only the final audio is required; the intermediate
/// transcript and translation are returned when the platform includes them.
pub(crate) fn extract_output(
    task: &TaskDescriptor,
    response: &InvocationResponse,
    request_id: &str,
) -> Result<TaskOutput> {
    match task {
        TaskDescriptor::Translation { .. } => {
            required(response, 0, TaskType::Translation, request_id).map(TaskOutput::Translation)
        }
        TaskDescriptor::SpeechToText { .. } => {
            required(response, 0, TaskType::Asr, request_id).map(TaskOutput::Transcript)
        }
        TaskDescriptor::TextToSpeech { .. } => required(response, 0, TaskType::Tts, request_id)
            .map(|audio_content| TaskOutput::Speech(SpeechAudio { audio_content })),
        TaskDescriptor::ChainedPipeline { .. } => {
            let audio_content = required(response, 2, TaskType::Tts, request_id)?;
            let optional = |i: usize, t: TaskType| {
                response
                    .task(i)
                    .and_then(|r| r.output_for(t))
                    .map(str::to_string)
            };
            Ok(TaskOutput::Chained(ChainOutput {
                transcript: optional(0, TaskType::Asr),
                translation: optional(1, TaskType::Translation),
                audio: SpeechAudio { audio_content },
            }))
        }
    }
}
