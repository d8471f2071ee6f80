//! ulca-cli 命令行前端：翻译、语音识别、语音合成与语音翻译。
//!
//! Usage:
//!   ulca-cli languages
//!   ulca-cli translate --from en --to hi "hello"
//!   ulca-cli transcribe --lang hi --audio in.wav
//!   ulca-cli synthesize --lang hi --out out.wav "नमस्ते"
//!   ulca-cli speech-translate --from hi --to en --audio in.wav --out out.wav

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ulca_pipeline::service::LanguageSelector;
use ulca_pipeline::{
    AudioInput, IntoLanguage, PipelineClient, PipelineConfig, RetryPolicy, RetryingBackend,
    TaskBackend, TaskDescriptor, TaskOutput,
};

#[derive(Parser)]
#[command(name = "ulca-cli", version, about = "Translation, speech-to-text and text-to-speech over the ULCA pipeline API")]
struct Cli {
    /// YAML settings file; `ULCA_*` environment variables apply when absent.
    #[arg(long, global = true, env = "ULCA_CONFIG")]
    config: Option<PathBuf>,

    /// Retries for transient upstream failures (0 disables).
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List supported languages
    Languages,
    /// Translate text
    Translate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        text: String,
    },
    /// Transcribe an audio file
    Transcribe {
        #[arg(long)]
        lang: String,
        #[arg(long)]
        audio: PathBuf,
    },
    /// Synthesize speech and write the audio to a file
    Synthesize {
        #[arg(long)]
        lang: String,
        #[arg(long)]
        out: PathBuf,
        text: String,
    },
    /// Speech in one language to speech in another
    SpeechTranslate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        audio: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

/// Digits select by table index, anything else by code.
fn selector(arg: &str) -> LanguageSelector {
    match arg.parse::<i64>() {
        Ok(i) => LanguageSelector::Index(i),
        Err(_) => LanguageSelector::Code(arg.to_string()),
    }
}

fn build_backend(cli: &Cli) -> anyhow::Result<Arc<dyn TaskBackend>> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => PipelineConfig::from_env()?,
    };
    let client = PipelineClient::builder().config(config).build()?;
    let policy = RetryPolicy::exponential(cli.retries, Duration::from_millis(500), Duration::from_secs(8));
    Ok(Arc::new(RetryingBackend::new(client, policy)))
}

async fn execute(backend: &dyn TaskBackend, task: TaskDescriptor) -> anyhow::Result<TaskOutput> {
    backend.execute(&task).await.map_err(|e| {
        tracing::debug!(error = %e, "task failed");
        anyhow::anyhow!("[{}] {}", e.code().code(), e.public_message())
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ulca_pipeline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Languages = cli.command {
        for (index, code, name) in ulca_pipeline::language::languages() {
            println!("{index:>2}  {code:<4} {name}");
        }
        return Ok(());
    }

    let backend = build_backend(&cli)?;

    match &cli.command {
        Command::Languages => {}
        Command::Translate { from, to, text } => {
            let task = TaskDescriptor::Translation {
                source: (&selector(from)).into_language()?,
                target: (&selector(to)).into_language()?,
                text: text.clone(),
            };
            match execute(backend.as_ref(), task).await? {
                TaskOutput::Translation(t) => println!("{t}"),
                other => bail!("unexpected output: {other:?}"),
            }
        }
        Command::Transcribe { lang, audio } => {
            let bytes = std::fs::read(audio).with_context(|| format!("reading {}", audio.display()))?;
            let task = TaskDescriptor::SpeechToText {
                source: (&selector(lang)).into_language()?,
                audio: AudioInput::from_bytes(bytes),
            };
            match execute(backend.as_ref(), task).await? {
                TaskOutput::Transcript(t) => println!("{t}"),
                other => bail!("unexpected output: {other:?}"),
            }
        }
        Command::Synthesize { lang, out, text } => {
            let task = TaskDescriptor::TextToSpeech {
                language: (&selector(lang)).into_language()?,
                text: text.clone(),
            };
            match execute(backend.as_ref(), task).await? {
                TaskOutput::Speech(audio) => {
                    std::fs::write(out, audio.decode()?)
                        .with_context(|| format!("writing {}", out.display()))?;
                    eprintln!("wrote {}", out.display());
                }
                other => bail!("unexpected output: {other:?}"),
            }
        }
        Command::SpeechTranslate {
            from,
            to,
            audio,
            out,
        } => {
            let bytes = std::fs::read(audio).with_context(|| format!("reading {}", audio.display()))?;
            let task = TaskDescriptor::ChainedPipeline {
                source: (&selector(from)).into_language()?,
                target: (&selector(to)).into_language()?,
                audio: AudioInput::from_bytes(bytes),
            };
            match execute(backend.as_ref(), task).await? {
                TaskOutput::Chained(chain) => {
                    if let Some(t) = &chain.transcript {
                        println!("transcript:  {t}");
                    }
                    if let Some(t) = &chain.translation {
                        println!("translation: {t}");
                    }
                    std::fs::write(out, chain.audio.decode()?)
                        .with_context(|| format!("writing {}", out.display()))?;
                    eprintln!("wrote {}", out.display());
                }
                other => bail!("unexpected output: {other:?}"),
            }
        }
    }

    Ok(())
}
