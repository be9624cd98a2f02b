//! Azure speech CLI
//!
//! Command-line interface for listing voices, synthesizing speech and
//! recognizing short audio clips.

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use azure_speech::{
    AudioData, AudioFormat, AudioInput, CallOptions, Profanity, RecognitionOptions, Region,
    SpeechClient, SpeechConfig, SpeechToText, TextToSpeech,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Azure speech CLI
#[derive(Parser)]
#[command(name = "azure-speech")]
#[command(author, version, about = "Azure Cognitive Services speech client", long_about = None)]
struct Cli {
    /// Subscription key (falls back to `azure_speech.toml` / `AZURE_SPEECH_*` when unset)
    #[arg(long, env = "AZUREKEY", global = true, hide_env_values = true)]
    key: Option<String>,

    /// Service region, e.g. westus2 or WestEurope (overrides the config file)
    #[arg(long, env = "AZUREREGION", global = true)]
    region: Option<Region>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog voices
    Voices {
        /// Only show voices for this locale, e.g. en-US
        #[arg(short, long)]
        locale: Option<String>,
    },

    /// Speak plain text with a catalog voice
    ///
    /// Example: azure-speech synthesize "Hello there" --voice en-GB-SoniaNeural
    Synthesize {
        /// Text to speak
        text: String,

        /// Voice short name
        #[arg(long, default_value = "en-US-JennyNeural")]
        voice: String,

        /// Output format wire token
        #[arg(short, long, default_value = "riff-24khz-16bit-mono-pcm")]
        format: AudioFormat,

        /// Output file (defaults to `output.<ext>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Submit an SSML file as-is
    Ssml {
        /// Path to the SSML document
        file: PathBuf,

        /// Output format wire token
        #[arg(short, long, default_value = "riff-24khz-16bit-mono-pcm")]
        format: AudioFormat,

        /// Output file (defaults to `output.<ext>`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Recognize up to 60 seconds of 16kHz audio
    Recognize {
        /// Path to a 16kHz mono WAV or OGG/Opus file
        file: PathBuf,

        /// Recognition language
        #[arg(short, long, default_value = "en-US")]
        language: String,

        /// Input format wire token
        #[arg(short, long, default_value = "riff-16khz-16bit-mono-pcm")]
        format: AudioFormat,

        /// Profanity handling: masked, removed or raw
        #[arg(long, default_value = "masked")]
        profanity: Profanity,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn speech_config(key: Option<String>, region: Option<Region>) -> anyhow::Result<SpeechConfig> {
    let config = match key {
        Some(key) => SpeechConfig::new(key, region.unwrap_or_default()),
        None => SpeechConfig::load()
            .context("no --key given and no usable azure_speech config found")?,
    };
    Ok(with_region(config, region))
}

/// Apply a region given on the command line over the loaded one
fn with_region(mut config: SpeechConfig, region: Option<Region>) -> SpeechConfig {
    if let Some(region) = region {
        config.region = region;
    }
    config
}

fn output_path(output: Option<PathBuf>, audio: &AudioData) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(audio.filename("output")))
}

async fn write_audio(path: &Path, audio: &AudioData) -> anyhow::Result<()> {
    tokio::fs::write(path, audio.data())
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "🔊 Wrote {} bytes of {} to {}",
        audio.size_bytes(),
        audio.format(),
        path.display()
    );
    Ok(())
}

/// Read an SSML file, rejecting blank input before it reaches the service
async fn read_ssml(path: &Path) -> anyhow::Result<Vec<u8>> {
    let ssml = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    anyhow::ensure!(
        !ssml.iter().all(u8::is_ascii_whitespace),
        "{} is empty",
        path.display()
    );
    Ok(ssml)
}

async fn run(client: &SpeechClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Voices { locale } => {
            let tts = client.text_to_speech().await?;
            let voices = tts.voices();

            let mut listed: Vec<_> = match &locale {
                Some(locale) => voices.by_locale(locale),
                None => voices.iter().collect(),
            };
            listed.sort_by(|a, b| a.short_name.cmp(&b.short_name));

            println!("🗣️  {} voice(s):", listed.len());
            for voice in listed {
                println!(
                    "   {:<40} {:<8} {:<7} {:?}",
                    voice.short_name,
                    voice.locale,
                    voice.gender.to_string(),
                    voice.voice_type
                );
            }
        },

        Commands::Synthesize {
            text,
            voice,
            format,
            output,
        } => {
            let tts = client.text_to_speech().await?;
            let audio = tts
                .synthesize(&text, &voice, format, CallOptions::new())
                .await?;
            write_audio(&output_path(output, &audio), &audio).await?;
        },

        Commands::Ssml {
            file,
            format,
            output,
        } => {
            let ssml = read_ssml(&file).await?;
            let tts = client.text_to_speech().await?;
            let audio = tts
                .synthesize_raw(ssml.into(), format, CallOptions::new())
                .await?;
            write_audio(&output_path(output, &audio), &audio).await?;
        },

        Commands::Recognize {
            file,
            language,
            format,
            profanity,
        } => {
            let audio = tokio::fs::File::open(&file)
                .await
                .with_context(|| format!("failed to open {}", file.display()))?;

            let result = client
                .speech_to_text()
                .recognize_short(
                    AudioInput::from_reader(audio),
                    format,
                    &language,
                    RecognitionOptions::default().with_profanity(profanity),
                    CallOptions::new(),
                )
                .await?;

            println!("📝 {:?}: {}", result.status, result.display_text);
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = log_filter_from_verbosity(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = speech_config(cli.key, cli.region)?;
    let client = SpeechClient::connect(config).await?;
    info!("Connected to speech service");

    let outcome = run(&client, cli.command).await;
    client.shutdown().await;
    outcome
}
