//! Port definitions for speech processing
//!
//! Traits at the seams between the credential supervisor and the request
//! pipelines, and the operations the pipelines expose.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::auth::Credential;
use crate::error::SpeechError;
use crate::request::CallOptions;
use crate::ssml::SsmlDocument;
use crate::types::{AudioData, AudioFormat, AudioInput, RecognitionOptions, RecognitionResult};
use crate::voices::VoiceDirectory;

/// Source of the bearer token attached to every service call
///
/// Reads never block and never observe a partially written credential.
pub trait TokenSource: Send + Sync + Debug {
    /// Latest successfully fetched credential
    fn current(&self) -> Arc<Credential>;
}

/// Port for Text-to-Speech (TTS) implementations
///
/// # Example
///
/// ```ignore
/// use azure_speech::{AudioFormat, CallOptions, TextToSpeech};
///
/// let audio = tts
///     .synthesize("Hello!", "en-US-JennyNeural", AudioFormat::Audio16Khz32KBitrateMonoMp3, CallOptions::new())
///     .await?;
/// tokio::fs::write(audio.filename("hello"), audio.data()).await?;
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Speak plain text with a catalog voice
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::VoiceNotFound` without any network call when
    /// `voice` is not in the directory; otherwise as [`TextToSpeech::synthesize_raw`].
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError>;

    /// Speak a caller-built SSML document; voice names are not checked
    async fn synthesize_ssml(
        &self,
        document: &SsmlDocument,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError>;

    /// Submit SSML bytes verbatim
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Synthesis` classified by HTTP status, or a
    /// transport, timeout or cancellation error.
    async fn synthesize_raw(
        &self,
        ssml: Bytes,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError>;

    /// Voices known to this client
    fn voices(&self) -> &VoiceDirectory;
}

/// Port for Speech-to-Text (STT) implementations
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Recognize up to 60 seconds of audio
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::UnsupportedFormat` without any network call unless
    /// `format` is 16kHz RIFF PCM or 16kHz OGG Opus.
    async fn recognize_short(
        &self,
        audio: AudioInput,
        format: AudioFormat,
        language: &str,
        recognition: RecognitionOptions,
        options: CallOptions,
    ) -> Result<RecognitionResult, SpeechError>;
}
