//! Text-to-speech pipeline
//!
//! Implements [`TextToSpeech`] against the Azure `cognitiveservices/v1`
//! endpoint. The voice catalog is downloaded once by [`SynthesisClient::connect`]
//! and every synthesis call picks up the latest bearer token from the
//! [`TokenSource`] at the moment it is sent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::config::Endpoints;
use crate::error::{SpeechError, StatusError};
use crate::ports::{TextToSpeech, TokenSource};
use crate::request::{CallOptions, bounded};
use crate::ssml::{SsmlDocument, Voice};
use crate::types::{AudioData, AudioFormat};
use crate::voices::VoiceDirectory;

/// Header selecting the audio encoding of a synthesis response
pub const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";

/// Content type of every synthesis request body
pub const SSML_CONTENT_TYPE: &str = "application/ssml+xml";

/// Synthesis client bound to one voice directory snapshot
pub struct SynthesisClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    synthesis_url: String,
    directory: VoiceDirectory,
    default_timeout: Duration,
}

impl std::fmt::Debug for SynthesisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisClient")
            .field("synthesis_url", &self.synthesis_url)
            .field("voices", &self.directory.len())
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl SynthesisClient {
    /// Download the voice catalog and build a client around it
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::VoiceCatalog` if the catalog endpoint answers
    /// with anything but 200, `SpeechError::InvalidResponse` if the body is not
    /// a voice list, or a transport, timeout or cancellation error.
    #[instrument(skip(http, tokens, options), fields(url = %endpoints.voices))]
    pub async fn connect(
        http: Client,
        tokens: Arc<dyn TokenSource>,
        endpoints: &Endpoints,
        default_timeout: Duration,
        options: CallOptions,
    ) -> Result<Self, SpeechError> {
        let fetch = async {
            let response = http
                .get(&endpoints.voices)
                .header(AUTHORIZATION, tokens.current().bearer())
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(SpeechError::VoiceCatalog(StatusError::from_status(
                    status.as_u16(),
                )));
            }

            let body = response.bytes().await?;
            VoiceDirectory::from_json(&body)
        };

        let directory = bounded(&options, default_timeout, fetch).await?;
        debug!(voices = directory.len(), "Loaded voice catalog");

        Ok(Self::with_directory(
            http,
            tokens,
            endpoints.synthesis.clone(),
            directory,
            default_timeout,
        ))
    }

    /// Build a client around an already loaded directory
    #[must_use]
    pub fn with_directory(
        http: Client,
        tokens: Arc<dyn TokenSource>,
        synthesis_url: String,
        directory: VoiceDirectory,
        default_timeout: Duration,
    ) -> Self {
        Self {
            http,
            tokens,
            synthesis_url,
            directory,
            default_timeout,
        }
    }
}

#[async_trait]
impl TextToSpeech for SynthesisClient {
    #[instrument(skip(self, text, format, options), fields(text_len = text.len(), format = %format))]
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError> {
        let entry = self.directory.lookup(voice)?;

        let document = SsmlDocument::new()
            .with_lang(entry.locale.as_str())
            .child(Voice::new(entry.short_name.as_str()).text(text));

        self.synthesize_ssml(&document, format, options).await
    }

    async fn synthesize_ssml(
        &self,
        document: &SsmlDocument,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError> {
        self.synthesize_raw(Bytes::from(document.to_bytes()), format, options)
            .await
    }

    #[instrument(skip(self, ssml, format, options), fields(ssml_len = ssml.len(), format = %format))]
    async fn synthesize_raw(
        &self,
        ssml: Bytes,
        format: AudioFormat,
        options: CallOptions,
    ) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech");

        let credential = self.tokens.current();
        let request = async {
            let response = self
                .http
                .post(&self.synthesis_url)
                .header(AUTHORIZATION, credential.bearer())
                .header(CONTENT_TYPE, SSML_CONTENT_TYPE)
                .header(OUTPUT_FORMAT_HEADER, format.wire_token())
                .body(ssml)
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(SpeechError::Synthesis(StatusError::from_status(
                    status.as_u16(),
                )));
            }

            Ok(response.bytes().await?)
        };

        let audio = bounded(&options, self.default_timeout, request).await?;
        debug!(audio_size = audio.len(), "Speech synthesis complete");

        Ok(AudioData::new(audio, format))
    }

    fn voices(&self) -> &VoiceDirectory {
        &self.directory
    }
}
