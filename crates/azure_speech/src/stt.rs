//! Short-form speech recognition
//!
//! Streams up to 60 seconds of audio to the conversation recognition
//! endpoint in chunked transfer encoding and decodes the `simple` result.
//! Only 16kHz PCM in a RIFF container and 16kHz Opus in an OGG container are
//! accepted; anything else is rejected before a connection is opened.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, EXPECT};
use reqwest::{Body, Client, StatusCode};
use tokio_util::io::ReaderStream;
use tracing::{debug, instrument};

use crate::error::{RecognitionError, SpeechError, StatusError};
use crate::ports::{SpeechToText, TokenSource};
use crate::request::{CallOptions, bounded};
use crate::types::{AudioFormat, AudioInput, RecognitionOptions, RecognitionResult};

/// Recognition client sharing the connection pool and token of its parent
pub struct RecognitionClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
    recognition_url: String,
    default_timeout: Duration,
}

impl std::fmt::Debug for RecognitionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionClient")
            .field("recognition_url", &self.recognition_url)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl RecognitionClient {
    #[must_use]
    pub fn new(
        http: Client,
        tokens: Arc<dyn TokenSource>,
        recognition_url: String,
        default_timeout: Duration,
    ) -> Self {
        Self {
            http,
            tokens,
            recognition_url,
            default_timeout,
        }
    }
}

#[async_trait]
impl SpeechToText for RecognitionClient {
    #[instrument(
        skip(self, audio, format, recognition, options),
        fields(format = %format, profanity = recognition.profanity.as_str())
    )]
    async fn recognize_short(
        &self,
        audio: AudioInput,
        format: AudioFormat,
        language: &str,
        recognition: RecognitionOptions,
        options: CallOptions,
    ) -> Result<RecognitionResult, SpeechError> {
        let content_type = format
            .recognition_content_type()
            .ok_or(SpeechError::UnsupportedFormat(format))?;

        debug!("Recognizing speech");

        let credential = self.tokens.current();
        let request = async {
            let response = self
                .http
                .post(&self.recognition_url)
                .query(&[
                    ("language", language),
                    ("format", "simple"),
                    ("profanity", recognition.profanity.as_str()),
                    ("cid", recognition.cid.as_str()),
                ])
                .header(AUTHORIZATION, credential.bearer())
                .header(ACCEPT, "application/json")
                .header(EXPECT, expect_header(recognition.expect))
                .header(CONTENT_TYPE, content_type)
                .body(Body::wrap_stream(ReaderStream::new(audio.into_reader())))
                .send()
                .await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(SpeechError::Recognition(RecognitionError::RequestFailed(
                    StatusError::from_status(status.as_u16()),
                )));
            }

            let body = response.bytes().await?;
            serde_json::from_slice::<RecognitionResult>(&body)
                .map_err(|e| SpeechError::Recognition(RecognitionError::Decode(e.to_string())))
        };

        let result = bounded(&options, self.default_timeout, request).await?;
        debug!(status = ?result.status, "Speech recognition complete");

        Ok(result)
    }
}

/// `Expect` header value for a recognition upload, e.g. `100-continue`
fn expect_header(expect: u32) -> String {
    format!("{expect}-continue")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credential;
    use crate::types::{Profanity, RecognitionStatus};
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct StaticToken(Arc<Credential>);

    impl TokenSource for StaticToken {
        fn current(&self) -> Arc<Credential> {
            Arc::clone(&self.0)
        }
    }

    fn client(server: &MockServer) -> RecognitionClient {
        RecognitionClient::new(
            Client::new(),
            Arc::new(StaticToken(Arc::new(Credential::new("TOKEN123")))),
            format!("{}/speech/recognition/conversation/cognitiveservices/v1", server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn uploads_audio_and_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/speech/recognition/conversation/cognitiveservices/v1"))
            .and(query_param("language", "en-US"))
            .and(query_param("format", "simple"))
            .and(query_param("profanity", "raw"))
            .and(query_param("cid", "model-7"))
            .and(header("Authorization", "Bearer TOKEN123"))
            .and(header("Accept", "application/json"))
            .and(header("Content-Type", "audio/ogg; codecs=\"opus\""))
            .and(header("Expect", "100-continue"))
            .and(body_bytes(b"OggS-audio".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"RecognitionStatus":"Success","DisplayText":"Remind me to buy 5 pencils.","Offset":1800000,"Duration":32100000}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server)
            .recognize_short(
                AudioInput::from_bytes(&b"OggS-audio"[..]),
                AudioFormat::Ogg16Khz16BitMonoOpus,
                "en-US",
                RecognitionOptions::default()
                    .with_profanity(Profanity::Raw)
                    .with_cid("model-7")
                    .with_expect(100),
                CallOptions::new(),
            )
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.display_text, "Remind me to buy 5 pencils.");
        assert_eq!(result.offset, 1_800_000);
        assert_eq!(result.duration, 32_100_000);
    }

    #[tokio::test]
    async fn no_match_is_a_result_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("profanity", "masked"))
            .and(query_param("cid", ""))
            .and(header("Expect", "100-continue"))
            .and(header("Content-Type", "audio/wav; codecs=\"audio/pcm\"; samplerate=16000"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"RecognitionStatus":"NoMatch","Offset":0,"Duration":0}"#),
            )
            .mount(&server)
            .await;

        let result = client(&server)
            .recognize_short(
                AudioInput::from_bytes(vec![0u8; 64]),
                AudioFormat::Riff16Khz16BitMonoPcm,
                "de-DE",
                RecognitionOptions::default(),
                CallOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.status, RecognitionStatus::NoMatch);
        assert!(result.display_text.is_empty());
    }

    #[test]
    fn expect_header_carries_configured_code() {
        assert_eq!(expect_header(RecognitionOptions::default().expect), "100-continue");
        assert_eq!(
            expect_header(RecognitionOptions::default().with_expect(250).expect),
            "250-continue"
        );
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = client(&server)
            .recognize_short(
                AudioInput::from_bytes(vec![0u8; 4]),
                AudioFormat::Riff24Khz16BitMonoPcm,
                "en-US",
                RecognitionOptions::default(),
                CallOptions::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(SpeechError::UnsupportedFormat(AudioFormat::Riff24Khz16BitMonoPcm))
        ));
    }

    #[tokio::test]
    async fn non_200_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(415))
            .mount(&server)
            .await;

        let result = client(&server)
            .recognize_short(
                AudioInput::from_bytes(vec![0u8; 4]),
                AudioFormat::Riff16Khz16BitMonoPcm,
                "en-US",
                RecognitionOptions::default(),
                CallOptions::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(SpeechError::Recognition(RecognitionError::RequestFailed(
                StatusError::UnsupportedMediaType
            )))
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server)
            .recognize_short(
                AudioInput::from_bytes(vec![0u8; 4]),
                AudioFormat::Riff16Khz16BitMonoPcm,
                "en-US",
                RecognitionOptions::default(),
                CallOptions::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(SpeechError::Recognition(RecognitionError::Decode(_)))
        ));
    }
}
