//! Speech client errors

use thiserror::Error;

use crate::types::AudioFormat;

/// Errors raised while fetching a bearer token from the issuer endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Issuer answered with something other than 200
    #[error("token endpoint returned HTTP {0}")]
    Status(u16),

    /// Connection or protocol failure
    #[error("token request failed: {0}")]
    Transport(String),

    /// Token fetch exceeded its deadline
    #[error("token request timed out after {0}ms")]
    Timeout(u64),

    /// Issuer answered 200 with an empty body
    #[error("token endpoint returned an empty token")]
    EmptyToken,
}

/// Classification of a non-200 status returned by the speech service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error(
        "400 - a required parameter is missing, empty, or null, or a parameter value is invalid (a common cause is a header that is too long)"
    )]
    BadRequest,

    #[error(
        "401 - the request is not authorized; check that the subscription key or token is valid and in the correct region"
    )]
    Unauthorized,

    #[error("413 - the SSML input is too long")]
    PayloadTooLarge,

    #[error("415 - wrong Content-Type; SSML requests must use application/ssml+xml")]
    UnsupportedMediaType,

    #[error("429 - the quota or request rate allowed for the subscription was exceeded")]
    RateLimited,

    #[error("502 - network or server-side issue, possibly caused by invalid headers")]
    UpstreamGateway,

    #[error("{0} - received unexpected HTTP status code")]
    UnexpectedStatus(u16),
}

impl StatusError {
    /// Classify a non-success HTTP status code
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            413 => Self::PayloadTooLarge,
            415 => Self::UnsupportedMediaType,
            429 => Self::RateLimited,
            502 => Self::UpstreamGateway,
            other => Self::UnexpectedStatus(other),
        }
    }

    /// The HTTP status code this error was built from
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::PayloadTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::RateLimited => 429,
            Self::UpstreamGateway => 502,
            Self::UnexpectedStatus(code) => *code,
        }
    }
}

/// Failures specific to short-form recognition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionError {
    /// Service answered with a non-200 status
    #[error("recognition request failed: {0}")]
    RequestFailed(StatusError),

    /// 200 response whose body is not a recognition result
    #[error("failed to decode recognition response: {0}")]
    Decode(String),
}

/// Errors that can occur while talking to the speech service
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Token fetch failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Voice name is not present in the voice directory
    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    /// Synthesis endpoint rejected the request
    #[error("Synthesis failed: {0}")]
    Synthesis(StatusError),

    /// Recognition only accepts 16kHz PCM/RIFF and 16kHz Opus/OGG
    #[error("Audio format {0} is not supported for recognition")]
    UnsupportedFormat(AudioFormat),

    /// Recognition failed
    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    /// Voice catalog endpoint rejected the request
    #[error("Voice catalog request failed: {0}")]
    VoiceCatalog(StatusError),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Connection or protocol failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Call exceeded its deadline
    #[error("Speech request timed out after {0}ms")]
    Timeout(u64),

    /// Caller cancelled the call
    #[error("Speech request cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
