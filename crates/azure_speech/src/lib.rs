//! Azure Speech - client for the Azure Cognitive Services speech REST APIs
//!
//! Provides:
//! - `SpeechClient` - authenticated entry point that keeps a bearer token fresh
//! - `TextToSpeech` - synthesis from plain text or SSML (`SynthesisClient`)
//! - `SpeechToText` - short-form recognition of streamed audio (`RecognitionClient`)
//! - `SsmlDocument` - typed SSML builder with an escaping serializer
//!
//! # Architecture
//!
//! The pipelines depend on the `TokenSource` port rather than on the token
//! supervisor itself, so every request reads the newest token without locking.
//!
//! # Example
//!
//! ```ignore
//! use azure_speech::{AudioFormat, CallOptions, Region, SpeechClient, SpeechConfig, TextToSpeech};
//!
//! let client = SpeechClient::connect(SpeechConfig::new(key, Region::WestEurope)).await?;
//!
//! let tts = client.text_to_speech().await?;
//! let audio = tts
//!     .synthesize("Hello, world!", "en-US-JennyNeural", AudioFormat::Riff24Khz16BitMonoPcm, CallOptions::new())
//!     .await?;
//!
//! client.shutdown().await;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ports;
pub mod region;
pub mod request;
pub mod ssml;
pub mod stt;
pub mod tts;
pub mod types;
pub mod voices;

pub use auth::{Credential, CredentialSupervisor, RefreshHandle, TokenIssuer};
pub use client::SpeechClient;
pub use config::{Endpoints, SpeechConfig};
pub use error::{AuthError, RecognitionError, SpeechError, StatusError};
pub use ports::{SpeechToText, TextToSpeech, TokenSource};
pub use region::Region;
pub use request::CallOptions;
pub use ssml::{
    Emphasis, EmphasisLevel, ExpressAs, Lang, Prosody, SsmlDocument, SsmlNode, Voice, VoiceEffect,
};
pub use stt::RecognitionClient;
pub use tts::SynthesisClient;
pub use types::{
    AudioContainer, AudioData, AudioFormat, AudioInput, Gender, Profanity, RecognitionOptions,
    RecognitionResult, RecognitionStatus, VoiceType,
};
pub use tokio_util::sync::CancellationToken;
pub use voices::{VoiceDirectory, VoiceEntry};
