//! Types for speech processing
//!
//! Audio output formats, audio payload containers, voice metadata enums and
//! recognition results.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::io::AsyncRead;

/// Container an output format is wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioContainer {
    /// Headerless samples
    Raw,
    /// RIFF/WAVE
    Riff,
    Webm,
    Ogg,
    Mp3,
}

impl AudioContainer {
    /// File extension hint for this container
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Riff => "wav",
            Self::Webm => "webm",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
        }
    }
}

/// Audio formats the synthesis endpoint can produce
///
/// Each variant carries its wire token, sample rate and container in
/// [`AudioFormat::descriptor`], so there is no separate lookup table to drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Raw16Khz16BitMonoPcm,
    Raw24Khz16BitMonoPcm,
    Raw48Khz16BitMonoPcm,
    Raw8Khz8BitMonoMulaw,
    Raw8Khz8BitMonoAlaw,
    Audio16Khz32KBitrateMonoMp3,
    Audio16Khz128KBitrateMonoMp3,
    Audio24Khz96KBitrateMonoMp3,
    Audio48Khz96KBitrateMonoMp3,
    Raw16Khz16BitMonoTrueSilk,
    Webm16Khz16BitMonoOpus,
    Ogg16Khz16BitMonoOpus,
    Ogg48Khz16BitMonoOpus,
    Riff16Khz16BitMonoPcm,
    Riff24Khz16BitMonoPcm,
    Riff48Khz16BitMonoPcm,
    Riff8Khz8BitMonoMulaw,
    Riff8Khz8BitMonoAlaw,
    Audio16Khz64KBitrateMonoMp3,
    Audio24Khz48KBitrateMonoMp3,
    Audio24Khz160KBitrateMonoMp3,
    Audio48Khz192KBitrateMonoMp3,
    Raw24Khz16BitMonoTrueSilk,
    Webm24Khz16BitMonoOpus,
    Ogg24Khz16BitMonoOpus,
}

/// Constant data attached to an [`AudioFormat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Value of the `X-Microsoft-OutputFormat` header
    pub token: &'static str,
    pub sample_rate_hz: u32,
    pub container: AudioContainer,
}

const fn descriptor(
    token: &'static str,
    sample_rate_hz: u32,
    container: AudioContainer,
) -> FormatDescriptor {
    FormatDescriptor {
        token,
        sample_rate_hz,
        container,
    }
}

impl AudioFormat {
    /// Every output format, in service documentation order
    pub const ALL: [Self; 25] = [
        Self::Raw16Khz16BitMonoPcm,
        Self::Raw24Khz16BitMonoPcm,
        Self::Raw48Khz16BitMonoPcm,
        Self::Raw8Khz8BitMonoMulaw,
        Self::Raw8Khz8BitMonoAlaw,
        Self::Audio16Khz32KBitrateMonoMp3,
        Self::Audio16Khz128KBitrateMonoMp3,
        Self::Audio24Khz96KBitrateMonoMp3,
        Self::Audio48Khz96KBitrateMonoMp3,
        Self::Raw16Khz16BitMonoTrueSilk,
        Self::Webm16Khz16BitMonoOpus,
        Self::Ogg16Khz16BitMonoOpus,
        Self::Ogg48Khz16BitMonoOpus,
        Self::Riff16Khz16BitMonoPcm,
        Self::Riff24Khz16BitMonoPcm,
        Self::Riff48Khz16BitMonoPcm,
        Self::Riff8Khz8BitMonoMulaw,
        Self::Riff8Khz8BitMonoAlaw,
        Self::Audio16Khz64KBitrateMonoMp3,
        Self::Audio24Khz48KBitrateMonoMp3,
        Self::Audio24Khz160KBitrateMonoMp3,
        Self::Audio48Khz192KBitrateMonoMp3,
        Self::Raw24Khz16BitMonoTrueSilk,
        Self::Webm24Khz16BitMonoOpus,
        Self::Ogg24Khz16BitMonoOpus,
    ];

    /// Wire token, sample rate and container for this format
    #[must_use]
    pub const fn descriptor(&self) -> FormatDescriptor {
        use AudioContainer::{Mp3, Ogg, Raw, Riff, Webm};

        match self {
            Self::Raw16Khz16BitMonoPcm => descriptor("raw-16khz-16bit-mono-pcm", 16_000, Raw),
            Self::Raw24Khz16BitMonoPcm => descriptor("raw-24khz-16bit-mono-pcm", 24_000, Raw),
            Self::Raw48Khz16BitMonoPcm => descriptor("raw-48khz-16bit-mono-pcm", 48_000, Raw),
            Self::Raw8Khz8BitMonoMulaw => descriptor("raw-8khz-8bit-mono-mulaw", 8_000, Raw),
            Self::Raw8Khz8BitMonoAlaw => descriptor("raw-8khz-8bit-mono-alaw", 8_000, Raw),
            Self::Audio16Khz32KBitrateMonoMp3 => {
                descriptor("audio-16khz-32kbitrate-mono-mp3", 16_000, Mp3)
            },
            Self::Audio16Khz128KBitrateMonoMp3 => {
                descriptor("audio-16khz-128kbitrate-mono-mp3", 16_000, Mp3)
            },
            Self::Audio24Khz96KBitrateMonoMp3 => {
                descriptor("audio-24khz-96kbitrate-mono-mp3", 24_000, Mp3)
            },
            Self::Audio48Khz96KBitrateMonoMp3 => {
                descriptor("audio-48khz-96kbitrate-mono-mp3", 48_000, Mp3)
            },
            Self::Raw16Khz16BitMonoTrueSilk => {
                descriptor("raw-16khz-16bit-mono-truesilk", 16_000, Raw)
            },
            Self::Webm16Khz16BitMonoOpus => descriptor("webm-16khz-16bit-mono-opus", 16_000, Webm),
            Self::Ogg16Khz16BitMonoOpus => descriptor("ogg-16khz-16bit-mono-opus", 16_000, Ogg),
            Self::Ogg48Khz16BitMonoOpus => descriptor("ogg-48khz-16bit-mono-opus", 48_000, Ogg),
            Self::Riff16Khz16BitMonoPcm => descriptor("riff-16khz-16bit-mono-pcm", 16_000, Riff),
            Self::Riff24Khz16BitMonoPcm => descriptor("riff-24khz-16bit-mono-pcm", 24_000, Riff),
            Self::Riff48Khz16BitMonoPcm => descriptor("riff-48khz-16bit-mono-pcm", 48_000, Riff),
            Self::Riff8Khz8BitMonoMulaw => descriptor("riff-8khz-8bit-mono-mulaw", 8_000, Riff),
            Self::Riff8Khz8BitMonoAlaw => descriptor("riff-8khz-8bit-mono-alaw", 8_000, Riff),
            Self::Audio16Khz64KBitrateMonoMp3 => {
                descriptor("audio-16khz-64kbitrate-mono-mp3", 16_000, Mp3)
            },
            Self::Audio24Khz48KBitrateMonoMp3 => {
                descriptor("audio-24khz-48kbitrate-mono-mp3", 24_000, Mp3)
            },
            Self::Audio24Khz160KBitrateMonoMp3 => {
                descriptor("audio-24khz-160kbitrate-mono-mp3", 24_000, Mp3)
            },
            Self::Audio48Khz192KBitrateMonoMp3 => {
                descriptor("audio-48khz-192kbitrate-mono-mp3", 48_000, Mp3)
            },
            Self::Raw24Khz16BitMonoTrueSilk => {
                descriptor("raw-24khz-16bit-mono-truesilk", 24_000, Raw)
            },
            Self::Webm24Khz16BitMonoOpus => descriptor("webm-24khz-16bit-mono-opus", 24_000, Webm),
            Self::Ogg24Khz16BitMonoOpus => descriptor("ogg-24khz-16bit-mono-opus", 24_000, Ogg),
        }
    }

    /// Value sent in the `X-Microsoft-OutputFormat` header
    #[must_use]
    pub const fn wire_token(&self) -> &'static str {
        self.descriptor().token
    }

    /// File extension hint for audio in this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        self.descriptor().container.extension()
    }

    #[must_use]
    pub const fn sample_rate_hz(&self) -> u32 {
        self.descriptor().sample_rate_hz
    }

    #[must_use]
    pub const fn container(&self) -> AudioContainer {
        self.descriptor().container
    }

    /// `Content-Type` for short-form recognition uploads, `None` if recognition rejects the format
    #[must_use]
    pub const fn recognition_content_type(&self) -> Option<&'static str> {
        match self {
            Self::Riff16Khz16BitMonoPcm => Some("audio/wav; codecs=\"audio/pcm\"; samplerate=16000"),
            Self::Ogg16Khz16BitMonoOpus => Some("audio/ogg; codecs=\"opus\""),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_token())
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.wire_token() == wanted)
            .ok_or_else(|| format!("Unknown audio format: {s}"))
    }
}

impl Serialize for AudioFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_token())
    }
}

impl<'de> Deserialize<'de> for AudioFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Synthesized audio returned by the TTS endpoint
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Bytes,
    format: AudioFormat,
}

impl AudioData {
    #[must_use]
    pub const fn new(data: Bytes, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Generate a filename with appropriate extension
    #[must_use]
    pub fn filename(&self, base: &str) -> String {
        format!("{}.{}", base, self.format.extension())
    }
}

/// Audio uploaded for recognition, streamed without a declared length
pub struct AudioInput {
    reader: Box<dyn AsyncRead + Send + Sync + Unpin>,
}

impl AudioInput {
    /// Stream audio already held in memory
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::from_reader(Cursor::new(data.into()))
    }

    /// Stream audio from any async reader, e.g. a `tokio::fs::File`
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + Unpin + 'static,
    {
        Self {
            reader: Box::new(reader),
        }
    }

    pub(crate) fn into_reader(self) -> Box<dyn AsyncRead + Send + Sync + Unpin> {
        self.reader
    }
}

impl fmt::Debug for AudioInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioInput").finish_non_exhaustive()
    }
}

/// Voice gender as reported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => f.write_str("Male"),
            Self::Female => f.write_str("Female"),
            Self::Neutral => f.write_str("Neutral"),
        }
    }
}

/// Voice generation technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoiceType {
    Standard,
    Neural,
    #[serde(rename = "NeuralHD")]
    NeuralHd,
    Neutral,
}

/// Outcome reported by short-form recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionStatus {
    Success,
    NoMatch,
    InitialSilenceTimeout,
    BabbleTimeout,
    Error,
}

/// Simple-format recognition result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    #[serde(rename = "RecognitionStatus")]
    pub status: RecognitionStatus,
    #[serde(rename = "DisplayText", default)]
    pub display_text: String,
    /// Start of the recognized speech, in 100-nanosecond units
    #[serde(rename = "Offset", default)]
    pub offset: u64,
    /// Length of the recognized speech, in 100-nanosecond units
    #[serde(rename = "Duration", default)]
    pub duration: u64,
}

impl RecognitionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RecognitionStatus::Success
    }
}

/// Profanity handling for recognition output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profanity {
    /// Replace profanity with asterisks
    #[default]
    Masked,
    Removed,
    Raw,
}

impl Profanity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Masked => "masked",
            Self::Removed => "removed",
            Self::Raw => "raw",
        }
    }
}

impl FromStr for Profanity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "masked" => Ok(Self::Masked),
            "removed" => Ok(Self::Removed),
            "raw" => Ok(Self::Raw),
            _ => Err(format!(
                "Invalid profanity option: {s}. Use 'masked', 'removed' or 'raw'"
            )),
        }
    }
}

/// Per-request knobs for short-form recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub profanity: Profanity,
    /// Custom model endpoint id, empty for the base model
    pub cid: String,
    /// Status code announced in the `Expect: <n>-continue` header
    pub expect: u32,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            profanity: Profanity::Masked,
            cid: String::new(),
            expect: 100,
        }
    }
}

impl RecognitionOptions {
    #[must_use]
    pub const fn with_profanity(mut self, profanity: Profanity) -> Self {
        self.profanity = profanity;
        self
    }

    #[must_use]
    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = cid.into();
        self
    }

    #[must_use]
    pub const fn with_expect(mut self, expect: u32) -> Self {
        self.expect = expect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn there_are_25_distinct_wire_tokens() {
        let tokens: std::collections::HashSet<_> =
            AudioFormat::ALL.iter().map(AudioFormat::wire_token).collect();
        assert_eq!(tokens.len(), 25);
    }

    #[test]
    fn mp3_format_descriptor() {
        let format = AudioFormat::Audio16Khz32KBitrateMonoMp3;
        assert_eq!(format.wire_token(), "audio-16khz-32kbitrate-mono-mp3");
        assert_eq!(format.extension(), "mp3");
        assert_eq!(format.sample_rate_hz(), 16_000);
        assert_eq!(format.container(), AudioContainer::Mp3);
    }

    #[test]
    fn extensions_follow_container() {
        assert_eq!(AudioFormat::Riff8Khz8BitMonoAlaw.extension(), "wav");
        assert_eq!(AudioFormat::Raw24Khz16BitMonoTrueSilk.extension(), "raw");
        assert_eq!(AudioFormat::Webm24Khz16BitMonoOpus.extension(), "webm");
        assert_eq!(AudioFormat::Ogg48Khz16BitMonoOpus.extension(), "ogg");
    }

    #[test]
    fn only_two_formats_are_recognizable() {
        let accepted: Vec<_> = AudioFormat::ALL
            .into_iter()
            .filter(|f| f.recognition_content_type().is_some())
            .collect();
        assert_eq!(
            accepted,
            vec![
                AudioFormat::Ogg16Khz16BitMonoOpus,
                AudioFormat::Riff16Khz16BitMonoPcm
            ]
        );
    }

    #[test]
    fn audio_format_serde_uses_wire_token() {
        let json = serde_json::to_string(&AudioFormat::Ogg24Khz16BitMonoOpus).unwrap();
        assert_eq!(json, "\"ogg-24khz-16bit-mono-opus\"");
        let back: AudioFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AudioFormat::Ogg24Khz16BitMonoOpus);
        assert!(serde_json::from_str::<AudioFormat>("\"flac\"").is_err());
    }

    #[test]
    fn audio_data_filename() {
        let audio = AudioData::new(
            Bytes::from_static(&[1, 2, 3]),
            AudioFormat::Riff24Khz16BitMonoPcm,
        );
        assert_eq!(audio.filename("greeting"), "greeting.wav");
        assert_eq!(audio.size_bytes(), 3);
        assert!(!audio.is_empty());
    }

    #[test]
    fn recognition_result_decodes_service_json() {
        let json = r#"{"RecognitionStatus":"Success","DisplayText":"Hello world.","Offset":1800000,"Duration":12300000}"#;
        let result: RecognitionResult = serde_json::from_str(json).unwrap();
        assert!(result.is_success());
        assert_eq!(result.display_text, "Hello world.");
        assert_eq!(result.offset, 1_800_000);
        assert_eq!(result.duration, 12_300_000);
    }

    #[test]
    fn no_match_result_defaults_missing_fields() {
        let result: RecognitionResult =
            serde_json::from_str(r#"{"RecognitionStatus":"NoMatch"}"#).unwrap();
        assert_eq!(result.status, RecognitionStatus::NoMatch);
        assert!(result.display_text.is_empty());
        assert_eq!(result.duration, 0);
    }

    #[test]
    fn voice_type_accepts_neural_hd() {
        let vt: VoiceType = serde_json::from_str("\"NeuralHD\"").unwrap();
        assert_eq!(vt, VoiceType::NeuralHd);
    }

    #[test]
    fn recognition_options_defaults_and_builders() {
        let options = RecognitionOptions::default();
        assert_eq!(options.profanity, Profanity::Masked);
        assert!(options.cid.is_empty());
        assert_eq!(options.expect, 100);

        let custom = RecognitionOptions::default()
            .with_profanity(Profanity::Raw)
            .with_cid("model-42")
            .with_expect(50);
        assert_eq!(custom.profanity.as_str(), "raw");
        assert_eq!(custom.cid, "model-42");
        assert_eq!(custom.expect, 50);
    }

    #[test]
    fn profanity_parses_case_insensitively() {
        assert_eq!("Removed".parse::<Profanity>(), Ok(Profanity::Removed));
        assert!("bleep".parse::<Profanity>().is_err());
    }

    proptest! {
        #[test]
        fn every_format_parses_back_from_its_token(idx in 0usize..AudioFormat::ALL.len()) {
            let format = AudioFormat::ALL[idx];
            prop_assert_eq!(format.wire_token().parse::<AudioFormat>(), Ok(format));
            prop_assert_eq!(format.to_string().to_uppercase().parse::<AudioFormat>(), Ok(format));
        }
    }
}
