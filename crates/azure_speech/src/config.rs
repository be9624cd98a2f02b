//! Configuration for the speech client

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::region::Region;

/// Lifetime of a bearer token issued by the token endpoint
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(600);

/// Configuration for the speech client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech resource subscription key (sensitive - uses SecretString)
    #[serde(skip_serializing)]
    pub subscription_key: SecretString,

    /// Region hosting the speech resource
    #[serde(default)]
    pub region: Region,

    /// Override for the token issuance endpoint
    #[serde(default)]
    pub token_url: Option<String>,

    /// Override for the TTS base URL (`.../cognitiveservices`)
    #[serde(default)]
    pub tts_base_url: Option<String>,

    /// Override for the short-form recognition endpoint
    #[serde(default)]
    pub stt_url: Option<String>,

    /// Deadline for each token fetch in milliseconds
    #[serde(default = "default_token_timeout_ms")]
    pub token_timeout_ms: u64,

    /// Period between background token refreshes in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Default deadline for synthesis, recognition and catalog calls in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

const fn default_token_timeout_ms() -> u64 {
    10_000
}

const fn default_refresh_interval_ms() -> u64 {
    540_000 // 9 minutes, one short of the token lifetime
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Fully resolved endpoint URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token: String,
    pub synthesis: String,
    pub voices: String,
    pub recognition: String,
}

impl SpeechConfig {
    /// Config for `region` with default timeouts
    pub fn new(subscription_key: impl Into<String>, region: Region) -> Self {
        Self {
            subscription_key: SecretString::from(subscription_key.into()),
            region,
            token_url: None,
            tts_base_url: None,
            stt_url: None,
            token_timeout_ms: default_token_timeout_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    /// Load from an optional `azure_speech` config file and `AZURE_SPEECH_*` env vars
    ///
    /// Nested keys use a double underscore, e.g. `AZURE_SPEECH_REFRESH_INTERVAL_MS`
    /// maps to `refresh_interval_ms`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("azure_speech").required(false))
            .add_source(
                config::Environment::with_prefix("AZURE_SPEECH")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(region = %config.region, "Loaded speech configuration");
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.subscription_key.expose_secret().trim().is_empty() {
            return Err("Subscription key must not be empty".to_string());
        }

        if self.token_timeout_ms == 0 {
            return Err("Token timeout must be greater than 0".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        // A refresh period at or above the lifetime would let callers see expired tokens
        if self.refresh_interval_ms == 0 || self.refresh_interval() >= TOKEN_LIFETIME {
            return Err(format!(
                "Refresh interval must be between 1ms and {}ms, got {}ms",
                TOKEN_LIFETIME.as_millis() - 1,
                self.refresh_interval_ms
            ));
        }

        if self.token_timeout_ms >= self.refresh_interval_ms {
            return Err(format!(
                "Token timeout ({}ms) must be shorter than the refresh interval ({}ms)",
                self.token_timeout_ms, self.refresh_interval_ms
            ));
        }

        Ok(())
    }

    /// Resolve endpoint URLs, preferring explicit overrides over the region defaults
    #[must_use]
    pub fn endpoints(&self) -> Endpoints {
        let tts_base = self
            .tts_base_url
            .clone()
            .unwrap_or_else(|| self.region.tts_base_url());
        let tts_base = tts_base.trim_end_matches('/');

        Endpoints {
            token: self
                .token_url
                .clone()
                .unwrap_or_else(|| self.region.token_url()),
            synthesis: format!("{tts_base}/v1"),
            voices: format!("{tts_base}/voices/list"),
            recognition: self
                .stt_url
                .clone()
                .unwrap_or_else(|| self.region.stt_url()),
        }
    }

    #[must_use]
    pub const fn token_timeout(&self) -> Duration {
        Duration::from_millis(self.token_timeout_ms)
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_has_expected_defaults() {
        let config = SpeechConfig::new("key", Region::EastUS);

        assert_eq!(config.region, Region::EastUS);
        assert_eq!(config.token_timeout(), Duration::from_secs(10));
        assert_eq!(config.refresh_interval(), Duration::from_secs(540));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_blank_key() {
        let config = SpeechConfig::new("   ", Region::EastUS);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_refresh_at_token_lifetime() {
        let mut config = SpeechConfig::new("key", Region::EastUS);
        config.refresh_interval_ms = 600_000;
        assert!(config.validate().is_err());

        config.refresh_interval_ms = 599_999;
        assert!(config.validate().is_ok());

        config.refresh_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_token_timeout_below_refresh_interval() {
        let mut config = SpeechConfig::new("key", Region::EastUS);
        config.refresh_interval_ms = 20;
        config.token_timeout_ms = 20;
        assert!(config.validate().is_err());

        config.token_timeout_ms = 2_000;
        assert!(config.validate().is_err());

        config.token_timeout_ms = 19;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_zero_timeouts() {
        let mut config = SpeechConfig::new("key", Region::EastUS);
        config.token_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SpeechConfig::new("key", Region::EastUS);
        config.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoints_default_to_region() {
        let endpoints = SpeechConfig::new("key", Region::WestEurope).endpoints();
        assert_eq!(
            endpoints.token,
            "https://westeurope.api.cognitive.microsoft.com/sts/v1.0/issueToken"
        );
        assert_eq!(
            endpoints.synthesis,
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/v1"
        );
        assert_eq!(
            endpoints.voices,
            "https://westeurope.tts.speech.microsoft.com/cognitiveservices/voices/list"
        );
        assert!(endpoints.recognition.starts_with("https://westeurope.stt."));
    }

    #[test]
    fn endpoint_overrides_win() {
        let mut config = SpeechConfig::new("key", Region::EastUS);
        config.token_url = Some("http://127.0.0.1:9/token".to_string());
        config.tts_base_url = Some("http://127.0.0.1:9/cognitiveservices/".to_string());
        config.stt_url = Some("http://127.0.0.1:9/stt".to_string());

        let endpoints = config.endpoints();
        assert_eq!(endpoints.token, "http://127.0.0.1:9/token");
        assert_eq!(endpoints.synthesis, "http://127.0.0.1:9/cognitiveservices/v1");
        assert_eq!(
            endpoints.voices,
            "http://127.0.0.1:9/cognitiveservices/voices/list"
        );
        assert_eq!(endpoints.recognition, "http://127.0.0.1:9/stt");
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = SpeechConfig::new("super-secret-key", Region::EastUS);
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn serialization_skips_key() {
        let config = SpeechConfig::new("super-secret-key", Region::EastUS);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("subscription_key"));
        assert!(json.contains("\"region\":\"eastus\""));
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            subscription_key = "abc123"
            region = "JapanEast"
            refresh_interval_ms = 300000
            request_timeout_ms = 15000
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.subscription_key.expose_secret(), "abc123");
        assert_eq!(config.region, Region::JapanEast);
        assert_eq!(config.refresh_interval_ms, 300_000);
        assert_eq!(config.request_timeout_ms, 15_000);
        assert_eq!(config.token_timeout_ms, 10_000);
        assert!(config.token_url.is_none());
    }

    #[test]
    fn config_without_key_fails_to_deserialize() {
        let result: Result<SpeechConfig, _> = toml::from_str("region = \"eastus\"");
        assert!(result.is_err());
    }
}
