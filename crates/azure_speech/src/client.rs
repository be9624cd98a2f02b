//! Speech client entry point
//!
//! [`SpeechClient::connect`] and [`SpeechClient::connect_with_client`] are the
//! only ways to obtain a client, and neither returns until the first bearer
//! token has been fetched. From then on a
//! background task keeps the token fresh until [`SpeechClient::shutdown`] is
//! awaited or the client is dropped.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument};

use crate::auth::{CredentialSupervisor, RefreshHandle, TokenIssuer};
use crate::config::{Endpoints, SpeechConfig};
use crate::error::SpeechError;
use crate::ports::TokenSource;
use crate::request::CallOptions;
use crate::stt::RecognitionClient;
use crate::tts::SynthesisClient;

/// `User-Agent` sent on every request
pub const USER_AGENT: &str = concat!("azure_speech/", env!("CARGO_PKG_VERSION"));

/// Authenticated handle to one speech resource
#[derive(Debug)]
pub struct SpeechClient {
    http: Client,
    endpoints: Endpoints,
    request_timeout: Duration,
    supervisor: Arc<CredentialSupervisor>,
    refresh: RefreshHandle,
}

impl SpeechClient {
    /// Validate `config`, fetch the first token and start the refresher
    ///
    /// Requests go through a default HTTP client sending [`USER_AGENT`].
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` for an invalid config and
    /// `SpeechError::Auth` if the first token cannot be fetched.
    pub async fn connect(config: SpeechConfig) -> Result<Self, SpeechError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Self::connect_with_client(http, config).await
    }

    /// As [`Self::connect`], sending every request through `http`
    ///
    /// The `User-Agent` and any proxy settings are whatever `http` was built
    /// with.
    #[instrument(skip(http, config), fields(region = %config.region))]
    pub async fn connect_with_client(
        http: Client,
        config: SpeechConfig,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let endpoints = config.endpoints();
        let issuer = TokenIssuer::new(
            http.clone(),
            endpoints.token.clone(),
            config.subscription_key.clone(),
            config.token_timeout(),
        );

        let supervisor = Arc::new(CredentialSupervisor::initialize(issuer).await?);
        let refresh = supervisor.spawn_refresh(config.refresh_interval());

        info!("Speech client connected");

        Ok(Self {
            http,
            endpoints,
            request_timeout: config.request_timeout(),
            supervisor,
            refresh,
        })
    }

    /// Download the voice catalog and return a synthesis client
    pub async fn text_to_speech(&self) -> Result<SynthesisClient, SpeechError> {
        self.text_to_speech_with(CallOptions::new()).await
    }

    /// As [`Self::text_to_speech`], bounding the catalog download by `options`
    pub async fn text_to_speech_with(
        &self,
        options: CallOptions,
    ) -> Result<SynthesisClient, SpeechError> {
        SynthesisClient::connect(
            self.http.clone(),
            self.tokens(),
            &self.endpoints,
            self.request_timeout,
            options,
        )
        .await
    }

    #[must_use]
    pub fn speech_to_text(&self) -> RecognitionClient {
        RecognitionClient::new(
            self.http.clone(),
            self.tokens(),
            self.endpoints.recognition.clone(),
            self.request_timeout,
        )
    }

    /// Shared token source used by every pipeline built from this client
    #[must_use]
    pub fn tokens(&self) -> Arc<dyn TokenSource> {
        Arc::clone(&self.supervisor) as Arc<dyn TokenSource>
    }

    #[must_use]
    pub fn current_token(&self) -> String {
        self.supervisor.current_token()
    }

    #[must_use]
    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Stop the token refresher and wait for it to exit
    ///
    /// Pipelines created from this client keep working with the last token
    /// until it expires.
    pub async fn shutdown(self) {
        self.refresh.shutdown().await;
    }
}
