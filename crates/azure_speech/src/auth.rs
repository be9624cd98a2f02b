//! Bearer token supervision
//!
//! The [`CredentialSupervisor`] fetches a token when it is created and keeps it
//! fresh from a background task. The token lives in an [`ArcSwap`]: the
//! refresher is the only writer and replaces the whole value, readers take a
//! lock-free snapshot.
//!
//! A failed refresh is logged and the previous token stays in use. A long
//! issuer outage therefore shows up later as 401s from the service rather than
//! as an error here.
//!
//! See: <https://learn.microsoft.com/en-us/azure/ai-services/speech-service/rest-text-to-speech#how-to-use-an-access-token>

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::AuthError;
use crate::ports::TokenSource;
use crate::request::millis;

/// Shortest period the refresher will tick at; `tokio::time::interval` panics on zero
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Header carrying the subscription key on token requests
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// A bearer token and when it was issued
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    fetched_at: DateTime<Utc>,
}

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// `Authorization` header value
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

/// Exchanges the subscription key for a bearer token
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    http: Client,
    url: String,
    subscription_key: SecretString,
    timeout: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub const fn new(
        http: Client,
        url: String,
        subscription_key: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            url,
            subscription_key,
            timeout,
        }
    }

    /// POST to the issuer and return the token in the response body
    ///
    /// # Errors
    ///
    /// Any status other than 200, a transport failure, an empty body or an
    /// elapsed deadline is an `AuthError`.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Credential, AuthError> {
        let exchange = async {
            let response = self
                .http
                .post(&self.url)
                .header(SUBSCRIPTION_KEY_HEADER, self.subscription_key.expose_secret())
                .body("")
                .send()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(AuthError::Status(status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| AuthError::Transport(e.to_string()))?;
            let token = body.trim();
            if token.is_empty() {
                return Err(AuthError::EmptyToken);
            }

            Ok(Credential::new(token))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AuthError::Timeout(millis(self.timeout)))?
    }
}

/// Owns the current credential and its refresh cycle
pub struct CredentialSupervisor {
    issuer: TokenIssuer,
    credential: ArcSwap<Credential>,
}

impl fmt::Debug for CredentialSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSupervisor")
            .field("issuer", &self.issuer)
            .field("credential", &self.credential.load())
            .finish()
    }
}

impl CredentialSupervisor {
    /// Fetch the first token; no supervisor exists unless this succeeds
    pub async fn initialize(issuer: TokenIssuer) -> Result<Self, AuthError> {
        let credential = issuer.fetch().await?;
        info!("Fetched initial speech service token");
        Ok(Self {
            issuer,
            credential: ArcSwap::from_pointee(credential),
        })
    }

    /// Fetch a new token and replace the current one
    ///
    /// On failure the current token is left untouched.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let credential = self.issuer.fetch().await?;
        self.credential.store(Arc::new(credential));
        Ok(())
    }

    /// Latest token string
    #[must_use]
    pub fn current_token(&self) -> String {
        self.credential.load().token().to_string()
    }

    /// Start refreshing every `interval` until the returned handle is shut down or dropped
    ///
    /// The first refresh happens one full `interval` after this call. Each
    /// refresh is bounded by the issuer's own deadline, so a stuck request
    /// cannot hold up later ticks. A zero `interval` is raised to 1ms.
    pub fn spawn_refresh(self: &Arc<Self>, interval: Duration) -> RefreshHandle {
        let supervisor = Arc::clone(self);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        if interval < MIN_REFRESH_INTERVAL {
            warn!(
                interval_ms = millis(interval),
                "Refresh interval too short, using {}ms",
                millis(MIN_REFRESH_INTERVAL)
            );
        }
        let interval = interval.max(MIN_REFRESH_INTERVAL);

        info!(
            interval_ms = millis(interval),
            "Starting token refresh task"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Don't refresh immediately; the token was just fetched
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    _ = ticker.tick() => {},
                }

                tokio::select! {
                    biased;
                    () = stop.cancelled() => break,
                    result = supervisor.refresh() => match result {
                        Ok(()) => debug!("Refreshed speech service token"),
                        Err(e) => warn!(
                            error = %e,
                            "Failed to refresh token, keeping previous token"
                        ),
                    },
                }
            }

            debug!("Token refresh task stopped");
        });

        RefreshHandle {
            cancel,
            task: Some(task),
        }
    }
}

impl TokenSource for CredentialSupervisor {
    fn current(&self) -> Arc<Credential> {
        self.credential.load_full()
    }
}

/// Stops the background refresh task
///
/// `shutdown` consumes the handle, so the task can only be stopped once.
/// Dropping the handle also stops it, without waiting.
#[derive(Debug)]
pub struct RefreshHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Stop refreshing and wait for the task to exit
    ///
    /// No token request is issued once this returns.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Token refresh task ended abnormally");
            }
        }
        info!("Token refresh task shut down");
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
