//! Per-call deadlines and cancellation

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::SpeechError;

/// Caller-supplied bounds for one network call
///
/// An unset timeout falls back to the client's configured default.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run `call` under the options' deadline and cancellation token
pub(crate) async fn bounded<T, F>(
    options: &CallOptions,
    default_timeout: Duration,
    call: F,
) -> Result<T, SpeechError>
where
    F: Future<Output = Result<T, SpeechError>>,
{
    let limit = options.timeout.unwrap_or(default_timeout);
    let deadline = tokio::time::timeout(limit, call);

    let outcome = match &options.cancel {
        Some(token) => {
            tokio::select! {
                biased;
                () = token.cancelled() => return Err(SpeechError::Cancelled),
                outcome = deadline => outcome,
            }
        },
        None => deadline.await,
    };

    outcome.unwrap_or_else(|_| Err(SpeechError::Timeout(millis(limit))))
}
