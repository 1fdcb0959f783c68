//! Bounded retry with exponential backoff for remote calls that answer "busy"
//!
//! Only failures that report themselves as busy (see [`BusySignal`]) are
//! retried. Any other failure is handed back on the spot. Waits between
//! attempts race against a [`CancellationToken`] so a shutting-down process
//! never sits behind a retry loop.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Total attempts (first call included) when the caller does not override it
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Delay before the first retry
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Factor applied to the delay for each further retry
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// Cap for any single delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Maximum exponent for the backoff calculation to prevent overflow
const MAX_BACKOFF_EXPONENT: u32 = 30;

/// Implemented by error types that can tell a transient overload apart from
/// every other failure.
pub trait BusySignal {
    fn is_busy(&self) -> bool;
}

/// Errors returned by [`BackoffRetrier`]
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The action failed with something other than "busy"; not retried.
    #[error("Operation failed: {source}")]
    Operation { source: E },

    /// Every attempt answered busy; `source` is the final attempt's failure.
    #[error("Remote still busy after {attempts} attempts: {source}")]
    BusyExhausted { attempts: u32, source: E },

    /// Shutdown was requested before or while waiting for the next attempt.
    #[error("Retry aborted due to shutdown after {attempts} attempts")]
    ShutdownAborted { attempts: u32 },

    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl<E> RetryError<E> {
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::ShutdownAborted { .. })
    }

    /// The underlying action failure, when there is one.
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Operation { source } | Self::BusyExhausted { source, .. } => Some(source),
            Self::ShutdownAborted { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Operation { source } | Self::BusyExhausted { source, .. } => Some(source),
            Self::ShutdownAborted { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }
}

/// Result type for retried operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

/// Attempt bound and delay growth
///
/// `delay_for(n) = min(base_delay * multiplier^n, max_delay)` where `n` is the
/// zero-based retry index. With the defaults the waits are 200, 400 and 800 ms.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RetryError<()>> {
        if self.max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(RetryError::InvalidConfiguration {
                message: format!("multiplier must be a finite value >= 1.0, got {}", self.multiplier),
            });
        }
        if self.base_delay > self.max_delay {
            return Err(RetryError::InvalidConfiguration {
                message: format!(
                    "base_delay ({:?}) cannot be greater than max_delay ({:?})",
                    self.base_delay, self.max_delay
                ),
            });
        }
        Ok(())
    }

    /// Wait before retry number `retry_index` (zero-based).
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let exponent = retry_index.min(MAX_BACKOFF_EXPONENT) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    /// Sum of all waits a call with `max_attempts` attempts can incur.
    pub fn worst_case_wait(&self, max_attempts: u32) -> Duration {
        (0..max_attempts.saturating_sub(1)).map(|retry| self.delay_for(retry)).sum()
    }
}

/// Retries an async action while it reports busy
///
/// Each retrier carries its own cancellation token. Hosts usually hand out
/// child tokens of one process-wide shutdown token so cancelling the parent
/// stops every pending wait.
#[derive(Debug, Clone)]
pub struct BackoffRetrier {
    config: BackoffConfig,
    shutdown: CancellationToken,
}

impl BackoffRetrier {
    pub fn new(config: BackoffConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Run `action` with the configured attempt bound.
    pub async fn retry<F, Fut, T, E>(&self, label: &str, action: F) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: BusySignal + fmt::Debug,
    {
        self.retry_with_attempts(label, self.config.max_attempts, action).await
    }

    /// Run `action` with an explicit attempt bound for this call only.
    pub async fn retry_with_attempts<F, Fut, T, E>(
        &self,
        label: &str,
        max_attempts: u32,
        mut action: F,
    ) -> RetryResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: BusySignal + fmt::Debug,
    {
        if max_attempts == 0 {
            return Err(RetryError::InvalidConfiguration {
                message: format!("{label}: max_attempts must be greater than 0"),
            });
        }

        let mut attempts = 0_u32;
        loop {
            if self.shutdown.is_cancelled() {
                debug!(label, attempts, "Shutdown requested, not invoking remote call");
                return Err(RetryError::ShutdownAborted { attempts });
            }

            attempts += 1;
            let error = match action().await {
                Ok(value) => {
                    if attempts > 1 {
                        debug!(label, attempts, "Remote call succeeded after busy retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.is_busy() {
                return Err(RetryError::Operation { source: error });
            }

            if attempts >= max_attempts {
                warn!(label, attempts, error = ?error, "Remote still busy, giving up");
                return Err(RetryError::BusyExhausted { attempts, source: error });
            }

            let delay = self.config.delay_for(attempts - 1);
            debug!(label, attempts, max_attempts, delay_ms = delay.as_millis() as u64, "Remote busy, backing off");

            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    debug!(label, attempts, "Shutdown requested during backoff");
                    return Err(RetryError::ShutdownAborted { attempts });
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}
