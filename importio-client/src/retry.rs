use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{ClientError, Result};

/// Retry policy for establishing a session, with exponential backoff.
///
/// Only transport failures are retried (see [`ClientError::is_transient`]);
/// a rejected credential fails immediately.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Delay before the second attempt. Default: 500 milliseconds.
    pub initial_backoff: Duration,
    /// Maximum delay between attempts. Default: 10 seconds.
    pub max_backoff: Duration,
    /// Multiplier applied to backoff after each failed attempt. Default: 2.0.
    pub multiplier: f64,
    /// Total number of attempts, including the first. Values below 1 count as 1. Default: 3.
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            max_attempts: 3,
        }
    }
}

impl RetryConfig {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn next_backoff(&self, current: Duration) -> Duration {
        let next = current.mul_f64(self.multiplier);
        next.min(self.max_backoff)
    }
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or the
/// policy runs out of attempts.
pub(crate) async fn with_retry<T, F, Fut>(config: &RetryConfig, mut attempt: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut backoff = config.initial_backoff;

    for n in 1..=attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                warn!(attempt = n, error = %e, "connect attempt failed");
                if n < attempts {
                    info!(attempt = n, backoff_ms = backoff.as_millis(), "retrying");
                    tokio::time::sleep(backoff).await;
                    backoff = config.next_backoff(backoff);
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(ClientError::ConnectFailed { attempts })
}
