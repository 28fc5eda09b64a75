//! Startup retry for store connections.
//!
//! Only used while connecting; the mutation pipeline itself never retries.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Doubling backoff between connection attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Wait a random 50%..100% of each delay so restarting replicas spread out
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Nominal delay before retry number `retry` (1-based)
    fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Await `connect` until it succeeds or the retries in `config` run out.
///
/// The error of the final attempt is returned as is.
pub async fn retry_connect<F, Fut, T, E>(config: &RetryConfig, mut connect: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut retries = 0;
    loop {
        let err = match connect().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if retries >= config.max_retries {
            warn!(attempts = retries + 1, error = %err, "Giving up on connection");
            return Err(err);
        }

        retries += 1;
        let mut wait = config.delay_for(retries);
        if config.jitter {
            wait = jittered(wait);
        }
        debug!(
            retry = retries,
            wait_ms = wait.as_millis() as u64,
            error = %err,
            "Connection failed, retrying"
        );
        tokio::time::sleep(wait).await;
    }
}

fn jittered(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + (RandomState::new().hash_one(std::time::Instant::now()) % 51) as u32;
    delay * percent / 100
}
