use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff settings for connection attempts
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    /// Scale each delay to 50-100% so restarted replicas do not reconnect in lockstep
    pub use_jitter: bool,
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay before retry number `retry` (1-based), before jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let raw = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis((raw as u64).min(self.max_delay_ms))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Run `operation` until it succeeds or `config.max_retries` retries are spent.
///
/// The last error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retries = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if retries > 0 {
                    debug!(retries, "Operation succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) if retries >= config.max_retries => {
                warn!(attempts = retries + 1, error = %e, "Giving up");
                return Err(e);
            }
            Err(e) => {
                retries += 1;

                let mut delay = config.backoff(retries);
                if config.use_jitter {
                    delay = apply_jitter(delay);
                }

                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    retries,
                    config.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn apply_jitter(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    delay * percent as u32 / 100
}
