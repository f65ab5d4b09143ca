//! Bounded fixed-delay retry for transient platform failures.
//!
//! An attempt failing with a transient error (timeouts, connection resets,
//! 429 and gateway-class 5xx, see [`CfApiError::is_transient`]) is retried
//! after a fixed delay until the attempt budget is spent; the error from the
//! final attempt is returned unchanged. A fatal error aborts immediately.

use log::warn;
use std::future::Future;
use std::time::Duration;

use super::api::{CfApiError, Result};

/// Retry policy: total attempt budget and the fixed delay between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Run `operation` under the retry policy.
///
/// The closure is invoked once per attempt and must produce a fresh future
/// each time. The sleep between attempts is a plain `tokio::time::sleep`, so
/// dropping the returned future cancels the whole sequence cleanly.
pub async fn execute_with_retry<T, F, Fut>(
    label: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                warn!(
                    "{}: transient failure on attempt {}/{}, retrying in {:?}: {}",
                    label, attempt, attempts, policy.delay, err
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    warn!(
                        "{}: transient failure on final attempt {}/{}: {}",
                        label, attempt, attempts, err
                    );
                }
                return Err(err);
            }
        }
    }
}
