//! Retry with exponential back-off and jitter for feed requests.
//!
//! Timeouts, connection failures, HTTP 429, and 5xx responses are retried;
//! everything else (4xx, body decode errors, malformed XML, bad
//! configuration) is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &FeedError) -> bool {
    match err {
        FeedError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        FeedError::RateLimited { .. } => true,
        FeedError::UnexpectedStatus { status, .. } => *status >= 500,
        FeedError::Xml(_) | FeedError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based): `backoff_base_ms * 2^(attempt-1)`
/// scaled by `jitter`, never shorter than a server-provided `Retry-After`, and
/// capped at 60 s.
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32, jitter: f64, err: &FeedError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * jitter) as u64;
    let floor_ms = match err {
        FeedError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(floor_ms).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` milliseconds, scaled by a
/// random factor in `[0.75, 1.25)`, raised to any `Retry-After` hint, and
/// capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>() * 0.5 + 0.75;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt, jitter, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient feed error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
