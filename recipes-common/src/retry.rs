//! Bounded retry for transient database contention
//!
//! Every mutation runs through `with_retries` so the HTTP handlers, the
//! worker and the migration CLI share one retry policy: up to
//! `MAX_ATTEMPTS` tries with exponential backoff, and only for errors
//! classified as transient (SQLite lock contention). Any other error
//! fails immediately.

use crate::Result;
use std::time::Duration;

/// Attempt cap, matching the reliability layer's historical retry policy
pub const MAX_ATTEMPTS: u32 = 3;

const INITIAL_BACKOFF_MS: u64 = 50;
const MAX_BACKOFF_MS: u64 = 1000;

/// Run `operation` with up to `MAX_ATTEMPTS` attempts.
pub async fn with_retries<F, Fut, T>(operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    for attempt in 1..=MAX_ATTEMPTS {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    backoff_ms,
                    error = %err,
                    "Transient database error, will retry after backoff"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
            }
            Err(err) => {
                if attempt == MAX_ATTEMPTS {
                    tracing::error!(
                        operation = operation_name,
                        attempt,
                        error = %err,
                        "Operation failed: retries exhausted"
                    );
                }
                return Err(err);
            }
        }
    }

    unreachable!("retry loop returns on the final attempt")
}
