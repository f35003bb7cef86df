//! Retry with exponential backoff for back-office HTTP calls.
//!
//! Only transport errors are retried. A response of any status is handed
//! back to the caller, which decides what the status means.

use std::future::Future;
use std::time::Duration;

/// Retry attempts after the initial request.
pub(crate) const MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles each attempt (200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

pub(crate) fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt))
}

/// Call `f` until it succeeds, up to `MAX_RETRIES + 1` times.
pub(crate) async fn retry_send<T, E, F, Fut>(endpoint: &str, f: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = backoff(attempt);
                tracing::warn!(
                    endpoint,
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "KYC API request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(0), Duration::from_millis(200));
        assert_eq!(backoff(1), Duration::from_millis(400));
        assert_eq!(backoff(2), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn retry_exhausts_all_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_send("POST /api/kyc", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("connection refused".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_at_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_send("POST /api/cms", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("reset".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
