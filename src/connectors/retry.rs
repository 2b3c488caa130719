// Bounded retry with exponential backoff for flaky API calls.
//
// API paths wrap individual requests in `with_backoff`; scraping paths
// never retry (a blocked page stays blocked, and hammering a mirror gets
// it blocked faster). Only transient failures are retried — timeouts,
// connection drops, 429s, and 5xx responses. Anything else (bad
// credentials, 404s, parse failures) returns immediately.

use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// Maximum attempts per call (the initial try plus retries).
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles for each retry after that.
pub const BASE_DELAY: Duration = Duration::from_millis(500);

/// Check whether an error looks transient.
///
/// HTTP errors surface as formatted strings ("… returned 503: …"), so we
/// sniff the error chain's Debug representation the same way the status
/// line renders it.
fn is_transient(err: &anyhow::Error) -> bool {
    let debug_str = format!("{err:?}").to_lowercase();
    debug_str.contains("429")
        || debug_str.contains("500")
        || debug_str.contains("502")
        || debug_str.contains("503")
        || debug_str.contains("504")
        || debug_str.contains("timed out")
        || debug_str.contains("timeout")
        || debug_str.contains("connection")
}

/// Run `operation` up to MAX_ATTEMPTS times, doubling the delay between
/// attempts. Returns the last error when every attempt fails.
pub async fn with_backoff<F, Fut, T>(label: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut delay = BASE_DELAY;
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= MAX_ATTEMPTS || !is_transient(&err) {
                    return Err(err);
                }

                warn!(
                    label = label,
                    attempt = attempt,
                    max_attempts = MAX_ATTEMPTS,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, backing off"
                );

                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Backoff tests run with start_paused so the sleeps between attempts
    // are skipped; they assert call counts and outcomes, not elapsed time.

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_immediately() {
        let calls = AtomicU32::new(0);

        let result = with_backoff("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, anyhow::Error>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);

        let result = with_backoff("test", || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(anyhow::anyhow!("request timed out"))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_on_persistent_failure() {
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_backoff("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("HTTP 429 Too Many Requests")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_errors_fail_immediately() {
        let calls = AtomicU32::new(0);

        let result: Result<i32> = with_backoff("test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(anyhow::anyhow!("HTTP 401 Unauthorized")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "auth failures must not be retried"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_error_is_preserved() {
        let result: Result<i32> = with_backoff("test", || async {
            Err(anyhow::anyhow!("503 service unavailable: be patient"))
        })
        .await;

        let err = result.unwrap_err();
        assert!(
            err.to_string().contains("be patient"),
            "original message should survive, got: {err}"
        );
    }

    #[test]
    fn test_is_transient_classification() {
        assert!(is_transient(&anyhow::anyhow!("HTTP 429")));
        assert!(is_transient(&anyhow::anyhow!("returned 503: oops")));
        assert!(is_transient(&anyhow::anyhow!("operation timed out")));
        assert!(is_transient(&anyhow::anyhow!("connection reset by peer")));
        assert!(!is_transient(&anyhow::anyhow!("HTTP 404 Not Found")));
        assert!(!is_transient(&anyhow::anyhow!("HTTP 401 Unauthorized")));
        assert!(!is_transient(&anyhow::anyhow!("invalid JSON at line 3")));
    }
}
