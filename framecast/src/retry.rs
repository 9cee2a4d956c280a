//! Bounded retry with fixed backoff for transient I/O.

use std::time::Duration;

use tracing::warn;

/// Default number of attempts for retried operations.
pub const DEFAULT_ATTEMPTS: u32 = 3;
/// Default fixed delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

/// Run `op` up to `attempts` times with a fixed `delay` between failures.
///
/// The final failure is surfaced unmodified; retries are invisible to the
/// caller except as added latency.
pub async fn retry_fixed<T, E, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < attempts => {
                warn!(attempt, error = %error, "operation failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = retry_fixed(3, Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("transient".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_final_error_after_exhaustion() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_fixed(3, Duration::from_millis(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("permanent".to_string()) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "permanent");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn first_success_needs_no_retry() {
        let result: Result<u32, String> =
            retry_fixed(3, Duration::from_millis(1), || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
