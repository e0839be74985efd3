//! Caller-side retry with exponential backoff.
//!
//! The extraction pipeline never retries by itself; the HTTP handlers wrap
//! whole pipeline runs with this helper for transient service failures only.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

pub const BASE_DELAY: Duration = Duration::from_millis(1000);

/// Runs `op` up to `max_retries + 1` times, sleeping 1x, 2x, 4x ... `base_delay`
/// between attempts while `should_retry` accepts the error.
pub async fn with_backoff<T, E, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    should_retry: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && should_retry(&e) => {
                let delay = base_delay * (1u32 << attempt.min(16));
                attempt += 1;
                warn!(
                    "Attempt {} failed ({}), retrying after {}ms...",
                    attempt,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<u32, String> = with_backoff(3, BASE_DELAY, |_| true, move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(format!("failure {n}"))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<(), String> = with_backoff(2, BASE_DELAY, |_| true, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err("down".to_string())
        })
        .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let counter = &attempts;
        let result: Result<(), String> =
            with_backoff(5, BASE_DELAY, |e: &String| e != "fatal", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("fatal".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_delay() {
        let start = tokio::time::Instant::now();
        let _: Result<(), String> =
            with_backoff(2, BASE_DELAY, |_| true, || async { Err("x".to_string()) }).await;
        // 1s + 2s
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_millis(3100));
    }
}
