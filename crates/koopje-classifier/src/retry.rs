//! Exponential back-off for the generation endpoint.
//!
//! Transport failures and 429/5xx responses are retried. Shape errors are
//! returned at once; asking again would not change the answer.

use std::future::Future;
use std::time::Duration;

use crate::error::ClassifierError;

/// Returns `true` for errors worth another attempt after a delay.
pub(crate) fn is_retriable(err: &ClassifierError) -> bool {
    match err {
        ClassifierError::Http(_) => true,
        ClassifierError::UnexpectedStatus { status } => *status == 429 || *status >= 500,
        ClassifierError::MalformedResponse(_)
        | ClassifierError::Deserialize { .. }
        | ClassifierError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` at most `max_attempts` times in total.
///
/// The delay before retry `n` (1-based) is `backoff_base_ms * 2^(n-1)`:
///
/// | Attempt | Sleep before it (base 1 000 ms) |
/// |---------|---------------------------------|
/// | 1       | none                            |
/// | 2       | 1 s                             |
/// | 3       | 2 s                             |
/// | 4       | 4 s                             |
///
/// The last error is returned once attempts run out.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClassifierError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClassifierError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_attempts {
                    return Err(err);
                }
                let delay_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(62));
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "classifier request failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable(&ClassifierError::UnexpectedStatus { status: 500 }));
        assert!(is_retriable(&ClassifierError::UnexpectedStatus { status: 503 }));
        assert!(is_retriable(&ClassifierError::UnexpectedStatus { status: 429 }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&ClassifierError::UnexpectedStatus { status: 400 }));
        assert!(!is_retriable(&ClassifierError::UnexpectedStatus { status: 403 }));
    }

    #[test]
    fn malformed_response_is_not_retriable() {
        assert!(!is_retriable(&ClassifierError::MalformedResponse(
            "no candidates".to_owned()
        )));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ClassifierError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(ClassifierError::UnexpectedStatus { status: 503 })
                } else {
                    Ok::<u32, ClassifierError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ClassifierError::UnexpectedStatus { status: 500 })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(ClassifierError::UnexpectedStatus { status: 500 })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_malformed_response() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ClassifierError::MalformedResponse("empty".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ClassifierError::MalformedResponse(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let start = tokio::time::Instant::now();
        let result = retry_with_backoff(3, 1_000, || async {
            Err::<u32, _>(ClassifierError::UnexpectedStatus { status: 502 })
        })
        .await;
        assert!(result.is_err());
        // 1 s before attempt 2, 2 s before attempt 3.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
    }
}
