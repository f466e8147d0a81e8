use std::future::Future;

/// Final error of a retried operation and how many attempts were made.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub error: E,
}

/// Run `op` up to `max_attempts` times, retrying only errors for which
/// `is_retryable` returns true.
///
/// `op` receives the 1-based attempt number. Retries are immediate. On
/// success returns the value and the attempt it came from. A non-retryable
/// error, or a retryable one on the last attempt, is returned as is. A bound
/// of zero is treated as one attempt.
pub async fn retry_bounded<T, E, F, Fut, P>(
    max_attempts: u32,
    is_retryable: P,
    mut op: F,
) -> Result<(T, u32), RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(error) if attempt < max_attempts && is_retryable(&error) => continue,
            Err(error) => return Err(RetryError { attempts: attempt, error }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use proptest::prelude::*;
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum Failure {
        Transient(u32),
        Fatal,
    }

    fn transient(e: &Failure) -> bool {
        matches!(e, Failure::Transient(_))
    }

    #[test]
    fn test_succeeds_first_time() {
        let calls = Cell::new(0);
        let result = block_on(retry_bounded(3, transient, |_| {
            calls.set(calls.get() + 1);
            async { Ok::<_, Failure>("done") }
        }));

        assert_eq!(result.unwrap(), ("done", 1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_two_transient_failures_then_success() {
        let result = block_on(retry_bounded(3, transient, |attempt| async move {
            if attempt < 3 {
                Err(Failure::Transient(attempt))
            } else {
                Ok(attempt)
            }
        }));

        assert_eq!(result.unwrap(), (3, 3));
    }

    #[test]
    fn test_exhausted_returns_last_error() {
        let result = block_on(retry_bounded(3, transient, |attempt| async move {
            Err::<(), _>(Failure::Transient(attempt))
        }));

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.error, Failure::Transient(3));
    }

    #[test]
    fn test_fatal_error_is_not_retried() {
        let calls = Cell::new(0);
        let result = block_on(retry_bounded(3, transient, |_| {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(Failure::Fatal) }
        }));

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 1);
        assert_eq!(err.error, Failure::Fatal);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_bound_still_attempts_once() {
        let calls = Cell::new(0);
        let result = block_on(retry_bounded(0, transient, |attempt| {
            calls.set(calls.get() + 1);
            async move { Err::<(), _>(Failure::Transient(attempt)) }
        }));

        assert_eq!(result.unwrap_err().attempts, 1);
        assert_eq!(calls.get(), 1);
    }

    proptest! {
        #[test]
        fn prop_attempts_never_exceed_bound(max_attempts in 1u32..8, failures in 0u32..12) {
            let calls = Cell::new(0u32);
            let result = block_on(retry_bounded(max_attempts, transient, |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt <= failures {
                        Err(Failure::Transient(attempt))
                    } else {
                        Ok(attempt)
                    }
                }
            }));

            prop_assert!(calls.get() <= max_attempts);
            if failures < max_attempts {
                prop_assert_eq!(result.unwrap(), (failures + 1, failures + 1));
            } else {
                let err = result.unwrap_err();
                prop_assert_eq!(err.attempts, max_attempts);
                prop_assert_eq!(err.error, Failure::Transient(max_attempts));
            }
        }
    }
}
