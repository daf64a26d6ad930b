//! Retry loop wrapping mutating calls.

use std::future::Future;

use crate::config::RetryConfig;
use crate::error::Error;

/// Message fragments marking transient conflicts that carry a
/// non-retriable kind. Serializable-transaction backends report aborts
/// this way.
const TRANSIENT_MARKERS: &[&str] = &["retryable error", "try restarting transaction"];

fn is_transient(error: &Error) -> bool {
    error.is_retriable()
        || TRANSIENT_MARKERS
            .iter()
            .any(|marker| error.message().contains(marker))
}

/// Runs `op` until it succeeds, fails terminally, or retries are
/// exhausted.
///
/// Each attempt is bounded by the configured attempt timeout; an elapsed
/// deadline counts as a transient failure. Exhaustion maps to
/// [`RetriesExhausted`](crate::ErrorKind::RetriesExhausted) with the last
/// failure preserved as the error's source.
pub(crate) async fn with_retries<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt: u32 = 0;
    loop {
        let outcome = match tokio::time::timeout(config.attempt_timeout(), op()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::timeout("attempt deadline elapsed")),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if is_transient(&error) => {
                if attempt >= config.max_retries() {
                    return Err(Error::retries_exhausted(error));
                }
                let delay = config.delay_for_attempt(attempt);
                tracing::debug!(attempt, ?delay, error = %error, "retrying transient failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::error::Error as StdError;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::ErrorKind;

    fn scripted(outcomes: Vec<Result<u32, Error>>) -> Mutex<VecDeque<Result<u32, Error>>> {
        Mutex::new(outcomes.into_iter().collect())
    }

    async fn run(
        config: &RetryConfig,
        outcomes: &Mutex<VecDeque<Result<u32, Error>>>,
    ) -> Result<u32, Error> {
        with_retries(config, || {
            let next = outcomes
                .lock()
                .pop_front()
                .unwrap_or(Err(Error::internal("script exhausted")));
            async move { next }
        })
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_needs_one_attempt() {
        let outcomes = scripted(vec![Ok(7)]);
        let value = run(&RetryConfig::new(), &outcomes).await.expect("success");
        assert_eq!(value, 7);
        assert!(outcomes.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let outcomes = scripted(vec![
            Err(Error::unavailable("down")),
            Err(Error::conflict("write contention")),
            Ok(7),
        ]);
        let value = run(&RetryConfig::new(), &outcomes).await.expect("success");
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_marker_strings_are_retried() {
        let outcomes = scripted(vec![
            Err(Error::internal("try restarting transaction (SQLSTATE 40001)")),
            Ok(1),
        ]);
        run(&RetryConfig::new(), &outcomes).await.expect("success");
        assert!(outcomes.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_is_not_retried() {
        let outcomes = scripted(vec![Err(Error::precondition_failed("guard")), Ok(1)]);
        let err = run(&RetryConfig::new(), &outcomes)
            .await
            .expect_err("terminal");
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        // The Ok was never reached.
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_preserves_last_failure() {
        let config = RetryConfig::new().with_max_retries(2);
        let outcomes = scripted(vec![
            Err(Error::unavailable("one")),
            Err(Error::unavailable("two")),
            Err(Error::unavailable("three")),
            Ok(1),
        ]);

        let err = run(&config, &outcomes).await.expect_err("exhausted");
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);

        let cause = StdError::source(&err).expect("last failure attached");
        assert!(cause.to_string().contains("three"));
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_config_gives_one_attempt() {
        let outcomes = scripted(vec![Err(Error::unavailable("down")), Ok(1)]);
        let err = run(&RetryConfig::disabled(), &outcomes)
            .await
            .expect_err("no retries");
        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        assert_eq!(outcomes.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_elapses() {
        let config = RetryConfig::disabled().with_attempt_timeout(Duration::from_millis(10));

        let err = with_retries::<u32, _, _>(&config, || async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        })
        .await
        .expect_err("deadline");

        assert_eq!(err.kind(), ErrorKind::RetriesExhausted);
        let cause = StdError::source(&err).expect("timeout attached");
        assert!(cause.to_string().contains("deadline"));
    }
}
