use crate::error::StepError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NotRetryable,
    Cancelled,
    Fatal,
    AttemptsExhausted,
    Failure,
}

/// Decide whether a failed attempt is followed by another.
///
/// - `attempt_no`: 1-based number of the attempt that just failed.
/// - `max_attempts`: the step's attempt limit, initial attempt included.
pub fn decide_retry(attempt_no: u32, max_attempts: u32, error: &StepError) -> RetryDecision {
    if error.is_cancellation() {
        return RetryDecision::Stop {
            reason: RetryReason::Cancelled,
        };
    }
    if error.is_fatal() {
        return RetryDecision::Stop {
            reason: RetryReason::Fatal,
        };
    }
    if !error.is_retriable() {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        };
    }
    if attempt_no >= max_attempts.max(1) {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }
    RetryDecision::Retry {
        reason: RetryReason::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_until_limit() {
        let e = StepError::execution("boom");
        assert!(matches!(decide_retry(1, 3, &e), RetryDecision::Retry { .. }));
        assert!(matches!(decide_retry(2, 3, &e), RetryDecision::Retry { .. }));
        assert_eq!(
            decide_retry(3, 3, &e),
            RetryDecision::Stop {
                reason: RetryReason::AttemptsExhausted
            }
        );
    }

    #[test]
    fn non_retriable_stops_immediately() {
        assert_eq!(
            decide_retry(1, 5, &StepError::non_retriable("no")),
            RetryDecision::Stop {
                reason: RetryReason::NotRetryable
            }
        );
        assert_eq!(
            decide_retry(1, 5, &StepError::Cancelled),
            RetryDecision::Stop {
                reason: RetryReason::Cancelled
            }
        );
    }
}
