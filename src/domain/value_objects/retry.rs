use chrono::Duration;

pub const DEFAULT_MAX_ATTEMPTS: i32 = 5;
pub const BASE_DELAY_SECS: i64 = 5;
pub const MAX_DELAY_SECS: i64 = 300;

/// Delay before the given retry attempt: `base * 2^(attempt-1)`, capped.
/// `attempt` is the number of failed attempts so far, starting at 1.
pub fn backoff_delay(attempt: i32) -> Duration {
    let exponent = (attempt.max(1) - 1).min(30) as u32;
    let delay_secs = BASE_DELAY_SECS
        .saturating_mul(1_i64 << exponent)
        .min(MAX_DELAY_SECS);
    Duration::seconds(delay_secs)
}

/// What the queue does with a job after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Requeue, ready again after the delay.
    Retry { delay: Duration },
    /// No further attempts; the job goes terminal.
    Terminal,
}

/// Decides between requeue-with-backoff and terminal failure. `attempts`
/// already includes the attempt that just failed.
pub fn failure_disposition(attempts: i32, max_attempts: i32, retryable: bool) -> FailureDisposition {
    if retryable && attempts < max_attempts {
        FailureDisposition::Retry {
            delay: backoff_delay(attempts),
        }
    } else {
        FailureDisposition::Terminal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(1), Duration::seconds(5));
        assert_eq!(backoff_delay(2), Duration::seconds(10));
        assert_eq!(backoff_delay(3), Duration::seconds(20));
        assert_eq!(backoff_delay(4), Duration::seconds(40));
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(backoff_delay(7), Duration::seconds(MAX_DELAY_SECS));
        assert_eq!(backoff_delay(100), Duration::seconds(MAX_DELAY_SECS));
    }

    #[test]
    fn backoff_treats_zero_as_first_attempt() {
        assert_eq!(backoff_delay(0), Duration::seconds(BASE_DELAY_SECS));
    }

    #[test]
    fn transient_failures_requeue_until_attempts_run_out() {
        // max_attempts = 2: the first failure is rescheduled, the second is
        // terminal, so a third transient failure can never happen.
        assert_eq!(
            failure_disposition(1, 2, true),
            FailureDisposition::Retry {
                delay: Duration::seconds(5)
            }
        );
        assert_eq!(failure_disposition(2, 2, true), FailureDisposition::Terminal);
        assert_eq!(failure_disposition(3, 2, true), FailureDisposition::Terminal);
    }

    #[test]
    fn retry_delays_follow_the_backoff_schedule() {
        for attempts in 1..DEFAULT_MAX_ATTEMPTS {
            assert_eq!(
                failure_disposition(attempts, DEFAULT_MAX_ATTEMPTS, true),
                FailureDisposition::Retry {
                    delay: backoff_delay(attempts)
                }
            );
        }
    }

    #[test]
    fn non_retryable_failure_is_terminal_on_the_first_attempt() {
        assert_eq!(failure_disposition(1, 5, false), FailureDisposition::Terminal);
    }
}
