//! Bounded retry with a fixed delay between attempts

use sea_orm::{DbErr, RuntimeErr};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::bootstrap::BootstrapConfig;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

impl From<&BootstrapConfig> for RetryConfig {
    fn from(config: &BootstrapConfig) -> Self {
        Self {
            max_attempts: config.sync_retries.max(1),
            delay: config.sync_delay,
        }
    }
}

/// Retry policy for determining if an error is retryable
pub trait RetryPolicy<E> {
    fn is_retryable(&self, error: &E) -> bool;
}

/// Retries only lock contention and deadlocks reported by the database
pub struct LockContentionPolicy;

/// Message phrases that identify a transient lock conflict across Postgres,
/// MySQL and SQLite
const LOCK_CONTENTION_PHRASES: &[&str] = &[
    "deadlock",
    "database is locked",
    "database table is locked",
    "lock wait timeout",
    "could not obtain lock",
];

/// Driver error codes for lock conflicts, compared exactly:
/// - SQLSTATE `40001` serialization failure (also MySQL 1213 deadlock)
/// - SQLSTATE `40P01` deadlock detected, `55P03` lock not available
/// - SQLite `SQLITE_BUSY` / `SQLITE_LOCKED` and their extended codes
const LOCK_CONTENTION_CODES: &[&str] = &[
    "40001", "40P01", "55P03", "5", "6", "261", "262", "517", "773",
];

/// Code reported by the database itself, if the error came from the driver
fn driver_error_code(error: &DbErr) -> Option<String> {
    let runtime = match error {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(e) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

pub fn is_lock_contention(error: &DbErr) -> bool {
    if let Some(code) = driver_error_code(error) {
        if LOCK_CONTENTION_CODES
            .iter()
            .any(|lock| code.eq_ignore_ascii_case(lock))
        {
            return true;
        }
    }

    let message = error.to_string().to_lowercase();
    LOCK_CONTENTION_PHRASES
        .iter()
        .any(|phrase| message.contains(phrase))
}

impl RetryPolicy<DbErr> for LockContentionPolicy {
    fn is_retryable(&self, error: &DbErr) -> bool {
        is_lock_contention(error)
    }
}

/// Result of a retried operation together with the number of attempts made
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Execute an async operation, retrying retryable errors up to
/// `config.max_attempts` times with `config.delay` between attempts.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    policy: &impl RetryPolicy<E>,
    mut operation: F,
) -> Attempted<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempts = 0;

    loop {
        attempts += 1;

        match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    tracing::debug!("Operation succeeded after {} attempts", attempts);
                }
                return Attempted {
                    result: Ok(value),
                    attempts,
                };
            }
            Err(error) => {
                if attempts >= config.max_attempts || !policy.is_retryable(&error) {
                    return Attempted {
                        result: Err(error),
                        attempts,
                    };
                }

                tracing::warn!(
                    attempt = attempts,
                    error = %error,
                    "Attempt failed, retrying in {:?}",
                    config.delay
                );

                sleep(config.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Always;

    impl RetryPolicy<String> for Always {
        fn is_retryable(&self, _error: &String) -> bool {
            true
        }
    }

    #[test]
    fn test_lock_contention_markers() {
        assert!(is_lock_contention(&DbErr::Custom(
            "Deadlock found when trying to get lock; try restarting transaction".into()
        )));
        assert!(is_lock_contention(&DbErr::Custom(
            "error returned from database: (code: 5) database is locked".into()
        )));
        assert!(is_lock_contention(&DbErr::Custom(
            "SQLSTATE 40P01: deadlock detected".into()
        )));
        assert!(!is_lock_contention(&DbErr::Custom(
            "relation \"roles\" does not exist".into()
        )));
        assert!(!is_lock_contention(&DbErr::RecordNotFound("caja".into())));
    }

    #[test]
    fn test_digits_in_messages_are_not_lock_codes() {
        assert!(!is_lock_contention(&DbErr::Conn(RuntimeErr::Internal(
            "Connection refused (os error 111) at db.internal:40001".into()
        ))));
        assert!(!is_lock_contention(&DbErr::Custom(
            "relation \"ventas_20251205\" does not exist".into()
        )));
        assert!(!is_lock_contention(&DbErr::Exec(RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"idx_1213\"".into()
        ))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_stops_after_success() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_attempts: 5,
            delay: Duration::from_millis(10),
        };

        let outcome = with_retry(&config, &Always, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 2 {
                    Err("busy".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(outcome.result, Ok(2));
        assert_eq!(outcome.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_single_attempt_budget() {
        let config = RetryConfig {
            max_attempts: 1,
            delay: Duration::from_secs(60),
        };
        let start = tokio::time::Instant::now();

        let outcome: Attempted<(), String> =
            with_retry(&config, &Always, || async { Err("busy".to_string()) }).await;

        assert_eq!(outcome.attempts, 1);
        assert!(outcome.result.is_err());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_retry_config_from_bootstrap_config() {
        let config = RetryConfig::from(&BootstrapConfig {
            sync_retries: 0,
            sync_delay: Duration::from_millis(500),
        });
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.delay, Duration::from_millis(500));
    }
}
