use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use vulcand_reconciler::settings::RetrySettings;
use vulcand_reconciler::store::{with_retry, RetryPolicy, RetryableOperation, StoreError};

struct FlakyOperation {
    attempts: AtomicU32,
    failures: u32,
    error: fn() -> StoreError,
}

#[async_trait::async_trait]
impl RetryableOperation for FlakyOperation {
    type Output = u32;

    async fn execute(&self) -> Result<Self::Output, StoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            Err((self.error)())
        } else {
            Ok(attempt)
        }
    }
}

fn connection_refused() -> StoreError {
    StoreError::Connection {
        key: "/vulcand/x".to_string(),
        reason: "connection refused".to_string(),
    }
}

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        interval: Duration::from_millis(10),
    }
}

#[tokio::test]
async fn test_retry_policy_from_settings() {
    let settings = RetrySettings {
        max_attempts: 3,
        interval: 1,
    };

    let policy = RetryPolicy::from(&settings);
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.interval, Duration::from_secs(1));
}

#[tokio::test]
async fn test_retry_with_success_after_failure() {
    let operation = FlakyOperation {
        attempts: AtomicU32::new(0),
        failures: 2,
        error: connection_refused,
    };

    let result = with_retry(operation, &policy(3)).await;
    assert_eq!(result.unwrap(), 2);
}

#[tokio::test]
async fn test_retry_exhausted() {
    let operation = FlakyOperation {
        attempts: AtomicU32::new(0),
        failures: 10,
        error: connection_refused,
    };

    let result = with_retry(operation, &policy(3)).await;
    assert!(matches!(result, Err(StoreError::Connection { .. })));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let operation = FlakyOperation {
        attempts: AtomicU32::new(0),
        failures: 10,
        error: || StoreError::KeyNotFound {
            key: "/vulcand/x".to_string(),
        },
    };

    let result = with_retry(operation, &policy(3)).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let operation = FlakyOperation {
        attempts: AtomicU32::new(0),
        failures: 1,
        error: || StoreError::Timeout {
            operation: "read",
            key: "/vulcand/x".to_string(),
            after: Duration::from_secs(5),
        },
    };

    let result = with_retry(operation, &policy(2)).await;
    assert_eq!(result.unwrap(), 1);
}
