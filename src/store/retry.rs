use tokio::time::{sleep, Duration};
use tracing::warn;
use crate::settings::RetrySettings;
use super::StoreError;

/// 재시도 정책
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 최대 시도 횟수
    pub max_attempts: u32,
    /// 재시도 간격
    pub interval: Duration,
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            interval: Duration::from_secs(settings.interval),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

/// 재시도 가능한 작업 특성
#[async_trait::async_trait]
pub trait RetryableOperation: Send + Sync {
    type Output: Send;

    /// 작업 실행
    async fn execute(&self) -> Result<Self::Output, StoreError>;

    /// 재시도 여부 결정
    fn should_retry(&self, error: &StoreError) -> bool {
        error.is_retryable()
    }
}

/// 재시도 로직 실행
pub async fn with_retry<T: RetryableOperation>(
    operation: T,
    policy: &RetryPolicy,
) -> Result<T::Output, StoreError> {
    let mut attempts = 0;

    loop {
        attempts += 1;
        match operation.execute().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if attempts >= policy.max_attempts || !operation.should_retry(&error) {
                    return Err(error);
                }

                warn!(
                    error = %error,
                    attempt = attempts,
                    max_attempts = policy.max_attempts,
                    "저장소 요청 실패, 재시도 예정"
                );

                sleep(policy.interval).await;
            }
        }
    }
}
