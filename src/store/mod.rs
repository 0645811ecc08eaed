//! 설정 저장소 클라이언트
//!
//! 프록시는 저장소의 계층형 키를 읽기만 하며, 조정기는 이 모듈의 [`ConfigStore`] 를
//! 통해서만 키를 기록한다. "키 없음" 은 [`StoreError::KeyNotFound`] 로 다른 실패와
//! 구분된다.

mod error_types;
pub mod etcd;
pub mod memory;
mod retry;

pub use error_types::StoreError;
pub use etcd::EtcdStore;
pub use memory::{MemoryStore, StoreOp};
pub use retry::{with_retry, RetryPolicy, RetryableOperation};

use async_trait::async_trait;

/// create-if-absent 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// remove-if-present 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Absent,
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn read(&self, key: &str) -> Result<String, StoreError>;

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// 키가 없을 때만 기록한다.
    ///
    /// 읽은 뒤 기록하는 방식이라 원자적이지 않다. 두 작성자가 동시에 "없음" 을 보면
    /// 둘 다 기록하지만, 같은 키에는 항상 같은 값이 기록되므로 마지막 기록이 남아도
    /// 결과는 같다.
    async fn create_if_absent(&self, key: &str, value: &str) -> Result<CreateOutcome, StoreError> {
        match self.read(key).await {
            Ok(_) => Ok(CreateOutcome::AlreadyExists),
            Err(e) if e.is_not_found() => {
                self.write(key, value).await?;
                Ok(CreateOutcome::Created)
            }
            Err(e) => Err(e),
        }
    }

    /// 키가 없으면 성공으로 취급한다.
    async fn remove_if_present(&self, key: &str) -> Result<RemoveOutcome, StoreError> {
        match self.delete(key).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.is_not_found() => Ok(RemoveOutcome::Absent),
            Err(e) => Err(e),
        }
    }

    /// 연결 정리
    async fn close(&self) {}
}
