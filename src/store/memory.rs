use std::collections::BTreeMap;
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use super::{ConfigStore, StoreError};

/// 메모리 저장소에 요청된 작업 기록
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Read(String),
    Write(String, String),
    Delete(String),
}

impl StoreOp {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, StoreOp::Read(_))
    }
}

/// 프로세스 메모리에만 존재하는 저장소. 드라이런과 테스트에 사용
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    journal: Mutex<Vec<StoreOp>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 작업 기록 없이 값을 조회
    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn journal(&self) -> Vec<StoreOp> {
        self.journal.lock().await.clone()
    }

    /// 기록/삭제 요청 수
    pub async fn mutation_count(&self) -> usize {
        self.journal.lock().await.iter().filter(|op| op.is_mutation()).count()
    }

    async fn record(&self, op: StoreOp) {
        self.journal.lock().await.push(op);
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<String, StoreError> {
        self.record(StoreOp::Read(key.to_string())).await;
        self.entries
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound { key: key.to_string() })
    }

    async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Write(key.to_string(), value.to_string())).await;
        self.entries.write().await.insert(key.to_string(), value.to_string());
        debug!(key = %key, value = %value, "메모리 저장소 기록");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.record(StoreOp::Delete(key.to_string())).await;
        match self.entries.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::KeyNotFound { key: key.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CreateOutcome, RemoveOutcome};

    #[tokio::test]
    async fn test_create_if_absent_writes_once() {
        let store = MemoryStore::new();

        let first = store.create_if_absent("/a", "1").await.unwrap();
        let second = store.create_if_absent("/a", "2").await.unwrap();

        assert_eq!(first, CreateOutcome::Created);
        assert_eq!(second, CreateOutcome::AlreadyExists);
        assert_eq!(store.get("/a").await.as_deref(), Some("1"));
        assert_eq!(store.mutation_count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_if_present_is_idempotent() {
        let store = MemoryStore::new();
        store.write("/a", "1").await.unwrap();

        assert_eq!(store.remove_if_present("/a").await.unwrap(), RemoveOutcome::Removed);
        assert_eq!(store.remove_if_present("/a").await.unwrap(), RemoveOutcome::Absent);
        assert!(store.get("/a").await.is_none());
    }

    #[tokio::test]
    async fn test_read_missing_key_is_not_found() {
        let store = MemoryStore::new();
        let err = store.read("/missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }
}
