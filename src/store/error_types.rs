use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum StoreError {
    /// 키가 없음. 오류가 아닌 제어 흐름 신호로 쓰임
    KeyNotFound {
        key: String,
    },
    /// 요청 타임아웃
    Timeout {
        operation: &'static str,
        key: String,
        after: Duration,
    },
    /// 저장소 연결 실패
    Connection {
        key: String,
        reason: String,
    },
    /// 예상하지 못한 응답 코드
    UnexpectedStatus {
        key: String,
        status: u16,
        body: String,
    },
    /// 응답 디코딩 실패
    Decode {
        key: String,
        reason: String,
    },
    /// 디스크립터 인코딩 실패
    Encode {
        key: String,
        reason: String,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound { .. })
    }

    /// 재시도로 회복 가능한 I/O 오류인지 여부
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Timeout { .. } | StoreError::Connection { .. } => true,
            StoreError::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StoreError::KeyNotFound { key }
            | StoreError::Timeout { key, .. }
            | StoreError::Connection { key, .. }
            | StoreError::UnexpectedStatus { key, .. }
            | StoreError::Decode { key, .. }
            | StoreError::Encode { key, .. } => key,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::KeyNotFound { key } =>
                write!(f, "키를 찾을 수 없음: {}", key),
            StoreError::Timeout { operation, key, after } =>
                write!(f, "저장소 {} 요청 타임아웃 ({}, {:?})", operation, key, after),
            StoreError::Connection { key, reason } =>
                write!(f, "저장소 연결 실패 ({}): {}", key, reason),
            StoreError::UnexpectedStatus { key, status, body } =>
                write!(f, "저장소 응답 오류 ({}): HTTP {} {}", key, status, body),
            StoreError::Decode { key, reason } =>
                write!(f, "저장소 응답 디코딩 실패 ({}): {}", key, reason),
            StoreError::Encode { key, reason } =>
                write!(f, "디스크립터 인코딩 실패 ({}): {}", key, reason),
        }
    }
}

impl std::error::Error for StoreError {}
