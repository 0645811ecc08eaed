use std::fmt;

#[derive(Debug)]
pub enum PlatformError {
    /// 컨테이너가 더 이상 존재하지 않음
    ContainerGone {
        container_ref: String,
    },
    /// 플랫폼 API 요청 실패 (연결, 타임아웃)
    Request {
        target: String,
        reason: String,
    },
    /// 예상하지 못한 응답 코드
    UnexpectedStatus {
        target: String,
        status: u16,
    },
    /// 응답 디코딩 실패
    Decode {
        target: String,
        reason: String,
    },
    /// Docker Engine 오류
    Engine {
        source: bollard::errors::Error,
        context: String,
    },
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::ContainerGone { container_ref } =>
                write!(f, "컨테이너 {}가 존재하지 않음", container_ref),
            PlatformError::Request { target, reason } =>
                write!(f, "플랫폼 요청 실패 ({}): {}", target, reason),
            PlatformError::UnexpectedStatus { target, status } =>
                write!(f, "플랫폼 응답 오류 ({}): HTTP {}", target, status),
            PlatformError::Decode { target, reason } =>
                write!(f, "플랫폼 응답 디코딩 실패 ({}): {}", target, reason),
            PlatformError::Engine { source, context } =>
                write!(f, "Docker Engine 오류 ({}): {}", context, source),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Engine { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<bollard::errors::Error> for PlatformError {
    fn from(err: bollard::errors::Error) -> Self {
        PlatformError::Engine {
            source: err,
            context: "Docker Engine 연결".to_string(),
        }
    }
}
