use std::fmt;
use crate::platform::PlatformError;
use crate::settings::SettingsError;
use crate::store::StoreError;

/// 시작과 종료 과정에서 `main` 까지 올라오는 오류
#[derive(Debug)]
pub enum AppError {
    Settings(SettingsError),
    Store(StoreError),
    Platform(PlatformError),
    Logging(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Settings(e) => write!(f, "설정 오류: {}", e),
            AppError::Store(e) => write!(f, "저장소 오류: {}", e),
            AppError::Platform(e) => write!(f, "플랫폼 오류: {}", e),
            AppError::Logging(msg) => write!(f, "로깅 초기화 실패: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Settings(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Platform(e) => Some(e),
            AppError::Logging(_) => None,
        }
    }
}

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Settings(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        AppError::Platform(err)
    }
}
