use serde::Deserialize;
use super::{parse_env_var, SettingsError};

/// 이벤트 스트림 재연결 설정
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamSettings {
    /// 첫 재연결 대기 (초)
    #[serde(default = "default_backoff_initial")]
    pub backoff_initial: u64,

    /// 재연결 대기 상한 (초)
    #[serde(default = "default_backoff_max")]
    pub backoff_max: u64,
}

fn default_backoff_initial() -> u64 { 1 }
fn default_backoff_max() -> u64 { 60 }

impl StreamSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            backoff_initial: parse_env_var("STREAM_BACKOFF_INITIAL_SECS", default_backoff_initial)?,
            backoff_max: parse_env_var("STREAM_BACKOFF_MAX_SECS", default_backoff_max)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.backoff_initial == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STREAM_BACKOFF_INITIAL_SECS".to_string(),
                value: self.backoff_initial.to_string(),
                reason: "대기 시간은 0보다 커야 합니다".to_string(),
            });
        }
        if self.backoff_max < self.backoff_initial {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STREAM_BACKOFF_MAX_SECS".to_string(),
                value: self.backoff_max.to_string(),
                reason: "상한은 첫 대기 시간보다 작을 수 없습니다".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            backoff_initial: default_backoff_initial(),
            backoff_max: default_backoff_max(),
        }
    }
}
