use serde::Deserialize;
use std::env;
use super::{parse_env_var, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default)]
    pub enabled: bool,

    /// 주기당 허용 요청 수
    #[serde(default = "default_requests")]
    pub requests: u32,

    /// 주기 (초)
    #[serde(default = "default_period")]
    pub period_secs: u32,

    #[serde(default = "default_burst")]
    pub burst: u32,
}

fn default_requests() -> u32 { 100 }
fn default_period() -> u32 { 1 }
fn default_burst() -> u32 { 10 }

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            requests: default_requests(),
            period_secs: default_period(),
            burst: default_burst(),
        }
    }
}

/// 프로세스 전역 조정 정책
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReconcilerSettings {
    /// 설정된 경우 이 스택에 속한 컨테이너만 관리
    #[serde(default)]
    pub target_stack: Option<String>,

    #[serde(default)]
    pub rate_limit: RateLimitSettings,

    #[serde(default)]
    pub https_redirect: bool,
}

impl ReconcilerSettings {
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            target_stack: env::var("TARGET_STACK").ok().filter(|stack| !stack.trim().is_empty()),
            rate_limit: RateLimitSettings {
                enabled: parse_env_var("RATE_LIMIT_ENABLED", || false)?,
                requests: parse_env_var("RATE_LIMIT_REQUESTS", default_requests)?,
                period_secs: parse_env_var("RATE_LIMIT_PERIOD_SECS", default_period)?,
                burst: parse_env_var("RATE_LIMIT_BURST", default_burst)?,
            },
            https_redirect: parse_env_var("HTTPS_REDIRECT_ENABLED", || false)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.enabled {
            if self.rate_limit.requests == 0 {
                return Err(SettingsError::InvalidConfig(
                    "rate limit requests 값은 0보다 커야 합니다".to_string(),
                ));
            }
            if self.rate_limit.period_secs == 0 {
                return Err(SettingsError::InvalidConfig(
                    "rate limit period 값은 0보다 커야 합니다".to_string(),
                ));
            }
        }
        Ok(())
    }
}
