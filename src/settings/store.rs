use serde::Deserialize;
use std::env;
use super::{parse_env_var, platform::{validate_url, STORE_SCHEMES}, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Etcd,
    /// 프로세스 메모리에만 기록 (드라이런)
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "etcd" => Ok(StoreBackend::Etcd),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("지원하지 않는 저장소: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// 최대 시도 횟수
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// 재시도 간격 (초)
    #[serde(default = "default_retry_interval")]
    pub interval: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval: default_retry_interval(),
        }
    }
}

fn default_max_attempts() -> u32 { 3 }
fn default_retry_interval() -> u64 { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// 인프라 스택 이름. 저장소 주소 `etcd.<stack>` 을 만드는 데 사용
    #[serde(default = "default_infra_stack")]
    pub infra_stack: String,

    /// 저장소 주소를 직접 지정
    #[serde(default)]
    pub address: Option<String>,

    /// 키 네임스페이스 루트
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// 요청별 타임아웃 (초)
    #[serde(default = "default_store_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_infra_stack() -> String { "infra".to_string() }
fn default_key_prefix() -> String { "/vulcand".to_string() }
fn default_store_timeout() -> u64 { 5 }

impl StoreSettings {
    pub fn from_env() -> Result<Self> {
        let infra_stack = env::var("STACK_ENV")
            .ok()
            .filter(|stack| !stack.trim().is_empty())
            .unwrap_or_else(default_infra_stack);

        let settings = Self {
            backend: parse_env_var("STORE_BACKEND", StoreBackend::default)?,
            infra_stack,
            address: env::var("ETCD_ADDRESS").ok().filter(|address| !address.trim().is_empty()),
            key_prefix: parse_env_var("STORE_KEY_PREFIX", default_key_prefix)?,
            timeout: parse_env_var("STORE_TIMEOUT_SECS", default_store_timeout)?,
            retry: RetrySettings {
                max_attempts: parse_env_var("STORE_RETRY_ATTEMPTS", default_max_attempts)?,
                interval: parse_env_var("STORE_RETRY_INTERVAL_SECS", default_retry_interval)?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// 저장소 주소. 직접 지정한 값이 없으면 인프라 스택에서 유도
    pub fn endpoint(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| format!("http://etcd.{}:4001", self.infra_stack))
    }

    pub fn validate(&self) -> Result<()> {
        if self.infra_stack.is_empty()
            || !self.infra_stack.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STACK_ENV".to_string(),
                value: self.infra_stack.clone(),
                reason: "스택 이름은 영숫자와 -_ 만 포함할 수 있습니다".to_string(),
            });
        }

        if self.backend == StoreBackend::Etcd {
            validate_url("ETCD_ADDRESS", &self.endpoint(), STORE_SCHEMES)?;
        }

        if !self.key_prefix.is_empty()
            && (!self.key_prefix.starts_with('/') || self.key_prefix.ends_with('/'))
        {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STORE_KEY_PREFIX".to_string(),
                value: self.key_prefix.clone(),
                reason: "접두사는 '/'로 시작하고 '/'로 끝나지 않아야 합니다".to_string(),
            });
        }

        if self.timeout == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STORE_TIMEOUT_SECS".to_string(),
                value: self.timeout.to_string(),
                reason: "타임아웃은 0보다 커야 합니다".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "STORE_RETRY_ATTEMPTS".to_string(),
                value: self.retry.max_attempts.to_string(),
                reason: "최소 한 번은 시도해야 합니다".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            infra_stack: default_infra_stack(),
            address: None,
            key_prefix: default_key_prefix(),
            timeout: default_store_timeout(),
            retry: RetrySettings::default(),
        }
    }
}
