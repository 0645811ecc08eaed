use serde::Deserialize;
use std::env;
use url::Url;
use super::{parse_env_var, SettingsError};
pub type Result<T> = std::result::Result<T, SettingsError>;

/// 컨테이너 이벤트와 메타데이터를 제공하는 플랫폼 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// 원격 컨테이너 호스팅 API (HTTP)
    #[default]
    Cloud,
    /// 로컬 Docker Engine
    Engine,
}

impl std::str::FromStr for PlatformKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloud" => Ok(PlatformKind::Cloud),
            "engine" => Ok(PlatformKind::Engine),
            _ => Err(format!("지원하지 않는 플랫폼: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    #[serde(default)]
    pub kind: PlatformKind,

    /// 플랫폼 API 사용자
    #[serde(default)]
    pub user: Option<String>,

    /// 플랫폼 API 키
    #[serde(default)]
    pub apikey: Option<String>,

    /// 컨테이너 조회 API 주소
    #[serde(default)]
    pub rest_host: Option<String>,

    /// 이벤트 스트림 주소 (기본값: `<rest_host>/api/audit/v1/events`)
    #[serde(default)]
    pub stream_url: Option<String>,

    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    10
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl PlatformSettings {
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            kind: parse_env_var("RECONCILER_PLATFORM", PlatformKind::default)?,
            user: non_empty_env("DOCKERCLOUD_USER"),
            apikey: non_empty_env("DOCKERCLOUD_APIKEY"),
            rest_host: non_empty_env("DOCKERCLOUD_REST_HOST"),
            stream_url: non_empty_env("DOCKERCLOUD_STREAM_URL"),
            request_timeout: parse_env_var("DOCKERCLOUD_TIMEOUT_SECS", default_request_timeout)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind == PlatformKind::Engine {
            return Ok(());
        }

        // 원격 플랫폼은 자격 증명 없이 시작하지 않음
        if self.user.is_none() {
            return Err(SettingsError::EnvVarMissing {
                var_name: "DOCKERCLOUD_USER".to_string(),
            });
        }
        if self.apikey.is_none() {
            return Err(SettingsError::EnvVarMissing {
                var_name: "DOCKERCLOUD_APIKEY".to_string(),
            });
        }

        let rest_host = self.rest_host.as_deref().ok_or_else(|| SettingsError::EnvVarMissing {
            var_name: "DOCKERCLOUD_REST_HOST".to_string(),
        })?;
        validate_url("DOCKERCLOUD_REST_HOST", rest_host, PLATFORM_SCHEMES)?;

        if let Some(stream_url) = &self.stream_url {
            validate_url("DOCKERCLOUD_STREAM_URL", stream_url, PLATFORM_SCHEMES)?;
        }

        if self.request_timeout == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "DOCKERCLOUD_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
                reason: "타임아웃은 0보다 커야 합니다".to_string(),
            });
        }

        Ok(())
    }

    /// `(user, apikey)` 쌍. 둘 중 하나라도 없으면 `None`
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.apikey) {
            (Some(user), Some(apikey)) => Some((user.as_str(), apikey.as_str())),
            _ => None,
        }
    }

    pub fn events_url(&self) -> Option<String> {
        self.stream_url.clone().or_else(|| {
            self.rest_host
                .as_deref()
                .map(|host| format!("{}/api/audit/v1/events", host.trim_end_matches('/')))
        })
    }
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            kind: PlatformKind::default(),
            user: None,
            apikey: None,
            rest_host: None,
            stream_url: None,
            request_timeout: default_request_timeout(),
        }
    }
}

/// 플랫폼 API는 TLS 커넥터를 거치므로 `https`도 허용
pub(crate) const PLATFORM_SCHEMES: &[&str] = &["https", "http"];

/// etcd v2 클라이언트는 평문 HTTP 커넥터만 사용
pub(crate) const STORE_SCHEMES: &[&str] = &["http"];

pub(crate) fn validate_url(var_name: &str, value: &str, schemes: &[&str]) -> Result<()> {
    let url = Url::parse(value).map_err(|e| SettingsError::EnvVarInvalid {
        var_name: var_name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;

    if !schemes.contains(&url.scheme()) {
        return Err(SettingsError::EnvVarInvalid {
            var_name: var_name.to_string(),
            value: value.to_string(),
            reason: format!("지원하는 스킴: {}", schemes.join(", ")),
        });
    }

    if url.host_str().is_none() {
        return Err(SettingsError::EnvVarInvalid {
            var_name: var_name.to_string(),
            value: value.to_string(),
            reason: "호스트가 없습니다".to_string(),
        });
    }

    Ok(())
}
