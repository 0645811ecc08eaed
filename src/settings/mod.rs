use std::{env, fs, path::Path};
use serde::Deserialize;
use tracing::debug;

mod error;
pub mod logging;
pub mod platform;
pub mod reconciler;
pub mod store;
pub mod stream;

pub use error::SettingsError;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use platform::{PlatformKind, PlatformSettings};
pub use reconciler::{RateLimitSettings, ReconcilerSettings};
pub use store::{RetrySettings, StoreBackend, StoreSettings};
pub use stream::StreamSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 플랫폼 (이벤트 소스, 컨테이너 조회)
    #[serde(default)]
    pub platform: PlatformSettings,

    // 설정 저장소
    #[serde(default)]
    pub store: StoreSettings,

    // 조정 정책
    #[serde(default)]
    pub reconciler: ReconcilerSettings,

    // 이벤트 스트림 재연결
    #[serde(default)]
    pub stream: StreamSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,
}

impl Settings {
    /// `RECONCILER_CONFIG_FILE` 이 있으면 TOML 파일에서, 없으면 환경 변수에서 로드
    pub fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("RECONCILER_CONFIG_FILE") {
            Self::from_toml_file(&config_path)
        } else {
            Self::from_env()
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("설정 파일 로드: {}", path.as_ref().display());

        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            platform: PlatformSettings::from_env()?,
            store: StoreSettings::from_env()?,
            reconciler: ReconcilerSettings::from_env()?,
            stream: StreamSettings::from_env()?,
            logging: LogSettings::from_env()?,
        };

        // 설정 생성 시점에 바로 검증
        settings.validate()?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.platform.validate()?;
        self.store.validate()?;
        self.reconciler.validate()?;
        self.stream.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_toml() {
        let toml_content = r#"
            [platform]
            kind = "cloud"
            user = "ops"
            apikey = "secret"
            rest_host = "http://platform.internal:8080"

            [store]
            infra_stack = "infra-eu"
            key_prefix = "/vulcand"

            [reconciler]
            target_stack = "staging"
            https_redirect = true

            [reconciler.rate_limit]
            enabled = true
            requests = 50

            [logging]
            format = "json"
            level = "debug"
        "#;

        let settings: Settings = toml::from_str(toml_content).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.platform.credentials(), Some(("ops", "secret")));
        assert_eq!(
            settings.platform.events_url().as_deref(),
            Some("http://platform.internal:8080/api/audit/v1/events")
        );
        assert_eq!(settings.store.endpoint(), "http://etcd.infra-eu:4001");
        assert_eq!(settings.reconciler.target_stack.as_deref(), Some("staging"));
        assert!(settings.reconciler.https_redirect);
        assert_eq!(settings.reconciler.rate_limit.requests, 50);
        assert_eq!(settings.reconciler.rate_limit.burst, 10);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, tracing::Level::DEBUG);
        assert_eq!(settings.stream, StreamSettings::default());
    }

    #[test]
    fn test_engine_platform_needs_no_credentials() {
        let settings: Settings = toml::from_str("[platform]\nkind = \"engine\"\n").unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cloud_platform_requires_credentials() {
        let settings = Settings::default();
        match settings.validate() {
            Err(SettingsError::EnvVarMissing { var_name }) => assert_eq!(var_name, "DOCKERCLOUD_USER"),
            other => panic!("예상하지 못한 결과: {:?}", other),
        }
    }

    #[test]
    fn test_https_store_address_is_rejected() {
        let mut store = StoreSettings::default();
        store.address = Some("https://etcd.infra:2379".to_string());
        assert!(matches!(
            store.validate(),
            Err(SettingsError::EnvVarInvalid { ref var_name, .. }) if var_name == "ETCD_ADDRESS"
        ));
    }
}
