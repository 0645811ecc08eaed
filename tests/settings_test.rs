use vulcand_reconciler::settings::{
    LogFormat, LogOutput, PlatformKind, PlatformSettings, Settings, SettingsError, StoreBackend,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial; // 환경 변수를 공유하므로 직렬 실행

    const ENV_VARS: [&str; 24] = [
        "RECONCILER_PLATFORM",
        "DOCKERCLOUD_USER",
        "DOCKERCLOUD_APIKEY",
        "DOCKERCLOUD_REST_HOST",
        "DOCKERCLOUD_STREAM_URL",
        "DOCKERCLOUD_TIMEOUT_SECS",
        "STACK_ENV",
        "ETCD_ADDRESS",
        "STORE_BACKEND",
        "STORE_KEY_PREFIX",
        "STORE_TIMEOUT_SECS",
        "STORE_RETRY_ATTEMPTS",
        "STORE_RETRY_INTERVAL_SECS",
        "TARGET_STACK",
        "RATE_LIMIT_ENABLED",
        "RATE_LIMIT_REQUESTS",
        "RATE_LIMIT_PERIOD_SECS",
        "RATE_LIMIT_BURST",
        "HTTPS_REDIRECT_ENABLED",
        "STREAM_BACKOFF_INITIAL_SECS",
        "STREAM_BACKOFF_MAX_SECS",
        "RECONCILER_LOG_LEVEL",
        "RECONCILER_LOG_FORMAT",
        "RECONCILER_LOG_OUTPUT",
    ];

    fn cleanup_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
        std::env::remove_var("RECONCILER_CONFIG_FILE");
    }

    fn set_credentials() {
        std::env::set_var("DOCKERCLOUD_USER", "ops");
        std::env::set_var("DOCKERCLOUD_APIKEY", "secret");
        std::env::set_var("DOCKERCLOUD_REST_HOST", "http://platform.internal");
    }

    // 테스트용 임시 TOML 파일 생성 헬퍼
    fn create_test_toml(content: &str) -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("reconciler.toml");
        std::fs::write(&file_path, content).unwrap();
        (file_path.to_str().unwrap().to_string(), dir)
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        cleanup_env();
        set_credentials();

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.platform.kind, PlatformKind::Cloud);
        assert_eq!(
            settings.platform.events_url().as_deref(),
            Some("http://platform.internal/api/audit/v1/events")
        );
        assert_eq!(settings.store.backend, StoreBackend::Etcd);
        assert_eq!(settings.store.endpoint(), "http://etcd.infra:4001");
        assert_eq!(settings.store.key_prefix, "/vulcand");
        assert_eq!(settings.store.timeout, 5);
        assert_eq!(settings.store.retry.max_attempts, 3);
        assert_eq!(settings.store.retry.interval, 1);
        assert!(settings.reconciler.target_stack.is_none());
        assert!(!settings.reconciler.rate_limit.enabled);
        assert!(!settings.reconciler.https_redirect);
        assert_eq!(settings.stream.backoff_initial, 1);
        assert_eq!(settings.stream.backoff_max, 60);
        assert_eq!(settings.logging.level, tracing::Level::INFO);
        assert_eq!(settings.logging.format, LogFormat::Text);
        assert_eq!(settings.logging.output, LogOutput::Stdout);

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_missing_credentials_fail_fast() {
        cleanup_env();

        match Settings::from_env() {
            Err(SettingsError::EnvVarMissing { var_name }) => assert_eq!(var_name, "DOCKERCLOUD_USER"),
            other => panic!("예상하지 못한 결과: {:?}", other),
        }

        std::env::set_var("DOCKERCLOUD_USER", "ops");
        match Settings::from_env() {
            Err(SettingsError::EnvVarMissing { var_name }) => assert_eq!(var_name, "DOCKERCLOUD_APIKEY"),
            other => panic!("예상하지 못한 결과: {:?}", other),
        }

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_engine_platform_from_env() {
        cleanup_env();
        std::env::set_var("RECONCILER_PLATFORM", "engine");
        std::env::set_var("STORE_BACKEND", "memory");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.platform.kind, PlatformKind::Engine);
        assert_eq!(settings.store.backend, StoreBackend::Memory);

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        cleanup_env();
        set_credentials();
        std::env::set_var("STACK_ENV", "infra-eu");
        std::env::set_var("TARGET_STACK", "staging");
        std::env::set_var("RATE_LIMIT_ENABLED", "true");
        std::env::set_var("RATE_LIMIT_REQUESTS", "20");
        std::env::set_var("HTTPS_REDIRECT_ENABLED", "true");
        std::env::set_var("RECONCILER_LOG_FORMAT", "json");
        std::env::set_var("RECONCILER_LOG_OUTPUT", "/var/log/reconciler.log");

        let settings = Settings::from_env().unwrap();

        assert_eq!(settings.store.endpoint(), "http://etcd.infra-eu:4001");
        assert_eq!(settings.reconciler.target_stack.as_deref(), Some("staging"));
        assert!(settings.reconciler.rate_limit.enabled);
        assert_eq!(settings.reconciler.rate_limit.requests, 20);
        assert!(settings.reconciler.https_redirect);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(
            settings.logging.output,
            LogOutput::File("/var/log/reconciler.log".to_string())
        );

        // 주소를 직접 지정하면 스택 이름보다 우선
        std::env::set_var("ETCD_ADDRESS", "http://10.0.0.5:2379");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.store.endpoint(), "http://10.0.0.5:2379");

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_settings_validation() {
        cleanup_env();
        set_credentials();

        // 1. 숫자가 아닌 타임아웃
        std::env::set_var("STORE_TIMEOUT_SECS", "soon");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::EnvVarInvalid { ref var_name, .. }) if var_name == "STORE_TIMEOUT_SECS"
        ));
        std::env::remove_var("STORE_TIMEOUT_SECS");

        // 2. 잘못된 플랫폼
        std::env::set_var("RECONCILER_PLATFORM", "kubernetes");
        assert!(Settings::from_env().is_err());
        std::env::remove_var("RECONCILER_PLATFORM");

        // 3. '/' 로 끝나는 키 접두사
        std::env::set_var("STORE_KEY_PREFIX", "/vulcand/");
        assert!(Settings::from_env().is_err());
        std::env::remove_var("STORE_KEY_PREFIX");

        // 4. 잘못된 로그 레벨
        std::env::set_var("RECONCILER_LOG_LEVEL", "loud");
        assert!(Settings::from_env().is_err());
        std::env::remove_var("RECONCILER_LOG_LEVEL");

        // 5. 상한이 첫 대기보다 작은 백오프
        std::env::set_var("STREAM_BACKOFF_INITIAL_SECS", "10");
        std::env::set_var("STREAM_BACKOFF_MAX_SECS", "5");
        assert!(Settings::from_env().is_err());

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_https_platform_url() {
        cleanup_env();
        set_credentials();
        std::env::set_var("DOCKERCLOUD_REST_HOST", "https://cloud.docker.com");

        let settings = Settings::from_env().unwrap();
        assert_eq!(
            settings.platform.events_url().as_deref(),
            Some("https://cloud.docker.com/api/audit/v1/events")
        );

        let platform = PlatformSettings {
            user: Some("ops".to_string()),
            apikey: Some("secret".to_string()),
            rest_host: Some("https://cloud.docker.com".to_string()),
            stream_url: Some("https://stream.docker.com/api/audit/v1/events".to_string()),
            ..PlatformSettings::default()
        };
        assert!(platform.validate().is_ok());

        // http, https 외의 스킴은 거부
        std::env::set_var("DOCKERCLOUD_REST_HOST", "ftp://cloud.docker.com");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::EnvVarInvalid { ref var_name, .. }) if var_name == "DOCKERCLOUD_REST_HOST"
        ));
        std::env::set_var("DOCKERCLOUD_REST_HOST", "https://cloud.docker.com");

        // etcd 클라이언트는 평문 HTTP만 사용
        std::env::set_var("ETCD_ADDRESS", "https://10.0.0.5:2379");
        assert!(matches!(
            Settings::from_env(),
            Err(SettingsError::EnvVarInvalid { ref var_name, .. }) if var_name == "ETCD_ADDRESS"
        ));

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml(
            r#"
            [platform]
            kind = "engine"

            [store]
            backend = "memory"
            key_prefix = "/proxy"

            [reconciler]
            target_stack = "prod"

            [stream]
            backoff_initial = 2
            backoff_max = 30

            [logging]
            level = "warn"
            "#,
        );
        std::env::set_var("RECONCILER_CONFIG_FILE", &path);
        // 설정 파일이 있으면 환경 변수는 합쳐지지 않는다
        std::env::set_var("RECONCILER_LOG_LEVEL", "debug");
        std::env::set_var("TARGET_STACK", "staging");

        let settings = Settings::load().unwrap();

        assert_eq!(settings.platform.kind, PlatformKind::Engine);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
        assert_eq!(settings.store.key_prefix, "/proxy");
        assert_eq!(settings.reconciler.target_stack.as_deref(), Some("prod"));
        assert_eq!(settings.stream.backoff_initial, 2);
        assert_eq!(settings.stream.backoff_max, 30);
        assert_eq!(settings.logging.level, tracing::Level::WARN);

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_invalid_toml_file() {
        cleanup_env();

        let (path, _dir) = create_test_toml("[store\nbackend = ");
        assert!(matches!(
            Settings::from_toml_file(&path),
            Err(SettingsError::ParseError { .. })
        ));

        assert!(matches!(
            Settings::from_toml_file("/nonexistent/reconciler.toml"),
            Err(SettingsError::FileError { .. })
        ));
    }
}
