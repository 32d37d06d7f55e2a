#[cfg(test)]
mod test {

    use serial_test::serial;
    use std::io::Write;
    use std::path::PathBuf;

    use crate::config::loader::{expand_env_vars, file_to_config, parse_config};
    use crate::config::settings::{CacheConfig, LogFormat};
    use crate::utils::constants::{DEFAULT_FCM_URL, DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_IID_URL, DEFAULT_TOKEN_URL};
    use crate::utils::logging::{self, LogLevel};

    const FULL: &str = r#"
credentials_path: /etc/fcm/service-account.json
logging:
  level: debug
  format: json
http:
  timeout_ms: 2500
endpoints:
  token_url: http://localhost:8080/token
  fcm_url: http://localhost:8080
  iid_url: http://localhost:8081
cache:
  type: file
  path: /var/cache/fcm/tokens.json
"#;

    #[test]
    fn parses_full_config() {
        let cfg = parse_config(FULL).unwrap();

        assert_eq!(cfg.credentials_path, PathBuf::from("/etc/fcm/service-account.json"));
        let logging = cfg.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(cfg.http.timeout_ms, 2500);
        assert_eq!(cfg.endpoints.token_url, "http://localhost:8080/token");
        assert_eq!(cfg.endpoints.iid_url, "http://localhost:8081");
        assert_eq!(cfg.cache, CacheConfig::File { path: PathBuf::from("/var/cache/fcm/tokens.json") });
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = parse_config("credentials_path: key.json\n").unwrap();

        let logging = cfg.logging.unwrap();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
        assert_eq!(cfg.http.timeout_ms, DEFAULT_HTTP_TIMEOUT_MS);
        assert_eq!(cfg.endpoints.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(cfg.endpoints.fcm_url, DEFAULT_FCM_URL);
        assert_eq!(cfg.endpoints.iid_url, DEFAULT_IID_URL);
        assert_eq!(cfg.cache, CacheConfig::Memory);
    }

    #[test]
    fn partial_endpoints_keep_remaining_defaults() {
        let cfg = parse_config("credentials_path: key.json\nendpoints:\n  fcm_url: http://127.0.0.1:9000\n").unwrap();
        assert_eq!(cfg.endpoints.fcm_url, "http://127.0.0.1:9000");
        assert_eq!(cfg.endpoints.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_config("credentials_path: \"\"\n").is_err());
        assert!(parse_config("credentials_path: key.json\nhttp:\n  timeout_ms: 0\n").is_err());
        assert!(parse_config("credentials_path: key.json\nendpoints:\n  fcm_url: fcm.googleapis.com\n").is_err());
        assert!(parse_config("credentials_path: key.json\ncache:\n  type: redis\n").is_err());
        assert!(parse_config("logging:\n  level: info\n").is_err());
    }

    #[test]
    #[serial]
    fn expands_environment_variables() {
        std::env::set_var("FCM_COURIER_TEST_KEY", "/run/secrets/key.json");
        std::env::remove_var("FCM_COURIER_TEST_UNSET");

        let expanded = expand_env_vars("a: ${FCM_COURIER_TEST_KEY}\nb: ${FCM_COURIER_TEST_UNSET:fallback}\nc: ${FCM_COURIER_TEST_UNSET}\n");
        assert_eq!(expanded, "a: /run/secrets/key.json\nb: fallback\nc: \n");

        std::env::remove_var("FCM_COURIER_TEST_KEY");
    }

    #[tokio::test]
    #[serial]
    async fn loads_config_file_with_env_expansion() {
        std::env::set_var("FCM_COURIER_TEST_TIMEOUT", "750");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "credentials_path: ${{FCM_COURIER_TEST_CREDS:/etc/fcm/key.json}}\nhttp:\n  timeout_ms: ${{FCM_COURIER_TEST_TIMEOUT}}\n"
        )
        .unwrap();

        let cfg = file_to_config(file.path()).await.unwrap();
        assert_eq!(cfg.credentials_path, PathBuf::from("/etc/fcm/key.json"));
        assert_eq!(cfg.http.timeout_ms, 750);

        std::env::remove_var("FCM_COURIER_TEST_TIMEOUT");
    }

    #[tokio::test]
    async fn missing_config_file_is_error() {
        let err = file_to_config(std::path::Path::new("/nonexistent/fcm-courier.yaml")).await.unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }

    #[test]
    fn cli_log_level_overrides_config() {
        let cfg = parse_config(FULL).unwrap();

        let from_file = logging::resolve(&cfg, None);
        assert_eq!(from_file.level, "debug");
        assert_eq!(from_file.format, LogFormat::Json);

        let overridden = logging::resolve(&cfg, Some(LogLevel::WARN));
        assert_eq!(overridden.level, "warn");
        assert_eq!(overridden.format, LogFormat::Json);
    }
}
