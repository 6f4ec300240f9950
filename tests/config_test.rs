//! Loading configuration and secrets from disk.

#![cfg(feature = "server")]

use std::io::Write;

use jobscout::JobscoutError;
use jobscout::server::config::{BackendKind, Config, Secrets};

#[test]
fn explicit_config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[agent]
backend = "gemini"

[limits]
cache_max_entries = 50
max_attempts = 2

[search]
query = "welding apprenticeships Austria"
max_results = 5

[schedule]
enabled = false
"#
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.search.query, "welding apprenticeships Austria");
    assert_eq!(config.search.max_results, 5);
    assert!(!config.schedule.enabled);
    assert_eq!(config.limits.cache_max_entries, 50);
    assert_eq!(config.retry_config().max_attempts, 2);
    assert_eq!(config.cache_config().max_entries, 50);

    let settings = config.pipeline_settings();
    assert_eq!(settings.query, "welding apprenticeships Austria");
    assert_eq!(settings.max_results, 5);
    if std::env::var("USE_GEMINI").is_err() {
        assert_eq!(config.agent.backend, BackendKind::Gemini);
    }
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, JobscoutError::Configuration(_)));
}

#[test]
fn malformed_config_file_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[limits]\nmax_attempts = \"many\"").unwrap();

    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, JobscoutError::Configuration(_)));
}

#[cfg(unix)]
mod secrets {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    const SECRETS: &str = r#"
[gemini]
api_key = "gem-key"

[tavily]
api_key = "tvly-key"

[smtp]
username = "bot@example.org"
password = "hunter2"
"#;

    fn secrets_file(mode: u32) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SECRETS.as_bytes()).unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(mode)).unwrap();
        file
    }

    #[test]
    fn private_secrets_file_is_loaded() {
        let file = secrets_file(0o600);
        let secrets = Secrets::load_from_file(file.path()).unwrap();

        assert_eq!(secrets.gemini_api_key.as_deref(), Some("gem-key"));
        assert_eq!(secrets.tavily_api_key.as_deref(), Some("tvly-key"));
        assert_eq!(secrets.smtp_username.as_deref(), Some("bot@example.org"));
        assert_eq!(secrets.smtp_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn readable_secrets_file_is_rejected() {
        let file = secrets_file(0o644);
        let err = Secrets::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, JobscoutError::Configuration(_)));
        assert!(err.to_string().contains("insecure permissions"));
    }

    #[test]
    fn debug_output_hides_keys() {
        let file = secrets_file(0o400);
        let secrets = Secrets::load_from_file(file.path()).unwrap();
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("gem-key"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn file_values_win_over_environment() {
        let file = secrets_file(0o600);
        let secrets = Secrets::load_from_file(file.path())
            .unwrap()
            .with_env_fallback(|name| match name {
                "GOOGLE_API_KEY" => Some("env-key".to_string()),
                _ => None,
            });
        assert_eq!(secrets.gemini_api_key.as_deref(), Some("gem-key"));
    }
}
