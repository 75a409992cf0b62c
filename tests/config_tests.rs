//! 配置加载与校验测试

use std::fs;
use tempfile::TempDir;

use csrfgate::config::{CsrfMode, SAMPLE_SECRET_PLACEHOLDER, StaticConfig, validate};
use csrfgate::csrf::CsrfSecret;
use csrfgate::errors::AppError;

fn valid_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.csrf.secret = "0123456789abcdef0123456789abcdef".to_string();
    config
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = StaticConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.csrf.token_ttl_secs, 1800);
    assert_eq!(config.csrf.header_name, "X-CSRF-Token");
    assert_eq!(config.routes.health_prefix, "/health");
}

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
port = 9090

[csrf]
secret = "file-secret-file-secret-file-secret"
mode = "one_time"
token_ttl_secs = 600
field_name = "_token"
exclude_paths = ["/api/webhooks"]

[rate_limit]
burst_size = 3
"#,
    );

    let config = StaticConfig::load(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.csrf.mode, CsrfMode::OneTime);
    assert_eq!(config.csrf.token_ttl_secs, 600);
    assert_eq!(config.csrf.field_name, "_token");
    assert_eq!(config.csrf.exclude_paths, vec!["/api/webhooks".to_string()]);
    assert_eq!(config.rate_limit.burst_size, 3);
    // 未出现的字段保持默认
    assert_eq!(config.csrf.header_name, "X-CSRF-Token");
    assert!(config.rate_limit.enabled);
    assert!(validate(&config).is_ok());
}

#[test]
fn test_unparseable_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[csrf\nsecret = ");

    let err = StaticConfig::load(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigLoad(_)));
}

#[test]
fn test_unknown_mode_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[csrf]\nmode = \"session\"\n");
    assert!(StaticConfig::load(&path).is_err());
}

#[test]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nmax_backups = 2\n");

    // SAFETY: 本测试二进制中只有这里修改环境变量，且使用其他测试不读取的字段
    unsafe {
        std::env::set_var("CG__LOGGING__MAX_BACKUPS", "9");
        std::env::set_var("CG__CORS__ALLOWED_ORIGINS", "https://a.example,https://b.example");
    }

    let config = StaticConfig::load(&path);

    unsafe {
        std::env::remove_var("CG__LOGGING__MAX_BACKUPS");
        std::env::remove_var("CG__CORS__ALLOWED_ORIGINS");
    }

    let config = config.unwrap();
    assert_eq!(config.logging.max_backups, 9);
    assert_eq!(
        config.cors.allowed_origins,
        vec![
            "https://a.example".to_string(),
            "https://b.example".to_string()
        ]
    );
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out.toml");

    let mut config = valid_config();
    config.csrf.mode = CsrfMode::OneTime;
    config.server.port = 7001;
    config.save_to_file(&path).unwrap();

    let reloaded = StaticConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(reloaded.csrf.mode, CsrfMode::OneTime);
    assert_eq!(reloaded.server.port, 7001);
    assert_eq!(reloaded.csrf.secret, config.csrf.secret);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_default_config_rejected_without_secret() {
    let err = validate(&StaticConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::InvalidConfig(_)));
    assert!(err.message().contains("generate-secret"));
}

#[test]
fn test_sample_placeholder_rejected() {
    let sample = StaticConfig::sample();
    assert_eq!(sample.csrf.secret, SAMPLE_SECRET_PLACEHOLDER);
    assert!(sample.validate().is_err());
}

#[test]
fn test_generated_secret_accepted() {
    let mut config = StaticConfig::default();
    config.csrf.secret = CsrfSecret::generate(32).unwrap().to_base64();
    assert!(config.validate().is_ok());
}

#[test]
fn test_ttl_bounds() {
    let mut config = valid_config();
    config.csrf.token_ttl_secs = 59;
    assert!(config.validate().is_err());
    config.csrf.token_ttl_secs = 60;
    assert!(config.validate().is_ok());
    config.csrf.token_ttl_secs = 86_400;
    assert!(config.validate().is_ok());
    config.csrf.token_ttl_secs = 86_401;
    assert!(config.validate().is_err());
}

#[test]
fn test_header_and_field_names() {
    let mut config = valid_config();
    config.csrf.header_name = "X CSRF".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.csrf.field_name = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_route_prefixes() {
    let mut config = valid_config();
    config.routes.api_prefix = "api".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.routes.api_prefix = "/api/".to_string();
    assert!(config.validate().is_err());

    let mut config = valid_config();
    config.routes.health_prefix = "/api".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_exclude_paths_must_be_absolute() {
    let mut config = valid_config();
    config.csrf.exclude_paths = vec!["webhooks".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_rate_limit_only_checked_when_enabled() {
    let mut config = valid_config();
    config.rate_limit.burst_size = 0;
    assert!(config.validate().is_err());

    config.rate_limit.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_logging_format() {
    let mut config = valid_config();
    config.logging.format = "JSON".to_string();
    assert!(config.validate().is_ok());
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}
