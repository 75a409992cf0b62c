//! 启动配置校验
//!
//! 在任何监听开始前调用，失败即终止启动。

use actix_web::http::header::HeaderName;

use super::StaticConfig;
use crate::csrf::CsrfSecret;
use crate::errors::{AppError, Result};

/// Token 有效期下限（秒）
pub const MIN_TOKEN_TTL_SECS: u64 = 60;
/// Token 有效期上限（秒）
pub const MAX_TOKEN_TTL_SECS: u64 = 86_400;

const VALID_LOG_FORMATS: [&str; 2] = ["text", "json"];

impl StaticConfig {
    /// 校验完整配置，启动时调用
    pub fn validate(&self) -> Result<()> {
        validate(self)
    }
}

/// 校验完整配置，返回第一个发现的问题
pub fn validate(config: &StaticConfig) -> Result<()> {
    validate_csrf(config)?;
    validate_routes(config)?;
    validate_rate_limit(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_csrf(config: &StaticConfig) -> Result<()> {
    let csrf = &config.csrf;

    if csrf.secret.is_empty() {
        return Err(AppError::invalid_config(
            "csrf.secret is not set. Run `csrfgate generate-secret` and put the value in config.toml or CG__CSRF__SECRET",
        ));
    }
    if csrf.secret.len() < CsrfSecret::MIN_LEN {
        return Err(AppError::invalid_config(format!(
            "csrf.secret must be at least {} bytes, got {}",
            CsrfSecret::MIN_LEN,
            csrf.secret.len()
        )));
    }

    validate_ttl(csrf.token_ttl_secs)?;

    HeaderName::from_bytes(csrf.header_name.as_bytes()).map_err(|_| {
        AppError::invalid_config(format!(
            "csrf.header_name '{}' is not a valid HTTP header name",
            csrf.header_name
        ))
    })?;

    if csrf.field_name.trim().is_empty() {
        return Err(AppError::invalid_config("csrf.field_name must not be empty"));
    }

    if csrf.purge_interval_secs == 0 {
        return Err(AppError::invalid_config(
            "csrf.purge_interval_secs must be greater than 0",
        ));
    }

    if let Some(path) = csrf.exclude_paths.iter().find(|p| !p.starts_with('/')) {
        return Err(AppError::invalid_config(format!(
            "csrf.exclude_paths entry '{}' must start with '/'",
            path
        )));
    }

    Ok(())
}

/// 校验 token 有效期是否在允许范围内
pub fn validate_ttl(ttl_secs: u64) -> Result<()> {
    if !(MIN_TOKEN_TTL_SECS..=MAX_TOKEN_TTL_SECS).contains(&ttl_secs) {
        return Err(AppError::invalid_config(format!(
            "csrf.token_ttl_secs must be between {} and {}, got {}",
            MIN_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, ttl_secs
        )));
    }
    Ok(())
}

fn validate_routes(config: &StaticConfig) -> Result<()> {
    for (key, prefix) in [
        ("routes.api_prefix", &config.routes.api_prefix),
        ("routes.health_prefix", &config.routes.health_prefix),
    ] {
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(AppError::invalid_config(format!(
                "{} '{}' must start with '/' and must not end with '/'",
                key, prefix
            )));
        }
    }

    if config.routes.api_prefix == config.routes.health_prefix {
        return Err(AppError::invalid_config(
            "routes.api_prefix and routes.health_prefix must differ",
        ));
    }
    Ok(())
}

fn validate_rate_limit(config: &StaticConfig) -> Result<()> {
    let rl = &config.rate_limit;
    if rl.enabled && (rl.seconds_per_request == 0 || rl.burst_size == 0) {
        return Err(AppError::invalid_config(
            "rate_limit.seconds_per_request and rate_limit.burst_size must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_logging(config: &StaticConfig) -> Result<()> {
    let format = config.logging.format.to_lowercase();
    if !VALID_LOG_FORMATS.contains(&format.as_str()) {
        return Err(AppError::invalid_config(format!(
            "logging.format '{}' is invalid. Valid: {:?}",
            config.logging.format, VALID_LOG_FORMATS
        )));
    }
    Ok(())
}
