//! Token 签发端点

use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::http::header::CACHE_CONTROL;
use actix_web::{HttpResponse, Responder, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::constants::{JSON_CONTENT_TYPE, NO_STORE};
use crate::config::RateLimitConfig;
use crate::csrf::CsrfProtector;
use crate::errors::{AppError, Result};

use super::types::CsrfTokenResponse;

/// 签发端点限流配置，按连接 IP 计数，所有 worker 共享同一个限流器
pub type IssuanceLimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// 签发新的 CSRF token
///
/// 响应 `{ "token": "...", "expires_at": "..." }`，禁止缓存。
pub async fn issue_csrf_token(protector: web::Data<Arc<dyn CsrfProtector>>) -> impl Responder {
    let issued = protector.issue();
    trace!("Issued CSRF token, expires at {}", issued.expires_at);

    HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, NO_STORE))
        .append_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(CsrfTokenResponse::from(issued))
}

/// 创建签发端点限流配置，未启用时返回 None
///
/// 超限返回 HTTP 429 Too Many Requests
pub fn issuance_rate_limit(config: &RateLimitConfig) -> Result<Option<IssuanceLimiterConfig>> {
    if !config.enabled {
        debug!("CSRF issuance rate limiting disabled");
        return Ok(None);
    }

    let limiter = GovernorConfigBuilder::default()
        .seconds_per_request(config.seconds_per_request)
        .burst_size(config.burst_size)
        .finish()
        .ok_or_else(|| AppError::invalid_config("Invalid rate_limit configuration"))?;

    debug!(
        "CSRF issuance rate limiter created: 1 req/{}s, burst {}",
        config.seconds_per_request, config.burst_size
    );
    Ok(Some(limiter))
}
