//! API 路由装配
//!
//! Server 与集成测试共用同一份装配逻辑。

use actix_governor::Governor;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;

use crate::api::constants::CSRF_ISSUE_PATH;
use crate::api::context::AppContext;

use super::csrf::{IssuanceLimiterConfig, issue_csrf_token};
use super::error_code::ErrorCode;
use super::forms::{submit_contact, subscribe};
use super::health::health_routes;
use super::helpers::error_response;

/// 受 CSRF 保护的 API 路由
///
/// 包含：
/// - GET /csrf - 签发 token（安全方法，中间件放行）
/// - POST /contact - 联系表单
/// - POST /subscribe - 邮件订阅
pub fn api_routes(limiter: Option<&IssuanceLimiterConfig>) -> actix_web::Scope {
    let issue = web::get().to(issue_csrf_token);
    let issue = match limiter {
        Some(config) => issue.wrap(Governor::new(config)),
        None => issue,
    };

    web::scope("")
        .route(CSRF_ISSUE_PATH, issue)
        .route("/contact", web::post().to(submit_contact))
        .route("/subscribe", web::post().to(subscribe))
}

/// body 解析失败统一返回 JSON 信封
fn body_error(err: actix_web::Error, message: String) -> actix_web::Error {
    InternalError::from_response(
        err,
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message),
    )
    .into()
}

/// 注册共享状态与全部路由
pub fn configure(cfg: &mut web::ServiceConfig, ctx: &AppContext) {
    let json_config = web::JsonConfig::default()
        .limit(ctx.max_body_bytes)
        .error_handler(|err, _req| {
            let message = err.to_string();
            body_error(err.into(), message)
        });
    let form_config = web::FormConfig::default()
        .limit(ctx.max_body_bytes)
        .error_handler(|err, _req| {
            let message = err.to_string();
            body_error(err.into(), message)
        });

    cfg.app_data(web::Data::new(ctx.protector.clone()))
        .app_data(web::Data::new(ctx.forms.clone()))
        .app_data(web::Data::new(ctx.start_time.clone()))
        .app_data(json_config)
        .app_data(form_config)
        .service(
            web::scope(&ctx.routes.api_prefix)
                .wrap(ctx.csrf_middleware.clone())
                .service(api_routes(ctx.issuance_limit.as_deref())),
        )
        .service(web::scope(&ctx.routes.health_prefix).service(health_routes()));
}
