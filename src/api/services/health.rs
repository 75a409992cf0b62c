use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, trace};

use crate::csrf::CsrfProtector;

use super::error_code::ErrorCode;
use super::helpers::json_response;
use super::types::HealthResponse;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

/// Health Service
///
/// 探针不经过 CSRF 中间件，只做进程内检查。
pub struct HealthService;

impl HealthService {
    fn report(
        status: &str,
        protector: &dyn CsrfProtector,
        app_start_time: &AppStartTime,
    ) -> HealthResponse {
        let now = Utc::now();
        HealthResponse {
            status: status.to_string(),
            timestamp: now.to_rfc3339(),
            started_at: app_start_time.start_datetime.to_rfc3339(),
            uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
            csrf_mode: protector.mode(),
        }
    }

    // 活跃性检查，进程能响应即为存活
    pub async fn liveness_check(
        protector: web::Data<Arc<dyn CsrfProtector>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received liveness check request");
        let report = Self::report("alive", protector.get_ref().as_ref(), &app_start_time);
        json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(report))
    }

    /// 就绪检查：签发一个 token 并立即校验，确认密钥与时钟可用
    pub async fn readiness_check(
        protector: web::Data<Arc<dyn CsrfProtector>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received readiness check request");
        let protector: &dyn CsrfProtector = protector.get_ref().as_ref();

        let probe = protector.issue();
        match protector.verify(Some(&probe.value)) {
            Ok(_) => {
                let report = Self::report("ready", protector, &app_start_time);
                json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(report))
            }
            Err(e) => {
                error!("Readiness self-check failed: {}", e);
                let report = Self::report("unavailable", protector, &app_start_time);
                json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::ServiceUnavailable,
                    "Service Unavailable",
                    Some(report),
                )
            }
        }
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("")
        .route("/ready", web::get().to(HealthService::readiness_check))
        .route("/ready", web::head().to(HealthService::readiness_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
