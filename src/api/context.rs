//! 应用上下文
//!
//! 启动时根据配置构建一次，之后按值克隆进每个 worker。

use std::sync::Arc;
use tracing::info;

use crate::config::{RouteConfig, StaticConfig};
use crate::csrf::{Clock, CsrfProtector, build_protector};
use crate::errors::Result;
use crate::services::FormService;

use super::middleware::CsrfMiddleware;
use super::services::{AppStartTime, IssuanceLimiterConfig, issuance_rate_limit};

#[derive(Clone)]
pub struct AppContext {
    pub protector: Arc<dyn CsrfProtector>,
    pub forms: Arc<FormService>,
    pub start_time: AppStartTime,
    pub routes: RouteConfig,
    pub csrf_middleware: CsrfMiddleware,
    pub issuance_limit: Option<Arc<IssuanceLimiterConfig>>,
    pub max_body_bytes: usize,
}

impl AppContext {
    /// 构建上下文；密钥无效、header 名非法或限流参数非法时失败
    pub fn from_config(config: &StaticConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let protector = build_protector(&config.csrf, clock)?;
        let csrf_middleware =
            CsrfMiddleware::new(protector.clone(), &config.csrf, config.server.max_body_bytes)?;
        let issuance_limit = issuance_rate_limit(&config.rate_limit)?.map(Arc::new);

        info!(
            "API mounted at {} (token endpoint {}{}), health at {}",
            config.routes.api_prefix,
            config.routes.api_prefix,
            super::constants::CSRF_ISSUE_PATH,
            config.routes.health_prefix
        );

        Ok(Self {
            protector,
            forms: Arc::new(FormService::new()),
            start_time: AppStartTime::now(),
            routes: config.routes.clone(),
            csrf_middleware,
            issuance_limit,
            max_body_bytes: config.server.max_body_bytes,
        })
    }
}
