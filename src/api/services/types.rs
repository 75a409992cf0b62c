//! API 请求/响应类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CsrfMode;
use crate::csrf::IssuedToken;

/// 统一响应信封
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

/// `GET {api_prefix}/csrf` 响应体
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CsrfTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for CsrfTokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.value,
            expires_at: issued.expires_at,
        }
    }
}

/// 健康检查响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub started_at: String,
    pub uptime: u64,
    pub csrf_mode: CsrfMode,
}
