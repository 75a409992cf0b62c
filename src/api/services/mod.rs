pub mod csrf;
pub mod error_code;
pub mod forms;
pub mod health;
pub mod helpers;
pub mod routes;
pub mod types;

pub use csrf::{IssuanceLimiterConfig, issuance_rate_limit, issue_csrf_token};
pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{
    api_result, created_response, error_from_app, error_response, json_response,
    success_response,
};
pub use routes::{api_routes, configure};
pub use types::{ApiResponse, CsrfTokenResponse, HealthResponse};
