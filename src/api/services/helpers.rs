//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::api::constants::JSON_CONTENT_TYPE;
use crate::errors::AppError;

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", JSON_CONTENT_TYPE))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建 201 Created 响应
pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 AppError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 服务端错误只返回通用消息，详情写入日志。
pub fn error_from_app(err: &AppError) -> HttpResponse {
    let status = err.http_status();
    let error_code = ErrorCode::from(err);
    if err.is_client_error() {
        error_response(status, error_code, err.message())
    } else {
        tracing::error!("Request failed: {}", err);
        error_response(status, error_code, "Internal server error")
    }
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时使用 `on_success` 构建响应，失败时自动映射 AppError。
pub fn api_result<T, E>(result: Result<T, E>, on_success: fn(T) -> HttpResponse) -> HttpResponse
where
    T: Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(data) => on_success(data),
        Err(e) => {
            let err: AppError = e.into();
            error_from_app(&err)
        }
    }
}
