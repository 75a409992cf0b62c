//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::csrf::CsrfError;
use crate::errors::AppError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: CSRF 错误
/// - 3000-3099: 表单验证错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    PayloadTooLarge = 1013,
    ServiceUnavailable = 1030,

    // CSRF 错误 2000-2099
    CsrfMissing = 2000,
    CsrfInvalid = 2003,
    CsrfExpired = 2005,

    // 表单验证错误 3000-3099
    FormValidation = 3000,
}

impl From<&AppError> for ErrorCode {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::CsrfMissing(_) => ErrorCode::CsrfMissing,
            AppError::CsrfInvalid(_) => ErrorCode::CsrfInvalid,
            AppError::CsrfExpired(_) => ErrorCode::CsrfExpired,
            AppError::Validation(_) => ErrorCode::FormValidation,
            AppError::Serialization(_) => ErrorCode::BadRequest,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InvalidConfig(_)
            | AppError::ConfigLoad(_)
            | AppError::FileOperation(_)
            | AppError::Internal(_) => ErrorCode::InternalServerError,
        }
    }
}

impl From<AppError> for ErrorCode {
    fn from(err: AppError) -> Self {
        ErrorCode::from(&err)
    }
}

impl From<CsrfError> for ErrorCode {
    fn from(err: CsrfError) -> Self {
        ErrorCode::from(&AppError::from(err))
    }
}
