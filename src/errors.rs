use std::fmt;

use actix_web::http::StatusCode;

use crate::csrf::CsrfError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidConfig(String),
    ConfigLoad(String),
    CsrfMissing(String),
    CsrfInvalid(String),
    CsrfExpired(String),
    Validation(String),
    Conflict(String),
    NotFound(String),
    Serialization(String),
    FileOperation(String),
    Internal(String),
}

impl AppError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidConfig(_) => "E001",
            AppError::ConfigLoad(_) => "E002",
            AppError::CsrfMissing(_) => "E003",
            AppError::CsrfInvalid(_) => "E004",
            AppError::CsrfExpired(_) => "E005",
            AppError::Validation(_) => "E006",
            AppError::Conflict(_) => "E007",
            AppError::NotFound(_) => "E008",
            AppError::Serialization(_) => "E009",
            AppError::FileOperation(_) => "E010",
            AppError::Internal(_) => "E011",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidConfig(_) => "Invalid Configuration",
            AppError::ConfigLoad(_) => "Configuration Load Error",
            AppError::CsrfMissing(_) => "CSRF Token Missing",
            AppError::CsrfInvalid(_) => "CSRF Token Invalid",
            AppError::CsrfExpired(_) => "CSRF Token Expired",
            AppError::Validation(_) => "Validation Error",
            AppError::Conflict(_) => "Conflict",
            AppError::NotFound(_) => "Resource Not Found",
            AppError::Serialization(_) => "Serialization Error",
            AppError::FileOperation(_) => "File Operation Error",
            AppError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidConfig(msg)
            | AppError::ConfigLoad(msg)
            | AppError::CsrfMissing(msg)
            | AppError::CsrfInvalid(msg)
            | AppError::CsrfExpired(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::Serialization(msg)
            | AppError::FileOperation(msg)
            | AppError::Internal(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            AppError::CsrfMissing(_) | AppError::CsrfInvalid(_) | AppError::CsrfExpired(_) => {
                StatusCode::FORBIDDEN
            }
            AppError::Validation(_) | AppError::Serialization(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidConfig(_)
            | AppError::ConfigLoad(_)
            | AppError::FileOperation(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为客户端可纠正的错误
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AppError {}

// 便捷的构造函数
impl AppError {
    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidConfig(msg.into())
    }

    pub fn config_load<T: Into<String>>(msg: T) -> Self {
        AppError::ConfigLoad(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        AppError::FileOperation(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        AppError::Internal(msg.into())
    }
}

impl From<CsrfError> for AppError {
    fn from(err: CsrfError) -> Self {
        let msg = err.public_message().to_string();
        match err {
            CsrfError::MissingToken => AppError::CsrfMissing(msg),
            CsrfError::MalformedToken | CsrfError::InvalidSignature => AppError::CsrfInvalid(msg),
            CsrfError::Expired | CsrfError::AlreadyUsed => AppError::CsrfExpired(msg),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigLoad(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
