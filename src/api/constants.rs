//! API 模块常量定义

/// Token 签发接口路径（相对 api_prefix）
pub const CSRF_ISSUE_PATH: &str = "/csrf";

/// 签发响应不可被缓存
pub const NO_STORE: &str = "no-store";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 客户端传入的请求 ID 最大长度，超出则重新生成
pub const MAX_REQUEST_ID_LEN: usize = 64;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
