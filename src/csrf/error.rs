use std::fmt;

/// CSRF 校验失败的具体原因
///
/// 所有变体都是客户端可纠正的错误：客户端应重新获取 token 后重试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    /// 请求未携带 token（或为空串）
    MissingToken,
    /// 无法解码为 nonce + 时间戳 + 签名
    MalformedToken,
    /// HMAC 签名与服务端重新计算的不一致
    InvalidSignature,
    /// 已超过有效期
    Expired,
    /// 一次性模式下 token 已被消费
    AlreadyUsed,
}

impl CsrfError {
    /// 稳定的机器可读标识，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            CsrfError::MissingToken => "missing_token",
            CsrfError::MalformedToken => "malformed_token",
            CsrfError::InvalidSignature => "invalid_signature",
            CsrfError::Expired => "expired",
            CsrfError::AlreadyUsed => "already_used",
        }
    }

    /// 面向客户端的描述，不包含 token 结构或密钥信息
    pub fn public_message(&self) -> &'static str {
        match self {
            CsrfError::MissingToken => "CSRF token missing",
            CsrfError::Expired => "CSRF token expired, request a new one",
            CsrfError::AlreadyUsed => "CSRF token already used, request a new one",
            CsrfError::MalformedToken | CsrfError::InvalidSignature => "CSRF token invalid",
        }
    }
}

impl fmt::Display for CsrfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsrfError::MissingToken => write!(f, "CSRF token is missing"),
            CsrfError::MalformedToken => write!(f, "CSRF token is malformed"),
            CsrfError::InvalidSignature => write!(f, "CSRF token signature is invalid"),
            CsrfError::Expired => write!(f, "CSRF token has expired"),
            CsrfError::AlreadyUsed => write!(f, "CSRF token has already been used"),
        }
    }
}

impl std::error::Error for CsrfError {}
