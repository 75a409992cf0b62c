//! 表单字段验证
//!
//! 只做结构检查，不做 DNS / MX 查询。

/// 表单验证错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidationError {
    EmptyField(&'static str),
    TooLong { field: &'static str, max: usize },
    InvalidEmail(String),
}

impl std::fmt::Display for FormValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "Field '{}' cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "Field '{}' must be at most {} characters", field, max)
            }
            Self::InvalidEmail(email) => write!(f, "Invalid email address: {}", email),
        }
    }
}

impl std::error::Error for FormValidationError {}

/// RFC 5321 路径长度上限
pub const MAX_EMAIL_LEN: usize = 254;

/// 验证必填文本字段，返回去除首尾空白后的值
pub fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, FormValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormValidationError::EmptyField(field));
    }
    if value.chars().count() > max {
        return Err(FormValidationError::TooLong { field, max });
    }
    Ok(value.to_string())
}

/// 验证邮箱格式，返回规范化（小写）后的地址
///
/// 检查项目：
/// 1. 不为空，长度不超过 254
/// 2. 恰好一个 `@`，两侧非空
/// 3. 域名至少包含一个 `.`，且各段非空
/// 4. 不含空白字符
pub fn validate_email(email: &str) -> Result<String, FormValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(FormValidationError::EmptyField("email"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(FormValidationError::TooLong {
            field: "email",
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = || FormValidationError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert_eq!(
            validate_email("  Alice@Example.org "),
            Ok("alice@example.org".to_string())
        );
        assert!(validate_email("a.b+tag@sub.example.co").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert_eq!(
            validate_email(""),
            Err(FormValidationError::EmptyField("email"))
        );
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.org").is_err());
        assert!(validate_email("a@b@example.org").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@example..org").is_err());
        assert!(validate_email("a b@example.org").is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Ada ", 10), Ok("Ada".to_string()));
        assert_eq!(
            require_text("name", "   ", 10),
            Err(FormValidationError::EmptyField("name"))
        );
        assert_eq!(
            require_text("name", "abcdef", 5),
            Err(FormValidationError::TooLong {
                field: "name",
                max: 5
            })
        );
    }
}
