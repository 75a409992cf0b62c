//! Form submission service
//!
//! 联系表单与邮件订阅的业务逻辑。数据只保存在进程内存中，
//! HTTP handler 只负责提取参数与映射响应。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::utils::{require_text, validate_email};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 5000;

// ============ Request/Response DTOs ============

/// 联系表单请求，body 中的 csrf_token 等额外字段会被忽略
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

// ============ Service ============

#[derive(Default)]
pub struct FormService {
    inbox: RwLock<Vec<ContactMessage>>,
    subscribers: DashMap<String, DateTime<Utc>>,
}

impl FormService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验并保存联系表单
    pub fn submit_contact(&self, req: ContactRequest) -> Result<ContactMessage> {
        let name = require_text("name", &req.name, MAX_NAME_LEN)?;
        let email = validate_email(&req.email)?;
        let message = require_text("message", &req.message, MAX_MESSAGE_LEN)?;

        let submission = ContactMessage {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            message,
            received_at: Utc::now(),
        };

        self.inbox.write().push(submission.clone());
        info!("Contact message {} received", submission.id);
        Ok(submission)
    }

    /// 订阅邮件，同一地址（忽略大小写）只能订阅一次
    pub fn subscribe(&self, req: SubscribeRequest) -> Result<Subscription> {
        let email = validate_email(&req.email)?;

        match self.subscribers.entry(email.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "'{}' is already subscribed",
                email
            ))),
            Entry::Vacant(slot) => {
                let subscribed_at = Utc::now();
                slot.insert(subscribed_at);
                info!("New subscriber registered");
                Ok(Subscription {
                    email,
                    subscribed_at,
                })
            }
        }
    }

    pub fn inbox(&self) -> Vec<ContactMessage> {
        self.inbox.read().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_subscribed(&self, email: &str) -> bool {
        self.subscribers
            .contains_key(email.trim().to_lowercase().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_submit_contact_normalizes_fields() {
        let service = FormService::new();
        let saved = service
            .submit_contact(contact(" Ada ", "Ada@Example.org", "hello"))
            .unwrap();
        assert_eq!(saved.name, "Ada");
        assert_eq!(saved.email, "ada@example.org");
        assert_eq!(service.inbox().len(), 1);
    }

    #[test]
    fn test_submit_contact_rejects_invalid() {
        let service = FormService::new();
        let err = service
            .submit_contact(contact("Ada", "not-an-email", "hello"))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .submit_contact(contact("Ada", "ada@example.org", "  "))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.inbox().is_empty());
    }

    #[test]
    fn test_duplicate_subscription_conflicts() {
        let service = FormService::new();
        let req = |email: &str| SubscribeRequest {
            email: email.to_string(),
        };

        assert!(service.subscribe(req("reader@example.org")).is_ok());
        let err = service.subscribe(req("READER@example.org")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(service.subscriber_count(), 1);
        assert!(service.is_subscribed("Reader@Example.org"));
    }
}
