use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::trace;

use crate::config::CsrfMode;
use crate::config::validators::MAX_TOKEN_TTL_SECS;
use crate::errors::{AppError, Result};

use super::clock::{Clock, SystemClock};
use super::error::CsrfError;
use super::token::{CsrfSecret, NONCE_LEN, TokenCodec, TokenPayload};

/// 新签发的 token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// 通过校验的 token 信息，中间件会将其放入 request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub(crate) nonce: [u8; NONCE_LEN],
}

/// CSRF 防护统一接口
///
/// HTTP 层只依赖 `Arc<dyn CsrfProtector>`，无状态与一次性两种实现可互换。
pub trait CsrfProtector: Send + Sync {
    fn issue(&self) -> IssuedToken;

    fn verify(&self, token: Option<&str>) -> std::result::Result<VerifiedToken, CsrfError>;

    fn mode(&self) -> CsrfMode;

    /// 清理过期的服务端状态，返回清理数量（无状态实现为空操作）
    fn purge_expired(&self) -> usize {
        0
    }
}

/// 配置中的秒数转换为有效期，超出 i64 / chrono 可表示范围时返回配置错误
pub fn ttl_from_secs(secs: u64) -> Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| {
            AppError::invalid_config(format!("csrf.token_ttl_secs {} is out of range", secs))
        })
}

/// 无状态 CSRF Guard
///
/// token = nonce + 签发时间 + HMAC，校验只依赖密钥与时钟，
/// 多实例部署时共享同一密钥即可。
pub struct CsrfGuard {
    codec: TokenCodec,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CsrfGuard {
    pub fn new(secret: &CsrfSecret, ttl: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(AppError::invalid_config("CSRF token TTL must be positive"));
        }
        // 上限保证 issued_at + ttl 不会越出 chrono 的时间范围
        if ttl > Duration::seconds(MAX_TOKEN_TTL_SECS as i64) {
            return Err(AppError::invalid_config(format!(
                "CSRF token TTL must not exceed {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Ok(Self {
            codec: TokenCodec::new(secret)?,
            ttl,
            clock,
        })
    }

    pub fn with_system_clock(secret: &CsrfSecret, ttl: Duration) -> Result<Self> {
        Self::new(secret, ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// 签发并返回 nonce，供一次性实现登记
    pub(crate) fn mint(&self) -> (IssuedToken, [u8; NONCE_LEN]) {
        let nonce: [u8; NONCE_LEN] = rand::random();
        let now = self.clock.now();
        let issued_secs = now.timestamp();

        let value = self.codec.seal(TokenPayload {
            nonce,
            issued_at: issued_secs,
        });

        // 线格式只保留秒级精度
        let issued_at = DateTime::from_timestamp(issued_secs, 0).unwrap_or(now);
        trace!("CSRF token issued at {}", issued_at);

        (
            IssuedToken {
                value,
                issued_at,
                expires_at: issued_at + self.ttl,
            },
            nonce,
        )
    }
}

impl CsrfProtector for CsrfGuard {
    fn issue(&self) -> IssuedToken {
        self.mint().0
    }

    fn verify(&self, token: Option<&str>) -> std::result::Result<VerifiedToken, CsrfError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CsrfError::MissingToken)?;

        let payload = self.codec.open(token)?;

        let issued_at =
            DateTime::from_timestamp(payload.issued_at, 0).ok_or(CsrfError::MalformedToken)?;
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or(CsrfError::MalformedToken)?;

        if self.clock.now() > expires_at {
            return Err(CsrfError::Expired);
        }

        Ok(VerifiedToken {
            issued_at,
            expires_at,
            nonce: payload.nonce,
        })
    }

    fn mode(&self) -> CsrfMode {
        CsrfMode::Stateless
    }
}
