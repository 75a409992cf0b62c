//! 一次性 CSRF Guard
//!
//! 在无状态签名校验之上叠加服务端登记表：签发时记录 nonce，
//! 校验通过后原子删除。同一 token 在并发校验下至多成功一次。
//! 登记表只存在于当前进程，多实例部署需要会话粘滞。
//!
//! 登记数量超过阈值时，签发会先同步清理过期条目；登记表大小因此受
//! `阈值 + 一个有效期内的签发量` 约束，不依赖后台清理任务或签发限流。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::config::CsrfMode;

use super::error::CsrfError;
use super::guard::{CsrfGuard, CsrfProtector, IssuedToken, VerifiedToken};
use super::token::NONCE_LEN;

/// 签发时触发同步清理的登记数量
pub const DEFAULT_PURGE_THRESHOLD: usize = 10_000;

pub struct OneTimeCsrfGuard {
    inner: CsrfGuard,
    outstanding: DashMap<[u8; NONCE_LEN], DateTime<Utc>>,
    purge_threshold: usize,
}

impl OneTimeCsrfGuard {
    pub fn new(inner: CsrfGuard) -> Self {
        Self {
            inner,
            outstanding: DashMap::new(),
            purge_threshold: DEFAULT_PURGE_THRESHOLD,
        }
    }

    pub fn with_purge_threshold(mut self, threshold: usize) -> Self {
        self.purge_threshold = threshold;
        self
    }

    /// 已签发但尚未消费的 token 数量
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

impl CsrfProtector for OneTimeCsrfGuard {
    fn issue(&self) -> IssuedToken {
        if self.outstanding.len() >= self.purge_threshold {
            self.purge_expired();
        }

        let (token, nonce) = self.inner.mint();
        self.outstanding.insert(nonce, token.expires_at);
        token
    }

    fn verify(&self, token: Option<&str>) -> Result<VerifiedToken, CsrfError> {
        let verified = self.inner.verify(token)?;

        // check-and-delete 必须是单个原子操作
        match self.outstanding.remove(&verified.nonce) {
            Some(_) => Ok(verified),
            None => Err(CsrfError::AlreadyUsed),
        }
    }

    fn mode(&self) -> CsrfMode {
        CsrfMode::OneTime
    }

    fn purge_expired(&self) -> usize {
        let now = self.inner.clock().now();
        let before = self.outstanding.len();
        self.outstanding.retain(|_, expires_at| *expires_at >= now);
        let purged = before.saturating_sub(self.outstanding.len());
        if purged > 0 {
            debug!("Purged {} expired one-time CSRF tokens", purged);
        }
        purged
    }
}
