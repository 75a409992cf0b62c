//! CSRF token 签发与校验
//!
//! - `token`: 线格式与 HMAC 签名
//! - `guard`: 无状态 Guard 与 [`CsrfProtector`] 接口
//! - `one_time`: 基于服务端登记表的一次性 Guard
//! - `clock`: 可注入的时间源

pub mod clock;
pub mod error;
pub mod guard;
pub mod one_time;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CsrfError;
pub use guard::{CsrfGuard, CsrfProtector, IssuedToken, VerifiedToken, ttl_from_secs};
pub use one_time::OneTimeCsrfGuard;
pub use token::{CsrfSecret, ENCODED_LEN, TokenCodec};

use std::sync::Arc;
use tracing::info;

use crate::config::{CsrfMode, CsrfSettings};
use crate::errors::Result;

/// 按配置构建 Guard
///
/// 密钥缺失或过短属于致命配置错误，在启动阶段返回。
pub fn build_protector(
    settings: &CsrfSettings,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn CsrfProtector>> {
    let secret = CsrfSecret::new(settings.secret.as_bytes().to_vec())?;
    let ttl = ttl_from_secs(settings.token_ttl_secs)?;
    let guard = CsrfGuard::new(&secret, ttl, clock)?;

    let protector: Arc<dyn CsrfProtector> = match settings.mode {
        CsrfMode::Stateless => Arc::new(guard),
        CsrfMode::OneTime => Arc::new(OneTimeCsrfGuard::new(guard)),
    };

    info!(
        "CSRF guard ready: mode={}, ttl={}s",
        settings.mode, settings.token_ttl_secs
    );
    Ok(protector)
}
