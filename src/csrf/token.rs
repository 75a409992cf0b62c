//! Token 线格式
//!
//! 编码后的 token 是 72 字节的 URL-safe Base64（无填充）：
//!
//! ```text
//! [0..32)   nonce（32 bytes = 256 bits 随机数）
//! [32..40)  issued_at（大端 i64 Unix 秒）
//! [40..72)  HMAC-SHA256(secret, bytes[0..40])
//! ```
//!
//! 72 字节恰好编码为 96 个字符且没有多余比特位，
//! 任意单字符替换都会改变解码结果并被 MAC 拒绝。

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

use crate::errors::{AppError, Result};

use super::error::CsrfError;

type HmacSha256 = Hmac<Sha256>;

pub const NONCE_LEN: usize = 32;
const TIMESTAMP_LEN: usize = 8;
pub const SIGNATURE_LEN: usize = 32;
const PAYLOAD_LEN: usize = NONCE_LEN + TIMESTAMP_LEN;
const TOKEN_LEN: usize = PAYLOAD_LEN + SIGNATURE_LEN;

/// 编码后的字符长度（72 bytes → 96 chars）
pub const ENCODED_LEN: usize = TOKEN_LEN / 3 * 4;

/// 服务端签名密钥
///
/// `Debug` 输出被遮蔽，避免密钥出现在日志中。
#[derive(Clone)]
pub struct CsrfSecret(Vec<u8>);

impl CsrfSecret {
    pub const MIN_LEN: usize = 32;

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < Self::MIN_LEN {
            return Err(AppError::invalid_config(format!(
                "csrf.secret must be at least {} bytes, got {}",
                Self::MIN_LEN,
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// 生成随机密钥
    pub fn generate(len: usize) -> Result<Self> {
        let bytes: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
        Self::new(bytes)
    }

    /// 以 URL-safe Base64 导出（用于 CLI 打印新密钥）
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for CsrfSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CsrfSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// 签名前的 token 内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPayload {
    pub nonce: [u8; NONCE_LEN],
    pub issued_at: i64,
}

impl TokenPayload {
    fn to_bytes(self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[..NONCE_LEN].copy_from_slice(&self.nonce);
        out[NONCE_LEN..].copy_from_slice(&self.issued_at.to_be_bytes());
        out
    }

    fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, CsrfError> {
        if bytes.len() != PAYLOAD_LEN {
            return Err(CsrfError::MalformedToken);
        }
        let (nonce, ts) = bytes.split_at(NONCE_LEN);
        let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| CsrfError::MalformedToken)?;
        let ts: [u8; TIMESTAMP_LEN] = ts.try_into().map_err(|_| CsrfError::MalformedToken)?;
        Ok(Self {
            nonce,
            issued_at: i64::from_be_bytes(ts),
        })
    }
}

/// 负责 token 的签名封装与校验解封
///
/// 持有已用密钥初始化的 HMAC 实例，每次签名时克隆。
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl TokenCodec {
    pub fn new(secret: &CsrfSecret) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| AppError::invalid_config(format!("invalid HMAC key: {}", e)))?;
        Ok(Self { mac })
    }

    fn sign(&self, payload: &[u8]) -> [u8; SIGNATURE_LEN] {
        let mut mac = self.mac.clone();
        mac.update(payload);
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        out
    }

    /// 签名并编码
    pub fn seal(&self, payload: TokenPayload) -> String {
        let body = payload.to_bytes();
        let signature = self.sign(&body);

        let mut raw = [0u8; TOKEN_LEN];
        raw[..PAYLOAD_LEN].copy_from_slice(&body);
        raw[PAYLOAD_LEN..].copy_from_slice(&signature);
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// 解码并校验签名
    ///
    /// 顺序固定：先检查结构（MalformedToken），再检查签名（InvalidSignature）。
    /// 过期判断由调用方完成。
    pub fn open(&self, encoded: &str) -> std::result::Result<TokenPayload, CsrfError> {
        if encoded.len() != ENCODED_LEN {
            return Err(CsrfError::MalformedToken);
        }

        let raw = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| CsrfError::MalformedToken)?;
        if raw.len() != TOKEN_LEN {
            return Err(CsrfError::MalformedToken);
        }

        let (body, signature) = raw.split_at(PAYLOAD_LEN);
        let expected = self.sign(body);

        // 常量时间比较，防止时序攻击
        if !bool::from(expected.as_slice().ct_eq(signature)) {
            return Err(CsrfError::InvalidSignature);
        }

        TokenPayload::from_bytes(body)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenCodec { .. }")
    }
}
