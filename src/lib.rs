//! csrfgate - CSRF token issuance and verification
//!
//! 核心是 [`csrf`] 模块中的 Guard：签发带 HMAC 签名的短期 token，
//! 并在状态变更请求执行前校验。其余模块把 Guard 包装为 actix-web 服务与 CLI。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface (default)
//!
//! # Architecture
//! - `csrf`: token 线格式、无状态 / 一次性 Guard、时钟
//! - `api`: HTTP 中间件、handler 与路由
//! - `services`: 表单业务逻辑
//! - `config`: 配置加载与校验
//! - `runtime`: 启动、关闭与运行模式
//! - `system`: 日志初始化
//! - `interfaces`: CLI 命令实现

pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod csrf;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
