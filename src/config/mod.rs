//! 配置模块
//!
//! 启动时从 config.toml + 环境变量加载一次，之后以只读方式显式传递，
//! 不提供全局单例。

mod structs;
pub mod validators;

pub use structs::*;
pub use validators::validate;
