//! HTTP 层：中间件、handler 与路由装配

pub mod constants;
pub mod context;
pub mod middleware;
pub mod services;

pub use context::AppContext;
