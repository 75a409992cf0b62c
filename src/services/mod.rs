//! Service layer for business logic
//!
//! HTTP handler 与 CLI 共享的业务逻辑。

mod form_service;

pub use form_service::*;
