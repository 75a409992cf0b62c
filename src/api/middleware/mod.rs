pub mod csrf;
pub mod request_id;

pub use csrf::CsrfMiddleware;
pub use request_id::{RequestId, RequestIdMiddleware};
