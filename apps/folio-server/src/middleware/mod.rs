//! Middleware, extractors and error mapping.

pub mod auth;
pub mod error;
pub mod request_id;

pub use request_id::RequestIdMiddleware;
