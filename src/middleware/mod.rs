pub mod auth;
pub mod cors;
pub mod request_logger;

pub use auth::{require_auth, AuthenticatedUser};
pub use request_logger::request_logger_middleware;
