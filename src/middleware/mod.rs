/// Middleware module
///
/// Request-level concerns: access-token enforcement and request logging.

mod auth;
mod request_logger;

pub use auth::AuthMiddleware;
pub use auth::AuthenticatedUser;
pub use request_logger::RequestLogger;
