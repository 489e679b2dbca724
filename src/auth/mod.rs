/// Authentication module
///
/// Token issuing/validation, password hashing, and the server-side
/// refresh-token registry.

mod claims;
mod jwt;
mod password;
mod registry;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use jwt::issue_access_token;
pub use jwt::issue_token_pair;
pub use jwt::redeem_refresh_token;
pub use jwt::verify_access_token;
pub use jwt::TokenPair;
pub use password::hash_password;
pub use password::verify_password;
pub use registry::RefreshRegistry;
pub use registry::SessionClaims;

/// Name of the cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh_token";
