/// Token payload structures
///
/// Access tokens carry the subject directly; refresh tokens carry only
/// an opaque registry identifier so the reissuable claims stay on the
/// server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Claims encoded in an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Phone number the user logged in with
    pub phone: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessClaims {
    pub fn new(user_id: Uuid, phone: String, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            phone,
            exp: now + expiry_seconds,
            iat: now,
        }
    }

    /// Extract the subject's user ID.
    ///
    /// A token whose subject is not a UUID never referred to a real
    /// user, so this is an authentication failure rather than an
    /// internal one.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::Unauthenticated))
    }
}

/// Claims encoded in a refresh token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// Opaque registry identifier (UUID string), not user claims
    pub data: String,
    pub exp: i64,
    pub iat: i64,
}

impl RefreshClaims {
    pub fn new(registry_id: Uuid, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            data: registry_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_claims_carry_subject() {
        let user_id = Uuid::new_v4();
        let claims = AccessClaims::new(user_id, "555-0100".to_string(), 3600);

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.phone, "555-0100");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn non_uuid_subject_is_unauthenticated() {
        let mut claims = AccessClaims::new(Uuid::new_v4(), "555-0100".to_string(), 3600);
        claims.sub = "not-a-uuid".to_string();

        match claims.user_id() {
            Err(AppError::Auth(AuthError::Unauthenticated)) => (),
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn refresh_claims_carry_only_the_identifier() {
        let id = Uuid::new_v4();
        let claims = RefreshClaims::new(id, 14400);

        assert_eq!(claims.data, id.to_string());
        assert_eq!(claims.exp, claims.iat + 14400);
    }
}
