/// Token issuing and redemption
///
/// Access tokens are stateless: signature plus expiry fully determine
/// validity. Refresh tokens are signed envelopes around an opaque
/// registry identifier and are single-use; redeeming one rotates the
/// whole pair. Access and refresh tokens are signed with distinct
/// secrets so compromising one key does not allow forging the other.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use uuid::Uuid;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::auth::registry::{RefreshRegistry, SessionClaims};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// Freshly minted access + refresh tokens
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Sign an access token for the given session.
///
/// # Errors
/// Returns an internal error if signing fails.
pub fn issue_access_token(
    session: &SessionClaims,
    config: &AuthSettings,
) -> Result<String, AppError> {
    let claims = AccessClaims::new(
        session.user_id,
        session.phone.clone(),
        config.access_token_expiry,
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.access_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Mint an access + refresh pair and register the refresh entry.
///
/// The refresh token embeds only a fresh opaque identifier; the claims
/// it stands for live in the registry until redeemed or swept.
pub fn issue_token_pair(
    session: &SessionClaims,
    config: &AuthSettings,
    registry: &RefreshRegistry,
) -> Result<TokenPair, AppError> {
    let access_token = issue_access_token(session, config)?;

    let registry_id = Uuid::new_v4();
    let refresh_claims = RefreshClaims::new(registry_id, config.refresh_token_expiry);
    let refresh_token = encode(
        &Header::default(),
        &refresh_claims,
        &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    registry.insert(registry_id, session.clone(), config.refresh_token_expiry);

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Validate an access token and extract its claims.
///
/// # Errors
/// `TokenExpired` for a well-signed token past its window; anything
/// else (tampered, malformed, wrong key) is `Unauthenticated`.
pub fn verify_access_token(token: &str, config: &AuthSettings) -> Result<AccessClaims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(config.access_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Auth(AuthError::TokenExpired),
        _ => {
            tracing::warn!("Access token rejected: {}", e);
            AppError::Auth(AuthError::Unauthenticated)
        }
    })
}

/// Redeem a refresh token and mint a replacement pair.
///
/// All failure modes (bad signature, expired, unknown or already-spent
/// identifier) collapse into `Unauthenticated`; the refresh path leaks
/// nothing about why a token was rejected.
///
/// The registry entry is removed *before* the replacement is minted:
/// a crash between the two steps loses the session instead of leaving
/// the old token redeemable a second time.
pub fn redeem_refresh_token(
    token: &str,
    config: &AuthSettings,
    registry: &RefreshRegistry,
) -> Result<TokenPair, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(config.refresh_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!("Refresh token rejected: {}", e);
        AppError::Auth(AuthError::Unauthenticated)
    })?;

    let registry_id =
        Uuid::parse_str(&claims.data).map_err(|_| AppError::Auth(AuthError::Unauthenticated))?;

    let session = registry
        .take(&registry_id)
        .ok_or(AppError::Auth(AuthError::Unauthenticated))?;

    issue_token_pair(&session, config, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthSettings {
        AuthSettings {
            access_secret: "access-secret-for-tests-0123456789".to_string(),
            refresh_secret: "refresh-secret-for-tests-9876543210".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 14400,
            refresh_cookie_ttl: 3600,
        }
    }

    fn session() -> SessionClaims {
        SessionClaims {
            user_id: Uuid::new_v4(),
            phone: "555-0100".to_string(),
        }
    }

    #[test]
    fn issued_access_token_verifies_to_same_subject() {
        let config = test_config();
        let session = session();

        let token = issue_access_token(&session, &config).expect("failed to issue");
        let claims = verify_access_token(&token, &config).expect("failed to verify");

        assert_eq!(claims.user_id().unwrap(), session.user_id);
        assert_eq!(claims.phone, session.phone);
    }

    #[test]
    fn expired_access_token_fails_with_token_expired() {
        let mut config = test_config();
        // Well past the decoder's clock-skew leeway.
        config.access_token_expiry = -120;

        let token = issue_access_token(&session(), &config).expect("failed to issue");

        match verify_access_token(&token, &config) {
            Err(AppError::Auth(AuthError::TokenExpired)) => (),
            other => panic!("expected TokenExpired, got {:?}", other),
        }
    }

    #[test]
    fn tampered_access_token_is_unauthenticated() {
        let config = test_config();
        let token = issue_access_token(&session(), &config).expect("failed to issue");

        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).expect("still utf8");

        match verify_access_token(&tampered, &config) {
            Err(AppError::Auth(AuthError::Unauthenticated)) => (),
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn garbage_access_token_is_unauthenticated() {
        let config = test_config();

        match verify_access_token("definitely.not.a-token", &config) {
            Err(AppError::Auth(AuthError::Unauthenticated)) => (),
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn access_token_does_not_verify_as_refresh_token() {
        let config = test_config();
        let registry = RefreshRegistry::new();

        // Signed with the access secret; the refresh path must reject it.
        let token = issue_access_token(&session(), &config).expect("failed to issue");

        assert!(redeem_refresh_token(&token, &config, &registry).is_err());
    }

    #[test]
    fn pair_issuance_registers_exactly_one_entry() {
        let config = test_config();
        let registry = RefreshRegistry::new();

        issue_token_pair(&session(), &config, &registry).expect("failed to issue pair");

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn refresh_token_is_single_use() {
        let config = test_config();
        let registry = RefreshRegistry::new();
        let session = session();

        let pair = issue_token_pair(&session, &config, &registry).expect("failed to issue pair");

        let rotated = redeem_refresh_token(&pair.refresh_token, &config, &registry)
            .expect("first redemption should succeed");
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // The original refresh token was spent by the first redemption.
        match redeem_refresh_token(&pair.refresh_token, &config, &registry) {
            Err(AppError::Auth(AuthError::Unauthenticated)) => (),
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn rotated_pair_redeems_for_the_same_subject() {
        let config = test_config();
        let registry = RefreshRegistry::new();
        let session = session();

        let pair = issue_token_pair(&session, &config, &registry).expect("failed to issue pair");
        let rotated =
            redeem_refresh_token(&pair.refresh_token, &config, &registry).expect("rotation failed");

        let claims =
            verify_access_token(&rotated.access_token, &config).expect("new access token invalid");
        assert_eq!(claims.user_id().unwrap(), session.user_id);
    }

    #[test]
    fn well_signed_but_unregistered_refresh_token_is_rejected() {
        let config = test_config();
        // Fresh registry simulates a process restart: signatures verify
        // but no entry exists.
        let registry = RefreshRegistry::new();

        let orphan = {
            let issuing_registry = RefreshRegistry::new();
            issue_token_pair(&session(), &config, &issuing_registry)
                .expect("failed to issue pair")
                .refresh_token
        };

        match redeem_refresh_token(&orphan, &config, &registry) {
            Err(AppError::Auth(AuthError::Unauthenticated)) => (),
            other => panic!("expected Unauthenticated, got {:?}", other),
        }
    }
}
