/// Authentication routes
///
/// Login verifies the password and hands out an access token in the
/// body plus a refresh token in an HTTP-only cookie. Refresh redeems
/// that cookie for a new pair, rotating the cookie in the process.

use actix_web::{
    cookie::{
        time::{Duration as CookieDuration, OffsetDateTime},
        Cookie, SameSite,
    },
    web, HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{
    issue_token_pair, redeem_refresh_token, verify_password, RefreshRegistry, SessionClaims,
    REFRESH_COOKIE,
};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::validators::is_valid_phone;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Refresh cookie: HTTP-only and secure, SameSite=None so browser
/// clients on another origin can send it. Its lifetime is configured
/// separately from the token's signed validity.
fn refresh_cookie(token: String, ttl_seconds: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, token)
        .path("/")
        .expires(OffsetDateTime::now_utc() + CookieDuration::seconds(ttl_seconds))
        .same_site(SameSite::None)
        .http_only(true)
        .secure(true)
        .finish()
}

/// POST /auth/login
///
/// "Unknown phone" and "wrong password" produce the same failure, so
/// callers cannot probe which phone numbers exist. Nothing is issued or
/// registered unless the password verifies.
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    auth_config: web::Data<AuthSettings>,
    registry: web::Data<RefreshRegistry>,
) -> Result<HttpResponse, AppError> {
    let phone = is_valid_phone(&form.phone)?;

    let user = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, password_hash FROM users WHERE phone = $1",
    )
    .bind(&phone)
    .fetch_optional(pool.get_ref())
    .await?;

    complete_login(
        user,
        &form.password,
        phone,
        auth_config.get_ref(),
        registry.get_ref(),
    )
}

/// Everything after the user lookup: password check, pair minting, the
/// cookie-carrying response. A missing user and a wrong password are
/// indistinguishable from the outside.
fn complete_login(
    user: Option<(Uuid, String)>,
    password: &str,
    phone: String,
    auth_config: &AuthSettings,
    registry: &RefreshRegistry,
) -> Result<HttpResponse, AppError> {
    let (user_id, password_hash) =
        user.ok_or(AppError::Auth(AuthError::InvalidCredentials))?;
    if !verify_password(password, &password_hash) {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let session = SessionClaims { user_id, phone };
    let pair = issue_token_pair(&session, auth_config, registry)?;

    tracing::info!(user_id = %user_id, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            pair.refresh_token,
            auth_config.refresh_cookie_ttl,
        ))
        .json(TokenResponse {
            token: pair.access_token,
        }))
}

/// POST /auth/refresh
///
/// Reads the refresh token from its cookie only. The spent token's
/// registry entry is gone after this returns, successfully or not once
/// redemption started; the response carries the replacement cookie.
pub async fn refresh(
    req: HttpRequest,
    auth_config: web::Data<AuthSettings>,
    registry: web::Data<RefreshRegistry>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or(AppError::Auth(AuthError::Unauthenticated))?;

    let pair = redeem_refresh_token(cookie.value(), auth_config.get_ref(), registry.get_ref())?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            pair.refresh_token,
            auth_config.refresh_cookie_ttl,
        ))
        .json(TokenResponse {
            token: pair.access_token,
        }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub phone: String,
}

/// GET /api/me
///
/// Echoes the identity the auth middleware resolved for this request.
pub async fn me(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        id: user.user_id,
        phone: user.phone.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{
        body::to_bytes, dev::Service, error::ResponseError, http::StatusCode, App, HttpMessage,
    };
    use serde_json::Value;

    use crate::auth::{hash_password, verify_access_token};

    fn test_settings() -> AuthSettings {
        AuthSettings {
            access_secret: "login-test-access-secret-0123456789".to_string(),
            refresh_secret: "login-test-refresh-secret-9876543210".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 14400,
            refresh_cookie_ttl: 3600,
        }
    }

    #[test]
    fn refresh_cookie_attributes() {
        let cookie = refresh_cookie("some-token".to_string(), 3600);

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "some-token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert!(cookie.expires().is_some());
    }

    #[test]
    fn wrong_password_issues_nothing() {
        let auth = test_settings();
        let registry = RefreshRegistry::new();
        let hash = hash_password("CorrectHorse9").expect("Failed to hash");

        let err = complete_login(
            Some((Uuid::new_v4(), hash)),
            "WrongHorse9",
            "555-0100".to_string(),
            &auth,
            &registry,
        )
        .err()
        .expect("Wrong password was accepted");

        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_phone_reads_as_wrong_password() {
        let auth = test_settings();
        let registry = RefreshRegistry::new();

        let err = complete_login(None, "CorrectHorse9", "555-0100".to_string(), &auth, &registry)
            .err()
            .expect("Missing user was accepted");

        assert_eq!(err.code(), "INVALID_CREDENTIALS");
        assert!(registry.is_empty());
    }

    #[actix_web::test]
    async fn correct_password_mints_a_verifiable_pair() {
        let auth = test_settings();
        let registry = RefreshRegistry::new();
        let user_id = Uuid::new_v4();
        let hash = hash_password("CorrectHorse9").expect("Failed to hash");

        let response = complete_login(
            Some((user_id, hash)),
            "CorrectHorse9",
            "555-0100".to_string(),
            &auth,
            &registry,
        )
        .expect("Login failed");

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == REFRESH_COOKIE)
            .expect("No refresh cookie set");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(registry.len(), 1);

        let body = to_bytes(response.into_body())
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body).expect("Body is not JSON");
        let token = body["token"].as_str().expect("No token in response");

        let claims = verify_access_token(token, &auth).expect("Token does not verify");
        assert_eq!(claims.user_id().expect("Bad subject"), user_id);
        assert_eq!(claims.phone, "555-0100");
    }

    #[actix_web::test]
    async fn me_reports_the_resolved_identity() {
        let user_id = Uuid::new_v4();
        let app = actix_web::test::init_service(
            App::new()
                .wrap_fn(move |req, srv| {
                    req.extensions_mut().insert(AuthenticatedUser {
                        user_id,
                        phone: "555-0100".to_string(),
                    });
                    srv.call(req)
                })
                .route("/me", web::get().to(me)),
        )
        .await;

        let req = actix_web::test::TestRequest::get().uri("/me").to_request();
        let body: Value = actix_web::test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["id"], user_id.to_string());
        assert_eq!(body["phone"], "555-0100");
    }
}
