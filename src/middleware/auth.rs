/// Access-token enforcement middleware
///
/// Runs before every data handler. The token is looked for in four
/// places, first non-empty source wins: JSON body field `token`, query
/// parameter `token`, `x-access-token` header, `Authorization: Bearer`.
/// After the signature checks out, the subject must still resolve to an
/// existing user row; a deleted account invalidates otherwise-valid
/// tokens. On any failure the request is rejected before the handler
/// runs.

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::PayloadError,
    http::header,
    web, Error, HttpMessage,
};
use futures::{future::LocalBoxFuture, StreamExt};
use sqlx::PgPool;
use std::collections::HashMap;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::verify_access_token;
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

/// Identity of the verified caller, injected into request extensions
/// for handlers that need it (`web::ReqData<AuthenticatedUser>`).
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub phone: String,
}

pub struct AuthMiddleware {
    auth_config: AuthSettings,
}

impl AuthMiddleware {
    pub fn new(auth_config: AuthSettings) -> Self {
        Self { auth_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            auth_config: self.auth_config.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    auth_config: AuthSettings,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth_config = self.auth_config.clone();

        Box::pin(async move {
            let body_token = extract_body_token(&mut req).await?;
            let token = extract_access_token(body_token, &req)
                .ok_or(AppError::Auth(AuthError::Unauthenticated))?;

            let claims = verify_access_token(&token, &auth_config)?;
            let user_id = claims.user_id()?;

            // The token may be younger than the account's deletion.
            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("Database pool not configured".to_string()))?;
            let known_user = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(pool.get_ref())
                .await
                .map_err(AppError::from)?;
            if known_user.is_none() {
                tracing::warn!(user_id = %user_id, "Valid token for unknown user");
                return Err(AppError::Auth(AuthError::Unauthenticated).into());
            }

            req.extensions_mut().insert(AuthenticatedUser {
                user_id,
                phone: claims.phone.clone(),
            });

            service.call(req).await
        })
    }
}

/// Pick the access token from the non-body sources, in priority order.
/// A body-sourced token (already pulled out by the caller) wins over
/// all of them.
fn extract_access_token(body_token: Option<String>, req: &ServiceRequest) -> Option<String> {
    body_token
        .and_then(non_empty)
        .or_else(|| query_token(req))
        .or_else(|| header_token(req))
        .or_else(|| bearer_token(req))
}

fn non_empty(token: String) -> Option<String> {
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn query_token(req: &ServiceRequest) -> Option<String> {
    let params = web::Query::<HashMap<String, String>>::from_query(req.query_string()).ok()?;
    params.get("token").cloned().and_then(non_empty)
}

fn header_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("x-access-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .and_then(non_empty)
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .and_then(non_empty)
}

/// Pull the `token` field out of a JSON body, then put the buffered
/// bytes back so downstream extractors still see the payload.
async fn extract_body_token(req: &mut ServiceRequest) -> Result<Option<String>, Error> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Ok(None);
    }

    let mut payload = req.take_payload();
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        body.extend_from_slice(&chunk?);
    }
    let body = body.freeze();

    let token = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("token")
                .and_then(|token| token.as_str())
                .map(str::to_string)
        });

    req.set_payload(bytes_to_payload(body));
    Ok(token)
}

fn bytes_to_payload(bytes: web::Bytes) -> Payload {
    let stream = futures::stream::once(async move { Ok::<_, PayloadError>(bytes) });
    Payload::Stream {
        payload: Box::pin(stream),
    }
}
