//! Authentication Middleware
//! Mission: Gate admin endpoints behind a bearer token and a role allow-set
//!
//! `authenticate` must wrap `authorize`; a request without a verified account
//! never reaches the role check.

use crate::auth::{
    api::AuthState,
    jwt::TokenError,
    models::{Account, AdminRole},
};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// The verified account, inserted into request extensions by `authenticate`
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Validates the bearer token and loads the account it names
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidFormat)?;

    let claims = state.jwt_handler.validate_token(token).map_err(|e| match e {
        TokenError::Expired => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    let account = state
        .account_store
        .get_by_id(&account_id)
        .map_err(|e| AuthError::Store(e.to_string()))?
        .ok_or(AuthError::UnknownAccount)?;

    debug!("Authenticated {} ({})", account.email, account.role);
    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}

/// Rejects accounts whose current role is outside `allowed`
pub async fn authorize(
    State(allowed): State<&'static [AdminRole]>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let CurrentAccount(account) = extract_account(&req)
        .cloned()
        .ok_or(AuthError::MissingToken)?;

    match account.admin_role() {
        Some(role) if allowed.contains(&role) => Ok(next.run(req).await),
        _ => {
            warn!(
                "🚫 {} ({}) denied {} {}",
                account.email,
                account.role,
                req.method(),
                req.uri().path()
            );
            let roles: Vec<&str> = allowed.iter().map(|r| r.as_str()).collect();
            Err(AuthError::Forbidden(roles.join(", ")))
        }
    }
}

/// Extract the current account from request (use after `authenticate`)
pub fn extract_account(req: &Request) -> Option<&CurrentAccount> {
    req.extensions().get::<CurrentAccount>()
}

/// Auth error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authorized to access this route. Please provide a token.")]
    MissingToken,
    #[error("Invalid authorization format. Use: Bearer <token>")]
    InvalidFormat,
    #[error("Invalid token. Please log in again.")]
    InvalidToken,
    #[error("Token expired. Please log in again.")]
    ExpiredToken,
    #[error("Admin user not found. Token may be expired.")]
    UnknownAccount,
    #[error("Access denied. This action requires one of the following roles: {0}")]
    Forbidden(String),
    #[error("account lookup failed: {0}")]
    Store(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            AuthError::Store(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
            other => {
                warn!("🔒 Rejected request: {}", other);
                ApiError::Unauthenticated(other.to_string())
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        account_store::AccountStore, jwt::JwtHandler, models::SUPERADMIN_ONLY, EmailPolicy,
    };
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AuthState {
        AuthState::new(
            Arc::new(AccountStore::in_memory().unwrap().with_hash_cost(4)),
            Arc::new(JwtHandler::new("middleware-test-secret".to_string())),
            EmailPolicy::unrestricted(),
        )
    }

    fn guarded(state: AuthState) -> Router {
        Router::new()
            .route("/superadmin", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(SUPERADMIN_ONLY, authorize))
            .route_layer(from_fn_with_state(state, authenticate))
    }

    async fn call(app: Router, auth: Option<String>) -> StatusCode {
        let mut req = HttpRequest::builder().uri("/superadmin");
        if let Some(value) = auth {
            req = req.header(AUTHORIZATION, value);
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_auth_error_responses() {
        let missing = AuthError::MissingToken.into_response();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let expired = AuthError::ExpiredToken.into_response();
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthError::Forbidden("superadmin".to_string()).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_headers() {
        let state = state();
        assert_eq!(call(guarded(state.clone()), None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(guarded(state.clone()), Some("Token abc".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(guarded(state), Some("Bearer not.a.jwt".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_role_gate() {
        let state = state();
        let boss = state
            .account_store
            .create_account("Boss", "boss@court.com", "password123", "superadmin")
            .unwrap();
        let clerk = state
            .account_store
            .create_account("Clerk", "clerk@court.com", "password123", "clerk")
            .unwrap();

        let boss_token = state.jwt_handler.generate_token(&boss).unwrap();
        let clerk_token = state.jwt_handler.generate_token(&clerk).unwrap();

        assert_eq!(
            call(guarded(state.clone()), Some(format!("Bearer {boss_token}"))).await,
            StatusCode::OK
        );
        assert_eq!(
            call(guarded(state), Some(format!("Bearer {clerk_token}"))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_role_is_reread_on_every_request() {
        let state = state();
        let boss = state
            .account_store
            .create_account("Boss", "boss@court.com", "password123", "superadmin")
            .unwrap();
        let token = state.jwt_handler.generate_token(&boss).unwrap();

        state.account_store.update_role(&boss.id, "clerk").unwrap();
        assert_eq!(
            call(guarded(state), Some(format!("Bearer {token}"))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let state = state();
        let boss = state
            .account_store
            .create_account("Boss", "boss@court.com", "password123", "superadmin")
            .unwrap();
        let token = state
            .jwt_handler
            .generate_token_at(&boss, Utc::now() - Duration::days(31))
            .unwrap();
        assert_eq!(
            call(guarded(state), Some(format!("Bearer {token}"))).await,
            StatusCode::UNAUTHORIZED
        );
    }
}
