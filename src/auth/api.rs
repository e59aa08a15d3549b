//! Authentication API Endpoints
//! Mission: Register, log in and identify court administrators

use crate::auth::{
    account_store::AccountStore,
    jwt::JwtHandler,
    middleware::CurrentAccount,
    models::{AccountResponse, AdminRole, AuthResponse, LoginRequest, RegisterRequest},
    policy::EmailPolicy,
};
use crate::error::{ApiError, JsonBody};
use crate::store::{Database, StoreError};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub account_store: Arc<AccountStore>,
    pub jwt_handler: Arc<JwtHandler>,
    pub email_policy: EmailPolicy,
}

impl AuthState {
    pub fn new(
        account_store: Arc<AccountStore>,
        jwt_handler: Arc<JwtHandler>,
        email_policy: EmailPolicy,
    ) -> Self {
        Self {
            account_store,
            jwt_handler,
            email_policy,
        }
    }

    fn check_email(&self, email: &str) -> Result<(), ApiError> {
        if !self.email_policy.allows(email) {
            return Err(ApiError::Validation(self.email_policy.rejection_message()));
        }
        Ok(())
    }
}

/// Register endpoint - POST /api/auth/register
pub async fn register(
    State(state): State<AuthState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = non_empty(payload.name, "Name is required")?;
    let email = non_empty(payload.email, "Email is required")?.to_lowercase();
    if !looks_like_email(&email) {
        return Err(ApiError::Validation("Email must be a valid email address".to_string()));
    }
    state.check_email(&email)?;

    let password = payload.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let role = payload
        .role
        .as_deref()
        .and_then(AdminRole::from_str)
        .ok_or_else(|| ApiError::Validation("Role must be one of: superadmin, clerk".to_string()))?;

    let account = state
        .account_store
        .create_account(&name, &email, &password, role.as_str())
        .map_err(|e| match e {
            StoreError::Duplicate { .. } => {
                warn!("❌ Registration for existing account: {}", email);
                ApiError::Duplicate("Admin already exists".to_string())
            }
            other => other.into(),
        })?;

    let token = state
        .jwt_handler
        .generate_token(&account)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!("🆕 Admin registered: {} ({})", account.email, account.role);

    Ok((StatusCode::CREATED, Json(AuthResponse::new(&account, token))))
}

/// Login endpoint - POST /api/auth/login
///
/// Unknown email and wrong secret produce the same 401; a known account without
/// an admin role gets a 403 instead.
pub async fn login(
    State(state): State<AuthState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim().to_lowercase(), password)
        }
        _ => {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ))
        }
    };
    state.check_email(&email)?;

    info!("🔐 Login attempt: {}", email);

    let Some(account) = state.account_store.get_by_email(&email)? else {
        warn!("❌ Failed login attempt (unknown account): {}", email);
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    };

    if account.admin_role().is_none() {
        warn!(
            "🚫 Login attempt by non-admin account: {} with role: {}",
            email, account.role
        );
        return Err(ApiError::Forbidden(
            "Only admin users can access this portal".to_string(),
        ));
    }

    if !state.account_store.verify_password(&account, &password)? {
        warn!("❌ Failed login attempt (wrong secret): {}", email);
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    let token = state
        .jwt_handler
        .generate_token(&account)
        .map_err(|e| ApiError::Internal(e.into()))?;

    info!("✅ Login successful: {} ({})", account.email, account.role);

    Ok(Json(AuthResponse::new(&account, token)))
}

/// Token check - GET /api/auth/verify
pub async fn verify(Extension(CurrentAccount(account)): Extension<CurrentAccount>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Token is valid",
        "admin": AccountResponse::from_account(&account),
    }))
}

/// Welcome payload for the admin landing page - GET /api/auth/dashboard
pub async fn dashboard(
    State(db): State<Arc<Database>>,
    Extension(CurrentAccount(account)): Extension<CurrentAccount>,
) -> Result<Json<Value>, ApiError> {
    let stats = db.dashboard_stats()?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Welcome {}", account.name),
        "admin": AccountResponse::from_account(&account),
        "stats": stats,
    })))
}

fn non_empty(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(message.to_string()))
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(policy: EmailPolicy) -> AuthState {
        AuthState::new(
            Arc::new(AccountStore::in_memory().unwrap().with_hash_cost(4)),
            Arc::new(JwtHandler::new("auth-api-test-secret".to_string())),
            policy,
        )
    }

    fn register_request(email: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Test Admin".to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            role: Some(role.to_string()),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_returns_verifiable_token() {
        let state = state(EmailPolicy::unrestricted());
        let (status, Json(body)) = register(
            State(state.clone()),
            JsonBody(register_request("a@gmail.com", "password123", "superadmin")),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.role, "superadmin");
        let claims = state.jwt_handler.validate_token(&body.token).unwrap();
        assert_eq!(claims.sub, body.id);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let state = state(EmailPolicy::restricted_to("gmail.com"));
        let cases = [
            register_request("a@court.com", "password123", "clerk"),
            register_request("not-an-email", "password123", "clerk"),
            register_request("a@gmail.com", "short", "clerk"),
            register_request("a@gmail.com", "password123", "viewer"),
        ];
        for req in cases {
            let err = register(State(state.clone()), JsonBody(req)).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{err}");
        }
        assert_eq!(state.account_store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let state = state(EmailPolicy::unrestricted());
        register(
            State(state.clone()),
            JsonBody(register_request("a@gmail.com", "password123", "clerk")),
        )
        .await
        .unwrap();

        let err = register(
            State(state.clone()),
            JsonBody(register_request("A@gmail.com", "password456", "superadmin")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Admin already exists");
        assert_eq!(state.account_store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_login_does_not_reveal_which_part_was_wrong() {
        let state = state(EmailPolicy::unrestricted());
        state
            .account_store
            .create_account("A", "a@gmail.com", "password123", "clerk")
            .unwrap();

        let wrong_secret = login(State(state.clone()), JsonBody(login_request("a@gmail.com", "nope-nope")))
            .await
            .unwrap_err();
        let unknown = login(State(state.clone()), JsonBody(login_request("b@gmail.com", "password123")))
            .await
            .unwrap_err();

        assert_eq!(wrong_secret.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_secret.to_string(), unknown.to_string());

        let Json(ok) = login(State(state), JsonBody(login_request("A@gmail.com", "password123")))
            .await
            .unwrap();
        assert_eq!(ok.email, "a@gmail.com");
    }

    #[tokio::test]
    async fn test_login_non_admin_role_forbidden() {
        let state = state(EmailPolicy::unrestricted());
        let account = state
            .account_store
            .create_account("V", "v@gmail.com", "password123", "clerk")
            .unwrap();
        state.account_store.update_role(&account.id, "viewer").unwrap();

        let err = login(State(state), JsonBody(login_request("v@gmail.com", "password123")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let state = state(EmailPolicy::unrestricted());
        let err = login(
            State(state),
            JsonBody(LoginRequest {
                email: Some("a@gmail.com".to_string()),
                password: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("clerk@court.com"));
        assert!(!looks_like_email("clerk@court"));
        assert!(!looks_like_email("@court.com"));
        assert!(!looks_like_email("a@b@court.com"));
    }
}
