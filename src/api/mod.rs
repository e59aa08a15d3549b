//! HTTP API
//! Mission: Public read endpoints, staff endpoints and the shared router state

pub mod admin;
pub mod public;
pub mod routes;

pub use routes::create_router;

use crate::auth::AuthState;
use crate::store::Database;
use axum::extract::FromRef;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: AuthState,
}

impl FromRef<AppState> for Arc<Database> {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
