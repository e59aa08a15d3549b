//! Router assembly
//!
//! Route groups and their gates:
//! - `/api/auth/{register,login}`: open, rate limited per client IP
//! - `/api/auth/{verify,dashboard}`: staff
//! - `/api/public/*`: open, read-only
//! - `/api/admin/*`: staff for day-to-day case and hearing work, superadmin for
//!   judges and every delete

use super::{admin, public, AppState};
use crate::auth::{self, authenticate, authorize, STAFF_ROLES, SUPERADMIN_ONLY};
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitConfig, RateLimitLayer};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the API router
pub fn create_router(state: AppState, rate_limit: RateLimitConfig) -> Router {
    let limiter = RateLimitLayer::new(rate_limit);

    let credentials = Router::new()
        .route("/register", post(auth::api::register))
        .route("/login", post(auth::api::login))
        .route_layer(from_fn_with_state(limiter, rate_limit_middleware));

    let session = Router::new()
        .route("/verify", get(auth::api::verify))
        .route("/dashboard", get(auth::api::dashboard))
        .route_layer(from_fn_with_state(STAFF_ROLES, authorize));

    let public = Router::new()
        .route("/cases", get(public::list_cases))
        .route("/cases/search", get(public::search_cases))
        .route("/cases/:id", get(public::get_case))
        .route("/judges", get(public::list_judges))
        .route("/judges/:id", get(public::get_judge))
        .route("/judges/search/:name", get(public::search_judges))
        .route("/hearings", get(public::list_hearings))
        .route("/hearings/:id", get(public::get_hearing))
        .route("/hearings/judge/:judge_id", get(public::hearings_for_judge))
        .route("/hearings/case/:case_id", get(public::hearings_for_case))
        .route("/stats/cases", get(public::case_stats))
        .route("/stats/judges", get(public::judge_stats))
        .route("/stats/hearings", get(public::hearing_stats));

    let staff = Router::new()
        .route("/cases", get(admin::list_cases).post(admin::create_case))
        .route("/cases/:id", put(admin::update_case))
        .route("/cases-stats", get(admin::case_stats))
        .route("/hearings", get(admin::list_hearings).post(admin::create_hearing))
        .route("/hearings/:id", put(admin::update_hearing))
        .route_layer(from_fn_with_state(STAFF_ROLES, authorize));

    let superadmin = Router::new()
        .route("/cases/:id", delete(admin::delete_case))
        .route("/hearings/:id", delete(admin::delete_hearing))
        .route("/judges", get(admin::list_judges).post(admin::create_judge))
        .route(
            "/judges/:id",
            put(admin::update_judge).delete(admin::delete_judge),
        )
        .route("/judges-stats", get(admin::judge_stats))
        .route_layer(from_fn_with_state(SUPERADMIN_ONLY, authorize));

    // authenticate wraps every protected group, so it always runs before authorize
    let protected_auth = session.route_layer(from_fn_with_state(state.auth.clone(), authenticate));
    let protected_admin = staff
        .merge(superadmin)
        .route_layer(from_fn_with_state(state.auth.clone(), authenticate));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", credentials.merge(protected_auth))
        .nest("/api/public", public)
        .nest("/api/admin", protected_admin)
        .layer(from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
