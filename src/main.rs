//! ECF Backend
//! Mission: Serve court records to the public and keep them editable by court staff

use anyhow::{Context, Result};
use ecf_backend::{
    api::{create_router, AppState},
    auth::{AccountStore, AuthState, JwtHandler},
    config::{init_tracing, load_env, AppConfig},
    store::Database,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("🚀 ECF Court Backend starting");

    let config = AppConfig::from_env();

    let db = Arc::new(
        Database::open(&config.db_path, config.reference_policy)
            .with_context(|| format!("Failed to open court records at {}", config.db_path))?,
    );
    let stats = db.dashboard_stats().context("Failed to read initial stats")?;
    info!(
        "📊 Records loaded: {} cases, {} judges, {} hearings",
        stats.cases.total_cases, stats.judges.total_judges, stats.hearings.total_hearings
    );

    let account_store = Arc::new(
        AccountStore::open(&config.db_path)
            .with_context(|| format!("Failed to open account store at {}", config.db_path))?,
    );
    let accounts = account_store.count().context("Failed to count accounts")?;
    if accounts == 0 {
        info!("👤 No admin accounts yet; run seed_admins or POST /api/auth/register");
    }

    let jwt_handler = Arc::new(JwtHandler::with_ttl_days(
        config.jwt_secret.clone(),
        config.jwt_ttl_days,
    ));
    let auth = AuthState::new(account_store, jwt_handler, config.email_policy.clone());
    match config.email_policy.domain() {
        Some(domain) => info!("🔐 Authentication ready (admin emails limited to @{})", domain),
        None => info!("🔐 Authentication ready ({} accounts)", accounts),
    }

    let state = AppState { db, auth };
    let app = create_router(state, config.rate_limit());

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
