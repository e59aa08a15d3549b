//! Runtime configuration
//! Mission: Read the environment once at startup and hand typed settings to the server

use crate::auth::jwt::DEFAULT_TTL_DAYS;
use crate::auth::EmailPolicy;
use crate::middleware::RateLimitConfig;
use crate::store::ReferencePolicy;
use dotenv::dotenv;
use std::{env, net::SocketAddr, path::Path, path::PathBuf};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";
const DEFAULT_DB_FILE: &str = "ecf_court.db";
const DEFAULT_AUTH_REQUESTS_PER_MINUTE: u32 = 20;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub jwt_secret: String,
    pub jwt_ttl_days: i64,
    pub bind_addr: SocketAddr,
    pub email_policy: EmailPolicy,
    pub reference_policy: ReferencePolicy,
    pub auth_requests_per_minute: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset, blank or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("⚠️ JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let jwt_ttl_days = get("JWT_TTL_DAYS")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_TTL_DAYS);

        let bind_addr = get("BIND_ADDR")
            .and_then(|v| match v.trim().parse::<SocketAddr>() {
                Ok(addr) => Some(addr),
                Err(_) => {
                    warn!("BIND_ADDR '{}' is not a socket address, using default", v);
                    None
                }
            })
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

        let email_policy = match get("ADMIN_EMAIL_DOMAIN") {
            Some(domain) => EmailPolicy::restricted_to(&domain),
            None => EmailPolicy::unrestricted(),
        };

        let reference_policy = match get("REFERENCE_POLICY") {
            Some(raw) => ReferencePolicy::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown REFERENCE_POLICY '{}', keeping references", raw);
                ReferencePolicy::Retain
            }),
            None => ReferencePolicy::Retain,
        };

        let auth_requests_per_minute = get("AUTH_RATE_LIMIT_PER_MINUTE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_AUTH_REQUESTS_PER_MINUTE);

        Self {
            db_path: resolve_data_path(get("ECF_DB_PATH"), DEFAULT_DB_FILE),
            jwt_secret,
            jwt_ttl_days,
            bind_addr,
            email_policy,
            reference_policy,
            auth_requests_per_minute,
        }
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::per_minute(self.auth_requests_per_minute)
    }
}

/// Load `.env` from the working directory, then from the crate directory
pub fn load_env() {
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecf_backend=debug,ecf=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Relative paths are anchored at the crate directory, not the caller's cwd
pub fn resolve_data_path(value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw.trim());
    if p.is_absolute() || raw.trim() == ":memory:" {
        return p.to_string_lossy().to_string();
    }
    base.join(p).to_string_lossy().to_string()
}
