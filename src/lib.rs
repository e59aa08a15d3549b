//! ECF Backend Library
//!
//! Court case records, judges and hearings behind a public read API and a
//! role-gated admin API. Exposes every module for the binaries and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod store;

pub use api::{create_router, AppState};
pub use config::AppConfig;
