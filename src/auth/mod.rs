//! Authentication Module
//! Mission: Admin accounts, JWT bearer tokens and role-gated access

pub mod account_store;
pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;

pub use account_store::AccountStore;
pub use api::AuthState;
pub use jwt::{JwtHandler, TokenError};
pub use middleware::{authenticate, authorize, CurrentAccount};
pub use models::{AdminRole, STAFF_ROLES, SUPERADMIN_ONLY};
pub use policy::EmailPolicy;
