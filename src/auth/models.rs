//! Authentication Models
//! Mission: Define administrator accounts, roles and token payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Administrator account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    /// Free text at the storage layer; only `AdminRole` values pass the gate.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn admin_role(&self) -> Option<AdminRole> {
        AdminRole::from_str(&self.role)
    }
}

/// Roles allowed into the admin surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdminRole {
    #[serde(rename = "superadmin")]
    SuperAdmin, // Judges, deletes, everything
    #[serde(rename = "clerk")]
    Clerk, // Day-to-day case and hearing work
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "superadmin",
            AdminRole::Clerk => "clerk",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Some(AdminRole::SuperAdmin),
            "clerk" => Some(AdminRole::Clerk),
            _ => None,
        }
    }
}

/// Allow-set for day-to-day admin routes
pub const STAFF_ROLES: &[AdminRole] = &[AdminRole::SuperAdmin, AdminRole::Clerk];

/// Allow-set for destructive and judge-management routes
pub const SUPERADMIN_ONLY: &[AdminRole] = &[AdminRole::SuperAdmin];

/// JWT Claims payload. Only the identity is bound; role is re-read on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // account id
    pub iat: i64,
    pub exp: i64,
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "secret")]
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    #[serde(alias = "secret")]
    pub password: Option<String>,
}

/// Register/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

impl AuthResponse {
    pub fn new(account: &Account, token: String) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            token,
        }
    }
}

/// Account response (sanitized)
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
        }
    }
}
