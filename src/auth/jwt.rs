//! JWT Token Handler
//! Mission: Issue and verify long-lived admin bearer tokens

use crate::auth::models::{Account, Claims};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

/// Default token lifetime
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// Why a token was rejected. Both map to 401 for callers; the split is for logs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error("Failed to sign token")]
    Signing,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and the default 30-day lifetime
    pub fn new(secret: String) -> Self {
        Self::with_ttl_days(secret, DEFAULT_TTL_DAYS)
    }

    pub fn with_ttl_days(secret: String, days: i64) -> Self {
        Self {
            secret,
            ttl: Duration::days(days),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a token for an account, issued now
    pub fn generate_token(&self, account: &Account) -> Result<String, TokenError> {
        self.generate_token_at(account, Utc::now())
    }

    pub fn generate_token_at(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        debug!(
            "Generating JWT for {} ({}), expires in {}d",
            account.email,
            account.id,
            self.ttl.num_days()
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| TokenError::Signing)
    }

    /// Validate a token against the current time
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Check signature, then expiry against `now`. Expired means `now >= exp`.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() >= decoded.claims.exp {
            debug!("Rejected expired JWT for {}", decoded.claims.sub);
            return Err(TokenError::Expired);
        }

        debug!("Validated JWT for {}", decoded.claims.sub);
        Ok(decoded.claims)
    }
}
