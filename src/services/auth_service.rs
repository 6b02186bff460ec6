//! Domain service for registration, login and logout.

use serde::Serialize;
use thiserror::Error;

use crate::entities::users;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User already exists")]
    Conflict,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Account role. Unrecognized input normalizes to `Buyer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Supplier,
    Admin,
}

impl Role {
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        match input {
            Some("supplier") => Self::Supplier,
            Some("admin") => Self::Admin,
            _ => Self::Buyer,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
        }
    }
}

/// Sanitized user for responses — never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<users::Model> for UserDto {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
            company_name: model.company_name,
            phone: model.phone,
            company_size: model.company_size,
            role: model.role,
            is_verified: model.is_verified,
            created_at: model.created_at,
        }
    }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthSuccess {
    pub user: UserDto,
    pub token: String,
}

/// Registration input as accepted from the HTTP boundary.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
    pub role: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new account, issues a token and records a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when email, password or name is
    /// missing, and [`AuthError::Conflict`] for a duplicate email.
    async fn register(
        &self,
        input: RegisterInput,
        ip: Option<String>,
    ) -> Result<AuthSuccess, AuthError>;

    /// Verifies credentials, issues a token and records a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a
    /// wrong password — deliberately the same error for both.
    async fn login(
        &self,
        email: &str,
        password: &str,
        ip: Option<String>,
    ) -> Result<AuthSuccess, AuthError>;

    /// Deletes the session matching the token. Idempotent: a missing or
    /// already-removed session is still a success.
    async fn logout(&self, token: Option<&str>) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_normalizes_unrecognized_input() {
        assert_eq!(Role::parse(None), Role::Buyer);
        assert_eq!(Role::parse(Some("buyer")), Role::Buyer);
        assert_eq!(Role::parse(Some("supplier")), Role::Supplier);
        assert_eq!(Role::parse(Some("admin")), Role::Admin);
        assert_eq!(Role::parse(Some("wizard")), Role::Buyer);
        assert_eq!(Role::parse(Some("")), Role::Buyer);
    }
}
