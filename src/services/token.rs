//! HS256 session token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token encoding failed: {0}")]
    Encode(String),
}

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — user ID.
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID.
    pub jti: String,
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    validity_secs: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: impl Into<String>, validity_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            validity_secs,
        }
    }

    /// Issue a signed token embedding identity and role, expiring after the
    /// configured validity window.
    pub fn issue(&self, user_id: &str, email: &str, role: &str) -> Result<String, TokenError> {
        self.issue_at(Utc::now().timestamp(), user_id, email, role)
    }

    fn issue_at(
        &self,
        now: i64,
        user_id: &str,
        email: &str,
        role: &str,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.validity_secs,
            jti: Uuid::new_v4().to_string(),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// Zero leeway: a token is rejected strictly after its expiry instant.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        jsonwebtoken::decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_issuer() -> TokenIssuer {
        TokenIssuer::new("test-signing-secret", 24 * 60 * 60)
    }

    #[test]
    fn token_roundtrip() {
        let issuer = test_issuer();
        let token = issuer.issue("user-1", "a@x.com", "buyer").unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, "buyer");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = test_issuer();
        // Issued 25 hours ago with a 24 hour window
        let past = Utc::now().timestamp() - 25 * 60 * 60;
        let token = issuer
            .issue_at(past, "user-1", "a@x.com", "buyer")
            .unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_within_window_is_accepted() {
        let issuer = test_issuer();
        // Issued 23 hours ago, still inside the 24 hour window
        let past = Utc::now().timestamp() - 23 * 60 * 60;
        let token = issuer
            .issue_at(past, "user-1", "a@x.com", "buyer")
            .unwrap();

        assert!(issuer.verify(&token).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = test_issuer();
        let token = issuer.issue("user-1", "a@x.com", "buyer").unwrap();

        let other = TokenIssuer::new("different-secret", 24 * 60 * 60);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn jti_is_unique() {
        let issuer = test_issuer();
        let t1 = issuer.issue("user-1", "a@x.com", "buyer").unwrap();
        let t2 = issuer.issue("user-1", "a@x.com", "buyer").unwrap();

        let c1 = issuer.verify(&t1).unwrap();
        let c2 = issuer.verify(&t2).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }
}
