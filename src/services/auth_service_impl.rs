//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use tokio::task;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{NewUser, Store};
use crate::services::auth_service::{
    AuthError, AuthService, AuthSuccess, RegisterInput, Role, UserDto,
};
use crate::services::password;
use crate::services::token::TokenIssuer;

pub struct SeaOrmAuthService {
    store: Store,
    issuer: TokenIssuer,
    security: crate::config::SecurityConfig,
    validity_secs: i64,
    /// Verified against on unknown-email logins so both failure paths burn
    /// the same hashing cost.
    dummy_hash: String,
}

impl SeaOrmAuthService {
    pub fn new(store: Store, config: &Config) -> anyhow::Result<Self> {
        let dummy_hash = password::hash_password(&Uuid::new_v4().to_string(), &config.security)?;

        Ok(Self {
            store,
            issuer: TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_validity_secs),
            security: config.security.clone(),
            validity_secs: config.auth.token_validity_secs,
            dummy_hash,
        })
    }

    async fn record_session(
        &self,
        user_id: &str,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let expires_at = (now + chrono::Duration::seconds(self.validity_secs)).to_rfc3339();
        self.store
            .create_session(user_id, token, &expires_at, &now.to_rfc3339())
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;
        Ok(())
    }

    async fn hash_in_background(&self, plaintext: String) -> Result<String, AuthError> {
        let security = self.security.clone();
        task::spawn_blocking(move || password::hash_password(&plaintext, &security))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task panicked: {e}")))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    async fn verify_in_background(
        &self,
        plaintext: String,
        stored_hash: String,
    ) -> Result<bool, AuthError> {
        task::spawn_blocking(move || password::verify_password(&plaintext, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task panicked: {e}")))
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<DbErr>()
        .and_then(DbErr::sql_err)
        .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        input: RegisterInput,
        ip: Option<String>,
    ) -> Result<AuthSuccess, AuthError> {
        if input.email.trim().is_empty()
            || input.password.is_empty()
            || input.name.trim().is_empty()
        {
            return Err(AuthError::Validation(
                "Email, password and name are required".to_string(),
            ));
        }

        if self
            .store
            .find_user_by_email(&input.email)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .is_some()
        {
            return Err(AuthError::Conflict);
        }

        let role = Role::parse(input.role.as_deref());
        let password_hash = self.hash_in_background(input.password).await?;

        let now = Utc::now();
        let new_user = NewUser {
            id: Uuid::new_v4().to_string(),
            email: input.email,
            password_hash,
            name: input.name,
            company_name: input.company_name,
            phone: input.phone,
            company_size: input.company_size,
            role: role.as_str().to_string(),
            is_verified: false,
            created_at: now.to_rfc3339(),
        };

        // The pre-check above is advisory only; the UNIQUE constraint on
        // email decides races between concurrent registrations.
        let user = match self.store.insert_user(new_user).await {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => return Err(AuthError::Conflict),
            Err(e) => return Err(AuthError::Database(e.to_string())),
        };

        let token = self
            .issuer
            .issue(&user.id, &user.email, &user.role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        self.record_session(&user.id, &token, now).await?;

        self.store
            .log_activity(
                Some(&user.id),
                "register",
                Some(&format!("New {} account registered", user.role)),
                ip.as_deref(),
                &now.to_rfc3339(),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        info!("Registered user {}", user.email);

        Ok(AuthSuccess {
            user: UserDto::from(user),
            token,
        })
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        ip: Option<String>,
    ) -> Result<AuthSuccess, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .store
            .find_user_by_email(email)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        let Some(user) = user else {
            // Unknown email burns the same verification cost as the
            // wrong-password path, and returns the identical error.
            let _ = self
                .verify_in_background(password.to_string(), self.dummy_hash.clone())
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = self
            .verify_in_background(password.to_string(), user.password_hash.clone())
            .await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .issuer
            .issue(&user.id, &user.email, &user.role)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let now = Utc::now();

        self.store
            .touch_last_login(&user.id, &now.to_rfc3339())
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        self.record_session(&user.id, &token, now).await?;

        self.store
            .log_activity(
                Some(&user.id),
                "login",
                Some("User logged in"),
                ip.as_deref(),
                &now.to_rfc3339(),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(AuthSuccess {
            user: UserDto::from(user),
            token,
        })
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = token else {
            return Ok(());
        };

        self.store
            .delete_session_by_token(token)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Create the seed account on first start, when configured and the users
/// table is empty.
pub async fn seed_admin(store: &Store, config: &Config) -> anyhow::Result<()> {
    let (Some(email), Some(seed_password)) = (
        config.auth.seed_admin_email.clone(),
        config.auth.seed_admin_password.clone(),
    ) else {
        return Ok(());
    };

    if store.count_users().await? > 0 {
        return Ok(());
    }

    let security = config.security.clone();
    let password_hash =
        task::spawn_blocking(move || password::hash_password(&seed_password, &security)).await??;

    store
        .insert_user(NewUser {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_hash,
            name: config
                .auth
                .seed_admin_name
                .clone()
                .unwrap_or_else(|| "Administrator".to_string()),
            company_name: None,
            phone: None,
            company_size: None,
            role: Role::Admin.as_str().to_string(),
            is_verified: true,
            created_at: Utc::now().to_rfc3339(),
        })
        .await?;

    info!("Seeded admin account {email}");

    Ok(())
}
