use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::entities::users;

/// Fields for a new user row. The caller generates the identifier and hashes
/// the password before this struct is built.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub company_size: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub created_at: String,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Look a user up by email, case-sensitive as stored.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user)
    }

    /// Insert a new user. The UNIQUE constraint on email is the authoritative
    /// duplicate guard; callers map its violation to a conflict.
    pub async fn insert(&self, user: NewUser) -> Result<users::Model> {
        let active = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            name: Set(user.name),
            company_name: Set(user.company_name),
            phone: Set(user.phone),
            company_size: Set(user.company_size),
            role: Set(user.role),
            is_verified: Set(user.is_verified),
            created_at: Set(user.created_at),
            last_login: Set(None),
        };

        let inserted = active.insert(&self.conn).await?;
        Ok(inserted)
    }

    pub async fn touch_last_login(&self, id: &str, when: &str) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for last-login update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(when.to_string()));
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        let count = users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")?;

        Ok(count)
    }
}
