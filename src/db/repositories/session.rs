use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::sessions;

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Record a freshly issued token. Every login and registration creates a
    /// new row; prior sessions for the same user are left alone, so multiple
    /// concurrent sessions per user are possible.
    pub async fn create(
        &self,
        user_id: &str,
        token: &str,
        expires_at: &str,
        created_at: &str,
    ) -> Result<sessions::Model> {
        let active = sessions::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            token: Set(token.to_string()),
            expires_at: Set(expires_at.to_string()),
            created_at: Set(created_at.to_string()),
        };

        let inserted = active
            .insert(&self.conn)
            .await
            .context("Failed to insert session")?;

        Ok(inserted)
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<sessions::Model>> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query session by token")?;

        Ok(session)
    }

    /// Delete the session matching the token, returning whether a row
    /// existed. Logout treats both outcomes as success.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::Token.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to delete session by token")?;

        Ok(result.rows_affected > 0)
    }
}
