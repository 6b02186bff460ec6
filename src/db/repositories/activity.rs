use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

use crate::entities::activity_log;

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Append one audit entry. There is no update or delete path.
    pub async fn append(
        &self,
        user_id: Option<&str>,
        action: &str,
        details: Option<&str>,
        ip_address: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        let active = activity_log::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.map(ToString::to_string)),
            action: Set(action.to_string()),
            details: Set(details.map(ToString::to_string)),
            ip_address: Set(ip_address.map(ToString::to_string)),
            created_at: Set(created_at.to_string()),
        };

        activity_log::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert activity log entry")?;

        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<activity_log::Model>> {
        let entries = activity_log::Entity::find()
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query activity log")?;

        Ok(entries)
    }
}
