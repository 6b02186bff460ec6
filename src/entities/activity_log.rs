use sea_orm::entity::prelude::*;

/// Append-only audit trail of auth events. No update or delete path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Nullable so events without a resolved user can still be logged.
    pub user_id: Option<String>,

    pub action: String,

    pub details: Option<String>,

    pub ip_address: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
