use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Stored case-sensitively; uniqueness is the authoritative guard
    /// against duplicate registrations.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash, never empty once set
    pub password_hash: String,

    pub name: String,

    pub company_name: Option<String>,

    pub phone: Option<String>,

    pub company_size: Option<String>,

    /// One of "buyer", "supplier", "admin"
    pub role: String,

    pub is_verified: bool,

    pub created_at: String,

    pub last_login: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sessions::Entity")]
    Sessions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
