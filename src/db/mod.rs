use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{activity_log, sessions, users};

pub mod migrator;
pub mod repositories;

pub use repositories::user::NewUser;

/// Owned handle to the persistence layer. Opened once at startup and shared
/// by all request handlers; tests substitute an in-memory database.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());

        if in_memory {
            // Each sqlite in-memory connection is its own database, so the
            // pool must stay at a single long-lived connection.
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections)
                .connect_timeout(Duration::from_secs(10))
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(600));
        }
        opt.sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> repositories::activity::ActivityRepository {
        repositories::activity::ActivityRepository::new(self.conn.clone())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<users::Model>> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn insert_user(&self, user: NewUser) -> Result<users::Model> {
        self.user_repo().insert(user).await
    }

    pub async fn touch_last_login(&self, id: &str, when: &str) -> Result<()> {
        self.user_repo().touch_last_login(id, when).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    pub async fn create_session(
        &self,
        user_id: &str,
        token: &str,
        expires_at: &str,
        created_at: &str,
    ) -> Result<sessions::Model> {
        self.session_repo()
            .create(user_id, token, expires_at, created_at)
            .await
    }

    pub async fn find_session_by_token(&self, token: &str) -> Result<Option<sessions::Model>> {
        self.session_repo().find_by_token(token).await
    }

    pub async fn delete_session_by_token(&self, token: &str) -> Result<bool> {
        self.session_repo().delete_by_token(token).await
    }

    pub async fn log_activity(
        &self,
        user_id: Option<&str>,
        action: &str,
        details: Option<&str>,
        ip_address: Option<&str>,
        created_at: &str,
    ) -> Result<()> {
        self.activity_repo()
            .append(user_id, action, details, ip_address, created_at)
            .await
    }

    pub async fn recent_activity(&self, limit: u64) -> Result<Vec<activity_log::Model>> {
        self.activity_repo().recent(limit).await
    }
}
