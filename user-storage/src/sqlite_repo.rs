//! SQLite-backed [`UserRepository`].

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::RepositoryError;
use crate::models::UserRecord;
use crate::repository::UserRepository;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool_manager: SqlitePoolManager,
}

impl SqliteUserRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), sqlx::Error> {
        info!("Creating users table if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                login TEXT NOT NULL UNIQUE,
                telegram_id INTEGER,
                role_flags INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_telegram_id ON users(telegram_id)")
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    async fn get_by_login(&self, login: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(login = %user.login))]
    async fn update_or_create(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError> {
        if user.login.trim().is_empty() {
            return Err(RepositoryError::Invalid("login must not be empty".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, login, telegram_id, role_flags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(login) DO UPDATE SET
                telegram_id = COALESCE(excluded.telegram_id, users.telegram_id),
                role_flags = users.role_flags | excluded.role_flags,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&user.id)
        .bind(&user.login)
        .bind(user.telegram_id)
        .bind(user.roles)
        .bind(user.created_at)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await?;

        let stored = self.get_by_login(&user.login).await?.ok_or_else(|| {
            RepositoryError::Database(format!("user {} missing after upsert", user.login))
        })?;

        info!(
            user_id = %stored.id,
            login = %stored.login,
            roles = %stored.roles,
            "Upserted user"
        );
        Ok(stored)
    }
}
