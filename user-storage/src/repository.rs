use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::models::UserRecord;

/// Lookup and idempotent upsert of verified users. Login is the natural key.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>, RepositoryError>;

    async fn get_by_login(&self, login: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// Inserts the user, or updates the existing row with the same login. Role bits are merged
    /// into the stored ones (never removed) and `id`/`created_at` of an existing row are kept.
    /// Returns the stored row.
    async fn update_or_create(&self, user: &UserRecord) -> Result<UserRecord, RepositoryError>;
}
