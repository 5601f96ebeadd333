//! User storage: verified identities and their roles.
//!
//! ## Modules
//!
//! - [`error`] – Repository error type
//! - [`models`] – UserRecord, RoleFlags
//! - [`repository`] – UserRepository trait
//! - [`sqlite_repo`] – SqliteUserRepository
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod models;
mod repository;
mod sqlite_pool;
mod sqlite_repo;

pub use error::RepositoryError;
pub use models::{RoleFlags, UserRecord};
pub use repository::UserRepository;
pub use sqlite_pool::SqlitePoolManager;
pub use sqlite_repo::SqliteUserRepository;
