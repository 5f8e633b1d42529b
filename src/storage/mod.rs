//! Credential store boundary: users and applications.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use models::{App, User};
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user already exists")]
    DuplicateEmail,

    #[error("user not found")]
    UserNotFound,

    #[error("app not found")]
    AppNotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence used by the authentication service.
///
/// Implementations must resolve concurrent inserts of the same email so that
/// exactly one succeeds and the rest see [`StoreError::DuplicateEmail`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn save_user(&self, email: &str, pass_hash: &str) -> StoreResult<i64>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<User>;
    async fn is_admin(&self, user_id: i64) -> StoreResult<bool>;
    async fn find_app(&self, app_id: i32) -> StoreResult<App>;
}
