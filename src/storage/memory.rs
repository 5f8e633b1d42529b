use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{App, CredentialStore, StoreError, StoreResult, User};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, UserRow>,
    by_email: HashMap<String, i64>,
    apps: HashMap<i32, App>,
    next_id: i64,
}

struct UserRow {
    user: User,
    is_admin: bool,
}

/// In-process credential store. Used when no database is configured and in tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an application; replaces any app with the same id.
    pub async fn add_app(&self, app: App) {
        self.inner.write().await.apps.insert(app.id, app);
    }

    pub async fn set_admin(&self, user_id: i64, is_admin: bool) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let row = inner
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound)?;
        row.is_admin = is_admin;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn save_user(&self, email: &str, pass_hash: &str) -> StoreResult<i64> {
        // check and insert under one write lock
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.by_email.insert(email.to_string(), id);
        inner.users.insert(
            id,
            UserRow {
                user: User {
                    id,
                    email: email.to_string(),
                    pass_hash: pass_hash.to_string(),
                },
                is_admin: false,
            },
        );
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        let inner = self.inner.read().await;
        inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|row| row.user.clone())
            .ok_or(StoreError::UserNotFound)
    }

    async fn is_admin(&self, user_id: i64) -> StoreResult<bool> {
        self.inner
            .read()
            .await
            .users
            .get(&user_id)
            .map(|row| row.is_admin)
            .ok_or(StoreError::UserNotFound)
    }

    async fn find_app(&self, app_id: i32) -> StoreResult<App> {
        self.inner
            .read()
            .await
            .apps
            .get(&app_id)
            .cloned()
            .ok_or(StoreError::AppNotFound)
    }
}
