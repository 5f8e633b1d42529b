use crate::auth::{jwt::JwtIssuer, password::Argon2Hasher, AuthService};
use crate::config::AppConfig;
use crate::storage::{CredentialStore, MemoryStore, PgStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Wires the service against PostgreSQL when `pool` is given, otherwise
    /// against an in-memory store holding `config.seed_apps`.
    pub async fn init(config: &AppConfig, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let store: Arc<dyn CredentialStore> = match pool {
            Some(db) => Arc::new(PgStore::new(db)),
            None => {
                tracing::warn!(
                    apps = config.seed_apps.len(),
                    "DATABASE_URL not set; using in-memory credential store"
                );
                let store = MemoryStore::new();
                for app in &config.seed_apps {
                    store.add_app(app.clone()).await;
                }
                Arc::new(store)
            }
        };
        let hasher = Argon2Hasher::new(&config.hashing).context("build password hasher")?;

        let auth = AuthService::new(
            store,
            Arc::new(hasher),
            Arc::new(JwtIssuer),
            config.token_ttl,
        );
        Ok(Self::from_parts(Arc::new(auth)))
    }

    pub fn from_parts(auth: Arc<AuthService>) -> Self {
        Self { auth }
    }
}
