//! Authentication use cases: login, registration and admin lookup.
//!
//! The service is immutable after construction and safe to share across
//! concurrent requests. Store signals are translated into domain errors here;
//! nothing in this module knows about HTTP.

use std::{sync::Arc, time::Duration};

use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        errors::{AuthError, AuthResult, ErrorKind},
        jwt::TokenIssuer,
        password::PasswordHasher,
    },
    storage::{CredentialStore, StoreError},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    issuer: Arc<dyn TokenIssuer>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        issuer: Arc<dyn TokenIssuer>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
            token_ttl,
        }
    }

    /// Checks credentials and returns a token signed with the app's secret.
    #[instrument(skip(self, password), fields(op = "auth.login"))]
    pub async fn login(&self, email: &str, password: &str, app_id: i32) -> AuthResult<String> {
        const OP: &str = "auth.login";

        let user = match self.store.find_user_by_email(email).await {
            Ok(u) => u,
            Err(StoreError::UserNotFound) => {
                warn!(email, "user not found");
                return Err(AuthError::new(OP, ErrorKind::InvalidCredentials));
            }
            Err(e) => {
                error!(error = %e, "failed to get user");
                return Err(AuthError::internal(OP, e));
            }
        };

        let hasher = self.hasher.clone();
        let plain = password.to_owned();
        let pass_hash = user.pass_hash.clone();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&plain, &pass_hash))
            .await
            .map_err(|e| AuthError::internal(OP, e))?
            .map_err(|e| {
                error!(error = %e, user_id = user.id, "failed to verify password");
                AuthError::internal(OP, e)
            })?;

        if !ok {
            warn!(email, user_id = user.id, "invalid password");
            return Err(AuthError::new(OP, ErrorKind::InvalidCredentials));
        }

        let app = self.store.find_app(app_id).await.map_err(|e| {
            error!(error = %e, app_id, "failed to get app");
            AuthError::internal(OP, e)
        })?;

        let token = self
            .issuer
            .issue(&user, &app, self.token_ttl)
            .map_err(|e| {
                error!(error = %e, "failed to generate token");
                AuthError::internal(OP, e)
            })?;

        info!(user_id = user.id, app_id, "user logged in");
        Ok(token)
    }

    /// Hashes the password and stores a new user, returning its id.
    #[instrument(skip(self, password), fields(op = "auth.register_new_user"))]
    pub async fn register_new_user(&self, email: &str, password: &str) -> AuthResult<i64> {
        const OP: &str = "auth.register_new_user";

        info!("registering user");

        // argon2 is CPU-bound, keep it off the async workers
        let hasher = self.hasher.clone();
        let plain = password.to_owned();
        let pass_hash = tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AuthError::internal(OP, e))?
            .map_err(|e| {
                error!(error = %e, "failed to hash password");
                AuthError::internal(OP, e)
            })?;

        let id = match self.store.save_user(email, &pass_hash).await {
            Ok(id) => id,
            Err(StoreError::DuplicateEmail) => {
                warn!(email, "user already exists");
                return Err(AuthError::new(OP, ErrorKind::UserAlreadyExists));
            }
            Err(e) => {
                error!(error = %e, "failed to save user");
                return Err(AuthError::internal(OP, e));
            }
        };

        info!(user_id = id, "user registered");
        Ok(id)
    }

    #[instrument(skip(self), fields(op = "auth.is_admin"))]
    pub async fn is_admin(&self, user_id: i64) -> AuthResult<bool> {
        const OP: &str = "auth.is_admin";

        let is_admin = match self.store.is_admin(user_id).await {
            Ok(v) => v,
            Err(StoreError::UserNotFound) => {
                warn!("user not found");
                return Err(AuthError::new(OP, ErrorKind::UserNotFound));
            }
            Err(e) => {
                error!(error = %e, "failed to check admin flag");
                return Err(AuthError::internal(OP, e));
            }
        };

        info!(is_admin, "checked if user is admin");
        Ok(is_admin)
    }
}
