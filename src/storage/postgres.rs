use async_trait::async_trait;
use sqlx::PgPool;

use super::{App, CredentialStore, StoreError, StoreResult, User};

/// PostgreSQL-backed credential store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Unique-constraint violations on insert mean the email is taken.
fn map_insert_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateEmail
        }
        other => StoreError::Database(other),
    }
}

fn map_lookup_error(e: sqlx::Error, missing: StoreError) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => missing,
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn save_user(&self, email: &str, pass_hash: &str) -> StoreResult<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, pass_hash)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(pass_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, pass_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_lookup_error(e, StoreError::UserNotFound))
    }

    async fn is_admin(&self, user_id: i64) -> StoreResult<bool> {
        sqlx::query_scalar::<_, bool>(r#"SELECT is_admin FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_lookup_error(e, StoreError::UserNotFound))
    }

    async fn find_app(&self, app_id: i32) -> StoreResult<App> {
        sqlx::query_as::<_, App>(r#"SELECT id, name, secret FROM apps WHERE id = $1"#)
            .bind(app_id)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_lookup_error(e, StoreError::AppNotFound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_the_given_miss() {
        let err = map_lookup_error(sqlx::Error::RowNotFound, StoreError::AppNotFound);
        assert!(matches!(err, StoreError::AppNotFound));

        let err = map_lookup_error(sqlx::Error::RowNotFound, StoreError::UserNotFound);
        assert!(matches!(err, StoreError::UserNotFound));
    }

    #[test]
    fn pool_errors_stay_database_errors() {
        let err = map_lookup_error(sqlx::Error::PoolTimedOut, StoreError::UserNotFound);
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));

        let err = map_insert_error(sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolClosed)));
    }
}
