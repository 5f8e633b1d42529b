use sqlx::FromRow;

/// User record in the credential store.
///
/// Deliberately not `Serialize`: the password hash stays inside the service.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,           // assigned by the store
    pub email: String,     // unique across users
    pub pass_hash: String, // argon2 PHC string
}

/// Application allowed to request tokens.
#[derive(Debug, Clone, FromRow)]
pub struct App {
    pub id: i32,
    pub name: String,
    pub secret: String, // HMAC signing key for this app's tokens
}
