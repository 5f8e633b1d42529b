use crate::state::AppState;
use axum::Router;

mod dto;
pub mod errors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod service;

pub use errors::{AuthError, AuthResult, ErrorKind};
pub use service::AuthService;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
