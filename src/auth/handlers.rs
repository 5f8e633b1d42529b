use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use thiserror::Error;
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            IsAdminRequest, IsAdminResponse, LoginRequest, LoginResponse, RegisterRequest,
            RegisterResponse,
        },
        errors::{AuthError, ErrorKind},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/is-admin", post(is_admin))
}

/// Transport-level failure. Internal causes never reach the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(&'static str),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => match e.kind() {
                ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ErrorKind::UserAlreadyExists => StatusCode::CONFLICT,
                ErrorKind::UserNotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidArgument(_) => "invalid_argument",
            ApiError::Auth(e) => match e.kind() {
                ErrorKind::InvalidCredentials => "unauthenticated",
                ErrorKind::UserAlreadyExists => "already_exists",
                ErrorKind::UserNotFound => "not_found",
                ErrorKind::Internal => "internal",
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidArgument(msg) => (*msg).to_string(),
            ApiError::Auth(e) => match e.kind() {
                ErrorKind::Internal => "internal server error".to_string(),
                kind => kind.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.message(),
            }
        });
        (self.status_code(), Json(body)).into_response()
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::InvalidArgument("email or password is required"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_credentials(&payload.email, &payload.password)?;
    if payload.app_id == 0 {
        return Err(ApiError::InvalidArgument("app_id is required"));
    }

    let token = state
        .auth
        .login(&payload.email, &payload.password, payload.app_id)
        .await?;
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    validate_credentials(&payload.email, &payload.password)?;

    let user_id = state
        .auth
        .register_new_user(&payload.email, &payload.password)
        .await?;
    Ok(Json(RegisterResponse { user_id }))
}

#[instrument(skip(state, payload))]
pub async fn is_admin(
    State(state): State<AppState>,
    Json(payload): Json<IsAdminRequest>,
) -> Result<Json<IsAdminResponse>, ApiError> {
    if payload.user_id == 0 {
        return Err(ApiError::InvalidArgument("user_id is required"));
    }

    let is_admin = state.auth.is_admin(payload.user_id).await?;
    Ok(Json(IsAdminResponse { is_admin }))
}
