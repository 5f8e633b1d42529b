//! Domain errors produced by the authentication service.
//!
//! Every error carries the operation that raised it and a [`ErrorKind`] tag.
//! Callers branch on the kind; the wrapped cause is only for logs.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown email or wrong password. The two are never told apart.
    InvalidCredentials,
    UserAlreadyExists,
    UserNotFound,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidCredentials => "invalid credentials",
            ErrorKind::UserAlreadyExists => "user already exists",
            ErrorKind::UserNotFound => "user not found",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("{op}: {kind}")]
pub struct AuthError {
    op: &'static str,
    kind: ErrorKind,
    #[source]
    source: Option<anyhow::Error>,
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn new(op: &'static str, kind: ErrorKind) -> Self {
        Self {
            op,
            kind,
            source: None,
        }
    }

    pub fn internal(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            op,
            kind: ErrorKind::Internal,
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn op(&self) -> &'static str {
        self.op
    }
}
