use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::entity::ValidationError;

/// Every failure the core can report to the transport layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input violates a precondition (empty id, bad pagination, bad sort).
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("record not found")]
    NotFound,

    #[error("email already exists")]
    DuplicateEmail,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token expiry is out of range")]
    TokenExpiry,

    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    fn code(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound => "NOT_FOUND",
            Error::DuplicateEmail => "DUPLICATE_EMAIL",
            Error::InvalidCredentials => "INVALID_CREDENTIALS",
            Error::Hashing(_) => "HASHING_ERROR",
            Error::TokenExpiry | Error::Token(_) => "TOKEN_ERROR",
            Error::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Hashing(_) | Error::TokenExpiry | Error::Token(_) | Error::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand to clients; internal failures are logged instead.
    fn public_message(&self) -> String {
        match self {
            Error::Hashing(e) => {
                error!(error = %e, "password hashing failed");
                "failed to process credentials".into()
            }
            Error::TokenExpiry => {
                error!("jwt expiry out of range");
                "failed to generate token".into()
            }
            Error::Token(e) => {
                error!(error = %e, "jwt signing failed");
                "failed to generate token".into()
            }
            Error::Storage(e) => {
                error!(error = %e, "storage failure");
                "a storage error occurred".into()
            }
            other => other.to_string(),
        }
    }
}

/// Malformed or incomplete request bodies are a 400, whatever axum's reason.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidArgument(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.public_message(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
