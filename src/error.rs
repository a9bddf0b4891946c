//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single failure type returned by every
//! task operation. Each variant is one entry of the failure taxonomy:
//! configuration problems, bad path identifiers, authentication failures,
//! ownership mismatches, missing tasks and malformed payloads.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can
//! return `Result<_, AppError>` and the transport layer turns the variant into
//! a status code with a JSON body of the form `{"error": "..."}`.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors` and
//! `jsonwebtoken::errors::Error` allow conversion with the `?` operator.

use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

/// Every way a task request can fail.
///
/// Failures are always scoped to one request; none of them is fatal to the
/// process.
#[derive(Debug, Error)]
pub enum AppError {
    /// The server is missing required setup, such as the signing secret (HTTP 500).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A path identifier is not a positive integer (HTTP 400).
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    /// The credential verified but carries neither `userId` nor `sub` (HTTP 401).
    #[error("Invalid token: missing user ID")]
    MissingSubject,
    /// The credential is absent, malformed, wrongly signed or uses the wrong algorithm (HTTP 401).
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
    /// The credential's `exp` lies in the past (HTTP 401).
    #[error("Token has expired")]
    ExpiredCredential,
    /// The caller's subject does not match the owner named in the path (HTTP 403).
    #[error("Access denied: you can only access your own tasks")]
    OwnershipMismatch,
    /// The task does not exist or belongs to someone else (HTTP 404).
    #[error("Task not found")]
    TaskNotFound,
    /// The request body failed shape or type validation (HTTP 422).
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// Storage failure. The detail is logged, never sent to the client (HTTP 500).
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// True for the failures that map to 401 and carry a `WWW-Authenticate` challenge.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AppError::MissingSubject | AppError::InvalidCredential(_) | AppError::ExpiredCredential
        )
    }

    /// The message placed in the response body.
    ///
    /// Server-side failures get a generic message so that internal details
    /// stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Configuration(_) => "Authentication is not configured".to_string(),
            AppError::Database(_) => "Internal server error".to_string(),
            AppError::InvalidCredential(_) => "Could not validate credentials".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            AppError::MissingSubject
            | AppError::InvalidCredential(_)
            | AppError::ExpiredCredential => StatusCode::UNAUTHORIZED,
            AppError::OwnershipMismatch => StatusCode::FORBIDDEN,
            AppError::TaskNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Configuration(detail) => log::error!("configuration error: {}", detail),
            AppError::Database(detail) => log::error!("database error: {}", detail),
            _ => {}
        }

        let mut builder = HttpResponse::build(self.status_code());
        if self.is_authentication_failure() {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(json!({ "error": self.public_message() }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `TaskNotFound`; all other storage errors become `Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::TaskNotFound,
            _ => AppError::Database(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::Database(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::InvalidPayload`,
/// keeping the field-level messages.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::InvalidPayload(error.to_string())
    }
}

/// Classifies JWT decoding failures.
///
/// Only an expired signature is reported separately; every other structural,
/// signature or algorithm problem is an invalid credential.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        match error.kind() {
            ErrorKind::ExpiredSignature => AppError::ExpiredCredential,
            _ => AppError::InvalidCredential(error.to_string()),
        }
    }
}
