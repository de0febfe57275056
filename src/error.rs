//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing env variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Failures raised by a record store. Never shown to clients verbatim.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("record encoding: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("table {table} does not support the {filter} filter")]
    UnsupportedFilter { table: &'static str, filter: &'static str },
    #[error("constraint violation on {table}.{column}")]
    Constraint { table: &'static str, column: String },
    #[error("store lock poisoned: {0}")]
    Poisoned(String),
}

/// Process startup failures: configuration, connection, schema bootstrap.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("schema bootstrap failed: {0}")]
    Bootstrap(#[from] StoreError),
}

/// Failure of a `perform_create` hook; aborts the create before anything is written.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors returned by resource controller operations.
///
/// `InvalidArgument` carries text meant for the caller (decode and validation
/// messages). `NotFound` and `Internal` carry fixed messages; the underlying
/// cause is logged where the error is produced.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
