//! Typed errors and HTTP mapping.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate model: {0}")]
    DuplicateModel(String),
    #[error("duplicate field: {model}.{field}")]
    DuplicateField { model: String, field: String },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("model {model}: unknown operation '{operation}'")]
    UnknownOperation { model: String, operation: String },
    #[error("model {model}: raw operation '{operation}' cannot be exposed")]
    RawOperation { model: String, operation: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("invalid setting {name}: {message}")]
    Setting { name: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("unknown action '{action}' on table {table}")]
    UnknownAction { table: String, action: String },
    #[error("action {0} requires a target segment")]
    MissingTarget(String),
    #[error("action {action} expects {expected}, got {got}")]
    MethodMismatch {
        action: String,
        expected: Method,
        got: Method,
    },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("execution: {0}")]
    Execution(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownTable(_) | AppError::UnknownAction { .. } | AppError::MissingTarget(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::MethodMismatch { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::RecordNotFound(_)
            | AppError::Db(_)
            | AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Routing rejections (unknown table/action, missing target, wrong method) carry no body.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AppError::UnknownTable(_)
                | AppError::UnknownAction { .. }
                | AppError::MissingTarget(_)
                | AppError::MethodMismatch { .. }
        )
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::UnknownTable(_) | AppError::UnknownAction { .. } | AppError::MissingTarget(_) => "not_found",
            AppError::MethodMismatch { .. } => "method_not_allowed",
            AppError::BadRequest(_) => "bad_request",
            AppError::RecordNotFound(_) => "record_not_found",
            AppError::Db(_) => "database_error",
            AppError::Execution(_) => "execution_error",
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
        if self.is_rejection() {
            return status.into_response();
        }
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
