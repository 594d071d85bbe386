//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Release builds never show the text of an `Internal` error to clients
const MASK_INTERNAL_ERRORS: bool = cfg!(not(debug_assertions));

const MASKED_INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Body rendered for every failed request
#[derive(Debug, Serialize)]
pub struct FailBody {
    pub status: &'static str,
    pub message: String,
}

impl FailBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: message.into(),
        }
    }
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("timeout: {message}")]
    Timeout { message: String, code: String },

    /// Server-side failure with a fixed client message; `source` is only logged.
    #[error("{message}")]
    Failure {
        message: String,
        code: String,
        #[source]
        source: anyhow::Error,
    },

    /// Debug builds show the outermost context; release builds mask it.
    /// The full chain always goes to the log.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a request timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            code: "request_timeout".to_string(),
        }
    }

    /// Create a server failure whose message is safe to show in every build
    pub fn failure(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Failure {
            message: message.into(),
            code: "internal_error".to_string(),
            source: source.into(),
        }
    }

    /// HTTP status this error is rendered with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            AppError::Failure { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the fail envelope, replacing `Internal` text when `mask_internal` is set
    fn render(self, mask_internal: bool) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        let (error_code, message, chain) = match self {
            AppError::Validation { message, code }
            | AppError::NotFound { message, code }
            | AppError::BadRequest { message, code }
            | AppError::Timeout { message, code } => (code, message, None),
            AppError::Failure {
                message,
                code,
                source,
            } => {
                let chain = format!("{message}: {source:#}");
                (code, message, Some(chain))
            }
            AppError::Internal(e) => {
                let message = if mask_internal {
                    MASKED_INTERNAL_MESSAGE.to_string()
                } else {
                    e.to_string()
                };
                ("internal_error".to_string(), message, Some(format!("{e:#}")))
            }
        };

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                error = chain.as_deref().unwrap_or(message.as_str()),
                "Request error"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                reason = %message,
                "Request rejected"
            );
        }

        (status, Json(FailBody::new(message))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request payload: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.render(MASK_INTERNAL_ERRORS)
    }
}
