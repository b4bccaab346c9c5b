use serde::Serialize;
use thiserror::Error;

use crate::services::answer_remap::RemapError;
use crate::services::scoring::ScaleError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Unprocessable(_) => 422,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> ErrorResponse {
        let status = self.status();
        let detail = match self {
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Unprocessable(message) => message,
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal engine error");
                message
            }
        };
        ErrorResponse { status, detail }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("Malformed request: {err}"))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<RemapError> for ApiError {
    fn from(err: RemapError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}

impl From<ScaleError> for ApiError {
    fn from(err: ScaleError) -> Self {
        ApiError::Unprocessable(err.to_string())
    }
}
