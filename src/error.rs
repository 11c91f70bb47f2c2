use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum TxirimiriError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSON body: {0}")]
    JsonRejection(#[from] JsonRejection),

    #[error("Invalid query string: {0}")]
    QueryRejection(#[from] QueryRejection),

    #[error("Invalid path parameter: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Session store error: {0}")]
    SessionError(String),
}

impl TxirimiriError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::JsonRejection(r) if r.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::JsonRejection(_)
            | Self::QueryRejection(_)
            | Self::PathRejection(_)
            | Self::Base64(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::JsonError(_) | Self::SessionError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TxirimiriError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match &self {
            TxirimiriError::NotFound { entity } => {
                tracing::debug!(entity, "lookup missed");
                ApiErrorResponse {
                    error: "Not found".to_string(),
                    code: "NOT_FOUND",
                }
            }
            TxirimiriError::DatabaseError(_)
            | TxirimiriError::JsonError(_)
            | TxirimiriError::SessionError(_) => {
                error!(error = %self, "request failed");
                ApiErrorResponse {
                    error: "An internal server error occurred.".to_string(),
                    code: "INTERNAL_ERROR",
                }
            }
            _ if status == StatusCode::PAYLOAD_TOO_LARGE => ApiErrorResponse {
                error: "request body too large".to_string(),
                code: "PAYLOAD_TOO_LARGE",
            },
            _ => ApiErrorResponse {
                error: self.to_string(),
                code: "BAD_REQUEST",
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: &'static str,
}
