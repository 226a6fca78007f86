//! Error type for the HTTP surface.
//!
//! Every failure a request can hit ends up here and is rendered as
//! `{ "ok": false, "error": "..." }` with a matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body is not valid JSON, or not the expected shape
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// `text` is missing or blank
    #[error("text is required")]
    MissingText,

    /// A field is present but has a value we don't accept
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// Access token missing or wrong
    #[error("Unauthorized")]
    Unauthorized,

    /// Server has no OpenAI key configured
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    /// The LLM API answered with an error; its status is passed through
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The LLM API could not be reached or answered garbage
    #[error("Upstream request failed: {0}")]
    Transport(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_field(field: &'static str, value: impl Into<String>) -> Self {
        ApiError::InvalidField {
            field,
            value: value.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::MissingText | ApiError::InvalidField { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Upstream { status, .. } => {
                // Only mirror real error statuses; anything else is our failure
                StatusCode::from_u16(*status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::MissingApiKey | ApiError::Transport(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidJson(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, self);
        } else {
            warn!("Request rejected ({}): {}", status, self);
        }

        (
            status,
            Json(json!({
                "ok": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
