use axum::http::{Method, StatusCode};
use thiserror::Error;

use crate::telemetry::SynthError;

/// Everything a request can fail with. All variants are terminal for the
/// request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method {method} not allowed")]
    MethodNotAllowed { method: Method, allowed: Vec<Method> },

    #[error("endpoint '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("{0}")]
    Internal(String),
}

pub const INTERNAL_MESSAGE: &str = "Internal server error";

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Synth(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Synth(_) | ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Internal details only leave the process in dev mode.
    pub fn client_message(&self, dev_mode: bool) -> String {
        if self.status().is_server_error() && !dev_mode {
            INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}
