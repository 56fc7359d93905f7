//! Error responses.
//!
//! # Design Decisions
//! - Handlers return `Result<_, ApiError>`; the mapping to status codes lives here
//! - Error bodies are small JSON objects: `{"error": "..."}`
//! - Store failures are logged by the store; the client only sees a 500

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unknown application '{0}'")]
    UnknownApp(String),

    #[error("store unavailable")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownApp(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UnknownApp("x".into()).status(), StatusCode::NOT_FOUND);

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = ApiError::from(StoreError::Io { target: "db".into(), source: io });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "store unavailable");
    }
}
