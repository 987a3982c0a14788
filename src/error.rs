use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error types for the tz-meter service
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected before any upstream call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No entrypoint is registered under the requested key
    #[error("Unknown entrypoint: {0}")]
    UnknownEntrypoint(String),

    /// Upstream provider answered with a non-2xx status
    #[error("{provider} error: {status}")]
    UpstreamStatus { provider: &'static str, status: u16 },

    /// Wrapper for reqwest errors (connection refused, body decode, ...)
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Configured upstream base URL cannot carry a request path
    #[error("Invalid upstream URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    /// Malformed JSON request body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A handler output could not be turned into JSON
    #[error("Failed to serialize output: {0}")]
    Serialization(serde_json::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownEntrypoint(_) => StatusCode::NOT_FOUND,
            AppError::UpstreamStatus { .. }
            | AppError::Request(_)
            | AppError::UpstreamUrl(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the caller. Transport and internal failures stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Request(_) | AppError::UpstreamUrl(_) => "Upstream request failed".to_string(),
            AppError::Serialization(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Entrypoint failed: {}", self);
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_embedded_in_message() {
        let err = AppError::UpstreamStatus {
            provider: "Time API",
            status: 404,
        };
        assert_eq!(err.to_string(), "Time API error: 404");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = AppError::InvalidInput("timezone must not be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_upstream_url_is_not_echoed() {
        let parse_error = url::Url::parse("not a url").unwrap_err();
        let err = AppError::UpstreamUrl(parse_error);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Upstream request failed");
    }

    #[test]
    fn serialization_failure_is_a_server_error() {
        let json_error = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = AppError::Serialization(json_error);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn unknown_entrypoint_maps_to_not_found() {
        let response = AppError::UnknownEntrypoint("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
