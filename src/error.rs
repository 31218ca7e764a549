use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("no available port found after checking {attempts} ports starting from {start}")]
    NoPortAvailable { start: u16, attempts: u16 },

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("path is outside the served directory")]
    Forbidden,

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not a directory")]
    NotADirectory,

    #[error("cannot download a directory")]
    NotAFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServeError::NoPortAvailable { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "NO_PORT_AVAILABLE")
            }
            ServeError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServeError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ServeError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "INVALID_PATH"),
            ServeError::NotADirectory => (StatusCode::BAD_REQUEST, "NOT_A_DIRECTORY"),
            ServeError::NotAFile => (StatusCode::BAD_REQUEST, "NOT_A_FILE"),
            ServeError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}
