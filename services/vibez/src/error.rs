//! Custom error types for the Vibez web service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors a handler can fail with.
///
/// Expected user mistakes (wrong password, bad form values) are flashed and
/// redirected instead; these variants are for everything else.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The music API could not be reached or rejected the request
    #[error("Music service unavailable")]
    MusicService,

    /// Session state could not be loaded or saved
    #[error("Session store unavailable")]
    SessionStore,

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MusicService => StatusCode::BAD_GATEWAY,
            AppError::SessionStore | AppError::InternalServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;
