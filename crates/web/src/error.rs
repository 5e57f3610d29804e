use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by request handlers. Every variant becomes a plain-text
/// 500 response; the detail only goes to the log.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Deck generation failed: {0}")]
    Deck(#[from] menu_core::Error),

    #[error("Page rendering failed: {0}")]
    Render(#[from] askama::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
