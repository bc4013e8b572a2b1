use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::views;

/// Failures that end a request. Validation, authentication and authorization
/// problems are not errors here: handlers answer those with a re-rendered
/// form or a flash message and redirect.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    /// A UNIQUE constraint rejected the write (email, name or title taken).
    #[error("Conflict: value already in use")]
    Conflict,

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if quill_db::is_unique_violation(&err) {
            AppError::Conflict
        } else {
            AppError::Database(err)
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Html(views::error_page(status).into_string())).into_response()
    }
}
