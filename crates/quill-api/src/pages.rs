use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::session::Session;
use crate::views;

pub async fn about(session: Session) -> Response {
    session.render(views::about)
}

pub async fn contact(session: Session) -> Response {
    session.render(views::contact)
}

pub async fn not_found() -> Response {
    AppError::NotFound.into_response()
}
