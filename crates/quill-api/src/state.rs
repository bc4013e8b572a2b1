use std::sync::Arc;

use tracing::error;

use quill_db::Database;

use crate::error::AppError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// HS256 key for session tokens.
    pub session_secret: String,
    /// Mark cookies `Secure` (serve over HTTPS only).
    pub secure_cookies: bool,
}

impl AppStateInner {
    pub fn new(db: Database, session_secret: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            session_secret: session_secret.into(),
            secure_cookies: false,
        })
    }
}

/// Run blocking database (and password hashing) work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal("background task failed".into())
        })?
        .map_err(AppError::from)
}
