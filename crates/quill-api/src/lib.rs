//! HTTP surface of the blog: route handlers, the request-scoped session,
//! HTML views and the input sanitizer.

pub mod auth;
pub mod error;
pub mod pages;
pub mod posts;
pub mod sanitize;
pub mod session;
pub mod state;
pub mod views;

use axum::{Router, routing::get};

pub use error::AppError;
pub use state::{AppState, AppStateInner};

/// Every route of the site. Static paths win over `/{post_id}`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(posts::list_posts))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/new-post", get(posts::new_post_page).post(posts::create_post))
        .route("/edit/{post_id}", get(posts::edit_post_page).post(posts::edit_post))
        .route("/delete/{post_id}", get(posts::delete_post))
        .route("/user-posts/{author_name}", get(posts::user_posts))
        .route("/{post_id}", get(posts::show_post).post(posts::add_comment))
        .fallback(pages::not_found)
        .with_state(state)
}
