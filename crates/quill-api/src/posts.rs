use axum::{
    Form,
    extract::{Path, State},
    response::Response,
};
use tracing::{info, warn};

use quill_types::forms::{CommentForm, FormErrors, PostForm, Validate};
use quill_types::models::{BlogPost, Comment, NewPost, PostEdit};

use crate::error::AppError;
use crate::sanitize;
use crate::session::Session;
use crate::state::{AppState, blocking};
use crate::views;

const POST_DATE_FORMAT: &str = "%B %d, %Y";
const COMMENT_DATE_FORMAT: &str = "%B %d, %Y, %I:%M%p";

const TITLE_TAKEN: &str = "A post with that title already exists.";
const LOGIN_TO_POST: &str = "You must be logged in to submit a new post.";
const LOGIN_TO_ACT: &str = "You must be logged in to complete actions.";
const LOGIN_TO_COMMENT: &str = "You need to login or register to comment.";
const NOT_PERMITTED: &str = "You do not have permissions to complete that action.";

/// Ids that are not numbers can't name a post.
fn parse_post_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

async fn load_post(state: &AppState, id: i64) -> Result<BlogPost, AppError> {
    blocking(state, move |db| db.get_post(id))
        .await?
        .map(BlogPost::from)
        .ok_or(AppError::NotFound)
}

async fn load_comments(state: &AppState, post_id: i64) -> Result<Vec<Comment>, AppError> {
    let rows = blocking(state, move |db| db.comments_for_post(post_id)).await?;
    Ok(rows.into_iter().map(Comment::from).collect())
}

/// Lets the session through only if it belongs to the post's author;
/// otherwise the redirect that explains why not.
fn require_author(mut session: Session, post: &BlogPost) -> Result<Session, Response> {
    match session.user.as_ref().map(|u| (u.id, post.is_authored_by(u))) {
        None => {
            session.flash(LOGIN_TO_ACT);
            Err(session.redirect("/"))
        }
        Some((user_id, false)) => {
            warn!("User {} denied access to post {}", user_id, post.id);
            session.flash(NOT_PERMITTED);
            Err(session.redirect("/"))
        }
        Some((_, true)) => Ok(session),
    }
}

/// Posts store the parsed form of the image URL, never the raw input.
fn stored_img_url(form: &PostForm) -> Result<String, AppError> {
    form.normalized_img_url()
        .ok_or_else(|| AppError::Internal("validated image URL failed to parse".into()))
}

// -- Listing --

pub async fn list_posts(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let rows = blocking(&state, |db| db.list_posts()).await?;
    let posts: Vec<BlogPost> = rows.into_iter().map(BlogPost::from).collect();
    Ok(session.render(|page| views::index(page, &posts)))
}

pub async fn user_posts(
    State(state): State<AppState>,
    Path(author_name): Path<String>,
    session: Session,
) -> Result<Response, AppError> {
    let name = author_name.clone();
    let rows = blocking(&state, move |db| {
        let Some(author) = db.get_user_by_name(&name)? else {
            return Ok(None);
        };
        db.posts_by_author(author.id).map(Some)
    })
    .await?
    .ok_or(AppError::NotFound)?;

    let posts: Vec<BlogPost> = rows.into_iter().map(BlogPost::from).collect();
    Ok(session.render(|page| views::user_posts(page, &author_name, &posts)))
}

// -- Detail + comments --

pub async fn show_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    session: Session,
) -> Result<Response, AppError> {
    let post = load_post(&state, parse_post_id(&post_id)?).await?;
    let comments = load_comments(&state, post.id).await?;
    Ok(session.render(|page| {
        views::post(page, &post, &comments, &CommentForm::default(), &FormErrors::default())
    }))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    mut session: Session,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let post = load_post(&state, parse_post_id(&post_id)?).await?;

    if let Err(errors) = form.validate() {
        let comments = load_comments(&state, post.id).await?;
        return Ok(session.render(|page| views::post(page, &post, &comments, &form, &errors)));
    }

    let Some(author_id) = session.user.as_ref().map(|u| u.id) else {
        session.flash(LOGIN_TO_COMMENT);
        return Ok(session.redirect("/login"));
    };

    let text = sanitize::clean(&form.comment);
    let date = chrono::Local::now().format(COMMENT_DATE_FORMAT).to_string();
    let pid = post.id;
    blocking(&state, move |db| db.create_comment(pid, author_id, &date, &text)).await?;

    // Redirect so a reload doesn't post the comment twice.
    Ok(session.redirect(&format!("/{}", post.id)))
}

// -- Create --

pub async fn new_post_page(mut session: Session) -> Response {
    if !session.is_authenticated() {
        session.flash(LOGIN_TO_POST);
        return session.redirect("/");
    }
    session.render(|page| {
        views::make_post(page, &PostForm::default(), &FormErrors::default(), "/new-post", false)
    })
}

pub async fn create_post(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let Some(author_id) = session.user.as_ref().map(|u| u.id) else {
        session.flash(LOGIN_TO_POST);
        return Ok(session.redirect("/"));
    };

    if let Err(errors) = form.validate() {
        return Ok(session.render(|page| views::make_post(page, &form, &errors, "/new-post", false)));
    }

    let new_post = NewPost {
        title: form.title.clone(),
        subtitle: form.subtitle.clone(),
        date: chrono::Local::now().format(POST_DATE_FORMAT).to_string(),
        body: sanitize::clean(&form.body),
        img_url: stored_img_url(&form)?,
        author_id,
    };

    match blocking(&state, move |db| db.create_post(&new_post)).await {
        Ok(id) => {
            info!("User {} created post {}", author_id, id);
            Ok(session.redirect("/"))
        }
        Err(AppError::Conflict) => {
            session.flash(TITLE_TAKEN);
            Ok(session.render(|page| {
                views::make_post(page, &form, &FormErrors::default(), "/new-post", false)
            }))
        }
        Err(e) => Err(e),
    }
}

// -- Edit --

pub async fn edit_post_page(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    session: Session,
) -> Result<Response, AppError> {
    let post = load_post(&state, parse_post_id(&post_id)?).await?;
    let session = match require_author(session, &post) {
        Ok(session) => session,
        Err(denied) => return Ok(denied),
    };

    let form = PostForm::from(&post);
    let action = format!("/edit/{}", post.id);
    Ok(session.render(|page| views::make_post(page, &form, &FormErrors::default(), &action, true)))
}

pub async fn edit_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    session: Session,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = load_post(&state, parse_post_id(&post_id)?).await?;
    let mut session = match require_author(session, &post) {
        Ok(session) => session,
        Err(denied) => return Ok(denied),
    };

    let action = format!("/edit/{}", post.id);
    if let Err(errors) = form.validate() {
        return Ok(session.render(|page| views::make_post(page, &form, &errors, &action, true)));
    }

    let edit = PostEdit {
        title: form.title.clone(),
        subtitle: form.subtitle.clone(),
        body: sanitize::clean(&form.body),
        img_url: stored_img_url(&form)?,
    };

    let id = post.id;
    match blocking(&state, move |db| db.update_post(id, &edit)).await {
        Ok(true) => {
            info!("Post {} edited", id);
            Ok(session.redirect(&format!("/{id}")))
        }
        // Deleted between the load and the update.
        Ok(false) => Err(AppError::NotFound),
        Err(AppError::Conflict) => {
            session.flash(TITLE_TAKEN);
            Ok(session.render(|page| {
                views::make_post(page, &form, &FormErrors::default(), &action, true)
            }))
        }
        Err(e) => Err(e),
    }
}

// -- Delete --

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    session: Session,
) -> Result<Response, AppError> {
    let post = load_post(&state, parse_post_id(&post_id)?).await?;
    let session = match require_author(session, &post) {
        Ok(session) => session,
        Err(denied) => return Ok(denied),
    };

    let id = post.id;
    if !blocking(&state, move |db| db.delete_post(id)).await? {
        return Err(AppError::NotFound);
    }

    info!("Post {} deleted", id);
    Ok(session.redirect("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert_eq!(parse_post_id("17").ok(), Some(17));
        assert!(matches!(parse_post_id("favicon.ico"), Err(AppError::NotFound)));
        assert!(matches!(parse_post_id(""), Err(AppError::NotFound)));
    }

    #[test]
    fn date_formats() {
        let when = chrono::NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(21, 5, 0)
            .unwrap();
        assert_eq!(when.format(POST_DATE_FORMAT).to_string(), "October 18, 2026");
        assert_eq!(when.format(COMMENT_DATE_FORMAT).to_string(), "October 18, 2026, 09:05PM");
    }
}
