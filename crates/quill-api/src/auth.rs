use axum::{Form, extract::State, response::Response};
use tracing::{info, warn};

use quill_types::forms::{FormErrors, LoginForm, RegisterForm, Validate};
use quill_types::models::User;

use crate::error::AppError;
use crate::session::Session;
use crate::state::{AppState, blocking};
use crate::views;

const IN_USE: &str = "That email or username are already in use.";
const BAD_CREDENTIALS: &str = "Incorrect password or email, please try again.";

pub async fn register_page(session: Session) -> Response {
    session.render(|page| views::register(page, &RegisterForm::default(), &FormErrors::default()))
}

pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return Ok(session.render(|page| views::register(page, &form, &errors)));
    }

    let (email, password, name) = (form.email.clone(), form.password.clone(), form.name.clone());
    let created = blocking(&state, move |db| {
        if db.email_or_name_taken(&email, &name)? {
            return Ok(None);
        }
        let password_hash = quill_crypto::hash_password(&password)?;
        let id = db.create_user(&email, &password_hash, &name)?;
        Ok(Some(User { id, email, name }))
    })
    .await;

    let Some(user) = taken_on_conflict(created)? else {
        session.flash(IN_USE);
        return Ok(session.render(|page| views::register(page, &form, &FormErrors::default())));
    };

    info!("Registered user {} ({})", user.id, user.name);
    session.log_in(user)?;
    session.flash("Registered successfully.");
    Ok(session.redirect("/"))
}

/// A concurrent registration can slip past the pre-check; the UNIQUE
/// constraint catches it and it reads the same to the user as a taken name.
fn taken_on_conflict(created: Result<Option<User>, AppError>) -> Result<Option<User>, AppError> {
    match created {
        Err(AppError::Conflict) => Ok(None),
        other => other,
    }
}

pub async fn login_page(session: Session) -> Response {
    session.render(|page| views::login(page, &LoginForm::default(), &FormErrors::default()))
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        return Ok(session.render(|page| views::login(page, &form, &errors)));
    }

    let (email, password) = (form.email.clone(), form.password.clone());
    let user = blocking(&state, move |db| {
        let Some(row) = db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        if !quill_crypto::verify_password(&row.password, &password) {
            return Ok(None);
        }
        Ok(Some(User::from(row)))
    })
    .await?;

    // Unknown email and wrong password look the same from outside.
    let Some(user) = user else {
        warn!("Failed login for {}", form.email);
        session.flash(BAD_CREDENTIALS);
        return Ok(session.render(|page| views::login(page, &form, &FormErrors::default())));
    };

    info!("User {} logged in", user.id);
    session.log_in(user)?;
    session.flash("Logged in successfully.");
    Ok(session.redirect("/"))
}

pub async fn logout(mut session: Session) -> Response {
    if session.log_out() {
        session.flash("Logged out successfully.");
    } else {
        session.flash("You're not currently logged in to an account.");
    }
    session.redirect("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_db::Database;

    #[test]
    fn registration_race_reads_as_taken() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("ann@example.com", "$argon2id$stub", "ann").unwrap();

        // The second request passed its pre-check before the first committed.
        let raced = db
            .create_user("ann@example.com", "$argon2id$stub", "annie")
            .map(|id| Some(User { id, email: "ann@example.com".into(), name: "annie".into() }))
            .map_err(AppError::from);

        assert!(matches!(taken_on_conflict(raced), Ok(None)));
        assert!(db.get_user_by_name("annie").unwrap().is_none());
    }

    #[test]
    fn other_failures_still_fail() {
        assert!(matches!(taken_on_conflict(Err(AppError::NotFound)), Err(AppError::NotFound)));
        assert!(matches!(taken_on_conflict(Ok(None)), Ok(None)));
    }
}
