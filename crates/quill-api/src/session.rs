use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use maud::Markup;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quill_types::models::User;

use crate::error::AppError;
use crate::state::{AppState, blocking};
use crate::views::Page;

pub const SESSION_COOKIE: &str = "quill_session";
pub const FLASH_COOKIE: &str = "quill_flash";

/// Session tokens expire after this many days even if the browser keeps the cookie.
const SESSION_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub name: String,
    pub exp: usize,
}

/// Request-scoped authentication context.
///
/// Extracted once per request from the cookies: the logged-in user (if any,
/// reloaded from the database) and the flash messages left by the previous
/// response. Handlers mutate it and finish with [`Session::render`] or
/// [`Session::redirect`], which write the cookie changes back.
pub struct Session {
    pub user: Option<User>,
    jar: CookieJar,
    incoming: Vec<String>,
    pending: Vec<String>,
    secret: String,
    secure: bool,
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let incoming = jar
            .get(FLASH_COOKIE)
            .map(|c| decode_flashes(c.value()))
            .unwrap_or_default();

        let user_id = jar
            .get(SESSION_COOKIE)
            .and_then(|c| verify_token(&state.session_secret, c.value()));

        // A token for a user that no longer exists is just anonymous.
        let user = match user_id {
            Some(id) => blocking(state, move |db| db.get_user_by_id(id))
                .await?
                .map(User::from),
            None => None,
        };

        Ok(Session {
            user,
            jar,
            incoming,
            pending: Vec::new(),
            secret: state.session_secret.clone(),
            secure: state.secure_cookies,
        })
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Queue a message for the next rendered page.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.pending.push(message.into());
    }

    /// Establish `user` as the authenticated identity for this and later requests.
    pub fn log_in(&mut self, user: User) -> Result<(), AppError> {
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        self.jar = std::mem::take(&mut self.jar).add(cookie);
        self.user = Some(user);
        Ok(())
    }

    /// Forget the authenticated identity. Returns false if nobody was logged in.
    pub fn log_out(&mut self) -> bool {
        if self.user.take().is_none() {
            return false;
        }
        self.jar = std::mem::take(&mut self.jar).remove(Cookie::build(SESSION_COOKIE).path("/"));
        true
    }

    /// Redirect, carrying unread flash messages over to the next page.
    pub fn redirect(self, to: &str) -> Response {
        let Session { mut jar, mut incoming, pending, secure, .. } = self;
        if !pending.is_empty() {
            incoming.extend(pending);
            jar = jar.add(flash_cookie(&incoming, secure));
        }
        (jar, Redirect::to(to)).into_response()
    }

    /// Render a page through the common layout. Flash messages shown here are consumed.
    pub fn render(self, view: impl FnOnce(&Page<'_>) -> Markup) -> Response {
        let Session { user, mut jar, mut incoming, pending, .. } = self;
        if !incoming.is_empty() {
            jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
        }
        incoming.extend(pending);

        let page = Page {
            user: user.as_ref(),
            flashes: &incoming,
        };
        let markup = view(&page);
        (jar, Html(markup.into_string())).into_response()
    }
}

fn verify_token(secret: &str, token: &str) -> Option<i64> {
    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default()) {
        Ok(data) => data.claims.sub.parse().ok(),
        Err(e) => {
            debug!("Ignoring session cookie: {}", e);
            None
        }
    }
}

fn flash_cookie(messages: &[String], secure: bool) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, B64.encode(messages.join("\n"))))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn decode_flashes(value: &str) -> Vec<String> {
    B64.decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .map(|text| {
            text.lines()
                .filter(|l| !l.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}
