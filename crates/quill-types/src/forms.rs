use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::models::BlogPost;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 500;
pub const MAX_TITLE_LEN: usize = 250;

/// Field name -> messages, in field order of the rendered form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// A form schema: checks the submitted values and reports every failing field.
pub trait Validate {
    fn validate(&self) -> Result<(), FormErrors>;
}

// -- Field checks --

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

fn min_len(errors: &mut FormErrors, field: &'static str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("Field must be at least {min} characters long."));
    }
}

fn max_len(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.add(field, format!("Field cannot be longer than {max} characters."));
    }
}

/// Absolute http(s) URL whose host is `localhost` or carries a top-level domain.
fn parse_web_url(value: &str) -> Option<Url> {
    Url::parse(value.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .filter(|u| {
            u.host_str()
                .is_some_and(|host| host == "localhost" || host.trim_end_matches('.').contains('.'))
        })
}

fn web_url(errors: &mut FormErrors, field: &'static str, value: &str) {
    if parse_web_url(value).is_none() {
        errors.add(field, "Invalid URL.");
    }
}

// -- Forms --

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if required(&mut errors, "email", &self.email) {
            max_len(&mut errors, "email", &self.email, MAX_EMAIL_LEN);
        }
        if required(&mut errors, "password", &self.password) {
            min_len(&mut errors, "password", &self.password, MIN_PASSWORD_LEN);
        }
        if required(&mut errors, "name", &self.name) {
            max_len(&mut errors, "name", &self.name, MAX_NAME_LEN);
        }
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "email", &self.email);
        required(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl Validate for PostForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if required(&mut errors, "title", &self.title) {
            max_len(&mut errors, "title", &self.title, MAX_TITLE_LEN);
        }
        if required(&mut errors, "subtitle", &self.subtitle) {
            max_len(&mut errors, "subtitle", &self.subtitle, MAX_TITLE_LEN);
        }
        if required(&mut errors, "img_url", &self.img_url) {
            web_url(&mut errors, "img_url", &self.img_url);
            max_len(&mut errors, "img_url", &self.img_url, MAX_TITLE_LEN);
        }
        required(&mut errors, "body", &self.body);
        errors.into_result()
    }
}

impl PostForm {
    /// The image URL as the parser serializes it (lowercased host, spaces and
    /// other unsafe bytes percent-encoded). `None` if it doesn't validate.
    pub fn normalized_img_url(&self) -> Option<String> {
        parse_web_url(&self.img_url).map(String::from)
    }
}

impl From<&BlogPost> for PostForm {
    fn from(post: &BlogPost) -> Self {
        Self {
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            img_url: post.img_url.clone(),
            body: post.body.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub comment: String,
}

impl Validate for CommentForm {
    fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        required(&mut errors, "comment", &self.comment);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_form(img_url: &str) -> PostForm {
        PostForm {
            title: "Rust in production".into(),
            subtitle: "Notes from a year of axum".into(),
            img_url: img_url.into(),
            body: "<p>Hello</p>".into(),
        }
    }

    #[test]
    fn register_requires_every_field() {
        let errors = RegisterForm::default().validate().unwrap_err();
        for field in ["email", "password", "name"] {
            assert_eq!(errors.field(field), ["This field is required."]);
        }
    }

    #[test]
    fn register_rejects_short_password() {
        let form = RegisterForm {
            email: "ann@example.com".into(),
            password: "1234567".into(),
            name: "ann".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("password"), ["Field must be at least 8 characters long."]);
        assert!(errors.field("email").is_empty());
    }

    #[test]
    fn register_does_not_check_email_format() {
        let form = RegisterForm {
            email: "not-an-email".into(),
            password: "12345678".into(),
            name: "ann".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn whitespace_only_is_missing() {
        let form = LoginForm { email: "   ".into(), password: "\t".into() };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("email").len(), 1);
        assert_eq!(errors.field("password").len(), 1);
    }

    #[test]
    fn post_image_must_be_a_web_url() {
        assert!(post_form("https://images.example.com/cover.jpg").validate().is_ok());
        assert!(post_form("http://localhost:8080/a.png").validate().is_ok());

        for bad in ["cover.jpg", "ftp://example.com/a.png", "https://intranet/a.png", "javascript:alert(1)"] {
            let errors = post_form(bad).validate().unwrap_err();
            assert_eq!(errors.field("img_url"), ["Invalid URL."], "{bad}");
        }
    }

    #[test]
    fn image_url_is_normalized() {
        let form = post_form("  https://Images.Example.com/a b.png ");
        assert_eq!(
            form.normalized_img_url().as_deref(),
            Some("https://images.example.com/a%20b.png")
        );
        assert_eq!(post_form("ftp://example.com/a.png").normalized_img_url(), None);
    }

    #[test]
    fn post_title_length_is_capped() {
        let mut form = post_form("https://example.com/a.png");
        form.title = "x".repeat(MAX_TITLE_LEN + 1);
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.field("title"), ["Field cannot be longer than 250 characters."]);
    }

    #[test]
    fn comment_requires_text() {
        assert!(CommentForm { comment: "nice".into() }.validate().is_ok());
        assert!(CommentForm::default().validate().is_err());
    }
}
