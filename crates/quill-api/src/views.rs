//! HTML views. Every value is escaped by maud except post bodies and comment
//! texts, which were sanitized before they were stored.

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use quill_types::forms::{CommentForm, FormErrors, LoginForm, PostForm, RegisterForm};
use quill_types::models::{BlogPost, Comment, User};

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const CKEDITOR_JS: &str = "https://cdn.ckeditor.com/4.22.1/standard/ckeditor.js";
const DEFAULT_HEADER_IMG: &str = "https://images.unsplash.com/photo-1470092306007-055b6797ca72?w=1600";

/// What every page needs from the request: who is looking and what to tell them.
pub struct Page<'a> {
    pub user: Option<&'a User>,
    pub flashes: &'a [String],
}

fn layout(page: &Page<'_>, title: &str, header: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Quill" }
                link rel="stylesheet" href=(BOOTSTRAP_CSS);
            }
            body {
                nav.navbar.navbar-expand-lg.navbar-light.bg-light {
                    div.container {
                        a.navbar-brand href="/" { "Quill" }
                        ul.navbar-nav.ms-auto {
                            li.nav-item { a.nav-link href="/" { "Home" } }
                            @if let Some(user) = page.user {
                                li.nav-item { a.nav-link href="/new-post" { "New Post" } }
                                li.nav-item {
                                    a.nav-link href=(user_posts_href(&user.name)) { "My Posts" }
                                }
                                li.nav-item { a.nav-link href="/logout" { "Log Out" } }
                            } @else {
                                li.nav-item { a.nav-link href="/login" { "Login" } }
                                li.nav-item { a.nav-link href="/register" { "Register" } }
                            }
                            li.nav-item { a.nav-link href="/about" { "About" } }
                            li.nav-item { a.nav-link href="/contact" { "Contact" } }
                        }
                    }
                }
                (header)
                main.container.my-4 {
                    @for message in page.flashes {
                        div.alert.alert-info role="alert" { (message) }
                    }
                    (content)
                }
                footer.text-center.text-muted.py-4 { "Copyright © Quill" }
            }
        }
    }
}

/// `img_url` only ever goes into the escaped `src` attribute.
fn masthead(img_url: &str, heading: &str, subheading: Option<&str>, meta: Option<Markup>) -> Markup {
    html! {
        header.masthead.position-relative.overflow-hidden.text-white.bg-dark {
            img.masthead-img.position-absolute.top-0.start-0.w-100.h-100
                src=(img_url) alt="" style="object-fit: cover; opacity: 0.5;";
            div.container.position-relative.py-5 {
                h1 { (heading) }
                @if let Some(sub) = subheading {
                    h2.h4 { (sub) }
                }
                @if let Some(meta) = meta {
                    span.meta { (meta) }
                }
            }
        }
    }
}

fn user_posts_href(name: &str) -> String {
    format!("/user-posts/{}", urlencoding::encode(name))
}

fn field_errors(errors: &FormErrors, name: &str) -> Markup {
    html! {
        @for message in errors.field(name) {
            div.invalid-feedback.d-block { (message) }
        }
    }
}

fn input(errors: &FormErrors, name: &str, label: &str, kind: &str, value: &str) -> Markup {
    html! {
        div.mb-3 {
            label.form-label for=(name) { (label) }
            input.form-control id=(name) name=(name) type=(kind) value=(value);
            (field_errors(errors, name))
        }
    }
}

fn textarea(errors: &FormErrors, name: &str, label: &str, value: &str) -> Markup {
    html! {
        div.mb-3 {
            label.form-label for=(name) { (label) }
            textarea.form-control id=(name) name=(name) rows="8" { (value) }
            (field_errors(errors, name))
        }
    }
}

/// Swap the textarea named `field` for a CKEditor instance. Whatever it
/// produces still goes through the sanitizer on submit.
fn rich_text_editor(field: &'static str) -> Markup {
    html! {
        script src=(CKEDITOR_JS) {}
        script { (PreEscaped(format!("CKEDITOR.replace('{field}', {{ versionCheck: false }});"))) }
    }
}

fn post_preview(page: &Page<'_>, post: &BlogPost) -> Markup {
    html! {
        div.post-preview.mb-4 {
            a href=(format!("/{}", post.id)) {
                h2.post-title { (post.title) }
                h3.post-subtitle.h5.text-muted { (post.subtitle) }
            }
            p.post-meta {
                "Posted by "
                a href=(user_posts_href(&post.author_name)) { (post.author_name) }
                " on " (post.date)
                @if page.user.is_some_and(|u| post.is_authored_by(u)) {
                    " · " a href=(format!("/edit/{}", post.id)) { "Edit" }
                    " · " a.text-danger href=(format!("/delete/{}", post.id)) { "Delete" }
                }
            }
            hr;
        }
    }
}

pub fn index(page: &Page<'_>, posts: &[BlogPost]) -> Markup {
    let content = html! {
        @for post in posts {
            (post_preview(page, post))
        }
        @if posts.is_empty() {
            p { "Nothing has been posted yet." }
        }
        @if page.user.is_some() {
            a.btn.btn-primary href="/new-post" { "Create New Post" }
        }
    };
    layout(page, "Home", masthead(DEFAULT_HEADER_IMG, "Quill", Some("A blog for everyone."), None), content)
}

pub fn user_posts(page: &Page<'_>, author_name: &str, posts: &[BlogPost]) -> Markup {
    let content = html! {
        @for post in posts {
            (post_preview(page, post))
        }
        @if posts.is_empty() {
            p { (author_name) " has not posted anything yet." }
        }
    };
    let heading = format!("Posts by {author_name}");
    layout(page, &heading, masthead(DEFAULT_HEADER_IMG, &heading, None, None), content)
}

pub fn post(page: &Page<'_>, post: &BlogPost, comments: &[Comment], form: &CommentForm, errors: &FormErrors) -> Markup {
    let meta = html! {
        "Posted by "
        a.text-white href=(user_posts_href(&post.author_name)) { (post.author_name) }
        " on " (post.date)
    };
    let content = html! {
        article {
            (PreEscaped(&post.body))
        }
        @if page.user.is_some_and(|u| post.is_authored_by(u)) {
            div.d-flex.justify-content-end.mb-4 {
                a.btn.btn-outline-primary href=(format!("/edit/{}", post.id)) { "Edit Post" }
            }
        }
        hr;
        section.comments {
            h4 { "Comments" }
            @for comment in comments {
                div.comment.mb-3 {
                    div.comment-text { (PreEscaped(&comment.text)) }
                    small.text-muted {
                        (comment.author_name) " · " (comment.date)
                    }
                }
            }
            form method="post" action=(format!("/{}", post.id)) {
                (textarea(errors, "comment", "Add comment", &form.comment))
                button.btn.btn-primary type="submit" { "Submit comment" }
            }
            (rich_text_editor("comment"))
        }
    };
    layout(page, &post.title, masthead(&post.img_url, &post.title, Some(post.subtitle.as_str()), Some(meta)), content)
}

/// New-post and edit-post form. `action` is where the form posts to.
pub fn make_post(page: &Page<'_>, form: &PostForm, errors: &FormErrors, action: &str, is_edit: bool) -> Markup {
    let heading = if is_edit { "Edit Post" } else { "New Post" };
    let content = html! {
        form method="post" action=(action) {
            (input(errors, "title", "Blog Post Title", "text", &form.title))
            (input(errors, "subtitle", "Subtitle", "text", &form.subtitle))
            (input(errors, "img_url", "Blog Image URL", "url", &form.img_url))
            (textarea(errors, "body", "Blog Content", &form.body))
            button.btn.btn-primary type="submit" { "Submit Post" }
        }
        (rich_text_editor("body"))
    };
    layout(page, heading, masthead(DEFAULT_HEADER_IMG, heading, None, None), content)
}

pub fn register(page: &Page<'_>, form: &RegisterForm, errors: &FormErrors) -> Markup {
    let content = html! {
        form method="post" action="/register" {
            (input(errors, "email", "Your Email", "text", &form.email))
            // The password is never echoed back.
            (input(errors, "password", "Password", "password", ""))
            (input(errors, "name", "Your Name", "text", &form.name))
            button.btn.btn-primary type="submit" { "Register" }
        }
    };
    layout(page, "Register", masthead(DEFAULT_HEADER_IMG, "Register", Some("Start contributing to the blog!"), None), content)
}

pub fn login(page: &Page<'_>, form: &LoginForm, errors: &FormErrors) -> Markup {
    let content = html! {
        form method="post" action="/login" {
            (input(errors, "email", "Your Email", "text", &form.email))
            (input(errors, "password", "Password", "password", ""))
            button.btn.btn-primary type="submit" { "Login" }
        }
    };
    layout(page, "Login", masthead(DEFAULT_HEADER_IMG, "Log In", Some("Welcome back!"), None), content)
}

pub fn about(page: &Page<'_>) -> Markup {
    let content = html! {
        p {
            "Quill is a small community blog. Anyone can register, write posts "
            "and join the conversation in the comments."
        }
    };
    layout(page, "About", masthead(DEFAULT_HEADER_IMG, "About Me", Some("This is what I do."), None), content)
}

pub fn contact(page: &Page<'_>) -> Markup {
    let content = html! {
        p { "Want to get in touch? Leave a comment on any post and we will get back to you." }
    };
    layout(page, "Contact", masthead(DEFAULT_HEADER_IMG, "Contact Me", Some("Have questions? I have answers."), None), content)
}

/// Bare error page; rendered without a session because the request may have
/// failed before one could be built.
pub fn error_page(status: StatusCode) -> Markup {
    let reason = status.canonical_reason().unwrap_or("Error");
    let page = Page { user: None, flashes: &[] };
    let content = html! {
        h1 { (status.as_u16()) " " (reason) }
        @if status == StatusCode::NOT_FOUND {
            p { "The page you were looking for does not exist." }
        } @else {
            p { "Something went wrong on our end. Please try again later." }
        }
        a href="/" { "Back to all posts" }
    };
    layout(&page, reason, html! {}, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> BlogPost {
        BlogPost {
            id: 3,
            title: "<b>Title</b>".into(),
            subtitle: "Sub".into(),
            date: "October 18, 2026".into(),
            body: "<p>Body</p>".into(),
            img_url: "https://example.com/a.png".into(),
            author_id: 1,
            author_name: "Ann Lee".into(),
        }
    }

    #[test]
    fn titles_are_escaped_bodies_are_not() {
        let page = Page { user: None, flashes: &[] };
        let html = post(&page, &sample_post(), &[], &CommentForm::default(), &FormErrors::default()).into_string();
        assert!(html.contains("&lt;b&gt;Title&lt;/b&gt;"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn edit_links_only_for_the_author() {
        let ann = User { id: 1, email: "ann@example.com".into(), name: "Ann Lee".into() };
        let bob = User { id: 2, email: "bob@example.com".into(), name: "bob".into() };
        let posts = [sample_post()];

        let as_ann = index(&Page { user: Some(&ann), flashes: &[] }, &posts).into_string();
        let as_bob = index(&Page { user: Some(&bob), flashes: &[] }, &posts).into_string();
        assert!(as_ann.contains("/edit/3"));
        assert!(!as_bob.contains("/edit/3"));
    }

    #[test]
    fn author_links_are_percent_encoded() {
        assert_eq!(user_posts_href("Ann Lee"), "/user-posts/Ann%20Lee");
        assert_eq!(user_posts_href("é/x"), "/user-posts/%C3%A9%2Fx");
    }

    #[test]
    fn rich_text_fields_get_an_editor() {
        let page = Page { user: None, flashes: &[] };
        let html = make_post(&page, &PostForm::default(), &FormErrors::default(), "/new-post", false).into_string();
        assert!(html.contains(CKEDITOR_JS));
        assert!(html.contains("CKEDITOR.replace('body'"));

        let html = post(&page, &sample_post(), &[], &CommentForm::default(), &FormErrors::default()).into_string();
        assert!(html.contains("CKEDITOR.replace('comment'"));
    }

    #[test]
    fn header_image_is_an_escaped_attribute() {
        let html = masthead(r#"https://example.com/a.png");color:red;x("#, "Heading", None, None).into_string();
        assert!(html.contains(r#"src="https://example.com/a.png&quot;);color:red;x(""#));
        assert!(!html.contains("url("));
    }

    #[test]
    fn flashes_render() {
        let flashes = vec!["Logged in successfully.".to_string()];
        let html = about(&Page { user: None, flashes: &flashes }).into_string();
        assert!(html.contains("Logged in successfully."));
    }
}
