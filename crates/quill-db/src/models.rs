//! Database row types, mapped straight from SQLite rows. Kept apart from the
//! quill-types models so the password hash stays inside this crate.

use quill_types::models::{BlogPost, Comment, User};

pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub date: String,
    pub body: String,
    pub img_url: String,
    pub author_id: i64,
    pub author_name: String,
}

pub struct CommentRow {
    pub id: i64,
    pub date: String,
    pub text: String,
    pub author_id: i64,
    pub author_name: String,
    pub post_id: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            name: row.name,
        }
    }
}

impl From<PostRow> for BlogPost {
    fn from(row: PostRow) -> Self {
        BlogPost {
            id: row.id,
            title: row.title,
            subtitle: row.subtitle,
            date: row.date,
            body: row.body,
            img_url: row.img_url,
            author_id: row.author_id,
            author_name: row.author_name,
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            date: row.date,
            text: row.text,
            author_id: row.author_id,
            author_name: row.author_name,
            post_id: row.post_id,
        }
    }
}
