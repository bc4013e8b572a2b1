use crate::Database;
use crate::models::{CommentRow, PostRow, UserRow};
use anyhow::Result;
use quill_types::models::{NewPost, PostEdit};
use rusqlite::{Connection, Row};

const POST_COLUMNS: &str =
    "p.id, p.title, p.subtitle, p.date, p.body, p.img_url, p.author_id, u.name
     FROM posts p
     JOIN users u ON p.author_id = u.id";

impl Database {
    // -- Users --

    /// Inserts a user and returns its id. A taken email or name surfaces as a
    /// UNIQUE violation (see [`crate::is_unique_violation`]).
    pub fn create_user(&self, email: &str, password_hash: &str, name: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (email, password, name) VALUES (?1, ?2, ?3)",
                (email, password_hash, name),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", &email))
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "name", &name))
    }

    pub fn email_or_name_taken(&self, email: &str, name: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 OR name = ?2)",
                (email, name),
                |row| row.get(0),
            )?;
            Ok(taken)
        })
    }

    // -- Posts --

    pub fn create_post(&self, post: &NewPost) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (title, subtitle, date, body, img_url, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    post.title,
                    post.subtitle,
                    post.date,
                    post.body,
                    post.img_url,
                    post.author_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} WHERE p.id = ?1");
            conn.query_row(&sql, [id], post_from_row).optional()
        })
    }

    /// Every post, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} ORDER BY p.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One author's posts, newest first.
    pub fn posts_by_author(&self, author_id: i64) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {POST_COLUMNS} WHERE p.author_id = ?1 ORDER BY p.id DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([author_id], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Rewrites the editable fields. Author and date are left alone.
    /// Returns false when no post has that id.
    pub fn update_post(&self, id: i64, edit: &PostEdit) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE posts SET title = ?1, subtitle = ?2, body = ?3, img_url = ?4 WHERE id = ?5",
                rusqlite::params![edit.title, edit.subtitle, edit.body, edit.img_url, id],
            )?;
            Ok(changed == 1)
        })
    }

    /// Deletes the post and, through the foreign key, its comments.
    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            Ok(changed == 1)
        })
    }

    // -- Comments --

    pub fn create_comment(&self, post_id: i64, author_id: i64, date: &str, text: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (date, text, author_id, post_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![date, text, author_id, post_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Comments on a post, oldest first.
    pub fn comments_for_post(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.date, c.text, c.author_id, u.name, c.post_id
                 FROM comments c
                 JOIN users u ON c.author_id = u.id
                 WHERE c.post_id = ?1
                 ORDER BY c.id ASC",
            )?;

            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        date: row.get(1)?,
                        text: row.get(2)?,
                        author_id: row.get(3)?,
                        author_name: row.get(4)?,
                        post_id: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &dyn rusqlite::ToSql) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, email, password, name FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    stmt.query_row([value], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            name: row.get(3)?,
        })
    })
    .optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        subtitle: row.get(2)?,
        date: row.get(3)?,
        body: row.get(4)?,
        img_url: row.get(5)?,
        author_id: row.get(6)?,
        author_name: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_unique_violation;

    fn db_with_author() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.create_user("ann@example.com", "$argon2id$stub", "ann").unwrap();
        (db, id)
    }

    fn new_post(title: &str, author_id: i64) -> NewPost {
        NewPost {
            title: title.to_string(),
            subtitle: "sub".to_string(),
            date: "October 18, 2026".to_string(),
            body: "<p>body</p>".to_string(),
            img_url: "https://example.com/a.png".to_string(),
            author_id,
        }
    }

    #[test]
    fn duplicate_email_or_name_is_a_unique_violation() {
        let (db, _) = db_with_author();

        let err = db.create_user("ann@example.com", "x", "someone-else").unwrap_err();
        assert!(is_unique_violation(&err));
        let err = db.create_user("other@example.com", "x", "ann").unwrap_err();
        assert!(is_unique_violation(&err));

        assert!(db.email_or_name_taken("ann@example.com", "nobody").unwrap());
        assert!(db.email_or_name_taken("nobody@example.com", "ann").unwrap());
        assert!(!db.email_or_name_taken("nobody@example.com", "nobody").unwrap());
    }

    #[test]
    fn user_lookups() {
        let (db, id) = db_with_author();

        assert_eq!(db.get_user_by_id(id).unwrap().unwrap().name, "ann");
        assert_eq!(db.get_user_by_email("ann@example.com").unwrap().unwrap().id, id);
        assert_eq!(db.get_user_by_name("ann").unwrap().unwrap().email, "ann@example.com");
        assert!(db.get_user_by_name("bob").unwrap().is_none());
    }

    #[test]
    fn posts_list_newest_first() {
        let (db, author) = db_with_author();
        let ids: Vec<i64> = ["one", "two", "three"]
            .iter()
            .map(|t| db.create_post(&new_post(t, author)).unwrap())
            .collect();

        let listed: Vec<i64> = db.list_posts().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(listed, ids.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn posts_by_author_filters() {
        let (db, ann) = db_with_author();
        let bob = db.create_user("bob@example.com", "x", "bob").unwrap();
        db.create_post(&new_post("ann's", ann)).unwrap();
        let bobs = db.create_post(&new_post("bob's", bob)).unwrap();

        let rows = db.posts_by_author(bob).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, bobs);
        assert_eq!(rows[0].author_name, "bob");
    }

    #[test]
    fn duplicate_title_is_a_unique_violation() {
        let (db, author) = db_with_author();
        db.create_post(&new_post("same", author)).unwrap();
        let err = db.create_post(&new_post("same", author)).unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn post_requires_existing_author() {
        let db = Database::open_in_memory().unwrap();
        let err = db.create_post(&new_post("orphan", 42)).unwrap_err();
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn update_keeps_author_and_date() {
        let (db, author) = db_with_author();
        let id = db.create_post(&new_post("before", author)).unwrap();

        let edit = PostEdit {
            title: "after".into(),
            subtitle: "new sub".into(),
            body: "<p>new</p>".into(),
            img_url: "https://example.com/b.png".into(),
        };
        assert!(db.update_post(id, &edit).unwrap());
        assert!(!db.update_post(id + 1, &edit).unwrap());

        let row = db.get_post(id).unwrap().unwrap();
        assert_eq!(row.title, "after");
        assert_eq!(row.img_url, "https://example.com/b.png");
        assert_eq!(row.author_id, author);
        assert_eq!(row.date, "October 18, 2026");
    }

    #[test]
    fn deleting_a_post_removes_its_comments() {
        let (db, author) = db_with_author();
        let post = db.create_post(&new_post("doomed", author)).unwrap();
        db.create_comment(post, author, "October 18, 2026, 09:05PM", "first").unwrap();
        db.create_comment(post, author, "October 18, 2026, 09:06PM", "second").unwrap();

        let comments = db.comments_for_post(post).unwrap();
        assert_eq!(comments.iter().map(|c| c.text.as_str()).collect::<Vec<_>>(), ["first", "second"]);

        assert!(db.delete_post(post).unwrap());
        assert!(db.get_post(post).unwrap().is_none());
        assert!(db.comments_for_post(post).unwrap().is_empty());
        assert!(!db.delete_post(post).unwrap());
    }
}
