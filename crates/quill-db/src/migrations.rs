use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            name        TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS posts (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL UNIQUE,
            subtitle    TEXT NOT NULL,
            date        TEXT NOT NULL,
            body        TEXT NOT NULL,
            img_url     TEXT NOT NULL,
            author_id   INTEGER NOT NULL REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author_id);

        -- Comments go away with their post.
        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            date        TEXT NOT NULL,
            text        TEXT NOT NULL,
            author_id   INTEGER NOT NULL REFERENCES users(id),
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
