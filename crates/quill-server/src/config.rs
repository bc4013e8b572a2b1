use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::RngCore;

const DEFAULT_DATABASE_URL: &str = "sqlite://blog.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5003;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// None when SECRET_KEY is unset; a per-process key is generated then.
    pub secret_key: Option<String>,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let port = match var("PORT") {
            Some(raw) => raw.parse().with_context(|| format!("PORT is not a port number: {raw}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            db_path: sqlite_path(&database_url),
            host: var("QUILL_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            debug: var("DEBUG").is_some_and(|v| !v.is_empty()),
            secret_key: var("SECRET_KEY").filter(|v| !v.is_empty()),
            secure_cookies: var("QUILL_SECURE_COOKIES")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
        })
    }

    /// The configured secret, or a random one that lives as long as the process.
    pub fn session_secret(&self) -> String {
        self.secret_key.clone().unwrap_or_else(|| {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            hex::encode(bytes)
        })
    }

    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "quill=debug,quill_api=debug,quill_db=debug,tower_http=debug"
        } else {
            "quill=info,quill_api=info,quill_db=info,tower_http=info"
        }
    }
}

/// Accepts `sqlite://path`, `sqlite:path` or a bare path.
fn sqlite_path(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}
