use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::User;

/// The signed-in session, kept on disk between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: User,
    pub created_at: String,
}

pub struct SessionStore {
    conn: Connection,
    path: PathBuf,
}

impl SessionStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open session store: {}", path.display()))?;
        let store = Self {
            conn,
            path: path.to_path_buf(),
        };
        store.init()?;
        Ok(store)
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrail") {
            proj_dirs.data_dir().join("jobtrail.db")
        } else {
            PathBuf::from("jobtrail.db")
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                session_token TEXT,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                picture TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS callbacks (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                session_id TEXT NOT NULL,
                processed_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// Replaces any previous session.
    pub fn save(&self, token: Option<&str>, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions (id, session_token, user_id, name, email, picture, created_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, datetime('now'))",
            params![token, user.user_id, user.name, user.email, user.picture],
        )?;
        info!(user_id = %user.user_id, "session saved");
        Ok(())
    }

    pub fn current(&self) -> Result<Option<StoredSession>> {
        let result = self.conn.query_row(
            "SELECT session_token, user_id, name, email, picture, created_at FROM sessions WHERE id = 1",
            [],
            |row| {
                Ok(StoredSession {
                    token: row.get(0)?,
                    user: User {
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        email: row.get(3)?,
                        picture: row.get(4)?,
                    },
                    created_at: row.get(5)?,
                })
            },
        );
        match result {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.current()?.and_then(|s| s.token))
    }

    /// Provider session id handled by the most recent callback.
    pub fn last_callback(&self) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row("SELECT session_id FROM callbacks WHERE id = 1", [], |row| row.get(0));
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn record_callback(&self, session_id: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO callbacks (id, session_id, processed_at) VALUES (1, ?1, datetime('now'))",
            params![session_id],
        )?;
        Ok(())
    }

    /// Signing out keeps the callback record; provider session ids are single use.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM sessions", [])?;
        info!("session cleared");
        Ok(())
    }
}
