use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::session::SessionStore;

/// Client configuration from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub auth_url: String,
    pub redirect_url: String,
    pub timeout: Duration,
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("JOBTRAIL_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("JOBTRAIL_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))?,
            None => 30,
        };

        Ok(Config {
            api_url: lookup("JOBTRAIL_API_URL").unwrap_or_else(|| "http://localhost:8001".to_string()),
            auth_url: lookup("JOBTRAIL_AUTH_URL").unwrap_or_else(|| "https://auth.emergentagent.com".to_string()),
            redirect_url: lookup("JOBTRAIL_REDIRECT_URL")
                .unwrap_or_else(|| "http://localhost:3000/dashboard".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            db_path: lookup("JOBTRAIL_DB")
                .map(PathBuf::from)
                .unwrap_or_else(SessionStore::default_path),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}
