use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `SMARTCYCLE_JWT_SECRET` (required)
    pub jwt_secret: String,
    /// Env: `SMARTCYCLE_DB_PATH`, default `smartcycle.db`
    pub db_path: PathBuf,
    /// Env: `SMARTCYCLE_HOST` / `SMARTCYCLE_PORT`, default `0.0.0.0:3000`
    pub addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("SMARTCYCLE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SMARTCYCLE_JWT_SECRET is unset or still a placeholder");
        }

        let db_path = lookup("SMARTCYCLE_DB_PATH").unwrap_or_else(|| "smartcycle.db".into());
        let host = lookup("SMARTCYCLE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("SMARTCYCLE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("SMARTCYCLE_PORT must be a port number")?;

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            db_path: db_path.into(),
            addr,
        })
    }
}
