//! Runtime configuration
//!
//! Server settings come from `WATCHLIST_*` environment variables, with an
//! optional `.env` file in the working directory.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_FILE: &str = "watchlist.db";
const DEFAULT_BODY_LIMIT_MB: usize = 50;

/// REST/static server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Directory holding the browser pages
    pub static_dir: PathBuf,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            static_dir: PathBuf::from("."),
            body_limit_bytes: DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from `.env` and the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("WATCHLIST_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("WATCHLIST_PORT") {
            config.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid WATCHLIST_PORT {}: {}", port, e)))?;
        }
        if let Some(path) = lookup("WATCHLIST_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("WATCHLIST_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("WATCHLIST_BODY_LIMIT_MB") {
            let mb: usize = limit.parse().map_err(|e| {
                AppError::Config(format!("Invalid WATCHLIST_BODY_LIMIT_MB {}: {}", limit, e))
            })?;
            config.body_limit_bytes = mb * 1024 * 1024;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}:{}: {}", self.host, self.port, e)))
    }
}

/// Remote store client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{}/api", DEFAULT_PORT),
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("watchlist.db"));
        assert_eq!(config.body_limit_bytes, 50 * 1024 * 1024);
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("WATCHLIST_HOST", "0.0.0.0"),
            ("WATCHLIST_PORT", "8080"),
            ("WATCHLIST_DB_PATH", "/tmp/w.db"),
            ("WATCHLIST_BODY_LIMIT_MB", "5"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/w.db"));
        assert_eq!(config.body_limit_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_port() {
        let result = ServerConfig::from_lookup(lookup(&[("WATCHLIST_PORT", "eighty")]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
