//! Application state management

use crate::config::ServerConfig;
use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use std::sync::Arc;

/// State shared by every request handler
pub struct AppState {
    /// SQLite database connection
    pub sqlite: Arc<SqliteDb>,

    pub config: ServerConfig,
}

impl AppState {
    /// Open the configured database file
    pub fn new(config: ServerConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let sqlite = SqliteDb::new(&config.db_path)?;
        Ok(Self::with_database(sqlite, config))
    }

    pub fn with_database(sqlite: SqliteDb, config: ServerConfig) -> Self {
        Self {
            sqlite: Arc::new(sqlite),
            config,
        }
    }

    /// Database path as reported to clients
    pub fn db_path(&self) -> String {
        self.sqlite.path().display().to_string()
    }
}
