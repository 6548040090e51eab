//! SQLite database module

pub mod models;
mod blogs;
mod migrations;
mod snapshots;

pub use blogs::image_url;

use crate::error::Result;
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteDb {
    /// Open (or create) the database file and bring the schema up to date
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        tracing::info!("Opened SQLite database at {:?}", path);
        Self::init(conn, path.to_path_buf())
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, PathBuf::from(":memory:"))
    }

    fn init(conn: Connection, path: PathBuf) -> Result<Self> {
        // Image rows are removed with their blog through ON DELETE CASCADE
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        let db = Self {
            conn: Mutex::new(conn),
            path,
        };
        db.run_migrations()?;

        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========== Snapshot Methods ==========

    pub fn save_snapshot(
        &self,
        name: &str,
        payload: &SnapshotPayload,
        metadata: &SnapshotMetadata,
        symbols: &[SymbolRecord],
    ) -> Result<i64> {
        let mut conn = self.conn.lock();
        snapshots::save_snapshot(&mut conn, name, payload, metadata, symbols)
    }

    pub fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock();
        snapshots::latest_snapshot(&conn)
    }

    pub fn get_snapshot(&self, id: i64) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock();
        snapshots::get_snapshot(&conn, id)
    }

    pub fn list_snapshots(&self, limit: usize) -> Result<Vec<SnapshotSummary>> {
        let conn = self.conn.lock();
        snapshots::list_snapshots(&conn, limit)
    }

    pub fn table_counts(&self) -> Result<TableCounts> {
        let conn = self.conn.lock();
        snapshots::table_counts(&conn)
    }

    /// Delete all snapshots, symbols and history
    pub fn clear_watchlist(&self) -> Result<()> {
        let conn = self.conn.lock();
        snapshots::clear_watchlist(&conn)
    }

    // ========== Blog Methods ==========

    pub fn create_blog(&self, title: &str, content: &str, images: &[InlineImage]) -> Result<i64> {
        let mut conn = self.conn.lock();
        blogs::create_blog(&mut conn, title, content, images)
    }

    pub fn update_blog(
        &self,
        id: i64,
        title: &str,
        content: &str,
        images: &[InlineImage],
    ) -> Result<bool> {
        let mut conn = self.conn.lock();
        blogs::update_blog(&mut conn, id, title, content, images)
    }

    pub fn list_blogs(&self) -> Result<Vec<BlogSummary>> {
        let conn = self.conn.lock();
        blogs::list_blogs(&conn)
    }

    pub fn get_blog(&self, id: i64) -> Result<Option<Blog>> {
        let conn = self.conn.lock();
        blogs::get_blog(&conn, id)
    }

    pub fn delete_blog(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        blogs::delete_blog(&conn, id)
    }

    pub fn get_image(&self, id: i64) -> Result<Option<StoredImage>> {
        let conn = self.conn.lock();
        blogs::get_image(&conn, id)
    }
}
