//! SQLite database models

use crate::watchlist::row::Row;
use serde::{Deserialize, Serialize};

/// Counts stored with every snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub record_count: usize,
    pub index_etfs: usize,
    pub sector_etfs: usize,
    pub completed_symbols: usize,
    pub skipped_symbols: usize,
}

/// JSON stored in `watchlist_snapshots.snapshot_data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub total_symbols: usize,
    pub timestamp: String,
    pub data: Vec<Row>,
}

/// Full snapshot row
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub id: i64,
    pub name: String,
    pub payload: SnapshotPayload,
    pub metadata: SnapshotMetadata,
    pub created_at: String,
}

/// Snapshot listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: i64,
    pub name: String,
    pub metadata: SnapshotMetadata,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStatus {
    pub completed: bool,
    pub skipped: bool,
}

/// JSON stored in `symbols.symbol_data`, latest state per symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub symbol: String,
    pub daily: String,
    pub weekly: String,
    pub monthly: String,
    pub comment: String,
    pub skip: bool,
    pub status: SymbolStatus,
}

/// Row counts per watchlist table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub snapshots: i64,
    pub symbols: i64,
    pub history: i64,
}

/// Blog post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

/// Blog listing entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSummary {
    pub id: i64,
    pub title: String,
    pub created_at: String,
}

/// Image pulled out of blog HTML, not yet stored
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
    /// The `data:` URL as it appears in the HTML
    pub data_url: String,
}

/// Stored image blob
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}
