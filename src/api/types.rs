//! REST API wire types
//!
//! Shared by the axum handlers and the reqwest client so both ends agree
//! on field names. The browser pages read these shapes directly, which is
//! why a few fields keep their camelCase names.

use crate::db::sqlite::models::{
    Blog, BlogSummary, SnapshotMetadata, SnapshotSummary, TableCounts,
};
use crate::watchlist::row::Row;
use serde::{Deserialize, Serialize};

/// POST /api/save-watchlist body, as sent by the client
#[derive(Debug, Serialize)]
pub struct SaveWatchlistRequest<'a> {
    pub data: &'a [Row],
}

/// POST /api/save-watchlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveWatchlistResponse {
    pub success: bool,
    pub message: String,
    pub snapshot_id: String,
    pub metadata: SnapshotMetadata,
    #[serde(rename = "dbPath")]
    pub db_path: String,
}

/// GET /api/load-watchlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadWatchlistResponse {
    pub success: bool,
    pub data: Vec<Row>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/db-info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbInfoResponse {
    pub success: bool,
    #[serde(rename = "dbPath")]
    pub db_path: String,
    pub tables: TableCounts,
}

/// GET /api/snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotListResponse {
    pub success: bool,
    pub snapshots: Vec<SnapshotSummary>,
    pub count: usize,
}

/// GET /api/snapshot/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub success: bool,
    pub snapshot_id: i64,
    pub data: Vec<Row>,
    pub metadata: SnapshotMetadata,
    pub created_at: String,
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// POST /api/blogs and PUT /api/blogs/:id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSavedResponse {
    pub success: bool,
    pub blog_id: i64,
}

/// GET /api/blogs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogListResponse {
    pub success: bool,
    pub blogs: Vec<BlogSummary>,
}

/// GET /api/blogs/:id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogResponse {
    pub success: bool,
    pub blog: Blog,
}

/// Failure body; only `error` is read by clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
