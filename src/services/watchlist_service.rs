//! Watchlist Service
//!
//! Snapshot save/load and database housekeeping behind the REST API.

use crate::api::types::{
    DbInfoResponse, LoadWatchlistResponse, MessageResponse, SaveWatchlistResponse,
    SnapshotListResponse, SnapshotResponse,
};
use crate::db::sqlite::models::{SnapshotMetadata, SnapshotPayload, SymbolRecord, SymbolStatus};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::watchlist::category::{INDEX_ETFS, SECTOR_ETFS};
use crate::watchlist::row::{FieldValue, Row, Timeframe, COMMENT, SKIP};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::info;

/// How many snapshots the history listing returns
pub const SNAPSHOT_LIST_LIMIT: usize = 20;

const INVALID_DATA: &str = "Invalid data format";

#[derive(Deserialize)]
struct SaveWatchlistBody {
    #[serde(default)]
    data: Option<Vec<Row>>,
}

/// Watchlist service for business logic
pub struct WatchlistService;

impl WatchlistService {
    /// Pull the row array out of a raw save request body.
    ///
    /// Parsed straight into rows so column order survives.
    pub fn parse_save_body(body: &[u8]) -> Result<Vec<Row>> {
        serde_json::from_slice::<SaveWatchlistBody>(body)
            .ok()
            .and_then(|body| body.data)
            .ok_or_else(|| AppError::Validation(INVALID_DATA.to_string()))
    }

    /// Only the literal string `"true"` counts as skipped here, matching
    /// what the browser writes.
    fn is_marked_skipped(row: &Row) -> bool {
        matches!(row.get(SKIP), Some(FieldValue::Text(s)) if s == "true")
    }

    pub fn compute_metadata(rows: &[Row]) -> SnapshotMetadata {
        let mut metadata = SnapshotMetadata {
            record_count: rows.len(),
            ..SnapshotMetadata::default()
        };

        // Exact-case matches only, unlike the display sort
        for row in rows {
            let symbol = row.symbol();
            if INDEX_ETFS.contains(&symbol) {
                metadata.index_etfs += 1;
            } else if SECTOR_ETFS.contains(&symbol) {
                metadata.sector_etfs += 1;
            }
            if row.is_completed() {
                metadata.completed_symbols += 1;
            }
            if Self::is_marked_skipped(row) {
                metadata.skipped_symbols += 1;
            }
        }

        metadata
    }

    pub fn symbol_record(row: &Row) -> SymbolRecord {
        let skipped = Self::is_marked_skipped(row);

        SymbolRecord {
            symbol: row.symbol().to_string(),
            daily: row.selection(Timeframe::Daily).to_string(),
            weekly: row.selection(Timeframe::Weekly).to_string(),
            monthly: row.selection(Timeframe::Monthly).to_string(),
            comment: row.text(COMMENT).to_string(),
            skip: skipped,
            status: SymbolStatus {
                completed: row.is_completed(),
                skipped,
            },
        }
    }

    /// Store the collection as a new snapshot
    pub fn save(state: &AppState, rows: Vec<Row>) -> Result<SaveWatchlistResponse> {
        info!("WatchlistService::save - {} rows", rows.len());

        let now = Utc::now();
        let metadata = Self::compute_metadata(&rows);

        // Rows without a symbol still land in the snapshot but have no
        // per-symbol record to update.
        let records: Vec<SymbolRecord> = rows
            .iter()
            .filter(|row| !row.symbol().is_empty())
            .map(Self::symbol_record)
            .collect();

        let payload = SnapshotPayload {
            total_symbols: rows.len(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            data: rows,
        };
        let name = format!("snapshot_{}", now.timestamp_millis());

        let snapshot_id = state
            .sqlite
            .save_snapshot(&name, &payload, &metadata, &records)?;

        Ok(SaveWatchlistResponse {
            success: true,
            message: format!(
                "Successfully saved {} records to database",
                payload.total_symbols
            ),
            snapshot_id: snapshot_id.to_string(),
            metadata,
            db_path: state.db_path(),
        })
    }

    /// Rows of the latest snapshot
    pub fn load(state: &AppState) -> Result<LoadWatchlistResponse> {
        let response = match state.sqlite.latest_snapshot()? {
            Some(snapshot) => LoadWatchlistResponse {
                success: true,
                count: snapshot.payload.data.len(),
                data: snapshot.payload.data,
                metadata: Some(snapshot.metadata),
                snapshot_created: Some(snapshot.created_at),
                message: None,
            },
            None => LoadWatchlistResponse {
                success: true,
                data: Vec::new(),
                count: 0,
                metadata: None,
                snapshot_created: None,
                message: Some("No snapshots found in database".to_string()),
            },
        };

        info!("WatchlistService::load - {} rows", response.count);
        Ok(response)
    }

    pub fn db_info(state: &AppState) -> Result<DbInfoResponse> {
        Ok(DbInfoResponse {
            success: true,
            db_path: state.db_path(),
            tables: state.sqlite.table_counts()?,
        })
    }

    pub fn list_snapshots(state: &AppState) -> Result<SnapshotListResponse> {
        let snapshots = state.sqlite.list_snapshots(SNAPSHOT_LIST_LIMIT)?;

        Ok(SnapshotListResponse {
            success: true,
            count: snapshots.len(),
            snapshots,
        })
    }

    pub fn get_snapshot(state: &AppState, id: i64) -> Result<SnapshotResponse> {
        let snapshot = state
            .sqlite
            .get_snapshot(id)?
            .ok_or_else(|| AppError::NotFound("Snapshot not found".to_string()))?;

        Ok(SnapshotResponse {
            success: true,
            snapshot_id: snapshot.id,
            data: snapshot.payload.data,
            metadata: snapshot.metadata,
            created_at: snapshot.created_at,
        })
    }

    pub fn clear(state: &AppState) -> Result<MessageResponse> {
        info!("WatchlistService::clear");
        state.sqlite.clear_watchlist()?;
        Ok(MessageResponse::ok("All database tables cleared"))
    }
}
