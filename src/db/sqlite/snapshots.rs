//! Watchlist snapshots, per-symbol state and the save history

use crate::db::sqlite::models::{
    Snapshot, SnapshotMetadata, SnapshotPayload, SnapshotSummary, SymbolRecord, TableCounts,
};
use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension};

const SNAPSHOT_NOTE: &str = "Auto-saved watchlist";
const SAVE_ACTION: &str = "SAVE_WATCHLIST";

/// Raw snapshot columns before JSON decoding
type SnapshotColumns = (i64, Option<String>, String, Option<String>, String);

/// Store a snapshot in one transaction.
///
/// Symbols are upserted first, then the snapshot and a history entry are
/// written. Any failure rolls the whole save back.
pub fn save_snapshot(
    conn: &mut Connection,
    name: &str,
    payload: &SnapshotPayload,
    metadata: &SnapshotMetadata,
    symbols: &[SymbolRecord],
) -> Result<i64> {
    let tx = conn.transaction()?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO symbols (symbol, symbol_data, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(symbol) DO UPDATE SET
                symbol_data = excluded.symbol_data,
                updated_at = excluded.updated_at",
        )?;

        for record in symbols {
            stmt.execute(params![record.symbol, serde_json::to_string(record)?])?;
        }
    }

    tx.execute(
        "INSERT INTO watchlist_snapshots (snapshot_name, snapshot_data, metadata, notes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            name,
            serde_json::to_string(payload)?,
            serde_json::to_string(metadata)?,
            SNAPSHOT_NOTE,
        ],
    )?;
    let snapshot_id = tx.last_insert_rowid();

    let change = serde_json::json!({
        "symbols_count": payload.total_symbols,
        "timestamp": payload.timestamp,
    });
    tx.execute(
        "INSERT INTO history (action, change_data) VALUES (?1, ?2)",
        params![SAVE_ACTION, change.to_string()],
    )?;

    tx.commit()?;

    tracing::info!(
        "Stored snapshot {} ({} symbols)",
        snapshot_id,
        payload.total_symbols
    );
    Ok(snapshot_id)
}

fn decode_snapshot(columns: SnapshotColumns) -> Result<Snapshot> {
    let (id, name, data, metadata, created_at) = columns;

    Ok(Snapshot {
        id,
        name: name.unwrap_or_default(),
        payload: serde_json::from_str(&data)?,
        metadata: decode_metadata(metadata.as_deref())?,
        created_at,
    })
}

fn decode_metadata(raw: Option<&str>) -> Result<SnapshotMetadata> {
    match raw {
        Some(raw) => Ok(serde_json::from_str(raw)?),
        None => Ok(SnapshotMetadata::default()),
    }
}

/// Most recent snapshot, if any
pub fn latest_snapshot(conn: &Connection) -> Result<Option<Snapshot>> {
    let columns: Option<SnapshotColumns> = conn
        .query_row(
            "SELECT id, snapshot_name, snapshot_data, metadata, created_at
             FROM watchlist_snapshots ORDER BY id DESC LIMIT 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .optional()?;

    columns.map(decode_snapshot).transpose()
}

/// Snapshot by ID
pub fn get_snapshot(conn: &Connection, id: i64) -> Result<Option<Snapshot>> {
    let columns: Option<SnapshotColumns> = conn
        .query_row(
            "SELECT id, snapshot_name, snapshot_data, metadata, created_at
             FROM watchlist_snapshots WHERE id = ?",
            [id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .optional()?;

    columns.map(decode_snapshot).transpose()
}

/// Newest snapshots first, without their row data
pub fn list_snapshots(conn: &Connection, limit: usize) -> Result<Vec<SnapshotSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, snapshot_name, metadata, created_at
         FROM watchlist_snapshots ORDER BY id DESC LIMIT ?",
    )?;

    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, name, metadata, created_at)| {
            Ok(SnapshotSummary {
                id,
                name: name.unwrap_or_default(),
                metadata: decode_metadata(metadata.as_deref())?,
                created_at,
            })
        })
        .collect()
}

pub fn table_counts(conn: &Connection) -> Result<TableCounts> {
    let count = |table: &str| -> rusqlite::Result<i64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
    };

    Ok(TableCounts {
        snapshots: count("watchlist_snapshots")?,
        symbols: count("symbols")?,
        history: count("history")?,
    })
}

/// Empty the watchlist tables. Blogs are untouched.
pub fn clear_watchlist(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         DELETE FROM watchlist_snapshots;
         DELETE FROM symbols;
         DELETE FROM history;
         COMMIT;",
    )?;

    tracing::info!("Cleared watchlist tables");
    Ok(())
}
