//! Watchlist session
//!
//! Owns the working collection and drives every state change: imports,
//! edits, clears and remote round-trips. Each change is written through to
//! the local cache right away. UI adapters render from `display_rows` and
//! feed user actions back in as [`Edit`]s.

use crate::api::types::SaveWatchlistResponse;
use crate::error::{AppError, Result};
use crate::watchlist::cache::{CacheStore, WatchlistCache};
use crate::watchlist::category::sort_by_category;
use crate::watchlist::csv_ingest::parse_csv;
use crate::watchlist::editor::RichTextEditor;
use crate::watchlist::remote::RemoteStore;
use crate::watchlist::row::{
    Call, FieldValue, Row, Timeframe, TrendDirection, TrendGroup, COMMENT, SKIP,
};
use crate::watchlist::search::{filter_rows, suggest_symbols, FilterResult, WatchlistFilter};
use crate::watchlist::validation::ValidationReport;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, info, warn};

/// A single user change to one row
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Dropdown selection; `None` clears it
    Select(Timeframe, Option<Call>),
    Trend {
        timeframe: Timeframe,
        group: TrendGroup,
        direction: TrendDirection,
        checked: bool,
    },
    Notes(Timeframe, String),
    Comment(String),
    Skip(bool),
}

impl Edit {
    fn apply(self, row: &mut Row) {
        match self {
            Edit::Select(timeframe, call) => {
                let value = call.map(|c| c.as_str()).unwrap_or_default();
                row.set(timeframe.selection_field(), value);
            }
            Edit::Trend {
                timeframe,
                group,
                direction,
                checked,
            } => row.set(timeframe.trend_field(group, direction), checked),
            Edit::Notes(timeframe, html) => row.set(timeframe.notes_field(), html),
            Edit::Comment(text) => row.set(COMMENT, text),
            Edit::Skip(skip) => row.set(SKIP, if skip { "true" } else { "false" }),
        }
    }
}

/// Edit produced outside the session, e.g. by an editor change handler
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub symbol: String,
    pub edit: Edit,
}

/// Route an editor's user edits to a row's notes field.
///
/// Edits queue on the returned receiver until
/// [`WatchlistSession::apply_pending`] runs.
pub fn bind_notes<E: RichTextEditor>(
    editor: &mut E,
    symbol: &str,
    timeframe: Timeframe,
) -> Receiver<PendingEdit> {
    let (tx, rx) = mpsc::channel();
    let symbol = symbol.to_string();

    editor.on_change(Box::new(move |html| {
        let _ = tx.send(PendingEdit {
            symbol: symbol.clone(),
            edit: Edit::Notes(timeframe, html.to_string()),
        });
    }));

    rx
}

/// The working collection plus its cache
pub struct WatchlistSession<S: CacheStore> {
    headers: Vec<String>,
    rows: Vec<Row>,
    cache: WatchlistCache<S>,
}

impl<S: CacheStore> WatchlistSession<S> {
    /// Empty session over a cache, without reading it
    pub fn new(store: S) -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            cache: WatchlistCache::new(store),
        }
    }

    /// Restore from the cache, falling back to a default CSV file.
    ///
    /// A corrupt cache or an unreadable CSV file leaves the session empty.
    pub fn open(store: S, default_csv: Option<&Path>) -> Result<Self> {
        let mut session = Self::new(store);

        match session.cache.load() {
            Ok(Some(cached)) => {
                info!("Restored {} rows from cache", cached.data.len());
                session.headers = cached.headers;
                session.rows = cached.data;
                return Ok(session);
            }
            Ok(None) => debug!("No cached watchlist"),
            Err(e) => warn!("Ignoring unreadable cache: {}", e),
        }

        if let Some(path) = default_csv {
            match std::fs::read_to_string(path) {
                Ok(text) => session.import_csv(&text)?,
                Err(e) => warn!("Could not read default CSV {:?}: {}", path, e),
            }
        }

        Ok(session)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Rows in stored order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cache(&self) -> &WatchlistCache<S> {
        &self.cache
    }

    /// Write through to the cache. Failures are logged, not returned.
    fn persist(&self) {
        if let Err(e) = self.cache.save(&self.headers, &self.rows) {
            warn!("Failed to write watchlist cache: {}", e);
        }
    }

    /// Replace the collection with a parsed CSV file
    pub fn import_csv(&mut self, text: &str) -> Result<()> {
        let parsed = parse_csv(text)?;
        info!("Imported {} rows from CSV", parsed.data.len());

        self.headers = parsed.headers;
        self.rows = parsed.data;
        self.persist();
        Ok(())
    }

    /// Replace the collection with rows from the server
    pub fn apply_remote(&mut self, rows: Vec<Row>) {
        self.headers = rows
            .first()
            .map(|row| row.keys().map(str::to_string).collect())
            .unwrap_or_default();
        self.rows = rows;
        self.persist();
    }

    /// Apply an edit to the first row with this symbol
    pub fn edit(&mut self, symbol: &str, edit: Edit) -> Result<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.symbol() == symbol)
            .ok_or_else(|| AppError::NotFound(format!("Symbol {} not found", symbol)))?;

        debug!("Edit {}: {:?}", symbol, edit);
        edit.apply(row);
        self.persist();
        Ok(())
    }

    fn default_skips(&mut self) {
        for row in self.rows.iter_mut() {
            row.ensure_skip_default();
        }
    }

    /// Rows ready for the table: Skip defaulted, category order
    pub fn display_rows(&mut self) -> Vec<Row> {
        self.default_skips();
        sort_by_category(&self.rows)
    }

    /// Search results ready for the table, prepared like `display_rows`
    pub fn filter(&mut self, filter: &WatchlistFilter) -> Result<FilterResult<'_>> {
        self.default_skips();

        let mut result = filter_rows(&self.rows, filter)?;
        result.rows = sort_by_category(&result.rows);
        debug!("Filter matched {} rows", result.rows.len());
        Ok(result)
    }

    pub fn suggest(&self, term: &str) -> Vec<String> {
        suggest_symbols(&self.rows, term)
    }

    pub fn validate(&self) -> ValidationReport {
        ValidationReport::for_rows(&self.rows)
    }

    /// Drop the collection and both cache slots
    pub fn clear(&mut self) -> Result<()> {
        self.headers.clear();
        self.rows.clear();
        self.cache.clear()?;
        info!("Cleared watchlist");
        Ok(())
    }

    /// Save the collection remotely.
    ///
    /// With defects present, `confirm` decides whether to save anyway.
    pub async fn save_remote<R, F>(&self, store: &R, confirm: F) -> Result<SaveWatchlistResponse>
    where
        R: RemoteStore + ?Sized,
        F: FnOnce(&ValidationReport) -> bool,
    {
        if self.rows.is_empty() {
            return Err(AppError::Validation("No data to save".to_string()));
        }

        let report = self.validate();
        if !report.is_clean() && !confirm(&report) {
            return Err(AppError::Validation(format!(
                "Save cancelled: {}",
                report.summary()
            )));
        }

        let response = store.save(&self.rows).await?;
        info!("{}", response.message);
        Ok(response)
    }

    /// Replace the collection with the latest remote snapshot.
    ///
    /// An empty result is an error and leaves the collection untouched.
    pub async fn load_remote<R>(&mut self, store: &R) -> Result<usize>
    where
        R: RemoteStore + ?Sized,
    {
        let rows = store.load().await?;
        if rows.is_empty() {
            return Err(AppError::NotFound("No data found in database".to_string()));
        }

        let count = rows.len();
        self.apply_remote(rows);
        info!("Loaded {} records from database", count);
        Ok(count)
    }

    /// Show a row's notes in an editor
    pub fn load_notes_into<E: RichTextEditor>(
        &self,
        editor: &mut E,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<()> {
        let row = self
            .rows
            .iter()
            .find(|row| row.symbol() == symbol)
            .ok_or_else(|| AppError::NotFound(format!("Symbol {} not found", symbol)))?;

        editor.set_content(row.notes(timeframe));
        Ok(())
    }

    /// Copy an editor's content into a row's notes
    pub fn store_notes_from<E: RichTextEditor>(
        &mut self,
        editor: &E,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<()> {
        self.edit(symbol, Edit::Notes(timeframe, editor.content()))
    }

    /// Apply every queued edit, returning how many were applied
    pub fn apply_pending(&mut self, pending: &Receiver<PendingEdit>) -> Result<usize> {
        let mut applied = 0;
        for PendingEdit { symbol, edit } in pending.try_iter() {
            self.edit(&symbol, edit)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Cell value lookup used by adapters
    pub fn value(&self, symbol: &str, field: &str) -> Option<&FieldValue> {
        self.rows
            .iter()
            .find(|row| row.symbol() == symbol)
            .and_then(|row| row.get(field))
    }
}
