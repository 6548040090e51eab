//! Watchlist model and client-side synchronization
//!
//! Rows are ingested from CSV, the local cache or the REST backend, sorted
//! by category for display, validated before saving and filtered for
//! search. [`session::WatchlistSession`] ties the pieces together.

pub mod cache;
pub mod category;
pub mod csv_ingest;
pub mod editor;
pub mod remote;
pub mod row;
pub mod search;
pub mod session;
pub mod summary;
pub mod validation;

pub use cache::{CacheStore, FileCacheStore, MemoryCacheStore, WatchlistCache};
pub use remote::{HttpRemoteStore, RemoteStore};
pub use row::{Call, FieldValue, Row, Timeframe, TrendDirection, TrendGroup};
pub use session::{bind_notes, Edit, PendingEdit, WatchlistSession};
pub use validation::{Defect, DefectKind, ValidationReport};
