//! Local cache
//!
//! The browser kept the watchlist in two localStorage slots. Here the
//! slots live behind [`CacheStore`]; the file-backed store keeps one JSON
//! file per key under a cache directory.

use crate::error::{AppError, Result};
use crate::watchlist::csv_ingest::ParsedWatchlist;
use crate::watchlist::row::Row;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const DATA_KEY: &str = "watchlistData";
pub const HEADERS_KEY: &str = "watchlistHeaders";

/// String key-value slots
pub trait CacheStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// One file per key
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| AppError::Config(format!("Failed to create cache dir: {}", e)))?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, for tests and embedding
#[derive(Default)]
pub struct MemoryCacheStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.lock().remove(key);
        Ok(())
    }
}

/// Whole-collection cache over two slots
pub struct WatchlistCache<S: CacheStore> {
    store: S,
}

impl<S: CacheStore> WatchlistCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Overwrite both slots
    pub fn save(&self, headers: &[String], rows: &[Row]) -> Result<()> {
        self.store.set(DATA_KEY, &serde_json::to_string(rows)?)?;
        self.store.set(HEADERS_KEY, &serde_json::to_string(headers)?)?;
        Ok(())
    }

    /// Both slots must be present for a hit
    pub fn load(&self) -> Result<Option<ParsedWatchlist>> {
        let data = self.store.get(DATA_KEY)?;
        let headers = self.store.get(HEADERS_KEY)?;

        let (Some(data), Some(headers)) = (data, headers) else {
            return Ok(None);
        };

        let headers: Vec<String> = serde_json::from_str(&headers)
            .map_err(|e| AppError::Parse(format!("Cached headers are corrupt: {}", e)))?;
        let data: Vec<Row> = serde_json::from_str(&data)
            .map_err(|e| AppError::Parse(format!("Cached watchlist is corrupt: {}", e)))?;

        Ok(Some(ParsedWatchlist { headers, data }))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(DATA_KEY)?;
        self.store.remove(HEADERS_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::row::SYMBOL;
    use tempfile::tempdir;

    fn sample() -> (Vec<String>, Vec<Row>) {
        let headers = vec!["Symbol".to_string(), "Comment".to_string()];
        let mut row = Row::from_iter([(SYMBOL, "SPY"), ("Comment", "gap fill")]);
        row.set("MacroTrendBull", true);
        (headers, vec![row])
    }

    #[test]
    fn test_save_then_load() {
        let cache = WatchlistCache::new(MemoryCacheStore::new());
        let (headers, rows) = sample();

        assert!(cache.load().unwrap().is_none());
        cache.save(&headers, &rows).unwrap();

        let loaded = cache.load().unwrap().unwrap();
        assert_eq!(loaded.headers, headers);
        assert_eq!(loaded.data, rows);
    }

    #[test]
    fn test_one_slot_is_a_miss() {
        let store = MemoryCacheStore::new();
        store.set(DATA_KEY, "[]").unwrap();
        let cache = WatchlistCache::new(store);
        assert!(cache.load().unwrap().is_none());

        let store = MemoryCacheStore::new();
        store.set(HEADERS_KEY, "[\"Symbol\"]").unwrap();
        let cache = WatchlistCache::new(store);
        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_slot_is_parse_error() {
        let store = MemoryCacheStore::new();
        store.set(DATA_KEY, "{not json").unwrap();
        store.set(HEADERS_KEY, "[]").unwrap();

        let cache = WatchlistCache::new(store);
        assert!(matches!(cache.load(), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let temp_dir = tempdir().unwrap();
        let cache_dir = temp_dir.path().join("cache");
        let cache = WatchlistCache::new(FileCacheStore::new(cache_dir.clone()));
        let (headers, rows) = sample();

        cache.save(&headers, &rows).unwrap();
        assert!(cache_dir.join("watchlistData.json").exists());
        assert!(cache_dir.join("watchlistHeaders.json").exists());
        assert_eq!(cache.load().unwrap().unwrap().data, rows);

        cache.clear().unwrap();
        assert!(cache.load().unwrap().is_none());
        // Clearing twice is fine
        cache.clear().unwrap();
    }
}
