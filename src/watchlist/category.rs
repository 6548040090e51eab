//! Display ordering: index ETFs, then sector ETFs, then everything else

use crate::watchlist::row::Row;
use serde::Serialize;
use std::borrow::Borrow;

pub const INDEX_ETFS: [&str; 4] = ["SPY", "QQQ", "VOO", "TQQQ"];

pub const SECTOR_ETFS: [&str; 10] = [
    "XLF", "XLE", "XLI", "XLU", "XLV", "XLP", "XLY", "XLC", "XLK", "XLRE",
];

/// Symbol category. Variant order is display rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    IndexEtf,
    SectorEtf,
    Other,
}

impl Category {
    /// Classify a symbol, ignoring case
    pub fn of(symbol: &str) -> Category {
        let symbol = symbol.to_uppercase();
        if INDEX_ETFS.contains(&symbol.as_str()) {
            Category::IndexEtf
        } else if SECTOR_ETFS.contains(&symbol.as_str()) {
            Category::SectorEtf
        } else {
            Category::Other
        }
    }

    pub fn rank(&self) -> u8 {
        *self as u8
    }
}

/// Return the rows ordered by category.
///
/// The sort is stable: rows of the same category keep their input order.
/// The input is left untouched. Works on owned rows and on `&Row` views
/// such as a filter result.
pub fn sort_by_category<R: Borrow<Row> + Clone>(rows: &[R]) -> Vec<R> {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|row| Category::of(Borrow::<Row>::borrow(row).symbol()));
    sorted
}
