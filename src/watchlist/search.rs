//! Search and filter engine
//!
//! A search combines a wildcard query with three dropdown filters. The
//! query is matched against every column of a row; `*` is the only
//! wildcard and the whole cell must match.

use crate::error::{AppError, Result};
use crate::watchlist::row::{Call, Row, Timeframe};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer};

/// Compiled wildcard query
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    /// `None` when the query is blank and everything matches
    regex: Option<Regex>,
}

impl WildcardPattern {
    /// Compile a query such as `AA*` into `^AA.*$`, case-insensitive.
    ///
    /// Every other character is matched literally.
    pub fn compile(query: &str) -> Result<Self> {
        if query.trim().is_empty() {
            return Ok(Self { regex: None });
        }

        let body = query
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = RegexBuilder::new(&format!("^{}$", body))
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::Parse(format!("Invalid search pattern: {}", e)))?;

        Ok(Self { regex: Some(regex) })
    }

    pub fn matches_everything(&self) -> bool {
        self.regex.is_none()
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => true,
        }
    }
}

/// Dropdown value; the "All" option sends an empty string
fn dropdown_call<'de, D>(deserializer: D) -> std::result::Result<Option<Call>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;

    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Call::parse(value).map(Some).ok_or_else(|| {
            serde::de::Error::unknown_variant(value, &["buy", "sell", "neutral"])
        }),
    }
}

/// Search box text plus the three dropdown filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default, deserialize_with = "dropdown_call")]
    pub daily: Option<Call>,
    #[serde(default, deserialize_with = "dropdown_call")]
    pub weekly: Option<Call>,
    #[serde(default, deserialize_with = "dropdown_call")]
    pub monthly: Option<Call>,
}

impl WatchlistFilter {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_call(mut self, timeframe: Timeframe, call: Call) -> Self {
        match timeframe {
            Timeframe::Daily => self.daily = Some(call),
            Timeframe::Weekly => self.weekly = Some(call),
            Timeframe::Monthly => self.monthly = Some(call),
        }
        self
    }

    pub fn call(&self, timeframe: Timeframe) -> Option<Call> {
        match timeframe {
            Timeframe::Daily => self.daily,
            Timeframe::Weekly => self.weekly,
            Timeframe::Monthly => self.monthly,
        }
    }

    /// No query and no dropdown selected
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.daily.is_none()
            && self.weekly.is_none()
            && self.monthly.is_none()
    }

    fn matches(&self, row: &Row, headers: &[String], pattern: &WildcardPattern) -> bool {
        let matches_query = pattern.matches_everything()
            || headers
                .iter()
                .any(|h| row.get(h).is_some_and(|v| pattern.is_match(v.as_text())));

        matches_query
            && Timeframe::ALL.iter().all(|tf| match self.call(*tf) {
                Some(call) => row.selection(*tf).to_lowercase() == call.as_str(),
                None => true,
            })
    }
}

/// Rows selected by a filter
#[derive(Debug, Clone)]
pub struct FilterResult<'a> {
    /// Column set taken from the first row of the collection
    pub headers: Vec<String>,
    pub rows: Vec<&'a Row>,
    /// `false` when the filter was empty and the collection passed through
    pub filtered: bool,
}

/// Apply a filter to the collection.
///
/// An empty filter short-circuits and hands back the whole collection in
/// its stored order without compiling anything.
pub fn filter_rows<'a>(rows: &'a [Row], filter: &WatchlistFilter) -> Result<FilterResult<'a>> {
    let headers: Vec<String> = rows
        .first()
        .map(|row| row.keys().map(str::to_string).collect())
        .unwrap_or_default();

    if filter.is_empty() {
        return Ok(FilterResult {
            headers,
            rows: rows.iter().collect(),
            filtered: false,
        });
    }

    let pattern = WildcardPattern::compile(&filter.query)?;

    let matched = rows
        .iter()
        .filter(|row| filter.matches(row, &headers, &pattern))
        .collect();

    Ok(FilterResult {
        headers,
        rows: matched,
        filtered: true,
    })
}

/// Autocomplete: distinct symbols containing the term, sorted
pub fn suggest_symbols(rows: &[Row], term: &str) -> Vec<String> {
    if term.trim().is_empty() {
        return Vec::new();
    }

    let needle = term.to_uppercase();
    let mut matches: Vec<String> = Vec::new();

    for row in rows {
        let symbol = row.symbol();
        if symbol.to_uppercase().contains(&needle) && !matches.iter().any(|m| m == symbol) {
            matches.push(symbol.to_string());
        }
    }

    matches.sort();
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::row::SYMBOL;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn sample() -> Vec<Row> {
        vec![
            row(&[(SYMBOL, "AAPL"), ("Daily", "Buy"), ("Weekly", "sell"), ("Comment", "")]),
            row(&[(SYMBOL, "AAA"), ("Daily", "sell"), ("Weekly", "sell"), ("Comment", "")]),
            row(&[(SYMBOL, "BAAA"), ("Daily", "buy"), ("Weekly", ""), ("Comment", "a.b")]),
        ]
    }

    fn symbols(result: &FilterResult<'_>) -> Vec<String> {
        result.rows.iter().map(|r| r.symbol().to_string()).collect()
    }

    #[test]
    fn test_wildcard_anchored() {
        let pattern = WildcardPattern::compile("AA*").unwrap();
        assert!(pattern.is_match("AAPL"));
        assert!(pattern.is_match("aaa"));
        assert!(!pattern.is_match("BAAA"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let pattern = WildcardPattern::compile("a.b").unwrap();
        assert!(pattern.is_match("A.B"));
        assert!(!pattern.is_match("axb"));

        let pattern = WildcardPattern::compile("(x)+*").unwrap();
        assert!(pattern.is_match("(x)+ anything"));
    }

    #[test]
    fn test_blank_query_matches_everything() {
        let pattern = WildcardPattern::compile("   ").unwrap();
        assert!(pattern.matches_everything());
        assert!(pattern.is_match(""));
    }

    #[test]
    fn test_query_filters_rows() {
        let rows = sample();
        let result = filter_rows(&rows, &WatchlistFilter::new("AA*")).unwrap();

        assert!(result.filtered);
        assert_eq!(symbols(&result), ["AAPL", "AAA"]);
    }

    #[test]
    fn test_query_matches_any_column() {
        let rows = sample();
        let result = filter_rows(&rows, &WatchlistFilter::new("A.B")).unwrap();
        assert_eq!(symbols(&result), ["BAAA"]);
    }

    #[test]
    fn test_dropdown_filters_compare_lowercased() {
        let rows = sample();

        let filter = WatchlistFilter::default().with_call(Timeframe::Daily, Call::Buy);
        let result = filter_rows(&rows, &filter).unwrap();
        assert_eq!(symbols(&result), ["AAPL", "BAAA"]);

        let filter = WatchlistFilter::new("*A*")
            .with_call(Timeframe::Daily, Call::Buy)
            .with_call(Timeframe::Weekly, Call::Sell);
        let result = filter_rows(&rows, &filter).unwrap();
        assert_eq!(symbols(&result), ["AAPL"]);
    }

    #[test]
    fn test_empty_filter_short_circuits() {
        let rows = sample();
        let result = filter_rows(&rows, &WatchlistFilter::new("  ")).unwrap();

        assert!(!result.filtered);
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.headers, ["Symbol", "Daily", "Weekly", "Comment"]);
    }

    #[test]
    fn test_filter_on_empty_collection() {
        let result = filter_rows(&[], &WatchlistFilter::new("SPY")).unwrap();
        assert!(result.rows.is_empty());
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_suggestions() {
        let mut rows = sample();
        rows.push(row(&[(SYMBOL, "AAA")]));

        assert_eq!(suggest_symbols(&rows, "aa"), ["AAA", "AAPL", "BAAA"]);
        assert_eq!(suggest_symbols(&rows, "pl"), ["AAPL"]);
        assert!(suggest_symbols(&rows, " ").is_empty());
    }

    #[test]
    fn test_filter_deserializes_from_query_payload() {
        let filter: WatchlistFilter =
            serde_json::from_str(r#"{"query":"X*","daily":"neutral"}"#).unwrap();
        assert_eq!(filter.daily, Some(Call::Neutral));
        assert!(filter.weekly.is_none());
    }

    #[test]
    fn test_all_dropdown_option_is_no_filter() {
        let filter: WatchlistFilter = serde_json::from_str(
            r#"{"query":"AA*","daily":"","weekly":" ","monthly":null}"#,
        )
        .unwrap();
        assert!(filter.daily.is_none());
        assert!(filter.weekly.is_none());
        assert!(filter.monthly.is_none());

        let rows = sample();
        let result = filter_rows(&rows, &filter).unwrap();
        assert_eq!(symbols(&result), ["AAPL", "AAA"]);

        let blank: WatchlistFilter =
            serde_json::from_str(r#"{"query":"","daily":"","weekly":"","monthly":""}"#).unwrap();
        assert!(blank.is_empty());

        let filter: WatchlistFilter = serde_json::from_str(r#"{"weekly":"Sell"}"#).unwrap();
        assert_eq!(filter.weekly, Some(Call::Sell));

        assert!(serde_json::from_str::<WatchlistFilter>(r#"{"daily":"hold"}"#).is_err());
    }
}
