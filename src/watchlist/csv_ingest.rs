//! CSV ingest
//!
//! Watchlist CSV files are plain comma-separated text: no quoting, no
//! escaping. A `"` is ordinary data and every `,` splits a cell.

use crate::error::{AppError, Result};
use crate::watchlist::row::{Row, COMMENT};
use serde::{Deserialize, Serialize};

/// Header list plus rows, as produced by a CSV file or the local cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedWatchlist {
    pub headers: Vec<String>,
    pub data: Vec<Row>,
}

/// Parse watchlist CSV text.
///
/// The first line is the header. `Comment` is appended when missing so
/// every row can carry a note. Cells are trimmed and matched to headers by
/// position; short lines get `""` for the missing cells and surplus cells
/// are ignored. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Result<ParsedWatchlist> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.trim().as_bytes());

    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record?,
        None => return Err(AppError::Parse("CSV file has no header row".to_string())),
    };

    let mut headers: Vec<String> = header_record.iter().map(str::to_string).collect();
    if !headers.iter().any(|h| h.trim() == COMMENT) {
        headers.push(COMMENT.to_string());
    }

    let mut data = Vec::new();
    for record in records {
        let record = record?;

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.trim(), record.get(i).map(str::trim).unwrap_or("")))
            .collect();

        data.push(row);
    }

    tracing::debug!("Parsed CSV: {} columns, {} rows", headers.len(), data.len());

    Ok(ParsedWatchlist { headers, data })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::row::FieldValue;

    #[test]
    fn test_parse_appends_comment_column() {
        let parsed = parse_csv("Symbol,Daily\nAAA,buy\n").unwrap();

        assert_eq!(parsed.headers, ["Symbol", "Daily", "Comment"]);
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(
            parsed.data[0],
            Row::from_iter([("Symbol", "AAA"), ("Daily", "buy"), ("Comment", "")])
        );
    }

    #[test]
    fn test_existing_comment_column_is_kept() {
        let parsed = parse_csv("Symbol,Comment,Daily\nSPY,watch gap, sell \n").unwrap();

        assert_eq!(parsed.headers, ["Symbol", "Comment", "Daily"]);
        let row = &parsed.data[0];
        assert_eq!(row.text("Comment"), "watch gap");
        assert_eq!(row.text("Daily"), "sell");
    }

    #[test]
    fn test_short_and_long_lines() {
        let parsed = parse_csv("Symbol,Daily,Weekly\nAAA\nBBB,buy,sell,extra\n").unwrap();

        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].text("Daily"), "");
        assert_eq!(parsed.data[0].text("Weekly"), "");
        assert_eq!(parsed.data[1].text("Weekly"), "sell");
        assert_eq!(parsed.data[1].len(), 4);
        assert!(!parsed.data[1].contains_key("extra"));
    }

    #[test]
    fn test_quotes_are_literal() {
        let parsed = parse_csv("Symbol,Comment\n\"BRK,B\"\n").unwrap();

        assert_eq!(parsed.data[0].text("Symbol"), "\"BRK");
        assert_eq!(parsed.data[0].text("Comment"), "B\"");
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let parsed = parse_csv("Symbol,Daily\r\nAAA,buy\r\n\r\n   \r\nBBB,sell\r\n\r\n").unwrap();

        assert_eq!(parsed.headers, ["Symbol", "Daily", "Comment"]);
        let symbols: Vec<&str> = parsed.data.iter().map(Row::symbol).collect();
        assert_eq!(symbols, ["AAA", "BBB"]);
        assert_eq!(
            parsed.data[1].get("Daily"),
            Some(&FieldValue::Text("sell".to_string()))
        );
    }

    #[test]
    fn test_header_only_file() {
        let parsed = parse_csv("Symbol,Daily").unwrap();
        assert_eq!(parsed.headers, ["Symbol", "Daily", "Comment"]);
        assert!(parsed.data.is_empty());
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let result = parse_csv("  \n\n");
        assert!(matches!(result, Err(AppError::Parse(_))));
    }
}
