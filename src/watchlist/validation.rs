//! Row validation
//!
//! Defects are warnings, not errors: a save with defects goes ahead when
//! the user explicitly overrides.

use crate::watchlist::row::{Row, Timeframe, TrendGroup};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefectKind {
    MissingSelection,
    MacroTrend,
}

/// One missing piece of a row's annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub symbol: String,
    pub column: String,
    pub row_index: usize,
    #[serde(rename = "type")]
    pub kind: DefectKind,
}

/// Timeframes whose macro-trend group must be filled once a call is made.
/// Monthly is not checked.
const MACRO_TREND_RULES: [(Timeframe, &str); 2] = [
    (Timeframe::Daily, "Daily Macro Trend"),
    (Timeframe::Weekly, "Weekly Macro Trend"),
];

fn has_selection(row: &Row, timeframe: Timeframe) -> bool {
    let field = timeframe.selection_field();
    row.is_truthy(field) && !row.text(field).trim().is_empty()
}

/// Scan rows for missing selections and missing macro-trend groups.
///
/// Defects come out in row order, then rule order within a row. Skipped
/// rows never produce defects. `row_index` is the position in `rows`.
pub fn validate(rows: &[Row]) -> Vec<Defect> {
    let mut defects = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_skipped() {
            continue;
        }

        let defect = |column: &str, kind: DefectKind| Defect {
            symbol: row.symbol().to_string(),
            column: column.to_string(),
            row_index: index,
            kind,
        };

        for timeframe in Timeframe::ALL {
            if !has_selection(row, timeframe) {
                defects.push(defect(timeframe.selection_field(), DefectKind::MissingSelection));
            }
        }

        for (timeframe, column) in MACRO_TREND_RULES {
            if has_selection(row, timeframe) && !row.has_trend(timeframe, TrendGroup::MacroTrend) {
                defects.push(defect(column, DefectKind::MacroTrend));
            }
        }
    }

    defects
}

/// Defects grouped for display
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub defects: Vec<Defect>,
}

impl ValidationReport {
    pub fn for_rows(rows: &[Row]) -> Self {
        Self {
            defects: validate(rows),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn count(&self, kind: DefectKind) -> usize {
        self.defects.iter().filter(|d| d.kind == kind).count()
    }

    /// One-line summary, e.g. `2 missing selection(s), 1 missing Macro Trend(s)`
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        let missing = self.count(DefectKind::MissingSelection);
        if missing > 0 {
            parts.push(format!("{} missing selection(s)", missing));
        }

        let macro_trend = self.count(DefectKind::MacroTrend);
        if macro_trend > 0 {
            parts.push(format!("{} missing Macro Trend(s)", macro_trend));
        }

        parts.join(", ")
    }

    /// Distinct symbols with at least one defect, in encounter order
    pub fn incomplete_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = Vec::new();
        for defect in &self.defects {
            if !symbols.contains(&defect.symbol.as_str()) {
                symbols.push(&defect.symbol);
            }
        }
        symbols
    }

    /// Columns per symbol for one kind of defect
    pub fn columns_by_symbol(&self, kind: DefectKind) -> IndexMap<&str, Vec<&str>> {
        let mut grouped: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for defect in self.defects.iter().filter(|d| d.kind == kind) {
            grouped
                .entry(defect.symbol.as_str())
                .or_default()
                .push(defect.column.as_str());
        }
        grouped
    }

    /// Human-readable lines, missing selections first
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        for (symbol, columns) in self.columns_by_symbol(DefectKind::MissingSelection) {
            lines.push(format!("Missing selection - {}: {}", symbol, columns.join(", ")));
        }

        for (symbol, columns) in self.columns_by_symbol(DefectKind::MacroTrend) {
            lines.push(format!(
                "Missing Macro Trend - {}: {} (Bull, Bear, or Tumbling must be selected)",
                symbol,
                columns.join(", ")
            ));
        }

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::row::{SKIP, SYMBOL};

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_skipped_rows_have_no_defects() {
        let rows = vec![row(&[(SYMBOL, "AAA"), (SKIP, "true")])];
        assert!(validate(&rows).is_empty());

        let mut flagged = row(&[(SYMBOL, "BBB")]);
        flagged.set(SKIP, true);
        assert!(validate(&[flagged]).is_empty());
    }

    #[test]
    fn test_missing_selections_in_column_order() {
        let rows = vec![
            row(&[(SYMBOL, "AAA"), (SKIP, "true")]),
            row(&[(SYMBOL, "BBB"), (SKIP, "false"), ("Weekly", "  ")]),
        ];

        let defects = validate(&rows);
        assert_eq!(defects.len(), 3);
        assert!(defects.iter().all(|d| d.symbol == "BBB" && d.row_index == 1));
        let columns: Vec<&str> = defects.iter().map(|d| d.column.as_str()).collect();
        assert_eq!(columns, ["Daily", "Weekly", "Monthly"]);
    }

    #[test]
    fn test_macro_trend_required_for_daily_and_weekly() {
        let rows = vec![row(&[
            (SYMBOL, "CCC"),
            (SKIP, "false"),
            ("Daily", "buy"),
            ("Weekly", "sell"),
            ("Monthly", "neutral"),
        ])];

        let defects = validate(&rows);
        assert_eq!(defects.len(), 2);
        assert_eq!(defects[0].column, "Daily Macro Trend");
        assert_eq!(defects[1].column, "Weekly Macro Trend");
        assert!(defects.iter().all(|d| d.kind == DefectKind::MacroTrend));
    }

    #[test]
    fn test_monthly_macro_trend_not_checked() {
        let rows = vec![row(&[(SYMBOL, "DDD"), (SKIP, "false"), ("Monthly", "buy")])];

        let defects = validate(&rows);
        assert_eq!(defects.len(), 2);
        assert!(defects.iter().all(|d| d.kind == DefectKind::MissingSelection));
    }

    #[test]
    fn test_checked_macro_trend_clears_defect() {
        let mut complete = row(&[
            (SYMBOL, "EEE"),
            (SKIP, "false"),
            ("Daily", "buy"),
            ("Weekly", "buy"),
            ("Monthly", "buy"),
            ("WeeklyMacroTrendTumbling", "true"),
        ]);
        complete.set("MacroTrendBear", true);

        assert!(validate(&[complete]).is_empty());
    }

    #[test]
    fn test_report_summary_and_grouping() {
        let rows = vec![
            row(&[(SYMBOL, "AAA"), (SKIP, "false"), ("Daily", "buy")]),
            row(&[(SYMBOL, "BBB"), (SKIP, "false"), ("Daily", "sell"), ("Weekly", "buy"), ("Monthly", "buy")]),
        ];

        let report = ValidationReport::for_rows(&rows);
        assert_eq!(report.summary(), "2 missing selection(s), 3 missing Macro Trend(s)");
        assert_eq!(report.incomplete_symbols(), ["AAA", "BBB"]);

        let grouped = report.columns_by_symbol(DefectKind::MissingSelection);
        assert_eq!(grouped["AAA"], ["Weekly", "Monthly"]);

        let lines = report.describe();
        assert_eq!(lines[0], "Missing selection - AAA: Weekly, Monthly");
        assert!(lines[2].starts_with("Missing Macro Trend - BBB: Daily Macro Trend, Weekly Macro Trend"));
    }

    #[test]
    fn test_defect_serializes_like_browser_payload() {
        let defects = validate(&[row(&[(SYMBOL, "AAA"), (SKIP, "false")])]);
        let json = serde_json::to_value(&defects[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "symbol": "AAA",
                "column": "Daily",
                "rowIndex": 0,
                "type": "missing-selection"
            })
        );
    }
}
