//! Plain-text views of rows: the one-line preview under each table row
//! and the export summary of every symbol the user opted in.

use crate::watchlist::row::{Row, Timeframe, TrendDirection, TrendGroup, COMMENT};

const UNSELECTED: &str = "Unselected";
const LINE_BREAK: char = '\u{1e}';
const NO_EXPORT_ROWS: &str = "No symbols selected for export.";

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn joined_or_unselected(directions: &[TrendDirection]) -> String {
    if directions.is_empty() {
        UNSELECTED.to_string()
    } else {
        directions
            .iter()
            .map(|d| d.as_str().to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn timeframe_preview(row: &Row, timeframe: Timeframe) -> String {
    let selection = row.selection(timeframe).trim();
    let selection = if selection.is_empty() {
        UNSELECTED.to_string()
    } else {
        capitalize(selection)
    };

    format!(
        "{} / EMA: {} / SMA: {}",
        selection,
        joined_or_unselected(&row.trend_directions(timeframe, TrendGroup::MacroTrend)),
        joined_or_unselected(&row.trend_directions(timeframe, TrendGroup::Sma200)),
    )
}

/// `Daily: Buy / EMA: bull / SMA: Unselected  |  Weekly: ...  |  Monthly: ...`
pub fn preview(row: &Row) -> String {
    Timeframe::ALL
        .iter()
        .map(|tf| format!("{}: {}", tf, timeframe_preview(row, *tf)))
        .collect::<Vec<_>>()
        .join("  |  ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Tags that end a line of notes text
fn is_line_break_tag(tag: &str) -> bool {
    let name = tag.trim().trim_end_matches('/').trim_end().to_ascii_lowercase();
    matches!(name.as_str(), "br" | "/p" | "/div" | "/li" | "/blockquote")
}

/// Drop markup, keeping a break marker where a block or `<br>` ended
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(len) => {
                if is_line_break_tag(&rest[start + 1..start + len]) {
                    text.push(LINE_BREAK);
                }
                rest = &rest[start + len + 1..];
            }
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }

    text.push_str(rest);
    text
}

/// Force a space after every period that is followed by something
fn space_after_periods(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        spaced.push(c);
        if c == '.' && chars.peek().is_some_and(|next| *next != ' ') {
            spaced.push(' ');
        }
    }

    spaced
}

/// Flatten rich-text notes into sentences.
///
/// Block ends and `<br>` become line breaks, tags are dropped, and every
/// non-empty line ends up terminated by punctuation.
pub fn clean_notes_text(html: &str) -> String {
    let text = decode_entities(&strip_tags(html));

    let sentences: Vec<String> = text
        .split(LINE_BREAK)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.ends_with(['.', '!', '?']) {
                line.to_string()
            } else {
                format!("{}.", line)
            }
        })
        .collect();

    space_after_periods(&sentences.join(" "))
}

/// Trend selections shown once per symbol in the export
fn macro_trend_line(row: &Row) -> Option<String> {
    let mut parts = Vec::new();

    for group in TrendGroup::ALL {
        let directions = row.trend_directions(Timeframe::Daily, group);
        if !directions.is_empty() {
            let names: Vec<&str> = directions.iter().map(|d| d.as_str()).collect();
            parts.push(format!("{}: {}", group.label(), names.join(", ")));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("Macro Trend: {}", parts.join("; ")))
    }
}

fn export_row(row: &Row) -> String {
    let symbol = match row.symbol() {
        "" => "Unknown",
        symbol => symbol,
    };
    let mut lines = vec![symbol.to_string()];

    for timeframe in Timeframe::ALL {
        let selection = row.selection(timeframe);
        if !selection.is_empty() {
            lines.push(format!("  {}: {}", timeframe, capitalize(selection)));
        }
    }

    if let Some(trend) = macro_trend_line(row) {
        lines.push(format!("  {}", trend));
    }

    for timeframe in Timeframe::ALL {
        let notes = row.notes(timeframe);
        if !notes.trim().is_empty() {
            lines.push(format!("  {} Notes: {}", timeframe, clean_notes_text(notes)));
        }
    }

    let comment = row.text(COMMENT).trim();
    if !comment.is_empty() {
        lines.push(format!("  Comment: {}", comment));
    }

    lines.join("\n")
}

/// Summary of every non-skipped row, in collection order
pub fn export_text(rows: &[Row]) -> String {
    let selected: Vec<String> = rows
        .iter()
        .filter(|row| !row.is_skipped())
        .map(export_row)
        .collect();

    if selected.is_empty() {
        NO_EXPORT_ROWS.to_string()
    } else {
        selected.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watchlist::row::FieldValue;

    #[test]
    fn test_preview() {
        let mut row = Row::from_iter([("Symbol", "SPY"), ("Daily", "buy"), ("Weekly", "")]);
        row.set("MacroTrendBull", true);
        row.set("WeeklySMA200Bear", "true");
        row.set("WeeklySMA200Tumbling", FieldValue::Flag(true));

        assert_eq!(
            preview(&row),
            "Daily: Buy / EMA: bull / SMA: Unselected  |  \
             Weekly: Unselected / EMA: Unselected / SMA: bear, tumbling  |  \
             Monthly: Unselected / EMA: Unselected / SMA: Unselected"
        );
    }

    #[test]
    fn test_clean_notes_text() {
        assert_eq!(clean_notes_text(""), "");
        assert_eq!(
            clean_notes_text("<p>Breaking out</p><p>Volume &amp; trend up!</p><p><br></p>"),
            "Breaking out. Volume & trend up!"
        );
        assert_eq!(
            clean_notes_text("<ul><li>gap fill</li><li>stop under low</li></ul>"),
            "gap fill. stop under low."
        );
        assert_eq!(clean_notes_text("first<BR/>second.third"), "first. second. third.");
    }

    #[test]
    fn test_export_text() {
        let skipped = Row::from_iter([("Symbol", "QQQ"), ("Skip", "true")]);
        assert_eq!(export_text(&[skipped.clone()]), "No symbols selected for export.");

        let mut row = Row::from_iter([
            ("Symbol", "XLF"),
            ("Skip", "false"),
            ("Daily", "sell"),
            ("Monthly", "neutral"),
            ("DailyNotes", "<p>under 200</p>"),
            ("Comment", "banks weak"),
        ]);
        row.set("MacroTrendBear", true);

        assert_eq!(
            export_text(&[skipped, row]),
            "XLF\n  Daily: Sell\n  Monthly: Neutral\n  Macro Trend: EMA: Bear\n  \
             Daily Notes: under 200.\n  Comment: banks weak"
        );
    }
}
