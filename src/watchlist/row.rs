//! Row model
//!
//! A row is one symbol's annotation record: an ordered map from field name
//! to a text or boolean value. Rows come from CSV files (all text) or from
//! the browser/REST payloads, where checkbox fields may be real booleans.
//! Reads never fail on a missing key; absence reads as empty/false.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const SYMBOL: &str = "Symbol";
pub const SKIP: &str = "Skip";
pub const COMMENT: &str = "Comment";

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    /// Truthiness as the browser sees it: `true` or any non-empty text.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// Checkbox semantics: only `true` and `"true"` count as checked.
    pub fn is_checked(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Text(s) => s == "true",
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Flag(true) => "true",
            FieldValue::Flag(false) => "false",
            FieldValue::Text(s) => s,
        }
    }
}

/// Accept numbers and null as well, so hand-edited payloads still load.
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flexible {
            Flag(bool),
            Text(String),
            Int(i64),
            Float(f64),
        }

        match Option::<Flexible>::deserialize(deserializer)? {
            None => Ok(FieldValue::Text(String::new())),
            Some(Flexible::Flag(b)) => Ok(FieldValue::Flag(b)),
            Some(Flexible::Text(s)) => Ok(FieldValue::Text(s)),
            Some(Flexible::Int(i)) => Ok(FieldValue::Text(i.to_string())),
            Some(Flexible::Float(f)) => Ok(FieldValue::Text(f.to_string())),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Analysis timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Daily, Timeframe::Weekly, Timeframe::Monthly];

    /// Field holding the buy/sell/neutral selection
    pub fn selection_field(&self) -> &'static str {
        match self {
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
            Timeframe::Monthly => "Monthly",
        }
    }

    /// Prefix of the trend checkbox fields. Daily fields are unprefixed.
    pub fn field_prefix(&self) -> &'static str {
        match self {
            Timeframe::Daily => "",
            Timeframe::Weekly => "Weekly",
            Timeframe::Monthly => "Monthly",
        }
    }

    pub fn notes_field(&self) -> &'static str {
        match self {
            Timeframe::Daily => "DailyNotes",
            Timeframe::Weekly => "WeeklyNotes",
            Timeframe::Monthly => "MonthlyNotes",
        }
    }

    pub fn trend_field(&self, group: TrendGroup, direction: TrendDirection) -> String {
        format!(
            "{}{}{}",
            self.field_prefix(),
            group.field_stem(),
            direction.as_str()
        )
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selection_field())
    }
}

/// Checkbox group shown for every timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendGroup {
    MacroTrend,
    Sma200,
}

impl TrendGroup {
    pub const ALL: [TrendGroup; 2] = [TrendGroup::MacroTrend, TrendGroup::Sma200];

    pub fn field_stem(&self) -> &'static str {
        match self {
            TrendGroup::MacroTrend => "MacroTrend",
            TrendGroup::Sma200 => "SMA200",
        }
    }

    /// Short label used in previews and exports
    pub fn label(&self) -> &'static str {
        match self {
            TrendGroup::MacroTrend => "EMA",
            TrendGroup::Sma200 => "SMA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendDirection {
    Bull,
    Bear,
    Tumbling,
}

impl TrendDirection {
    pub const ALL: [TrendDirection; 3] = [
        TrendDirection::Bull,
        TrendDirection::Bear,
        TrendDirection::Tumbling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Bull => "Bull",
            TrendDirection::Bear => "Bear",
            TrendDirection::Tumbling => "Tumbling",
        }
    }
}

/// Per-timeframe trade call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Call {
    Buy,
    Sell,
    Neutral,
}

impl Call {
    /// Parse a dropdown value, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Call> {
        match value.trim().to_lowercase().as_str() {
            "buy" => Some(Call::Buy),
            "sell" => Some(Call::Sell),
            "neutral" => Some(Call::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Call::Buy => "buy",
            Call::Sell => "sell",
            Call::Neutral => "neutral",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Call::Buy => "Buy",
            Call::Sell => "Sell",
            Call::Neutral => "Neutral",
        }
    }
}

/// One watchlist symbol's annotation record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, FieldValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Text of a field; empty when missing
    pub fn text(&self, field: &str) -> &str {
        self.fields.get(field).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn is_checked(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(FieldValue::is_checked)
    }

    pub fn is_truthy(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(FieldValue::is_truthy)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn symbol(&self) -> &str {
        self.text(SYMBOL)
    }

    pub fn is_skipped(&self) -> bool {
        self.is_checked(SKIP)
    }

    /// Rows start out skipped until the user opts them in.
    ///
    /// Only a missing or falsy value is replaced, so an explicit `"false"`
    /// survives.
    pub fn ensure_skip_default(&mut self) {
        if !self.is_truthy(SKIP) {
            self.set(SKIP, "true");
        }
    }

    /// Raw selection text for a timeframe
    pub fn selection(&self, timeframe: Timeframe) -> &str {
        self.text(timeframe.selection_field())
    }

    pub fn call(&self, timeframe: Timeframe) -> Option<Call> {
        Call::parse(self.selection(timeframe))
    }

    pub fn trend(&self, timeframe: Timeframe, group: TrendGroup, direction: TrendDirection) -> bool {
        self.is_checked(&timeframe.trend_field(group, direction))
    }

    /// Checked directions of a trend group, in Bull/Bear/Tumbling order
    pub fn trend_directions(&self, timeframe: Timeframe, group: TrendGroup) -> Vec<TrendDirection> {
        TrendDirection::ALL
            .into_iter()
            .filter(|d| self.trend(timeframe, group, *d))
            .collect()
    }

    pub fn has_trend(&self, timeframe: Timeframe, group: TrendGroup) -> bool {
        TrendDirection::ALL
            .iter()
            .any(|d| self.trend(timeframe, group, *d))
    }

    pub fn notes(&self, timeframe: Timeframe) -> &str {
        self.text(timeframe.notes_field())
    }

    /// All three timeframe selections are filled in
    pub fn is_completed(&self) -> bool {
        Timeframe::ALL
            .iter()
            .all(|tf| self.is_truthy(tf.selection_field()))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
