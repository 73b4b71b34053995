//! Lenient numeric cells.
//!
//! Spreadsheet exports carry numbers as JSON numbers, numeric strings,
//! Swedish decimal commas, or blanks. A cell keeps what it could make of
//! its input so that a bad value can be reported against its row while the
//! batch is still aggregated.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A single numeric cell from an input row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NumericCell {
    /// Column absent from the row, `null`, or blank.
    #[default]
    Missing,
    /// Present but not a number; holds the raw text.
    Invalid(String),
    /// A parsed value.
    Value(Decimal),
}

impl NumericCell {
    /// Parses a cell from its textual form.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Self::Missing;
        }

        parse_decimal(trimmed).map_or_else(|| Self::Invalid(trimmed.to_string()), Self::Value)
    }

    /// Interprets an arbitrary JSON value as a cell.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Number(n) => {
                let text = n.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map_or(Self::Invalid(text), Self::Value)
            }
            Value::String(s) => Self::parse(s),
            other => Self::Invalid(other.to_string()),
        }
    }

    /// Returns the parsed value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<Decimal> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value, or zero when missing or invalid.
    #[must_use]
    pub fn or_zero(&self) -> Decimal {
        self.value().unwrap_or(Decimal::ZERO)
    }

    /// Returns true unless the cell is [`NumericCell::Missing`].
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

impl From<Decimal> for NumericCell {
    fn from(value: Decimal) -> Self {
        Self::Value(value)
    }
}

impl<'de> Deserialize<'de> for NumericCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Parses `81.45`, `81,45`, `1 234,50`, `-507.70`, `1,234.56` and `25%`.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();

    let normalized = match (cleaned.contains('.'), cleaned.contains(',')) {
        (true, true) => cleaned.replace(',', ""),
        (false, true) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Lenient text deserializer: numbers become their string form, blanks become `None`.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_json(&value))
}

pub(crate) fn text_from_json(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}
