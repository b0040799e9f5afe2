//! Loosely typed cell values as they come out of CSV files and workbooks.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single cell of an input table.
///
/// CSV cells always arrive as [`CellValue::Text`]; workbook cells keep the
/// type the spreadsheet stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Builds a cell from raw text, mapping blank strings to [`CellValue::Empty`].
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('\u{feff}');
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::DateTime(_) => false,
        }
    }

    /// Numeric coercion. Unparseable text and NaN become `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Empty | Self::DateTime(_) => None,
            Self::Number(value) => (!value.is_nan()).then_some(*value),
            Self::Text(text) => parse_f64(text),
        }
    }

    /// String form used for identifiers, labels and keyword matching.
    /// Empty cells render as an empty string.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.clone(),
            Self::Number(value) => format_numeric(*value),
            Self::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Like [`CellValue::as_text`] but `None` for blank cells.
    pub fn as_text_non_empty(&self) -> Option<String> {
        let text = self.as_text();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Parses a string as f64, returning None for invalid, empty or NaN input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| !parsed.is_nan())
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(value: f64) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{value}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
