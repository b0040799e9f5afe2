//! Canonical text form used as the matching key everywhere.
//!
//! Every equality or containment check between labels, headers and keywords
//! goes through [`normalize_text`]. Raw strings are never compared directly.

use std::fmt;

use deunicode::deunicode;
use serde::{Deserialize, Serialize};

/// Occurrence markers written with a degree or ordinal sign. Removed before
/// transliteration, which would otherwise spell the sign out.
const SIGN_MARKERS: [&str; 2] = ["n°", "nº"];

/// ASCII occurrence markers.
const ASCII_MARKERS: [&str; 2] = ["no.", "num"];

const SEPARATORS: [char; 6] = ['.', ',', '-', '/', '_', '%'];

/// Normalizes text for comparison.
///
/// Lowercases, strips diacritics, removes occurrence markers, replaces
/// separators with spaces and collapses whitespace. Total and idempotent.
pub fn normalize_text(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let unsigned = strip_markers(&lowered, &SIGN_MARKERS);
    let latin = deunicode(&unsigned).to_lowercase();
    let unmarked = strip_markers(&latin, &ASCII_MARKERS);
    unmarked
        .replace(SEPARATORS, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes markers until none is left, so a removal can't leave a new marker behind.
fn strip_markers(text: &str, markers: &[&str]) -> String {
    let mut current = text.to_string();
    loop {
        let next = markers
            .iter()
            .fold(current.clone(), |acc, marker| acc.replace(marker, ""));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// A string already in normalized form.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        Self(normalize_text(raw))
    }

    /// Stringifies any displayable value first, then normalizes it.
    pub fn from_value<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Self::new(&value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NormalizedText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
