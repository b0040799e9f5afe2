//! Locating named fields among a table's headers.
//!
//! Each field has an ordered keyword list. The first keyword that occurs in
//! any normalized header wins, and among headers containing it the leftmost
//! one is taken. Ambiguity is resolved by that order, never reported.

use lotmatch_map::normalize_text;

/// A field and the header keywords that identify it, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub keywords: &'static [&'static str],
}

/// Headers of one table, normalized once.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    normalized: Vec<String>,
}

impl HeaderIndex {
    pub fn new(headers: &[String]) -> Self {
        Self {
            normalized: headers.iter().map(|header| normalize_text(header)).collect(),
        }
    }

    /// Column position for a rule, or `None` when no header matches.
    pub fn find(&self, rule: &FieldRule) -> Option<usize> {
        rule.keywords.iter().find_map(|keyword| {
            let keyword = normalize_text(keyword);
            self.normalized
                .iter()
                .position(|header| !header.is_empty() && header.contains(&keyword))
        })
    }

    pub fn normalized(&self, column: usize) -> Option<&str> {
        self.normalized.get(column).map(String::as_str)
    }
}

/// Resolves every required rule, collecting all misses instead of stopping at the first.
pub fn find_required<const N: usize>(
    index: &HeaderIndex,
    rules: &[FieldRule; N],
) -> Result<[usize; N], Vec<&'static str>> {
    let mut found = [0usize; N];
    let mut missing = Vec::new();
    for (slot, rule) in found.iter_mut().zip(rules) {
        match index.find(rule) {
            Some(column) => *slot = column,
            None => missing.push(rule.field),
        }
    }
    if missing.is_empty() {
        Ok(found)
    } else {
        Err(missing)
    }
}
