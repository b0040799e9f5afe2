//! Specification-parameter to production-column mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which resolution layer produced a column match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Alias { key: String },
    Thickness,
    Mesh,
    Fuzzy { ratio: f64 },
}

impl MatchStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Alias { .. } => "alias",
            Self::Thickness => "thickness",
            Self::Mesh => "mesh",
            Self::Fuzzy { .. } => "fuzzy",
        }
    }
}

/// A production column chosen for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    /// Header exactly as it appears in the production dataset.
    pub column: String,
    #[serde(flatten)]
    pub strategy: MatchStrategy,
}

/// Per specification code, parameter name to resolved column (or `None`).
///
/// Built from headers only, so one mapping serves every lot of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    by_code: BTreeMap<String, BTreeMap<String, Option<ResolvedColumn>>>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, parameter: &str, resolved: Option<ResolvedColumn>) {
        self.by_code
            .entry(code.to_string())
            .or_default()
            .insert(parameter.to_string(), resolved);
    }

    /// The resolved column for a parameter, `None` when unresolved or unknown.
    pub fn get(&self, code: &str, parameter: &str) -> Option<&ResolvedColumn> {
        self.by_code
            .get(code)
            .and_then(|parameters| parameters.get(parameter))
            .and_then(Option::as_ref)
    }

    pub fn parameters(&self, code: &str) -> Option<&BTreeMap<String, Option<ResolvedColumn>>> {
        self.by_code.get(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_code.keys().map(String::as_str)
    }

    pub fn stats(&self) -> ResolutionStats {
        let mut stats = ResolutionStats::default();
        for resolved in self.by_code.values().flat_map(BTreeMap::values) {
            match resolved {
                None => stats.unresolved += 1,
                Some(column) => {
                    *stats
                        .by_strategy
                        .entry(column.strategy.label().to_string())
                        .or_insert(0) += 1;
                }
            }
        }
        stats
    }
}

/// Counts of resolved parameters per strategy plus unresolved ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub by_strategy: BTreeMap<String, usize>,
    pub unresolved: usize,
}

impl ResolutionStats {
    pub fn resolved(&self) -> usize {
        self.by_strategy.values().sum()
    }
}
