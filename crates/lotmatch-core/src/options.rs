//! Run configuration.

use std::path::Path;
use std::time::Duration;

use lotmatch_map::{AliasTables, DEFAULT_FUZZY_THRESHOLD, ResolverOptions, normalize_text};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Tunables for a matching run. Every field has a default, so a JSON file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Fuzzy column matches need a similarity strictly above this.
    pub fuzzy_threshold: f64,
    /// Parameters that never fall back to fuzzy matching.
    pub fuzzy_exempt_parameters: Vec<String>,
    /// A production status containing any of these marks a held lot.
    pub held_status_keywords: Vec<String>,
    /// Clients containing any of these are test fixtures, not real clients.
    pub placeholder_clients: Vec<String>,
    /// Specification row types that carry a parameter range.
    pub analysis_row_types: Vec<String>,
    /// Zero-based sheet row holding the production headers.
    pub production_header_row: usize,
    /// Zero-based row holding the specification headers.
    pub specification_header_row: usize,
    pub specification_ttl_secs: u64,
    pub production_ttl_secs: u64,
    /// Replaces the built-in alias and synonym tables when present.
    pub aliases: Option<AliasTables>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_exempt_parameters: strings(&["moisture", "humedad"]),
            held_status_keywords: strings(&["held", "retained", "retenido"]),
            placeholder_clients: strings(&[
                "_Cliente de PruebaX",
                "NO BORRAR",
                "test client",
                "do not delete",
            ]),
            analysis_row_types: strings(&["analysis", "analisis"]),
            production_header_row: 1,
            specification_header_row: 0,
            specification_ttl_secs: 3600,
            production_ttl_secs: 600,
            aliases: None,
        }
    }
}

impl MatchOptions {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let options_error = |message: String| CoreError::Options {
            path: path.to_path_buf(),
            message,
        };
        let json = std::fs::read_to_string(path).map_err(|err| options_error(err.to_string()))?;
        Self::from_json_str(&json).map_err(|err| options_error(err.to_string()))
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            fuzzy_threshold: self.fuzzy_threshold,
            fuzzy_exempt_parameters: self.fuzzy_exempt_parameters.clone(),
        }
    }

    /// The configured alias tables, or the built-in ones.
    pub fn alias_tables(&self) -> AliasTables {
        self.aliases.clone().unwrap_or_else(AliasTables::builtin)
    }

    pub fn specification_ttl(&self) -> Duration {
        Duration::from_secs(self.specification_ttl_secs)
    }

    pub fn production_ttl(&self) -> Duration {
        Duration::from_secs(self.production_ttl_secs)
    }

    /// True when a normalized status names a held lot.
    pub fn is_held_status(&self, status: &str) -> bool {
        contains_any(&normalize_text(status), &self.held_status_keywords)
    }

    /// True when a client name contains a placeholder marker.
    pub fn is_placeholder_client(&self, client: &str) -> bool {
        contains_any(&normalize_text(client), &self.placeholder_clients)
    }

    /// True when a specification row type marks a parameter row.
    pub fn is_analysis_row(&self, row_type: &str) -> bool {
        let normalized = normalize_text(row_type);
        self.analysis_row_types
            .iter()
            .any(|kind| normalize_text(kind) == normalized)
    }
}

fn contains_any(normalized: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| {
        let keyword = normalize_text(keyword);
        !keyword.is_empty() && normalized.contains(&keyword)
    })
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
