//! Column resolution: which production column carries each specification parameter.
//!
//! Resolution is layered. For each parameter the resolver tries, in order:
//!
//! 1. exact normalized-name equality,
//! 2. the alias table (key contained in the parameter, variant contained in a header),
//! 3. the average-thickness heuristic for thickness parameters,
//! 4. sieve-size matching for mesh parameters,
//! 5. a fuzzy similarity fallback above a threshold.
//!
//! Only headers are consulted, never row values, so the resulting
//! [`ColumnMapping`] is computed once per dataset and reused for every lot.

use std::collections::BTreeMap;

use lotmatch_model::{
    ColumnMapping, MatchStrategy, ParameterKind, ParameterSpec, ResolvedColumn, SpecDatabase,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aliases::AliasTables;
use crate::classify::is_average_thickness;
use crate::normalize::normalize_text;
use crate::similarity::{mesh_header_match, similarity_ratio};

/// Default minimum (exclusive) similarity for the fuzzy fallback.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.8;

/// Tunables for the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// A fuzzy match is accepted only when its ratio is strictly greater.
    pub fuzzy_threshold: f64,
    /// Parameters (normalized names) that never use the fuzzy fallback.
    pub fuzzy_exempt_parameters: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            fuzzy_exempt_parameters: vec!["moisture".to_string(), "humedad".to_string()],
        }
    }
}

/// A production header and its normalized form.
#[derive(Debug, Clone)]
struct Header {
    normalized: String,
    original: String,
}

/// Resolves specification parameters against one production dataset's headers.
pub struct ColumnResolver<'a> {
    aliases: &'a AliasTables,
    headers: Vec<Header>,
    fuzzy_threshold: f64,
    fuzzy_exempt: Vec<String>,
}

impl<'a> ColumnResolver<'a> {
    /// Creates a resolver for the given production headers.
    ///
    /// Header order is preserved. When two headers normalize to the same
    /// text, the first one is kept; headers that normalize to nothing are
    /// ignored.
    pub fn new(aliases: &'a AliasTables, columns: &[String], options: &ResolverOptions) -> Self {
        let mut headers: Vec<Header> = Vec::with_capacity(columns.len());
        for column in columns {
            let normalized = normalize_text(column);
            if normalized.is_empty() || headers.iter().any(|h| h.normalized == normalized) {
                continue;
            }
            headers.push(Header {
                normalized,
                original: column.clone(),
            });
        }
        Self {
            aliases,
            headers,
            fuzzy_threshold: options.fuzzy_threshold,
            fuzzy_exempt: options
                .fuzzy_exempt_parameters
                .iter()
                .map(|name| normalize_text(name))
                .collect(),
        }
    }

    /// Builds the mapping for every parameter of every specification.
    ///
    /// Parameters sharing a normalized name across specifications are
    /// resolved once; the kind is derived from that name, so it is shared too.
    pub fn resolve(&self, database: &SpecDatabase) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        let mut memo: BTreeMap<&str, Option<ResolvedColumn>> = BTreeMap::new();
        for specification in database.iter() {
            for parameter in &specification.parameters {
                let resolved = memo
                    .entry(parameter.normalized_name.as_str())
                    .or_insert_with(|| self.resolve_parameter(parameter))
                    .clone();
                mapping.insert(&specification.code, &parameter.name, resolved);
            }
        }
        let stats = mapping.stats();
        info!(
            resolved = stats.resolved(),
            unresolved = stats.unresolved,
            distinct_parameters = memo.len(),
            "resolved specification parameters against production columns"
        );
        mapping
    }

    /// Resolves a single parameter, returning `None` when no layer matches.
    pub fn resolve_parameter(&self, parameter: &ParameterSpec) -> Option<ResolvedColumn> {
        let name = parameter.normalized_name.as_str();
        if name.is_empty() {
            return None;
        }
        let resolved = self
            .exact(name)
            .or_else(|| self.alias(name))
            .or_else(|| self.thickness(parameter))
            .or_else(|| self.mesh(parameter))
            .or_else(|| self.fuzzy(name));
        match &resolved {
            Some(column) => debug!(
                parameter = %parameter.name,
                column = %column.column,
                strategy = column.strategy.label(),
                "resolved parameter"
            ),
            None => debug!(parameter = %parameter.name, "no production column for parameter"),
        }
        resolved
    }

    fn exact(&self, name: &str) -> Option<ResolvedColumn> {
        self.headers
            .iter()
            .find(|header| header.normalized == name)
            .map(|header| resolved(header, MatchStrategy::Exact))
    }

    fn alias(&self, name: &str) -> Option<ResolvedColumn> {
        for entry in self.aliases.aliases_for(name) {
            for variant in &entry.variants {
                if let Some(header) = self
                    .headers
                    .iter()
                    .find(|header| header.normalized.contains(variant.as_str()))
                {
                    return Some(resolved(
                        header,
                        MatchStrategy::Alias {
                            key: entry.key.clone(),
                        },
                    ));
                }
            }
        }
        None
    }

    fn thickness(&self, parameter: &ParameterSpec) -> Option<ResolvedColumn> {
        if parameter.kind != ParameterKind::Thickness {
            return None;
        }
        self.headers
            .iter()
            .find(|header| is_average_thickness(&header.normalized))
            .map(|header| resolved(header, MatchStrategy::Thickness))
    }

    fn mesh(&self, parameter: &ParameterSpec) -> Option<ResolvedColumn> {
        if parameter.kind != ParameterKind::Mesh {
            return None;
        }
        self.headers
            .iter()
            .find(|header| mesh_header_match(&parameter.normalized_name, &header.normalized))
            .map(|header| resolved(header, MatchStrategy::Mesh))
    }

    fn fuzzy(&self, name: &str) -> Option<ResolvedColumn> {
        if self.fuzzy_exempt.iter().any(|exempt| exempt == name) {
            return None;
        }
        let mut best: Option<(&Header, f64)> = None;
        for header in &self.headers {
            let ratio = similarity_ratio(name, &header.normalized);
            if best.is_none_or(|(_, best_ratio)| ratio > best_ratio) {
                best = Some((header, ratio));
            }
        }
        let (header, ratio) = best?;
        (ratio > self.fuzzy_threshold).then(|| resolved(header, MatchStrategy::Fuzzy { ratio }))
    }
}

fn resolved(header: &Header, strategy: MatchStrategy) -> ResolvedColumn {
    ResolvedColumn {
        column: header.original.clone(),
        strategy,
    }
}
