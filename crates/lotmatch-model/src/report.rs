//! Structured results handed to presentation layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateMatch, SpecificationEvaluation};
use crate::mapping::ResolutionStats;
use crate::spec::Family;

/// A technical reading shown next to a lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSummary {
    pub column: String,
    /// Two-decimal rendering of the value.
    pub display_value: String,
    pub imputed: bool,
}

/// Ranked candidates for one held lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotReport {
    pub row_index: usize,
    pub folio: String,
    pub lot: Option<String>,
    pub product_type: Option<String>,
    pub family: Family,
    pub gluten_free: bool,
    pub hold_reason: Option<String>,
    pub origin_client: Option<String>,
    pub date: Option<NaiveDate>,
    pub readings: Vec<ReadingSummary>,
    pub candidates: Vec<CandidateMatch>,
    /// Gated-in specifications that did not become candidates, in code order.
    #[serde(default)]
    pub rejected: Vec<SpecificationEvaluation>,
}

impl LotReport {
    pub fn best_candidate(&self) -> Option<&CandidateMatch> {
        self.candidates.first()
    }

    /// True when the top candidate also matched the lot's product type.
    pub fn best_is_type_match(&self) -> bool {
        self.best_candidate()
            .is_some_and(|candidate| candidate.type_match_level() > 0)
    }
}

/// Result of one matching run over a production dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub source_label: String,
    pub specification_count: usize,
    pub records_considered: usize,
    pub imputed_cells: usize,
    pub resolution: ResolutionStats,
    pub lots: Vec<LotReport>,
}

impl MatchReport {
    pub fn lots_with_candidates(&self) -> usize {
        self.lots
            .iter()
            .filter(|lot| !lot.candidates.is_empty())
            .count()
    }
}

/// A specification parameter that accepts a queried value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAcceptance {
    pub code: String,
    pub client: String,
    pub product: String,
    pub parameter_name: String,
    pub range: String,
}
