//! Scoring output: candidates and their per-parameter evidence.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of checking one parameter against a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterStatus {
    Pass,
    Fail,
    NotFound,
    ValueError,
}

impl ParameterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::NotFound => "not found",
            Self::ValueError => "value error",
        }
    }

    /// Statuses that disqualify the owning specification.
    pub fn disqualifies(&self) -> bool {
        matches!(self, Self::Fail | Self::ValueError)
    }
}

impl fmt::Display for ParameterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How well the lot's product type matches the specification's product text.
///
/// Ordered so that a stronger match compares greater.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TypeMatch {
    #[default]
    None,
    Synonym,
    Direct,
}

impl TypeMatch {
    /// Numeric level: 0 none, 1 synonym, 2 direct.
    pub fn level(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Synonym => 1,
            Self::Direct => 2,
        }
    }
}

/// One evaluated parameter of a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDetail {
    pub parameter_name: String,
    pub range: String,
    /// Production header the value came from, `None` when unresolved.
    pub resolved_column: Option<String>,
    pub display_value: String,
    /// True when the value shown was synthesized by imputation.
    pub imputed: bool,
    pub status: ParameterStatus,
}

/// Every parameter check of one specification that passed gating.
///
/// Kept whether or not the specification became a candidate, so a report
/// can show which reading excluded a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificationEvaluation {
    pub code: String,
    pub client: String,
    pub product: String,
    pub matched_count: usize,
    pub evaluated_count: usize,
    /// False once any parameter failed or had no usable value.
    pub compatible: bool,
    pub details: Vec<ParameterDetail>,
}

impl SpecificationEvaluation {
    /// Compatible through every parameter, with at least one evaluated.
    pub fn is_candidate(&self) -> bool {
        self.compatible && self.evaluated_count > 0
    }

    /// Percentage of evaluated parameters that passed, 0 when none was evaluated.
    pub fn score(&self) -> f64 {
        if self.evaluated_count == 0 {
            return 0.0;
        }
        self.matched_count as f64 / self.evaluated_count as f64 * 100.0
    }

    /// Details that disqualified the specification.
    pub fn disqualifying(&self) -> impl Iterator<Item = &ParameterDetail> {
        self.details
            .iter()
            .filter(|detail| detail.status.disqualifies())
    }

    /// Converts into a ranked candidate. Callers check [`Self::is_candidate`] first.
    pub fn into_candidate(self, type_match: TypeMatch) -> CandidateMatch {
        CandidateMatch {
            score: self.score(),
            code: self.code,
            client: self.client,
            product: self.product,
            type_match,
            matched_count: self.matched_count,
            evaluated_count: self.evaluated_count,
            details: self.details,
        }
    }
}

/// A specification that survived gating and every parameter check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub code: String,
    pub client: String,
    pub product: String,
    /// Percentage of evaluated parameters that passed.
    pub score: f64,
    pub type_match: TypeMatch,
    pub matched_count: usize,
    pub evaluated_count: usize,
    pub details: Vec<ParameterDetail>,
}

impl CandidateMatch {
    pub fn type_match_level(&self) -> u8 {
        self.type_match.level()
    }

    /// `"matched/evaluated"`.
    pub fn match_ratio(&self) -> String {
        format!("{}/{}", self.matched_count, self.evaluated_count)
    }
}
