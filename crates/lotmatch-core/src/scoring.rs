//! Compatibility Scoring Engine.
//!
//! For one held lot, every specification is gated on gluten-free status and
//! family, then each of its parameters is checked against the lot's reading
//! in the resolved column. A single out-of-range or unreadable value
//! disqualifies the specification; unresolved parameters are only reported.

use std::cmp::Ordering;

use lotmatch_map::AliasTables;
use lotmatch_model::{
    CandidateMatch, ClientSpecification, ColumnMapping, Family, ParameterDetail, ParameterStatus,
    SpecDatabase, SpecificationEvaluation,
};
use tracing::debug;

/// Why a specification was excluded before any parameter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    GlutenFree,
    CrossFamily,
    Family,
}

impl GateRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlutenFree => "gluten-free status differs",
            Self::CrossFamily => "flake and flour never mix",
            Self::Family => "family differs",
        }
    }
}

/// Families that accept each other's lots.
fn interchangeable(a: Family, b: Family) -> bool {
    let pair = [Family::Flake, Family::Pillow];
    pair.contains(&a) && pair.contains(&b)
}

/// Gating rules applied before any parameter check.
pub fn gate(
    lot_family: Family,
    lot_gluten_free: bool,
    specification: &ClientSpecification,
) -> Result<(), GateRejection> {
    if lot_gluten_free != specification.is_gluten_free {
        return Err(GateRejection::GlutenFree);
    }
    let spec_family = specification.family;
    if matches!(
        (lot_family, spec_family),
        (Family::Flake, Family::Flour) | (Family::Flour, Family::Flake)
    ) {
        return Err(GateRejection::CrossFamily);
    }
    if lot_family.is_determined()
        && spec_family.is_determined()
        && spec_family != lot_family
        && !interchangeable(lot_family, spec_family)
    {
        return Err(GateRejection::Family);
    }
    Ok(())
}

/// Everything the scorer needs to know about one held lot.
#[derive(Clone, Copy)]
pub struct LotView<'a> {
    pub family: Family,
    pub gluten_free: bool,
    /// Normalized product type, empty when unknown.
    pub product_type: &'a str,
    /// Reading lookup by production header.
    pub reading: &'a dyn Fn(&str) -> ReadingLookup,
}

/// A lot's value in one production column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingLookup {
    Value { value: f64, imputed: bool },
    /// Reading column with no value, even after imputation.
    Missing,
    /// Not a reading column (metadata or unknown header).
    NotNumeric,
}

/// Outcome of scoring one lot against the whole database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotScores {
    /// Ranked best first.
    pub candidates: Vec<CandidateMatch>,
    /// Gated-in specifications that did not qualify, in code order.
    pub rejected: Vec<SpecificationEvaluation>,
}

/// Scores one lot against every specification.
///
/// Gated-out specifications appear in neither list.
pub fn score_lot(
    lot: &LotView<'_>,
    database: &SpecDatabase,
    mapping: &ColumnMapping,
    aliases: &AliasTables,
) -> LotScores {
    let mut scores = LotScores::default();
    for specification in database.iter() {
        if let Err(rejection) = gate(lot.family, lot.gluten_free, specification) {
            debug!(
                code = %specification.code,
                reason = rejection.as_str(),
                "specification gated out"
            );
            continue;
        }
        let evaluation = evaluate(lot, specification, mapping);
        if evaluation.is_candidate() {
            let type_match = aliases.type_match(lot.product_type, &specification.product_normalized);
            scores.candidates.push(evaluation.into_candidate(type_match));
        } else {
            debug!(
                code = %specification.code,
                compatible = evaluation.compatible,
                evaluated = evaluation.evaluated_count,
                "specification not a candidate"
            );
            scores.rejected.push(evaluation);
        }
    }
    rank(&mut scores.candidates);
    scores
}

/// Checks every parameter of a gated-in specification against the lot.
///
/// All parameters are evaluated even after a disqualifying one, so the
/// details always cover the whole specification.
pub fn evaluate(
    lot: &LotView<'_>,
    specification: &ClientSpecification,
    mapping: &ColumnMapping,
) -> SpecificationEvaluation {
    let mut matched_count = 0usize;
    let mut evaluated_count = 0usize;
    let mut compatible = true;
    let mut details = Vec::with_capacity(specification.parameters.len());

    for parameter in &specification.parameters {
        let resolved = mapping.get(&specification.code, &parameter.name);
        let (status, display_value, imputed) = match resolved {
            None => (ParameterStatus::NotFound, "---".to_string(), false),
            Some(column) => {
                evaluated_count += 1;
                match (lot.reading)(&column.column) {
                    ReadingLookup::Value { value, imputed } => {
                        let status = if parameter.accepts(value) {
                            matched_count += 1;
                            ParameterStatus::Pass
                        } else {
                            ParameterStatus::Fail
                        };
                        (status, format!("{value:.2}"), imputed)
                    }
                    ReadingLookup::Missing | ReadingLookup::NotNumeric => {
                        (ParameterStatus::ValueError, "n/a".to_string(), false)
                    }
                }
            }
        };
        if status.disqualifies() {
            compatible = false;
        }
        details.push(ParameterDetail {
            parameter_name: parameter.name.clone(),
            range: parameter.range_label(),
            resolved_column: resolved.map(|column| column.column.clone()),
            display_value,
            imputed,
            status,
        });
    }

    SpecificationEvaluation {
        code: specification.code.clone(),
        client: specification.client.clone(),
        product: specification.product_text.clone(),
        matched_count,
        evaluated_count,
        compatible,
        details,
    }
}

/// Stable descending sort by (type match, score, evaluated count).
pub fn rank(candidates: &mut [CandidateMatch]) {
    candidates.sort_by(compare_candidates);
}

fn compare_candidates(a: &CandidateMatch, b: &CandidateMatch) -> Ordering {
    b.type_match
        .cmp(&a.type_match)
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.evaluated_count.cmp(&a.evaluated_count))
}
