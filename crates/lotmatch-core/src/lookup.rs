//! Single-parameter lookup: which clients accept a given value.

use lotmatch_map::normalize_text;
use lotmatch_model::{ParameterAcceptance, SpecDatabase};

/// Every parameter whose normalized name contains the query and whose
/// range accepts `value`, sorted by client then code.
///
/// A query that normalizes to nothing matches nothing.
pub fn lookup(database: &SpecDatabase, query: &str, value: f64) -> Vec<ParameterAcceptance> {
    let query = normalize_text(query);
    if query.is_empty() || value.is_nan() {
        return Vec::new();
    }
    let mut accepted: Vec<ParameterAcceptance> = database
        .iter()
        .flat_map(|specification| {
            specification
                .parameters
                .iter()
                .filter(|parameter| {
                    parameter.normalized_name.contains(&query) && parameter.accepts(value)
                })
                .map(move |parameter| ParameterAcceptance {
                    code: specification.code.clone(),
                    client: specification.client.clone(),
                    product: specification.product_text.clone(),
                    parameter_name: parameter.name.clone(),
                    range: parameter.range_label(),
                })
        })
        .collect();
    accepted.sort_by(|a, b| a.client.cmp(&b.client).then_with(|| a.code.cmp(&b.code)));
    accepted
}
