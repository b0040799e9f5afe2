//! Specification Database Builder.
//!
//! One specification table row per (client, product code, parameter). Rows
//! are grouped by code; the first row of a group describes the product and
//! every analysis row contributes one accepted range.

use std::collections::BTreeMap;

use lotmatch_ingest::RawTable;
use lotmatch_map::{classify_parameter_kind, is_gluten_free, normalize_text, specification_family};
use lotmatch_model::{CellValue, ClientSpecification, ParameterSpec, SpecDatabase};
use tracing::{debug, info, warn};

use crate::columns::{FieldRule, HeaderIndex, find_required};
use crate::error::{CoreError, Result};
use crate::options::MatchOptions;

const REQUIRED_FIELDS: [FieldRule; 7] = [
    FieldRule {
        field: "code",
        keywords: &["codigo ft", "spec code", "code", "cod"],
    },
    FieldRule {
        field: "client",
        keywords: &["cliente", "client", "customer"],
    },
    FieldRule {
        field: "product",
        keywords: &["producto", "product", "descripcion", "description"],
    },
    FieldRule {
        field: "type",
        keywords: &["tipo", "type"],
    },
    FieldRule {
        field: "parameter",
        keywords: &["analisis", "analysis", "parametro", "parameter"],
    },
    FieldRule {
        field: "minimum",
        keywords: &["min", "minimo"],
    },
    FieldRule {
        field: "maximum",
        keywords: &["max", "maximo"],
    },
];

const FAMILY_FIELD: FieldRule = FieldRule {
    field: "family",
    keywords: &["familia", "family"],
};

const FREQUENCY_FIELD: FieldRule = FieldRule {
    field: "frequency",
    keywords: &["frecuencia", "frequency"],
};

/// Column positions of the specification table.
#[derive(Debug, Clone, Copy)]
struct SpecColumns {
    code: usize,
    client: usize,
    product: usize,
    row_type: usize,
    parameter: usize,
    minimum: usize,
    maximum: usize,
    family: Option<usize>,
    frequency: Option<usize>,
}

impl SpecColumns {
    fn locate(headers: &[String]) -> Result<Self> {
        let index = HeaderIndex::new(headers);
        let [code, client, product, row_type, parameter, minimum, maximum] =
            find_required(&index, &REQUIRED_FIELDS).map_err(|missing| {
                CoreError::Configuration {
                    table: "specification",
                    missing,
                }
            })?;
        Ok(Self {
            code,
            client,
            product,
            row_type,
            parameter,
            minimum,
            maximum,
            family: index.find(&FAMILY_FIELD),
            frequency: index.find(&FREQUENCY_FIELD),
        })
    }
}

/// Builds a [`SpecDatabase`] from a loaded specification table.
pub struct SpecDatabaseBuilder<'a> {
    options: &'a MatchOptions,
}

impl<'a> SpecDatabaseBuilder<'a> {
    pub fn new(options: &'a MatchOptions) -> Self {
        Self { options }
    }

    /// Fails with [`CoreError::Configuration`] when a required column is
    /// missing; otherwise never fails. Placeholder clients and codes
    /// without analysis rows are left out.
    pub fn build(&self, table: &RawTable) -> Result<SpecDatabase> {
        let columns = SpecColumns::locate(&table.headers)?;

        let mut groups: BTreeMap<String, Vec<&[CellValue]>> = BTreeMap::new();
        for row in &table.rows {
            let code = text(row, columns.code);
            if code.is_empty() {
                continue;
            }
            groups.entry(code).or_default().push(row.as_slice());
        }

        let mut database = SpecDatabase::new();
        for (code, rows) in groups {
            if let Some(specification) = self.build_specification(&code, &rows, &columns) {
                database.insert(specification);
            }
        }
        info!(
            specifications = database.len(),
            parameters = database.parameter_count(),
            "specification database built"
        );
        Ok(database)
    }

    fn build_specification(
        &self,
        code: &str,
        rows: &[&[CellValue]],
        columns: &SpecColumns,
    ) -> Option<ClientSpecification> {
        let first = rows.first()?;
        let client = text(first, columns.client);
        if self.options.is_placeholder_client(&client) {
            warn!(code, client = %client, "skipping placeholder client");
            return None;
        }

        let family_label = columns
            .family
            .map(|column| text(first, column))
            .unwrap_or_default();
        let product_text = text(first, columns.product);
        let product_normalized = normalize_text(&product_text);
        let family = specification_family(&family_label, &product_normalized);
        let is_gluten_free = is_gluten_free(&family_label) || is_gluten_free(&product_text);

        let parameters: Vec<ParameterSpec> = rows
            .iter()
            .filter(|row| self.options.is_analysis_row(&text(row, columns.row_type)))
            .filter_map(|row| parameter_spec(code, row, columns))
            .collect();
        if parameters.is_empty() {
            warn!(code, client = %client, "dropping specification without analysis rows");
            return None;
        }

        debug!(
            code,
            client = %client,
            family = %family,
            gluten_free = is_gluten_free,
            parameters = parameters.len(),
            "specification loaded"
        );
        Some(ClientSpecification {
            code: code.to_string(),
            client,
            family,
            product_text,
            product_normalized,
            is_gluten_free,
            parameters,
        })
    }
}

/// One analysis row as a parameter range; rows without a parameter name are skipped.
fn parameter_spec(code: &str, row: &[CellValue], columns: &SpecColumns) -> Option<ParameterSpec> {
    let name = text(row, columns.parameter);
    let normalized_name = normalize_text(&name);
    if normalized_name.is_empty() {
        return None;
    }
    let mut min = cell(row, columns.minimum).as_f64().unwrap_or(0.0);
    let mut max = cell(row, columns.maximum)
        .as_f64()
        .unwrap_or(f64::INFINITY);
    if min > max {
        warn!(code, parameter = %name, min, max, "swapping inverted range bounds");
        std::mem::swap(&mut min, &mut max);
    }
    let frequency = columns
        .frequency
        .and_then(|column| cell(row, column).as_text_non_empty());
    Some(ParameterSpec {
        kind: classify_parameter_kind(&normalized_name),
        name,
        normalized_name,
        min,
        max,
        frequency,
    })
}

fn cell(row: &[CellValue], column: usize) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    row.get(column).unwrap_or(EMPTY)
}

fn text(row: &[CellValue], column: usize) -> String {
    cell(row, column).as_text().trim().to_string()
}
