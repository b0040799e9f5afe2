//! Imputation Engine.
//!
//! Missing readings are filled with the mean of the same column within the
//! record's group (lot or folio), then with the column's mean over every
//! record. Readings are loaded into a polars frame and filled with a window
//! mean over the group column followed by a whole-column mean. Both means are
//! taken over observed values only, so a value filled in for one record never
//! feeds another record's fill.

use lotmatch_model::{ImputationMask, ProductionRecord};
use polars::prelude::{Column, DataFrame, Expr, IntoLazy, NULL, col, lit, when};
use tracing::debug;

use crate::error::Result;
use crate::production::GroupKey;

const GROUP_COLUMN: &str = "__group";

fn group_value(record: &ProductionRecord, key: GroupKey) -> Option<&str> {
    match key {
        GroupKey::Lot => record.lot.as_deref(),
        GroupKey::Folio => record.folio.as_deref(),
        GroupKey::None => None,
    }
}

fn reading_column(index: usize) -> String {
    format!("r{index}")
}

/// Reading columns plus the group key as a frame.
fn readings_frame(records: &[ProductionRecord], key: GroupKey, width: usize) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(width + 1);
    let groups: Vec<Option<&str>> = records
        .iter()
        .map(|record| group_value(record, key))
        .collect();
    columns.push(Column::new(GROUP_COLUMN.into(), groups));
    for index in 0..width {
        let values: Vec<Option<f64>> = records
            .iter()
            .map(|record| record.reading(index))
            .collect();
        columns.push(Column::new(reading_column(index).into(), values));
    }
    Ok(DataFrame::new(columns)?)
}

/// Group mean first, then the column mean. Both aggregate the original
/// column, so only observed values feed a mean. Rows without a group
/// value skip straight to the column mean.
fn fill_expr(name: &str) -> Expr {
    let group_mean = when(col(GROUP_COLUMN).is_not_null())
        .then(col(name).mean().over([col(GROUP_COLUMN)]))
        .otherwise(lit(NULL));
    col(name)
        .fill_null(group_mean)
        .fill_null(col(name).mean())
        .alias(name)
}

fn column_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(frame.column(name)?.f64()?.into_iter().collect())
}

/// Fills missing readings and reports which cells were synthesized.
///
/// Observed readings are never changed. A column with no observed value
/// anywhere stays `None` and is not flagged, since nothing was synthesized.
pub fn impute(
    mut records: Vec<ProductionRecord>,
    key: GroupKey,
) -> Result<(Vec<ProductionRecord>, ImputationMask)> {
    let width = records
        .iter()
        .map(|record| record.readings.len())
        .max()
        .unwrap_or(0);
    for record in &mut records {
        record.readings.resize(width, None);
    }
    if records.is_empty() || width == 0 {
        let flags = vec![vec![false; width]; records.len()];
        return Ok((records, ImputationMask::new(flags)));
    }

    let frame = readings_frame(&records, key, width)?;
    let names: Vec<String> = (0..width).map(reading_column).collect();
    let filled = frame
        .lazy()
        .with_columns(names.iter().map(|name| fill_expr(name)).collect::<Vec<_>>())
        .collect()?;

    let mut flags = vec![vec![false; width]; records.len()];
    let mut synthesized = 0usize;
    for (index, name) in names.iter().enumerate() {
        for (row, value) in column_values(&filled, name)?.into_iter().enumerate() {
            let reading = &mut records[row].readings[index];
            if reading.is_none() && value.is_some() {
                *reading = value;
                flags[row][index] = true;
                synthesized += 1;
            }
        }
    }

    debug!(
        records = records.len(),
        columns = width,
        filled = synthesized,
        "imputed missing readings"
    );
    Ok((records, ImputationMask::new(flags)))
}
