//! Held-lot production data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the production dataset.
///
/// `readings` is aligned with the owning dataset's reading columns. A `None`
/// reading is a cell that was empty or failed numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Zero-based position of the row below the header in the source sheet.
    pub row_index: usize,
    pub folio: Option<String>,
    pub lot: Option<String>,
    pub status: String,
    pub product_type: Option<String>,
    pub condition: Option<String>,
    pub origin_client: Option<String>,
    pub hold_reason: Option<String>,
    pub date: Option<NaiveDate>,
    pub readings: Vec<Option<f64>>,
}

impl ProductionRecord {
    pub fn reading(&self, column: usize) -> Option<f64> {
        self.readings.get(column).copied().flatten()
    }

    /// Label used when a record has neither folio nor lot.
    pub fn display_id(&self) -> String {
        self.folio
            .clone()
            .or_else(|| self.lot.clone())
            .unwrap_or_else(|| format!("row {}", self.row_index + 1))
    }
}

/// Which readings were synthesized by imputation.
///
/// `flags[row][column]` is `true` iff that reading was filled in rather than
/// observed. Rows follow the record order the mask was computed for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationMask {
    flags: Vec<Vec<bool>>,
}

impl ImputationMask {
    pub fn new(flags: Vec<Vec<bool>>) -> Self {
        Self { flags }
    }

    pub fn is_imputed(&self, row: usize, column: usize) -> bool {
        self.flags
            .get(row)
            .and_then(|flags| flags.get(column))
            .copied()
            .unwrap_or(false)
    }

    pub fn row(&self, row: usize) -> &[bool] {
        self.flags.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> usize {
        self.flags.len()
    }

    pub fn imputed_count(&self) -> usize {
        self.flags.iter().flatten().filter(|flag| **flag).count()
    }

    /// Keeps only the rows whose index is yielded by `keep`, in that order.
    pub fn select_rows(&self, keep: impl IntoIterator<Item = usize>) -> Self {
        let flags = keep
            .into_iter()
            .map(|row| self.row(row).to_vec())
            .collect();
        Self { flags }
    }
}
