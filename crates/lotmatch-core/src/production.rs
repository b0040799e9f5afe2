//! Production dataset assembly.
//!
//! The fixed metadata columns (status, lot, folio, condition, product type,
//! origin client, hold reason, date) are located by keyword; every other
//! column is a candidate numeric reading.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use lotmatch_ingest::{LoadedTable, RawTable};
use lotmatch_map::{detect_family, is_gluten_free, normalize_text};
use lotmatch_model::{CellValue, Family, ProductionRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::columns::{FieldRule, HeaderIndex};
use crate::error::{CoreError, Result};

const STATUS_FIELD: FieldRule = FieldRule {
    field: "status",
    keywords: &["estado", "status"],
};

const OPTIONAL_FIELDS: [FieldRule; 7] = [
    FieldRule {
        field: "lot",
        keywords: &["lote", "batch", "lot"],
    },
    FieldRule {
        field: "folio",
        keywords: &["folio", "id muestra", "sample id"],
    },
    FieldRule {
        field: "condition",
        keywords: &["condicion", "condition", "gf"],
    },
    FieldRule {
        field: "product type",
        keywords: &["tipo de producto", "product type", "variedad", "variety"],
    },
    FieldRule {
        field: "origin client",
        keywords: &["cliente", "customer", "client"],
    },
    FieldRule {
        field: "hold reason",
        keywords: &["motivo", "razon", "reason"],
    },
    FieldRule {
        field: "date",
        keywords: &["fecha etiqueta", "fecha produccion", "date", "fecha"],
    },
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Positions of the metadata columns in the production table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionColumns {
    pub status: usize,
    pub lot: Option<usize>,
    pub folio: Option<usize>,
    pub condition: Option<usize>,
    pub product_type: Option<usize>,
    pub origin_client: Option<usize>,
    pub hold_reason: Option<usize>,
    pub date: Option<usize>,
}

impl ProductionColumns {
    /// Locates metadata columns. Only the status column is required.
    pub fn locate(headers: &[String]) -> Result<Self> {
        let index = HeaderIndex::new(headers);
        let status = index
            .find(&STATUS_FIELD)
            .ok_or_else(|| CoreError::Configuration {
                table: "production",
                missing: vec![STATUS_FIELD.field],
            })?;
        let [lot, folio, condition, product_type, origin_client, hold_reason, date] =
            OPTIONAL_FIELDS.map(|rule| index.find(&rule).filter(|column| *column != status));
        Ok(Self {
            status,
            lot,
            folio,
            condition,
            product_type,
            origin_client,
            hold_reason,
            date,
        })
    }

    fn is_metadata(&self, column: usize) -> bool {
        column == self.status
            || [
                self.lot,
                self.folio,
                self.condition,
                self.product_type,
                self.origin_client,
                self.hold_reason,
                self.date,
            ]
            .contains(&Some(column))
    }
}

/// Inclusive date window. An open bound does not restrict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Unknown dates never fall inside an active range.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Which identifier groups records for imputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Lot,
    Folio,
    None,
}

/// A production sheet split into metadata and numeric readings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionDataset {
    /// Sheet name (or file stem); drives the lot family and GF context.
    pub source_label: String,
    pub headers: Vec<String>,
    pub columns: ProductionColumns,
    /// Headers of the reading columns, in sheet order. Aligned with
    /// [`ProductionRecord::readings`].
    pub reading_columns: Vec<String>,
    pub records: Vec<ProductionRecord>,
    reading_index: HashMap<String, usize>,
}

impl ProductionDataset {
    pub fn from_loaded(loaded: &LoadedTable) -> Result<Self> {
        Self::from_table(&loaded.source_label, &loaded.table)
    }

    pub fn from_table(source_label: &str, table: &RawTable) -> Result<Self> {
        let columns = ProductionColumns::locate(&table.headers)?;
        let reading_positions: Vec<usize> = (0..table.headers.len())
            .filter(|column| !columns.is_metadata(*column))
            .collect();
        let reading_columns: Vec<String> = reading_positions
            .iter()
            .map(|column| table.headers[*column].clone())
            .collect();

        let records: Vec<ProductionRecord> = table
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| build_record(row_index, row, &columns, &reading_positions))
            .collect();

        let mut reading_index = HashMap::new();
        for (position, header) in reading_columns.iter().enumerate() {
            reading_index.entry(header.clone()).or_insert(position);
        }

        info!(
            source = %source_label,
            records = records.len(),
            readings = reading_columns.len(),
            "production dataset loaded"
        );
        Ok(Self {
            source_label: source_label.to_string(),
            headers: table.headers.clone(),
            columns,
            reading_columns,
            records,
            reading_index,
        })
    }

    /// Reading position for a header, `None` for metadata or unknown headers.
    pub fn reading_position(&self, header: &str) -> Option<usize> {
        self.reading_index.get(header).copied()
    }

    /// Lot family implied by the source label.
    pub fn family(&self) -> Family {
        detect_family(&self.source_label)
    }

    /// Whether the source label itself marks gluten-free production.
    pub fn label_is_gluten_free(&self) -> bool {
        is_gluten_free(&self.source_label)
    }

    /// Lot column when present, else folio column.
    pub fn group_key(&self) -> GroupKey {
        if self.columns.lot.is_some() {
            GroupKey::Lot
        } else if self.columns.folio.is_some() {
            GroupKey::Folio
        } else {
            GroupKey::None
        }
    }

    /// Keeps records whose date falls in the range.
    pub fn filter_dates(mut self, range: &DateRange) -> Self {
        if self.columns.date.is_none() || !range.is_active() {
            return self;
        }
        let before = self.records.len();
        self.records.retain(|record| range.contains(record.date));
        debug!(
            before,
            after = self.records.len(),
            "applied production date filter"
        );
        self
    }
}

fn build_record(
    row_index: usize,
    row: &[CellValue],
    columns: &ProductionColumns,
    reading_positions: &[usize],
) -> ProductionRecord {
    let text = |column: Option<usize>| column.and_then(|column| row.get(column)?.as_text_non_empty());
    ProductionRecord {
        row_index,
        folio: text(columns.folio),
        lot: text(columns.lot),
        status: text(Some(columns.status)).unwrap_or_default(),
        product_type: text(columns.product_type),
        condition: text(columns.condition),
        origin_client: text(columns.origin_client),
        hold_reason: text(columns.hold_reason),
        date: columns
            .date
            .and_then(|column| row.get(column))
            .and_then(parse_date),
        readings: reading_positions
            .iter()
            .map(|column| row.get(*column).and_then(CellValue::as_f64))
            .collect(),
    }
}

/// Date coercion for a cell. Unparseable values are unknown dates.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::DateTime(value) => Some(value.date()),
        CellValue::Text(text) => parse_date_text(text.trim()),
        CellValue::Empty | CellValue::Number(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|value| value.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        })
}

/// Normalized product type of a record, empty when absent.
pub fn normalized_product_type(record: &ProductionRecord) -> String {
    record
        .product_type
        .as_deref()
        .map(normalize_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| CellValue::from_text(cell)).collect())
                .collect(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn splits_metadata_from_readings() {
        let table = table(
            &["Folio", "N° Lote", "Estado", "Fecha Etiqueta", "Humedad", "Espesor"],
            &[&["F-1", "L-1", "Retenido", "05/03/2024", "11.2", "abc"]],
        );
        let dataset = ProductionDataset::from_table("Hojuela GF", &table).expect("dataset");
        assert_eq!(dataset.columns.status, 2);
        assert_eq!(dataset.columns.lot, Some(1));
        assert_eq!(dataset.columns.date, Some(3));
        assert_eq!(dataset.reading_columns, vec!["Humedad", "Espesor"]);
        assert_eq!(dataset.reading_position("Espesor"), Some(1));
        assert_eq!(dataset.reading_position("Estado"), None);

        let record = &dataset.records[0];
        assert_eq!(record.lot.as_deref(), Some("L-1"));
        assert_eq!(record.date, Some(date(2024, 3, 5)));
        assert_eq!(record.readings, vec![Some(11.2), None]);
        assert_eq!(dataset.family(), Family::Flake);
        assert!(dataset.label_is_gluten_free());
        assert_eq!(dataset.group_key(), GroupKey::Lot);
    }

    #[test]
    fn status_column_is_required() {
        let table = table(&["Folio", "Humedad"], &[]);
        let err = ProductionDataset::from_table("Hoja", &table).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Configuration { table: "production", ref missing } if missing == &vec!["status"]
        ));
    }

    #[test]
    fn date_range_is_inclusive_and_excludes_unknown_dates() {
        let range = DateRange::new(Some(date(2024, 3, 1)), Some(date(2024, 3, 31)));
        assert!(range.contains(Some(date(2024, 3, 1))));
        assert!(range.contains(Some(date(2024, 3, 31))));
        assert!(!range.contains(Some(date(2024, 4, 1))));
        assert!(!range.contains(None));
        assert!(DateRange::default().contains(None));
    }

    #[test]
    fn date_filter_without_date_column_is_a_no_op() {
        let table = table(&["Folio", "Estado"], &[&["F-1", "Retenido"]]);
        let dataset = ProductionDataset::from_table("Hoja", &table).expect("dataset");
        let range = DateRange::new(Some(date(2024, 1, 1)), None);
        assert_eq!(dataset.filter_dates(&range).records.len(), 1);
    }

    #[test]
    fn parses_common_date_shapes() {
        assert_eq!(
            parse_date(&CellValue::Text("2024-03-05 08:00:00".to_string())),
            Some(date(2024, 3, 5))
        );
        assert_eq!(
            parse_date(&CellValue::Text("05-03-2024".to_string())),
            Some(date(2024, 3, 5))
        );
        assert_eq!(parse_date(&CellValue::Text("soon".to_string())), None);
    }
}
