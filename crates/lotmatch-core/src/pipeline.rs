//! Run orchestration: from loaded tables to a [`MatchReport`].

use std::path::{Path, PathBuf};

use lotmatch_ingest::TableCache;
use lotmatch_map::{AliasTables, ColumnResolver, is_gluten_free, normalize_text};
use lotmatch_model::{
    ImputationMask, LotReport, MatchReport, ParameterAcceptance, ProductionRecord, ReadingSummary,
    SpecDatabase,
};
use tracing::{info, info_span};

use crate::error::Result;
use crate::impute::impute;
use crate::lookup::lookup;
use crate::options::MatchOptions;
use crate::production::{DateRange, ProductionDataset, normalized_product_type};
use crate::scoring::{LotView, ReadingLookup, score_lot};
use crate::specdb::SpecDatabaseBuilder;

/// Header keywords of the technical readings listed next to each lot.
const TECHNICAL_KEYWORDS: &[&str] = &[
    "moisture", "humedad", "thickness", "espesor", "mesh", "malla", "ret", "under", "bajo",
    "over", "sobre", "density", "densidad", "gel", "burnt", "quemada", "peroxid", "acid",
    "matter", "materia",
];

/// Scores every held record of a production dataset.
///
/// The date filter runs first, then imputation over all remaining records,
/// then the held filter. Column resolution uses headers only and is done
/// once for the whole dataset.
pub fn run_matching(
    database: &SpecDatabase,
    mut dataset: ProductionDataset,
    options: &MatchOptions,
    aliases: &AliasTables,
    date_range: &DateRange,
) -> Result<MatchReport> {
    dataset = dataset.filter_dates(date_range);
    let group_key = dataset.group_key();
    let records = std::mem::take(&mut dataset.records);

    let (records, mask) = info_span!("impute").in_scope(|| impute(records, group_key))?;

    let held: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| options.is_held_status(&record.status))
        .map(|(index, _)| index)
        .collect();
    let held_mask = mask.select_rows(held.iter().copied());
    let held_records: Vec<ProductionRecord> = held
        .iter()
        .map(|index| records[*index].clone())
        .collect();
    info!(
        records = records.len(),
        held = held_records.len(),
        "selected held records"
    );

    let mapping = info_span!("resolve_columns").in_scope(|| {
        ColumnResolver::new(aliases, &dataset.headers, &options.resolver_options())
            .resolve(database)
    });

    let family = dataset.family();
    let label_gluten_free = dataset.label_is_gluten_free();
    let lots: Vec<LotReport> = info_span!("score").in_scope(|| {
        held_records
            .iter()
            .enumerate()
            .map(|(row, record)| {
                let reading = |column: &str| reading_lookup(&dataset, record, &held_mask, row, column);
                let product_type = normalized_product_type(record);
                let gluten_free = label_gluten_free
                    || record.condition.as_deref().is_some_and(is_gluten_free);
                let view = LotView {
                    family,
                    gluten_free,
                    product_type: &product_type,
                    reading: &reading,
                };
                let scores = score_lot(&view, database, &mapping, aliases);
                LotReport {
                    row_index: record.row_index,
                    folio: record.display_id(),
                    lot: record.lot.clone(),
                    product_type: record.product_type.clone(),
                    family,
                    gluten_free,
                    hold_reason: record.hold_reason.clone(),
                    origin_client: record.origin_client.clone(),
                    date: record.date,
                    readings: reading_summary(&dataset, record, &held_mask, row),
                    candidates: scores.candidates,
                    rejected: scores.rejected,
                }
            })
            .collect()
    });

    let report = MatchReport {
        source_label: dataset.source_label.clone(),
        specification_count: database.len(),
        records_considered: held_records.len(),
        imputed_cells: held_mask.imputed_count(),
        resolution: mapping.stats(),
        lots,
    };
    info!(
        lots = report.lots.len(),
        with_candidates = report.lots_with_candidates(),
        "matching complete"
    );
    Ok(report)
}

fn reading_lookup(
    dataset: &ProductionDataset,
    record: &ProductionRecord,
    mask: &ImputationMask,
    row: usize,
    column: &str,
) -> ReadingLookup {
    let Some(position) = dataset.reading_position(column) else {
        return ReadingLookup::NotNumeric;
    };
    match record.reading(position) {
        Some(value) => ReadingLookup::Value {
            value,
            imputed: mask.is_imputed(row, position),
        },
        None => ReadingLookup::Missing,
    }
}

/// Technical readings of one record, two decimals each.
fn reading_summary(
    dataset: &ProductionDataset,
    record: &ProductionRecord,
    mask: &ImputationMask,
    row: usize,
) -> Vec<ReadingSummary> {
    dataset
        .reading_columns
        .iter()
        .enumerate()
        .filter(|(_, header)| {
            let normalized = normalize_text(header);
            TECHNICAL_KEYWORDS
                .iter()
                .any(|keyword| normalized.contains(keyword))
        })
        .filter_map(|(position, header)| {
            let value = record.reading(position)?;
            Some(ReadingSummary {
                column: header.clone(),
                display_value: format!("{value:.2}"),
                imputed: mask.is_imputed(row, position),
            })
        })
        .collect()
}

/// Input files for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRequest {
    pub specifications: PathBuf,
    pub production: PathBuf,
    /// Production sheet; the first sheet when `None`.
    pub sheet: Option<String>,
    pub date_range: DateRange,
}

/// Owns configuration and parsed-table caches across runs.
///
/// Specification tables and production sheets are cached separately, each
/// with its own validity window.
pub struct MatchSession {
    options: MatchOptions,
    aliases: AliasTables,
    specification_cache: TableCache,
    production_cache: TableCache,
}

impl MatchSession {
    pub fn new(options: MatchOptions) -> Self {
        let aliases = options.alias_tables();
        Self {
            specification_cache: TableCache::new(options.specification_ttl()),
            production_cache: TableCache::new(options.production_ttl()),
            aliases,
            options,
        }
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    pub fn aliases(&self) -> &AliasTables {
        &self.aliases
    }

    /// Replaces the alias tables used by later runs.
    pub fn set_aliases(&mut self, aliases: AliasTables) {
        self.aliases = aliases;
    }

    pub fn load_specifications(&mut self, path: &Path) -> Result<SpecDatabase> {
        let _span = info_span!("load_specifications", path = %path.display()).entered();
        let loaded =
            self.specification_cache
                .load(path, None, self.options.specification_header_row)?;
        SpecDatabaseBuilder::new(&self.options).build(&loaded.table)
    }

    pub fn load_production(&mut self, path: &Path, sheet: Option<&str>) -> Result<ProductionDataset> {
        let _span = info_span!("load_production", path = %path.display()).entered();
        let loaded = self
            .production_cache
            .load(path, sheet, self.options.production_header_row)?;
        ProductionDataset::from_loaded(&loaded)
    }

    pub fn run(&mut self, request: &MatchRequest) -> Result<MatchReport> {
        let database = self.load_specifications(&request.specifications)?;
        let dataset = self.load_production(&request.production, request.sheet.as_deref())?;
        run_matching(
            &database,
            dataset,
            &self.options,
            &self.aliases,
            &request.date_range,
        )
    }

    pub fn lookup(
        &mut self,
        specifications: &Path,
        query: &str,
        value: f64,
    ) -> Result<Vec<ParameterAcceptance>> {
        let database = self.load_specifications(specifications)?;
        Ok(lookup(&database, query, value))
    }
}
