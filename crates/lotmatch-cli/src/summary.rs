//! Terminal rendering of match reports.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use lotmatch_model::{
    CandidateMatch, LotReport, MatchReport, ParameterAcceptance, ParameterDetail, ParameterStatus,
    SpecificationEvaluation,
};

/// Marks a type-matched client and an imputed value.
const TYPE_MATCH_MARK: &str = "*";
const IMPUTED_MARK: &str = " (imputed)";

pub fn print_match_report(report: &MatchReport, top: Option<usize>, details: bool) {
    println!("Source: {}", report.source_label);
    println!("{}", report_counts_line(report));
    println!("{}", resolution_line(report));
    for lot in &report.lots {
        println!();
        println!("{}", lot_heading(lot));
        let readings = readings_line(lot);
        if !readings.is_empty() {
            println!("  Readings: {readings}");
        }
        if lot.candidates.is_empty() {
            println!("  No compatible specification.");
        } else {
            println!("{}", candidate_table(lot, top));
        }
        if !details {
            continue;
        }
        for candidate in shown_candidates(lot, top) {
            let title = format!("{} {}", candidate.code, candidate.client);
            println!("{}", detail_table(&title, &candidate.details));
        }
        for evaluation in &lot.rejected {
            println!("  Excluded {}", rejection_line(evaluation));
            println!("{}", detail_table(&evaluation.code, &evaluation.details));
        }
    }
}

pub fn print_sheets(sheets: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Sheet")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, sheet) in sheets.iter().enumerate() {
        table.add_row(vec![Cell::new(index + 1), Cell::new(sheet)]);
    }
    println!("{table}");
}

pub fn print_lookup(parameter: &str, value: f64, hits: &[ParameterAcceptance]) {
    if hits.is_empty() {
        println!("No specification accepts {parameter} = {value}.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Client"),
        header_cell("Code"),
        header_cell("Product"),
        header_cell("Parameter"),
        header_cell("Range"),
    ]);
    apply_table_style(&mut table);
    for hit in hits {
        table.add_row(vec![
            Cell::new(&hit.client).add_attribute(Attribute::Bold),
            Cell::new(&hit.code),
            Cell::new(&hit.product),
            Cell::new(&hit.parameter_name),
            Cell::new(&hit.range),
        ]);
    }
    println!("{table}");
}

/// `"3 held lots, 2 with candidates, 4 imputed cells, 12 specifications"`.
pub fn report_counts_line(report: &MatchReport) -> String {
    format!(
        "{} held lots, {} with candidates, {} imputed cells, {} specifications",
        report.records_considered,
        report.lots_with_candidates(),
        report.imputed_cells,
        report.specification_count
    )
}

/// Resolved parameter counts per strategy, then unresolved.
pub fn resolution_line(report: &MatchReport) -> String {
    let stats = &report.resolution;
    let mut parts: Vec<String> = stats
        .by_strategy
        .iter()
        .map(|(strategy, count)| format!("{strategy} {count}"))
        .collect();
    parts.push(format!("unresolved {}", stats.unresolved));
    format!("Columns: {}", parts.join(", "))
}

/// One-line identity of a held lot.
pub fn lot_heading(lot: &LotReport) -> String {
    let mut parts = vec![format!("Lot {}", lot.folio)];
    if let Some(id) = lot.lot.as_deref().filter(|id| *id != lot.folio) {
        parts.push(format!("batch {id}"));
    }
    if let Some(product_type) = &lot.product_type {
        parts.push(product_type.clone());
    }
    parts.push(lot.family.to_string());
    if lot.gluten_free {
        parts.push("gluten-free".to_string());
    }
    if let Some(date) = lot.date {
        parts.push(date.format("%Y-%m-%d").to_string());
    }
    if let Some(reason) = &lot.hold_reason {
        parts.push(format!("held: {reason}"));
    }
    if let Some(client) = &lot.origin_client {
        parts.push(format!("from {client}"));
    }
    let mut heading = parts.join(" | ");
    if let Some(best) = lot.best_candidate() {
        let mark = if lot.best_is_type_match() {
            TYPE_MATCH_MARK
        } else {
            ""
        };
        heading.push_str(&format!(" -> {}{mark}", best.client));
    }
    heading
}

/// Technical readings as `"name value"` pairs, imputed ones marked.
pub fn readings_line(lot: &LotReport) -> String {
    lot.readings
        .iter()
        .map(|reading| {
            let mark = if reading.imputed { IMPUTED_MARK } else { "" };
            format!("{} {}{mark}", reading.column, reading.display_value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a gated-in specification is not a candidate.
pub fn rejection_line(evaluation: &SpecificationEvaluation) -> String {
    let reasons: Vec<String> = evaluation
        .disqualifying()
        .map(|detail| {
            format!(
                "{} {} ({})",
                detail.parameter_name, detail.status, detail.display_value
            )
        })
        .collect();
    let reason = if reasons.is_empty() {
        "no parameter found in production".to_string()
    } else {
        reasons.join(", ")
    };
    format!("{} {}: {reason}", evaluation.code, evaluation.client)
}

fn shown_candidates(lot: &LotReport, top: Option<usize>) -> &[CandidateMatch] {
    let shown = top.unwrap_or(lot.candidates.len()).min(lot.candidates.len());
    &lot.candidates[..shown]
}

fn candidate_table(lot: &LotReport, top: Option<usize>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Client"),
        header_cell("Code"),
        header_cell("Product"),
        header_cell("Type"),
        header_cell("Score"),
        header_cell("Matched"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    for (rank, candidate) in shown_candidates(lot, top).iter().enumerate() {
        let client = if candidate.type_match_level() > 0 {
            Cell::new(format!("{}{TYPE_MATCH_MARK}", candidate.client))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new(&candidate.client).add_attribute(Attribute::Bold)
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            client,
            Cell::new(&candidate.code),
            Cell::new(&candidate.product),
            Cell::new(candidate.type_match_level()),
            Cell::new(format!("{:.0}", candidate.score)),
            Cell::new(candidate.match_ratio()),
        ]);
    }
    let hidden = lot.candidates.len() - shown_candidates(lot, top).len();
    if hidden > 0 {
        table.add_row(vec![
            dim_cell("-"),
            dim_cell(format!("{hidden} more")),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    table
}

fn detail_table(title: &str, details: &[ParameterDetail]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(title),
        header_cell("Range"),
        header_cell("Column"),
        header_cell("Value"),
        header_cell("Status"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for detail in details {
        let value = if detail.imputed {
            Cell::new(format!("{}{IMPUTED_MARK}", detail.display_value)).fg(Color::Yellow)
        } else {
            Cell::new(&detail.display_value)
        };
        table.add_row(vec![
            Cell::new(&detail.parameter_name),
            Cell::new(&detail.range),
            match &detail.resolved_column {
                Some(column) => Cell::new(column),
                None => dim_cell("-"),
            },
            value,
            status_cell(detail.status),
        ]);
    }
    table
}

fn status_cell(status: ParameterStatus) -> Cell {
    match status {
        ParameterStatus::Pass => Cell::new("PASS").fg(Color::Green),
        ParameterStatus::Fail => Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        ParameterStatus::ValueError => Cell::new("N/A").fg(Color::Red),
        ParameterStatus::NotFound => dim_cell("NOT FOUND"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
