use anyhow::{Context, Result};
use tracing::{info, info_span};

use lotmatch_core::{DateRange, MatchOptions, MatchRequest, MatchSession};
use lotmatch_ingest::list_sheets;
use lotmatch_map::AliasTables;
use lotmatch_model::{MatchReport, ParameterAcceptance};

use crate::cli::{ConfigArgs, LookupArgs, MatchArgs, SheetsArgs};

/// Options from `--config`, with `--aliases` replacing the alias tables.
pub fn load_options(args: &ConfigArgs) -> Result<MatchOptions> {
    let mut options = match &args.config {
        Some(path) => MatchOptions::from_path(path)
            .with_context(|| format!("load match options from {}", path.display()))?,
        None => MatchOptions::default(),
    };
    if let Some(path) = &args.aliases {
        let aliases = AliasTables::from_path(path)
            .with_context(|| format!("load alias tables from {}", path.display()))?;
        options.aliases = Some(aliases);
    }
    Ok(options)
}

pub fn run_match(args: &MatchArgs) -> Result<MatchReport> {
    let _span = info_span!("match", production = %args.production.display()).entered();
    if let (Some(from), Some(to)) = (args.from, args.to) {
        anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
    }
    let options = load_options(&args.config)?;
    let mut session = MatchSession::new(options);
    let request = MatchRequest {
        specifications: args.specifications.clone(),
        production: args.production.clone(),
        sheet: args.sheet.clone(),
        date_range: DateRange::new(args.from, args.to),
    };
    let report = session.run(&request).with_context(|| {
        format!(
            "match {} against {}",
            args.production.display(),
            args.specifications.display()
        )
    })?;
    info!(
        lots = report.lots.len(),
        with_candidates = report.lots_with_candidates(),
        "match finished"
    );
    Ok(report)
}

pub fn run_sheets(args: &SheetsArgs) -> Result<Vec<String>> {
    list_sheets(&args.path).with_context(|| format!("list sheets of {}", args.path.display()))
}

pub fn run_lookup(args: &LookupArgs) -> Result<Vec<ParameterAcceptance>> {
    anyhow::ensure!(args.value.is_finite(), "--value must be a finite number");
    let options = load_options(&args.config)?;
    let mut session = MatchSession::new(options);
    session
        .lookup(&args.specifications, &args.parameter, args.value)
        .with_context(|| format!("look up {} in {}", args.parameter, args.specifications.display()))
}
