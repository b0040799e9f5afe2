//! `lotmatch` command-line entry point.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use lotmatch_cli::logging::{LogConfig, LogFormat, init_logging};
use lotmatch_cli::summary::{print_lookup, print_match_report, print_sheets};
use serde_json::Value;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_lookup, run_match, run_sheets};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli.command) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: &Command) -> Result<()> {
    match command {
        Command::Match(args) => {
            let report = run_match(args)?;
            if args.config.json {
                print_json(&serde_json::to_value(&report).context("serialize report")?);
            } else {
                print_match_report(&report, args.top, args.details);
            }
        }
        Command::Sheets(args) => {
            let sheets = run_sheets(args)?;
            print_sheets(&sheets);
        }
        Command::Lookup(args) => {
            let hits = run_lookup(args)?;
            if args.config.json {
                print_json(&serde_json::to_value(&hits).context("serialize lookup")?);
            } else {
                print_lookup(&args.parameter, args.value, &hits);
            }
        }
    }
    Ok(())
}

fn print_json(value: &Value) {
    println!("{value:#}");
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
