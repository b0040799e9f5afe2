//! CLI argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "lotmatch",
    version,
    about = "Match held production lots to the client specifications they satisfy",
    long_about = "Match held production lots to the client specifications they satisfy.\n\n\
                  Reads a specification table and a production sheet (CSV or workbook),\n\
                  fills missing readings, and ranks the compatible clients for every held lot."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score every held lot of a production sheet against the specifications.
    Match(MatchArgs),

    /// List the sheets of a production workbook.
    Sheets(SheetsArgs),

    /// List specifications whose range for a parameter accepts a value.
    Lookup(LookupArgs),
}

/// Options shared by commands that read the specification table.
#[derive(Args)]
pub struct ConfigArgs {
    /// JSON file with match options (missing keys keep their defaults).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON file replacing the built-in alias and product-type synonym tables.
    #[arg(long = "aliases", value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Print the result as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct MatchArgs {
    /// Specification table (CSV or workbook).
    #[arg(value_name = "SPECIFICATIONS")]
    pub specifications: PathBuf,

    /// Production dataset (CSV or workbook).
    #[arg(value_name = "PRODUCTION")]
    pub production: PathBuf,

    /// Production sheet to read (default: the first sheet).
    #[arg(long = "sheet", value_name = "NAME")]
    pub sheet: Option<String>,

    /// Only lots dated on or after this day (YYYY-MM-DD).
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Only lots dated on or before this day (YYYY-MM-DD).
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Show at most this many candidates per lot.
    #[arg(long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Include per-parameter evidence for every shown candidate.
    #[arg(long = "details")]
    pub details: bool,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Args)]
pub struct SheetsArgs {
    /// Workbook or CSV file.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

#[derive(Args)]
pub struct LookupArgs {
    /// Specification table (CSV or workbook).
    #[arg(value_name = "SPECIFICATIONS")]
    pub specifications: PathBuf,

    /// Parameter name or fragment, e.g. "humedad".
    #[arg(long = "parameter", value_name = "NAME")]
    pub parameter: String,

    /// Value to test against each range.
    #[arg(long = "value", value_name = "NUMBER", allow_negative_numbers = true)]
    pub value: f64,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
