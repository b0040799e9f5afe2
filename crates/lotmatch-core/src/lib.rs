//! Held-lot matching against client specifications.
//!
//! The pipeline reads a specification table into a [`SpecDatabase`],
//! reads a production sheet into a [`ProductionDataset`], fills missing
//! readings, resolves each specification parameter to a production column,
//! and ranks the specifications every held lot satisfies.
//!
//! # Example
//!
//! ```ignore
//! use lotmatch_core::{MatchOptions, MatchRequest, MatchSession};
//!
//! let mut session = MatchSession::new(MatchOptions::default());
//! let report = session.run(&MatchRequest {
//!     specifications: "specs.xlsx".into(),
//!     production: "plant.xlsx".into(),
//!     ..MatchRequest::default()
//! })?;
//! ```
//!
//! [`SpecDatabase`]: lotmatch_model::SpecDatabase

#![deny(unsafe_code)]

mod columns;
mod error;
mod impute;
mod lookup;
mod options;
mod pipeline;
mod production;
mod scoring;
mod specdb;

// === Errors ===
pub use error::{CoreError, Result};

// === Configuration ===
pub use options::MatchOptions;

// === Inputs ===
pub use columns::{FieldRule, HeaderIndex, find_required};
pub use production::{
    DateRange, GroupKey, ProductionColumns, ProductionDataset, normalized_product_type, parse_date,
};
pub use specdb::SpecDatabaseBuilder;

// === Matching ===
pub use impute::impute;
pub use lookup::lookup;
pub use scoring::{
    GateRejection, LotScores, LotView, ReadingLookup, evaluate, gate, rank, score_lot,
};

// === Orchestration ===
pub use pipeline::{MatchRequest, MatchSession, run_matching};
