//! Text normalization and column resolution for lot matching.
//!
//! This crate owns the matching vocabulary: how labels are normalized, which
//! aliases and product-type synonyms are known, how parameters, families and
//! gluten-free labels are classified, and how a specification parameter is
//! resolved to a production column.
//!
//! # Example
//!
//! ```ignore
//! use lotmatch_map::{AliasTables, ColumnResolver, ResolverOptions};
//!
//! let aliases = AliasTables::builtin();
//! let resolver = ColumnResolver::new(&aliases, &headers, &ResolverOptions::default());
//! let mapping = resolver.resolve(&database);
//! ```

#![deny(unsafe_code)]

mod aliases;
mod classify;
mod error;
mod normalize;
mod resolver;
mod similarity;

// === Errors ===
pub use error::MapError;

// === Normalization ===
pub use normalize::{NormalizedText, normalize_text};

// === Vocabulary ===
pub use aliases::{AliasEntry, AliasTables};
pub use classify::{
    KeywordRule, classify_parameter_kind, detect_family, first_match, is_average_thickness,
    is_gluten_free, specification_family,
};

// === Similarity ===
pub use similarity::{MeshDirection, first_number, mesh_direction, mesh_header_match, similarity_ratio};

// === Resolution ===
pub use resolver::{ColumnResolver, DEFAULT_FUZZY_THRESHOLD, ResolverOptions};
