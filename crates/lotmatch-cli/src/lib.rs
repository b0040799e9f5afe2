//! CLI library components for `lotmatch`.

pub mod logging;
pub mod summary;
