//! Client technical specifications.
//!
//! A [`SpecDatabase`] is built once per run from the specification table and
//! is read-only afterwards. Codes are kept in ascending order so every stage
//! that walks the database sees the same sequence.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::format_numeric;

/// Coarse product category used for gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Groat,
    Flour,
    Pillow,
    Flake,
    Other,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groat => "groat",
            Self::Flour => "flour",
            Self::Pillow => "pillow",
            Self::Flake => "flake",
            Self::Other => "other",
        }
    }

    /// True for every family except [`Family::Other`].
    pub fn is_determined(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a parameter is measured, derived from its normalized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Thickness,
    Mesh,
    Other,
}

/// One accepted range of a client specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Label as written in the specification table.
    pub name: String,
    pub normalized_name: String,
    /// Lower bound; an absent bound is stored as `0.0`.
    pub min: f64,
    /// Upper bound; an absent bound is stored as `f64::INFINITY` and
    /// serialized as `null`.
    #[serde(with = "open_upper_bound")]
    pub max: f64,
    pub kind: ParameterKind,
    /// Sampling frequency, when the table carries one.
    pub frequency: Option<String>,
}

impl ParameterSpec {
    pub fn accepts(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// `"min - max"` with absent upper bounds shown as `inf`.
    pub fn range_label(&self) -> String {
        format!("{} - {}", format_numeric(self.min), format_numeric(self.max))
    }
}

/// JSON has no infinity, so an open upper bound travels as `null`.
mod open_upper_bound {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(max: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if max.is_finite() {
            serializer.serialize_some(max)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Everything a client accepts for one product code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSpecification {
    pub code: String,
    pub client: String,
    pub family: Family,
    pub product_text: String,
    pub product_normalized: String,
    pub is_gluten_free: bool,
    pub parameters: Vec<ParameterSpec>,
}

/// Specifications keyed by specification code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDatabase {
    specifications: BTreeMap<String, ClientSpecification>,
}

impl SpecDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a specification, replacing any previous one with the same code.
    pub fn insert(&mut self, specification: ClientSpecification) {
        self.specifications
            .insert(specification.code.clone(), specification);
    }

    pub fn get(&self, code: &str) -> Option<&ClientSpecification> {
        self.specifications.get(code)
    }

    pub fn len(&self) -> usize {
        self.specifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }

    /// Specifications in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = &ClientSpecification> {
        self.specifications.values()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.specifications.keys().map(String::as_str)
    }

    pub fn parameter_count(&self) -> usize {
        self.specifications
            .values()
            .map(|spec| spec.parameters.len())
            .sum()
    }
}

impl FromIterator<ClientSpecification> for SpecDatabase {
    fn from_iter<I: IntoIterator<Item = ClientSpecification>>(iter: I) -> Self {
        let mut database = Self::new();
        for specification in iter {
            database.insert(specification);
        }
        database
    }
}
