//! Parameter alias and product-type synonym tables.
//!
//! Both tables are ordered: the first entry whose key matches wins, so the
//! order of the built-in lists (or of an injected JSON file) is significant.

use std::path::Path;

use lotmatch_model::TypeMatch;
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::normalize::normalize_text;

/// A canonical term and the label variants it is known by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub key: String,
    pub variants: Vec<String>,
}

impl AliasEntry {
    pub fn new(key: &str, variants: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            variants: variants.iter().map(|v| (*v).to_string()).collect(),
        }
    }

    fn normalized(&self) -> Self {
        Self {
            key: normalize_text(&self.key),
            variants: self
                .variants
                .iter()
                .map(|variant| normalize_text(variant))
                .filter(|variant| !variant.is_empty())
                .collect(),
        }
    }
}

/// Static domain knowledge passed explicitly to the resolver and scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAliasTables")]
pub struct AliasTables {
    parameter_aliases: Vec<AliasEntry>,
    type_synonyms: Vec<AliasEntry>,
}

/// Tables as written in a JSON file, before normalization.
#[derive(Deserialize)]
struct RawAliasTables {
    #[serde(default)]
    parameter_aliases: Vec<AliasEntry>,
    #[serde(default)]
    type_synonyms: Vec<AliasEntry>,
}

impl From<RawAliasTables> for AliasTables {
    fn from(raw: RawAliasTables) -> Self {
        Self::new(raw.parameter_aliases, raw.type_synonyms)
    }
}

impl Default for AliasTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AliasTables {
    /// Builds tables from raw entries. Keys and variants are normalized here
    /// so lookups never touch raw text.
    pub fn new(parameter_aliases: Vec<AliasEntry>, type_synonyms: Vec<AliasEntry>) -> Self {
        Self {
            parameter_aliases: parameter_aliases.iter().map(AliasEntry::normalized).collect(),
            type_synonyms: type_synonyms.iter().map(AliasEntry::normalized).collect(),
        }
    }

    /// Tables with no entries at all.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// The bundled English/Spanish vocabulary for oat products.
    pub fn builtin() -> Self {
        let parameter_aliases = vec![
            AliasEntry::new("burnt flakes", &["burnt", "scorched", "quemadas", "quemada"]),
            AliasEntry::new("hojuelas quemadas", &["quemadas", "quemada"]),
            AliasEntry::new(
                "gelatinized flakes",
                &["gelatinized", "gelatin", "gelatinas", "gelatina"],
            ),
            AliasEntry::new(
                "hojuelas gelatinizadas",
                &["gelatinas", "gelatina", "gelatinizadas"],
            ),
            AliasEntry::new(
                "foreign matter",
                &["foreign matter", "foreign material", "impurities", "materia extraña"],
            ),
            AliasEntry::new(
                "materias extrañas",
                &["mat extraña", "materia extraña", "impurezas"],
            ),
            AliasEntry::new(
                "materia extraña",
                &["mat extraña", "materia extraña", "impurezas"],
            ),
            AliasEntry::new("damaged kernels", &["damaged", "damaged grain", "dañados"]),
            AliasEntry::new("granos dañados", &["dañados", "grano dañado"]),
            AliasEntry::new(
                "bulk density",
                &["bulk density", "density", "test weight", "densidad"],
            ),
            AliasEntry::new(
                "densidad aparente",
                &["densidad", "peso hectolitrico", "peso especifico"],
            ),
            AliasEntry::new(
                "peroxide",
                &["peroxide value", "peroxide", "ind perioxido", "indice de peroxido"],
            ),
            AliasEntry::new(
                "peroxidos",
                &["ind perioxido", "peroxido", "indice de peroxido"],
            ),
            AliasEntry::new("acidity", &["acidity", "acid value", "acidez"]),
            AliasEntry::new("acidez", &["acidez", "indice de acidez"]),
        ];
        let type_synonyms = vec![
            AliasEntry::new(
                "instant",
                &["quick", "instant", "instantanea", "instantánea", "inst"],
            ),
            AliasEntry::new(
                "instantanea",
                &["quick", "instant", "instantanea", "instantánea", "inst"],
            ),
            AliasEntry::new(
                "traditional",
                &["rolled", "traditional", "tradicional", "regular", "old fashioned"],
            ),
            AliasEntry::new(
                "tradicional",
                &["rolled", "traditional", "tradicional", "regular", "old fashioned"],
            ),
            AliasEntry::new(
                "wholegrain",
                &["whole", "wholegrain", "integral", "grano entero"],
            ),
            AliasEntry::new("integral", &["whole", "wholegrain", "integral", "grano entero"]),
            AliasEntry::new("laminada", &["rolled", "flake", "laminada"]),
            AliasEntry::new("fine", &["fine", "fina", "baby"]),
            AliasEntry::new("fina", &["fine", "fina", "baby"]),
            AliasEntry::new("ultra fine", &["super fine", "ultra", "dust"]),
            AliasEntry::new("ultra fina", &["super fine", "ultra", "dust"]),
            AliasEntry::new("groat", &["groat", "kernel", "pelada"]),
            AliasEntry::new("avena pelada", &["groat", "kernel", "pelada"]),
            AliasEntry::new("stabilized", &["stabilized", "estabilizada"]),
            AliasEntry::new("estabilizada", &["stabilized", "estabilizada"]),
        ];
        Self::new(parameter_aliases, type_synonyms)
    }

    /// Parses tables from JSON, normalizing every entry.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        serde_json::from_str(json).map_err(|source| MapError::InvalidAliases {
            message: source.to_string(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, MapError> {
        let json = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn parameter_aliases(&self) -> &[AliasEntry] {
        &self.parameter_aliases
    }

    pub fn type_synonyms(&self) -> &[AliasEntry] {
        &self.type_synonyms
    }

    /// Alias entries whose key occurs inside a normalized parameter name, in table order.
    pub fn aliases_for<'a>(
        &'a self,
        normalized_parameter: &'a str,
    ) -> impl Iterator<Item = &'a AliasEntry> + 'a {
        self.parameter_aliases
            .iter()
            .filter(move |entry| !entry.key.is_empty() && normalized_parameter.contains(&entry.key))
    }

    /// Scores how well a lot's product type matches a specification's product text.
    ///
    /// Both arguments must already be normalized. Direct containment beats a
    /// synonym hit; an empty or missing lot type never matches.
    pub fn type_match(&self, lot_type: &str, spec_product: &str) -> TypeMatch {
        if lot_type.is_empty() || lot_type == "nan" {
            return TypeMatch::None;
        }
        if spec_product.contains(lot_type) {
            return TypeMatch::Direct;
        }
        let synonym_hit = self
            .type_synonyms
            .iter()
            .filter(|entry| !entry.key.is_empty() && lot_type.contains(&entry.key))
            .flat_map(|entry| entry.variants.iter())
            .any(|variant| spec_product.contains(variant.as_str()));
        if synonym_hit {
            TypeMatch::Synonym
        } else {
            TypeMatch::None
        }
    }
}
