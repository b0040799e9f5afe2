//! Keyword rules for parameter kind, product family and gluten-free labels.
//!
//! Each classifier is an ordered rule list: the first rule with a keyword
//! contained in the normalized input decides the result.

use lotmatch_model::{Family, ParameterKind};

use crate::normalize::normalize_text;

/// A priority-ranked predicate: any keyword contained in the input selects `result`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T> {
    pub keywords: &'static [&'static str],
    pub result: T,
}

impl<T: Copy> KeywordRule<T> {
    pub fn matches(&self, normalized: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| normalized.contains(keyword))
    }
}

/// First matching rule's result, if any.
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], normalized: &str) -> Option<T> {
    rules
        .iter()
        .find(|rule| rule.matches(normalized))
        .map(|rule| rule.result)
}

pub const PARAMETER_KIND_RULES: &[KeywordRule<ParameterKind>] = &[
    KeywordRule {
        keywords: &["thickness", "espesor"],
        result: ParameterKind::Thickness,
    },
    KeywordRule {
        keywords: &[
            "mesh",
            "retained",
            "through",
            "under",
            "malla",
            "retenido",
            "a traves",
            "bajo",
        ],
        result: ParameterKind::Mesh,
    },
];

/// Family rules applied to a source label (sheet name or family column).
pub const LABEL_FAMILY_RULES: &[KeywordRule<Family>] = &[
    KeywordRule {
        keywords: &["groat", "pelada"],
        result: Family::Groat,
    },
    KeywordRule {
        keywords: &["flour", "harina"],
        result: Family::Flour,
    },
    KeywordRule {
        keywords: &["pillow"],
        result: Family::Pillow,
    },
    KeywordRule {
        keywords: &["flake", "hojuela"],
        result: Family::Flake,
    },
];

/// Family rules applied to a specification's product text. These win over
/// the label family when they match.
pub const PRODUCT_FAMILY_RULES: &[KeywordRule<Family>] = &[
    KeywordRule {
        keywords: &["flour", "harina"],
        result: Family::Flour,
    },
    KeywordRule {
        keywords: &["groat", "avena pelada"],
        result: Family::Groat,
    },
    KeywordRule {
        keywords: &["pillow"],
        result: Family::Pillow,
    },
    KeywordRule {
        keywords: &["flake", "hojuela", "laminada"],
        result: Family::Flake,
    },
];

const GLUTEN_FREE_SHORT: &str = "gf";
const GLUTEN: &str = "gluten";
const GLUTEN_NEGATIONS: &[&str] = &["free", "without", "exempt", "no", "sin", "libre"];

/// Headers recognised as an average-thickness reading need one word from each set.
pub const AVERAGE_WORDS: &[&str] = &["average", "promedio", "avg"];
pub const THICKNESS_WORDS: &[&str] = &["thickness", "espesor"];

/// Parameter kind of an already-normalized parameter name.
pub fn classify_parameter_kind(normalized_name: &str) -> ParameterKind {
    first_match(PARAMETER_KIND_RULES, normalized_name).unwrap_or(ParameterKind::Other)
}

/// True when the text declares a gluten-free product.
pub fn is_gluten_free(text: &str) -> bool {
    let normalized = normalize_text(text);
    if normalized.contains(GLUTEN_FREE_SHORT) {
        return true;
    }
    normalized.contains(GLUTEN)
        && GLUTEN_NEGATIONS
            .iter()
            .any(|negation| normalized.contains(negation))
}

/// Family of a source label such as a sheet name.
pub fn detect_family(source_label: &str) -> Family {
    first_match(LABEL_FAMILY_RULES, &normalize_text(source_label)).unwrap_or(Family::Other)
}

/// Family of a specification: product-text keywords override the label family.
pub fn specification_family(family_label: &str, product_normalized: &str) -> Family {
    first_match(PRODUCT_FAMILY_RULES, product_normalized)
        .unwrap_or_else(|| detect_family(family_label))
}

/// True for normalized headers naming an average thickness reading.
pub fn is_average_thickness(normalized_header: &str) -> bool {
    AVERAGE_WORDS
        .iter()
        .any(|word| normalized_header.contains(word))
        && THICKNESS_WORDS
            .iter()
            .any(|word| normalized_header.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_parameter_kinds() {
        assert_eq!(
            classify_parameter_kind("flake thickness"),
            ParameterKind::Thickness
        );
        assert_eq!(classify_parameter_kind("retained 10"), ParameterKind::Mesh);
        assert_eq!(classify_parameter_kind("malla 20"), ParameterKind::Mesh);
        assert_eq!(classify_parameter_kind("moisture"), ParameterKind::Other);
    }

    #[test]
    fn thickness_rule_outranks_mesh_rule() {
        assert_eq!(
            classify_parameter_kind("thickness under 1mm"),
            ParameterKind::Thickness
        );
    }

    #[test]
    fn detects_gluten_free_labels() {
        assert!(is_gluten_free("Hojuela GF"));
        assert!(is_gluten_free("Gluten Free Oats"));
        assert!(is_gluten_free("Avena sin gluten"));
        assert!(!is_gluten_free("Regular Oats"));
        assert!(!is_gluten_free("Gluten"));
    }

    #[test]
    fn detects_family_from_label() {
        assert_eq!(detect_family("Harina Avena"), Family::Flour);
        assert_eq!(detect_family("Groats 2024"), Family::Groat);
        assert_eq!(detect_family("Pillow"), Family::Pillow);
        assert_eq!(detect_family("Hojuelas GF"), Family::Flake);
        assert_eq!(detect_family("Misc"), Family::Other);
    }

    #[test]
    fn product_text_overrides_label_family() {
        assert_eq!(
            specification_family("Hojuelas", "oat flour fine"),
            Family::Flour
        );
        assert_eq!(specification_family("Harina", "avena laminada"), Family::Flake);
        assert_eq!(specification_family("Pillow", "cereal mix"), Family::Pillow);
    }

    #[test]
    fn recognises_average_thickness_headers() {
        assert!(is_average_thickness("promedio espesor mm"));
        assert!(is_average_thickness("average thickness"));
        assert!(!is_average_thickness("thickness 1"));
    }
}
