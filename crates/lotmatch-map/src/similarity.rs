//! String similarity and sieve-size header matching.

use std::sync::LazyLock;

use rapidfuzz::fuzz;
use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("Invalid regex"));

/// Vocabulary for fractions passing through a sieve. Checked before [`OVER_WORDS`].
const BELOW_WORDS: &[&str] = &[
    "under", "through", "pass", "minus", "a traves", "bajo", "pasa", "menor", "<", "fondo",
    "base",
];

/// Vocabulary for fractions retained on a sieve.
const OVER_WORDS: &[&str] = &[
    "retained", "over", "above", "ret", "retencion", "retenido", "sobre", "arriba", "mayor",
    ">", "encima",
];

/// Sense of a sieve reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshDirection {
    Below,
    Over,
}

/// Indel similarity of two normalized strings, in `0.0..=1.0`.
///
/// Equals `2 * matches / (len(a) + len(b))`, the same ratio a
/// longest-common-subsequence matcher reports.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    fuzz::ratio(a.chars(), b.chars())
}

/// First run of ASCII digits in the text.
pub fn first_number(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|found| found.as_str())
}

/// Direction named by the text, `None` when it names neither.
pub fn mesh_direction(text: &str) -> Option<MeshDirection> {
    if BELOW_WORDS.iter().any(|word| text.contains(word)) {
        Some(MeshDirection::Below)
    } else if OVER_WORDS.iter().any(|word| text.contains(word)) {
        Some(MeshDirection::Over)
    } else {
        None
    }
}

/// True when two normalized headers name the same sieve size and the same,
/// determined direction.
pub fn mesh_header_match(a: &str, b: &str) -> bool {
    let (Some(size_a), Some(size_b)) = (first_number(a), first_number(b)) else {
        return false;
    };
    if size_a != size_b {
        return false;
    }
    match (mesh_direction(a), mesh_direction(b)) {
        (Some(dir_a), Some(dir_b)) => dir_a == dir_b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_have_full_similarity() {
        assert!((similarity_ratio("bulk density", "bulk density") - 1.0).abs() < 1e-9);
        assert!(similarity_ratio("moisture", "ash") < 0.5);
    }

    #[test]
    fn ratio_matches_lcs_formula() {
        // "abcd" vs "abed": 3 common chars, 2*3/8.
        assert!((similarity_ratio("abcd", "abed") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn mesh_match_requires_same_size_and_direction() {
        assert!(mesh_header_match("retained mesh 20", "ret 20 retenido"));
        assert!(mesh_header_match("through mesh 40", "pasa malla 40"));
        assert!(!mesh_header_match("retained mesh 20", "retained mesh 40"));
        assert!(!mesh_header_match("retained mesh 20", "through mesh 20"));
    }

    #[test]
    fn mesh_match_requires_determined_direction() {
        assert!(!mesh_header_match("mesh 20", "mesh 20"));
        assert!(!mesh_header_match("retained mesh", "retained mesh"));
    }

    #[test]
    fn below_vocabulary_wins_over_over_vocabulary() {
        assert_eq!(
            mesh_direction("under mesh retained"),
            Some(MeshDirection::Below)
        );
        assert_eq!(mesh_direction("sobre malla 10"), Some(MeshDirection::Over));
        assert_eq!(mesh_direction("malla 10"), None);
    }

    #[test]
    fn ret_abbreviation_reads_as_retained() {
        assert_eq!(mesh_direction("ret malla 20"), Some(MeshDirection::Over));
        assert!(mesh_header_match("ret malla 20", "ret 20"));
        assert!(!mesh_header_match("ret malla 20", "pasa malla 20"));
    }
}
