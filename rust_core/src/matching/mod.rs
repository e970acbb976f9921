//! Name Similarity Scoring
//!
//! Scores how alike two team names are on a 0.0-1.0 scale. The team resolver
//! in [`team`] builds on this to pick roster entries for feed names.
//!
//! Scoring order:
//! 1. Exact match after normalization: 1.0
//! 2. One name contains the other: 0.9
//! 3. Otherwise: `(len(longer) - levenshtein) / len(longer)`
//!
//! The match threshold (0.7) is calibrated against these exact values.

use strsim::levenshtein;

pub mod team;

pub use team::{resolve, resolve_request, NameResolutionRequest, NameResolutionResponse, TeamMatch};

/// Score returned when one normalized name contains the other
pub const CONTAINMENT_SCORE: f64 = 0.9;

/// Minimum confidence for a resolution to count as a match
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Normalize a name for comparison
fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Similarity between two names in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);

    if a == b {
        return 1.0;
    }

    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return CONTAINMENT_SCORE;
    }

    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (longer, shorter, longer_len) = if a_len > b_len {
        (&a, &b, a_len)
    } else {
        (&b, &a, b_len)
    };

    if longer_len == 0 {
        return 1.0;
    }

    // Edit distance never exceeds the longer length
    let distance = levenshtein(longer, shorter);
    (longer_len - distance) as f64 / longer_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(similarity("Real Madrid", "Real Madrid"), 1.0);
    }

    #[test]
    fn test_exact_after_normalization() {
        assert_eq!(similarity("  REAL madrid ", "real Madrid"), 1.0);
    }

    #[test]
    fn test_containment_either_direction() {
        assert_eq!(similarity("abc", "xabc"), CONTAINMENT_SCORE);
        assert_eq!(similarity("xabc", "abc"), CONTAINMENT_SCORE);
        assert_eq!(
            similarity("Olympiacos", "Olympiacos Piraeus"),
            CONTAINMENT_SCORE
        );
    }

    #[test]
    fn test_edit_distance_branch() {
        let score = similarity("abc", "abd");
        assert!((score - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_edit_distance_uses_longer_length() {
        // kitten -> sitting: distance 3 over length 7
        let score = similarity("kitten", "sitting");
        assert!((score - 4.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_completely_different_names() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_empty_strings() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("   ", ""), 1.0);
        // The empty string is contained in everything
        assert_eq!(similarity("", "Barcelona"), CONTAINMENT_SCORE);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // one substitution over five characters
        let score = similarity("Škoda", "Skoda");
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_symmetric() {
        for (a, b) in [("Fenerbahce", "Fenerbahçe Beko"), ("Monaco", "AS Monaco"), ("Zalgiris", "Zalgiris Kaunas")] {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }
}
