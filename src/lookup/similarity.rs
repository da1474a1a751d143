//! Name similarity used for fuzzy package lookup.

use std::collections::HashSet;
use strsim::{jaro_winkler, normalized_levenshtein};

const TOKEN_SEPARATORS: [char; 5] = ['-', '_', '.', '@', '/'];

/// Jaccard index over name tokens.
///
/// Catches reordered compound names like "react-dom" and "dom-react".
#[must_use]
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let tokens = |s: &str| -> HashSet<String> {
        s.split(TOKEN_SEPARATORS)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect()
    };
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);

    // names made only of separators share nothing
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let union = tokens_a.union(&tokens_b).count();
    tokens_a.intersection(&tokens_b).count() as f64 / union as f64
}

/// Character-level similarity: mean of Jaro-Winkler and normalized Levenshtein
#[must_use]
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    (jaro_winkler(&a, &b) + normalized_levenshtein(&a, &b)) / 2.0
}

/// Similarity of two package names in 0.0..=1.0
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    token_similarity(a, b).max(edit_similarity(a, b)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_names() {
        assert!((name_similarity("serde", "SERDE") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reordered_tokens() {
        assert!((token_similarity("react-dom", "dom-react") - 1.0).abs() < 1e-9);
        assert!((token_similarity("react-dom", "react") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_separator_only_names_do_not_match() {
        assert!(token_similarity("@@", "_").abs() < f64::EPSILON);
        assert!(token_similarity("--", "--").abs() < f64::EPSILON);
        assert!(token_similarity("react", "/").abs() < f64::EPSILON);
        assert!(name_similarity("@@", "_") < 0.6);
    }

    #[test]
    fn test_typo_scores_high() {
        assert!(name_similarity("flsk", "flask") > 0.8);
        assert!(name_similarity("zzz-nonexistent", "flask") < 0.2);
    }
}
