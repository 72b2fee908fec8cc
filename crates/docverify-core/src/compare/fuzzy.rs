//! Word-order-insensitive fuzzy text matching.

use rapidfuzz::fuzz;

use super::normalize::normalize_text;
use crate::models::fragment::TextFragment;
use crate::models::verification::Verdict;

/// Sort whitespace-separated tokens and rejoin them with single spaces.
pub fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Indel similarity scaled to 0 - 100: `200 * lcs / (len(a) + len(b))`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }

    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// [`ratio`] over the token-sorted forms of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

/// Find the fragment most similar to `expected`.
///
/// Only a strictly higher score replaces the current best, so the earliest
/// fragment wins ties and a fragment scoring 0 is never reported.
pub fn compare_name(expected: &str, fragments: &[TextFragment], threshold: f64) -> Verdict {
    let expected = normalize_text(expected).to_lowercase();

    let mut best: Option<&TextFragment> = None;
    let mut best_score = 0.0;

    for fragment in fragments {
        let score = token_sort_ratio(&expected, &fragment.text.to_lowercase());
        if score > best_score {
            best_score = score;
            best = Some(fragment);
        }
    }

    Verdict {
        matched: best.is_some() && best_score >= threshold,
        found_text: best.map(|f| f.text.clone()),
        found_fragment: best.cloned(),
        score: Some(best_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(text: &str) -> TextFragment {
        TextFragment::new(text, 0.9)
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        // lcs("kitten", "sitting") = 4
        assert!((ratio("kitten", "sitting") - 800.0 / 13.0).abs() < 1e-9);
        assert_eq!(ratio("", ""), 100.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_token_sort_is_order_invariant() {
        assert_eq!(token_sort_ratio("maria silva", "silva maria"), 100.0);
        assert_eq!(sort_tokens("  silva   maria "), "maria silva");
    }

    #[test]
    fn test_exact_fragment_scores_100() {
        let frags = vec![fragment("Comagran Ltda"), fragment("Maria Silva")];
        let verdict = compare_name("Maria Silva", &frags, 80.0);

        assert!(verdict.matched);
        assert_eq!(verdict.score, Some(100.0));
        assert_eq!(verdict.found_text.as_deref(), Some("Maria Silva"));
    }

    #[test]
    fn test_word_order_invariance() {
        let frags = vec![fragment("Silva Maria")];
        let verdict = compare_name("Maria Silva", &frags, 80.0);

        assert!(verdict.matched);
        assert_eq!(verdict.score, Some(100.0));
    }

    #[test]
    fn test_accent_mismatch_below_threshold() {
        // "joão paulo" vs "joao paulo silva": lcs 9, lengths 10 + 16
        let frags = vec![fragment("Joao Paulo Silva")];
        let verdict = compare_name("João Paulo", &frags, 80.0);

        let score = verdict.score.unwrap();
        assert!((score - 1800.0 / 26.0).abs() < 1e-9);
        assert!((score - 69.230_769_230_769_23).abs() < 1e-9);
        assert!(!verdict.matched);
        assert_eq!(verdict.found_text.as_deref(), Some("Joao Paulo Silva"));
    }

    #[test]
    fn test_first_fragment_wins_ties() {
        let frags = vec![fragment("Maria Silva"), fragment("silva maria")];
        let verdict = compare_name("maria silva", &frags, 80.0);

        assert_eq!(verdict.found_text.as_deref(), Some("Maria Silva"));
    }

    #[test]
    fn test_no_similarity_reports_nothing() {
        let frags = vec![fragment("xyz")];
        let verdict = compare_name("abc", &frags, 80.0);

        assert!(!verdict.matched);
        assert_eq!(verdict.found_text, None);
        assert_eq!(verdict.score, Some(0.0));
    }
}
