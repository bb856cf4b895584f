use super::fuzzy::QuicksilverScorer;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Maps a `(text, query)` pair to a match strength. `0.0` means no match,
/// anything above it is a match and higher is better.
pub trait Scorer {
    fn score(&self, text: &str, query: &str) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, text: &str, query: &str) -> f64 {
        self(text, query)
    }
}

/// Shared handle to a pluggable fuzzy scorer.
#[derive(Clone)]
pub struct FuzzyScorer(Arc<dyn Scorer + Send + Sync>);

impl FuzzyScorer {
    pub fn new(scorer: impl Scorer + Send + Sync + 'static) -> Self {
        Self(Arc::new(scorer))
    }
}

impl Default for FuzzyScorer {
    fn default() -> Self {
        Self::new(QuicksilverScorer)
    }
}

impl Scorer for FuzzyScorer {
    fn score(&self, text: &str, query: &str) -> f64 {
        self.0.score(text, query)
    }
}

impl fmt::Debug for FuzzyScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FuzzyScorer(..)")
    }
}

/// Strict index-aligned prefix match: every query char must equal the
/// candidate char at the same position.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixScorer;

impl Scorer for PrefixScorer {
    fn score(&self, text: &str, query: &str) -> f64 {
        let text_len = text.chars().count();
        if text_len == 0 {
            return 0.0;
        }

        let mut query_len = 0usize;
        let mut text_chars = text.chars();
        for ch in query.chars() {
            if text_chars.next() != Some(ch) {
                return 0.0;
            }
            query_len += 1;
        }

        query_len as f64 / text_len as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreStrategy {
    Prefix,
    #[default]
    Fuzzy,
}

impl ScoreStrategy {
    pub fn from_quicksilver_flag(use_quicksilver: bool) -> Self {
        if use_quicksilver {
            Self::Fuzzy
        } else {
            Self::Prefix
        }
    }
}

/// Lowercases for comparison unless matching is case sensitive.
pub fn fold_case(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}

/// Scores one candidate under the active strategy and case folding.
/// `query` must already be folded.
pub fn score_candidate(
    strategy: ScoreStrategy,
    fuzzy: &FuzzyScorer,
    text: &str,
    query: &str,
    case_sensitive: bool,
) -> f64 {
    let text = fold_case(text, case_sensitive);
    let score = match strategy {
        ScoreStrategy::Prefix => PrefixScorer.score(&text, query),
        ScoreStrategy::Fuzzy => fuzzy.score(&text, query),
    };
    if score.is_finite() && score > 0.0 {
        score
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{FuzzyScorer, PrefixScorer, ScoreStrategy, Scorer, fold_case, score_candidate};
    use proptest::prelude::*;

    #[test]
    fn prefix_score_is_ratio_of_lengths() {
        assert_eq!(PrefixScorer.score("apple", "ap"), 2.0 / 5.0);
        assert_eq!(PrefixScorer.score("apple", "apple"), 1.0);
    }

    #[test]
    fn prefix_is_not_a_substring_test() {
        assert_eq!(PrefixScorer.score("pineapple", "apple"), 0.0);
        assert_eq!(PrefixScorer.score("ap", "apple"), 0.0);
    }

    #[test]
    fn prefix_respects_case_folding() {
        let fuzzy = FuzzyScorer::default();
        let insensitive = score_candidate(ScoreStrategy::Prefix, &fuzzy, "Apple", "ap", false);
        assert!(insensitive > 0.0);
        let sensitive = score_candidate(ScoreStrategy::Prefix, &fuzzy, "Apple", "ap", true);
        assert_eq!(sensitive, 0.0);
    }

    #[test]
    fn fold_case_leaves_text_alone_when_sensitive() {
        assert_eq!(fold_case("MiXeD", true), "MiXeD");
        assert_eq!(fold_case("MiXeD", false), "mixed");
    }

    #[test]
    fn custom_scorer_closure_is_pluggable() {
        let fuzzy = FuzzyScorer::new(|text: &str, query: &str| {
            if text.contains(query) { 7.0 } else { 0.0 }
        });
        assert_eq!(
            score_candidate(ScoreStrategy::Fuzzy, &fuzzy, "banana", "nan", false),
            7.0
        );
    }

    #[test]
    fn non_finite_scores_count_as_no_match() {
        let fuzzy = FuzzyScorer::new(|_: &str, _: &str| f64::NAN);
        assert_eq!(
            score_candidate(ScoreStrategy::Fuzzy, &fuzzy, "a", "a", false),
            0.0
        );
    }

    proptest! {
        #[test]
        fn prefix_nonzero_iff_starts_with(text in "[a-cA-C]{0,8}", query in "[a-cA-C]{1,4}") {
            let fuzzy = FuzzyScorer::default();
            let folded_query = query.to_lowercase();
            let score = score_candidate(ScoreStrategy::Prefix, &fuzzy, &text, &folded_query, false);
            let folded_text = text.to_lowercase();
            if folded_text.starts_with(&folded_query) {
                let expected = folded_query.chars().count() as f64 / folded_text.chars().count() as f64;
                prop_assert_eq!(score, expected);
            } else {
                prop_assert_eq!(score, 0.0);
            }
        }
    }
}
