use crate::core::candidate::Candidate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub score: f64,
    pub candidate: &'a Candidate,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(score: f64, candidate: &'a Candidate) -> Self {
        Self { score, candidate }
    }

    pub fn text(&self) -> &'a str {
        self.candidate.text()
    }
}

/// Result ordering. Discriminants match the numeric option indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Score = 0,
    Alpha = 1,
    None = 2,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::Score, SortBy::Alpha, SortBy::None];

    pub fn from_index(index: u64) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "score" => Some(Self::Score),
            "alpha" => Some(Self::Alpha),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Observation hook called with the folded query and the full sorted list
/// before the entry cap is applied.
#[derive(Clone)]
pub struct PostFilter(Arc<dyn Fn(&str, &[ScoredCandidate<'_>]) + Send + Sync>);

impl PostFilter {
    pub fn new(hook: impl Fn(&str, &[ScoredCandidate<'_>]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    pub fn call(&self, query: &str, scored: &[ScoredCandidate<'_>]) {
        (self.0)(query, scored);
    }
}

impl fmt::Debug for PostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PostFilter(..)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<'a> {
    pub visible: Vec<ScoredCandidate<'a>>,
    pub truncated: Vec<ScoredCandidate<'a>>,
}

/// Orders matches under `sort_by` and splits off everything past
/// `max_entries`. Input is expected in cache order; all sorts are stable.
pub fn rank<'a>(
    mut scored: Vec<ScoredCandidate<'a>>,
    sort_by: SortBy,
    max_entries: Option<usize>,
    post_filter: Option<&PostFilter>,
    query: &str,
) -> Ranked<'a> {
    sort_scored(&mut scored, sort_by);

    if let Some(hook) = post_filter {
        hook.call(query, &scored);
    }

    let truncated = match max_entries {
        Some(limit) if limit > 0 && scored.len() > limit => scored.split_off(limit),
        _ => Vec::new(),
    };

    Ranked {
        visible: scored,
        truncated,
    }
}

pub fn sort_scored(scored: &mut [ScoredCandidate<'_>], sort_by: SortBy) {
    match sort_by {
        SortBy::None => {}
        SortBy::Score => {
            scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
        }
        SortBy::Alpha => scored.sort_by(|a, b| a.text().cmp(b.text())),
    }
}

#[cfg(test)]
mod tests {
    use super::{PostFilter, ScoredCandidate, SortBy, rank};
    use crate::core::candidate::{CandidateCache, RenderId};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn cache(items: &[&str]) -> CandidateCache {
        CandidateCache::from_strings(items.iter().map(|s| s.to_string()))
    }

    fn scored<'a>(cache: &'a CandidateCache, scores: &[f64]) -> Vec<ScoredCandidate<'a>> {
        cache
            .iter()
            .zip(scores)
            .map(|(candidate, score)| ScoredCandidate::new(*score, candidate))
            .collect()
    }

    fn ids(list: &[ScoredCandidate<'_>]) -> Vec<usize> {
        list.iter().map(|s| s.candidate.render_id().index()).collect()
    }

    #[test]
    fn none_keeps_cache_order() {
        let cache = cache(&["c", "a", "b"]);
        let ranked = rank(scored(&cache, &[0.1, 0.9, 0.5]), SortBy::None, None, None, "x");
        assert_eq!(ids(&ranked.visible), vec![0, 1, 2]);
    }

    #[test]
    fn score_ties_keep_cache_order() {
        let cache = cache(&["a", "b", "c", "d"]);
        let ranked = rank(
            scored(&cache, &[0.5, 0.9, 0.5, 0.9]),
            SortBy::Score,
            None,
            None,
            "x",
        );
        assert_eq!(ids(&ranked.visible), vec![1, 3, 0, 2]);
    }

    #[test]
    fn alpha_is_case_sensitive_lexicographic() {
        let cache = cache(&["banana", "Cherry", "apple"]);
        let ranked = rank(scored(&cache, &[1.0, 1.0, 1.0]), SortBy::Alpha, None, None, "x");
        let texts: Vec<_> = ranked.visible.iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["Cherry", "apple", "banana"]);
    }

    #[test]
    fn cap_splits_off_lowest_ranked_tail() {
        let cache = cache(&["a", "b", "c", "d"]);
        let ranked = rank(
            scored(&cache, &[0.1, 0.4, 0.3, 0.2]),
            SortBy::Score,
            Some(2),
            None,
            "x",
        );
        assert_eq!(ids(&ranked.visible), vec![1, 2]);
        assert_eq!(ids(&ranked.truncated), vec![3, 0]);
    }

    #[test]
    fn post_filter_sees_full_sorted_list() {
        let seen: Arc<Mutex<Vec<(String, Vec<String>)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let hook = PostFilter::new(move |query, list| {
            let texts = list.iter().map(|s| s.text().to_string()).collect();
            sink.lock().expect("lock").push((query.to_string(), texts));
        });

        let cache = cache(&["a", "b", "c"]);
        let ranked = rank(
            scored(&cache, &[0.1, 0.3, 0.2]),
            SortBy::Score,
            Some(1),
            Some(&hook),
            "q",
        );

        assert_eq!(ids(&ranked.visible), vec![1]);
        let seen = seen.lock().expect("lock");
        assert_eq!(
            seen.as_slice(),
            &[("q".to_string(), vec!["b".to_string(), "c".to_string(), "a".to_string()])]
        );
    }

    #[test]
    fn sort_index_and_name_lookup() {
        assert_eq!(SortBy::from_index(1), Some(SortBy::Alpha));
        assert_eq!(SortBy::from_index(3), None);
        assert_eq!(SortBy::from_name("none"), Some(SortBy::None));
        assert_eq!(SortBy::from_name("Score"), None);
        assert_eq!(RenderId(2).index(), 2);
    }

    proptest! {
        #[test]
        fn score_order_is_descending_and_stable(scores in prop::collection::vec(1u8..5, 0..24)) {
            let items: Vec<String> = (0..scores.len()).map(|i| format!("item{i}")).collect();
            let cache = CandidateCache::from_strings(items);
            let values: Vec<f64> = scores.iter().map(|s| f64::from(*s)).collect();
            let ranked = rank(scored(&cache, &values), SortBy::Score, None, None, "x");
            for pair in ranked.visible.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
                if pair[0].score == pair[1].score {
                    prop_assert!(pair[0].candidate.render_id() < pair[1].candidate.render_id());
                }
            }
        }

        #[test]
        fn alpha_order_is_ascending(texts in prop::collection::vec("[a-zA-Z]{0,6}", 0..16)) {
            let cache = CandidateCache::from_strings(texts);
            let values = vec![1.0; cache.len()];
            let ranked = rank(scored(&cache, &values), SortBy::Alpha, None, None, "x");
            for pair in ranked.visible.windows(2) {
                prop_assert!(pair[0].text() <= pair[1].text());
            }
        }

        #[test]
        fn cap_keeps_prefix_of_full_order(
            scores in prop::collection::vec(1u8..9, 0..20),
            limit in 1usize..10,
        ) {
            let items: Vec<String> = (0..scores.len()).map(|i| format!("item{i}")).collect();
            let cache = CandidateCache::from_strings(items);
            let values: Vec<f64> = scores.iter().map(|s| f64::from(*s)).collect();
            let full = rank(scored(&cache, &values), SortBy::Score, None, None, "x");
            let capped = rank(scored(&cache, &values), SortBy::Score, Some(limit), None, "x");

            prop_assert!(capped.visible.len() <= limit);
            let split = limit.min(full.visible.len());
            prop_assert_eq!(ids(&capped.visible), ids(&full.visible[..split]));
            prop_assert_eq!(ids(&capped.truncated), ids(&full.visible[split..]));
        }
    }
}
