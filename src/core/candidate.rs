/// Handle the host uses to address the rendered row of a candidate.
/// Identity is positional: the id equals the candidate's index in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(pub usize);

impl RenderId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    text: String,
    render_id: RenderId,
}

impl Candidate {
    pub fn new(text: impl Into<String>, render_id: RenderId) -> Self {
        Self {
            text: text.into(),
            render_id,
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn render_id(&self) -> RenderId {
        self.render_id
    }
}

/// Ordered, immutable candidate list built once per instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCache {
    entries: Vec<Candidate>,
}

impl CandidateCache {
    pub fn from_strings(data: impl IntoIterator<Item = String>) -> Self {
        let entries = data
            .into_iter()
            .enumerate()
            .map(|(index, text)| Candidate::new(text, RenderId(index)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: RenderId) -> Option<&Candidate> {
        self.entries.get(id.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.entries.iter()
    }

    pub fn render_ids(&self) -> impl Iterator<Item = RenderId> + '_ {
        self.entries.iter().map(Candidate::render_id)
    }
}

impl<'a> IntoIterator for &'a CandidateCache {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{CandidateCache, RenderId};

    #[test]
    fn duplicates_are_distinct_entries() {
        let cache = CandidateCache::from_strings(vec!["a".to_string(), "a".to_string()]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(RenderId(1)).map(|c| c.text()), Some("a"));
        assert_ne!(
            cache.get(RenderId(0)).map(|c| c.render_id()),
            cache.get(RenderId(1)).map(|c| c.render_id())
        );
    }

    #[test]
    fn render_ids_follow_input_order() {
        let cache = CandidateCache::from_strings(["x", "y", "z"].map(String::from));
        let ids: Vec<_> = cache.render_ids().collect();
        assert_eq!(ids, vec![RenderId(0), RenderId(1), RenderId(2)]);
    }
}
