use super::scorer::Scorer;

const EMPTY_ABBREVIATION_SCORE: f64 = 0.9;
const SKIPPED_CHAR_PENALTY: f64 = 0.15;

/// Quicksilver-style abbreviation scoring.
///
/// The query is matched as an in-order subsequence of the text, preferring
/// the longest contiguous chunk at each step. Matches that start right after
/// whitespace or on an uppercase letter are penalised less for the skipped
/// prefix than matches in the middle of a word. Scores fall in `(0, 1]`;
/// `0.0` means the query is not a subsequence of the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuicksilverScorer;

impl Scorer for QuicksilverScorer {
    fn score(&self, text: &str, query: &str) -> f64 {
        let text: Vec<char> = text.chars().collect();
        let query: Vec<char> = query.chars().collect();
        if query.is_empty() {
            return 0.0;
        }
        score_abbreviation(&text, &query, 0)
    }
}

fn score_abbreviation(text: &[char], abbreviation: &[char], offset: usize) -> f64 {
    if abbreviation.is_empty() {
        return EMPTY_ABBREVIATION_SCORE;
    }
    if abbreviation.len() > text.len() {
        return 0.0;
    }

    for chunk_len in (1..=abbreviation.len()).rev() {
        let chunk = &abbreviation[..chunk_len];
        let Some(index) = find_chunk(text, chunk) else {
            continue;
        };
        if index + abbreviation.len() > text.len() + offset {
            continue;
        }

        let rest = &text[index + chunk_len..];
        let remaining = score_abbreviation(rest, &abbreviation[chunk_len..], offset + index);
        if remaining <= 0.0 {
            continue;
        }

        let mut score = (text.len() - rest.len()) as f64;
        if index != 0 {
            score -= skipped_prefix_penalty(text, index);
        }
        score += remaining * rest.len() as f64;
        return score / text.len() as f64;
    }

    0.0
}

fn skipped_prefix_penalty(text: &[char], index: usize) -> f64 {
    let before = text[index - 1];
    if is_word_gap(before) {
        text[..index - 1]
            .iter()
            .map(|ch| if is_word_gap(*ch) { 1.0 } else { SKIPPED_CHAR_PENALTY })
            .sum()
    } else if text[index].is_ascii_uppercase() {
        text[..index]
            .iter()
            .map(|ch| {
                if ch.is_ascii_uppercase() {
                    1.0
                } else {
                    SKIPPED_CHAR_PENALTY
                }
            })
            .sum()
    } else {
        index as f64
    }
}

fn find_chunk(text: &[char], chunk: &[char]) -> Option<usize> {
    if chunk.len() > text.len() {
        return None;
    }
    (0..=text.len() - chunk.len()).find(|&start| text[start..start + chunk.len()] == *chunk)
}

fn is_word_gap(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}
