//! Lexical chunk selection: distinct question words found as substrings of chunk text.
//!
//! This is a deliberately naive ranking. A chunk scores one point per distinct
//! question word contained anywhere in its lowercased text, so "cat" matches
//! "category". There is no stemming, weighting or length normalization.

use std::collections::HashSet;

use documind_memory::Chunk;

pub const DEFAULT_TOP_K: usize = 3;

/// A chunk paired with the number of distinct question words it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retriever {
    top_k: usize,
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl Retriever {
    #[must_use]
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Up to `top_k` chunks with at least one overlapping word, best first.
    #[must_use]
    pub fn select<'a>(&self, chunks: &'a [Chunk], question: &str) -> Vec<&'a Chunk> {
        self.rank(chunks, question)
            .into_iter()
            .map(|scored| scored.chunk)
            .collect()
    }

    /// Same selection as [`select`](Self::select), keeping the scores.
    ///
    /// Ties keep their original order.
    #[must_use]
    pub fn rank<'a>(&self, chunks: &'a [Chunk], question: &str) -> Vec<ScoredChunk<'a>> {
        let words = question_words(question);
        if words.is_empty() || self.top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<ScoredChunk<'a>> = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk,
                score: overlap_score(&chunk.text, &words),
            })
            .filter(|scored| scored.score > 0)
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.top_k);
        scored
    }
}

/// Distinct lowercase words of `question`, with non-alphanumeric characters removed.
#[must_use]
pub fn question_words(question: &str) -> HashSet<String> {
    question
        .split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Count of `words` that occur somewhere in the lowercased `text`.
#[must_use]
pub fn overlap_score(text: &str, words: &HashSet<String>) -> usize {
    let haystack = text.to_lowercase();
    words
        .iter()
        .filter(|word| haystack.contains(word.as_str()))
        .count()
}
