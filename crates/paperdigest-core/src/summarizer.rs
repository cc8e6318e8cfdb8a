//! Frequency-ranked extractive summarization.
//!
//! Every non-stop token is counted across the whole document; a sentence
//! scores the sum of those counts over its own tokens. The highest-scoring
//! sentences are returned in their original order.

use std::collections::HashMap;

use crate::stopwords::StopWords;
use crate::text::{split_sentences, tokenize};

/// Occurrence count of every scoring-eligible token in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    /// Count `tokens`, skipping anything in `stop_words`.
    pub fn from_tokens<I>(tokens: I, stop_words: &StopWords) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts = HashMap::new();
        for token in tokens {
            if !stop_words.contains(&token) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        Self { counts }
    }

    /// Count for `token`; zero when it is absent (stop words included).
    pub fn get(&self, token: &str) -> u64 {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `n` most frequent tokens, ties broken alphabetically.
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(n);
        entries
    }
}

/// A sentence of the source text with its position and score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSentence<'t> {
    /// 0-based position in the document.
    pub index: usize,
    pub text: &'t str,
    pub score: u64,
}

/// Pick the `length` best sentences and return their indices in document
/// order.
///
/// Equal scores go to the earlier sentence, so the result is deterministic.
pub fn select(ranked: &[RankedSentence<'_>], length: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ranked.len()).collect();
    order.sort_by(|&a, &b| ranked[b].score.cmp(&ranked[a].score).then(a.cmp(&b)));
    order.truncate(length);
    order.sort_unstable();
    order.into_iter().map(|i| ranked[i].index).collect()
}

/// Extractive summarizer over a borrowed stop-word set.
///
/// Holds no mutable state, so one instance can be shared between threads and
/// reused for any number of documents.
#[derive(Debug, Clone, Copy)]
pub struct Summarizer<'a> {
    stop_words: &'a StopWords,
}

impl Default for Summarizer<'static> {
    fn default() -> Self {
        Self::new(StopWords::english())
    }
}

impl<'a> Summarizer<'a> {
    pub fn new(stop_words: &'a StopWords) -> Self {
        Self { stop_words }
    }

    pub fn stop_words(&self) -> &'a StopWords {
        self.stop_words
    }

    /// Frequency table over the whole of `text`.
    pub fn frequency_table(&self, text: &str) -> FrequencyTable {
        FrequencyTable::from_tokens(tokenize(text), self.stop_words)
    }

    /// Score every sentence of `text`, in document order.
    pub fn rank<'t>(&self, text: &'t str) -> Vec<RankedSentence<'t>> {
        let table = self.frequency_table(text);
        split_sentences(text)
            .into_iter()
            .enumerate()
            .map(|(index, sentence)| RankedSentence {
                index,
                text: sentence,
                score: tokenize(sentence).iter().map(|t| table.get(t)).sum(),
            })
            .collect()
    }

    /// Summarize `text` down to at most `length` sentences.
    ///
    /// The selected sentences keep their original casing and order and are
    /// joined with single spaces. Empty text or a zero length yields an empty
    /// string; a length past the sentence count returns every sentence.
    pub fn summarize(&self, text: &str, length: usize) -> String {
        if length == 0 {
            return String::new();
        }

        let ranked = self.rank(text);
        let selected = select(&ranked, length);

        tracing::debug!(
            sentences = ranked.len(),
            requested = length,
            selected = selected.len(),
            "summarized text"
        );

        selected
            .iter()
            .map(|&i| ranked[i].text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
