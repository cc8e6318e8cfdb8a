use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod stopwords;
pub mod summarizer;
pub mod text;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use config_file::{ConfigError, ConfigFile, Settings};
pub use stopwords::StopWords;
pub use summarizer::{FrequencyTable, RankedSentence, Summarizer};
pub use text::{expand_ligatures, split_sentences, tokenize};

/// Number of sentences kept per document when nothing else is configured.
pub const DEFAULT_SUMMARY_LENGTH: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("summary length must not be negative (got {0})")]
    InvalidLength(i64),
    #[error("invalid summary length {0:?}: expected a whole number")]
    UnparsableLength(String),
}

/// A validated sentence count for a summary.
///
/// Zero is allowed and yields an empty summary; negative counts are rejected
/// when converting from signed input (CLI flags, form fields, config values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SummaryLength(usize);

impl SummaryLength {
    pub const fn new(sentences: usize) -> Self {
        Self(sentences)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for SummaryLength {
    fn default() -> Self {
        Self(DEFAULT_SUMMARY_LENGTH)
    }
}

impl From<usize> for SummaryLength {
    fn from(sentences: usize) -> Self {
        Self(sentences)
    }
}

impl TryFrom<i64> for SummaryLength {
    type Error = SummarizeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(Self)
            .map_err(|_| SummarizeError::InvalidLength(value))
    }
}

impl FromStr for SummaryLength {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| SummarizeError::UnparsableLength(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summarize `text` with the built-in English stop words.
///
/// Fails with [`SummarizeError::InvalidLength`] when `length` is negative;
/// no partial result is produced in that case.
pub fn summarize_text(text: &str, length: i64) -> Result<String, SummarizeError> {
    let length = SummaryLength::try_from(length)?;
    Ok(Summarizer::default().summarize(text, length.get()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_length_is_rejected() {
        assert_eq!(
            summarize_text("One sentence.", -1),
            Err(SummarizeError::InvalidLength(-1))
        );
    }

    #[test]
    fn zero_length_is_valid_and_empty() {
        assert_eq!(summarize_text("One sentence.", 0).unwrap(), "");
    }

    #[test]
    fn length_parses_from_flag_text() {
        assert_eq!("3".parse::<SummaryLength>().unwrap().get(), 3);
        assert_eq!(" 0 ".parse::<SummaryLength>().unwrap().get(), 0);
        assert_eq!(
            "-2".parse::<SummaryLength>(),
            Err(SummarizeError::InvalidLength(-2))
        );
        assert!(matches!(
            "ten".parse::<SummaryLength>(),
            Err(SummarizeError::UnparsableLength(_))
        ));
    }

    #[test]
    fn default_length_is_ten() {
        assert_eq!(SummaryLength::default().get(), 10);
    }
}
