//! Behavioural tests for the public summarization API.

use paperdigest_core::{
    SummarizeError, Summarizer, SummaryLength, split_sentences, summarize_text,
};

const PETS: &str =
    "Cats are mammals. Dogs are mammals too. The sky is blue. Cats and dogs are common pets.";

const ABSTRACT: &str = "Extractive summarization selects sentences from a document. \
    Frequency based summarization scores each sentence by the frequency of its words. \
    The weather was pleasant during the conference. \
    Sentences with frequent words are selected for the summary. \
    Summarization of long documents benefits from sentence frequency scores. \
    Lunch was served at noon.";

/// Whether `needle` appears in `haystack` in the same relative order.
fn is_subsequence(needle: &[&str], haystack: &[&str]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|n| it.any(|h| h == n))
}

#[test]
fn empty_text_gives_empty_summary() {
    let summarizer = Summarizer::default();
    assert_eq!(summarizer.summarize("", 5), "");
    assert_eq!(summarize_text("", 5).unwrap(), "");
}

#[test]
fn zero_length_gives_empty_summary() {
    assert_eq!(Summarizer::default().summarize(PETS, 0), "");
    assert_eq!(Summarizer::default().summarize(ABSTRACT, 0), "");
}

#[test]
fn negative_length_is_an_invalid_argument() {
    assert_eq!(summarize_text(PETS, -3), Err(SummarizeError::InvalidLength(-3)));
    assert!(SummaryLength::try_from(-1i64).is_err());
}

#[test]
fn length_at_or_past_sentence_count_returns_everything_in_order() {
    let summarizer = Summarizer::default();
    let all = split_sentences(ABSTRACT).join(" ");
    let n = split_sentences(ABSTRACT).len();
    assert_eq!(n, 6);
    for length in [n, n + 1, 100] {
        assert_eq!(summarizer.summarize(ABSTRACT, length), all);
    }
}

#[test]
fn summary_is_idempotent() {
    let summarizer = Summarizer::default();
    let first = summarizer.summarize(ABSTRACT, 3);
    for _ in 0..5 {
        assert_eq!(summarizer.summarize(ABSTRACT, 3), first);
    }
    assert_eq!(Summarizer::default().summarize(ABSTRACT, 3), first);
}

#[test]
fn summary_preserves_document_order() {
    let summarizer = Summarizer::default();
    let original = split_sentences(ABSTRACT);
    for length in 1..=original.len() {
        let summary = summarizer.summarize(ABSTRACT, length);
        let picked = split_sentences(&summary);
        assert_eq!(picked.len(), length);
        assert!(
            is_subsequence(&picked, &original),
            "length {length}: {picked:?} is not an ordered subsequence"
        );
    }
}

#[test]
fn summary_never_exceeds_requested_length() {
    let summarizer = Summarizer::default();
    for length in 0..4 {
        let summary = summarizer.summarize(PETS, length);
        assert!(split_sentences(&summary).len() <= length);
    }
}

#[test]
fn low_content_sentence_is_never_preferred() {
    let summary = Summarizer::default().summarize(PETS, 2);
    assert!(!summary.contains("The sky is blue."));
    assert_eq!(summary, "Cats are mammals. Cats and dogs are common pets.");

    let three = Summarizer::default().summarize(PETS, 3);
    assert_eq!(
        three,
        "Cats are mammals. Dogs are mammals too. Cats and dogs are common pets."
    );
}

#[test]
fn content_heavy_sentences_win() {
    let summary = Summarizer::default().summarize(ABSTRACT, 2);
    assert!(!summary.contains("Lunch was served"));
    assert!(!summary.contains("weather"));
}

#[test]
fn all_stop_word_text_still_returns_first_sentences() {
    let text = "It is what it is. We are here. They were there.";
    let summarizer = Summarizer::default();
    assert!(summarizer.rank(text).iter().all(|r| r.score == 0));
    assert_eq!(summarizer.summarize(text, 2), "It is what it is. We are here.");
}

#[test]
fn summarizer_is_shareable_across_threads() {
    let summarizer = Summarizer::default();
    let expected = summarizer.summarize(ABSTRACT, 2);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| summarizer.summarize(ABSTRACT, 2)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn summary_of_summaries_uses_the_same_routine() {
    let summarizer = Summarizer::default();
    let first = summarizer.summarize(ABSTRACT, 3);
    let second = summarizer.summarize(PETS, 2);
    let combined = format!("{first}\n\n\n{second}\n\n\n");
    let aggregate = summarizer.summarize(&combined, 2);
    let pool: Vec<&str> = split_sentences(&combined);
    let picked = split_sentences(&aggregate);
    assert_eq!(picked.len(), 2);
    assert!(is_subsequence(&picked, &pool));
}
