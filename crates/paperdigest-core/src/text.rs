//! Word tokenization, sentence segmentation and cleanup of PDF-extracted text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Abbreviations (lowercase, without their final period) that do not end a
/// sentence. Weighted toward what shows up in papers.
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "al", "fig",
        "figs", "eq", "eqs", "vol", "pp", "cf", "approx", "resp", "sec", "tab", "ch", "inc", "ltd",
        "dept", "univ",
    ]
    .into_iter()
    .collect()
});

/// Lowercase `text` and split it into alphanumeric runs.
///
/// Punctuation and whitespace only separate tokens; they never appear in the
/// output.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '}' | '\u{201D}' | '\u{2019}')
}

/// Whether the text right before a period ends in a known abbreviation or a
/// single capital initial ("J. Smith").
fn ends_with_abbreviation(prefix: &str) -> bool {
    let Some(word) = prefix.split_whitespace().next_back() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut chars = word.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        if first.is_uppercase() {
            return true;
        }
    }

    ABBREVIATIONS.contains(word.to_lowercase().as_str())
}

fn push_trimmed<'t>(sentences: &mut Vec<&'t str>, candidate: &'t str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Split `text` into sentences, borrowing from the input.
///
/// A boundary is a run of `.`, `!` or `?` (optionally followed by closing
/// quotes or brackets) that is followed by whitespace or the end of the text.
/// A period after a known abbreviation or a capital initial is not a
/// boundary. Sentences keep their original casing and inner whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_terminal(c) {
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if is_terminal(next) || is_closing(next) {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace(),
        };
        if !at_boundary {
            continue;
        }
        if c == '.' && ends_with_abbreviation(&text[start..i]) {
            continue;
        }

        push_trimmed(&mut sentences, &text[start..end]);
        start = end;
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Collapse every whitespace run (including page-break newlines) to one space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_drops_punctuation() {
        assert_eq!(
            tokenize("Cats, dogs & 42 Mammals!"),
            vec!["cats", "dogs", "42", "mammals"]
        );
    }

    #[test]
    fn tokenize_splits_contractions_on_apostrophe() {
        assert_eq!(tokenize("Don't stop"), vec!["don", "t", "stop"]);
    }

    #[test]
    fn tokenize_keeps_non_ascii_letters() {
        assert_eq!(tokenize("Größe café"), vec!["größe", "café"]);
    }

    #[test]
    fn tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" .,; ").is_empty());
    }

    #[test]
    fn splits_basic_sentences() {
        let sentences = split_sentences("Hello world. This is a test! Is it done? Yes.");
        assert_eq!(
            sentences,
            vec!["Hello world.", "This is a test!", "Is it done?", "Yes."]
        );
    }

    #[test]
    fn empty_and_blank_text_have_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn trailing_text_without_terminator_is_a_sentence() {
        assert_eq!(
            split_sentences("First one. Second without end"),
            vec!["First one.", "Second without end"]
        );
    }

    #[test]
    fn decimals_and_urls_do_not_split() {
        assert_eq!(
            split_sentences("Accuracy rose to 93.5 percent on ieee.org data. Done."),
            vec!["Accuracy rose to 93.5 percent on ieee.org data.", "Done."]
        );
    }

    #[test]
    fn abbreviations_do_not_split() {
        let text = "Results follow Smith et al. in most cases, e.g. on CIFAR. See Fig. 3 for details.";
        assert_eq!(
            split_sentences(text),
            vec![
                "Results follow Smith et al. in most cases, e.g. on CIFAR.",
                "See Fig. 3 for details."
            ]
        );
    }

    #[test]
    fn initials_do_not_split() {
        assert_eq!(
            split_sentences("Written by J. Smith last year. It helped."),
            vec!["Written by J. Smith last year.", "It helped."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_their_sentence() {
        assert_eq!(
            split_sentences("He said \"stop.\" Then he left (quietly.) End."),
            vec!["He said \"stop.\"", "Then he left (quietly.)", "End."]
        );
    }

    #[test]
    fn repeated_terminators_form_one_boundary() {
        assert_eq!(
            split_sentences("Really?! Yes... Fine."),
            vec!["Really?!", "Yes...", "Fine."]
        );
    }

    #[test]
    fn newlines_count_as_boundary_whitespace() {
        assert_eq!(
            split_sentences("Line one.\nLine two.\n\nLine three."),
            vec!["Line one.", "Line two.", "Line three."]
        );
    }

    #[test]
    fn sentences_borrow_from_input() {
        let text = String::from("Alpha beta. Gamma delta.");
        let sentences = split_sentences(&text);
        let range = text.as_ptr() as usize..text.as_ptr() as usize + text.len();
        assert!(sentences.iter().all(|s| range.contains(&(s.as_ptr() as usize))));
    }

    #[test]
    fn expand_ligatures_replaces_all_forms() {
        assert_eq!(
            expand_ligatures("e\u{FB03}cient \u{FB01}rst \u{FB02}ow"),
            "efficient first flow"
        );
    }

    #[test]
    fn normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("  a \n\n b\tc  "), "a b c");
    }
}
