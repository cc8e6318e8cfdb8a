use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use paperdigest_core::{BackendError, PdfBackend};

/// Share of the page height at the top treated as running header.
const HEADER_BAND: f32 = 0.04;
/// Share of the page height at the bottom treated as footer.
const FOOTER_BAND: f32 = 0.05;

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so that the
/// summarizer and the portal client do not transitively depend on it.
///
/// Each text block becomes one paragraph: its lines are joined into running
/// prose, and words hyphenated across a line end are rejoined. Blocks inside
/// the header and footer bands (page numbers, journal banners) are dropped so
/// they never end up inside a sentence that spans a page break.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn page_paragraphs(&self, page: &Page, out: &mut Vec<String>) -> Result<(), BackendError> {
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(extraction_error)?;
        let bounds = page.bounds().map_err(extraction_error)?;
        let height = bounds.y1 - bounds.y0;
        let header_limit = bounds.y0 + height * HEADER_BAND;
        let footer_limit = bounds.y1 - height * FOOTER_BAND;

        for block in text_page.blocks() {
            let area = block.bounds();
            if area.y1 <= header_limit || area.y0 >= footer_limit {
                continue;
            }
            let lines: Vec<String> = block
                .lines()
                .map(|line| {
                    line.chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect()
                })
                .collect();
            let paragraph = join_lines(&lines);
            if !paragraph.is_empty() {
                out.push(paragraph);
            }
        }
        Ok(())
    }
}

fn extraction_error(e: impl ToString) -> BackendError {
    BackendError::ExtractionError(e.to_string())
}

/// Join the lines of one text block into a single paragraph.
///
/// A line ending in `-` directly after a letter is glued to the next line
/// when that line starts with a lowercase letter (`summa-` + `rization`).
/// Every other line break becomes a space.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut paragraph = String::new();
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        let rejoin = paragraph.ends_with('-')
            && paragraph
                .chars()
                .rev()
                .nth(1)
                .is_some_and(char::is_alphabetic)
            && line.chars().next().is_some_and(char::is_lowercase);
        if rejoin {
            paragraph.pop();
        } else if !paragraph.is_empty() {
            paragraph.push(' ');
        }
        paragraph.push_str(line);
    }
    paragraph
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let mut paragraphs = Vec::new();
        let mut pages = 0usize;
        for page in document.pages().map_err(extraction_error)? {
            let page = page.map_err(extraction_error)?;
            self.page_paragraphs(&page, &mut paragraphs)?;
            pages += 1;
        }

        tracing::debug!(
            path = %path.display(),
            pages,
            paragraphs = paragraphs.len(),
            "extracted PDF text"
        );

        Ok(paragraphs.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_open_error() {
        let err = MupdfBackend::new()
            .extract_text(Path::new("/nonexistent/paper.pdf"))
            .unwrap_err();
        assert!(matches!(err, BackendError::OpenError(_)));
    }

    #[test]
    fn wrapped_lines_become_one_paragraph() {
        let lines = ["Frequency-based summa-", "rization selects  ", "", "  whole sentences."];
        assert_eq!(
            join_lines(&lines),
            "Frequency-based summarization selects whole sentences."
        );
    }

    #[test]
    fn hyphen_before_capital_or_digit_is_kept() {
        assert_eq!(join_lines(&["IEEE-", "Xplore"]), "IEEE- Xplore");
        assert_eq!(join_lines(&["pages 10-", "12"]), "pages 10- 12");
        assert_eq!(join_lines(&["well -", "known"]), "well - known");
    }

    #[test]
    fn empty_block_is_empty() {
        assert_eq!(join_lines::<&str>(&[]), "");
        assert_eq!(join_lines(&["  ", ""]), "");
    }
}
