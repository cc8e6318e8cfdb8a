use std::path::{Path, PathBuf};

use thiserror::Error;

use paperdigest_core::text::normalize_whitespace;
use paperdigest_core::{BackendError, PdfBackend, expand_ligatures};

pub mod digest;

pub use digest::{
    DigestOptions, DigestReport, DocumentOutcome, aggregate_summaries, digest_directory,
    digest_file, list_pdfs,
};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("PDF extraction error: {0}")]
    Backend(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} is not valid UTF-8 text")]
    NotUtf8(PathBuf),
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| wanted.iter().any(|w| e.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

/// Plain-text inputs that skip PDF extraction.
pub fn is_text_path(path: &Path) -> bool {
    has_extension(path, &["txt", "md", "text"])
}

pub fn is_pdf_path(path: &Path) -> bool {
    has_extension(path, &["pdf"])
}

/// Read the text of a document.
///
/// Dispatches on file extension:
/// - `.txt`, `.md`, `.text` → read as UTF-8
/// - anything else → PDF text extraction through `backend`
///
/// Typographic ligatures are expanded in both cases. Extracted PDF text also
/// has its line and page breaks collapsed to single spaces, so a sentence
/// that wraps keeps reading as one line in the summary.
pub fn read_document(path: &Path, backend: &dyn PdfBackend) -> Result<String, IngestError> {
    if is_text_path(path) {
        let bytes = std::fs::read(path)?;
        let text =
            String::from_utf8(bytes).map_err(|_| IngestError::NotUtf8(path.to_path_buf()))?;
        return Ok(expand_ligatures(&text));
    }
    let text = backend.extract_text(path)?;
    Ok(normalize_whitespace(&expand_ligatures(&text)))
}

/// The MuPDF backend with its default header/footer handling.
#[cfg(feature = "pdf")]
pub fn default_backend() -> paperdigest_pdf_mupdf::MupdfBackend {
    paperdigest_pdf_mupdf::MupdfBackend::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverCalled;

    impl PdfBackend for NeverCalled {
        fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
            panic!("backend called for {}", path.display());
        }
    }

    #[test]
    fn extension_checks_ignore_case() {
        assert!(is_pdf_path(Path::new("a/B.PDF")));
        assert!(!is_pdf_path(Path::new("a/b.pdf.txt")));
        assert!(is_text_path(Path::new("notes.Md")));
        assert!(!is_text_path(Path::new("README")));
    }

    #[test]
    fn text_files_bypass_the_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.txt");
        std::fs::write(&path, "An e\u{FB03}cient method.").unwrap();
        assert_eq!(
            read_document(&path, &NeverCalled).unwrap(),
            "An efficient method."
        );
    }

    struct WrappedLines;

    impl PdfBackend for WrappedLines {
        fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
            Ok("Graph search\nscales to large\n\n  networks.\nE\u{FB03}cient indexing helps.\n".into())
        }
    }

    #[test]
    fn pdf_line_breaks_are_collapsed() {
        let text = read_document(Path::new("paper.pdf"), &WrappedLines).unwrap();
        assert_eq!(
            text,
            "Graph search scales to large networks. Efficient indexing helps."
        );
        assert_eq!(
            paperdigest_core::Summarizer::default().summarize(&text, 1),
            "Graph search scales to large networks."
        );
    }

    #[test]
    fn text_files_keep_their_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Title\n\nBody text.").unwrap();
        assert_eq!(
            read_document(&path, &NeverCalled).unwrap(),
            "# Title\n\nBody text."
        );
    }

    #[test]
    fn invalid_utf8_text_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            read_document(&path, &NeverCalled),
            Err(IngestError::NotUtf8(_))
        ));
    }
}
