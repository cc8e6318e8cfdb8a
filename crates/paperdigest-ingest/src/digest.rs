//! Summaries for a directory of downloaded documents.
//!
//! Each PDF is summarized on its own; the per-document summaries are then
//! concatenated and summarized again. Both steps call the same
//! [`Summarizer::summarize`].

use std::path::{Path, PathBuf};

use paperdigest_core::{PdfBackend, Settings, Summarizer, SummaryLength};

use crate::{IngestError, is_pdf_path, read_document};

/// Separator placed after every per-document summary in the aggregate text.
const SUMMARY_SEPARATOR: &str = "\n\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    /// Sentences per document.
    pub length: SummaryLength,
    /// Sentences in the summary of summaries.
    pub aggregate_length: SummaryLength,
    /// Leave processed PDFs on disk.
    pub keep_files: bool,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            length: SummaryLength::default(),
            aggregate_length: SummaryLength::default(),
            keep_files: false,
        }
    }
}

impl From<&Settings> for DigestOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            length: settings.length,
            aggregate_length: settings.aggregate_length,
            keep_files: settings.keep_pdfs,
        }
    }
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Summarized { filename: String, summary: String },
    Failed { filename: String, error: String },
}

impl DocumentOutcome {
    pub fn filename(&self) -> &str {
        match self {
            DocumentOutcome::Summarized { filename, .. } | DocumentOutcome::Failed { filename, .. } => {
                filename
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestReport {
    /// One entry per PDF, in file-name order.
    pub documents: Vec<DocumentOutcome>,
    /// Summary of the concatenated per-document summaries.
    pub aggregate: String,
}

impl DigestReport {
    /// `(filename, summary)` for every successfully summarized document.
    pub fn summaries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents.iter().filter_map(|d| match d {
            DocumentOutcome::Summarized { filename, summary } => {
                Some((filename.as_str(), summary.as_str()))
            }
            DocumentOutcome::Failed { .. } => None,
        })
    }

    pub fn failed_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d, DocumentOutcome::Failed { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// PDF files directly inside `dir`, sorted by name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf_path(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Summarize a single document.
pub fn digest_file(
    path: &Path,
    backend: &dyn PdfBackend,
    summarizer: &Summarizer<'_>,
    length: SummaryLength,
) -> Result<String, IngestError> {
    let text = read_document(path, backend)?;
    Ok(summarizer.summarize(&text, length.get()))
}

/// Summarize the concatenation of per-document summaries.
pub fn aggregate_summaries<'s>(
    summaries: impl IntoIterator<Item = &'s str>,
    summarizer: &Summarizer<'_>,
    length: SummaryLength,
) -> String {
    let mut combined = String::new();
    for summary in summaries {
        combined.push_str(summary);
        combined.push_str(SUMMARY_SEPARATOR);
    }
    summarizer.summarize(&combined, length.get())
}

/// Summarize every PDF in `dir`, then summarize the summaries.
///
/// A document that cannot be read is recorded as [`DocumentOutcome::Failed`]
/// and left on disk; the rest of the directory is still processed.
/// Successfully summarized files are deleted unless `options.keep_files`.
pub fn digest_directory(
    dir: &Path,
    backend: &dyn PdfBackend,
    summarizer: &Summarizer<'_>,
    options: &DigestOptions,
) -> Result<DigestReport, IngestError> {
    let pdfs = list_pdfs(dir)?;
    tracing::info!(dir = %dir.display(), count = pdfs.len(), "summarizing documents");

    let mut documents = Vec::with_capacity(pdfs.len());

    for path in &pdfs {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match digest_file(path, backend, summarizer, options.length) {
            Ok(summary) => {
                tracing::debug!(file = %filename, chars = summary.len(), "document summarized");
                if !options.keep_files {
                    if let Err(e) = std::fs::remove_file(path) {
                        tracing::warn!(file = %filename, error = %e, "could not remove processed PDF");
                    }
                }
                documents.push(DocumentOutcome::Summarized { filename, summary });
            }
            Err(e) => {
                tracing::warn!(file = %filename, error = %e, "skipping unreadable document");
                documents.push(DocumentOutcome::Failed {
                    filename,
                    error: e.to_string(),
                });
            }
        }
    }

    let mut report = DigestReport {
        documents,
        aggregate: String::new(),
    };
    report.aggregate = aggregate_summaries(
        report.summaries().map(|(_, summary)| summary),
        summarizer,
        options.aggregate_length,
    );

    Ok(report)
}
