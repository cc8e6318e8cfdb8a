use std::io::Write;

use owo_colors::OwoColorize;

use paperdigest_core::{FrequencyTable, RankedSentence};
use paperdigest_ingest::{DigestReport, DocumentOutcome};
use paperdigest_portal::DownloadReport;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn heading(w: &mut dyn Write, text: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", text.bold().cyan())
    } else {
        writeln!(w, "{}", text)
    }
}

/// Print the result of the download step.
pub fn print_download_summary(
    w: &mut dyn Write,
    report: &DownloadReport,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Downloaded {} PDF(s)", report.downloaded.len())?;
    for skipped in &report.skipped {
        let line = format!("  skipped {} ({})", skipped.url, skipped.reason);
        if color.enabled() {
            writeln!(w, "{}", line.dimmed())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    writeln!(w)?;
    Ok(())
}

/// Print per-document summaries followed by the aggregate summary.
pub fn print_digest(w: &mut dyn Write, report: &DigestReport, color: ColorMode) -> std::io::Result<()> {
    if report.is_empty() {
        writeln!(w, "No documents to summarize.")?;
        return Ok(());
    }

    for (i, document) in report.documents.iter().enumerate() {
        heading(w, &format!("[{}] {}", i + 1, document.filename()), color)?;
        match document {
            DocumentOutcome::Summarized { summary, .. } if summary.is_empty() => {
                writeln!(w, "(no text extracted)")?;
            }
            DocumentOutcome::Summarized { summary, .. } => writeln!(w, "{}", summary)?,
            DocumentOutcome::Failed { error, .. } => {
                if color.enabled() {
                    writeln!(w, "{} {}", "FAILED:".red(), error)?;
                } else {
                    writeln!(w, "FAILED: {}", error)?;
                }
            }
        }
        writeln!(w)?;
    }

    heading(w, "Summary of all documents", color)?;
    writeln!(w, "{}", report.aggregate)?;

    let failed = report.failed_count();
    if failed > 0 {
        writeln!(w)?;
        let line = format!("{} of {} document(s) could not be read", failed, report.documents.len());
        if color.enabled() {
            writeln!(w, "{}", line.yellow())?;
        } else {
            writeln!(w, "{}", line)?;
        }
    }
    Ok(())
}

/// Print every sentence with its score, marking the ones kept in the summary.
pub fn print_ranked(
    w: &mut dyn Write,
    ranked: &[RankedSentence<'_>],
    selected: &[usize],
    table: &FrequencyTable,
    color: ColorMode,
) -> std::io::Result<()> {
    let keywords: Vec<String> = table
        .most_common(10)
        .into_iter()
        .map(|(token, count)| format!("{token} ({count})"))
        .collect();
    writeln!(w, "Top tokens: {}", keywords.join(", "))?;
    writeln!(w)?;

    for sentence in ranked {
        let kept = selected.contains(&sentence.index);
        let marker = if kept { "*" } else { " " };
        let prefix = format!("{} [{:>3}] {:>5}", marker, sentence.index + 1, sentence.score);
        if color.enabled() && kept {
            writeln!(w, "{}  {}", prefix.green(), sentence.text)?;
        } else if color.enabled() {
            writeln!(w, "{}  {}", prefix.dimmed(), sentence.text.dimmed())?;
        } else {
            writeln!(w, "{}  {}", prefix, sentence.text)?;
        }
    }
    Ok(())
}
