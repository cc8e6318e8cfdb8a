use std::collections::HashSet;
use std::path::{Path, PathBuf};

use reqwest::Url;
use thiserror::Error;

use crate::search::SearchRecord;
use crate::{PortalClient, PortalError};

/// Why a record did not produce a PDF on disk.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("already downloaded in this run")]
    Duplicate,
    #[error("HTTP {0}")]
    HttpStatus(u16),
    #[error("no PDF frame on the page")]
    NoIframe,
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not save file: {0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDownload {
    pub url: String,
    pub reason: SkipReason,
}

/// Outcome of [`PortalClient::download_all`].
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub skipped: Vec<SkippedDownload>,
}

/// Progress events emitted while downloading. `index` is 1-based.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Fetching {
        index: usize,
        total: usize,
        url: String,
    },
    Saved {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Skipped {
        index: usize,
        total: usize,
        url: String,
        reason: SkipReason,
    },
}

/// Local file name for a PDF link: the last path segment, then the last
/// `=`-separated part of it (the article number on stamp URLs).
///
/// `https://host/stamp/stamp.jsp?tp=&arnumber=123` → `123.pdf`
pub fn pdf_file_name(link: &str) -> String {
    let last_segment = link.rsplit('/').next().unwrap_or(link);
    let stem = last_segment.rsplit('=').next().unwrap_or(last_segment);
    let stem: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        "document.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

/// `name` unless `taken` already claims it; otherwise the first free
/// `<stem>-2.pdf`, `<stem>-3.pdf`, ...
pub fn unique_file_name(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let stem = name.strip_suffix(".pdf").unwrap_or(name);
    (2..)
        .map(|n| format!("{stem}-{n}.pdf"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

pub fn is_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

/// Resolve the `src` of the first `<iframe>` in `html` against `page_url`.
pub fn find_iframe_src(html: &str, page_url: &str) -> Option<Url> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("iframe[src]").ok()?;
    let src = document
        .select(&selector)
        .filter_map(|el| el.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())?;
    Url::parse(page_url).ok()?.join(src).ok()
}

impl PortalClient {
    /// Download the PDF behind every record into `dir`, one at a time.
    ///
    /// Per-record failures are reported as skips and do not stop the run.
    /// Only creating `dir` can fail the whole call.
    pub async fn download_all(
        &self,
        records: &[SearchRecord],
        dir: &Path,
        mut on_event: impl FnMut(DownloadEvent),
    ) -> Result<DownloadReport, PortalError> {
        tokio::fs::create_dir_all(dir).await?;

        let total = records.len();
        // Links already saved in this run. A link whose download failed is
        // tried again if it shows up later.
        let mut saved = HashSet::new();
        let mut taken_names = HashSet::new();
        let mut report = DownloadReport::default();

        for (i, record) in records.iter().enumerate() {
            let index = i + 1;
            let url = record.pdf_url.clone();

            let outcome = if saved.contains(&url) {
                Err(SkipReason::Duplicate)
            } else {
                on_event(DownloadEvent::Fetching {
                    index,
                    total,
                    url: url.clone(),
                });
                let name = unique_file_name(&pdf_file_name(&url), |n| taken_names.contains(n));
                let result = self.download_one(&url, &dir.join(&name)).await;
                if result.is_ok() {
                    saved.insert(url.clone());
                    taken_names.insert(name);
                }
                result
            };

            match outcome {
                Ok(path) => {
                    tracing::info!(index, path = %path.display(), "downloaded PDF");
                    on_event(DownloadEvent::Saved {
                        index,
                        total,
                        path: path.clone(),
                    });
                    report.downloaded.push(path);
                }
                Err(reason) => {
                    tracing::warn!(index, url = %url, reason = %reason, "skipping PDF");
                    on_event(DownloadEvent::Skipped {
                        index,
                        total,
                        url: url.clone(),
                        reason: reason.clone(),
                    });
                    report.skipped.push(SkippedDownload { url, reason });
                }
            }
        }

        tracing::info!(
            downloaded = report.downloaded.len(),
            skipped = report.skipped.len(),
            "all PDFs processed"
        );
        Ok(report)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SkipReason> {
        let resp = self
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| SkipReason::Request(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SkipReason::HttpStatus(resp.status().as_u16()));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| SkipReason::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn download_one(&self, url: &str, path: &Path) -> Result<PathBuf, SkipReason> {
        let page = self.fetch(url).await?;

        // The stamp page wraps the document in an iframe; some mirrors serve
        // the PDF directly.
        let data = if is_pdf(&page) {
            page
        } else {
            let html = String::from_utf8_lossy(&page);
            let frame = find_iframe_src(&html, url).ok_or(SkipReason::NoIframe)?;
            self.fetch(frame.as_str()).await?
        };

        tokio::fs::write(path, &data)
            .await
            .map_err(|e| SkipReason::Io(e.to_string()))?;
        Ok(path.to_path_buf())
    }
}
