//! Search, download and digest for a single web request.

use std::sync::Arc;

use thiserror::Error;

use paperdigest_core::Summarizer;
use paperdigest_ingest::{DigestOptions, DigestReport, IngestError, digest_directory};
use paperdigest_portal::{DownloadEvent, DownloadReport, PortalError};

use crate::state::AppState;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("portal request failed: {0}")]
    Portal(#[from] PortalError),
    #[error("summarizing failed: {0}")]
    Ingest(#[from] IngestError),
    #[error("could not create a working directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("summarizer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything the result page shows.
#[derive(Debug, Clone)]
pub struct DigestPage {
    pub downloads: DownloadReport,
    pub report: DigestReport,
}

/// Run the whole pipeline for `topic` inside a scratch directory that is
/// removed when the request finishes.
pub async fn run(
    state: Arc<AppState>,
    topic: &str,
    options: DigestOptions,
) -> Result<DigestPage, PipelineError> {
    let records = state.client.search(topic).await?;
    tracing::info!(topic, records = records.len(), "search finished");

    let workdir = tempfile::tempdir()?;
    let downloads = state
        .client
        .download_all(&records, workdir.path(), |event| {
            if let DownloadEvent::Skipped { url, reason, .. } = event {
                tracing::debug!(%url, %reason, "download skipped");
            }
        })
        .await?;

    let dir = workdir.path().to_path_buf();
    let backend = Arc::clone(&state.backend);
    let report = tokio::task::spawn_blocking(move || {
        digest_directory(&dir, backend.as_ref(), &Summarizer::default(), &options)
    })
    .await??;

    Ok(DigestPage { downloads, report })
}
