//! Client for the IEEE Xplore publication portal: topic search and PDF
//! retrieval.
//!
//! Requests are made one at a time with a single cookie-carrying session, the
//! way a browser would walk the site.

use std::time::Duration;

use thiserror::Error;

use paperdigest_core::Settings;
use paperdigest_core::config_file::{DEFAULT_PORTAL_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

pub mod download;
pub mod search;

pub use download::{
    DownloadEvent, DownloadReport, SkipReason, SkippedDownload, pdf_file_name, unique_file_name,
};
pub use search::{SearchRecord, SearchRequest, parse_search_response};

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("search topic is empty")]
    EmptyTopic,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },
    #[error("unexpected search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection settings for [`PortalClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Keep only the first N search records.
    pub max_records: Option<usize>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PORTAL_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_records: None,
        }
    }
}

impl From<&Settings> for ClientOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: settings.portal_url.trim_end_matches('/').to_string(),
            user_agent: settings.user_agent.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_records: settings.max_records,
        }
    }
}

/// A portal session. Cookies set by the portal persist across requests made
/// through the same client.
#[derive(Debug, Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    options: ClientOptions,
}

impl PortalClient {
    pub fn new(options: ClientOptions) -> Result<Self, PortalError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.options.base_url, path)
    }
}
