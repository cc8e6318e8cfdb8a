use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SummarizeError, SummaryLength};

pub const DEFAULT_PORTAL_URL: &str = "https://ieeexplore.ieee.org";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PDF_DIR: &str = "pdfs";
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {source}")]
    InvalidLength {
        key: &'static str,
        #[source]
        source: SummarizeError,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub summary: Option<SummaryConfig>,
    pub portal: Option<PortalConfig>,
    pub storage: Option<StorageConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Sentences kept per document.
    pub length: Option<i64>,
    /// Sentences kept in the summary of all per-document summaries.
    pub aggregate_length: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub pdf_dir: Option<String>,
    pub keep_pdfs: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

/// Platform config directory path: `<config_dir>/paperdigest/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("paperdigest").join("config.toml"))
}

/// Load config by cascading CWD `.paperdigest.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".paperdigest.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// First value present in `overlay`, falling back to `base`.
fn pick<S, T>(overlay: Option<&S>, base: Option<&S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bs, os) = (base.summary.as_ref(), overlay.summary.as_ref());
    let (bp, op) = (base.portal.as_ref(), overlay.portal.as_ref());
    let (bst, ost) = (base.storage.as_ref(), overlay.storage.as_ref());
    let (bsv, osv) = (base.server.as_ref(), overlay.server.as_ref());

    ConfigFile {
        summary: Some(SummaryConfig {
            length: pick(os, bs, |s| s.length),
            aggregate_length: pick(os, bs, |s| s.aggregate_length),
        }),
        portal: Some(PortalConfig {
            base_url: pick(op, bp, |p| p.base_url.clone()),
            user_agent: pick(op, bp, |p| p.user_agent.clone()),
            timeout_secs: pick(op, bp, |p| p.timeout_secs),
            max_records: pick(op, bp, |p| p.max_records),
        }),
        storage: Some(StorageConfig {
            pdf_dir: pick(ost, bst, |s| s.pdf_dir.clone()),
            keep_pdfs: pick(ost, bst, |s| s.keep_pdfs),
        }),
        server: Some(ServerConfig {
            bind: pick(osv, bsv, |s| s.bind.clone()),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Fully resolved settings: config file values over built-in defaults, with
/// environment overrides applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub length: SummaryLength,
    pub aggregate_length: SummaryLength,
    pub portal_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_records: Option<usize>,
    pub pdf_dir: PathBuf,
    pub keep_pdfs: bool,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length: SummaryLength::default(),
            aggregate_length: SummaryLength::default(),
            portal_url: DEFAULT_PORTAL_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_records: None,
            pdf_dir: PathBuf::from(DEFAULT_PDF_DIR),
            keep_pdfs: false,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

fn length_from(key: &'static str, value: i64) -> Result<SummaryLength, ConfigError> {
    SummaryLength::try_from(value).map_err(|source| ConfigError::InvalidLength { key, source })
}

impl Settings {
    /// Load the cascaded config file and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(&load_config())?.apply_env()
    }

    pub fn from_file(file: &ConfigFile) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(summary) = &file.summary {
            if let Some(length) = summary.length {
                settings.length = length_from("summary.length", length)?;
            }
            if let Some(length) = summary.aggregate_length {
                settings.aggregate_length = length_from("summary.aggregate_length", length)?;
            }
        }
        if let Some(portal) = &file.portal {
            if let Some(url) = &portal.base_url {
                settings.portal_url = url.trim_end_matches('/').to_string();
            }
            if let Some(agent) = &portal.user_agent {
                settings.user_agent = agent.clone();
            }
            if let Some(secs) = portal.timeout_secs {
                settings.timeout_secs = secs;
            }
            settings.max_records = portal.max_records;
        }
        if let Some(storage) = &file.storage {
            if let Some(dir) = &storage.pdf_dir {
                settings.pdf_dir = PathBuf::from(dir);
            }
            if let Some(keep) = storage.keep_pdfs {
                settings.keep_pdfs = keep;
            }
        }
        if let Some(bind) = file.server.as_ref().and_then(|s| s.bind.clone()) {
            settings.bind = bind;
        }

        Ok(settings)
    }

    /// Apply `PAPERDIGEST_*` environment variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn apply_env_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("PAPERDIGEST_LENGTH") {
            self.length = value
                .parse()
                .map_err(|source| ConfigError::InvalidLength {
                    key: "PAPERDIGEST_LENGTH",
                    source,
                })?;
        }
        if let Some(value) = lookup("PAPERDIGEST_PORTAL_URL") {
            self.portal_url = value.trim_end_matches('/').to_string();
        }
        if let Some(value) = lookup("PAPERDIGEST_PDF_DIR") {
            self.pdf_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("PAPERDIGEST_KEEP_PDFS") {
            self.keep_pdfs = match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "PAPERDIGEST_KEEP_PDFS",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup("PAPERDIGEST_BIND") {
            self.bind = value;
        }
        Ok(self)
    }

    /// Render the resolved values back into a complete config file.
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            summary: Some(SummaryConfig {
                length: Some(length_to_file(self.length)),
                aggregate_length: Some(length_to_file(self.aggregate_length)),
            }),
            portal: Some(PortalConfig {
                base_url: Some(self.portal_url.clone()),
                user_agent: Some(self.user_agent.clone()),
                timeout_secs: Some(self.timeout_secs),
                max_records: self.max_records,
            }),
            storage: Some(StorageConfig {
                pdf_dir: Some(self.pdf_dir.display().to_string()),
                keep_pdfs: Some(self.keep_pdfs),
            }),
            server: Some(ServerConfig {
                bind: Some(self.bind.clone()),
            }),
        }
    }
}

/// Counts past `i64::MAX` saturate.
fn length_to_file(length: SummaryLength) -> i64 {
    i64::try_from(length.get()).unwrap_or(i64::MAX)
}
