//! Run configuration
//!
//! The CLI (or any other caller) fills in a [`MirrorConfig`] and hands it to
//! the pipeline. Validation happens once, before any request is made.

use std::path::PathBuf;

use crate::core::error::{Error, Result};
use crate::core::report::ReportFormat;
use crate::core::stream::TransferOptions;

/// Configuration for one mirror run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// GitLab base URL, e.g. `https://gitlab.example.com`
    pub base_url: String,

    /// Personal access token sent as `PRIVATE-TOKEN`
    pub token: String,

    /// Root directory for the mirrored tree
    pub output_dir: PathBuf,

    /// Maximum number of archives in flight at once
    pub max_workers: usize,

    /// Report written after the run
    pub report_format: ReportFormat,

    /// Optional raw `Cookie` header
    pub cookie: Option<String>,

    /// Optional `User-Agent` override
    pub user_agent: Option<String>,

    /// Per-archive retry and buffering
    pub transfer: TransferOptions,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gitlab.com".to_string(),
            token: String::new(),
            output_dir: PathBuf::from("gitlab_archives"),
            max_workers: 4,
            report_format: ReportFormat::Csv,
            cookie: None,
            user_agent: None,
            transfer: TransferOptions::default(),
        }
    }
}

impl MirrorConfig {
    /// Check the configuration before the run starts
    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "GitLab URL must start with 'http://' or 'https://', got '{base_url}'"
            )));
        }

        if self.token.trim().is_empty() {
            return Err(Error::InvalidInput("Token cannot be empty".to_string()));
        }

        if self.max_workers == 0 {
            return Err(Error::InvalidInput(
                "max_workers must be at least 1".to_string(),
            ));
        }

        if self.transfer.max_attempts == 0 {
            return Err(Error::InvalidInput(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
