//! # gitlab-archive-dl Library
//!
//! Mirrors every group a GitLab token can see into a local directory tree,
//! downloading one ZIP archive of each project's default branch.
//!
//! ## Features
//!
//! - **Hierarchy aware**: subgroups become nested directories
//! - **Bounded parallelism**: a fixed number of archives in flight
//! - **Resilient**: per-archive attempts plus whole-batch retry rounds
//! - **Reports**: CSV or JSON summary of every project
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use gitlab_archive_dl::MirrorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MirrorConfig {
//!         base_url: "https://gitlab.example.com".to_string(),
//!         token: "glpat-...".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let summary = gitlab_archive_dl::mirror(&config).await?;
//!     println!("{} archived, {} failed", summary.successes.len(), summary.failures.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Progress Tracking
//!
//! ```rust,no_run
//! # use gitlab_archive_dl::MirrorConfig;
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MirrorConfig {
//!         token: "glpat-...".to_string(),
//!         ..Default::default()
//!     };
//!
//!     gitlab_archive_dl::mirror_with_progress(&config, |completed, total| {
//!         println!("Progress: {}/{} projects", completed, total);
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

// Re-export core types that users might need
pub use crate::core::config::MirrorConfig;
pub use crate::core::dispatcher::{dispatch, DispatchResult};
pub use crate::core::error::{Error, Result};
pub use crate::core::mirror::{Mirror, RunSummary};
pub use crate::core::naming::{archive_file_name, sanitize_name};
pub use crate::core::report::{write_report, ReportFormat};
pub use crate::core::retry::{retry_failures, RetryOutcome};
pub use crate::core::stream::{ProgressCallback, TransferOptions};
pub use crate::core::transfer::Transferred;
pub use crate::core::types::{Failure, Group, Project, Success, WorkItem};

// Internal modules
mod core;

/// Mirror every accessible group
///
/// Returns once discovery, the initial pass and all retry rounds are done.
/// Only configuration errors and a failed top-level group listing are
/// returned as `Err`; per-project problems end up in
/// [`RunSummary::failures`].
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = gitlab_archive_dl::MirrorConfig {
///     token: "glpat-...".to_string(),
///     output_dir: "./backup".into(),
///     ..Default::default()
/// };
/// let summary = gitlab_archive_dl::mirror(&config).await?;
/// assert!(summary.is_complete());
/// # Ok(())
/// # }
/// ```
pub async fn mirror(config: &MirrorConfig) -> Result<RunSummary> {
    core::Mirror::new(config)?.run(None).await
}

/// Mirror every accessible group, reporting (completed, total) per archive
///
/// The counter restarts for each retry round.
pub async fn mirror_with_progress<F>(config: &MirrorConfig, progress: F) -> Result<RunSummary>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let callback: ProgressCallback = Arc::new(progress);
    core::Mirror::new(config)?.run(Some(callback)).await
}

/// Discover the group tree and the work queue without downloading anything
pub async fn discover(config: &MirrorConfig) -> Result<(Vec<Group>, Vec<WorkItem>)> {
    core::Mirror::new(config)?.discover().await
}
