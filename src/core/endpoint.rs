//! Endpoint resolution for the GitLab v4 API
//!
//! Builds the list-endpoint routes used for discovery and the archive URL
//! used by each transfer.

use reqwest::Url;

use crate::core::error::{Error, Result};

/// Fixed page size for every list endpoint
pub const PER_PAGE: u32 = 100;

/// Route builder for a GitLab instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Create endpoints for a base URL such as `https://gitlab.example.com`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All groups visible to the token
    pub fn groups(&self, page: u32) -> String {
        format!(
            "{}/api/v4/groups?per_page={PER_PAGE}&page={page}",
            self.base_url
        )
    }

    /// Direct subgroups of a group
    pub fn subgroups(&self, group_id: u64, page: u32) -> String {
        format!(
            "{}/api/v4/groups/{group_id}/subgroups?per_page={PER_PAGE}&page={page}",
            self.base_url
        )
    }

    /// Projects owned by (or shared with) a group
    pub fn group_projects(&self, group_id: u64, page: u32) -> String {
        format!(
            "{}/api/v4/groups/{group_id}/projects?per_page={PER_PAGE}&page={page}",
            self.base_url
        )
    }

    /// Archive of a project at the given branch
    pub fn archive(&self, project_id: u64, branch: &str) -> Result<Url> {
        let raw = format!(
            "{}/api/v4/projects/{project_id}/repository/archive.zip",
            self.base_url
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid archive URL '{raw}': {e}")))?;
        url.query_pairs_mut().append_pair("sha", branch);
        Ok(url)
    }
}
