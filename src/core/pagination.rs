//! Paginated list fetching
//!
//! GitLab list endpoints are walked page by page (`page=1,2,...`) until an
//! empty page comes back. A failing page aborts the whole fetch; callers
//! decide whether that is fatal for the run or for one subtree.

use log::debug;
use serde::de::DeserializeOwned;

use crate::core::client::ApiClient;
use crate::core::error::Result;
use crate::core::types::{GroupRecord, Project};

/// Fetch every page of a list endpoint and concatenate them in order
pub async fn fetch_all_pages<T, F>(client: &ApiClient, route: F) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    F: Fn(u32) -> String,
{
    let mut items = Vec::new();
    let mut page = 1u32;

    loop {
        let url = route(page);
        let batch: Vec<T> = client.get_page(&url).await?;
        if batch.is_empty() {
            break;
        }
        debug!("Page {page}: {} items", batch.len());
        items.extend(batch);
        page += 1;
    }

    Ok(items)
}

impl ApiClient {
    /// All groups visible to the token
    pub async fn list_groups(&self) -> Result<Vec<GroupRecord>> {
        fetch_all_pages(self, |page| self.endpoints().groups(page)).await
    }

    /// Direct subgroups of a group
    pub async fn list_subgroups(&self, group_id: u64) -> Result<Vec<GroupRecord>> {
        fetch_all_pages(self, |page| self.endpoints().subgroups(group_id, page)).await
    }

    /// Projects of a group
    pub async fn list_projects(&self, group_id: u64) -> Result<Vec<Project>> {
        fetch_all_pages(self, |page| self.endpoints().group_projects(group_id, page)).await
    }
}
