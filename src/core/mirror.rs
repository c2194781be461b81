//! End-to-end mirror pipeline
//!
//! Discovery (groups, then projects per group) runs sequentially. The
//! resulting work queue goes through one parallel dispatch followed by
//! retry rounds.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};

use crate::core::client::ApiClient;
use crate::core::config::MirrorConfig;
use crate::core::dispatcher::{dispatch, DispatchResult};
use crate::core::error::Result;
use crate::core::hierarchy::walk_groups;
use crate::core::retry::retry_failures;
use crate::core::stream::{ProgressCallback, TransferOptions};
use crate::core::transfer::transfer_archive;
use crate::core::types::{Failure, Group, Success, WorkItem};

/// Final result of a mirror run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Groups discovered
    pub groups: usize,
    /// Work items queued by discovery
    pub work_items: usize,
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,
    /// Retry rounds run after the initial pass
    pub retry_rounds: usize,
}

impl RunSummary {
    /// Whether every work item ended up archived (or had nothing to archive)
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total bytes written across all archives
    pub fn bytes_written(&self) -> u64 {
        self.successes.iter().map(|s| s.bytes).sum()
    }
}

/// Mirrors every accessible group of one GitLab instance
pub struct Mirror {
    client: Arc<ApiClient>,
    output_dir: PathBuf,
    max_workers: usize,
    transfer: TransferOptions,
}

impl Mirror {
    /// Validate the configuration and build the shared client
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: Arc::new(ApiClient::new(config)?),
            output_dir: config.output_dir.clone(),
            max_workers: config.max_workers,
            transfer: config.transfer.clone(),
        })
    }

    /// Discover groups and build the work queue
    ///
    /// Fails only when the accessible groups cannot be listed.
    pub async fn discover(&self) -> Result<(Vec<Group>, Vec<WorkItem>)> {
        let groups = walk_groups(&self.client).await?;
        let items = self.collect_work_items(&groups).await;
        Ok((groups, items))
    }

    /// Run discovery, the initial dispatch and retry rounds
    pub async fn run(&self, progress: Option<ProgressCallback>) -> Result<RunSummary> {
        let (groups, items) = self.discover().await?;
        if groups.is_empty() {
            warn!("No groups found or no access");
        }

        info!("Starting parallel downloads for {} repositories", items.len());
        let initial = self.dispatch_batch(items.clone(), progress.as_ref()).await;

        let outcome = retry_failures(&items, initial, |batch| {
            self.dispatch_batch(batch, progress.as_ref())
        })
        .await;

        Ok(RunSummary {
            groups: groups.len(),
            work_items: items.len(),
            successes: outcome.successes,
            failures: outcome.failures,
            retry_rounds: outcome.rounds,
        })
    }

    /// List each group's projects; a failing group is skipped
    async fn collect_work_items(&self, groups: &[Group]) -> Vec<WorkItem> {
        let mut items = Vec::new();
        let mut seen: HashSet<(u64, u64)> = HashSet::new();

        for group in groups {
            info!(
                "Retrieving projects for group '{}' (ID: {})",
                group.name, group.id
            );
            match self.client.list_projects(group.id).await {
                Ok(projects) => {
                    info!(
                        "Found {} projects in group '{}'",
                        projects.len(),
                        group.display_path()
                    );
                    for project in projects {
                        let item = WorkItem::new(group, project);
                        if seen.insert(item.key()) {
                            items.push(item);
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to retrieve projects for group '{}': {e}", group.name);
                }
            }
        }

        items
    }

    /// Dispatch one batch of archive transfers
    async fn dispatch_batch(
        &self,
        items: Vec<WorkItem>,
        progress: Option<&ProgressCallback>,
    ) -> DispatchResult {
        let client = Arc::clone(&self.client);
        let output_dir = self.output_dir.clone();
        let options = self.transfer.clone();

        dispatch(items, self.max_workers, progress, move |item| {
            let client = Arc::clone(&client);
            let output_dir = output_dir.clone();
            let options = options.clone();
            async move { transfer_archive(&client, &output_dir, &item, &options).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_list(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }

    fn config_for(server: &MockServer, output_dir: PathBuf) -> MirrorConfig {
        MirrorConfig {
            base_url: server.uri(),
            token: "token".to_string(),
            output_dir,
            max_workers: 2,
            transfer: TransferOptions {
                retry_delay: Duration::from_millis(5),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MirrorConfig {
            base_url: "ftp://gitlab.example.com".to_string(),
            token: "token".to_string(),
            ..Default::default()
        };
        assert!(matches!(Mirror::new(&config), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_discover_skips_failing_project_listing() {
        let mock_server = MockServer::start().await;

        mount_list(
            &mock_server,
            "/api/v4/groups",
            json!([{"id": 1, "name": "ok"}, {"id": 2, "name": "denied"}]),
        )
        .await;
        mount_list(&mock_server, "/api/v4/groups/1/subgroups", json!([])).await;
        mount_list(&mock_server, "/api/v4/groups/2/subgroups", json!([])).await;
        // duplicated entry across the listing is queued once
        mount_list(
            &mock_server,
            "/api/v4/groups/1/projects",
            json!([
                {"id": 10, "name": "a", "default_branch": "main"},
                {"id": 10, "name": "a", "default_branch": "main"},
                {"id": 11, "name": "b", "default_branch": null}
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups/2/projects"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let mirror = Mirror::new(&config_for(&mock_server, dir.path().to_path_buf())).unwrap();
        let (groups, items) = mirror.discover().await.unwrap();

        assert_eq!(groups.len(), 2);
        let ids: Vec<u64> = items.iter().map(|i| i.project.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_run_recovers_in_retry_round() {
        let mock_server = MockServer::start().await;

        mount_list(&mock_server, "/api/v4/groups", json!([{"id": 1, "name": "team"}])).await;
        mount_list(&mock_server, "/api/v4/groups/1/subgroups", json!([])).await;
        mount_list(
            &mock_server,
            "/api/v4/groups/1/projects",
            json!([
                {"id": 20, "name": "stable", "default_branch": "main"},
                {"id": 21, "name": "flaky", "default_branch": "main"}
            ]),
        )
        .await;

        Mock::given(method("GET"))
            .and(path("/api/v4/projects/20/repository/archive.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"stable".to_vec(), "application/zip"))
            .mount(&mock_server)
            .await;

        // three failures exhaust the first pass, the retry round succeeds
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/21/repository/archive.zip"))
            .respond_with(move |_: &wiremock::Request| {
                if calls_clone.fetch_add(1, Ordering::SeqCst) < 3 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200).set_body_raw(b"flaky".to_vec(), "application/zip")
                }
            })
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let mirror = Mirror::new(&config_for(&mock_server, dir.path().to_path_buf())).unwrap();
        let summary = mirror.run(None).await.unwrap();

        assert!(summary.is_complete(), "failures left: {:?}", summary.failures);
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.work_items, 2);
        assert_eq!(summary.successes.len(), 2);
        assert_eq!(summary.retry_rounds, 1);
        assert_eq!(summary.bytes_written(), 11);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
