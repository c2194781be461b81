//! Bounded parallel execution of archive transfers
//!
//! Every submitted work item resolves exactly once, as a success or as a
//! failure carrying the full project record. Errors and panics inside a
//! single transfer never abort the batch.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, error};

use crate::core::error::Result;
use crate::core::stream::ProgressCallback;
use crate::core::transfer::Transferred;
use crate::core::types::{Failure, Success, WorkItem};

/// Outcomes of one dispatch, in completion order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,
}

impl DispatchResult {
    /// Total number of resolved items
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `transfer` over `items` with at most `max_workers` in flight
pub async fn dispatch<F, Fut>(
    items: Vec<WorkItem>,
    max_workers: usize,
    progress: Option<&ProgressCallback>,
    transfer: F,
) -> DispatchResult
where
    F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Transferred>> + Send + 'static,
{
    let total = items.len() as u64;
    let transfer = Arc::new(transfer);
    let mut result = DispatchResult::default();
    let mut completed = 0u64;

    debug!("Dispatching {total} transfers across {max_workers} workers");

    let outcomes = futures::stream::iter(items.into_iter().map(|item| {
        let transfer = Arc::clone(&transfer);
        async move {
            let handle = tokio::spawn(transfer(item.clone()));
            let outcome = match handle.await {
                Ok(Ok(transferred)) => Ok(transferred),
                Ok(Err(e)) => Err(e.to_string()),
                Err(join_error) => Err(format!("Transfer task aborted: {join_error}")),
            };
            (item, outcome)
        }
    }))
    .buffer_unordered(max_workers.max(1));

    tokio::pin!(outcomes);

    while let Some((item, outcome)) = outcomes.next().await {
        completed += 1;

        match outcome {
            Ok(transferred) => result.successes.push(Success {
                group_name: item.group_name,
                project_name: item.project.name,
                bytes: transferred.bytes(),
                archive: match transferred {
                    Transferred::Archived { path, .. } => Some(path),
                    Transferred::NoDefaultBranch => None,
                },
            }),
            Err(reason) => {
                error!(
                    "Failed to archive project '{}' in group '{}': {reason}",
                    item.project.name, item.group_name
                );
                result.failures.push(Failure::new(item, reason));
            }
        }

        if let Some(progress) = progress {
            progress(completed, total);
        }
    }

    result
}
