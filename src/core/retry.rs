//! Retry rounds over the failure set
//!
//! Failed items are rebuilt from the original work list, keyed by
//! `(group_id, project_id)`, and re-dispatched. Rounds continue until no
//! failures remain or a round ends with as many failures as it started with.

use std::collections::HashMap;
use std::future::Future;

use log::{info, warn};

use crate::core::dispatcher::DispatchResult;
use crate::core::error::Error;
use crate::core::types::{Failure, Success, WorkItem};

/// Final accounting after all retry rounds
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub successes: Vec<Success>,
    pub failures: Vec<Failure>,
    /// Retry rounds run after the initial pass
    pub rounds: usize,
}

/// Re-dispatch failures until they are resolved or progress stalls
pub async fn retry_failures<D, Fut>(
    all_items: &[WorkItem],
    initial: DispatchResult,
    mut dispatch: D,
) -> RetryOutcome
where
    D: FnMut(Vec<WorkItem>) -> Fut,
    Fut: Future<Output = DispatchResult>,
{
    let lookup: HashMap<(u64, u64), &WorkItem> =
        all_items.iter().map(|item| (item.key(), item)).collect();

    let mut successes = initial.successes;
    let mut failures = initial.failures;
    let mut rounds = 0;

    while !failures.is_empty() {
        rounds += 1;
        info!("Retry attempt {rounds} for {} failures", failures.len());

        let (batch, unresolved) = rebuild_batch(&lookup, &failures);
        let round = dispatch(batch).await;

        successes.extend(round.successes);
        let mut next_failures = round.failures;
        next_failures.extend(unresolved);

        if next_failures.is_empty() {
            failures = next_failures;
            break;
        }

        let stalled = next_failures.len() == failures.len();
        failures = next_failures;
        if stalled {
            warn!("No progress made on retry. Stopping further attempts");
            break;
        }
    }

    RetryOutcome {
        successes,
        failures,
        rounds,
    }
}

/// Rebuild work items for `failures`; items with no known path stay failed
fn rebuild_batch(
    lookup: &HashMap<(u64, u64), &WorkItem>,
    failures: &[Failure],
) -> (Vec<WorkItem>, Vec<Failure>) {
    let mut batch = Vec::with_capacity(failures.len());
    let mut unresolved = Vec::new();

    for failure in failures {
        match lookup.get(&failure.key()) {
            Some(original) => batch.push(WorkItem {
                group_id: failure.group_id,
                group_path: original.group_path.clone(),
                group_name: failure.group_name.clone(),
                project: failure.project.clone(),
            }),
            None => {
                let err = Error::Lookup(format!(
                    "Could not find path for failed project '{}' in group '{}'",
                    failure.project.name, failure.group_name
                ));
                warn!("{err}");
                unresolved.push(failure.clone());
            }
        }
    }

    (batch, unresolved)
}
