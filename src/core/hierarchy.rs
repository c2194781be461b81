//! Breadth-first discovery of the group hierarchy
//!
//! Each group's path is fixed when it is enqueued, from the enqueuing
//! parent's already-final path, so traversal order never changes a path.
//! The visited set is keyed by group id; a group reachable twice (or through
//! a cycle) is emitted once.

use std::collections::{HashSet, VecDeque};

use log::{info, warn};

use crate::core::client::ApiClient;
use crate::core::error::Result;
use crate::core::types::{Group, GroupRecord};

/// Discover every accessible group with its hierarchical path
///
/// Failing to list the accessible groups is fatal. A failed subgroup listing
/// only prunes that subtree.
pub async fn walk_groups(client: &ApiClient) -> Result<Vec<Group>> {
    info!("Retrieving groups from '{}'", client.endpoints().base_url());
    let listed = client.list_groups().await?;
    let roots = select_roots(listed);
    info!("Found {} top-level groups", roots.len());

    let groups = walk_from(client, roots).await;
    info!("Total groups (including subgroups): {}", groups.len());
    Ok(groups)
}

/// Groups whose parent is absent from the listing start a traversal
///
/// Covers tokens that can see a subgroup but not its parent.
fn select_roots(listed: Vec<GroupRecord>) -> Vec<GroupRecord> {
    let listed_ids: HashSet<u64> = listed.iter().map(|g| g.id).collect();
    listed
        .into_iter()
        .filter(|g| match g.parent_id {
            None => true,
            Some(parent) => !listed_ids.contains(&parent),
        })
        .collect()
}

/// Breadth-first traversal from the given roots
pub async fn walk_from(client: &ApiClient, roots: Vec<GroupRecord>) -> Vec<Group> {
    let mut queue: VecDeque<Group> = roots.into_iter().map(Group::root).collect();
    let mut visited: HashSet<u64> = HashSet::new();
    let mut groups = Vec::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current.id) {
            continue;
        }

        match client.list_subgroups(current.id).await {
            Ok(subgroups) => {
                for sub in subgroups {
                    if !visited.contains(&sub.id) {
                        queue.push_back(Group::child_of(&current, sub));
                    }
                }
            }
            Err(e) => {
                warn!("Error retrieving subgroups for '{}': {e}", current.name);
            }
        }

        groups.push(current);
    }

    groups
}
