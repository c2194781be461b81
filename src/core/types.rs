//! Records shared across discovery, transfer and reporting

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::naming::sanitize_name;

/// A group as returned by the list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

/// A group placed in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
    path: Vec<String>,
}

impl Group {
    /// A traversal root; its path is its own sanitized name
    pub fn root(record: GroupRecord) -> Self {
        let path = vec![sanitize_name(&record.name)];
        Self {
            id: record.id,
            name: record.name,
            parent_id: record.parent_id,
            path,
        }
    }

    /// A subgroup discovered under `parent`
    pub fn child_of(parent: &Group, record: GroupRecord) -> Self {
        let mut path = parent.path.clone();
        path.push(sanitize_name(&record.name));
        Self {
            id: record.id,
            name: record.name,
            parent_id: record.parent_id.or(Some(parent.id)),
            path,
        }
    }

    /// Relative directory for this group's archives
    pub fn full_path(&self) -> PathBuf {
        self.path.iter().collect()
    }

    /// Slash-joined path, for logs and reports
    pub fn display_path(&self) -> String {
        self.path.join("/")
    }
}

/// A project as returned by `groups/:id/projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl Project {
    /// Default branch, treating an empty string as absent
    pub fn default_branch(&self) -> Option<&str> {
        self.default_branch.as_deref().filter(|b| !b.is_empty())
    }
}

/// One (group, project) pair awaiting transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub group_id: u64,
    pub group_path: PathBuf,
    pub group_name: String,
    pub project: Project,
}

impl WorkItem {
    pub fn new(group: &Group, project: Project) -> Self {
        Self {
            group_id: group.id,
            group_path: group.full_path(),
            group_name: group.name.clone(),
            project,
        }
    }

    /// Unique identity of the pair
    pub fn key(&self) -> (u64, u64) {
        (self.group_id, self.project.id)
    }
}

/// A project whose archive was materialized (or had nothing to materialize)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success {
    pub group_name: String,
    pub project_name: String,
    /// Written archive, `None` when the project has no default branch
    pub archive: Option<PathBuf>,
    pub bytes: u64,
}

/// A project that could not be archived, kept whole for resubmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub group_id: u64,
    pub group_name: String,
    pub project: Project,
    pub reason: String,
}

impl Failure {
    pub fn new(item: WorkItem, reason: String) -> Self {
        Self {
            group_id: item.group_id,
            group_name: item.group_name,
            project: item.project,
            reason,
        }
    }

    /// Identity used to find the original work item
    pub fn key(&self) -> (u64, u64) {
        (self.group_id, self.project.id)
    }
}
