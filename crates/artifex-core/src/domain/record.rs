//! Execution record: everything the registry accepted during one execution.
//!
//! This is the queryable shape handed to downstream consumers (e.g. a UI that
//! renders "all files belonging to group X"). It is produced once, by
//! `ArtifactRegistry::finish`, and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, ArtifactGroup};
use super::binding::{ArtifactFile, NodeId};
use super::ids::{ArtifactId, ExecutionId, GroupId};
use super::kind::ArtifactKind;
use crate::config::RegistryConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: ExecutionId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: RegistryConfig,

    /// Definition order.
    pub groups: Vec<ArtifactGroup>,
    pub artifacts: Vec<Artifact>,

    /// Binding order.
    pub files: Vec<ArtifactFile>,
}

/// Short form returned by store listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub execution_id: ExecutionId,
    pub finished_at: DateTime<Utc>,
    pub groups: usize,
    pub artifacts: usize,
    pub files: usize,
}

/// One artifact with the files bound to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactListing<'a> {
    pub artifact: &'a Artifact,
    pub files: Vec<&'a ArtifactFile>,
}

/// One group with its artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupListing<'a> {
    pub group: &'a ArtifactGroup,
    pub artifacts: Vec<ArtifactListing<'a>>,
}

/// The whole record arranged by owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordListing<'a> {
    pub execution_id: ExecutionId,
    pub groups: Vec<GroupListing<'a>>,
    pub ungrouped: Vec<ArtifactListing<'a>>,
}

impl ExecutionRecord {
    pub fn group(&self, id: GroupId) -> Option<&ArtifactGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn artifact(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Look a group up by its identity key.
    pub fn find_group(&self, name: &str, kind: &ArtifactKind) -> Option<&ArtifactGroup> {
        self.groups.iter().find(|g| g.name == name && &g.kind == kind)
    }

    pub fn files_in_group(&self, group: GroupId) -> Vec<&ArtifactFile> {
        self.files.iter().filter(|f| f.group == Some(group)).collect()
    }

    pub fn files_for_artifact(&self, artifact: ArtifactId) -> Vec<&ArtifactFile> {
        self.files.iter().filter(|f| f.artifact == artifact).collect()
    }

    pub fn files_from_node(&self, node: &NodeId) -> Vec<&ArtifactFile> {
        self.files.iter().filter(|f| &f.node == node).collect()
    }

    pub fn ungrouped_files(&self) -> Vec<&ArtifactFile> {
        self.files.iter().filter(|f| f.group.is_none()).collect()
    }

    pub fn summary(&self) -> ExecutionSummary {
        ExecutionSummary {
            execution_id: self.execution_id,
            finished_at: self.finished_at,
            groups: self.groups.len(),
            artifacts: self.artifacts.len(),
            files: self.files.len(),
        }
    }

    pub fn listing(&self) -> RecordListing<'_> {
        let groups = self
            .groups
            .iter()
            .map(|group| GroupListing {
                group,
                artifacts: self
                    .artifacts
                    .iter()
                    .filter(|a| a.group == Some(group.id))
                    .map(|a| self.artifact_listing(a))
                    .collect(),
            })
            .collect();

        let ungrouped = self
            .artifacts
            .iter()
            .filter(|a| a.group.is_none())
            .map(|a| self.artifact_listing(a))
            .collect();

        RecordListing {
            execution_id: self.execution_id,
            groups,
            ungrouped,
        }
    }

    fn artifact_listing<'a>(&'a self, artifact: &'a Artifact) -> ArtifactListing<'a> {
        ArtifactListing {
            artifact,
            files: self.files_for_artifact(artifact.id),
        }
    }
}
