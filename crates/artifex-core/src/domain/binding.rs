//! Artifact file bindings: an artifact attached to one emitted task output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ArtifactId, FileId, GroupId};

/// Identifier of the graph node (pipeline step) that emitted an output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What the execution engine hands over when a task output is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub artifact: ArtifactId,
    pub node: NodeId,
    pub filename: String,

    /// Named output of the task (e.g. `processed_data`).
    pub output: Option<String>,

    /// Where the underlying file lives (path or URI).
    pub location: Option<String>,
}

impl Emission {
    pub fn new(artifact: ArtifactId, node: impl Into<NodeId>, filename: impl Into<String>) -> Self {
        Self {
            artifact,
            node: node.into(),
            filename: filename.into(),
            output: None,
            location: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A recorded binding. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub id: FileId,
    pub artifact: ArtifactId,

    /// Copied from the artifact at bind time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,

    pub node: NodeId,
    pub filename: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Resolved from the artifact; `None` when neither `file_type` nor a name
    /// suffix is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    pub bound_at: DateTime<Utc>,
}

/// Identity of a binding inside one execution.
///
/// `output` is only populated under the lenient binding policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct BindingKey {
    pub filename: String,
    pub node: NodeId,
    pub artifact: ArtifactId,
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn emission_builder_sets_optional_fields() {
        let artifact = ArtifactId::from_ulid(Ulid::new());
        let e = Emission::new(artifact, "prepare_data", "processed.csv")
            .with_output("processed_data")
            .with_location("/mnt/data/processed.csv");

        assert_eq!(e.node.as_str(), "prepare_data");
        assert_eq!(e.output.as_deref(), Some("processed_data"));
        assert_eq!(e.location.as_deref(), Some("/mnt/data/processed.csv"));
    }

    #[test]
    fn node_id_is_a_plain_json_string() {
        let s = serde_json::to_string(&NodeId::new("train_model")).unwrap();
        assert_eq!(s, "\"train_model\"");
    }
}
