//! Artifact and artifact group definitions.
//!
//! Both are declared once while the pipeline is defined and are immutable
//! afterwards. Values returned by the registry are handles: they carry the
//! assigned id and can be cloned freely.

use serde::{Deserialize, Serialize};

use super::extension;
use super::ids::{ArtifactId, GroupId};
use super::kind::ArtifactKind;

/// A named collection of artifacts sharing one kind.
///
/// Identity within an execution: (`name`, `kind`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactGroup {
    pub id: GroupId,
    pub name: String,
    pub kind: ArtifactKind,
}

/// A named, typed output tracked by the registry.
///
/// Identity within an execution: (`name`, `kind`) when ungrouped,
/// (`name`, `group`) when grouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,

    /// Copied from the group when grouped.
    pub kind: ArtifactKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,

    /// Overrides the extension derived from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl Artifact {
    /// `file_type` if set, else the suffix of `name`.
    pub fn extension(&self) -> Option<&str> {
        extension::resolve(&self.name, self.file_type.as_deref())
    }

    pub fn is_grouped(&self) -> bool {
        self.group.is_some()
    }
}

impl From<&Artifact> for ArtifactId {
    fn from(artifact: &Artifact) -> Self {
        artifact.id
    }
}

/// Who an artifact belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOwner {
    /// Ungrouped artifact classified directly.
    Kind(ArtifactKind),

    /// Member of a group defined in the same registry.
    Group(GroupId),
}

impl From<ArtifactKind> for ArtifactOwner {
    fn from(kind: ArtifactKind) -> Self {
        ArtifactOwner::Kind(kind)
    }
}

impl From<&ArtifactGroup> for ArtifactOwner {
    fn from(group: &ArtifactGroup) -> Self {
        ArtifactOwner::Group(group.id)
    }
}

impl From<GroupId> for ArtifactOwner {
    fn from(id: GroupId) -> Self {
        ArtifactOwner::Group(id)
    }
}

/// Declarative input to `define_artifact`.
///
/// ```ignore
/// let spec = ArtifactSpec::new("report2.pdf", &reports_foo).with_file_type("csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub owner: ArtifactOwner,
    pub file_type: Option<String>,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, owner: impl Into<ArtifactOwner>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            file_type: None,
        }
    }

    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = Some(file_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    fn artifact(name: &str, file_type: Option<&str>) -> Artifact {
        Artifact {
            id: ArtifactId::from_ulid(Ulid::new()),
            name: name.to_string(),
            kind: ArtifactKind::Report,
            group: None,
            file_type: file_type.map(str::to_string),
        }
    }

    #[test]
    fn extension_prefers_file_type() {
        assert_eq!(artifact("report2.pdf", Some("csv")).extension(), Some("csv"));
        assert_eq!(artifact("report1.csv", None).extension(), Some("csv"));
        assert_eq!(artifact("report3", None).extension(), None);
    }

    #[test]
    fn spec_owner_conversions() {
        let group = ArtifactGroup {
            id: GroupId::from_ulid(Ulid::new()),
            name: "reports_foo".to_string(),
            kind: ArtifactKind::Report,
        };

        let grouped = ArtifactSpec::new("report1.csv", &group);
        assert_eq!(grouped.owner, ArtifactOwner::Group(group.id));

        let loose = ArtifactSpec::new("processed.csv", ArtifactKind::Data).with_file_type("csv");
        assert_eq!(loose.owner, ArtifactOwner::Kind(ArtifactKind::Data));
        assert_eq!(loose.file_type.as_deref(), Some("csv"));
    }

    #[test]
    fn ungrouped_artifact_omits_group_in_json() {
        let v = serde_json::to_value(artifact("report1.csv", None)).unwrap();
        assert!(v.get("group").is_none());
        assert!(v.get("file_type").is_none());
        assert_eq!(v["kind"], "REPORT");
    }
}
