use thiserror::Error;

use crate::domain::{ArtifactId, ArtifactKind, GroupId, NodeId};

/// Definition-time errors raised by the registry.
///
/// These are programmer errors in the pipeline definition; none of them are
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("artifact group '{name}' of kind {kind} is already defined")]
    DuplicateGroup { name: String, kind: ArtifactKind },

    /// `owner` is the kind for ungrouped artifacts, the group name otherwise.
    #[error("artifact '{name}' is already defined for {owner}")]
    DuplicateArtifact { name: String, owner: String },

    #[error("file '{filename}' is already bound to {artifact} at node '{node}'")]
    DuplicateBinding {
        filename: String,
        node: NodeId,
        artifact: ArtifactId,
    },

    #[error("cannot resolve a file extension for artifact '{name}'; set file_type explicitly")]
    UnresolvedExtension { name: String },

    #[error("unknown artifact group {0}")]
    UnknownGroup(GroupId),

    #[error("unknown artifact {0}")]
    UnknownArtifact(ArtifactId),

    #[error("{what} must not be empty")]
    InvalidName { what: &'static str },

    #[error("file_type '{0}' is empty once normalized")]
    InvalidFileType(String),

    #[error("definitions are closed once the execution has started")]
    DefinitionsClosed,
}
