//! Domain model (ids, kinds, artifacts, bindings, records, events).
//!
//! I/O を持たない純粋なデータ型のみを置きます。

pub mod artifact;
pub mod binding;
pub mod events;
pub mod extension;
pub mod ids;
pub mod kind;
pub mod record;

pub use artifact::{Artifact, ArtifactGroup, ArtifactOwner, ArtifactSpec};
pub use binding::{ArtifactFile, Emission, NodeId};
pub(crate) use binding::BindingKey;
pub use events::RegistryEvent;
pub use ids::{ArtifactId, ExecutionId, FileId, GroupId, Id, IdMarker};
pub use kind::{ArtifactKind, EmptyKind};
pub use record::{ArtifactListing, ExecutionRecord, ExecutionSummary, GroupListing, RecordListing};
