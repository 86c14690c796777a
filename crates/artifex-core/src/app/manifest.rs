//! Pipeline manifest: declarative artifact metadata for a pipeline.
//!
//! A manifest declares groups, artifacts and, per graph node, which named
//! outputs are tracked as which artifact. It is the explicit stand-in for
//! annotating task outputs in code.
//!
//! ```json
//! {
//!   "name": "artifact_meta",
//!   "groups": [{ "name": "reports_foo", "kind": "REPORT" }],
//!   "artifacts": [
//!     { "name": "report1.csv", "group": { "name": "reports_foo", "kind": "REPORT" } },
//!     { "name": "processed.csv", "kind": "DATA" }
//!   ],
//!   "nodes": [
//!     { "id": "prepare_data", "outputs": [{ "output": "processed_data", "artifact": "processed.csv" }] }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::registry::ArtifactRegistry;
use crate::config::RegistryConfig;
use crate::domain::{ArtifactId, ArtifactKind, ArtifactOwner, ArtifactSpec, Emission, NodeId};
use crate::error::RegistryError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineManifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub config: RegistryConfig,

    #[serde(default)]
    pub groups: Vec<GroupRef>,

    #[serde(default)]
    pub artifacts: Vec<ArtifactDecl>,

    #[serde(default)]
    pub nodes: Vec<NodeDecl>,
}

/// A group declaration, and the way artifacts refer to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub name: String,
    pub kind: ArtifactKind,
}

/// Exactly one of `kind` / `group` is expected. Both may be given if the kind
/// matches the group's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDecl {
    pub id: String,

    #[serde(default)]
    pub outputs: Vec<OutputDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDecl {
    pub output: String,

    /// Artifact name. Outputs without one are plain workflow outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,

    /// Defaults to the artifact name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Emissions resolved from a manifest, in node order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmissionPlan {
    pub emissions: Vec<Emission>,

    /// (node, output) pairs that are not tracked as artifacts.
    pub untracked: Vec<(NodeId, String)>,
}

impl EmissionPlan {
    pub fn for_node<'a>(&'a self, node: &'a NodeId) -> impl Iterator<Item = &'a Emission> + 'a {
        self.emissions.iter().filter(move |e| &e.node == node)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("artifact '{artifact}' refers to undeclared group '{name}' of kind {kind}")]
    UnknownGroupRef {
        artifact: String,
        name: String,
        kind: ArtifactKind,
    },

    #[error("artifact '{0}' needs either a kind or a group")]
    MissingOwner(String),

    #[error("artifact '{artifact}' declares kind {declared} but its group is of kind {group_kind}")]
    ConflictingOwner {
        artifact: String,
        declared: ArtifactKind,
        group_kind: ArtifactKind,
    },

    #[error("output '{output}' of node '{node}' refers to undeclared artifact '{artifact}'")]
    UnknownArtifactRef {
        node: String,
        output: String,
        artifact: String,
    },

    #[error("output '{output}' of node '{node}' refers to '{artifact}', which names more than one artifact")]
    AmbiguousArtifactRef {
        node: String,
        output: String,
        artifact: String,
    },
}

impl PipelineManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Define every group and artifact in `registry` and resolve the outputs.
    pub(crate) fn define_in(
        &self,
        registry: &mut ArtifactRegistry,
    ) -> Result<EmissionPlan, ManifestError> {
        for group in &self.groups {
            registry.define_group(group.name.clone(), group.kind.clone())?;
        }

        let mut by_name: HashMap<&str, Vec<ArtifactId>> = HashMap::new();
        for decl in &self.artifacts {
            let owner = self.owner_of(decl, registry)?;
            let mut spec = ArtifactSpec::new(decl.name.clone(), owner);
            spec.file_type = decl.file_type.clone();
            let artifact = registry.define_artifact(spec)?;
            by_name.entry(decl.name.as_str()).or_default().push(artifact.id);
        }

        let mut plan = EmissionPlan::default();
        for node in &self.nodes {
            let node_id = NodeId::new(node.id.clone());
            for output in &node.outputs {
                let Some(artifact_name) = output.artifact.as_deref() else {
                    plan.untracked.push((node_id.clone(), output.output.clone()));
                    continue;
                };
                let artifact = match by_name.get(artifact_name).map(Vec::as_slice) {
                    Some([id]) => *id,
                    Some(_) => {
                        return Err(ManifestError::AmbiguousArtifactRef {
                            node: node.id.clone(),
                            output: output.output.clone(),
                            artifact: artifact_name.to_string(),
                        });
                    }
                    None => {
                        return Err(ManifestError::UnknownArtifactRef {
                            node: node.id.clone(),
                            output: output.output.clone(),
                            artifact: artifact_name.to_string(),
                        });
                    }
                };

                let filename = output
                    .filename
                    .clone()
                    .unwrap_or_else(|| artifact_name.to_string());
                let mut emission = Emission::new(artifact, node_id.clone(), filename)
                    .with_output(output.output.clone());
                emission.location = output.location.clone();
                plan.emissions.push(emission);
            }
        }
        Ok(plan)
    }

    fn owner_of(
        &self,
        decl: &ArtifactDecl,
        registry: &ArtifactRegistry,
    ) -> Result<ArtifactOwner, ManifestError> {
        match (&decl.kind, &decl.group) {
            (None, None) => Err(ManifestError::MissingOwner(decl.name.clone())),
            (Some(kind), None) => Ok(ArtifactOwner::Kind(kind.clone())),
            (declared, Some(group_ref)) => {
                let group = registry
                    .find_group(&group_ref.name, &group_ref.kind)
                    .ok_or_else(|| ManifestError::UnknownGroupRef {
                        artifact: decl.name.clone(),
                        name: group_ref.name.clone(),
                        kind: group_ref.kind.clone(),
                    })?;
                if let Some(declared) = declared {
                    if declared != &group.kind {
                        return Err(ManifestError::ConflictingOwner {
                            artifact: decl.name.clone(),
                            declared: declared.clone(),
                            group_kind: group.kind.clone(),
                        });
                    }
                }
                Ok(ArtifactOwner::Group(group.id))
            }
        }
    }
}
