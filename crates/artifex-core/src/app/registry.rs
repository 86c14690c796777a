//! ArtifactRegistry - 実行スコープの識別子レジストリ
//!
//! One registry per pipeline execution. It is passed by reference to the
//! pipeline definition code and to the emission points; there is no global
//! instance.
//!
//! Lifecycle:
//! - *defining*: groups and artifacts may be declared
//! - *executing*: entered on the first binding (or `begin_execution`);
//!   further definitions fail with `DefinitionsClosed`
//! - `finish` consumes the registry and yields the `ExecutionRecord`

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::{BindingPolicy, RegistryConfig};
use crate::domain::extension;
use crate::domain::{
    Artifact, ArtifactFile, ArtifactGroup, ArtifactId, ArtifactKind, ArtifactOwner, ArtifactSpec,
    BindingKey, Emission, ExecutionId, ExecutionRecord, GroupId, NodeId, RegistryEvent,
};
use crate::error::RegistryError;
use crate::ports::{Clock, EventSink, IdGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Defining,
    Executing,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    name: String,
    kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ArtifactKey {
    Kind { name: String, kind: String },
    Group { name: String, group: GroupId },
}

pub struct ArtifactRegistry {
    execution_id: ExecutionId,
    config: RegistryConfig,
    phase: Phase,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,

    clock: Arc<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    sink: Arc<dyn EventSink>,

    groups: Vec<ArtifactGroup>,
    group_keys: HashMap<GroupKey, GroupId>,
    group_pos: HashMap<GroupId, usize>,

    artifacts: Vec<Artifact>,
    artifact_keys: HashMap<ArtifactKey, ArtifactId>,
    artifact_pos: HashMap<ArtifactId, usize>,

    files: Vec<ArtifactFile>,
    bindings: HashSet<BindingKey>,
}

impl fmt::Debug for ArtifactRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactRegistry")
            .field("execution_id", &self.execution_id)
            .field("phase", &self.phase)
            .field("config", &self.config)
            .field("groups", &self.groups.len())
            .field("artifacts", &self.artifacts.len())
            .field("files", &self.files.len())
            .finish_non_exhaustive()
    }
}

impl ArtifactRegistry {
    pub(crate) fn from_parts(
        config: RegistryConfig,
        clock: Arc<dyn Clock>,
        ids: Box<dyn IdGenerator>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let execution_id = ids.execution_id();
        let created_at = clock.now();
        debug!(%execution_id, policy = ?config.binding_policy, "artifact registry created");
        Self {
            execution_id,
            config,
            phase: Phase::Defining,
            created_at,
            started_at: None,
            clock,
            ids,
            sink,
            groups: Vec::new(),
            group_keys: HashMap::new(),
            group_pos: HashMap::new(),
            artifacts: Vec::new(),
            artifact_keys: HashMap::new(),
            artifact_pos: HashMap::new(),
            files: Vec::new(),
            bindings: HashSet::new(),
        }
    }

    pub fn execution_id(&self) -> ExecutionId {
        self.execution_id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    // ========================================
    // Definitions
    // ========================================

    /// Declare a group. (`name`, `kind`) must be unused in this execution.
    pub fn define_group(
        &mut self,
        name: impl Into<String>,
        kind: ArtifactKind,
    ) -> Result<ArtifactGroup, RegistryError> {
        self.ensure_defining()?;
        let name = non_empty(name.into(), "group name")?;
        let kind = valid_kind(kind)?;

        let key = GroupKey {
            name: name.clone(),
            kind: kind.canonical(),
        };
        if self.group_keys.contains_key(&key) {
            warn!(execution_id = %self.execution_id, group = %name, %kind, "duplicate artifact group rejected");
            return Err(RegistryError::DuplicateGroup { name, kind });
        }

        let group = ArtifactGroup {
            id: self.ids.group_id(),
            name,
            kind,
        };
        self.group_keys.insert(key, group.id);
        self.group_pos.insert(group.id, self.groups.len());
        self.groups.push(group.clone());

        debug!(execution_id = %self.execution_id, group_id = %group.id, group = %group.name, kind = %group.kind, "artifact group defined");
        self.sink.publish(&RegistryEvent::GroupDefined {
            execution_id: self.execution_id,
            group: group.clone(),
        });
        Ok(group)
    }

    /// Declare an artifact.
    ///
    /// Grouped artifacts take the group's kind; membership is fixed here and
    /// never recomputed for individual files.
    pub fn define_artifact(&mut self, spec: ArtifactSpec) -> Result<Artifact, RegistryError> {
        self.ensure_defining()?;
        let ArtifactSpec {
            name,
            owner,
            file_type,
        } = spec;
        let name = non_empty(name, "artifact name")?;

        let file_type = match file_type {
            Some(raw) => Some(
                extension::normalize_file_type(&raw).ok_or(RegistryError::InvalidFileType(raw))?,
            ),
            None => None,
        };

        let (kind, group, key, owner_label) = match owner {
            ArtifactOwner::Kind(kind) => {
                let kind = valid_kind(kind)?;
                let key = ArtifactKey::Kind {
                    name: name.clone(),
                    kind: kind.canonical(),
                };
                let label = format!("kind {kind}");
                (kind, None, key, label)
            }
            ArtifactOwner::Group(group_id) => {
                let group = self
                    .group(group_id)
                    .ok_or(RegistryError::UnknownGroup(group_id))?;
                let key = ArtifactKey::Group {
                    name: name.clone(),
                    group: group_id,
                };
                let label = format!("group '{}'", group.name);
                (group.kind.clone(), Some(group_id), key, label)
            }
        };

        if self.artifact_keys.contains_key(&key) {
            warn!(execution_id = %self.execution_id, artifact = %name, owner = %owner_label, "duplicate artifact rejected");
            return Err(RegistryError::DuplicateArtifact {
                name,
                owner: owner_label,
            });
        }

        if self.config.require_extension
            && extension::resolve(&name, file_type.as_deref()).is_none()
        {
            warn!(execution_id = %self.execution_id, artifact = %name, "artifact without resolvable extension rejected");
            return Err(RegistryError::UnresolvedExtension { name });
        }

        let artifact = Artifact {
            id: self.ids.artifact_id(),
            name,
            kind,
            group,
            file_type,
        };
        self.artifact_keys.insert(key, artifact.id);
        self.artifact_pos.insert(artifact.id, self.artifacts.len());
        self.artifacts.push(artifact.clone());

        debug!(
            execution_id = %self.execution_id,
            artifact_id = %artifact.id,
            artifact = %artifact.name,
            owner = %owner_label,
            extension = artifact.extension().unwrap_or("-"),
            "artifact defined"
        );
        self.sink.publish(&RegistryEvent::ArtifactDefined {
            execution_id: self.execution_id,
            artifact: artifact.clone(),
        });
        Ok(artifact)
    }

    // ========================================
    // Bindings
    // ========================================

    /// Bind `artifact` to `filename` emitted by `node`.
    pub fn bind_output(
        &mut self,
        artifact: impl Into<ArtifactId>,
        node: impl Into<NodeId>,
        filename: impl Into<String>,
    ) -> Result<ArtifactFile, RegistryError> {
        self.emit(Emission::new(artifact.into(), node, filename))
    }

    /// Record one emitted output.
    ///
    /// The first successful call closes definitions.
    pub fn emit(&mut self, emission: Emission) -> Result<ArtifactFile, RegistryError> {
        let Emission {
            artifact: artifact_id,
            node,
            filename,
            output,
            location,
        } = emission;

        if node.as_str().trim().is_empty() {
            return Err(RegistryError::InvalidName { what: "graph node id" });
        }
        let filename = non_empty(filename, "filename")?;
        let output = output.map(|o| non_empty(o, "output name")).transpose()?;

        let artifact = self
            .artifact(artifact_id)
            .ok_or(RegistryError::UnknownArtifact(artifact_id))?;
        let group = artifact.group;
        let resolved = artifact.extension().map(str::to_string);

        let key = BindingKey {
            filename: filename.clone(),
            node: node.clone(),
            artifact: artifact_id,
            output: match self.config.binding_policy {
                BindingPolicy::Strict => None,
                BindingPolicy::Lenient => output.clone(),
            },
        };
        if self.bindings.contains(&key) {
            warn!(execution_id = %self.execution_id, node_id = %node, %filename, artifact_id = %artifact_id, "duplicate binding rejected");
            return Err(RegistryError::DuplicateBinding {
                filename,
                node,
                artifact: artifact_id,
            });
        }

        self.begin_execution();

        let file = ArtifactFile {
            id: self.ids.file_id(),
            artifact: artifact_id,
            group,
            node,
            filename,
            output,
            location,
            extension: resolved,
            bound_at: self.clock.now(),
        };
        self.bindings.insert(key);
        self.files.push(file.clone());

        debug!(execution_id = %self.execution_id, node_id = %file.node, file_id = %file.id, filename = %file.filename, "output bound");
        self.sink.publish(&RegistryEvent::OutputBound {
            execution_id: self.execution_id,
            file: file.clone(),
        });
        Ok(file)
    }

    // ========================================
    // Extensions
    // ========================================

    /// `file_type` if set, else the suffix of the artifact name, else `None`.
    pub fn resolve_extension(
        &self,
        artifact: impl Into<ArtifactId>,
    ) -> Result<Option<&str>, RegistryError> {
        let id = artifact.into();
        self.artifact(id)
            .map(Artifact::extension)
            .ok_or(RegistryError::UnknownArtifact(id))
    }

    /// Like `resolve_extension`, but a missing extension is an error.
    pub fn require_extension(
        &self,
        artifact: impl Into<ArtifactId>,
    ) -> Result<&str, RegistryError> {
        let id = artifact.into();
        let artifact = self.artifact(id).ok_or(RegistryError::UnknownArtifact(id))?;
        artifact
            .extension()
            .ok_or_else(|| RegistryError::UnresolvedExtension {
                name: artifact.name.clone(),
            })
    }

    // ========================================
    // Lookups
    // ========================================

    pub fn group(&self, id: GroupId) -> Option<&ArtifactGroup> {
        self.group_pos.get(&id).map(|&i| &self.groups[i])
    }

    pub fn artifact(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifact_pos.get(&id).map(|&i| &self.artifacts[i])
    }

    pub fn find_group(&self, name: &str, kind: &ArtifactKind) -> Option<&ArtifactGroup> {
        let key = GroupKey {
            name: name.to_string(),
            kind: kind.canonical(),
        };
        self.group_keys.get(&key).and_then(|&id| self.group(id))
    }

    pub fn find_artifact(&self, name: &str, owner: &ArtifactOwner) -> Option<&Artifact> {
        let key = match owner {
            ArtifactOwner::Kind(kind) => ArtifactKey::Kind {
                name: name.to_string(),
                kind: kind.canonical(),
            },
            ArtifactOwner::Group(group) => ArtifactKey::Group {
                name: name.to_string(),
                group: *group,
            },
        };
        self.artifact_keys.get(&key).and_then(|&id| self.artifact(id))
    }

    pub fn groups(&self) -> &[ArtifactGroup] {
        &self.groups
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn files(&self) -> &[ArtifactFile] {
        &self.files
    }

    pub fn files_in_group(&self, group: GroupId) -> Vec<&ArtifactFile> {
        self.files.iter().filter(|f| f.group == Some(group)).collect()
    }

    // ========================================
    // Lifecycle
    // ========================================

    /// Close definitions. Idempotent.
    pub fn begin_execution(&mut self) {
        if self.phase == Phase::Executing {
            return;
        }
        self.phase = Phase::Executing;
        self.started_at = Some(self.clock.now());
        info!(
            execution_id = %self.execution_id,
            groups = self.groups.len(),
            artifacts = self.artifacts.len(),
            "artifact definitions closed; execution started"
        );
    }

    pub fn finish(self) -> ExecutionRecord {
        let finished_at = self.clock.now();
        let files = self.files.len();
        info!(execution_id = %self.execution_id, files, "execution finished");
        self.sink.publish(&RegistryEvent::ExecutionFinished {
            execution_id: self.execution_id,
            files,
        });
        ExecutionRecord {
            execution_id: self.execution_id,
            started_at: self.started_at.unwrap_or(self.created_at),
            finished_at,
            config: self.config,
            groups: self.groups,
            artifacts: self.artifacts,
            files: self.files,
        }
    }

    fn ensure_defining(&self) -> Result<(), RegistryError> {
        match self.phase {
            Phase::Defining => Ok(()),
            Phase::Executing => Err(RegistryError::DefinitionsClosed),
        }
    }
}

fn non_empty(value: String, what: &'static str) -> Result<String, RegistryError> {
    if value.trim().is_empty() {
        Err(RegistryError::InvalidName { what })
    } else {
        Ok(value)
    }
}

fn valid_kind(kind: ArtifactKind) -> Result<ArtifactKind, RegistryError> {
    kind.normalized()
        .map_err(|_| RegistryError::InvalidName { what: "artifact kind" })
}
