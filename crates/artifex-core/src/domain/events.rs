//! Events - レジストリで発生したイベント
//!
//! 定義・バインドが受理されるたびに EventSink へ発行されます。
//! 拒否された操作はイベントになりません（エラーとして呼び出し元へ返ります）。

use serde::{Deserialize, Serialize};

use super::artifact::{Artifact, ArtifactGroup};
use super::binding::ArtifactFile;
use super::ids::ExecutionId;

/// RegistryEvent はレジストリのドメインイベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    GroupDefined {
        execution_id: ExecutionId,
        group: ArtifactGroup,
    },
    ArtifactDefined {
        execution_id: ExecutionId,
        artifact: Artifact,
    },
    OutputBound {
        execution_id: ExecutionId,
        file: ArtifactFile,
    },
    ExecutionFinished {
        execution_id: ExecutionId,
        files: usize,
    },
}

impl RegistryEvent {
    pub fn execution_id(&self) -> ExecutionId {
        match self {
            RegistryEvent::GroupDefined { execution_id, .. }
            | RegistryEvent::ArtifactDefined { execution_id, .. }
            | RegistryEvent::OutputBound { execution_id, .. }
            | RegistryEvent::ExecutionFinished { execution_id, .. } => *execution_id,
        }
    }

    /// ログ用の短い名前
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::GroupDefined { .. } => "group_defined",
            RegistryEvent::ArtifactDefined { .. } => "artifact_defined",
            RegistryEvent::OutputBound { .. } => "output_bound",
            RegistryEvent::ExecutionFinished { .. } => "execution_finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ulid::Ulid;

    #[test]
    fn event_is_internally_tagged() {
        let execution_id = ExecutionId::from_ulid(Ulid::new());
        let e = RegistryEvent::ExecutionFinished {
            execution_id,
            files: 3,
        };

        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["event"], "execution_finished");
        assert_eq!(v["files"], 3);
        assert_eq!(e.name(), "execution_finished");
        assert_eq!(e.execution_id(), execution_id);
    }
}
