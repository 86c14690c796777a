//! EventSink 実装
//!
//! - NoopEventSink: 何もしない（ビルダーのデフォルト）
//! - TracingEventSink: info レベルの構造化ログ
//! - CollectingEventSink: イベントをメモリに溜める

use std::sync::Mutex;

use tracing::info;

use crate::domain::RegistryEvent;
use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, _event: &RegistryEvent) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: &RegistryEvent) {
        let execution_id = event.execution_id();
        match event {
            RegistryEvent::GroupDefined { group, .. } => {
                info!(%execution_id, event = event.name(), group_id = %group.id, group = %group.name, kind = %group.kind, "registry event");
            }
            RegistryEvent::ArtifactDefined { artifact, .. } => {
                info!(%execution_id, event = event.name(), artifact_id = %artifact.id, artifact = %artifact.name, kind = %artifact.kind, "registry event");
            }
            RegistryEvent::OutputBound { file, .. } => {
                info!(%execution_id, event = event.name(), node_id = %file.node, file_id = %file.id, filename = %file.filename, "registry event");
            }
            RegistryEvent::ExecutionFinished { files, .. } => {
                info!(%execution_id, event = event.name(), files = *files, "registry event");
            }
        }
    }
}

/// CollectingEventSink は受け取ったイベントを順番に保持
///
/// `Arc` で包んでビルダーに渡し、手元のクローンから `events()` で読む。
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<RegistryEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 受信順のスナップショット
    pub fn events(&self) -> Vec<RegistryEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for CollectingEventSink {
    fn publish(&self, event: &RegistryEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
