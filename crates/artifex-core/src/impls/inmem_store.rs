//! InMemoryExecutionStore - 開発・テスト用の ExecutionStore

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ExecutionId, ExecutionRecord, ExecutionSummary};
use crate::ports::{ExecutionStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    records: RwLock<HashMap<ExecutionId, ExecutionRecord>>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn save(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.execution_id) {
            return Err(StoreError::AlreadyExists(record.execution_id));
        }
        records.insert(record.execution_id, record.clone());
        Ok(())
    }

    async fn get(&self, id: ExecutionId) -> Result<Option<ExecutionRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ExecutionSummary>, StoreError> {
        let mut summaries: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .map(ExecutionRecord::summary)
            .collect();
        summaries.sort_by_key(|s| (s.finished_at, s.execution_id));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RegistryBuilder;
    use crate::domain::{ArtifactKind, ArtifactSpec};

    fn record() -> ExecutionRecord {
        let mut reg = RegistryBuilder::new().build();
        let a = reg
            .define_artifact(ArtifactSpec::new("model.pkl", ArtifactKind::Model))
            .unwrap();
        reg.bind_output(&a, "train_model", "model.pkl").unwrap();
        reg.finish()
    }

    #[tokio::test]
    async fn save_then_get() {
        let store = InMemoryExecutionStore::new();
        let record = record();

        store.save(&record).await.unwrap();

        let back = store.get(record.execution_id).await.unwrap();
        assert_eq!(back, Some(record));
    }

    #[tokio::test]
    async fn saving_the_same_execution_twice_fails() {
        let store = InMemoryExecutionStore::new();
        let record = record();

        store.save(&record).await.unwrap();
        let err = store.save(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(id) if id == record.execution_id));
    }

    #[tokio::test]
    async fn list_returns_summaries() {
        let store = InMemoryExecutionStore::new();
        store.save(&record()).await.unwrap();
        store.save(&record()).await.unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|s| s.files == 1 && s.artifacts == 1));
    }
}
