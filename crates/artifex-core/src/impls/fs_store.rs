//! FsExecutionStore - ファイルシステム上の ExecutionStore
//!
//! Layout: `<root>/<execution-ulid>.json`, one pretty-printed record per file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::{ExecutionId, ExecutionRecord, ExecutionSummary};
use crate::ports::{ExecutionStore, StoreError};

pub struct FsExecutionStore {
    root: PathBuf,
}

impl FsExecutionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: ExecutionId) -> PathBuf {
        self.root.join(format!("{}.json", id.as_ulid()))
    }
}

#[async_trait]
impl ExecutionStore for FsExecutionStore {
    async fn save(&self, record: &ExecutionRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.record_path(record.execution_id);
        let bytes = serde_json::to_vec_pretty(record)?;

        // Written in full to a temp file first, then linked into place.
        // hard_link never replaces an existing record.
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        let linked = fs::hard_link(&tmp, &path).await;
        fs::remove_file(&tmp).await?;
        match linked {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(record.execution_id));
            }
            Err(e) => return Err(e.into()),
        }

        debug!(execution_id = %record.execution_id, path = %path.display(), "execution record saved");
        Ok(())
    }

    async fn get(&self, id: ExecutionId) -> Result<Option<ExecutionRecord>, StoreError> {
        match fs::read(self.record_path(id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<ExecutionSummary>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match serde_json::from_slice::<ExecutionRecord>(&bytes) {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable execution record");
                }
            }
        }
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
        let foo = reg.define_group("reports_foo", ArtifactKind::Report).unwrap();
        let r1 = reg.define_artifact(ArtifactSpec::new("report1.csv", &foo)).unwrap();
        reg.bind_output(&r1, "prepare_data", "report1.csv").unwrap();
        reg.finish()
    }

    #[tokio::test]
    async fn save_then_get_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path().join("executions"));
        let record = record();

        store.save(&record).await.unwrap();

        assert!(store.record_path(record.execution_id).exists());
        assert_eq!(store.get(record.execution_id).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn records_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path());
        let record = record();

        store.save(&record).await.unwrap();
        assert!(matches!(
            store.save(&record).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn leftover_partial_write_does_not_block_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path());
        let record = record();
        let tmp = store.record_path(record.execution_id).with_extension("json.tmp");
        std::fs::write(&tmp, "{\"execution_id\":").unwrap();

        assert!(store.list().await.unwrap().is_empty());
        store.save(&record).await.unwrap();

        assert!(!tmp.exists());
        assert_eq!(store.get(record.execution_id).await.unwrap(), Some(record));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_save_keeps_the_stored_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path());
        let record = record();
        store.save(&record).await.unwrap();
        let before = std::fs::read(store.record_path(record.execution_id)).unwrap();

        assert!(store.save(&record).await.is_err());

        let after = std::fs::read(store.record_path(record.execution_id)).unwrap();
        assert_eq!(before, after);
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn missing_root_lists_nothing_and_gets_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path().join("missing"));

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.get(record().execution_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_skips_foreign_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsExecutionStore::new(dir.path());
        store.save(&record()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].groups, 1);
    }
}
