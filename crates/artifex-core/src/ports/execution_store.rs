//! ExecutionStore port - 完了した実行レコードの保存先
//!
//! # 実装（impls/）
//! - InMemoryExecutionStore: 開発・テスト用
//! - FsExecutionStore: `<root>/<execution-id>.json` に 1 レコードずつ保存

use async_trait::async_trait;

use crate::domain::{ExecutionId, ExecutionRecord, ExecutionSummary};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("execution {0} is already stored")]
    AlreadyExists(ExecutionId),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// ExecutionStore は ExecutionRecord を保存・検索する
///
/// レコードは不変なので、同じ execution_id での上書きはできません。
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn save(&self, record: &ExecutionRecord) -> Result<(), StoreError>;

    async fn get(&self, id: ExecutionId) -> Result<Option<ExecutionRecord>, StoreError>;

    /// finished_at の昇順
    async fn list(&self) -> Result<Vec<ExecutionSummary>, StoreError>;
}
