//! artifex-core
//!
//! Execution-scoped identity for workflow artifacts.
//!
//! A pipeline declares artifact groups and artifacts up front, then binds
//! emitted task outputs to them while it runs. The registry guarantees that
//! identity is never ambiguous within one execution and hands back an
//! `ExecutionRecord` that can be queried by group, artifact or node.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, kind, artifact, binding, record, events）
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, EventSink, ExecutionStore）
//! - **app**: ArtifactRegistry, RegistryBuilder, PipelineManifest
//! - **impls**: ports の実装（イベントシンク、メモリ / ファイルストア）
//! - **config**: RegistryConfig, BindingPolicy
//! - **error**: RegistryError

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{ArtifactRegistry, PipelineManifest, RegistryBuilder};
pub use config::{BindingPolicy, RegistryConfig};
pub use error::RegistryError;
