//! EventSink port - イベント記録の抽象化
//!
//! レジストリは受理した定義・バインドごとに RegistryEvent を発行します。
//!
//! # 実装（impls/）
//! - NoopEventSink: 何もしない（デフォルト）
//! - TracingEventSink: tracing に構造化ログとして出力
//! - CollectingEventSink: メモリに溜める（テスト・集計用）

use std::sync::Arc;

use crate::domain::RegistryEvent;

/// EventSink はドメインイベントを受け取る
///
/// レジストリは同期的に動くので、このメソッドもブロックせずに戻ること。
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &RegistryEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, event: &RegistryEvent) {
        (**self).publish(event)
    }
}
