//! Ports - 抽象化レイヤー
//!
//! レジストリが外部（時刻、ID 発行、イベント配送、レコード保存）に
//! 依存する箇所はすべて trait として切り出しています。

pub mod clock;
pub mod event_sink;
pub mod execution_store;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::execution_store::{ExecutionStore, StoreError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
