//! Implementations of the ports.

pub mod fs_store;
pub mod inmem_store;
pub mod sinks;

pub use fs_store::FsExecutionStore;
pub use inmem_store::InMemoryExecutionStore;
pub use sinks::{CollectingEventSink, NoopEventSink, TracingEventSink};
