//! RegistryBuilder - レジストリの構築とワイヤリング
//!
//! # 使用例
//! ```ignore
//! let mut registry = RegistryBuilder::new()
//!     .config(RegistryConfig::lenient())
//!     .event_sink(TracingEventSink)
//!     .build();
//! ```
//!
//! マニフェストから構築する場合は `apply_manifest` を使います。
//! グループ・アーティファクトの定義と出力参照の解決をすべて起動時に行い、
//! 問題があれば最初のエラーで止まります（Fail-fast）。

use std::sync::Arc;

use tracing::info;

use super::manifest::{EmissionPlan, ManifestError, PipelineManifest};
use super::registry::ArtifactRegistry;
use crate::config::RegistryConfig;
use crate::impls::NoopEventSink;
use crate::ports::{Clock, EventSink, IdGenerator, SystemClock, UlidGenerator};

#[derive(Default)]
pub struct RegistryBuilder {
    config: Option<RegistryConfig>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Box<dyn IdGenerator>>,
    sink: Option<Arc<dyn EventSink>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes precedence over a manifest's `config` section.
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Used for bind timestamps and, unless `id_generator` is set, for ids.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn build(mut self) -> ArtifactRegistry {
        let config = self.config.take().unwrap_or_default();
        self.build_with(config)
    }

    /// Build a registry and define everything `manifest` declares.
    ///
    /// Returns the registry, still in the defining phase, together with the
    /// resolved emissions the execution engine is expected to report.
    pub fn apply_manifest(
        mut self,
        manifest: &PipelineManifest,
    ) -> Result<(ArtifactRegistry, EmissionPlan), ManifestError> {
        let config = self.config.take().unwrap_or_else(|| manifest.config.clone());
        let mut registry = self.build_with(config);
        let plan = manifest.define_in(&mut registry)?;
        info!(
            execution_id = %registry.execution_id(),
            pipeline = manifest.name.as_deref().unwrap_or("-"),
            groups = registry.groups().len(),
            artifacts = registry.artifacts().len(),
            emissions = plan.emissions.len(),
            "pipeline manifest applied"
        );
        Ok((registry, plan))
    }

    fn build_with(self, config: RegistryConfig) -> ArtifactRegistry {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Box::new(UlidGenerator::new(clock.clone())));
        let sink = self.sink.unwrap_or_else(|| Arc::new(NoopEventSink));
        ArtifactRegistry::from_parts(config, clock, ids, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindingPolicy;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use ulid::Ulid;

    struct CountingIds(std::sync::atomic::AtomicU64);

    impl IdGenerator for CountingIds {
        fn next_ulid(&self) -> Ulid {
            let n = self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            Ulid::from_parts(0, n as u128)
        }
    }

    #[test]
    fn defaults_are_strict() {
        let registry = RegistryBuilder::new().build();
        assert_eq!(registry.config().binding_policy, BindingPolicy::Strict);
    }

    #[test]
    fn custom_id_generator_is_used() {
        let registry = RegistryBuilder::new()
            .id_generator(CountingIds(Default::default()))
            .build();
        assert_eq!(registry.execution_id().as_ulid(), Ulid::from_parts(0, 0));
    }

    #[test]
    fn default_ids_follow_the_clock() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let registry = RegistryBuilder::new().clock(FixedClock::new(at)).build();
        assert_eq!(
            registry.execution_id().as_ulid().timestamp_ms(),
            at.timestamp_millis() as u64
        );
    }

    #[test]
    fn builder_config_overrides_manifest_config() {
        let manifest: PipelineManifest =
            serde_json::from_str(r#"{ "config": { "binding_policy": "lenient" } }"#).unwrap();

        let (registry, _) = RegistryBuilder::new().apply_manifest(&manifest).unwrap();
        assert_eq!(registry.config().binding_policy, BindingPolicy::Lenient);

        let (registry, _) = RegistryBuilder::new()
            .config(RegistryConfig::strict())
            .apply_manifest(&manifest)
            .unwrap();
        assert_eq!(registry.config().binding_policy, BindingPolicy::Strict);
    }
}
