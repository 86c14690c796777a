//! Registry configuration.
//!
//! Every field has a default so a manifest may omit the `config` section
//! entirely or set only what it needs.

use serde::{Deserialize, Serialize};

/// How to treat two outputs of the same node that share (filename, artifact).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingPolicy {
    /// Reject any second binding of the same (filename, node, artifact).
    #[default]
    Strict,

    /// Also key bindings on the output name: distinct named outputs of one node
    /// may share (filename, artifact). An exact repeat is still rejected.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub binding_policy: BindingPolicy,

    /// Fail `define_artifact` when no extension can be resolved.
    pub require_extension: bool,
}

impl RegistryConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            binding_policy: BindingPolicy::Lenient,
            ..Self::default()
        }
    }

    pub fn with_require_extension(mut self, require: bool) -> Self {
        self.require_extension = require;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_strict_and_tolerates_missing_extensions() {
        let c = RegistryConfig::default();
        assert_eq!(c.binding_policy, BindingPolicy::Strict);
        assert!(!c.require_extension);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let c: RegistryConfig = serde_json::from_str(r#"{ "require_extension": true }"#).unwrap();
        assert_eq!(c.binding_policy, BindingPolicy::Strict);
        assert!(c.require_extension);

        let c: RegistryConfig = serde_json::from_str(r#"{ "binding_policy": "lenient" }"#).unwrap();
        assert_eq!(c, RegistryConfig::lenient());
    }
}
