//! Project-level engine configuration loaded from YAML.
//!
//! Externalizes the resolution knobs so they live next to the operations
//! and dictionary files instead of being hardcoded in Rust source.
//!
//! # File format
//!
//! ```yaml
//! # restfuzz config.yaml
//!
//! # Method-priority table for producer ranking. "normal" is authoritative;
//! # "exploratory" is an explicit opt-in alternate.
//! method_ordering: normal
//!
//! # Skip producers whose value only exists inside arrays/sub-objects of
//! # other responses.
//! exclude_nested_producers: false
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ranking::MethodOrdering;

/// Project-level engine configuration.
///
/// Loaded from a YAML file via [`EngineConfig::load`]; every field has a
/// default so a partial (or absent) file works.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Method-priority table used by the match ranking algorithm.
    pub method_ordering: MethodOrdering,

    /// When set, consumers never bind to nested-body producers.
    pub exclude_nested_producers: bool,
}

impl EngineConfig {
    /// Load config from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_defaults() {
        let config: EngineConfig = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(config.method_ordering, MethodOrdering::Normal);
        assert!(!config.exclude_nested_producers);
    }

    #[test]
    fn deserialize_full() {
        let yaml = "
method_ordering: exploratory
exclude_nested_producers: true
";
        let config: EngineConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.method_ordering, MethodOrdering::Exploratory);
        assert!(config.exclude_nested_producers);
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = EngineConfig::load(Path::new("/nonexistent/config.yaml"));
        assert!(result.is_err());
    }
}
