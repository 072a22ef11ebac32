use omap_types::JoinPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};

/// Configuration for the join-aware maps.
///
/// ```toml
/// write_policy = "merge"
/// read_policy = "combine"
/// initial_capacity = 64
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Conflict resolution applied by `add` when a value already exists at
    /// the same (key, variant) address.
    pub write_policy: JoinPolicy,
    /// Join applied by `get_joined` against the dynamic variant of the same
    /// key.
    pub read_policy: JoinPolicy,
    /// Number of primary keys to preallocate room for.
    pub initial_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            write_policy: JoinPolicy::Replace,
            read_policy: JoinPolicy::Replace,
            initial_capacity: 0,
        }
    }
}

impl MapConfig {
    /// Merge on write and merge with the dynamic variant on read.
    pub fn merging() -> Self {
        Self {
            write_policy: JoinPolicy::Merge,
            read_policy: JoinPolicy::Merge,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> MapResult<Self> {
        toml::from_str(s).map_err(|e| MapError::Config(e.to_string()))
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml_string(&self) -> MapResult<String> {
        toml::to_string(self).map_err(|e| MapError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = MapConfig::default();
        assert_eq!(c.write_policy, JoinPolicy::Replace);
        assert_eq!(c.read_policy, JoinPolicy::Replace);
        assert_eq!(c.initial_capacity, 0);
    }

    #[test]
    fn merging_config() {
        let c = MapConfig::merging();
        assert_eq!(c.write_policy, JoinPolicy::Merge);
        assert_eq!(c.read_policy, JoinPolicy::Merge);
    }

    #[test]
    fn parse_partial_toml() {
        let c = MapConfig::from_toml_str(r#"write_policy = "combine""#).unwrap();
        assert_eq!(c.write_policy, JoinPolicy::Combine);
        assert_eq!(c.read_policy, JoinPolicy::Replace);
    }

    #[test]
    fn parse_full_toml() {
        let c = MapConfig::from_toml_str(
            r#"
            write_policy = "merge"
            read_policy = "combine"
            initial_capacity = 64
            "#,
        )
        .unwrap();
        assert_eq!(
            c,
            MapConfig {
                write_policy: JoinPolicy::Merge,
                read_policy: JoinPolicy::Combine,
                initial_capacity: 64,
            }
        );
    }

    #[test]
    fn toml_roundtrip() {
        let c = MapConfig::merging();
        let text = c.to_toml_string().unwrap();
        assert_eq!(MapConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = MapConfig::from_toml_str(r#"write_policy = "overwrite""#).unwrap_err();
        assert!(matches!(err, MapError::Config(_)));
    }

    #[test]
    fn rejects_unknown_field() {
        let err = MapConfig::from_toml_str("depth_limit = 3").unwrap_err();
        assert!(err.to_string().contains("invalid map configuration"));
    }
}
