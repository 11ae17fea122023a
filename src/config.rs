//! Engine configuration.
//!
//! Plain serde structs with defaults. Where the JSON comes from (a file, an
//! environment variable, a caller's own settings layer) is up to the caller.

use serde::{Deserialize, Serialize};

use crate::Result;

/// When the query engine builds a `Graph` for a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphPolicy {
    /// Only when the query contains a link condition.
    #[default]
    Auto,
    Always,
    /// Link conditions scan the entry's own connections instead.
    Never,
}

/// Query engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ordering operators compare numerically when both sides parse as
    /// numbers (default: true)
    pub numeric_ordering: bool,
    /// Trace depth used when the caller gives none (default: 3)
    pub default_trace_depth: usize,
    /// Upper bound on trace depth; larger requests are clamped (default: 10)
    pub max_trace_depth: usize,
    /// Graph construction policy for queries (default: auto)
    pub build_graph: GraphPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            numeric_ordering: true,
            default_trace_depth: 3,
            max_trace_depth: 10,
            build_graph: GraphPolicy::Auto,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective trace depth for a request.
    pub fn trace_depth(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_trace_depth)
            .min(self.max_trace_depth)
    }

    /// Whether a query needs a graph under this policy.
    pub fn wants_graph(&self, has_link_condition: bool) -> bool {
        match self.build_graph {
            GraphPolicy::Auto => has_link_condition,
            GraphPolicy::Always => true,
            GraphPolicy::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert!(config.numeric_ordering);
        assert_eq!(config.default_trace_depth, 3);
        assert_eq!(config.max_trace_depth, 10);
        assert_eq!(config.build_graph, GraphPolicy::Auto);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"max_trace_depth": 4, "build_graph": "never"}"#).unwrap();
        assert_eq!(config.max_trace_depth, 4);
        assert_eq!(config.build_graph, GraphPolicy::Never);
        assert!(config.numeric_ordering);

        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(EngineConfig::from_json_str(r#"{"build_graph": "sometimes"}"#).is_err());
    }

    #[test]
    fn test_trace_depth_clamped() {
        let config = EngineConfig::default();
        assert_eq!(config.trace_depth(None), 3);
        assert_eq!(config.trace_depth(Some(7)), 7);
        assert_eq!(config.trace_depth(Some(50)), 10);
    }

    #[test]
    fn test_wants_graph() {
        let mut config = EngineConfig::default();
        assert!(config.wants_graph(true));
        assert!(!config.wants_graph(false));
        config.build_graph = GraphPolicy::Always;
        assert!(config.wants_graph(false));
        config.build_graph = GraphPolicy::Never;
        assert!(!config.wants_graph(true));
    }
}
