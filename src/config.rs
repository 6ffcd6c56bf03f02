use serde::Deserialize;

use crate::depth::MAX_DOCUMENT_DEPTH;

/// Limits applied by a transform session
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    /// Maximum nesting depth of the working document and of subtree values
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Whether to check subtree values against `max_depth` before merging
    #[serde(default = "default_validate_input")]
    pub validate_input: bool,
}

fn default_max_depth() -> usize {
    MAX_DOCUMENT_DEPTH
}

fn default_validate_input() -> bool {
    true
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            max_depth: default_max_depth(),
            validate_input: default_validate_input(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: TransformConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TransformConfig::default());
        assert_eq!(config.max_depth, 1000);
        assert!(config.validate_input);
    }

    #[test]
    fn test_config_from_yaml() {
        let config: TransformConfig =
            serde_yaml::from_str("max_depth: 16\nvalidate_input: false\n").unwrap();
        assert_eq!(config.max_depth, 16);
        assert!(!config.validate_input);
    }
}
