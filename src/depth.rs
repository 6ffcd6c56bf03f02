// doc_transform - Depth Validation Module
//
// Guards the recursive merge and lookup code against pathologically nested
// input documents and subtree values.

use serde_json::{Map, Value};

use crate::error::{Result, TransformError};

/// Default maximum nesting depth accepted by a transform session
pub const MAX_DOCUMENT_DEPTH: usize = 1000;

/// Validate that a document does not exceed `max_depth` nesting levels
///
/// Traversal stops as soon as the limit is crossed, so very deep input is
/// rejected without walking all of it.
///
/// # Errors
/// Returns [`TransformError::DepthExceeded`] if any branch is deeper than
/// `max_depth`.
pub fn validate_depth(val: &Value, max_depth: usize) -> Result<()> {
    check_depth(val, 0, max_depth)
}

/// [`validate_depth`] for a document held as its root mapping
pub fn validate_mapping_depth(map: &Map<String, Value>, max_depth: usize) -> Result<()> {
    map.values()
        .try_for_each(|v| check_depth(v, 1, max_depth))
}

fn check_depth(val: &Value, current: usize, max: usize) -> Result<()> {
    if current > max {
        return Err(TransformError::DepthExceeded { max });
    }
    match val {
        Value::Object(map) => map
            .values()
            .try_for_each(|v| check_depth(v, current + 1, max)),
        Value::Array(arr) => arr.iter().try_for_each(|v| check_depth(v, current + 1, max)),
        _ => Ok(()),
    }
}

/// Maximum nesting depth of a document (0 for scalars and empty containers)
pub fn max_depth(val: &Value) -> usize {
    match val {
        Value::Object(map) => map.values().map(max_depth).max().map_or(0, |d| d + 1),
        Value::Array(arr) => arr.iter().map(max_depth).max().map_or(0, |d| d + 1),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_depth_shallow() {
        let val = json!({"a": 1, "b": {"c": 2}});
        assert!(validate_depth(&val, MAX_DOCUMENT_DEPTH).is_ok());
    }

    #[test]
    fn test_validate_depth_too_deep() {
        let mut deep = json!({"level": 1});
        for _ in 0..MAX_DOCUMENT_DEPTH {
            deep = json!({"nested": deep});
        }

        let err = validate_depth(&deep, MAX_DOCUMENT_DEPTH).unwrap_err();
        assert!(err.to_string().contains("nesting too deep"));
        assert!(err.to_string().contains("max 1000"));
    }

    #[test]
    fn test_validate_depth_custom_limit() {
        let val = json!({"a": {"b": {"c": 1}}});
        assert!(validate_depth(&val, 3).is_ok());
        assert!(validate_depth(&val, 2).is_err());
    }

    #[test]
    fn test_validate_mapping_depth_matches_value() {
        let val = json!({"a": {"b": {"c": 1}}});
        let map = val.as_object().unwrap();
        assert!(validate_mapping_depth(map, 3).is_ok());
        assert!(validate_mapping_depth(map, 2).is_err());
        assert!(validate_mapping_depth(&Map::new(), 0).is_ok());
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(max_depth(&json!(42)), 0);
        assert_eq!(max_depth(&json!({})), 0);
        assert_eq!(max_depth(&json!({"a": 1})), 1);
        assert_eq!(max_depth(&json!({"a": {"b": {"c": 1}}})), 3);
        assert_eq!(max_depth(&json!([{"a": [1, 2]}])), 3);
    }

    #[test]
    fn test_max_depth_at_limit() {
        let mut deep = json!({"level": 1});
        for _ in 0..(MAX_DOCUMENT_DEPTH - 1) {
            deep = json!({"nested": deep});
        }
        assert_eq!(max_depth(&deep), MAX_DOCUMENT_DEPTH);
        assert!(validate_depth(&deep, MAX_DOCUMENT_DEPTH).is_ok());
    }
}
