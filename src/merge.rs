// doc_transform - Merge Operations Module
//
// The three mutation primitives applied to a located subtree: additive merge,
// replacing deep merge, and field deletion.

use serde_json::map::Entry;
use serde_json::Value;

use crate::error::{Result, TransformError};
use crate::value_type_name;

/// Additively merge `source` into `target`
///
/// - Mappings: keys missing from `target` are inserted, shared keys are merged
///   recursively
/// - Sequences: `source` elements are appended after `target` elements, so
///   repeating the same Add grows the sequence again
/// - Scalars: `source` overwrites `target`
///
/// An absent (null) target adopts `source` as is.
///
/// # Errors
/// A mapping or sequence `source` meeting a `target` of another kind.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use doc_transform::merge::add_merge;
///
/// let merged = add_merge(
///     json!({"k1": "v1", "k3": ["v3", "v4"]}),
///     json!({"k3": ["v5"], "k4": "v5"}),
/// ).unwrap();
/// assert_eq!(merged, json!({"k1": "v1", "k3": ["v3", "v4", "v5"], "k4": "v5"}));
/// ```
pub fn add_merge(target: Value, source: Value) -> Result<Value> {
    match (target, source) {
        (Value::Null, source) => Ok(source),
        (Value::Object(mut target_obj), Value::Object(source_obj)) => {
            for (key, source_value) in source_obj {
                match target_obj.entry(key) {
                    Entry::Occupied(mut e) => {
                        let target_value = e.get_mut();
                        *target_value = add_merge(std::mem::take(target_value), source_value)?;
                    }
                    Entry::Vacant(e) => {
                        e.insert(source_value);
                    }
                }
            }
            Ok(Value::Object(target_obj))
        }
        (Value::Array(mut target_items), Value::Array(source_items)) => {
            target_items.extend(source_items);
            Ok(Value::Array(target_items))
        }
        (target, source @ (Value::Object(_) | Value::Array(_))) => Err(
            TransformError::type_mismatch(value_type_name(&source), value_type_name(&target)),
        ),
        // Scalar source overwrites whatever was there
        (_, source) => Ok(source),
    }
}

/// Deep merge `source` into `target`, `source` winning on conflicts
///
/// Mappings merge recursively and keep keys only present in `target`.
/// Sequences and scalars in `source` replace the target value, which makes
/// applying the same update twice equivalent to applying it once.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use doc_transform::merge::update_merge;
///
/// let merged = update_merge(
///     json!({"user": {"name": "Alice", "roles": ["a", "b"]}}),
///     json!({"user": {"roles": ["c"]}}),
/// );
/// assert_eq!(merged, json!({"user": {"name": "Alice", "roles": ["c"]}}));
/// ```
pub fn update_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_obj), Value::Object(source_obj)) => {
            for (key, source_value) in source_obj {
                match target_obj.entry(key) {
                    Entry::Occupied(mut e) => {
                        let target_value = e.get_mut();
                        if target_value.is_object() && source_value.is_object() {
                            // Recursively merge, taking ownership to avoid clone
                            *target_value =
                                update_merge(std::mem::take(target_value), source_value);
                        } else {
                            *target_value = source_value;
                        }
                    }
                    Entry::Vacant(e) => {
                        e.insert(source_value);
                    }
                }
            }
            Value::Object(target_obj)
        }
        // If not both objects, source wins (replaces target)
        (_, source) => source,
    }
}

/// Remove `field` from the mapping `parent`, keeping the order of the
/// remaining keys
///
/// Returns whether the field existed. Removing an absent field, or a field of
/// an absent (null) parent, is a no-op.
///
/// # Errors
/// `parent` is neither a mapping nor null.
pub fn delete_field(parent: &mut Value, field: &str) -> Result<bool> {
    match parent {
        Value::Object(map) => Ok(map.shift_remove(field).is_some()),
        Value::Null => Ok(false),
        other => Err(TransformError::type_mismatch(
            "mapping",
            value_type_name(other),
        )),
    }
}
