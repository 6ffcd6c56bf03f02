// doc_transform - Write-Back Module
//
// Reinserts a mutated subtree at the location a lookup chain identified,
// leaving sibling keys and elements untouched.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{Result, TransformError};
use crate::lookup::{ensure_mut, find_element, LookupStep};
use crate::path::PathSegment;
use crate::resolve::ResolvedPath;
use crate::value_type_name;

/// Set `node` at the location described by `resolved` and its lookup `steps`
///
/// # Terminal cases
/// - Root path: `node` replaces the whole document
/// - Named field: the field is set on the parent reached by the chain minus
///   its last step; missing intermediate mappings are created
/// - Filter: the first element matching the condition is replaced, or `node`
///   is appended when nothing matches
/// - Index: the element at that position (`-` is the last one) is replaced
///
/// # Errors
/// * A filter with several conditions or a dotted key as the final segment
/// * An index outside the sequence
/// * A mapping or sequence expected where another kind of node was found
pub fn set_at_path(
    doc: &mut Value,
    resolved: &ResolvedPath,
    steps: &[LookupStep],
    node: Value,
) -> Result<()> {
    if steps.len() != resolved.segments.len() {
        return Err(TransformError::invalid_operation(format!(
            "lookup chain of {} steps does not match path of {} segments",
            steps.len(),
            resolved.segments.len()
        )));
    }

    let Some(last) = resolved.last_segment() else {
        trace!("replacing document root");
        *doc = node;
        return Ok(());
    };

    if let Some(field) = resolved.terminal_field() {
        trace!(field, "writing named field");
        let parent = ensure_mut(doc, &steps[..steps.len() - 1])?;
        return set_field(parent, field, node);
    }

    match last {
        PathSegment::Filter(conditions) => {
            if last.is_composite_filter() {
                return Err(TransformError::invalid_operation(
                    "composite filters not supported in final path segment",
                ));
            }
            let items = match ensure_mut(doc, &steps[..steps.len() - 1])? {
                Value::Array(items) => items,
                other => {
                    return Err(TransformError::type_mismatch(
                        "sequence",
                        value_type_name(other),
                    ));
                }
            };
            match find_element(items, conditions) {
                Some(idx) => {
                    trace!(idx, "replacing filtered element");
                    items[idx] = node;
                }
                None => {
                    trace!("no element matched, appending");
                    items.push(node);
                }
            }
            Ok(())
        }
        PathSegment::Index(index) => {
            // the step before the index names the sequence on its parent
            let Some(LookupStep::Field(name)) = steps.len().checked_sub(2).and_then(|i| steps.get(i))
            else {
                return Err(TransformError::invalid_operation(
                    "index segment must follow a sequence field",
                ));
            };
            let parent = ensure_mut(doc, &steps[..steps.len() - 2])?;
            let Some(Value::Array(items)) = parent.as_object_mut().and_then(|map| map.get_mut(name))
            else {
                return Err(TransformError::lookup_failed(format!(
                    "sequence '{name}' not found"
                )));
            };
            let pos = index.resolve(items.len()).ok_or_else(|| {
                TransformError::lookup_failed(format!(
                    "index {index:?} out of range for sequence '{name}' of {} elements",
                    items.len()
                ))
            })?;
            trace!(pos, sequence = %name, "replacing indexed element");
            items[pos] = node;
            Ok(())
        }
        other => Err(TransformError::invalid_operation(format!(
            "cannot write to non-terminal segment {other:?}"
        ))),
    }
}

/// Set `field` on a mapping, keeping its position if it already exists
pub(crate) fn set_field(parent: &mut Value, field: &str, node: Value) -> Result<()> {
    if parent.is_null() {
        *parent = Value::Object(Map::new());
    }
    match parent {
        Value::Object(map) => {
            map.insert(field.to_string(), node);
            Ok(())
        }
        other => Err(TransformError::type_mismatch(
            "mapping",
            value_type_name(other),
        )),
    }
}
