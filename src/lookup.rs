//! Lookup chain construction and navigation
//!
//! [`build_lookups`] turns parsed segments into a chain of [`LookupStep`]s.
//! Filters are resolved eagerly against the document snapshot the chain is
//! built from: each filter becomes the concrete position of the first element
//! satisfying all of its conditions. The chain is therefore only valid for
//! that snapshot.

use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::error::{Result, TransformError};
use crate::path::{parse_path, Condition, PathSegment};
use crate::value_type_name;

/// One navigation step from a node to one of its children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStep {
    /// Child of a mapping by key
    Field(String),
    /// Element of a sequence by position
    Element(usize),
    /// Trailing filter without a match; write-back appends a new element
    Append,
}

impl LookupStep {
    fn expects(&self) -> &'static str {
        match self {
            LookupStep::Field(_) => "mapping",
            LookupStep::Element(_) | LookupStep::Append => "sequence",
        }
    }
}

/// Node the lookup walk currently stands on
#[derive(Clone, Copy)]
enum Cursor<'a> {
    Root(&'a Map<String, Value>),
    Node(&'a Value),
    /// Below a field missing from the document
    Absent,
}

/// Build the lookup chain for `segments` against the document snapshot `doc`
///
/// `doc` must be a mapping unless `segments` is empty.
///
/// # Errors
/// * A sequence key that is absent from the document
/// * An index outside the sequence
/// * A non-final filter, or a composite filter, without a matching element
/// * A mapping or sequence expected where another kind of node was found
pub fn build_lookups(doc: &Value, segments: &[PathSegment]) -> Result<Vec<LookupStep>> {
    match doc {
        Value::Object(root) => build_root_lookups(root, segments),
        _ if segments.is_empty() => Ok(Vec::new()),
        other => Err(TransformError::type_mismatch(
            "mapping",
            value_type_name(other),
        )),
    }
}

/// [`build_lookups`] for a snapshot held as its root mapping
pub fn build_root_lookups(
    root: &Map<String, Value>,
    segments: &[PathSegment],
) -> Result<Vec<LookupStep>> {
    let mut steps = Vec::with_capacity(segments.len());
    let mut cursor = Cursor::Root(root);

    for (pos, segment) in segments.iter().enumerate() {
        match segment {
            PathSegment::Map(key) | PathSegment::Scalar(key) => {
                cursor = child_field(cursor, key)?;
                steps.push(LookupStep::Field(key.clone()));
            }
            PathSegment::Sequence(key) => {
                cursor = match child_field(cursor, key)? {
                    Cursor::Node(seq @ Value::Array(_)) => Cursor::Node(seq),
                    Cursor::Node(other) => {
                        return Err(TransformError::type_mismatch(
                            "sequence",
                            value_type_name(other),
                        ));
                    }
                    Cursor::Root(_) | Cursor::Absent => {
                        return Err(TransformError::lookup_failed(format!(
                            "sequence '{key}' not found"
                        )));
                    }
                };
                steps.push(LookupStep::Field(key.clone()));
            }
            PathSegment::Index(index) => {
                let items = sequence_at(cursor)?;
                let idx = index.resolve(items.len()).ok_or_else(|| {
                    TransformError::lookup_failed(format!(
                        "index {index:?} out of range for sequence of {} elements",
                        items.len()
                    ))
                })?;
                cursor = Cursor::Node(&items[idx]);
                steps.push(LookupStep::Element(idx));
            }
            PathSegment::Filter(conditions) => {
                let items = sequence_at(cursor)?;
                let is_last = pos + 1 == segments.len();
                match find_element(items, conditions) {
                    Some(idx) => {
                        cursor = Cursor::Node(&items[idx]);
                        steps.push(LookupStep::Element(idx));
                    }
                    None if is_last && !segment.is_composite_filter() => {
                        cursor = Cursor::Absent;
                        steps.push(LookupStep::Append);
                    }
                    None => {
                        return Err(TransformError::lookup_failed(format!(
                            "no matching element for filter [{}]",
                            describe_conditions(conditions)
                        )));
                    }
                }
            }
        }
    }

    trace!(?steps, "built lookup chain");
    Ok(steps)
}

/// Parse `path` and return the node it addresses in `doc`
///
/// Returns `Ok(None)` when the final field is absent.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use doc_transform::lookup::navigate_path;
///
/// let data = json!({"pods": [{"name": "a", "port": 80}, {"name": "b", "port": 81}]});
/// assert_eq!(navigate_path(&data, "pods[name=b].port").unwrap(), Some(&json!(81)));
/// assert_eq!(navigate_path(&data, "pods[0].image").unwrap(), None);
/// ```
pub fn navigate_path<'a>(doc: &'a Value, path: &str) -> Result<Option<&'a Value>> {
    let segments = parse_path(path)?;
    let steps = build_lookups(doc, &segments)?;
    locate(doc, &steps)
}

/// Follow `steps` from `doc`, `Ok(None)` when a field along the way is absent
pub fn locate<'a>(doc: &'a Value, steps: &[LookupStep]) -> Result<Option<&'a Value>> {
    let mut current = doc;
    for step in steps {
        current = match (step, current) {
            (LookupStep::Field(key), Value::Object(map)) => match map.get(key) {
                Some(child) => child,
                None => return Ok(None),
            },
            (LookupStep::Field(_), Value::Null) => return Ok(None),
            (LookupStep::Element(idx), Value::Array(items)) => {
                items.get(*idx).ok_or_else(|| out_of_range(*idx, items.len()))?
            }
            (LookupStep::Append, Value::Array(_)) => return Ok(None),
            (step, other) => {
                return Err(TransformError::type_mismatch(
                    step.expects(),
                    value_type_name(other),
                ));
            }
        };
    }
    Ok(Some(current))
}

/// [`locate`] starting from a root mapping
///
/// # Errors
/// An empty chain, which addresses the root mapping itself.
pub fn locate_in_root<'a>(
    root: &'a Map<String, Value>,
    steps: &[LookupStep],
) -> Result<Option<&'a Value>> {
    match steps.split_first() {
        Some((LookupStep::Field(key), rest)) => match root.get(key) {
            Some(child) => locate(child, rest),
            None => Ok(None),
        },
        Some((step, _)) => Err(TransformError::type_mismatch(step.expects(), "mapping")),
        None => Err(TransformError::invalid_operation(
            "an empty path addresses the root mapping, not a node",
        )),
    }
}

/// Mutable counterpart of [`locate`]; never creates anything
pub fn locate_mut<'a>(doc: &'a mut Value, steps: &[LookupStep]) -> Result<Option<&'a mut Value>> {
    let mut current = doc;
    for step in steps {
        current = match (step, current) {
            (LookupStep::Field(key), Value::Object(map)) => match map.get_mut(key) {
                Some(child) => child,
                None => return Ok(None),
            },
            (LookupStep::Field(_), Value::Null) => return Ok(None),
            (LookupStep::Element(idx), Value::Array(items)) => {
                let len = items.len();
                items.get_mut(*idx).ok_or_else(|| out_of_range(*idx, len))?
            }
            (LookupStep::Append, Value::Array(_)) => return Ok(None),
            (step, other) => {
                return Err(TransformError::type_mismatch(
                    step.expects(),
                    value_type_name(other),
                ));
            }
        };
    }
    Ok(Some(current))
}

/// Follow `steps` from `doc`, creating absent or null fields as empty mappings
pub(crate) fn ensure_mut<'a>(doc: &'a mut Value, steps: &[LookupStep]) -> Result<&'a mut Value> {
    let mut current = doc;
    for step in steps {
        if current.is_null() && matches!(step, LookupStep::Field(_)) {
            *current = Value::Object(Map::new());
        }
        current = match (step, current) {
            (LookupStep::Field(key), Value::Object(map)) => {
                map.entry(key.clone()).or_insert(Value::Null)
            }
            (LookupStep::Element(idx), Value::Array(items)) => {
                let len = items.len();
                items.get_mut(*idx).ok_or_else(|| out_of_range(*idx, len))?
            }
            (LookupStep::Append, _) => {
                return Err(TransformError::invalid_operation(
                    "cannot navigate through an unmatched filter",
                ));
            }
            (step, other) => {
                return Err(TransformError::type_mismatch(
                    step.expects(),
                    value_type_name(other),
                ));
            }
        };
    }
    Ok(current)
}

/// Position of the first element satisfying every condition
pub fn find_element(items: &[Value], conditions: &[Condition]) -> Option<usize> {
    items
        .iter()
        .position(|elem| conditions.iter().all(|cond| condition_matches(elem, cond)))
}

/// Check one condition against a sequence element, descending through a
/// dotted key
pub fn condition_matches(elem: &Value, condition: &Condition) -> bool {
    let mut node = elem;
    for component in &condition.key {
        match node.as_object().and_then(|map| map.get(component)) {
            Some(child) => node = child,
            None => return false,
        }
    }
    scalar_matches(node, &condition.value)
}

/// Native scalar equality between a document scalar and a literal
///
/// Integers compare exactly. Other numbers match their textual form as well
/// as any literal parsing to the same float, so `123` matches `"123"` and
/// `1.50` matches `1.5`.
pub fn scalar_matches(value: &Value, literal: &str) -> bool {
    match value {
        Value::String(s) => s == literal,
        Value::Number(n) => n.to_string() == literal || number_matches(n, literal),
        Value::Bool(b) => literal == if *b { "true" } else { "false" },
        Value::Null => literal == "null" || literal == "~",
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn number_matches(n: &Number, literal: &str) -> bool {
    if n.is_f64() {
        return literal.parse::<f64>().is_ok_and(|lit| n.as_f64() == Some(lit));
    }
    // integers compare exactly, floats lose precision past 2^53
    if let Ok(lit) = literal.parse::<i64>() {
        return n.as_i64() == Some(lit);
    }
    if let Ok(lit) = literal.parse::<u64>() {
        return n.as_u64() == Some(lit);
    }
    literal.parse::<f64>().is_ok_and(|lit| n.as_f64() == Some(lit))
}

fn child_field<'a>(cursor: Cursor<'a>, key: &str) -> Result<Cursor<'a>> {
    let map = match cursor {
        Cursor::Root(map) | Cursor::Node(Value::Object(map)) => map,
        Cursor::Absent | Cursor::Node(Value::Null) => return Ok(Cursor::Absent),
        Cursor::Node(other) => {
            return Err(TransformError::type_mismatch(
                "mapping",
                value_type_name(other),
            ));
        }
    };
    Ok(map.get(key).map_or(Cursor::Absent, Cursor::Node))
}

fn sequence_at(cursor: Cursor<'_>) -> Result<&[Value]> {
    match cursor {
        Cursor::Node(Value::Array(items)) => Ok(items),
        Cursor::Node(other) => Err(TransformError::type_mismatch(
            "sequence",
            value_type_name(other),
        )),
        Cursor::Root(_) => Err(TransformError::type_mismatch("sequence", "mapping")),
        Cursor::Absent => Err(TransformError::lookup_failed("sequence not found")),
    }
}

fn out_of_range(idx: usize, len: usize) -> TransformError {
    TransformError::lookup_failed(format!(
        "index {idx} out of range for sequence of {len} elements"
    ))
}

pub(crate) fn describe_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(|cond| format!("{}={}", cond.key_path(), cond.value))
        .collect::<Vec<_>>()
        .join(",")
}
