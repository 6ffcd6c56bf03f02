//! Transform sessions
//!
//! A [`TransformSession`] owns one working document and applies changes to it
//! one at a time. Every change runs against a private copy of the committed
//! document; the copy replaces the committed document only when the whole
//! change succeeded, so a failed change never leaves a partial mutation
//! behind.
//!
//! Sessions are plain values with `&mut self` mutation: share nothing, and
//! create one session per document when validating many documents at once.

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::change::{Change, ChangeKind, ChangeValue};
use crate::config::TransformConfig;
use crate::depth::{validate_depth, validate_mapping_depth};
use crate::error::{Result, TransformError};
use crate::lookup::{build_root_lookups, ensure_mut, locate, locate_in_root, locate_mut};
use crate::merge::{add_merge, delete_field, update_merge};
use crate::path::parse_path;
use crate::resolve::resolve_path;
use crate::value_type_name;
use crate::write_back::{set_at_path, set_field};

/// Stateful owner of a document being transformed
#[derive(Debug, Clone)]
pub struct TransformSession {
    root: Map<String, Value>,
    config: TransformConfig,
    applied: usize,
}

/// Create a session over `initial` with the default configuration
pub fn create_transform_target(initial: Map<String, Value>) -> TransformSession {
    TransformSession::new(initial)
}

impl TransformSession {
    /// Create a session with the default configuration
    ///
    /// The initial document is taken as is; use [`TransformSession::with_config`]
    /// to check its depth.
    pub fn new(initial: Map<String, Value>) -> Self {
        TransformSession {
            root: initial,
            config: TransformConfig::default(),
            applied: 0,
        }
    }

    /// Create a session with explicit limits, validating the initial document
    pub fn with_config(initial: Map<String, Value>, config: TransformConfig) -> Result<Self> {
        validate_mapping_depth(&initial, config.max_depth)?;
        Ok(TransformSession {
            root: initial,
            config,
            applied: 0,
        })
    }

    /// The committed document
    pub fn document(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_document(self) -> Map<String, Value> {
        self.root
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Number of transforms committed so far
    pub fn changes_applied(&self) -> usize {
        self.applied
    }

    /// Apply one change at `path` and return the whole updated document
    ///
    /// Add and Update take exactly one of `scalar` (sets the named field at
    /// the end of `path` to a string) or `subtree` (merged into the node at
    /// `path`). Delete takes neither and removes the named field.
    ///
    /// On error the committed document is left as it was.
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use doc_transform::change::ChangeKind;
    /// use doc_transform::session::TransformSession;
    ///
    /// let doc = json!({"foo": {"subset": [
    ///     {"uuid": 321, "test": "A"},
    ///     {"uuid": 123, "test": "B"}
    /// ]}});
    /// let mut session = TransformSession::new(doc.as_object().unwrap().clone());
    /// let updated = session
    ///     .execute_transform("foo.subset.[uuid=123].test", ChangeKind::Update, Some("C"), None)
    ///     .unwrap();
    /// assert_eq!(updated["foo"]["subset"][1]["test"], "C");
    /// assert_eq!(updated["foo"]["subset"][0]["test"], "A");
    /// ```
    pub fn execute_transform(
        &mut self,
        path: &str,
        kind: ChangeKind,
        scalar: Option<&str>,
        subtree: Option<&Map<String, Value>>,
    ) -> Result<&Map<String, Value>> {
        debug!(path, %kind, "executing transform");
        match self.transformed(path, kind, scalar, subtree) {
            Ok(root) => {
                self.root = root;
                self.applied += 1;
                Ok(&self.root)
            }
            Err(err) => {
                warn!(path, %kind, error = %err, "transform rejected");
                Err(err)
            }
        }
    }

    /// Apply a [`Change`] descriptor
    pub fn apply(&mut self, change: &Change) -> Result<&Map<String, Value>> {
        self.execute_transform(
            &change.path,
            change.kind,
            change.value.as_deref(),
            change.values.as_ref(),
        )
    }

    /// Apply changes in order, stopping at the first failure
    ///
    /// Changes before the failing one stay committed.
    pub fn apply_all<'c>(
        &mut self,
        changes: impl IntoIterator<Item = &'c Change>,
    ) -> Result<&Map<String, Value>> {
        for change in changes {
            self.apply(change)?;
        }
        Ok(&self.root)
    }

    /// Look up the node at `path` without changing anything
    ///
    /// Returns `Ok(None)` when the final field is absent. The root itself is
    /// read through [`TransformSession::document`]; an empty path is an
    /// invalid operation here.
    pub fn query(&self, path: &str) -> Result<Option<&Value>> {
        let segments = parse_path(path)?;
        let steps = build_root_lookups(&self.root, &segments)?;
        locate_in_root(&self.root, &steps)
    }

    /// Run one change against a copy of the committed document
    fn transformed(
        &self,
        path: &str,
        kind: ChangeKind,
        scalar: Option<&str>,
        subtree: Option<&Map<String, Value>>,
    ) -> Result<Map<String, Value>> {
        let resolved = resolve_path(parse_path(path)?, kind)?;
        // the working copy starts equal to the committed root
        let steps = build_root_lookups(&self.root, &resolved.segments)?;
        let mut working = Value::Object(self.root.clone());

        match kind {
            ChangeKind::Delete => {
                let field = resolved.terminal_field().ok_or_else(|| {
                    TransformError::invalid_operation("delete needs a named field")
                })?;
                match locate_mut(&mut working, &steps[..steps.len() - 1])? {
                    Some(parent) => {
                        let removed = delete_field(parent, field)?;
                        trace!(field, removed, "deleted field");
                    }
                    None => trace!(field, "parent absent, nothing to delete"),
                }
            }
            ChangeKind::Add | ChangeKind::Update => match ChangeValue::from_parts(scalar, subtree)? {
                ChangeValue::Scalar(value) => {
                    if steps.is_empty() {
                        return Err(TransformError::invalid_operation(
                            "cannot set a scalar value at the document root",
                        ));
                    }
                    let field = resolved.terminal_field().ok_or_else(|| {
                        TransformError::invalid_operation(
                            "cannot set a scalar value on a sequence element path",
                        )
                    })?;
                    let parent = ensure_mut(&mut working, &steps[..steps.len() - 1])?;
                    set_field(parent, field, Value::String(value.to_string()))?;
                }
                ChangeValue::Subtree(values) => {
                    let source = Value::Object(values.clone());
                    if self.config.validate_input {
                        validate_depth(&source, self.config.max_depth)?;
                    }
                    let current = locate(&working, &steps)?.cloned().unwrap_or(Value::Null);
                    let merged = if kind == ChangeKind::Add {
                        add_merge(current, source)?
                    } else {
                        update_merge(current, source)
                    };
                    set_at_path(&mut working, &resolved, &steps, merged)?;
                }
            },
        }

        match working {
            Value::Object(root) => Ok(root),
            other => Err(TransformError::type_mismatch(
                "mapping",
                value_type_name(&other),
            )),
        }
    }
}
