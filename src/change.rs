// doc_transform - Change Descriptors Module
//
// Serializable form of a single transform request, so that patch files can
// drive a session.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::DocumentFormat;
use crate::error::{Result, TransformError};

/// The three mutation primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Union mappings, append sequences, overwrite scalars
    Add,
    /// Deep merge where the new value wins; sequences are replaced
    Update,
    /// Remove a named field
    Delete,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChangeKind::Add => "add",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A single change: where, what kind, and with which value
///
/// `value` sets a named field to a string scalar; `values` is a mapping merged
/// into the node at `path`. Add and Update take exactly one of them, Delete
/// takes neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Map<String, Value>>,
}

impl Change {
    pub fn set(path: impl Into<String>, kind: ChangeKind, value: impl Into<String>) -> Self {
        Change {
            path: path.into(),
            kind,
            value: Some(value.into()),
            values: None,
        }
    }

    pub fn merge(path: impl Into<String>, kind: ChangeKind, values: Map<String, Value>) -> Self {
        Change {
            path: path.into(),
            kind,
            value: None,
            values: Some(values),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Change {
            path: path.into(),
            kind: ChangeKind::Delete,
            value: None,
            values: None,
        }
    }
}

/// Ordered list of changes, as found in a patch file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(pub Vec<Change>);

impl ChangeSet {
    /// Parse a JSON or YAML list of changes
    ///
    /// # Examples
    /// ```
    /// use doc_transform::change::{ChangeKind, ChangeSet};
    /// use doc_transform::document::DocumentFormat;
    ///
    /// let yaml = "- path: metadata.name\n  kind: update\n  value: renamed\n";
    /// let changes = ChangeSet::from_str_with(yaml, DocumentFormat::Yaml).unwrap();
    /// assert_eq!(changes.0[0].kind, ChangeKind::Update);
    /// ```
    pub fn from_str_with(input: &str, format: DocumentFormat) -> Result<Self> {
        let changes = match format {
            DocumentFormat::Json => serde_json::from_str(input)?,
            DocumentFormat::Yaml => serde_yaml::from_str(input)?,
        };
        Ok(changes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.0.iter()
    }
}

/// Value carried by an Add or Update, after checking exactly one was supplied
#[derive(Debug, Clone, Copy)]
pub(crate) enum ChangeValue<'a> {
    Scalar(&'a str),
    Subtree(&'a Map<String, Value>),
}

impl<'a> ChangeValue<'a> {
    pub(crate) fn from_parts(
        scalar: Option<&'a str>,
        subtree: Option<&'a Map<String, Value>>,
    ) -> Result<Self> {
        match (scalar, subtree) {
            (Some(value), None) => Ok(ChangeValue::Scalar(value)),
            (None, Some(values)) => Ok(ChangeValue::Subtree(values)),
            (Some(_), Some(_)) => Err(TransformError::invalid_operation(
                "both a scalar value and a subtree value were supplied",
            )),
            (None, None) => Err(TransformError::invalid_operation(
                "add and update need a scalar value or a subtree value",
            )),
        }
    }
}
