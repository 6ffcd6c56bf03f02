//! Loading and rendering documents
//!
//! Thin adapters between raw JSON or YAML text and the mapping root a
//! [`TransformSession`](crate::session::TransformSession) works on. Field order
//! is preserved in both directions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TransformError};
use crate::value_type_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension (`json`, `yaml` or `yml`)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// Parse JSON or YAML text into a document root
///
/// # Errors
/// * The input is not valid for `format`
/// * The root node is not a mapping
///
/// # Examples
/// ```
/// use doc_transform::document::{load_document, DocumentFormat};
///
/// let doc = load_document("kind: Pod\nmetadata:\n  name: web\n", DocumentFormat::Yaml).unwrap();
/// assert_eq!(doc["metadata"]["name"], "web");
/// ```
pub fn load_document(input: &str, format: DocumentFormat) -> Result<Map<String, Value>> {
    let value: Value = match format {
        DocumentFormat::Json => serde_json::from_str(input)?,
        DocumentFormat::Yaml => serde_yaml::from_str(input)?,
    };
    match value {
        Value::Object(map) => Ok(map),
        // `~` or `null` documents
        Value::Null => Ok(Map::new()),
        other => Err(TransformError::type_mismatch(
            "mapping",
            value_type_name(&other),
        )),
    }
}

/// Render a document root as pretty-printed JSON or YAML
pub fn render_document(doc: &Map<String, Value>, format: DocumentFormat) -> Result<String> {
    let rendered = match format {
        DocumentFormat::Json => serde_json::to_string_pretty(doc)?,
        DocumentFormat::Yaml => serde_yaml::to_string(doc)?,
    };
    Ok(rendered)
}
