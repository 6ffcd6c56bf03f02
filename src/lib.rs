// doc_transform - Document Transform Engine
//
// Path-addressable query and mutation of parsed YAML/JSON documents, used to
// synthesize resource mutations for validation fixtures and to graft
// composed content back into documents.

//! Path-addressable query and mutation of parsed YAML/JSON documents.
//!
//! A change is applied in five steps, each in its own module:
//!
//! 1. [`path`] parses the path string into typed segments
//! 2. [`resolve`] checks the path against the change kind
//! 3. [`lookup`] turns the segments into a navigation chain for the current
//!    document, resolving sequence filters to concrete positions
//! 4. [`merge`] applies Add, Update or Delete to the located subtree
//! 5. [`write_back`] puts the mutated subtree back into the document
//!
//! [`session::TransformSession`] composes these and owns the document.
//!
//! # Examples
//! ```
//! use doc_transform::{load_document, ChangeKind, DocumentFormat, TransformSession};
//!
//! let doc = load_document(
//!     "pods:\n  - name: web\n    image: nginx:1.0\n  - name: db\n    image: pg:15\n",
//!     DocumentFormat::Yaml,
//! )
//! .unwrap();
//! let mut session = TransformSession::new(doc);
//! session
//!     .execute_transform("pods[name=web].image", ChangeKind::Update, Some("nginx:1.1"), None)
//!     .unwrap();
//! assert_eq!(session.document()["pods"][0]["image"], "nginx:1.1");
//! assert_eq!(session.document()["pods"][1]["image"], "pg:15");
//! ```

use serde_json::Value;

pub mod change;
pub mod config;
pub mod depth;
pub mod document;
pub mod error;
pub mod lookup;
pub mod merge;
pub mod path;
pub mod resolve;
pub mod session;
pub mod write_back;

mod property_tests;

pub use change::{Change, ChangeKind, ChangeSet};
pub use config::TransformConfig;
pub use depth::{validate_depth, validate_mapping_depth, MAX_DOCUMENT_DEPTH};
pub use document::{load_document, render_document, DocumentFormat};
pub use error::{Result, TransformError};
pub use path::{parse_path, Condition, PathSegment, SequenceIndex};
pub use session::{create_transform_target, TransformSession};

/// Helper function to get human-readable type name for error messages
pub(crate) const fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
