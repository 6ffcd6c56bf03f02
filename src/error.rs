// doc_transform - Error Types Module
//
// Every failure aborts the current transform and is returned to the caller.
// The only tolerated miss is deleting a field that does not exist.

use thiserror::Error;

/// Result type alias for transform operations
pub type Result<T> = std::result::Result<T, TransformError>;

/// Errors that can occur while parsing paths or transforming documents
#[derive(Debug, Error)]
pub enum TransformError {
    /// Unparseable segment, unmatched bracket or quote, empty segment
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// The path is well formed but cannot be used with the requested change
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A field, filter condition or index has no match in the document
    #[error("lookup failed: {0}")]
    LookupFailed(String),

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("document nesting too deep (max {max}, found >{max})")]
    DepthExceeded { max: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TransformError {
    pub fn malformed_path(path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn lookup_failed(msg: impl Into<String>) -> Self {
        Self::LookupFailed(msg.into())
    }

    pub fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { expected, found }
    }

    /// Check if this error was caused by the path or change itself rather than
    /// the document contents
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            TransformError::MalformedPath { .. } | TransformError::InvalidOperation(_)
        )
    }
}
