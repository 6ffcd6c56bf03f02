// doc_transform - Path Resolver Module
//
// Validates a parsed path against the requested change kind and finds the
// segment, if any, that names a directly settable field.

use crate::change::ChangeKind;
use crate::error::{Result, TransformError};
use crate::path::PathSegment;

/// A path checked for one kind of change
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    pub segments: Vec<PathSegment>,
    /// Index of the final segment when it is a named field, `None` when the
    /// path is the root or ends in a filter or index
    pub terminal: Option<usize>,
}

impl ResolvedPath {
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name of the terminal field, if the path ends in one
    pub fn terminal_field(&self) -> Option<&str> {
        self.terminal
            .and_then(|idx| self.segments.get(idx))
            .and_then(PathSegment::key)
    }

    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

/// Resolve parsed segments for the given change kind
///
/// # Errors
/// * Delete on the root path
/// * Delete on a path ending in a filter or index
/// * Add or Update on a path ending in a filter with several conditions or
///   a dotted condition key
pub fn resolve_path(segments: Vec<PathSegment>, kind: ChangeKind) -> Result<ResolvedPath> {
    let last = segments.len().checked_sub(1);
    let terminal = match (kind, segments.last()) {
        (ChangeKind::Add | ChangeKind::Update, Some(PathSegment::Scalar(_))) => last,
        (ChangeKind::Add | ChangeKind::Update, Some(segment))
            if segment.is_composite_filter() =>
        {
            return Err(TransformError::invalid_operation(
                "composite filters not supported in final path segment",
            ));
        }
        (ChangeKind::Add | ChangeKind::Update, _) => None,
        (ChangeKind::Delete, None) => {
            return Err(TransformError::invalid_operation("cannot delete the root"));
        }
        (ChangeKind::Delete, Some(PathSegment::Scalar(_))) => last,
        (ChangeKind::Delete, Some(PathSegment::Filter(_) | PathSegment::Index(_))) => {
            return Err(TransformError::invalid_operation(
                "cannot delete a sequence element",
            ));
        }
        (ChangeKind::Delete, Some(other)) => {
            return Err(TransformError::invalid_operation(format!(
                "cannot delete through non-terminal segment {other:?}"
            )));
        }
    };

    Ok(ResolvedPath { segments, terminal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse_path;

    fn resolve(path: &str, kind: ChangeKind) -> Result<ResolvedPath> {
        resolve_path(parse_path(path).unwrap(), kind)
    }

    #[test]
    fn test_update_scalar_terminal() {
        let resolved = resolve("a.b.c", ChangeKind::Update).unwrap();
        assert_eq!(resolved.terminal, Some(2));
        assert_eq!(resolved.terminal_field(), Some("c"));
    }

    #[test]
    fn test_add_selector_terminal() {
        let resolved = resolve("items[name=web]", ChangeKind::Add).unwrap();
        assert_eq!(resolved.terminal, None);
        assert!(resolved.last_segment().unwrap().is_selector());
    }

    #[test]
    fn test_add_root() {
        let resolved = resolve("", ChangeKind::Add).unwrap();
        assert!(resolved.is_root());
        assert_eq!(resolved.terminal, None);
    }

    #[test]
    fn test_delete_field() {
        let resolved = resolve("metadata.labels.app", ChangeKind::Delete).unwrap();
        assert_eq!(resolved.terminal, Some(2));
    }

    #[test]
    fn test_delete_root_rejected() {
        let err = resolve("", ChangeKind::Delete).unwrap_err();
        assert!(err.to_string().contains("cannot delete the root"));
        assert!(resolve(".", ChangeKind::Delete).is_err());
    }

    #[test]
    fn test_delete_sequence_element_rejected() {
        for path in ["items[0]", "items.[-]", "items[name=web]"] {
            let err = resolve(path, ChangeKind::Delete).unwrap_err();
            assert!(err.to_string().contains("cannot delete a sequence element"));
        }
    }

    #[test]
    fn test_final_composite_filter_rejected() {
        for path in ["items[a=1,b=2]", "pods.[metadata.name=web]"] {
            for kind in [ChangeKind::Add, ChangeKind::Update] {
                let err = resolve(path, kind).unwrap_err();
                assert!(err.is_path_error());
                assert!(err.to_string().contains("composite filters"));
            }
        }
        assert!(resolve("items[a=1,b=2].name", ChangeKind::Update).is_ok());
    }
}
