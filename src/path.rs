//! Path parsing for document transforms
//!
//! This module turns path strings like `spec.containers[name=app].image` or
//! `pods.[metadata.namespace=foo,metadata.name=bar].metadata.labels.app`
//! into typed [`PathSegment`]s.
//!
//! Parsing runs in two passes. The first pass splits the string into tokens
//! on `.` and `[...]` boundaries, honouring double quotes. The second pass
//! assigns each key its final kind by looking one token ahead: a key followed
//! by a selector is a [`PathSegment::Sequence`], a key followed by another key
//! is a [`PathSegment::Map`] and the last key is a [`PathSegment::Scalar`].

use crate::error::{Result, TransformError};

/// Represents a single segment in a document path
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PathSegment {
    /// Key whose value is another mapping
    Map(String),
    /// Final key, directly settable as a named field
    Scalar(String),
    /// Key whose value is a sequence; always followed by a selector
    Sequence(String),
    /// ANDed `key=value` conditions selecting one element of a sequence
    Filter(Vec<Condition>),
    /// Position of one element of a sequence
    Index(SequenceIndex),
}

impl PathSegment {
    /// The field name for key segments, `None` for selectors
    pub fn key(&self) -> Option<&str> {
        match self {
            PathSegment::Map(key) | PathSegment::Scalar(key) | PathSegment::Sequence(key) => {
                Some(key)
            }
            PathSegment::Filter(_) | PathSegment::Index(_) => None,
        }
    }

    pub fn is_selector(&self) -> bool {
        matches!(self, PathSegment::Filter(_) | PathSegment::Index(_))
    }

    /// A filter with several conditions or with a dotted condition key
    pub fn is_composite_filter(&self) -> bool {
        match self {
            PathSegment::Filter(conditions) => {
                conditions.len() > 1 || conditions.iter().any(Condition::is_nested)
            }
            _ => false,
        }
    }
}

/// One `key=value` condition of a filter segment
///
/// The key may be a dotted path into the element, stored as its components.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Condition {
    pub key: Vec<String>,
    pub value: String,
}

impl Condition {
    pub fn new(key: &str, value: &str) -> Self {
        Condition {
            key: vec![key.to_string()],
            value: value.to_string(),
        }
    }

    pub fn is_nested(&self) -> bool {
        self.key.len() > 1
    }

    pub fn key_path(&self) -> String {
        self.key.join(".")
    }
}

/// Element position selected by an index segment
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SequenceIndex {
    At(usize),
    /// `-`, the last existing element
    Last,
}

impl SequenceIndex {
    /// Resolve against a sequence of `len` elements, `None` when out of range
    pub fn resolve(self, len: usize) -> Option<usize> {
        match self {
            SequenceIndex::At(idx) if idx < len => Some(idx),
            SequenceIndex::Last if len > 0 => Some(len - 1),
            _ => None,
        }
    }
}

/// Raw token produced by the first pass
#[derive(Debug)]
enum Token {
    /// Unbracketed text; `quoted` when the whole token was a `"..."` literal
    Key { text: String, quoted: bool },
    /// Contents of a `[...]` selector
    Bracket(String),
}

/// Token after content classification, before lookahead
#[derive(Debug)]
enum Classified {
    Key(String),
    Filter(Vec<Condition>),
    Index(SequenceIndex),
}

/// Parse a path string into a sequence of path segments
///
/// # Supported Syntax
/// - Dot notation: `a.b.c` → nested mappings, `c` is the settable field
/// - Filters: `items[name=web]`, `items.[a.b=1,c=2]` → sequence element match
/// - Indices: `items[0]`, `items.[-]` → sequence element by position
/// - Literal keys: `"app.kubernetes.io/name"` → never split or re-parsed
/// - Root: `""` or `"."` → no segments
///
/// # Examples
/// ```
/// use doc_transform::path::{parse_path, Condition, PathSegment};
///
/// assert_eq!(
///     parse_path("foo.subset[uuid=123].test").unwrap(),
///     vec![
///         PathSegment::Map("foo".into()),
///         PathSegment::Sequence("subset".into()),
///         PathSegment::Filter(vec![Condition::new("uuid", "123")]),
///         PathSegment::Scalar("test".into()),
///     ]
/// );
///
/// assert!(parse_path(".").unwrap().is_empty());
/// ```
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let tokens = tokenize(path)?;
    let classified = tokens
        .into_iter()
        .map(|token| classify(token, path))
        .collect::<Result<Vec<_>>>()?;
    assign_kinds(classified, path)
}

fn tokenize(path: &str) -> Result<Vec<Token>> {
    let body = path.strip_prefix('.').unwrap_or(path);
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Set after `]` or a quoted literal: only `.`, `[` or the end may follow
    let mut closed = false;
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !closed {
                    if current.is_empty() {
                        return Err(TransformError::malformed_path(path, "empty path segment"));
                    }
                    tokens.push(Token::Key {
                        text: std::mem::take(&mut current),
                        quoted: false,
                    });
                }
                closed = false;
                if chars.peek().is_none() {
                    return Err(TransformError::malformed_path(path, "trailing '.'"));
                }
            }
            '[' => {
                if !current.is_empty() {
                    tokens.push(Token::Key {
                        text: std::mem::take(&mut current),
                        quoted: false,
                    });
                }
                let mut content = String::new();
                let mut in_quotes = false;
                let mut terminated = false;
                for c in chars.by_ref() {
                    match c {
                        '"' => {
                            in_quotes = !in_quotes;
                            content.push(c);
                        }
                        ']' if !in_quotes => {
                            terminated = true;
                            break;
                        }
                        '[' if !in_quotes => {
                            return Err(TransformError::malformed_path(
                                path,
                                "nested '[' in selector",
                            ));
                        }
                        _ => content.push(c),
                    }
                }
                if !terminated {
                    return Err(TransformError::malformed_path(path, "unmatched '['"));
                }
                if content.trim().is_empty() {
                    return Err(TransformError::malformed_path(path, "empty selector"));
                }
                tokens.push(Token::Bracket(content));
                closed = true;
            }
            ']' => {
                return Err(TransformError::malformed_path(path, "unexpected ']'"));
            }
            '"' => {
                if closed {
                    return Err(TransformError::malformed_path(
                        path,
                        "expected '.' or '[' after closing quote or bracket",
                    ));
                }
                let literal = read_quoted(&mut chars)
                    .ok_or_else(|| TransformError::malformed_path(path, "unmatched '\"'"))?;
                if current.is_empty() {
                    tokens.push(Token::Key {
                        text: literal,
                        quoted: true,
                    });
                    closed = true;
                } else {
                    // quoted substring inside an unbracketed token, e.g. `name="a.b"`
                    current.push('"');
                    current.push_str(&literal);
                    current.push('"');
                }
            }
            _ => {
                if closed {
                    return Err(TransformError::malformed_path(
                        path,
                        "expected '.' or '[' after closing quote or bracket",
                    ));
                }
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(Token::Key {
            text: current,
            quoted: false,
        });
    }

    Ok(tokens)
}

/// Consume characters up to the closing quote, `None` if it never comes
fn read_quoted(chars: &mut impl Iterator<Item = char>) -> Option<String> {
    let mut literal = String::new();
    for c in chars {
        if c == '"' {
            return Some(literal);
        }
        literal.push(c);
    }
    None
}

fn classify(token: Token, path: &str) -> Result<Classified> {
    match token {
        Token::Key { text, quoted: true } => Ok(Classified::Key(text)),
        Token::Key {
            text,
            quoted: false,
        } => {
            if find_unquoted(&text, '=').is_some() {
                return parse_conditions(&text, path).map(Classified::Filter);
            }
            if let Some(index) = parse_index(&text, path)? {
                return Ok(Classified::Index(index));
            }
            if text.contains('"') {
                return Err(TransformError::malformed_path(
                    path,
                    format!("unexpected quote in key '{text}'"),
                ));
            }
            Ok(Classified::Key(text))
        }
        Token::Bracket(content) => {
            if find_unquoted(&content, '=').is_some() {
                return parse_conditions(&content, path).map(Classified::Filter);
            }
            parse_index(content.trim(), path)?
                .map(Classified::Index)
                .ok_or_else(|| {
                    TransformError::malformed_path(
                        path,
                        format!("'[{content}]' is neither a filter nor an index"),
                    )
                })
        }
    }
}

fn parse_index(text: &str, path: &str) -> Result<Option<SequenceIndex>> {
    if text == "-" {
        return Ok(Some(SequenceIndex::Last));
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    text.parse::<usize>()
        .map(|idx| Some(SequenceIndex::At(idx)))
        .map_err(|_| TransformError::malformed_path(path, format!("invalid index: {text}")))
}

fn parse_conditions(text: &str, path: &str) -> Result<Vec<Condition>> {
    split_unquoted(text, ',')
        .into_iter()
        .map(|raw| {
            let eq = find_unquoted(raw, '=').ok_or_else(|| {
                TransformError::malformed_path(
                    path,
                    format!("filter condition '{}' has no '='", raw.trim()),
                )
            })?;
            let key = split_unquoted(raw[..eq].trim(), '.')
                .into_iter()
                .map(|component| unquote(component.trim()).to_string())
                .collect::<Vec<_>>();
            if key.iter().any(String::is_empty) {
                return Err(TransformError::malformed_path(
                    path,
                    format!("filter condition '{}' has an empty key", raw.trim()),
                ));
            }
            Ok(Condition {
                key,
                value: unquote(raw[eq + 1..].trim()).to_string(),
            })
        })
        .collect()
}

fn assign_kinds(classified: Vec<Classified>, path: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::with_capacity(classified.len());
    let mut window = classified.into_iter().peekable();
    let mut prev_was_key = false;

    while let Some(current) = window.next() {
        let next = window.peek();
        let segment = match current {
            Classified::Key(key) => match next {
                Some(Classified::Filter(_) | Classified::Index(_)) => PathSegment::Sequence(key),
                Some(Classified::Key(_)) => PathSegment::Map(key),
                None => PathSegment::Scalar(key),
            },
            Classified::Filter(conditions) => {
                if !prev_was_key {
                    return Err(TransformError::malformed_path(
                        path,
                        "filter must follow a sequence key",
                    ));
                }
                PathSegment::Filter(conditions)
            }
            Classified::Index(index) => {
                if !prev_was_key {
                    return Err(TransformError::malformed_path(
                        path,
                        "index must follow a sequence key",
                    ));
                }
                PathSegment::Index(index)
            }
        };
        prev_was_key = !segment.is_selector();
        segments.push(segment);
    }

    Ok(segments)
}

/// Byte offset of the first `needle` outside double quotes
fn find_unquoted(text: &str, needle: char) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == needle && !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

fn split_unquoted(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(idx) = find_unquoted(rest, sep) {
        parts.push(&rest[..idx]);
        rest = &rest[idx + sep.len_utf8()..];
    }
    parts.push(rest);
    parts
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
