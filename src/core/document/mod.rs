//! Structured documents.
//!
//! A parsed document stream is a list of [`Node`] trees, independent of the
//! concrete syntax. The YAML binding lives in [`yaml`]; traversal in
//! [`walk`]. Values are re-injected by [`Location`] and the stream is
//! rendered back with the original formatting wherever possible.

use std::fmt;

use tracing::debug;

use crate::error::DocumentError;

mod walk;
mod yaml;

pub use walk::Walk;

/// One node of a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A leaf value.
    Scalar(Scalar),
    /// Ordered key/value pairs.
    Mapping(Vec<(Node, Node)>),
    /// Ordered items.
    Sequence(Vec<Node>),
}

impl Node {
    /// Short label used when this node is a mapping key.
    pub fn label(&self) -> String {
        match self {
            Self::Scalar(scalar) => scalar.value.to_string(),
            Self::Mapping(_) => "{...}".to_string(),
            Self::Sequence(_) => "[...]".to_string(),
        }
    }
}

/// A leaf value with its optional tag (`vault` for `!vault`).
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub tag: Option<String>,
    pub value: ScalarValue,
}

impl Scalar {
    /// Untagged scalar.
    pub fn plain(value: ScalarValue) -> Self {
        Self { tag: None, value }
    }

    /// The string content, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Scalar payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    /// Numbers keep their textual form.
    Number(String),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("~"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => f.write_str(n),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// One step of a [`Location`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// The value of the `index`-th mapping entry; `key` is for display only.
    Entry { index: usize, key: String },
    /// The `index`-th sequence item.
    Item(usize),
}

/// Position of a scalar within a document stream.
///
/// Navigation is purely positional, so re-injection is unambiguous even for
/// duplicate or non-string keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    document: usize,
    path: Vec<Segment>,
}

impl Location {
    /// The root node of the `document`-th document.
    pub fn root(document: usize) -> Self {
        Self {
            document,
            path: Vec::new(),
        }
    }

    /// A location one step below this one.
    pub fn child(&self, segment: Segment) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(segment);
        Self {
            document: self.document,
            path,
        }
    }

    /// Steps from the document root.
    pub fn segments(&self) -> &[Segment] {
        &self.path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.document > 0 {
            write!(f, "[doc {}] ", self.document + 1)?;
        }
        if self.path.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                Segment::Entry { key, .. } if i == 0 => write!(f, "{}", key)?,
                Segment::Entry { key, .. } => write!(f, ".{}", key)?,
                Segment::Item(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A parsed document stream plus the text it came from.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    documents: Vec<Node>,
    /// Replaced string values, in the order they were set.
    edits: Vec<Edit>,
}

#[derive(Debug, Clone)]
struct Edit {
    /// First location the value was set at.
    location: Location,
    old: String,
    new: String,
}

impl Document {
    /// Parse a (possibly multi-document) YAML stream.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotText` for non UTF-8 input and
    /// `DocumentError::Parse` for invalid syntax.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let source = std::str::from_utf8(bytes).map_err(|_| DocumentError::NotText)?;
        let documents = yaml::parse(source)?;
        debug!(documents = documents.len(), "parsed document stream");
        Ok(Self {
            source: source.to_string(),
            documents,
            edits: Vec::new(),
        })
    }

    /// Fresh depth-first traversal of every leaf scalar.
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.documents)
    }

    /// The scalar at `location`, if any.
    pub fn get(&self, location: &Location) -> Option<&Scalar> {
        let mut node = self.documents.get(location.document)?;
        for segment in &location.path {
            node = match (node, segment) {
                (Node::Mapping(entries), Segment::Entry { index, .. }) => &entries.get(*index)?.1,
                (Node::Sequence(items), Segment::Item(index)) => items.get(*index)?,
                _ => return None,
            };
        }
        match node {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Replace the string scalar at `location`, keeping its tag.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NoSuchLocation` or `DocumentError::NotAString`.
    pub fn set(&mut self, location: &Location, value: String) -> Result<(), DocumentError> {
        let scalar = self
            .scalar_mut(location)
            .ok_or_else(|| DocumentError::NoSuchLocation(location.to_string()))?;
        let ScalarValue::String(current) = &mut scalar.value else {
            return Err(DocumentError::NotAString(location.to_string()));
        };
        if *current == value {
            return Ok(());
        }
        let old = std::mem::replace(current, value.clone());
        if !self.edits.iter().any(|e| e.old == old && e.new == value) {
            self.edits.push(Edit {
                location: location.clone(),
                old,
                new: value,
            });
        }
        Ok(())
    }

    /// Render the stream back to text.
    ///
    /// Unmodified streams are returned verbatim. Replaced values are spliced
    /// into the original text and every other byte is kept as it was.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::Unspliceable` with the location of the first
    /// replaced value whose text form cannot be rewritten in place (folded
    /// or multi-line flow scalars).
    pub fn render(&self) -> Result<String, DocumentError> {
        if self.edits.is_empty() {
            return Ok(self.source.clone());
        }
        let pairs: Vec<(&str, &str)> = self
            .edits
            .iter()
            .map(|e| (e.old.as_str(), e.new.as_str()))
            .collect();
        yaml::splice(&self.source, &pairs)
            .map_err(|index| DocumentError::Unspliceable(self.edits[index].location.to_string()))
    }

    fn scalar_mut(&mut self, location: &Location) -> Option<&mut Scalar> {
        let mut node = self.documents.get_mut(location.document)?;
        for segment in &location.path {
            node = match (node, segment) {
                (Node::Mapping(entries), Segment::Entry { index, .. }) => {
                    &mut entries.get_mut(*index)?.1
                }
                (Node::Sequence(items), Segment::Item(index)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        match node {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}
