//! Depth-first traversal of document trees.

use super::{Location, Node, Scalar, Segment};

/// Lazy iterator over every leaf scalar of a document stream.
///
/// Yields `(location, scalar)` in document order: documents in stream
/// order, mapping values in insertion order, sequence items by index.
/// Mapping keys are not visited.
pub struct Walk<'a> {
    stack: Vec<(Location, &'a Node)>,
}

impl<'a> Walk<'a> {
    pub(super) fn new(documents: &'a [Node]) -> Self {
        let stack = documents
            .iter()
            .enumerate()
            .rev()
            .map(|(index, node)| (Location::root(index), node))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Location, &'a Scalar);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((location, node)) = self.stack.pop() {
            match node {
                Node::Scalar(scalar) => return Some((location, scalar)),
                Node::Mapping(entries) => {
                    for (index, (key, value)) in entries.iter().enumerate().rev() {
                        let segment = Segment::Entry {
                            index,
                            key: key.label(),
                        };
                        self.stack.push((location.child(segment), value));
                    }
                }
                Node::Sequence(items) => {
                    for (index, item) in items.iter().enumerate().rev() {
                        self.stack.push((location.child(Segment::Item(index)), item));
                    }
                }
            }
        }
        None
    }
}
