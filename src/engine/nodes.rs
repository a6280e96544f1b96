//! Lazy flattening of an [`Html`] subtree into platform nodes.

use smallvec::SmallVec;

use super::html::{Html, Kind};
use crate::types::NodeId;

struct Frame {
    html: Html,
    next_child: usize,
}

/// Iterator over the platform nodes of an [`Html`] subtree, in document
/// order. Created by [`Html::nodes`].
///
/// Reads the tree as it goes, one child at a time.
pub struct Nodes {
    stack: SmallVec<[Frame; 8]>,
}

impl Nodes {
    pub(super) fn new(root: Html) -> Self {
        let mut stack = SmallVec::new();
        stack.push(Frame {
            html: root,
            next_child: 0,
        });
        Self { stack }
    }
}

impl Iterator for Nodes {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let frame = self.stack.last_mut()?;
            let marker = match frame.html.0.kind {
                Kind::Tag(node) => {
                    self.stack.pop();
                    return Some(node);
                }
                Kind::Fragment { marker } => marker,
            };

            let child = frame.html.0.children.borrow().get(frame.next_child).cloned();
            match child {
                Some(child) => {
                    frame.next_child += 1;
                    self.stack.push(Frame {
                        html: child,
                        next_child: 0,
                    });
                }
                None => {
                    self.stack.pop();
                    return Some(marker);
                }
            }
        }
    }
}
