//! Engine - The live node tree and its context chain.
//!
//! - [`Html`]: a node scope, either a tag (one platform node) or a fragment
//!   (any number of platform nodes followed by a marker)
//! - [`Nodes`]: lazy flattening of a subtree into platform nodes
//! - [`Contexts`]: immutable type-keyed chain threaded through the tree
//!
//! # Architecture
//!
//! The tree is the source of truth for document order. Every structural
//! operation on an [`Html`] patches the installed document right away:
//!
//! ```text
//! fragment.insert(1, node)
//!   Html:      [A, B]           → [A, node, B]
//!   document:  A  B  ⚓          → A  node…  B  ⚓
//!                                     └ inserted before B's first node
//! ```
//!
//! There is no diffing and no scheduler.

mod context;
mod html;
mod nodes;

pub use context::Contexts;
pub use html::{Html, WeakHtml};
pub use nodes::Nodes;
