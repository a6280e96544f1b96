//! Primitives - Component building blocks.
//!
//! This module provides the core UI primitives:
//! - [`text`] / [`dynamic_text`] - text nodes
//! - [`tag`] - elements with reactive [`Attributes`] and listeners
//! - [`dynamic`], [`each`], [`when`] - control flow
//! - [`portal`] - rendering into a node outside the tree
//!
//! # Architecture
//!
//! Components are plain functions taking the scope they render into:
//!
//! ```ignore
//! fn counter(scope: &Html, count: &MutableSignal<i32>) {
//!     tag(scope, "p", Attributes::new(), |scope| {
//!         text(scope, "Count: ");
//!         dynamic_text(scope, count);
//!     });
//! }
//! ```
//!
//! A component runs exactly once. Everything that changes afterwards is
//! driven by the subscriptions its primitives set up.
//!
//! # Reactivity
//!
//! Arguments that can change take `impl Into<Signal<T>>`. Pass a signal
//! (or `&signal`) to stay connected; pass `just(value)` for a constant.

mod control_flow;
mod element;
mod portal;
mod text;

pub use control_flow::{dynamic, each, when};
pub use element::{Attributes, tag};
pub use portal::portal;
pub use text::{dynamic_text, text};

use crate::engine::Html;
use crate::signals::Subscription;

/// Pause `subscription` while `node` is unmounted.
pub(crate) fn follow_lifecycle(node: &Html, subscription: Subscription) {
    let on_mount = subscription.clone();
    node.on_mount(move || on_mount.resume());
    node.on_unmount(move || subscription.pause());
}
