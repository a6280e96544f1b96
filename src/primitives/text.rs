//! Text Primitives - Static and signal-driven text nodes.

use std::fmt::Display;

use super::follow_lifecycle;
use crate::dom;
use crate::engine::Html;
use crate::signals::Signal;
use crate::types::NodeId;

/// Emit a text node holding `content`.
///
/// # Example
///
/// ```ignore
/// text(scope, "Hello, World!");
/// ```
pub fn text(scope: &Html, content: impl AsRef<str>) -> NodeId {
    let node = dom::create_text(content.as_ref());
    scope.emit(Html::owned_tag(node, scope.contexts().clone()));
    node
}

/// Emit a text node that shows the current value of `signal`.
///
/// The node is patched in place on every write. Updates pause while the
/// node is unmounted.
pub fn dynamic_text<T: Display + 'static>(scope: &Html, signal: impl Into<Signal<T>>) -> NodeId {
    let node = dom::create_text("");
    let html = Html::owned_tag(node, scope.contexts().clone());

    // Released with the last handle, even if never mounted
    let owner = html.downgrade();
    let subscription = signal.into().subscribe(move |value| {
        if owner.upgrade().is_some() {
            dom::set_text(node, &value.to_string());
        }
    });

    follow_lifecycle(&html, subscription);
    scope.emit(html);
    node
}
