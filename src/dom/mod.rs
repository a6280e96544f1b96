//! Host Document - The platform node tree that spark-dom patches.
//!
//! The engine never talks to a concrete DOM. It talks to the [`Document`]
//! installed on the current thread, through the free functions in this
//! module:
//!
//! - [`MemoryDocument`] - arena-backed document, installed by default. Used
//!   for tests and for rendering to a string.
//! - `WebDocument` (feature `web`) - the browser DOM through `web-sys`.
//!
//! # Pattern: Short Borrows
//!
//! The document lives in a thread-local `RefCell`. Every function here
//! borrows it for exactly one operation. User callbacks (event handlers)
//! are cloned out first and run with no borrow held, so handlers may freely
//! create, insert and remove nodes.
//!
//! # Pattern: Node Release
//!
//! Nodes the engine creates for itself (fragment markers, the nodes of
//! `text`, `dynamic_text` and `tag`) are released from the document once
//! the last [`Html`](crate::Html) handle owning them drops. A document may
//! then forget the id and free whatever it keeps per node. Nodes created
//! through this module directly are never released by the engine.
//!
//! ```ignore
//! use spark_dom::dom;
//!
//! let div = dom::create_element("div");
//! dom::append_child(dom::body(), div);
//! dom::append_child(div, dom::create_text("hello"));
//! assert_eq!(dom::inner_html(dom::body())?, "<div>hello</div>");
//! ```

mod memory;
#[cfg(feature = "web")]
mod web;

pub use memory::MemoryDocument;
#[cfg(feature = "web")]
pub use web::WebDocument;

use std::cell::{Cell, RefCell};

use crate::error::{Error, Result};
use crate::types::{Event, EventHandler, ListenerId, ListenerOptions, NodeId};

// =============================================================================
// Document trait
// =============================================================================

/// A platform document: creates nodes, moves them around, routes events.
///
/// Every method taking a [`NodeId`] may panic if the id was not created by
/// this document. Use [`contains`](Document::contains) to check first.
pub trait Document {
    /// Whether `node` belongs to this document.
    fn contains(&self, node: NodeId) -> bool;

    /// The `<body>` element. Always connected.
    fn body(&self) -> NodeId;

    /// Create a detached text node.
    fn create_text(&mut self, data: &str) -> NodeId;

    /// Create a detached comment node.
    fn create_comment(&mut self, data: &str) -> NodeId;

    /// Create a detached element.
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Replace the data of a text or comment node.
    fn set_text(&mut self, node: NodeId, data: &str);

    /// Data of a text or comment node, `None` for elements.
    fn text(&self, node: NodeId) -> Option<String>;

    /// Tag name of an element, `None` for text and comments.
    fn tag_name(&self, node: NodeId) -> Option<String>;

    /// Set (`Some`) or remove (`None`) an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>);

    /// Current value of an attribute.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. A node that already has a parent is moved.
    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);

    /// Remove `node` from `parent`.
    fn remove_child(&mut self, parent: NodeId, node: NodeId);

    /// Parent of `node`, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node`, in document order.
    fn child_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether `node` is connected to the live document.
    fn is_connected(&self, node: NodeId) -> bool;

    /// Start listening for `event` on `node`.
    fn listen(
        &mut self,
        node: NodeId,
        event: &str,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> ListenerId;

    /// Stop a listener. Unknown listeners are ignored.
    fn unlisten(&mut self, node: NodeId, listener: ListenerId);

    /// Handlers an event dispatched at `target` reaches, in firing order,
    /// paired with the node each one is registered on.
    ///
    /// `ONCE` listeners are removed as they are returned. Documents whose
    /// platform delivers events natively return nothing.
    fn event_path(&mut self, target: NodeId, event: &str) -> Vec<(NodeId, EventHandler)>;

    /// Serialized markup of `node` and its descendants.
    fn outer_html(&self, node: NodeId) -> String;

    /// Forget `node`: the engine holds no handle to it anymore. Later
    /// operations on the id may panic. The default keeps the node.
    fn release(&mut self, node: NodeId) {
        let _ = node;
    }
}

// =============================================================================
// Installed document
// =============================================================================

thread_local! {
    /// The document every engine operation on this thread goes through.
    static DOCUMENT: RefCell<Box<dyn Document>> = RefCell::new(Box::new(MemoryDocument::new()));

    /// Bumped by every install, so ids of an earlier document are never
    /// released into the current one.
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Install `document` as this thread's document.
///
/// Node ids from the previous document become meaningless.
pub fn install(document: impl Document + 'static) {
    DOCUMENT.with(|slot| *slot.borrow_mut() = Box::new(document));
    GENERATION.with(|generation| generation.set(generation.get() + 1));
    tracing::debug!("document installed");
}

/// Replace this thread's document with a fresh [`MemoryDocument`] (for
/// testing).
pub fn reset() {
    install(MemoryDocument::new());
}

fn with<R>(f: impl FnOnce(&dyn Document) -> R) -> R {
    DOCUMENT.with(|slot| f(slot.borrow().as_ref()))
}

fn with_mut<R>(f: impl FnOnce(&mut dyn Document) -> R) -> R {
    DOCUMENT.with(|slot| f(slot.borrow_mut().as_mut()))
}

fn checked(node: NodeId) -> Result<()> {
    if with(|document| document.contains(node)) {
        Ok(())
    } else {
        Err(Error::UnknownNode(node))
    }
}

// =============================================================================
// Node creation and mutation
// =============================================================================

/// The document body.
pub fn body() -> NodeId {
    with(|document| document.body())
}

/// Create a detached text node.
pub fn create_text(data: &str) -> NodeId {
    with_mut(|document| document.create_text(data))
}

/// Create a detached comment node.
pub fn create_comment(data: &str) -> NodeId {
    with_mut(|document| document.create_comment(data))
}

/// Create a detached element.
pub fn create_element(tag: &str) -> NodeId {
    with_mut(|document| document.create_element(tag))
}

/// Replace the data of a text or comment node.
pub fn set_text(node: NodeId, data: &str) {
    with_mut(|document| document.set_text(node, data));
}

/// Set (`Some`) or remove (`None`) an attribute.
pub fn set_attribute(node: NodeId, name: &str, value: Option<&str>) {
    with_mut(|document| document.set_attribute(node, name, value));
}

/// Insert `node` into `parent` before `reference` (at the end for `None`).
pub fn insert_before(parent: NodeId, node: NodeId, reference: Option<NodeId>) {
    with_mut(|document| document.insert_before(parent, node, reference));
}

/// Append `node` as the last child of `parent`.
pub fn append_child(parent: NodeId, node: NodeId) {
    insert_before(parent, node, None);
}

/// Remove `node` from `parent`.
pub fn remove_child(parent: NodeId, node: NodeId) {
    with_mut(|document| document.remove_child(parent, node));
}

/// Parent of `node`, if attached.
pub fn parent(node: NodeId) -> Option<NodeId> {
    with(|document| document.parent(node))
}

/// Whether `node` is connected to the live document.
pub fn is_connected(node: NodeId) -> bool {
    with(|document| document.is_connected(node))
}

// =============================================================================
// Node release
// =============================================================================

/// Generation of the installed document.
pub(crate) fn generation() -> u64 {
    GENERATION.with(Cell::get)
}

/// Release `node` if the document of `generation` is still installed.
///
/// Runs from `Drop`: skipped when the thread is shutting down or the
/// document is already borrowed.
pub(crate) fn release(node: NodeId, generation: u64) {
    let current = GENERATION.try_with(Cell::get).ok();
    if current != Some(generation) {
        return;
    }
    let released = DOCUMENT.try_with(|slot| match slot.try_borrow_mut() {
        Ok(mut document) => {
            document.release(node);
            true
        }
        Err(_) => false,
    });
    if !matches!(released, Ok(true)) {
        tracing::trace!(%node, "node release skipped");
    }
}

// =============================================================================
// Events
// =============================================================================

/// Listen for `event` on `node`.
pub fn listen(
    node: NodeId,
    event: &str,
    options: ListenerOptions,
    handler: impl Fn(&Event) + 'static,
) -> ListenerId {
    let handler: EventHandler = std::rc::Rc::new(handler);
    with_mut(|document| document.listen(node, event, options, handler))
}

/// Stop a listener.
pub fn unlisten(node: NodeId, listener: ListenerId) {
    with_mut(|document| document.unlisten(node, listener));
}

/// Dispatch an event of kind `event` at `target` and return it, so the
/// caller can inspect `default_prevented`.
pub fn dispatch(target: NodeId, event: &str) -> Event {
    let path = with_mut(|document| document.event_path(target, event));
    let event = Event::new(event, target);

    for (node, handler) in path {
        if event.propagation_stopped() {
            break;
        }
        event.set_current_target(node);
        handler(&event);
    }

    event
}

// =============================================================================
// Queries
// =============================================================================

/// Data of a text or comment node, `None` for elements.
pub fn text(node: NodeId) -> Result<Option<String>> {
    checked(node)?;
    Ok(with(|document| document.text(node)))
}

/// Tag name of an element, `None` for text and comments.
pub fn tag_name(node: NodeId) -> Result<Option<String>> {
    checked(node)?;
    Ok(with(|document| document.tag_name(node)))
}

/// Current value of an attribute.
pub fn attribute(node: NodeId, name: &str) -> Result<Option<String>> {
    checked(node)?;
    Ok(with(|document| document.attribute(node, name)))
}

/// Children of `node`, in document order.
pub fn child_nodes(node: NodeId) -> Result<Vec<NodeId>> {
    checked(node)?;
    Ok(with(|document| document.child_nodes(node)))
}

/// Serialized markup of `node` and its descendants.
pub fn outer_html(node: NodeId) -> Result<String> {
    checked(node)?;
    Ok(with(|document| document.outer_html(node)))
}

/// Serialized markup of the children of `node`.
pub fn inner_html(node: NodeId) -> Result<String> {
    checked(node)?;
    Ok(with(|document| {
        document
            .child_nodes(node)
            .into_iter()
            .map(|child| document.outer_html(child))
            .collect()
    }))
}
