//! Core types for spark-dom.
//!
//! These types are shared by the host document layer, the node tree and the
//! primitives. They are deliberately small: handles, flags and callbacks.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

// =============================================================================
// Node handles
// =============================================================================

/// Handle to a real platform node owned by the installed document.
///
/// Handles are plain indices; the document decides what they point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index of this node in its document.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to an event listener registered on a platform node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) usize);

// =============================================================================
// Listener options
// =============================================================================

bitflags! {
    /// Options passed when listening for an event on a node.
    ///
    /// Mirrors the `addEventListener` options object.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ListenerOptions: u8 {
        /// Fire during the capture phase instead of the bubble phase.
        const CAPTURE = 1 << 0;
        /// Remove the listener after its first invocation.
        const ONCE = 1 << 1;
        /// The handler promises not to call `prevent_default`.
        const PASSIVE = 1 << 2;
    }
}

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a listener.
///
/// The flags use interior mutability so handlers can take `&Event`.
#[derive(Debug)]
pub struct Event {
    kind: String,
    target: NodeId,
    current_target: Cell<NodeId>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event of the given kind targeted at `target`.
    pub fn new(kind: impl Into<String>, target: NodeId) -> Self {
        Self {
            kind: kind.into(),
            target,
            current_target: Cell::new(target),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Event name, e.g. `"click"`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Node the event was dispatched to.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Node whose listener is currently running.
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(node);
    }

    /// Cancel the default action.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Whether `prevent_default` was called.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop the event from reaching further nodes on its path.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Whether `stop_propagation` was called.
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

// =============================================================================
// Callbacks
// =============================================================================

/// Event listener callback (Rc so it can be cloned out of the document
/// before it runs).
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Mount/unmount hook. Hooks fire on every mount and unmount, so they are
/// `Fn`, not `FnOnce`.
pub type Hook = Rc<dyn Fn()>;

// =============================================================================
// Marker kind
// =============================================================================

/// Platform node used as the trailing anchor of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerKind {
    /// An empty text node. Invisible, and the default.
    #[default]
    Text,
    /// An empty comment, which shows up as `<!---->` in serialized output.
    Comment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_options_combine() {
        let options = ListenerOptions::CAPTURE | ListenerOptions::ONCE;
        assert!(options.contains(ListenerOptions::ONCE));
        assert!(!options.contains(ListenerOptions::PASSIVE));
        assert_eq!(ListenerOptions::default(), ListenerOptions::empty());
    }

    #[test]
    fn test_event_flags() {
        let event = Event::new("click", NodeId(3));
        assert_eq!(event.kind(), "click");
        assert_eq!(event.target(), NodeId(3));
        assert!(!event.default_prevented());

        event.prevent_default();
        event.stop_propagation();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
        assert_eq!(NodeId(7).index(), 7);
    }
}
