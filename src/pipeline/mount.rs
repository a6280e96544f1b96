//! Mount API - Attach a component tree to the document.
//!
//! # Example
//!
//! ```
//! use spark_dom::{dom, pipeline::mount_to_body, primitives::text};
//!
//! let handle = mount_to_body(|scope| {
//!     text(scope, "Hello");
//! });
//! assert_eq!(dom::inner_html(dom::body()).unwrap(), "Hello");
//!
//! handle.unmount();
//! assert_eq!(dom::inner_html(dom::body()).unwrap(), "");
//! ```

use std::cell::RefCell;

use crate::dom;
use crate::engine::{Contexts, Html};
use crate::types::NodeId;

thread_local! {
    /// Roots of trees whose handle was dropped while mounted.
    static RETAINED: RefCell<Vec<Html>> = const { RefCell::new(Vec::new()) };
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Dropping the handle leaves the tree mounted and updating until the
/// thread exits.
#[must_use = "dropping the handle leaves the tree mounted with no way to unmount it"]
pub struct MountHandle {
    target: NodeId,
    root: Html,
    content: Html,
}

impl MountHandle {
    /// Unmount the tree and remove its nodes from the document.
    ///
    /// Unmount hooks run children first, then parents.
    pub fn unmount(self) {
        self.root.remove(&self.content);
        self.root.unmount();
        tracing::debug!(node = %self.target, "unmounted");
    }

    /// Root tag wrapping the target node.
    pub fn root(&self) -> &Html {
        &self.root
    }

    /// Platform node the tree was mounted into.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether the tree is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.root.is_mounted()
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        if !self.root.is_mounted() {
            return;
        }
        let root = self.root.clone();
        // Skipped while the thread shuts down
        let _ = RETAINED.try_with(|retained| retained.borrow_mut().push(root));
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Build `children` and mount them at the end of platform node `to`.
///
/// The tree starts with an empty context chain. Mount hooks have fired by
/// the time this returns.
pub fn mount(to: NodeId, children: impl FnOnce(&Html)) -> MountHandle {
    let root = Html::tag(to, Contexts::empty());
    let content = root.new_fragment();
    children(&content);

    root.emit(content.clone());
    root.mount();
    tracing::debug!(node = %to, "mounted");

    MountHandle {
        target: to,
        root,
        content,
    }
}

/// [`mount`] into the document body.
pub fn mount_to_body(children: impl FnOnce(&Html)) -> MountHandle {
    mount(dom::body(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::primitives::{dynamic_text, text};
    use crate::signals::signal;

    #[test]
    fn test_mount_and_unmount() {
        dom::reset();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_clone = log.clone();
        let handle = mount_to_body(move |scope| {
            let p = dom::create_element("p");
            scope.emit(Html::tag(p, scope.contexts().clone()));
            let log_mount = log_clone.clone();
            scope.on_mount(move || log_mount.borrow_mut().push("mount"));
            let log_unmount = log_clone.clone();
            scope.on_unmount(move || log_unmount.borrow_mut().push("unmount"));
        });

        assert!(handle.is_mounted());
        assert_eq!(handle.target(), dom::body());
        assert_eq!(dom::inner_html(dom::body()).unwrap(), "<p></p>");
        assert_eq!(*log.borrow(), vec!["mount"]);

        handle.unmount();
        assert_eq!(dom::inner_html(dom::body()).unwrap(), "");
        assert_eq!(*log.borrow(), vec!["mount", "unmount"]);
    }

    #[test]
    fn test_dropped_handle_keeps_tree_live() {
        dom::reset();
        let count = signal(1);

        let count_clone = count.clone();
        drop(mount_to_body(move |scope| {
            dynamic_text(scope, &count_clone);
        }));

        count.set(2);
        assert_eq!(dom::inner_html(dom::body()).unwrap(), "2");
    }

    #[test]
    fn test_unmounted_tree_releases_its_nodes() {
        dom::reset();
        let mut node = None;
        let handle = mount_to_body(|scope| {
            node = Some(text(scope, "gone"));
        });
        let node = node.unwrap();
        assert_eq!(dom::text(node).unwrap().as_deref(), Some("gone"));

        handle.unmount();
        assert_eq!(dom::text(node), Err(crate::error::Error::UnknownNode(node)));
    }

    #[test]
    fn test_mount_appends_after_existing_content() {
        dom::reset();
        dom::append_child(dom::body(), dom::create_text("before"));

        let _handle = mount_to_body(|scope| {
            scope.emit(Html::tag(dom::create_text("after"), Contexts::empty()));
        });
        assert_eq!(dom::inner_html(dom::body()).unwrap(), "beforeafter");
    }
}
