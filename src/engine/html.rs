//! Html - A node in the live UI tree.
//!
//! There is one node type with two kinds:
//!
//! - **Tag** - wraps exactly one platform node (an element or text node).
//!   Children emitted into a tag are inserted into that platform node.
//! - **Fragment** - wraps zero or more platform nodes with no footprint of
//!   its own, anchored by a trailing marker node. Its children are inserted
//!   into the marker's platform parent, right before the marker.
//!
//! ```text
//! Html tree                         platform children of <div>
//!
//! Tag(<div>)                        <p>a</p>
//! └── Fragment                      <p>b</p>
//!     ├── Tag(<p>a</p>)             ""        ← inner marker
//!     ├── Fragment                  ""        ← outer marker
//!     │   └── Tag(<p>b</p>)
//!     └── (marker)
//! ```
//!
//! # Lifecycle
//!
//! A node is *mounted* once its root has been mounted and it is attached
//! beneath it. Attaching into a mounted parent fires the mount cascade
//! (own hooks first, then children); detaching fires the unmount cascade
//! (children first, then own hooks). The `mounted` flag makes both
//! cascades idempotent.
//!
//! # Ownership
//!
//! A fragment's marker, and the node of a tag built with
//! [`Html::owned_tag`], belong to the tree. They are released from the
//! document when the last handle drops. Tags built with [`Html::tag`]
//! wrap nodes owned by someone else (the body, a portal target).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::context::Contexts;
use super::nodes::Nodes;
use crate::dom;
use crate::error::Result;
use crate::pipeline::marker_kind;
use crate::types::{Hook, MarkerKind, NodeId};

#[derive(Debug, Clone, Copy)]
pub(super) enum Kind {
    Tag(NodeId),
    Fragment { marker: NodeId },
}

pub(super) struct HtmlInner {
    contexts: Contexts,
    pub(super) kind: Kind,
    pub(super) children: RefCell<Vec<Html>>,
    parent: RefCell<Weak<HtmlInner>>,
    mount_hooks: RefCell<Vec<Hook>>,
    unmount_hooks: RefCell<Vec<Hook>>,
    mounted: Cell<bool>,
    /// Document generation to release the platform node in, for nodes the
    /// tree created itself.
    owned_in: Option<u64>,
}

impl Drop for HtmlInner {
    fn drop(&mut self) {
        let Some(generation) = self.owned_in else {
            return;
        };
        let node = match self.kind {
            Kind::Tag(node) => node,
            Kind::Fragment { marker } => marker,
        };
        dom::release(node, generation);
    }
}

/// A node scope: the handle components build into.
///
/// Cheap to clone; clones are the same node.
#[derive(Clone)]
pub struct Html(pub(super) Rc<HtmlInner>);

/// Non-owning reference to an [`Html`] node.
#[derive(Clone, Default)]
pub struct WeakHtml(Weak<HtmlInner>);

impl WeakHtml {
    /// The node, if something still owns it.
    pub fn upgrade(&self) -> Option<Html> {
        self.0.upgrade().map(Html)
    }
}

// =============================================================================
// Construction
// =============================================================================

impl Html {
    fn with_kind(kind: Kind, contexts: Contexts, owned: bool) -> Self {
        Self(Rc::new(HtmlInner {
            contexts,
            kind,
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            mount_hooks: RefCell::new(Vec::new()),
            unmount_hooks: RefCell::new(Vec::new()),
            mounted: Cell::new(false),
            owned_in: owned.then(dom::generation),
        }))
    }

    /// Wrap an existing platform node. The node is never released.
    pub fn tag(node: NodeId, contexts: Contexts) -> Self {
        Self::with_kind(Kind::Tag(node), contexts, false)
    }

    /// Wrap a platform node the tree takes over. It is released from the
    /// document once the last handle to this node drops.
    pub fn owned_tag(node: NodeId, contexts: Contexts) -> Self {
        Self::with_kind(Kind::Tag(node), contexts, true)
    }

    /// A detached, empty fragment with a fresh marker.
    pub fn fragment(contexts: Contexts) -> Self {
        let marker = match marker_kind() {
            MarkerKind::Text => dom::create_text(""),
            MarkerKind::Comment => dom::create_comment(""),
        };
        Self::with_kind(Kind::Fragment { marker }, contexts, true)
    }

    /// A detached, empty fragment carrying this node's contexts.
    ///
    /// The usual child scope for a component that renders later.
    pub fn new_fragment(&self) -> Self {
        Self::fragment(self.0.contexts.clone())
    }

    /// Non-owning reference to this node.
    pub fn downgrade(&self) -> WeakHtml {
        WeakHtml(Rc::downgrade(&self.0))
    }

    /// Whether `self` and `other` are the same node.
    pub fn ptr_eq(&self, other: &Html) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// =============================================================================
// Inspection
// =============================================================================

impl Html {
    /// Context chain this node was built with.
    pub fn contexts(&self) -> &Contexts {
        &self.0.contexts
    }

    /// Whether this is a fragment.
    pub fn is_fragment(&self) -> bool {
        matches!(self.0.kind, Kind::Fragment { .. })
    }

    /// Platform node of a tag, `None` for fragments.
    pub fn node(&self) -> Option<NodeId> {
        match self.0.kind {
            Kind::Tag(node) => Some(node),
            Kind::Fragment { .. } => None,
        }
    }

    /// Marker of a fragment, `None` for tags.
    pub fn marker(&self) -> Option<NodeId> {
        match self.0.kind {
            Kind::Tag(_) => None,
            Kind::Fragment { marker } => Some(marker),
        }
    }

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<Html> {
        self.0.parent.borrow().upgrade().map(Html)
    }

    /// Snapshot of the children, in order.
    pub fn children(&self) -> Vec<Html> {
        self.0.children.borrow().clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// Position of `child` among the children.
    pub fn index_of(&self, child: &Html) -> Option<usize> {
        self.0
            .children
            .borrow()
            .iter()
            .position(|candidate| candidate.ptr_eq(child))
    }

    /// Whether the mount cascade has reached this node.
    pub fn is_mounted(&self) -> bool {
        self.0.mounted.get()
    }

    /// Platform nodes this node stands for, in document order.
    ///
    /// A tag yields its node. A fragment yields its children's nodes, then
    /// its marker. Lazy: each call starts a fresh walk.
    pub fn nodes(&self) -> Nodes {
        Nodes::new(self.clone())
    }

    /// Platform node that children are inserted into.
    fn platform_parent(&self) -> Option<NodeId> {
        match self.0.kind {
            Kind::Tag(node) => Some(node),
            Kind::Fragment { marker } => dom::parent(marker),
        }
    }

    /// Node that trailing insertions go before. `None` appends.
    fn anchor(&self) -> Option<NodeId> {
        self.marker()
    }

    /// First platform node at or after logical position `index`.
    fn reference_at(&self, index: usize) -> Option<NodeId> {
        let children = self.0.children.borrow();
        children[index..]
            .iter()
            .find_map(|child| child.nodes().next())
            .or_else(|| self.anchor())
    }
}

// =============================================================================
// Children
// =============================================================================

impl Html {
    /// Attach `child` as the last child.
    pub fn emit(&self, child: Html) {
        self.add(child);
    }

    /// Attach `child` as the last child.
    pub fn add(&self, child: Html) {
        child.remove_from_parent();
        let index = self.child_count();
        self.attach(index, child);
    }

    /// Attach `child` at logical position `index`.
    ///
    /// # Panics
    ///
    /// If `index > child_count()`.
    pub fn insert(&self, index: usize, child: Html) {
        child.remove_from_parent();
        let len = self.child_count();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= child count (is {len})"
        );
        self.attach(index, child);
    }

    fn attach(&self, index: usize, child: Html) {
        debug_assert!(!child.ptr_eq(self), "a node cannot contain itself");

        if let Some(parent) = self.platform_parent() {
            let reference = self.reference_at(index);
            for node in child.nodes() {
                dom::insert_before(parent, node, reference);
            }
        }

        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().insert(index, child.clone());

        if self.is_mounted() {
            child.mount();
        }
    }

    /// Detach `child`. Returns `false`, and does nothing, if it is not a
    /// child of this node.
    pub fn remove(&self, child: &Html) -> bool {
        match self.index_of(child) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => {
                tracing::warn!("remove: node is not a child");
                false
            }
        }
    }

    /// Detach and return the child at `index`.
    ///
    /// # Panics
    ///
    /// If `index >= child_count()`.
    pub fn remove_at(&self, index: usize) -> Html {
        let child = {
            let mut children = self.0.children.borrow_mut();
            let len = children.len();
            assert!(
                index < len,
                "removal index (is {index}) should be < child count (is {len})"
            );
            children.remove(index)
        };

        if let Some(parent) = self.platform_parent() {
            for node in child.nodes() {
                dom::remove_child(parent, node);
            }
        }
        *child.0.parent.borrow_mut() = Weak::new();

        if self.is_mounted() {
            child.unmount();
        }
        child
    }

    /// Put `child` at `index`, detaching and returning the node it replaces.
    ///
    /// # Panics
    ///
    /// If `index >= child_count()`.
    pub fn set(&self, index: usize, child: Html) -> Html {
        let previous = self.0.children.borrow()[index].clone();
        if previous.ptr_eq(&child) {
            return previous;
        }
        self.insert(index, child);
        self.remove(&previous);
        previous
    }

    /// Detach every child, last first.
    pub fn clear(&self) {
        while let Some(last) = self.child_count().checked_sub(1) {
            self.remove_at(last);
        }
    }

    /// Detach this node from its parent. Returns `false` if it had none.
    pub fn remove_from_parent(&self) -> bool {
        match self.parent() {
            Some(parent) => parent.remove(self),
            None => false,
        }
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

impl Html {
    /// Run `hook` every time this node is mounted.
    pub fn on_mount(&self, hook: impl Fn() + 'static) {
        self.0.mount_hooks.borrow_mut().push(Rc::new(hook));
    }

    /// Run `hook` every time this node is unmounted.
    pub fn on_unmount(&self, hook: impl Fn() + 'static) {
        self.0.unmount_hooks.borrow_mut().push(Rc::new(hook));
    }

    /// Fire the mount cascade from this node. No-op if already mounted.
    pub(crate) fn mount(&self) {
        if self.0.mounted.replace(true) {
            return;
        }
        tracing::trace!(kind = ?self.0.kind, "mount");

        let hooks = self.0.mount_hooks.borrow().clone();
        for hook in hooks {
            hook();
        }
        for child in self.children() {
            child.mount();
        }
    }

    /// Fire the unmount cascade from this node. No-op if not mounted.
    pub(crate) fn unmount(&self) {
        if !self.0.mounted.replace(false) {
            return;
        }
        tracing::trace!(kind = ?self.0.kind, "unmount");

        for child in self.children() {
            child.unmount();
        }
        let hooks = self.0.unmount_hooks.borrow().clone();
        for hook in hooks {
            hook();
        }
    }
}

// =============================================================================
// Contexts
// =============================================================================

impl Html {
    /// Provide `value` to everything `body` builds.
    ///
    /// `body` runs against a new fragment carrying the extended chain; the
    /// fragment is then emitted into this node.
    pub fn provide<T: 'static>(&self, value: T, body: impl FnOnce(&Html)) {
        let scope = Html::fragment(self.0.contexts.provide(value));
        body(&scope);
        self.emit(scope);
    }

    /// Innermost value of type `T` provided above this node.
    pub fn context<T: 'static>(&self) -> Result<Rc<T>> {
        self.0.contexts.lookup::<T>()
    }

    /// Like [`context`](Html::context), failing with `message`.
    pub fn context_or<T: 'static>(&self, message: impl Into<String>) -> Result<Rc<T>> {
        self.0.contexts.lookup_or::<T>(message)
    }
}

impl PartialEq for Html {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Html {}

impl fmt::Debug for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Html")
            .field("kind", &self.0.kind)
            .field("children", &self.0.children.borrow().len())
            .field("mounted", &self.0.mounted.get())
            .finish()
    }
}

impl fmt::Debug for WeakHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakHtml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pipeline::{reset_config, set_marker_kind};

    fn setup() {
        dom::reset();
        reset_config();
    }

    /// Element root wrapped in a tag, attached to the body.
    fn root() -> Html {
        let div = dom::create_element("div");
        dom::append_child(dom::body(), div);
        Html::tag(div, Contexts::empty())
    }

    fn paragraph(content: &str) -> Html {
        let p = dom::create_element("p");
        dom::append_child(p, dom::create_text(content));
        Html::tag(p, Contexts::empty())
    }

    fn html_of(node: &Html) -> String {
        dom::inner_html(node.node().unwrap()).unwrap()
    }

    #[test]
    fn test_tag_yields_its_node() {
        setup();
        let p = paragraph("a");
        assert_eq!(p.nodes().collect::<Vec<_>>(), vec![p.node().unwrap()]);
    }

    #[test]
    fn test_empty_fragment_yields_marker() {
        setup();
        let fragment = Html::fragment(Contexts::empty());
        assert_eq!(fragment.nodes().collect::<Vec<_>>(), vec![fragment.marker().unwrap()]);
    }

    #[test]
    fn test_nodes_flattens_and_restarts() {
        setup();
        let outer = Html::fragment(Contexts::empty());
        let inner = Html::fragment(Contexts::empty());
        let a = paragraph("a");
        let b = paragraph("b");
        outer.add(a.clone());
        inner.add(b.clone());
        outer.add(inner.clone());

        let expected = vec![
            a.node().unwrap(),
            b.node().unwrap(),
            inner.marker().unwrap(),
            outer.marker().unwrap(),
        ];
        assert_eq!(outer.nodes().collect::<Vec<_>>(), expected);
        assert_eq!(outer.nodes().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_fragment_children_land_before_marker() {
        setup();
        let root = root();
        let fragment = Html::fragment(Contexts::empty());
        root.add(fragment.clone());
        root.add(paragraph("after"));

        fragment.add(paragraph("a"));
        fragment.add(paragraph("b"));
        assert_eq!(html_of(&root), "<p>a</p><p>b</p><p>after</p>");
    }

    #[test]
    fn test_insert_before_logical_index() {
        setup();
        let root = root();
        let fragment = Html::fragment(Contexts::empty());
        root.add(fragment.clone());

        fragment.add(paragraph("a"));
        fragment.add(paragraph("c"));
        fragment.insert(1, paragraph("b"));
        fragment.insert(0, paragraph("start"));
        fragment.insert(4, paragraph("end"));
        assert_eq!(
            html_of(&root),
            "<p>start</p><p>a</p><p>b</p><p>c</p><p>end</p>"
        );
    }

    #[test]
    fn test_insert_before_empty_fragment_child() {
        setup();
        let root = root();
        let fragment = Html::fragment(Contexts::empty());
        root.add(fragment.clone());

        let empty = Html::fragment(Contexts::empty());
        fragment.add(empty.clone());
        fragment.insert(0, paragraph("a"));
        empty.add(paragraph("b"));
        assert_eq!(html_of(&root), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_detached_fragment_is_populated_on_attach() {
        setup();
        let root = root();
        let fragment = Html::fragment(Contexts::empty());
        fragment.add(paragraph("a"));
        fragment.add(paragraph("b"));
        assert_eq!(html_of(&root), "");

        root.add(fragment);
        assert_eq!(html_of(&root), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_remove_and_set() {
        setup();
        let root = root();
        let a = paragraph("a");
        let b = paragraph("b");
        root.add(a.clone());
        root.add(b.clone());

        assert!(root.remove(&a));
        assert!(!root.remove(&a));
        assert!(a.parent().is_none());
        assert_eq!(html_of(&root), "<p>b</p>");

        let previous = root.set(0, paragraph("c"));
        assert_eq!(previous, b);
        assert_eq!(html_of(&root), "<p>c</p>");

        root.clear();
        assert_eq!(html_of(&root), "");
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_remove_nested_fragment_removes_all_nodes() {
        setup();
        let root = root();
        let outer = Html::fragment(Contexts::empty());
        let inner = Html::fragment(Contexts::empty());
        inner.add(paragraph("a"));
        outer.add(inner.clone());
        outer.add(paragraph("b"));
        root.add(outer.clone());
        root.add(paragraph("c"));

        root.remove(&outer);
        assert_eq!(html_of(&root), "<p>c</p>");
        assert_eq!(dom::parent(inner.marker().unwrap()), None);
    }

    #[test]
    fn test_add_moves_attached_node() {
        setup();
        let root = root();
        let first = Html::fragment(Contexts::empty());
        let second = Html::fragment(Contexts::empty());
        root.add(first.clone());
        root.add(second.clone());
        let p = paragraph("moved");
        first.add(p.clone());

        second.add(p.clone());
        assert_eq!(first.child_count(), 0);
        assert_eq!(p.parent(), Some(second));
        assert_eq!(html_of(&root), "<p>moved</p>");
    }

    #[test]
    #[should_panic(expected = "removal index")]
    fn test_remove_at_out_of_bounds_panics() {
        setup();
        Html::fragment(Contexts::empty()).remove_at(0);
    }

    #[test]
    #[should_panic(expected = "insertion index")]
    fn test_insert_out_of_bounds_panics() {
        setup();
        let fragment = Html::fragment(Contexts::empty());
        fragment.insert(1, paragraph("a"));
    }

    #[test]
    fn test_mount_cascade_order() {
        setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let parent = Html::fragment(Contexts::empty());
        let child = Html::fragment(Contexts::empty());
        parent.add(child.clone());

        for (name, node) in [("parent", &parent), ("child", &child)] {
            let log_mount = log.clone();
            node.on_mount(move || log_mount.borrow_mut().push(format!("mount {name}")));
            let log_unmount = log.clone();
            node.on_unmount(move || log_unmount.borrow_mut().push(format!("unmount {name}")));
        }

        parent.mount();
        parent.mount();
        parent.unmount();
        parent.unmount();
        assert_eq!(
            *log.borrow(),
            vec!["mount parent", "mount child", "unmount child", "unmount parent"]
        );
    }

    #[test]
    fn test_attach_to_mounted_parent_mounts_once() {
        setup();
        let root = root();
        root.mount();

        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(Cell::new(0));
        let child = Html::fragment(Contexts::empty());
        let mounts_clone = mounts.clone();
        child.on_mount(move || mounts_clone.set(mounts_clone.get() + 1));
        let unmounts_clone = unmounts.clone();
        child.on_unmount(move || unmounts_clone.set(unmounts_clone.get() + 1));

        root.add(child.clone());
        assert!(child.is_mounted());
        assert_eq!(mounts.get(), 1);

        root.remove(&child);
        assert!(!child.is_mounted());
        assert_eq!(unmounts.get(), 1);
    }

    #[test]
    fn test_detached_parent_does_not_mount_children() {
        setup();
        let parent = Html::fragment(Contexts::empty());
        let child = Html::fragment(Contexts::empty());
        parent.add(child.clone());
        assert!(!child.is_mounted());
    }

    #[test]
    fn test_nested_provide() {
        setup();
        let root = root();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_outer = seen.clone();
        root.provide(vec![1, 2, 3], move |outer| {
            let seen_inner = seen_outer.clone();
            outer.provide(vec![3, 2, 1], move |inner| {
                seen_inner.borrow_mut().push((*inner.context::<Vec<i32>>().unwrap()).clone());
            });
            seen_outer.borrow_mut().push((*outer.context::<Vec<i32>>().unwrap()).clone());
        });

        assert_eq!(*seen.borrow(), vec![vec![3, 2, 1], vec![1, 2, 3]]);
    }

    #[test]
    fn test_missing_context() {
        setup();
        let root = root();
        let error = root.context_or::<Vec<i32>>("Some message").unwrap_err();
        assert_eq!(error.to_string(), "Some message");
        assert!(matches!(root.context::<u8>(), Err(Error::MissingContext { .. })));
    }

    #[test]
    fn test_comment_markers() {
        setup();
        set_marker_kind(MarkerKind::Comment);
        let root = root();
        root.add(Html::fragment(Contexts::empty()));
        assert_eq!(html_of(&root), "<!---->");
    }

    #[test]
    fn test_dropping_owner_releases_its_nodes() {
        setup();
        let fragment = Html::fragment(Contexts::empty());
        let marker = fragment.marker().unwrap();
        let p = dom::create_element("p");
        fragment.add(Html::owned_tag(p, Contexts::empty()));
        let div = dom::create_element("div");
        let external = Html::tag(div, Contexts::empty());

        drop(fragment);
        drop(external);
        assert_eq!(dom::tag_name(p), Err(Error::UnknownNode(p)));
        assert_eq!(dom::text(marker), Err(Error::UnknownNode(marker)));
        assert_eq!(dom::tag_name(div).unwrap().as_deref(), Some("div"));
    }

    #[test]
    fn test_release_skips_replaced_document() {
        setup();
        let fragment = Html::fragment(Contexts::empty());
        dom::reset();
        let fresh = dom::create_text("fresh");
        assert_eq!(fragment.marker(), Some(fresh));

        drop(fragment);
        assert_eq!(dom::text(fresh).unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_weak_handle() {
        setup();
        let fragment = Html::fragment(Contexts::empty());
        let weak = fragment.downgrade();
        assert_eq!(weak.upgrade(), Some(fragment.clone()));
        drop(fragment);
        assert!(weak.upgrade().is_none());
    }
}
