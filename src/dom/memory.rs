//! MemoryDocument - An arena-backed document.
//!
//! Nodes are indices into a single `Vec`. Each slot stores its parent index
//! and an ordered child list, so insertion and removal are plain vector
//! edits and connectedness is a walk up the parent chain:
//!
//! ```text
//! Index 0: #document (parent=None, children=[1])
//! Index 1: <body>    (parent=0,    children=[2, 3])
//! Index 2: <div>     (parent=1,    children=[4])
//! Index 3: ""        (parent=1,    text marker)
//! Index 4: "hello"   (parent=2)
//! ```
//!
//! Node slots are never reused. A released slot keeps its data, so markup
//! that still holds it serializes, but queries reject its id.

use std::fmt::Write as _;

use crate::types::{EventHandler, ListenerId, ListenerOptions, NodeId};

use super::Document;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

// =============================================================================
// Slots
// =============================================================================

#[derive(Debug)]
enum NodeData {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

struct Listener {
    id: ListenerId,
    event: String,
    options: ListenerOptions,
    handler: EventHandler,
}

struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
    released: bool,
}

impl Slot {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
            released: false,
        }
    }
}

// =============================================================================
// MemoryDocument
// =============================================================================

/// In-memory [`Document`] with a connected `<body>`.
pub struct MemoryDocument {
    slots: Vec<Slot>,
    root: NodeId,
    body: NodeId,
    next_listener: usize,
}

impl MemoryDocument {
    /// Create a document containing only `#document > body`.
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            next_listener: 0,
        };
        document.root = document.allocate(NodeData::Document);
        document.body = document.create_element("body");
        let (root, body) = (document.root, document.body);
        document.insert_before(root, body, None);
        document
    }

    /// Number of nodes ever created, including the document and body.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: a document holds at least its root and body.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn allocate(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::new(data));
        id
    }

    fn slot(&self, node: NodeId) -> &Slot {
        self.slots
            .get(node.0)
            .unwrap_or_else(|| panic!("node {node} does not belong to this document"))
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        self.slots
            .get_mut(node.0)
            .unwrap_or_else(|| panic!("node {node} does not belong to this document"))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.slot(id).parent;
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.slot_mut(node).parent.take() {
            self.slot_mut(parent).children.retain(|child| *child != node);
        }
    }

    /// Listeners on `node` for `event` in the given phase, removing `ONCE`
    /// listeners as they are taken.
    fn take_listeners(
        &mut self,
        node: NodeId,
        event: &str,
        capture: bool,
        path: &mut Vec<(NodeId, EventHandler)>,
    ) {
        let slot = self.slot_mut(node);
        slot.listeners.retain(|listener| {
            let matches = listener.event == event
                && listener.options.contains(ListenerOptions::CAPTURE) == capture;
            if matches {
                path.push((node, listener.handler.clone()));
                !listener.options.contains(ListenerOptions::ONCE)
            } else {
                true
            }
        });
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let slot = self.slot(node);
        match &slot.data {
            NodeData::Document => {
                for child in &slot.children {
                    self.write_html(*child, out);
                }
            }
            NodeData::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &slot.children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            NodeData::Text(data) => out.push_str(&escape(data, false)),
            NodeData::Comment(data) => {
                let _ = write!(out, "<!--{data}-->");
            }
        }
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if attribute => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl Document for MemoryDocument {
    fn contains(&self, node: NodeId) -> bool {
        self.slots.get(node.0).is_some_and(|slot| !slot.released)
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Text(data.to_string()))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.allocate(NodeData::Comment(data.to_string()))
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    fn set_text(&mut self, node: NodeId, data: &str) {
        match &mut self.slot_mut(node).data {
            NodeData::Text(text) | NodeData::Comment(text) => {
                text.clear();
                text.push_str(data);
            }
            other => panic!("cannot set text of {other:?} node {node}"),
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match &self.slot(node).data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.slot(node).data {
            NodeData::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) {
        let NodeData::Element { attributes, .. } = &mut self.slot_mut(node).data else {
            panic!("cannot set attribute `{name}` on non-element node {node}");
        };

        let position = attributes.iter().position(|(existing, _)| existing == name);
        match (position, value) {
            (Some(index), Some(value)) => attributes[index].1 = value.to_string(),
            (None, Some(value)) => attributes.push((name.to_string(), value.to_string())),
            (Some(index), None) => {
                attributes.remove(index);
            }
            (None, None) => {}
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match &self.slot(node).data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.clone()),
            _ => None,
        }
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        assert!(
            matches!(
                self.slot(parent).data,
                NodeData::Element { .. } | NodeData::Document
            ),
            "node {parent} cannot have children"
        );
        assert!(
            !self.is_inclusive_ancestor(node, parent),
            "cannot insert node {node} into its own subtree"
        );
        if reference == Some(node) {
            return;
        }

        self.detach(node);

        let children = &self.slot(parent).children;
        let index = match reference {
            Some(reference) => children
                .iter()
                .position(|child| *child == reference)
                .unwrap_or_else(|| panic!("reference {reference} is not a child of {parent}")),
            None => children.len(),
        };

        self.slot_mut(parent).children.insert(index, node);
        self.slot_mut(node).parent = Some(parent);
    }

    fn remove_child(&mut self, parent: NodeId, node: NodeId) {
        assert_eq!(
            self.slot(node).parent,
            Some(parent),
            "node {node} is not a child of {parent}"
        );
        self.detach(node);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.slot(node).children.clone()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    fn listen(
        &mut self,
        node: NodeId,
        event: &str,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.slot_mut(node).listeners.push(Listener {
            id,
            event: event.to_string(),
            options,
            handler,
        });
        id
    }

    fn unlisten(&mut self, node: NodeId, listener: ListenerId) {
        self.slot_mut(node)
            .listeners
            .retain(|existing| existing.id != listener);
    }

    fn event_path(&mut self, target: NodeId, event: &str) -> Vec<(NodeId, EventHandler)> {
        let mut ancestors = Vec::new();
        let mut current = self.slot(target).parent;
        while let Some(node) = current {
            ancestors.push(node);
            current = self.slot(node).parent;
        }

        let mut path = Vec::new();
        // Capture: root down to the target's parent.
        for node in ancestors.iter().rev() {
            self.take_listeners(*node, event, true, &mut path);
        }
        // Target: capture listeners first, then bubble listeners.
        self.take_listeners(target, event, true, &mut path);
        self.take_listeners(target, event, false, &mut path);
        // Bubble: target's parent up to the root.
        for node in &ancestors {
            self.take_listeners(*node, event, false, &mut path);
        }
        path
    }

    fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn release(&mut self, node: NodeId) {
        if node == self.root || node == self.body {
            return;
        }
        if let Some(slot) = self.slots.get_mut(node.0) {
            slot.released = true;
            slot.listeners.clear();
        }
    }
}
