//! WebDocument - The browser DOM through `web-sys`.
//!
//! Live platform nodes are kept in a map so the engine can keep passing
//! plain [`NodeId`]s around. Each tracked node carries its id in an expando
//! property, which makes the reverse lookup (node to id) constant time.
//! Released nodes leave the map, so the page only retains the nodes the
//! engine still holds.
//!
//! Events are delivered by the browser itself, so
//! [`Document::event_path`] is always empty here.

use std::collections::HashMap;

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Node};

use crate::types::{Event, EventHandler, ListenerId, ListenerOptions, NodeId};

use super::Document;

struct WebListener {
    node: NodeId,
    event: String,
    capture: bool,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Expando property holding a tracked node's id.
const NODE_ID_KEY: &str = "__sparkDomId";

/// [`Document`] backed by the page's `window.document`.
pub struct WebDocument {
    document: web_sys::Document,
    nodes: HashMap<NodeId, Node>,
    next_node: usize,
    body: NodeId,
    listeners: HashMap<ListenerId, WebListener>,
    next_listener: usize,
}

impl WebDocument {
    /// Wrap the current page's document. `None` outside a browser or before
    /// `<body>` exists.
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let body: Node = document.body()?.into();
        let mut web = Self {
            document,
            nodes: HashMap::new(),
            next_node: 0,
            body: NodeId(0),
            listeners: HashMap::new(),
            next_listener: 0,
        };
        web.body = web.push(body);
        Some(web)
    }

    /// Number of nodes currently tracked.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Give an existing page node an id, e.g. a portal target.
    pub fn adopt(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.lookup(&node) {
            return id;
        }
        self.push(node)
    }

    /// Adopt the element with the given `id` attribute.
    pub fn element_by_id(&mut self, id: &str) -> Option<NodeId> {
        let element = self.document.get_element_by_id(id)?;
        Some(self.adopt(element.into()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let key = JsValue::from_str(NODE_ID_KEY);
        if let Err(error) = Reflect::set(&node, &key, &JsValue::from_f64(id.0 as f64)) {
            tracing::warn!(node = %id, ?error, "cannot tag node with its id");
        }
        self.nodes.insert(id, node);
        id
    }

    fn lookup(&self, node: &Node) -> Option<NodeId> {
        let tagged = Reflect::get(node, &JsValue::from_str(NODE_ID_KEY)).ok()?;
        let id = NodeId(tagged.as_f64()? as usize);
        // The tag may come from another document instance.
        self.nodes
            .get(&id)
            .filter(|known| known.is_same_node(Some(node)))
            .map(|_| id)
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("node {id} does not belong to this document"))
    }

    fn element(&self, id: NodeId) -> &web_sys::Element {
        self.node(id)
            .dyn_ref::<web_sys::Element>()
            .unwrap_or_else(|| panic!("node {id} is not an element"))
    }
}

impl Document for WebDocument {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn body(&self) -> NodeId {
        self.body
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        let text = self.document.create_text_node(data);
        self.push(text.into())
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        let comment = self.document.create_comment(data);
        self.push(comment.into())
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let element = self
            .document
            .create_element(tag)
            .unwrap_or_else(|error| panic!("invalid tag name `{tag}`: {error:?}"));
        self.push(element.into())
    }

    fn set_text(&mut self, node: NodeId, data: &str) {
        self.node(node).set_text_content(Some(data));
    }

    fn text(&self, node: NodeId) -> Option<String> {
        let node = self.node(node);
        match node.node_type() {
            Node::TEXT_NODE | Node::COMMENT_NODE => node.text_content(),
            _ => None,
        }
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.node(node)
            .dyn_ref::<web_sys::Element>()
            .map(|element| element.tag_name().to_ascii_lowercase())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) {
        let element = self.element(node);
        let result = match value {
            Some(value) => element.set_attribute(name, value),
            None => element.remove_attribute(name),
        };
        if let Err(error) = result {
            panic!("invalid attribute `{name}`: {error:?}");
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.node(node)
            .dyn_ref::<web_sys::Element>()
            .and_then(|element| element.get_attribute(name))
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let reference = reference.map(|reference| self.node(reference));
        if let Err(error) = self.node(parent).insert_before(self.node(node), reference) {
            panic!("cannot insert {node} into {parent}: {error:?}");
        }
    }

    fn remove_child(&mut self, parent: NodeId, node: NodeId) {
        if let Err(error) = self.node(parent).remove_child(self.node(node)) {
            panic!("cannot remove {node} from {parent}: {error:?}");
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(node).parent_node()?;
        self.lookup(&parent)
    }

    fn child_nodes(&self, node: NodeId) -> Vec<NodeId> {
        let children = self.node(node).child_nodes();
        (0..children.length())
            .filter_map(|index| children.get(index))
            .filter_map(|child| self.lookup(&child))
            .collect()
    }

    fn is_connected(&self, node: NodeId) -> bool {
        self.node(node).is_connected()
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

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |native: web_sys::Event| {
            let event = Event::new(native.type_(), node);
            handler(&event);
            if event.default_prevented() {
                native.prevent_default();
            }
            if event.propagation_stopped() {
                native.stop_propagation();
            }
        });

        let native_options = AddEventListenerOptions::new();
        native_options.set_capture(options.contains(ListenerOptions::CAPTURE));
        native_options.set_once(options.contains(ListenerOptions::ONCE));
        native_options.set_passive(options.contains(ListenerOptions::PASSIVE));

        if let Err(error) = self
            .node(node)
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                closure.as_ref().unchecked_ref(),
                &native_options,
            )
        {
            panic!("cannot listen for `{event}` on {node}: {error:?}");
        }

        self.listeners.insert(
            id,
            WebListener {
                node,
                event: event.to_string(),
                capture: options.contains(ListenerOptions::CAPTURE),
                closure,
            },
        );
        id
    }

    fn unlisten(&mut self, node: NodeId, listener: ListenerId) {
        let Some(registered) = self.listeners.remove(&listener) else {
            return;
        };
        debug_assert_eq!(registered.node, node);
        // Removing an unknown listener is a no-op in the DOM, never an error.
        let _ = self
            .node(registered.node)
            .remove_event_listener_with_callback_and_bool(
                &registered.event,
                registered.closure.as_ref().unchecked_ref(),
                registered.capture,
            );
    }

    fn event_path(&mut self, _target: NodeId, _event: &str) -> Vec<(NodeId, EventHandler)> {
        Vec::new()
    }

    fn outer_html(&self, node: NodeId) -> String {
        let node = self.node(node);
        match node.dyn_ref::<web_sys::Element>() {
            Some(element) => element.outer_html(),
            None => node.text_content().unwrap_or_default(),
        }
    }

    fn release(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        if let Some(released) = self.nodes.remove(&node) {
            let _ = Reflect::delete_property(&released, &JsValue::from_str(NODE_ID_KEY));
        }
    }
}
