//! Element Primitive - Elements with reactive attributes and listeners.
//!
//! ```ignore
//! let clicks = signal(0);
//! let clicks_clone = clicks.clone();
//! tag(
//!     scope,
//!     "button",
//!     Attributes::new()
//!         .value("type", "button")
//!         .toggle("disabled", done.signal())
//!         .on("click", move |_| clicks_clone.update(|n| *n += 1)),
//!     |scope| {
//!         dynamic_text(scope, &clicks);
//!     },
//! );
//! ```
//!
//! Attribute subscriptions pause while the element is unmounted. Listeners
//! are added on mount and removed on unmount.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::follow_lifecycle;
use crate::dom;
use crate::engine::Html;
use crate::signals::{Signal, just};
use crate::types::{Event, EventHandler, ListenerId, ListenerOptions, NodeId};

enum Attribute {
    Value {
        name: String,
        value: Signal<Option<String>>,
    },
    Toggle {
        name: String,
        on: Signal<bool>,
    },
    Listener {
        event: String,
        options: ListenerOptions,
        handler: EventHandler,
    },
}

/// Attributes and listeners applied by [`tag`].
#[derive(Default)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// No attributes and no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind attribute `name` to `value`. `None` removes the attribute.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Signal<Option<String>>>) -> Self {
        self.entries.push(Attribute::Value {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Set attribute `name` to a fixed value.
    pub fn value(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, just(Some(value.into())))
    }

    /// Boolean attribute: present (empty) while `on` is true, absent while
    /// false.
    pub fn toggle(mut self, name: impl Into<String>, on: impl Into<Signal<bool>>) -> Self {
        self.entries.push(Attribute::Toggle {
            name: name.into(),
            on: on.into(),
        });
        self
    }

    /// Listen for `event` while the element is mounted.
    pub fn on(self, event: impl Into<String>, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_with(event, ListenerOptions::empty(), handler)
    }

    /// Like [`on`](Attributes::on), with listener options.
    pub fn on_with(
        mut self,
        event: impl Into<String>,
        options: ListenerOptions,
        handler: impl Fn(&Event) + 'static,
    ) -> Self {
        self.entries.push(Attribute::Listener {
            event: event.into(),
            options,
            handler: Rc::new(handler),
        });
        self
    }

    /// Number of attributes and listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for entry in &self.entries {
            match entry {
                Attribute::Value { name, .. } | Attribute::Toggle { name, .. } => list.entry(name),
                Attribute::Listener { event, .. } => list.entry(&format_args!("on:{event}")),
            };
        }
        list.finish()
    }
}

/// Create a `name` element, apply `attributes`, build `children` into it and
/// emit it. Returns the element's platform node.
pub fn tag(scope: &Html, name: &str, attributes: Attributes, children: impl FnOnce(&Html)) -> NodeId {
    let node = dom::create_element(name);
    let element = Html::owned_tag(node, scope.contexts().clone());

    for attribute in attributes.entries {
        // Released with the last handle, even if never mounted
        let owner = element.downgrade();
        match attribute {
            Attribute::Value { name, value } => {
                let subscription = value.subscribe(move |value: &Option<String>| {
                    if owner.upgrade().is_some() {
                        dom::set_attribute(node, &name, value.as_deref());
                    }
                });
                follow_lifecycle(&element, subscription);
            }
            Attribute::Toggle { name, on } => {
                let subscription = on.subscribe(move |&on| {
                    if owner.upgrade().is_some() {
                        dom::set_attribute(node, &name, on.then_some(""));
                    }
                });
                follow_lifecycle(&element, subscription);
            }
            Attribute::Listener {
                event,
                options,
                handler,
            } => listen_while_mounted(&element, node, event, options, handler),
        }
    }

    children(&element);
    scope.emit(element);
    node
}

fn listen_while_mounted(
    element: &Html,
    node: NodeId,
    event: String,
    options: ListenerOptions,
    handler: EventHandler,
) {
    let active: Rc<Cell<Option<ListenerId>>> = Rc::default();

    let active_on_mount = active.clone();
    element.on_mount(move || {
        if active_on_mount.get().is_some() {
            return;
        }
        let handler = handler.clone();
        let listener = dom::listen(node, &event, options, move |event| handler(event));
        active_on_mount.set(Some(listener));
    });

    element.on_unmount(move || {
        if let Some(listener) = active.take() {
            dom::unlisten(node, listener);
        }
    });
}
