//! # spark-dom
//!
//! Fine-grained reactive DOM rendering for Rust.
//!
//! Components are plain functions that run once and build a tree of live
//! nodes. When a signal changes, only the nodes that depend on it are
//! patched, synchronously, with no virtual DOM and no diffing.
//!
//! ## Architecture
//!
//! ```text
//! MutableSignal ──subscribe──▶ Subscription ──▶ dynamic / when / text / attributes
//! MutableReactiveList ──mirror_into──▶ Subscription ──▶ each
//!                                                     │
//!                                                     ▼
//!                               Html tree (Tag | Fragment + marker)
//!                                                     │
//!                                                     ▼
//!                                     installed Document (memory or web)
//! ```
//!
//! ## Example
//!
//! ```
//! use spark_dom::prelude::*;
//!
//! let count = signal(0);
//! let count_clone = count.clone();
//! let handle = mount_to_body(move |scope| {
//!     text(scope, "Count: ");
//!     dynamic_text(scope, &count_clone);
//! });
//!
//! count.set(3);
//! assert_eq!(dom::inner_html(dom::body()).unwrap(), "Count: 3");
//! handle.unmount();
//! ```
//!
//! ## Modules
//!
//! - [`signals`] - Signal, ReactiveList and Subscription
//! - [`engine`] - Html node tree, context chain
//! - [`primitives`] - text, tag, dynamic, each, when, portal
//! - [`pipeline`] - mounting and runtime settings
//! - [`dom`] - host document abstraction
//! - [`types`] - shared handles, flags and events

pub mod dom;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod signals;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use types::*;

pub use engine::{Contexts, Html, Nodes, WeakHtml};

pub use signals::{
    MutableReactiveList, MutableSignal, ReactiveList, Signal, Subscription, SubscriptionId,
    SubscriptionState, just, reactive_list, signal,
};

pub use pipeline::{
    MountHandle, marker_kind, marker_kind_signal, mount, mount_to_body, reset_config,
    set_marker_kind,
};

pub use primitives::{Attributes, dynamic, dynamic_text, each, portal, tag, text, when};

/// Everything a component module usually needs.
pub mod prelude {
    pub use crate::dom;
    pub use crate::engine::Html;
    pub use crate::pipeline::{MountHandle, mount, mount_to_body};
    pub use crate::primitives::{Attributes, dynamic, dynamic_text, each, portal, tag, text, when};
    pub use crate::signals::{
        MutableReactiveList, MutableSignal, ReactiveList, Signal, Subscription, just,
        reactive_list, signal,
    };
    pub use crate::types::{Event, ListenerOptions, NodeId};
}
