//! Reactive Values - Signals, lists and their subscriptions.
//!
//! - [`Signal`] / [`MutableSignal`] - observable single value
//! - [`ReactiveList`] / [`MutableReactiveList`] - observable ordered collection
//! - [`Subscription`] - pause/resume handle returned by both
//!
//! # Push, Not Pull
//!
//! Nothing here tracks dependencies or schedules work. A write walks the
//! owner's active set and calls every callback before returning:
//!
//! ```text
//! count.set(2) ──▶ subscriber A(2) ──▶ subscriber B(2) ──▶ return
//!                       │
//!                       └─ other.set(x) ──▶ other's subscribers ──▶ back to A
//! ```

mod list;
mod signal;
mod subscription;

pub use list::{MutableReactiveList, ReactiveList, reactive_list};
pub use signal::{MutableSignal, Signal, just, signal};
pub use subscription::{Subscription, SubscriptionId, SubscriptionState};
