//! Subscription - A pause/resume handle for a registered callback.
//!
//! Every `subscribe` and `mirror_into` call returns a [`Subscription`]. The
//! handle does not own the callback's lifetime: dropping it leaves the
//! callback registered. Instead, writing its `canceled` flag moves the
//! captured callback in and out of the owner's active set:
//!
//! ```text
//!            set_canceled(true)
//!   Active ──────────────────────▶ Paused
//!      ▲     (deregister)              │
//!      │                               │
//!      └───────────────────────────────┘
//!            set_canceled(false)
//!            (register, no replay)
//! ```
//!
//! Writing the flag it already holds does nothing. Subscriptions to a
//! constant signal are [`SubscriptionState::Inert`]: they report canceled
//! and ignore every write.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Identity
// =============================================================================

/// Stable key of a subscription inside its owner's active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Per-owner id allocator.
#[derive(Debug, Default)]
pub(crate) struct IdCounter(Cell<u64>);

impl IdCounter {
    pub(crate) fn next(&self) -> SubscriptionId {
        let id = self.0.get();
        self.0.set(id + 1);
        SubscriptionId(id)
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Transition actions of the subscription state machine.
///
/// Implemented by each owner kind (signal source, list mirror). Both
/// actions must be cheap and must not call user code.
pub(crate) trait Registration {
    /// Put the captured callback into the owner's active set.
    fn register(&self);
    /// Take the captured callback out of the owner's active set.
    fn deregister(&self);
}

/// Current state of a [`Subscription`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Registered; receives every change.
    Active,
    /// Deregistered; the callback is kept for a later resume.
    Paused,
    /// No backing change stream. Always reports canceled.
    Inert,
}

// =============================================================================
// Subscription
// =============================================================================

/// Togglable handle controlling whether a captured callback is registered.
///
/// Clones share state: pausing one clone pauses them all.
#[derive(Clone)]
pub struct Subscription(Rc<SubscriptionInner>);

struct SubscriptionInner {
    state: Cell<SubscriptionState>,
    registration: Option<Box<dyn Registration>>,
}

impl Subscription {
    /// Create a subscription and register it right away.
    pub(crate) fn active(registration: impl Registration + 'static) -> Self {
        let subscription = Self(Rc::new(SubscriptionInner {
            state: Cell::new(SubscriptionState::Paused),
            registration: Some(Box::new(registration)),
        }));
        subscription.set_canceled(false);
        subscription
    }

    /// A subscription with nothing behind it.
    pub(crate) fn inert() -> Self {
        Self(Rc::new(SubscriptionInner {
            state: Cell::new(SubscriptionState::Inert),
            registration: None,
        }))
    }

    /// Current state.
    pub fn state(&self) -> SubscriptionState {
        self.0.state.get()
    }

    /// Whether the callback is currently not receiving values.
    pub fn is_canceled(&self) -> bool {
        self.state() != SubscriptionState::Active
    }

    /// Write the canceled flag.
    ///
    /// `true` on an active subscription deregisters it, `false` on a paused
    /// one registers it again. Resuming does not replay the current value.
    pub fn set_canceled(&self, canceled: bool) {
        let Some(registration) = self.0.registration.as_ref() else {
            return;
        };

        match (self.state(), canceled) {
            (SubscriptionState::Active, true) => {
                self.0.state.set(SubscriptionState::Paused);
                registration.deregister();
                tracing::trace!("subscription paused");
            }
            (SubscriptionState::Paused, false) => {
                self.0.state.set(SubscriptionState::Active);
                registration.register();
                tracing::trace!("subscription resumed");
            }
            _ => {}
        }
    }

    /// Shorthand for `set_canceled(true)`.
    pub fn pause(&self) {
        self.set_canceled(true);
    }

    /// Shorthand for `set_canceled(false)`.
    pub fn resume(&self) {
        self.set_canceled(false);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts transition actions.
    struct Counting(Rc<Cell<(u32, u32)>>);

    impl Registration for Counting {
        fn register(&self) {
            let (r, d) = self.0.get();
            self.0.set((r + 1, d));
        }

        fn deregister(&self) {
            let (r, d) = self.0.get();
            self.0.set((r, d + 1));
        }
    }

    #[test]
    fn test_new_subscription_is_registered_once() {
        let counts = Rc::new(Cell::new((0, 0)));
        let subscription = Subscription::active(Counting(counts.clone()));

        assert_eq!(subscription.state(), SubscriptionState::Active);
        assert!(!subscription.is_canceled());
        assert_eq!(counts.get(), (1, 0));
    }

    #[test]
    fn test_same_value_write_is_noop() {
        let counts = Rc::new(Cell::new((0, 0)));
        let subscription = Subscription::active(Counting(counts.clone()));

        subscription.set_canceled(false);
        assert_eq!(counts.get(), (1, 0), "already active");

        subscription.set_canceled(true);
        subscription.set_canceled(true);
        assert_eq!(counts.get(), (1, 1), "second pause must not deregister again");
    }

    #[test]
    fn test_toggle_many_times() {
        let counts = Rc::new(Cell::new((0, 0)));
        let subscription = Subscription::active(Counting(counts.clone()));

        for _ in 0..5 {
            subscription.pause();
            subscription.resume();
        }

        assert_eq!(counts.get(), (6, 5));
        assert_eq!(subscription.state(), SubscriptionState::Active);
    }

    #[test]
    fn test_clones_share_state() {
        let counts = Rc::new(Cell::new((0, 0)));
        let subscription = Subscription::active(Counting(counts.clone()));
        let other = subscription.clone();

        other.pause();
        assert!(subscription.is_canceled());
        subscription.pause();
        assert_eq!(counts.get(), (1, 1));
    }

    #[test]
    fn test_inert_ignores_writes() {
        let subscription = Subscription::inert();
        assert!(subscription.is_canceled());

        subscription.set_canceled(false);
        assert_eq!(subscription.state(), SubscriptionState::Inert);
        assert!(subscription.is_canceled());
    }

    #[test]
    fn test_id_counter_is_monotonic() {
        let counter = IdCounter::default();
        assert_eq!(counter.next(), SubscriptionId(0));
        assert_eq!(counter.next(), SubscriptionId(1));
    }
}
