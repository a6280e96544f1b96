//! Signal - An observable single value.
//!
//! A [`Signal`] pushes every write to its subscribers, synchronously and in
//! registration order. There is no equality check: writing the same value
//! twice notifies twice. There is no scheduler either: a write nested inside
//! a notification is fully delivered before the outer write continues.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use spark_dom::signals::signal;
//!
//! let count = signal(1);
//! let doubled = count.map(|n| n * 2);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let seen_clone = seen.clone();
//! let _subscription = doubled.subscribe(move |n| seen_clone.borrow_mut().push(*n));
//!
//! count.set(5);
//! assert_eq!(*seen.borrow(), vec![2, 10]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::subscription::{IdCounter, Registration, Subscription, SubscriptionId};

/// Subscriber callback.
type Subscriber<T> = Rc<dyn Fn(&T)>;

// =============================================================================
// Source - shared state behind a mutable signal
// =============================================================================

pub(crate) struct Source<T> {
    /// Rc so the value can be handed to subscribers without holding a borrow.
    value: RefCell<Rc<T>>,
    subscribers: RefCell<IndexMap<SubscriptionId, Subscriber<T>>>,
    ids: IdCounter,
}

impl<T: 'static> Source<T> {
    fn new(value: T) -> Self {
        Self {
            value: RefCell::new(Rc::new(value)),
            subscribers: RefCell::new(IndexMap::new()),
            ids: IdCounter::default(),
        }
    }

    fn current(&self) -> Rc<T> {
        Rc::clone(&self.value.borrow())
    }

    fn set(&self, value: T) {
        *self.value.borrow_mut() = Rc::new(value);
        self.notify();
    }

    /// Deliver the current value to every active subscriber.
    ///
    /// Both the value and the subscriber list are snapshotted first, so
    /// subscribers may write this signal or toggle subscriptions. A panic
    /// in a subscriber leaves no borrow behind.
    ///
    /// A subscriber paused by an earlier one during this write is skipped.
    /// Subscribers registered during this write only get their replay.
    fn notify(&self) {
        let value = self.current();
        let subscribers: SmallVec<[(SubscriptionId, Subscriber<T>); 4]> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, subscriber)| (*id, Rc::clone(subscriber)))
            .collect();

        tracing::trace!(subscribers = subscribers.len(), "signal write");

        for (id, subscriber) in subscribers {
            if !self.subscribers.borrow().contains_key(&id) {
                continue;
            }
            subscriber(&value);
        }
    }

    /// Register a callback without replaying the current value.
    fn attach(self: &Rc<Self>, subscriber: Subscriber<T>) -> Subscription {
        Subscription::active(SourceRegistration {
            id: self.ids.next(),
            source: Rc::downgrade(self),
            subscriber,
        })
    }
}

/// Registration of one subscriber on a [`Source`].
///
/// Holds the source weakly: a subscription must not keep a dropped signal
/// alive.
struct SourceRegistration<T> {
    id: SubscriptionId,
    source: Weak<Source<T>>,
    subscriber: Subscriber<T>,
}

impl<T> Registration for SourceRegistration<T> {
    fn register(&self) {
        if let Some(source) = self.source.upgrade() {
            source
                .subscribers
                .borrow_mut()
                .insert(self.id, Rc::clone(&self.subscriber));
        }
    }

    fn deregister(&self) {
        if let Some(source) = self.source.upgrade() {
            source.subscribers.borrow_mut().shift_remove(&self.id);
        }
    }
}

// =============================================================================
// Signal - read side
// =============================================================================

/// Observable single value.
///
/// Either backed by a mutable source (see [`signal`]) or constant (see
/// [`just`]). Clones share the same value.
pub struct Signal<T: 'static> {
    kind: SignalKind<T>,
}

enum SignalKind<T> {
    Constant(Rc<T>),
    Source(Rc<Source<T>>),
}

impl<T: 'static> Signal<T> {
    /// Read the current value through a closure.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match &self.kind {
            SignalKind::Constant(value) => f(value),
            SignalKind::Source(source) => f(&source.current()),
        }
    }

    /// Current value, cloned.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Subscribe to this signal.
    ///
    /// `subscriber` is registered, then called once with the current value
    /// before this returns, then on every write until the subscription is
    /// paused.
    ///
    /// Registering first keeps an outer subscriber ahead of the subscribers
    /// its replay creates, so a write reaches the outer one first.
    pub fn subscribe(&self, subscriber: impl Fn(&T) + 'static) -> Subscription {
        match &self.kind {
            SignalKind::Constant(value) => {
                subscriber(value);
                Subscription::inert()
            }
            SignalKind::Source(source) => {
                let subscriber: Subscriber<T> = Rc::new(subscriber);
                let subscription = source.attach(Rc::clone(&subscriber));
                subscriber(&source.current());
                subscription
            }
        }
    }

    /// Derive a signal whose value is always `mapper(self.value)`.
    ///
    /// The derived signal is kept current by an internal subscription that
    /// is never paused. It can itself be subscribed to and mapped again.
    pub fn map<R: 'static>(&self, mapper: impl Fn(&T) -> R + 'static) -> Signal<R> {
        match &self.kind {
            SignalKind::Constant(value) => just(mapper(value)),
            SignalKind::Source(source) => {
                let mapped = Rc::new(Source::new(mapper(&source.current())));
                let target = Rc::clone(&mapped);
                // Handle dropped on purpose: the derived link is never paused.
                let _ = source.attach(Rc::new(move |value: &T| target.set(mapper(value))));
                Signal {
                    kind: SignalKind::Source(mapped),
                }
            }
        }
    }

    /// Whether this signal can never change.
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, SignalKind::Constant(_))
    }

    /// Number of currently active subscribers.
    pub fn subscriber_count(&self) -> usize {
        match &self.kind {
            SignalKind::Constant(_) => 0,
            SignalKind::Source(source) => source.subscribers.borrow().len(),
        }
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            SignalKind::Constant(value) => SignalKind::Constant(Rc::clone(value)),
            SignalKind::Source(source) => SignalKind::Source(Rc::clone(source)),
        };
        Self { kind }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| {
            f.debug_struct("Signal")
                .field("value", value)
                .field("constant", &self.is_constant())
                .finish()
        })
    }
}

// =============================================================================
// MutableSignal - write side
// =============================================================================

/// A [`Signal`] that can be written.
///
/// Derefs to [`Signal`], so every read operation is available directly.
pub struct MutableSignal<T: 'static> {
    source: Rc<Source<T>>,
    signal: Signal<T>,
}

impl<T: 'static> MutableSignal<T> {
    /// Write a new value and notify every active subscriber.
    pub fn set(&self, value: T) {
        self.source.set(value);
    }

    /// Mutate the value in place, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T))
    where
        T: Clone,
    {
        // Mutate a detached copy so `f` may read this signal.
        let mut value = self.source.current();
        f(Rc::make_mut(&mut value));
        *self.source.value.borrow_mut() = value;
        self.source.notify();
    }

    /// Write a new value, returning the previous one.
    pub fn replace(&self, value: T) -> T
    where
        T: Clone,
    {
        let previous = std::mem::replace(&mut *self.source.value.borrow_mut(), Rc::new(value));
        self.source.notify();
        Rc::try_unwrap(previous).unwrap_or_else(|shared| T::clone(&shared))
    }

    /// Read-only view of this signal.
    pub fn signal(&self) -> Signal<T> {
        self.signal.clone()
    }
}

impl<T: 'static> Deref for MutableSignal<T> {
    type Target = Signal<T>;

    fn deref(&self) -> &Signal<T> {
        &self.signal
    }
}

impl<T: 'static> Clone for MutableSignal<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            signal: self.signal.clone(),
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for MutableSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.signal.fmt(f)
    }
}

impl<T: 'static> From<MutableSignal<T>> for Signal<T> {
    fn from(signal: MutableSignal<T>) -> Self {
        signal.signal
    }
}

impl<T: 'static> From<&MutableSignal<T>> for Signal<T> {
    fn from(signal: &MutableSignal<T>) -> Self {
        signal.signal()
    }
}

impl<T: 'static> From<&Signal<T>> for Signal<T> {
    fn from(signal: &Signal<T>) -> Self {
        signal.clone()
    }
}

// =============================================================================
// Constructors
// =============================================================================

/// Create a mutable signal holding `initial`.
pub fn signal<T: 'static>(initial: T) -> MutableSignal<T> {
    let source = Rc::new(Source::new(initial));
    let signal = Signal {
        kind: SignalKind::Source(Rc::clone(&source)),
    };
    MutableSignal { source, signal }
}

/// Create a constant signal.
///
/// Subscribing replays the value once and returns an inert subscription.
pub fn just<T: 'static>(value: T) -> Signal<T> {
    Signal {
        kind: SignalKind::Constant(Rc::new(value)),
    }
}
