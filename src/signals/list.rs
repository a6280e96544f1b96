//! ReactiveList - An observable ordered collection.
//!
//! A list does not notify subscribers with values. It replays its own
//! structural mutations onto *mirrors*: each mirror is a target [`Html`]
//! fragment plus a renderer, and every `insert_at` / `remove_at` / `set_at`
//! on the list performs the same index operation on every active mirror's
//! target.
//!
//! ```text
//! list.insert_at(1, c)
//!   items:   [a, b]      → [a, c, b]
//!   mirror:  [A, B, ⚓]  → [A, render(c), B, ⚓]
//! ```
//!
//! A mirror only sees mutations made after it was registered. Targets are
//! expected to start out holding one child per element (the `each`
//! primitive arranges this).

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::subscription::{IdCounter, Registration, Subscription, SubscriptionId};
use crate::engine::{Html, WeakHtml};

/// Renders one list element into a node.
type Renderer<E> = Rc<dyn Fn(&E) -> Html>;

struct Mirror<E> {
    /// Weak: the target's own lifecycle hooks own this mirror's subscription.
    target: WeakHtml,
    render: Renderer<E>,
}

struct ListInner<E> {
    items: RefCell<Vec<E>>,
    mirrors: RefCell<IndexMap<SubscriptionId, Rc<Mirror<E>>>>,
    ids: IdCounter,
}

impl<E> ListInner<E> {
    /// Run `apply` against every active mirror's target.
    ///
    /// Works on a snapshot, so renderers may run user code. A mirror paused
    /// by an earlier one during the same mutation is skipped.
    fn replay(&self, mut apply: impl FnMut(&Html, &Mirror<E>)) {
        let mirrors: SmallVec<[(SubscriptionId, Rc<Mirror<E>>); 2]> = self
            .mirrors
            .borrow()
            .iter()
            .map(|(id, mirror)| (*id, Rc::clone(mirror)))
            .collect();

        for (id, mirror) in mirrors {
            if !self.mirrors.borrow().contains_key(&id) {
                continue;
            }
            if let Some(target) = mirror.target.upgrade() {
                apply(&target, &mirror);
            }
        }
    }
}

struct MirrorRegistration<E> {
    id: SubscriptionId,
    list: Weak<ListInner<E>>,
    mirror: Rc<Mirror<E>>,
}

impl<E> Registration for MirrorRegistration<E> {
    fn register(&self) {
        if let Some(list) = self.list.upgrade() {
            list.mirrors
                .borrow_mut()
                .insert(self.id, Rc::clone(&self.mirror));
        }
    }

    fn deregister(&self) {
        if let Some(list) = self.list.upgrade() {
            list.mirrors.borrow_mut().shift_remove(&self.id);
        }
    }
}

// =============================================================================
// ReactiveList - read side
// =============================================================================

/// Observable ordered collection. Clones share the same items.
pub struct ReactiveList<E: 'static> {
    inner: Rc<ListInner<E>>,
}

impl<E: Clone + 'static> ReactiveList<E> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, cloned.
    pub fn get(&self, index: usize) -> Option<E> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// All elements, cloned.
    pub fn to_vec(&self) -> Vec<E> {
        self.inner.items.borrow().clone()
    }

    /// Visit every element in order.
    ///
    /// Visits a snapshot: `f` may mutate the list.
    pub fn for_each(&self, mut f: impl FnMut(usize, &E)) {
        for (index, item) in self.to_vec().iter().enumerate() {
            f(index, item);
        }
    }

    /// Replay every future mutation onto `target`, rendering new elements
    /// with `render`.
    ///
    /// Existing elements are not rendered. The returned subscription pauses
    /// and resumes the mirror.
    pub fn mirror_into(&self, target: &Html, render: impl Fn(&E) -> Html + 'static) -> Subscription {
        let mirror = Rc::new(Mirror {
            target: target.downgrade(),
            render: Rc::new(render),
        });
        Subscription::active(MirrorRegistration {
            id: self.inner.ids.next(),
            list: Rc::downgrade(&self.inner),
            mirror,
        })
    }

    /// Number of currently active mirrors.
    pub fn mirror_count(&self) -> usize {
        self.inner.mirrors.borrow().len()
    }
}

impl<E: 'static> Clone for ReactiveList<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: fmt::Debug + 'static> fmt::Debug for ReactiveList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveList")
            .field("items", &*self.inner.items.borrow())
            .field("mirrors", &self.inner.mirrors.borrow().len())
            .finish()
    }
}

// =============================================================================
// MutableReactiveList - write side
// =============================================================================

/// A [`ReactiveList`] that can be mutated.
///
/// Index operations panic when out of bounds, like slice indexing.
pub struct MutableReactiveList<E: 'static> {
    list: ReactiveList<E>,
}

impl<E: Clone + 'static> MutableReactiveList<E> {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            list: ReactiveList {
                inner: Rc::new(ListInner {
                    items: RefCell::new(Vec::new()),
                    mirrors: RefCell::new(IndexMap::new()),
                    ids: IdCounter::default(),
                }),
            },
        }
    }

    /// Insert `item` at `index`, shifting later elements right.
    pub fn insert_at(&self, index: usize, item: E) {
        {
            let mut items = self.list.inner.items.borrow_mut();
            let len = items.len();
            assert!(
                index <= len,
                "insertion index (is {index}) should be <= len (is {len})"
            );
            items.insert(index, item.clone());
        }

        self.list.inner.replay(|target, mirror| {
            tracing::trace!(index, "mirror insert");
            target.insert(index, (mirror.render)(&item));
        });
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&self, index: usize) -> E {
        let removed = {
            let mut items = self.list.inner.items.borrow_mut();
            let len = items.len();
            assert!(index < len, "removal index (is {index}) should be < len (is {len})");
            items.remove(index)
        };

        self.list.inner.replay(|target, _| {
            tracing::trace!(index, "mirror remove");
            target.remove_at(index);
        });
        removed
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set_at(&self, index: usize, item: E) -> E {
        let previous = {
            let mut items = self.list.inner.items.borrow_mut();
            let len = items.len();
            assert!(index < len, "index (is {index}) should be < len (is {len})");
            std::mem::replace(&mut items[index], item.clone())
        };

        self.list.inner.replay(|target, mirror| {
            tracing::trace!(index, "mirror set");
            target.set(index, (mirror.render)(&item));
        });
        previous
    }

    /// Append `item`.
    pub fn push(&self, item: E) {
        self.insert_at(self.len(), item);
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<E> {
        let len = self.len();
        (len > 0).then(|| self.remove_at(len - 1))
    }

    /// Remove every element, last first.
    pub fn clear(&self) {
        while self.pop().is_some() {}
    }

    /// Append every item of `items`.
    pub fn extend(&self, items: impl IntoIterator<Item = E>) {
        for item in items {
            self.push(item);
        }
    }

    /// Read-only view of this list.
    pub fn list(&self) -> ReactiveList<E> {
        self.list.clone()
    }
}

impl<E: Clone + 'static> Default for MutableReactiveList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Deref for MutableReactiveList<E> {
    type Target = ReactiveList<E>;

    fn deref(&self) -> &ReactiveList<E> {
        &self.list
    }
}

impl<E: 'static> Clone for MutableReactiveList<E> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
        }
    }
}

impl<E: fmt::Debug + 'static> fmt::Debug for MutableReactiveList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.list.fmt(f)
    }
}

impl<E: 'static> From<MutableReactiveList<E>> for ReactiveList<E> {
    fn from(list: MutableReactiveList<E>) -> Self {
        list.list
    }
}

impl<E: 'static> From<&MutableReactiveList<E>> for ReactiveList<E> {
    fn from(list: &MutableReactiveList<E>) -> Self {
        list.list.clone()
    }
}

impl<E: 'static> From<&ReactiveList<E>> for ReactiveList<E> {
    fn from(list: &ReactiveList<E>) -> Self {
        list.clone()
    }
}

/// Create a mutable list holding `items`.
pub fn reactive_list<E: Clone + 'static>(items: impl IntoIterator<Item = E>) -> MutableReactiveList<E> {
    let list = MutableReactiveList::new();
    list.list.inner.items.borrow_mut().extend(items);
    list
}
