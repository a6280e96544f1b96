//! Control Flow Primitives - Dynamic, list and conditional rendering.
//!
//! - [`dynamic`] - rebuild a subtree on every value of a signal
//! - [`each`] - render a reactive list, patched per mutation
//! - [`when`] - toggle between two prebuilt branches
//!
//! # Pattern: Holder Fragment
//!
//! Every primitive emits one *holder* fragment into the calling scope and
//! only ever changes the holder's children. The holder's marker keeps the
//! primitive's place in the document, even while it renders nothing.
//!
//! # Pattern: Lifecycle-bound Subscriptions
//!
//! The subscription driving a holder pauses when the holder unmounts and
//! resumes when it mounts again. Values written while unmounted are not
//! replayed on resume.
//!
//! ```ignore
//! let shown = signal(false);
//! when(scope, &shown, Some(|scope: &Html| { text(scope, "hidden"); }), |scope| {
//!     text(scope, "visible");
//! });
//! shown.set(true); // "hidden" unmounted, "visible" mounted
//! ```

use std::cell::Cell;

use super::follow_lifecycle;
use crate::engine::Html;
use crate::signals::{ReactiveList, Signal};

// =============================================================================
// dynamic() - Rebuild on every value
// =============================================================================

/// Render `render(value)` into a fresh child scope for every value of
/// `signal`, including the current one.
///
/// The previous child is detached (and unmounted) before the next one is
/// built. No equality check: writing the same value rebuilds.
pub fn dynamic<T: 'static>(
    scope: &Html,
    signal: impl Into<Signal<T>>,
    render: impl Fn(&Html, &T) + 'static,
) {
    let holder = scope.new_fragment();
    let weak_holder = holder.downgrade();

    let subscription = signal.into().subscribe(move |value| {
        let Some(holder) = weak_holder.upgrade() else {
            return;
        };
        holder.clear();
        let child = holder.new_fragment();
        render(&child, value);
        holder.add(child);
    });

    follow_lifecycle(&holder, subscription);
    scope.emit(holder);
}

// =============================================================================
// each() - Reactive list rendering
// =============================================================================

/// Render every element of `list` into its own fragment, then keep the
/// rendered fragments in step with the list's mutations.
///
/// Elements are never re-rendered in place: `set_at` renders the new
/// element and replaces the old fragment.
pub fn each<E: Clone + 'static>(
    scope: &Html,
    list: impl Into<ReactiveList<E>>,
    render: impl Fn(&Html, &E) + 'static,
) {
    let list = list.into();
    let holder = scope.new_fragment();
    let contexts = scope.contexts().clone();

    let build = move |item: &E| {
        let item_scope = Html::fragment(contexts.clone());
        render(&item_scope, item);
        item_scope
    };

    list.for_each(|_, item| holder.add(build(item)));
    let subscription = list.mirror_into(&holder, build);

    follow_lifecycle(&holder, subscription);
    scope.emit(holder);
}

// =============================================================================
// when() - Conditional rendering
// =============================================================================

/// Show `children` while `condition` is true and `fallback` (if any) while
/// it is false.
///
/// Both branches are built once, up front. Flipping the condition attaches
/// and detaches them, so their mount and unmount hooks fire on every flip.
/// Writing the value already shown does nothing.
///
/// Pass `None::<fn(&Html)>` for no fallback.
pub fn when<F>(
    scope: &Html,
    condition: impl Into<Signal<bool>>,
    fallback: Option<F>,
    children: impl FnOnce(&Html),
) where
    F: FnOnce(&Html),
{
    let holder = scope.new_fragment();

    let shown_branch = scope.new_fragment();
    children(&shown_branch);
    let fallback_branch = fallback.map(|fallback| {
        let branch = scope.new_fragment();
        fallback(&branch);
        branch
    });

    let visible: Cell<Option<bool>> = Cell::new(None);
    let weak_holder = holder.downgrade();

    let subscription = condition.into().subscribe(move |&shown| {
        // Skip if condition unchanged
        if visible.get() == Some(shown) {
            return;
        }
        visible.set(Some(shown));

        let Some(holder) = weak_holder.upgrade() else {
            return;
        };
        if shown {
            holder.add(shown_branch.clone());
            if let Some(branch) = &fallback_branch {
                branch.remove_from_parent();
            }
        } else {
            shown_branch.remove_from_parent();
            if let Some(branch) = &fallback_branch {
                holder.add(branch.clone());
            }
        }
    });

    follow_lifecycle(&holder, subscription);
    scope.emit(holder);
}
