//! Runtime settings.
//!
//! Settings are per-thread signals, so tooling can observe changes.

use crate::signals::{MutableSignal, Signal, signal};
use crate::types::MarkerKind;

thread_local! {
    static MARKER_KIND: MutableSignal<MarkerKind> = signal(MarkerKind::default());
}

// =============================================================================
// Marker Kind
// =============================================================================

/// Platform node kind used for fragment markers created from now on.
pub fn marker_kind() -> MarkerKind {
    MARKER_KIND.with(|kind| kind.get())
}

/// Set the platform node kind for new fragment markers.
///
/// Existing markers keep their kind.
pub fn set_marker_kind(kind: MarkerKind) {
    MARKER_KIND.with(|current| current.set(kind));
}

/// Get the marker kind signal for reactive tracking.
pub fn marker_kind_signal() -> Signal<MarkerKind> {
    MARKER_KIND.with(|kind| kind.signal())
}

/// Restore every setting to its default (for testing).
pub fn reset_config() {
    set_marker_kind(MarkerKind::default());
}
