//! Pipeline - Mounting trees and runtime settings.
//!
//! # Flow
//!
//! ```text
//! mount(target, children)
//!   → root Tag(target) → content Fragment → children(&content)
//!   → emit into root (platform nodes inserted)
//!   → mount cascade (hooks fire, subscriptions resume)
//! ```
//!
//! After this, signal writes patch the document directly.

pub mod config;
pub mod mount;

// Re-exports
pub use config::{marker_kind, marker_kind_signal, reset_config, set_marker_kind};
pub use mount::{MountHandle, mount, mount_to_body};
