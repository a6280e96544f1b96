//! Error types.
//!
//! Only recoverable conditions are errors. Structural misuse (an index past
//! the end of a fragment or list) panics, the same way slice indexing does.

use thiserror::Error;

use crate::types::NodeId;

/// Errors returned by spark-dom.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No ancestor provided a context value of the requested type.
    #[error("{message}")]
    MissingContext {
        /// Name of the requested type.
        type_name: &'static str,
        /// Caller-supplied (or default) message.
        message: String,
    },

    /// The installed document does not know this node.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

/// Result alias for spark-dom operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
