//! Error types for the editing engine.

use crate::dom::NodeId;
use thiserror::Error;

/// Result type alias for editor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for editor operations.
///
/// Missing selections, undo past the end of history and deferred callbacks
/// that find their node detached are normal negative cases and are reported
/// through `Option`/`bool`, never through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// An editor API was called after [`Editor::dispose`](crate::Editor::dispose).
    #[error("editor has been disposed")]
    Disposed,
    /// Malformed HTML handed to the parser.
    #[error("invalid html at byte {position}: {reason}")]
    InvalidHtml { position: usize, reason: String },
    /// A node id that is stale or was never allocated.
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),
    /// A snapshot selection path does not resolve against the current DOM.
    #[error("snapshot selection path cannot be resolved")]
    InvalidSnapshotPath,
    /// Model (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A plugin reported a failure.
    #[error("plugin {plugin} failed: {message}")]
    Plugin { plugin: String, message: String },
}

impl Error {
    /// Shorthand for a plugin failure.
    #[must_use]
    pub fn plugin(plugin: &str, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }
}
