//! Error taxonomy for board mutation and event reconciliation.
//!
//! None of these are fatal to a session: the event dispatcher logs the
//! error, drops the offending event and keeps going. Recovery from a drop
//! is a later corrective event (typically a full board setup), not a retry.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while reconciling server events into local board state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncError {
    /// An event referenced a layer name not present on this board.
    #[error("unknown layer '{0}'")]
    UnknownLayer(String),

    /// A move/update referenced a shape UUID that is not registered.
    #[error("unknown shape {0}")]
    UnknownShape(Uuid),

    /// A layer with this name already exists on the board.
    #[error("duplicate layer '{0}'")]
    DuplicateLayer(String),
}
