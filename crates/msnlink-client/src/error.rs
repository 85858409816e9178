//! Error types returned to callers.
//!
//! Runtime failures of collaborators are not errors here: they are published
//! once as [`crate::Event::ClientError`]. [`ClientError`] is reserved for
//! caller contract violations and API misuse, which must fail loudly.

use thiserror::Error;

use crate::state::ClientState;

/// Errors returned by client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Operation is not allowed in the current state
    #[error("precondition failed: cannot {operation} while {state}")]
    Precondition {
        /// Current state when the operation was attempted
        state: ClientState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// The client owning the inbox has been dropped
    #[error("client inbox closed")]
    InboxClosed,

    /// Event name outside the public vocabulary
    #[error("unknown event name: {0}")]
    UnknownEvent(String),
}

impl ClientError {
    /// Returns true if this error reports a caller contract violation rather
    /// than a condition the caller can wait out.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Precondition { .. } | Self::UnknownEvent(_))
    }
}
