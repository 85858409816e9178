//! Lifecycle state vocabularies.
//!
//! [`ClientState`] is the overall state owned by [`crate::Client`].
//! [`ProtocolState`] and [`OimState`] are read from the notification protocol
//! and offline-message collaborators and mirrored into client events.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐ login  ┌────────────┐ connected ┌───────────┐ protocol ┌────────────────┐
//! │ Closed │───────>│ Connecting │──────────>│ Connected │─────────>│ Authenticating │
//! └────────┘        └────────────┘           └───────────┘          └────────────────┘
//!     ^                                                                     │
//!     │ logout / connection lost / auth failure                             ↓
//! ┌────────┐       ┌──────────────┐       ┌───────────────┐       ┌───────────────┐
//! │  Open  │<──────│ Synchronized │<──────│ Synchronizing │<──────│ Authenticated │
//! └────────┘       └──────────────┘       └───────────────┘       └───────────────┘
//! ```

use std::fmt;

/// Overall client state.
///
/// Variants are declared in lifecycle order, so `Ord` reflects progress
/// through the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClientState {
    /// No connection.
    Closed,
    /// Transport connection requested.
    Connecting,
    /// Transport connected, collaborator services created.
    Connected,
    /// Notification protocol is authenticating.
    Authenticating,
    /// Credentials accepted.
    Authenticated,
    /// Contact list synchronization in progress.
    Synchronizing,
    /// Contact list synchronized.
    Synchronized,
    /// Fully signed in.
    Open,
}

impl ClientState {
    /// Every state in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Closed,
        Self::Connecting,
        Self::Connected,
        Self::Authenticating,
        Self::Authenticated,
        Self::Synchronizing,
        Self::Synchronized,
        Self::Open,
    ];

    /// State a protocol state change may advance from into `self`.
    ///
    /// `None` for states that are not reached through the notification
    /// protocol.
    pub fn protocol_predecessor(self) -> Option<Self> {
        match self {
            Self::Authenticating => Some(Self::Connected),
            Self::Authenticated => Some(Self::Authenticating),
            Self::Synchronizing => Some(Self::Authenticated),
            Self::Synchronized => Some(Self::Synchronizing),
            Self::Open => Some(Self::Synchronized),
            Self::Closed | Self::Connecting | Self::Connected => None,
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "CLOSED",
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Authenticating => "AUTHENTICATING",
            Self::Authenticated => "AUTHENTICATED",
            Self::Synchronizing => "SYNCHRONIZING",
            Self::Synchronized => "SYNCHRONIZED",
            Self::Open => "OPEN",
        };
        f.write_str(name)
    }
}

/// Notification protocol state, as exposed by the protocol collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    /// Protocol not running.
    Closed,
    /// Protocol negotiating its version.
    Opening,
    /// Authentication in progress.
    Authenticating,
    /// Authentication succeeded.
    Authenticated,
    /// Roster synchronization in progress.
    Synchronizing,
    /// Roster synchronized.
    Synchronized,
    /// Signed in.
    Open,
}

impl ProtocolState {
    /// Client state mirroring this protocol state. `None` if there is no
    /// client-level counterpart.
    pub fn client_state(self) -> Option<ClientState> {
        match self {
            Self::Authenticating => Some(ClientState::Authenticating),
            Self::Authenticated => Some(ClientState::Authenticated),
            Self::Synchronizing => Some(ClientState::Synchronizing),
            Self::Synchronized => Some(ClientState::Synchronized),
            Self::Open => Some(ClientState::Open),
            Self::Closed | Self::Opening => None,
        }
    }
}

/// Offline-message box state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OimState {
    /// Mailbox not fetched yet.
    NotSynchronized,
    /// Mailbox metadata being fetched.
    Synchronizing,
    /// Mailbox metadata up to date.
    Synchronized,
}
