//! Inbound signals and commands.
//!
//! Collaborators report their results as [`ClientSignal`] values. The caller
//! (or an [`crate::Inbox`] holder) feeds them to [`crate::Client::handle`].
//! [`ClientCommand`]s are application intents posted through the inbox by
//! code that cannot borrow the client, such as event handlers.

use std::sync::Arc;

use crate::{
    config::Credentials,
    contact::{Contact, ContactEvent, ContactId, ContactProperty},
    conversation::{Conversation, InstantMessage},
    event::{AddressBookEvent, OimEvent},
};

/// Transport lifecycle signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    /// Connection established.
    ConnectionSuccess,
    /// Connection attempt failed.
    ConnectionFailure {
        /// Transport-supplied reason.
        reason: String,
    },
    /// Established connection dropped.
    ConnectionLost {
        /// Transport-supplied reason.
        reason: String,
    },
}

/// Notification protocol signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolSignal {
    /// Protocol state changed. The new state is read from the protocol.
    StateChanged,
    /// Message received outside any tracked switchboard session.
    UnmanagedMessage {
        /// Sender identity.
        sender: ContactId,
        /// Received message.
        message: InstantMessage,
    },
    /// Server rejected the credentials.
    AuthenticationFailed,
}

/// Handler created by the switchboard manager.
#[derive(Debug, Clone)]
pub enum SwitchboardHandler {
    /// A conversation handler.
    Conversation(Arc<Conversation>),
    /// A handler kind the client does not publish.
    Other {
        /// Handler type name, for logging.
        kind: String,
    },
}

/// Switchboard manager signal.
#[derive(Debug, Clone)]
pub enum SwitchboardSignal {
    /// A session handler was created.
    HandlerCreated(SwitchboardHandler),
}

/// Address-book signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressBookSignal {
    /// Service failure.
    Error {
        /// Service error code.
        code: String,
    },
    /// Lifecycle event.
    Event(AddressBookEvent),
}

/// Offline-message box signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OimSignal {
    /// Mailbox state changed. The new state is read from the mailbox.
    StateChanged,
    /// Service failure.
    Error {
        /// Service error code.
        code: String,
    },
    /// Lifecycle event.
    Event(OimEvent),
}

/// What a contact emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSignalKind {
    /// A property changed.
    PropertyChanged(ContactProperty),
    /// A named event fired.
    Event(ContactEvent),
}

/// Signal emitted by a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSignal {
    /// Contact snapshot after the change.
    pub contact: Contact,
    /// What happened.
    pub kind: ContactSignalKind,
}

impl ContactSignal {
    /// Property-change signal.
    pub fn property(contact: Contact, property: ContactProperty) -> Self {
        Self { contact, kind: ContactSignalKind::PropertyChanged(property) }
    }

    /// Named-event signal.
    pub fn event(contact: Contact, event: ContactEvent) -> Self {
        Self { contact, kind: ContactSignalKind::Event(event) }
    }
}

/// Signal from any collaborator.
#[derive(Debug, Clone)]
pub enum ClientSignal {
    /// From the transport.
    Transport(TransportSignal),
    /// From the notification protocol.
    Protocol(ProtocolSignal),
    /// From the switchboard manager.
    Switchboard(SwitchboardSignal),
    /// From the address book.
    AddressBook(AddressBookSignal),
    /// From the offline-message box.
    OfflineMessages(OimSignal),
    /// From a contact.
    Contact(ContactSignal),
}

impl From<TransportSignal> for ClientSignal {
    fn from(signal: TransportSignal) -> Self {
        Self::Transport(signal)
    }
}

impl From<ProtocolSignal> for ClientSignal {
    fn from(signal: ProtocolSignal) -> Self {
        Self::Protocol(signal)
    }
}

impl From<SwitchboardSignal> for ClientSignal {
    fn from(signal: SwitchboardSignal) -> Self {
        Self::Switchboard(signal)
    }
}

impl From<AddressBookSignal> for ClientSignal {
    fn from(signal: AddressBookSignal) -> Self {
        Self::AddressBook(signal)
    }
}

impl From<OimSignal> for ClientSignal {
    fn from(signal: OimSignal) -> Self {
        Self::OfflineMessages(signal)
    }
}

impl From<ContactSignal> for ClientSignal {
    fn from(signal: ContactSignal) -> Self {
        Self::Contact(signal)
    }
}

/// Application intent posted through the inbox.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    /// Sign in with the given credentials.
    Login(Credentials),
    /// Sign out.
    Logout,
    /// Retire an externally-initiated conversation.
    CloseConversation(Arc<Conversation>),
}

/// Unit of work processed by the client.
#[derive(Debug, Clone)]
pub(crate) enum Input {
    Signal(ClientSignal),
    Command(ClientCommand),
}
