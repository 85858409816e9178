//! Public event vocabulary.
//!
//! Every event the client publishes has an [`EventName`] from a closed set
//! and an [`Event`] value carrying the typed payload. Handlers register by
//! name on the [`crate::EventDispatcher`] and receive the [`Event`].

use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    contact::{Contact, ContactEvent, ContactId, ContactProperty, Group},
    conversation::Conversation,
    error::ClientError,
    router,
    state::{ClientState, OimState},
};

/// Name of a public event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    /// `on_client_state_changed`
    ClientStateChanged,
    /// `on_client_error`
    ClientError,
    /// `on_invite_conversation`
    InviteConversation,
    /// `on_contact_presence_changed`
    ContactPresenceChanged,
    /// `on_contact_display_name_changed`
    ContactDisplayNameChanged,
    /// `on_contact_personal_message_changed`
    ContactPersonalMessageChanged,
    /// `on_contact_current_media_changed`
    ContactCurrentMediaChanged,
    /// `on_contact_msn_object_changed`
    ContactMsnObjectChanged,
    /// `on_contact_client_capabilities_changed`
    ContactClientCapabilitiesChanged,
    /// `on_contact_infos_changed`
    ContactInfosChanged,
    /// `on_addressbook_new_pending_contact`
    AddressBookNewPendingContact,
    /// `on_addressbook_messenger_contact_added`
    AddressBookMessengerContactAdded,
    /// `on_addressbook_contact_deleted`
    AddressBookContactDeleted,
    /// `on_addressbook_contact_blocked`
    AddressBookContactBlocked,
    /// `on_addressbook_contact_unblocked`
    AddressBookContactUnblocked,
    /// `on_addressbook_group_added`
    AddressBookGroupAdded,
    /// `on_addressbook_group_deleted`
    AddressBookGroupDeleted,
    /// `on_addressbook_group_renamed`
    AddressBookGroupRenamed,
    /// `on_addressbook_group_contact_added`
    AddressBookGroupContactAdded,
    /// `on_addressbook_group_contact_deleted`
    AddressBookGroupContactDeleted,
    /// `on_oim_state_changed`
    OimStateChanged,
    /// `on_oim_messages_received`
    OimMessagesReceived,
    /// `on_oim_messages_fetched`
    OimMessagesFetched,
    /// `on_oim_message_sent`
    OimMessageSent,
    /// `on_oim_messages_deleted`
    OimMessagesDeleted,
}

impl EventName {
    /// The full vocabulary.
    pub const ALL: [Self; 25] = [
        Self::ClientStateChanged,
        Self::ClientError,
        Self::InviteConversation,
        Self::ContactPresenceChanged,
        Self::ContactDisplayNameChanged,
        Self::ContactPersonalMessageChanged,
        Self::ContactCurrentMediaChanged,
        Self::ContactMsnObjectChanged,
        Self::ContactClientCapabilitiesChanged,
        Self::ContactInfosChanged,
        Self::AddressBookNewPendingContact,
        Self::AddressBookMessengerContactAdded,
        Self::AddressBookContactDeleted,
        Self::AddressBookContactBlocked,
        Self::AddressBookContactUnblocked,
        Self::AddressBookGroupAdded,
        Self::AddressBookGroupDeleted,
        Self::AddressBookGroupRenamed,
        Self::AddressBookGroupContactAdded,
        Self::AddressBookGroupContactDeleted,
        Self::OimStateChanged,
        Self::OimMessagesReceived,
        Self::OimMessagesFetched,
        Self::OimMessageSent,
        Self::OimMessagesDeleted,
    ];

    /// Handler-facing event name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientStateChanged => "on_client_state_changed",
            Self::ClientError => "on_client_error",
            Self::InviteConversation => "on_invite_conversation",
            Self::ContactPresenceChanged => "on_contact_presence_changed",
            Self::ContactDisplayNameChanged => "on_contact_display_name_changed",
            Self::ContactPersonalMessageChanged => "on_contact_personal_message_changed",
            Self::ContactCurrentMediaChanged => "on_contact_current_media_changed",
            Self::ContactMsnObjectChanged => "on_contact_msn_object_changed",
            Self::ContactClientCapabilitiesChanged => "on_contact_client_capabilities_changed",
            Self::ContactInfosChanged => "on_contact_infos_changed",
            Self::AddressBookNewPendingContact => "on_addressbook_new_pending_contact",
            Self::AddressBookMessengerContactAdded => "on_addressbook_messenger_contact_added",
            Self::AddressBookContactDeleted => "on_addressbook_contact_deleted",
            Self::AddressBookContactBlocked => "on_addressbook_contact_blocked",
            Self::AddressBookContactUnblocked => "on_addressbook_contact_unblocked",
            Self::AddressBookGroupAdded => "on_addressbook_group_added",
            Self::AddressBookGroupDeleted => "on_addressbook_group_deleted",
            Self::AddressBookGroupRenamed => "on_addressbook_group_renamed",
            Self::AddressBookGroupContactAdded => "on_addressbook_group_contact_added",
            Self::AddressBookGroupContactDeleted => "on_addressbook_group_contact_deleted",
            Self::OimStateChanged => "on_oim_state_changed",
            Self::OimMessagesReceived => "on_oim_messages_received",
            Self::OimMessagesFetched => "on_oim_messages_fetched",
            Self::OimMessageSent => "on_oim_message_sent",
            Self::OimMessagesDeleted => "on_oim_messages_deleted",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ClientError::UnknownEvent(s.to_string()))
    }
}

/// Reason attached to an authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthenticationError {
    /// The server rejected the account or password.
    InvalidUsernameOrPassword,
}

/// Error payload of `on_client_error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Transport failed to connect or lost the connection.
    Network {
        /// Transport-supplied reason.
        reason: String,
    },
    /// Authentication was rejected.
    Authentication(AuthenticationError),
    /// Address-book service failure.
    AddressBook {
        /// Service error code.
        code: String,
    },
    /// Offline-message service failure.
    OfflineMessages {
        /// Service error code.
        code: String,
    },
}

/// Offline message snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineMessage {
    /// Mailbox identifier.
    pub id: String,
    /// Sender (or recipient, for sent messages).
    pub peer: ContactId,
    /// Message text.
    pub text: String,
}

/// Address-book lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressBookEvent {
    /// A contact asked to add us.
    NewPendingContact(Contact),
    /// A messenger contact was added.
    MessengerContactAdded(Contact),
    /// A contact was deleted.
    ContactDeleted(Contact),
    /// A contact was blocked.
    ContactBlocked(Contact),
    /// A contact was unblocked.
    ContactUnblocked(Contact),
    /// A group was created.
    GroupAdded(Group),
    /// A group was deleted.
    GroupDeleted(Group),
    /// A group was renamed.
    GroupRenamed(Group),
    /// A contact joined a group.
    GroupContactAdded(Group, Contact),
    /// A contact left a group.
    GroupContactDeleted(Group, Contact),
}

impl AddressBookEvent {
    /// Signal name as emitted by the address book.
    pub fn signal_name(&self) -> &'static str {
        match self {
            Self::NewPendingContact(_) => "new-pending-contact",
            Self::MessengerContactAdded(_) => "messenger-contact-added",
            Self::ContactDeleted(_) => "contact-deleted",
            Self::ContactBlocked(_) => "contact-blocked",
            Self::ContactUnblocked(_) => "contact-unblocked",
            Self::GroupAdded(_) => "group-added",
            Self::GroupDeleted(_) => "group-deleted",
            Self::GroupRenamed(_) => "group-renamed",
            Self::GroupContactAdded(..) => "group-contact-added",
            Self::GroupContactDeleted(..) => "group-contact-deleted",
        }
    }

    /// Public event name for this address-book event.
    pub fn event_name(&self) -> EventName {
        match self {
            Self::NewPendingContact(_) => EventName::AddressBookNewPendingContact,
            Self::MessengerContactAdded(_) => EventName::AddressBookMessengerContactAdded,
            Self::ContactDeleted(_) => EventName::AddressBookContactDeleted,
            Self::ContactBlocked(_) => EventName::AddressBookContactBlocked,
            Self::ContactUnblocked(_) => EventName::AddressBookContactUnblocked,
            Self::GroupAdded(_) => EventName::AddressBookGroupAdded,
            Self::GroupDeleted(_) => EventName::AddressBookGroupDeleted,
            Self::GroupRenamed(_) => EventName::AddressBookGroupRenamed,
            Self::GroupContactAdded(..) => EventName::AddressBookGroupContactAdded,
            Self::GroupContactDeleted(..) => EventName::AddressBookGroupContactDeleted,
        }
    }
}

/// Offline-message box lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OimEvent {
    /// New offline messages are waiting.
    MessagesReceived(Vec<OfflineMessage>),
    /// Message bodies were fetched.
    MessagesFetched(Vec<OfflineMessage>),
    /// An offline message was sent.
    MessageSent(OfflineMessage),
    /// Messages were deleted from the mailbox.
    MessagesDeleted(Vec<OfflineMessage>),
}

impl OimEvent {
    /// Signal name as emitted by the offline-message box.
    pub fn signal_name(&self) -> &'static str {
        match self {
            Self::MessagesReceived(_) => "messages-received",
            Self::MessagesFetched(_) => "messages-fetched",
            Self::MessageSent(_) => "message-sent",
            Self::MessagesDeleted(_) => "messages-deleted",
        }
    }

    /// Public event name for this offline-message event.
    pub fn event_name(&self) -> EventName {
        match self {
            Self::MessagesReceived(_) => EventName::OimMessagesReceived,
            Self::MessagesFetched(_) => EventName::OimMessagesFetched,
            Self::MessageSent(_) => EventName::OimMessageSent,
            Self::MessagesDeleted(_) => EventName::OimMessagesDeleted,
        }
    }
}

/// Event published to application handlers.
#[derive(Debug, Clone)]
pub enum Event {
    /// Overall client state changed.
    ClientStateChanged(ClientState),
    /// A subsystem failed.
    ClientError(ClientErrorKind),
    /// A conversation is available to the application.
    InviteConversation(Arc<Conversation>),
    /// A subscribed contact property changed.
    ContactPropertyChanged {
        /// Property that changed.
        property: ContactProperty,
        /// Contact after the change.
        contact: Contact,
    },
    /// A subscribed contact emitted a named event. The payload is passed
    /// through unchanged.
    Contact(ContactEvent),
    /// Address-book lifecycle event.
    AddressBook(AddressBookEvent),
    /// Offline-message box state changed.
    OimStateChanged(OimState),
    /// Offline-message box lifecycle event.
    Oim(OimEvent),
}

impl Event {
    /// Name handlers register for to receive this event.
    pub fn name(&self) -> EventName {
        match self {
            Self::ClientStateChanged(_) => EventName::ClientStateChanged,
            Self::ClientError(_) => EventName::ClientError,
            Self::InviteConversation(_) => EventName::InviteConversation,
            Self::ContactPropertyChanged { property, .. } => router::property_event(*property),
            Self::Contact(event) => router::contact_event(event),
            Self::AddressBook(event) => event.event_name(),
            Self::OimStateChanged(_) => EventName::OimStateChanged,
            Self::Oim(event) => event.event_name(),
        }
    }
}
