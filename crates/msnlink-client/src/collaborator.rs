//! Collaborator traits.
//!
//! The client never performs I/O. Outbound requests go through these traits;
//! results come back as [`crate::ClientSignal`]s. Each frontend implements
//! them against its own network stack, and the simulation harness implements
//! them with recording fakes so the same client code runs in both.

use crate::{
    config::{Credentials, ProxyConfig},
    contact::Contact,
    state::{OimState, ProtocolState},
};

/// Connection to the notification server.
pub trait Transport {
    /// Start connecting. Completion is reported as
    /// [`crate::TransportSignal::ConnectionSuccess`] or
    /// [`crate::TransportSignal::ConnectionFailure`].
    fn establish_connection(&mut self);

    /// Drop the connection. Completion is reported as
    /// [`crate::TransportSignal::ConnectionLost`].
    fn lose_connection(&mut self);
}

/// Notification protocol driving authentication and roster sync.
pub trait NotificationProtocol {
    /// Current protocol state.
    fn state(&self) -> ProtocolState;

    /// Send the sign-off command.
    fn sign_off(&mut self);
}

/// Manager of switchboard (conversation channel) sessions.
pub trait SwitchboardManager {
    /// Close every switchboard session.
    fn close(&mut self);
}

/// Address-book service.
pub trait AddressBook {
    /// Snapshot of all known contacts.
    fn contacts(&self) -> Vec<Contact>;
}

/// Offline-message service.
pub trait OfflineMessageBox {
    /// Current mailbox state.
    fn state(&self) -> OimState;
}

/// Family of collaborators the client is built against.
///
/// The service factories are called once per successful transport
/// connection, in declaration order, before `CONNECTED` is published.
pub trait Backend {
    /// Transport implementation.
    type Transport: Transport;
    /// Notification protocol implementation.
    type Protocol: NotificationProtocol;
    /// Switchboard manager implementation.
    type Switchboards: SwitchboardManager;
    /// Single sign-on token service.
    type SingleSignOn;
    /// Address-book service.
    type AddressBook: AddressBook;
    /// Offline-message service.
    type OfflineMessages: OfflineMessageBox;
    /// Spaces (profile) service.
    type Spaces;

    /// Create the single sign-on service for an account.
    fn single_sign_on(
        &mut self,
        credentials: &Credentials,
        proxies: &ProxyConfig,
    ) -> Self::SingleSignOn;

    /// Create the address-book service.
    fn address_book(&mut self, sso: &Self::SingleSignOn, proxies: &ProxyConfig)
    -> Self::AddressBook;

    /// Create the offline-message service.
    fn offline_messages(
        &mut self,
        sso: &Self::SingleSignOn,
        proxies: &ProxyConfig,
    ) -> Self::OfflineMessages;

    /// Create the spaces service.
    fn spaces(&mut self, sso: &Self::SingleSignOn, proxies: &ProxyConfig) -> Self::Spaces;
}

/// Long-lived collaborators handed to [`crate::Client::new`].
pub struct Collaborators<B: Backend> {
    /// Notification server transport.
    pub transport: B::Transport,
    /// Notification protocol.
    pub protocol: B::Protocol,
    /// Switchboard manager.
    pub switchboards: B::Switchboards,
}

/// Services created after the transport connects.
pub struct Services<B: Backend> {
    /// Single sign-on.
    pub sso: B::SingleSignOn,
    /// Address book.
    pub address_book: B::AddressBook,
    /// Offline messages.
    pub offline_messages: B::OfflineMessages,
    /// Spaces.
    pub spaces: B::Spaces,
}

impl<B: Backend> Services<B> {
    /// Build every service for a freshly connected session.
    pub fn create(backend: &mut B, credentials: &Credentials, proxies: &ProxyConfig) -> Self {
        let sso = backend.single_sign_on(credentials, proxies);
        let address_book = backend.address_book(&sso, proxies);
        let offline_messages = backend.offline_messages(&sso, proxies);
        let spaces = backend.spaces(&sso, proxies);
        Self { sso, address_book, offline_messages, spaces }
    }
}
