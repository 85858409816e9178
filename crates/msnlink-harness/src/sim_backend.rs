//! In-memory collaborators.
//!
//! Every simulated collaborator shares one [`SimWorld`]. Tests set the
//! protocol state, mailbox state and address-book contents through it and
//! read back the ordered log of requests the client made.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use msnlink_client::{
    AddressBook, Backend, Client, ClientConfig, Collaborators, Contact, Credentials,
    NotificationProtocol, OfflineMessageBox, OimState, ProtocolState, ProxyConfig,
    SwitchboardManager, Transport,
};

/// Request made by the client to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `Transport::establish_connection`
    EstablishConnection,
    /// `Transport::lose_connection`
    LoseConnection,
    /// `NotificationProtocol::sign_off`
    SignOff,
    /// `SwitchboardManager::close`
    CloseSwitchboards,
    /// `Backend::single_sign_on`
    CreateSingleSignOn {
        /// Account the service was created for.
        account: String,
    },
    /// `Backend::address_book`
    CreateAddressBook,
    /// `Backend::offline_messages`
    CreateOfflineMessages,
    /// `Backend::spaces`
    CreateSpaces,
}

#[derive(Debug)]
struct WorldState {
    protocol_state: ProtocolState,
    oim_state: OimState,
    contacts: Vec<Contact>,
    calls: Vec<Call>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            protocol_state: ProtocolState::Closed,
            oim_state: OimState::NotSynchronized,
            contacts: Vec::new(),
            calls: Vec::new(),
        }
    }
}

/// Shared state behind the simulated collaborators.
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    state: Arc<Mutex<WorldState>>,
}

impl SimWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state the protocol reports.
    pub fn set_protocol_state(&self, state: ProtocolState) {
        self.lock().protocol_state = state;
    }

    /// Set the state the offline-message box reports.
    pub fn set_oim_state(&self, state: OimState) {
        self.lock().oim_state = state;
    }

    /// Replace the address-book contents.
    pub fn set_contacts(&self, contacts: Vec<Contact>) {
        self.lock().contacts = contacts;
    }

    /// Requests made so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Take and clear the request log.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.lock().calls)
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Simulated notification server transport.
#[derive(Debug, Clone)]
pub struct SimTransport(SimWorld);

impl Transport for SimTransport {
    fn establish_connection(&mut self) {
        self.0.record(Call::EstablishConnection);
    }

    fn lose_connection(&mut self) {
        self.0.record(Call::LoseConnection);
    }
}

/// Simulated notification protocol.
#[derive(Debug, Clone)]
pub struct SimProtocol(SimWorld);

impl NotificationProtocol for SimProtocol {
    fn state(&self) -> ProtocolState {
        self.0.lock().protocol_state
    }

    fn sign_off(&mut self) {
        self.0.record(Call::SignOff);
    }
}

/// Simulated switchboard manager.
#[derive(Debug, Clone)]
pub struct SimSwitchboards(SimWorld);

impl SwitchboardManager for SimSwitchboards {
    fn close(&mut self) {
        self.0.record(Call::CloseSwitchboards);
    }
}

/// Simulated single sign-on service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSingleSignOn {
    /// Account the tokens are issued for.
    pub account: String,
}

/// Simulated address book.
#[derive(Debug, Clone)]
pub struct SimAddressBook(SimWorld);

impl AddressBook for SimAddressBook {
    fn contacts(&self) -> Vec<Contact> {
        self.0.lock().contacts.clone()
    }
}

/// Simulated offline-message box.
#[derive(Debug, Clone)]
pub struct SimOfflineMessages(SimWorld);

impl OfflineMessageBox for SimOfflineMessages {
    fn state(&self) -> OimState {
        self.0.lock().oim_state
    }
}

/// Simulated spaces service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSpaces;

/// Backend whose collaborators all share one [`SimWorld`].
#[derive(Debug, Clone)]
pub struct SimBackend {
    world: SimWorld,
}

impl SimBackend {
    /// Create a backend over `world`.
    pub fn new(world: SimWorld) -> Self {
        Self { world }
    }

    /// Long-lived collaborators sharing this backend's world.
    pub fn collaborators(&self) -> Collaborators<Self> {
        Collaborators {
            transport: SimTransport(self.world.clone()),
            protocol: SimProtocol(self.world.clone()),
            switchboards: SimSwitchboards(self.world.clone()),
        }
    }

    /// Build a closed client over a fresh world.
    pub fn client(config: ClientConfig) -> (Client<Self>, SimWorld) {
        let world = SimWorld::new();
        let backend = Self::new(world.clone());
        let collaborators = backend.collaborators();
        (Client::new(backend, collaborators, config), world)
    }
}

impl Backend for SimBackend {
    type Transport = SimTransport;
    type Protocol = SimProtocol;
    type Switchboards = SimSwitchboards;
    type SingleSignOn = SimSingleSignOn;
    type AddressBook = SimAddressBook;
    type OfflineMessages = SimOfflineMessages;
    type Spaces = SimSpaces;

    fn single_sign_on(
        &mut self,
        credentials: &Credentials,
        _proxies: &ProxyConfig,
    ) -> SimSingleSignOn {
        self.world.record(Call::CreateSingleSignOn { account: credentials.account.clone() });
        SimSingleSignOn { account: credentials.account.clone() }
    }

    fn address_book(&mut self, _sso: &SimSingleSignOn, _proxies: &ProxyConfig) -> SimAddressBook {
        self.world.record(Call::CreateAddressBook);
        SimAddressBook(self.world.clone())
    }

    fn offline_messages(
        &mut self,
        _sso: &SimSingleSignOn,
        _proxies: &ProxyConfig,
    ) -> SimOfflineMessages {
        self.world.record(Call::CreateOfflineMessages);
        SimOfflineMessages(self.world.clone())
    }

    fn spaces(&mut self, _sso: &SimSingleSignOn, _proxies: &ProxyConfig) -> SimSpaces {
        self.world.record(Call::CreateSpaces);
        SimSpaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborators_share_the_world() {
        let world = SimWorld::new();
        let backend = SimBackend::new(world.clone());
        let mut collaborators = backend.collaborators();

        world.set_protocol_state(ProtocolState::Open);
        assert_eq!(collaborators.protocol.state(), ProtocolState::Open);

        collaborators.transport.establish_connection();
        collaborators.switchboards.close();
        assert_eq!(world.take_calls(), vec![Call::EstablishConnection, Call::CloseSwitchboards]);
        assert!(world.calls().is_empty());
    }

    #[test]
    fn services_are_created_for_the_account() {
        let world = SimWorld::new();
        let mut backend = SimBackend::new(world.clone());
        let sso = backend
            .single_sign_on(&Credentials::new("me@example.com", "pw"), &ProxyConfig::none());

        assert_eq!(sso.account, "me@example.com");
        assert_eq!(world.calls(), vec![Call::CreateSingleSignOn {
            account: "me@example.com".into()
        }]);
    }
}
