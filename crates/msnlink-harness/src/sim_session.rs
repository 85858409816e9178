//! Simulated client session.
//!
//! `SimSession` bundles a [`Client`] over a [`SimBackend`], the shared
//! [`SimWorld`] and an [`EventRecorder`]. It plays the collaborators' side of
//! the conversation: setting the protocol state and then signalling the
//! client, the way a real notification protocol would.

use msnlink_client::{
    Client, ClientConfig, ClientError, ClientSignal, ContactId, Credentials, InstantMessage,
    ProtocolSignal, ProtocolState, TransportSignal,
};

use crate::{
    invariants::{InvariantRegistry, SessionSnapshot, Violation},
    recorder::EventRecorder,
    sim_backend::{SimBackend, SimWorld},
};

/// Protocol states walked through by a successful handshake.
pub const HANDSHAKE: [ProtocolState; 5] = [
    ProtocolState::Authenticating,
    ProtocolState::Authenticated,
    ProtocolState::Synchronizing,
    ProtocolState::Synchronized,
    ProtocolState::Open,
];

/// Password used by [`SimSession::login`].
pub const SIM_PASSWORD: &str = "sim-password";

/// A client wired to simulated collaborators.
pub struct SimSession {
    client: Client<SimBackend>,
    world: SimWorld,
    recorder: EventRecorder,
    invariants: Option<InvariantRegistry>,
}

impl Default for SimSession {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl SimSession {
    /// Create a closed session. The recorder is the first handler on every
    /// event name.
    pub fn new(config: ClientConfig) -> Self {
        let (client, world) = SimBackend::client(config);
        let recorder = EventRecorder::attach(client.dispatcher());
        Self { client, world, recorder, invariants: None }
    }

    /// Check `registry` after every input, panicking on a violation.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// The client under test.
    pub fn client(&self) -> &Client<SimBackend> {
        &self.client
    }

    /// Mutable access to the client under test.
    pub fn client_mut(&mut self) -> &mut Client<SimBackend> {
        &mut self.client
    }

    /// Simulated collaborator state.
    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    /// Events published so far.
    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// Log in as `account`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Precondition` if the client is not `CLOSED`
    pub fn login(&mut self, account: &str) -> Result<(), ClientError> {
        let result = self.client.login(Credentials::new(account, SIM_PASSWORD));
        self.after_input();
        result
    }

    /// Log out.
    pub fn logout(&mut self) {
        self.client.logout();
        self.after_input();
    }

    /// Feed a collaborator signal to the client.
    pub fn handle(&mut self, signal: impl Into<ClientSignal>) {
        self.client.handle(signal);
        self.after_input();
    }

    /// Report a successful transport connection.
    pub fn connect(&mut self) {
        self.handle(TransportSignal::ConnectionSuccess);
    }

    /// Move the protocol to `state` and tell the client.
    pub fn advance(&mut self, state: ProtocolState) {
        self.world.set_protocol_state(state);
        self.handle(ProtocolSignal::StateChanged);
    }

    /// Report that the transport connection dropped.
    pub fn drop_connection(&mut self, reason: &str) {
        self.world.set_protocol_state(ProtocolState::Closed);
        self.handle(TransportSignal::ConnectionLost { reason: reason.to_string() });
    }

    /// Deliver a message from `sender` outside any switchboard session.
    pub fn receive_unmanaged(&mut self, sender: &str, text: &str) {
        self.handle(ProtocolSignal::UnmanagedMessage {
            sender: ContactId::new(sender),
            message: InstantMessage::new(sender, text),
        });
    }

    /// Log in and walk the full handshake to `OPEN`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Precondition` if the client is not `CLOSED`
    pub fn handshake(&mut self, account: &str) -> Result<(), ClientError> {
        self.login(account)?;
        self.connect();
        for state in HANDSHAKE {
            self.advance(state);
        }
        Ok(())
    }

    /// Snapshot for invariant checking.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.client, &self.recorder)
    }

    /// Check the standard invariants against the session so far.
    ///
    /// # Errors
    ///
    /// Every violated invariant.
    pub fn check(&self) -> Result<(), Vec<Violation>> {
        InvariantRegistry::standard().check_all(&self.snapshot())
    }

    fn after_input(&self) {
        if let Some(registry) = &self.invariants {
            registry.assert_all(&self.snapshot(), "after input");
        }
    }
}

#[cfg(test)]
mod tests {
    use msnlink_client::ClientState;

    use super::*;

    #[test]
    fn handshake_reaches_open() {
        let mut session = SimSession::default().with_invariants(InvariantRegistry::standard());
        assert!(session.handshake("me@example.com").is_ok());
        assert_eq!(session.client().state(), ClientState::Open);
        assert!(session.check().is_ok());
    }

    #[test]
    fn second_handshake_is_rejected() {
        let mut session = SimSession::default();
        assert!(session.handshake("me@example.com").is_ok());
        assert!(session.handshake("me@example.com").is_err());
    }
}
