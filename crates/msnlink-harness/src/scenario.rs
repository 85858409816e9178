//! Scripted sessions.
//!
//! Each [`Scenario`] drives a [`SimSession`] through a representative client
//! lifecycle. The `msnlink-sim` binary runs them for inspection, and the
//! integration tests use them as fixtures.

use msnlink_client::{
    AddressBookEvent, AddressBookSignal, ClientError, Contact, ContactProperty, ContactSignal,
    OimSignal, OimState, ProtocolSignal, ProtocolState, TransportSignal,
};

use crate::{invariants::Violation, sim_session::SimSession};

/// Error from running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The client rejected an operation.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// The session broke an invariant.
    #[error("{} invariant violation(s): {}", .0.len(), join(.0))]
    Invariants(Vec<Violation>),
}

fn join(violations: &[Violation]) -> String {
    violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Scripted client lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Log in and walk the handshake to `OPEN`.
    Handshake,
    /// Handshake, log out, then the transport confirms the disconnect.
    Logout,
    /// The server rejects the credentials mid-handshake.
    AuthFailure,
    /// The connection drops while `OPEN`, then the client logs in again.
    NetworkDrop,
    /// A contact starts chatting outside any switchboard session.
    InboundChat,
    /// Address-book, contact and offline-message traffic while `OPEN`.
    Roster,
}

impl Scenario {
    /// Every scenario.
    pub const ALL: [Self; 6] = [
        Self::Handshake,
        Self::Logout,
        Self::AuthFailure,
        Self::NetworkDrop,
        Self::InboundChat,
        Self::Roster,
    ];

    /// Account used by every scenario.
    pub const ACCOUNT: &'static str = "me@example.com";

    /// Drive `session` through this scenario, then check the standard
    /// invariants.
    ///
    /// # Errors
    ///
    /// - `ScenarioError::Client` if the client rejects an operation
    /// - `ScenarioError::Invariants` if the session broke an invariant
    pub fn run(self, session: &mut SimSession) -> Result<(), ScenarioError> {
        tracing::info!(scenario = ?self, "running scenario");

        match self {
            Self::Handshake => session.handshake(Self::ACCOUNT)?,
            Self::Logout => {
                session.handshake(Self::ACCOUNT)?;
                session.logout();
                session.drop_connection("closed by peer");
            },
            Self::AuthFailure => {
                session.login(Self::ACCOUNT)?;
                session.connect();
                session.advance(ProtocolState::Authenticating);
                session.handle(ProtocolSignal::AuthenticationFailed);
                session.drop_connection("closed after authentication failure");
            },
            Self::NetworkDrop => {
                session.handshake(Self::ACCOUNT)?;
                session.drop_connection("connection reset");
                session.handshake(Self::ACCOUNT)?;
            },
            Self::InboundChat => {
                session.handshake(Self::ACCOUNT)?;
                session.receive_unmanaged("alice@example.com", "hi there");
                session.receive_unmanaged("alice@example.com", "are you around?");
                session.receive_unmanaged("bob@example.com", "ping");
            },
            Self::Roster => {
                let alice = Contact::new("alice@example.com").im_contact();
                session.world().set_contacts(vec![alice.clone()]);
                session.handshake(Self::ACCOUNT)?;

                session.handle(ContactSignal::property(
                    alice.with_display_name("Alice"),
                    ContactProperty::DisplayName,
                ));

                let carol = Contact::new("carol@example.com").im_contact();
                session.handle(AddressBookSignal::Event(AddressBookEvent::MessengerContactAdded(
                    carol.clone(),
                )));
                session.handle(ContactSignal::property(carol, ContactProperty::Presence));

                session.world().set_oim_state(OimState::Synchronized);
                session.handle(OimSignal::StateChanged);
                session.handle(TransportSignal::ConnectionLost { reason: "idle".into() });
            },
        }

        session.check().map_err(ScenarioError::Invariants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_holds_invariants() {
        for scenario in Scenario::ALL {
            let mut session = SimSession::default();
            let result = scenario.run(&mut session);
            assert!(result.is_ok(), "{scenario:?}: {result:?}");
        }
    }
}
