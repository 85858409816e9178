//! Property-based tests for the client state machine.
//!
//! Tests verify that invariants hold under arbitrary signal and command
//! sequences, and that the lifecycle preconditions hold in every state.

use msnlink_client::{
    AddressBookSignal, ClientError, ClientState, Credentials, ProtocolSignal, ProtocolState,
    TransportSignal,
};
use msnlink_harness::{Call, HANDSHAKE, InvariantRegistry, SimSession};
use proptest::prelude::*;

const ACCOUNT: &str = "me@example.com";

const PROTOCOL_STATES: [ProtocolState; 7] = [
    ProtocolState::Closed,
    ProtocolState::Opening,
    ProtocolState::Authenticating,
    ProtocolState::Authenticated,
    ProtocolState::Synchronizing,
    ProtocolState::Synchronized,
    ProtocolState::Open,
];

const SENDERS: [&str; 3] = ["alice@example.com", "bob@example.com", "carol@example.com"];

/// One input to the simulated session.
#[derive(Debug, Clone)]
enum Step {
    Login,
    Logout,
    Connect,
    ConnectFail,
    Drop,
    Advance(ProtocolState),
    AuthFail,
    AddressBookError,
    Unmanaged(usize),
    CloseConversation(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => Just(Step::Login),
        1 => Just(Step::Logout),
        2 => Just(Step::Connect),
        1 => Just(Step::ConnectFail),
        1 => Just(Step::Drop),
        6 => prop::sample::select(PROTOCOL_STATES.to_vec()).prop_map(Step::Advance),
        1 => Just(Step::AuthFail),
        1 => Just(Step::AddressBookError),
        2 => (0..SENDERS.len()).prop_map(Step::Unmanaged),
        1 => (0..SENDERS.len()).prop_map(Step::CloseConversation),
    ]
}

fn apply(session: &mut SimSession, step: &Step) {
    match step {
        Step::Login => {
            let _ = session.login(ACCOUNT);
        },
        Step::Logout => session.logout(),
        Step::Connect => session.connect(),
        Step::ConnectFail => {
            session.handle(TransportSignal::ConnectionFailure { reason: "refused".into() });
        },
        Step::Drop => session.drop_connection("connection reset"),
        Step::Advance(state) => session.advance(*state),
        Step::AuthFail => session.handle(ProtocolSignal::AuthenticationFailed),
        Step::AddressBookError => {
            session.handle(AddressBookSignal::Error { code: "InternalError".into() });
        },
        Step::Unmanaged(sender) => session.receive_unmanaged(SENDERS[*sender], "hello"),
        Step::CloseConversation(sender) => {
            let conversation =
                session.client().conversations().get(&SENDERS[*sender].into()).cloned();
            if let Some(conversation) = conversation {
                session.client_mut().close_conversation(&conversation);
            }
        },
    }
}

/// Drive a fresh session to `target` along the happy path.
fn reach(target: ClientState) -> SimSession {
    let mut session = SimSession::default();
    if target >= ClientState::Connecting {
        let _ = session.login(ACCOUNT);
    }
    if target >= ClientState::Connected {
        session.connect();
    }
    for state in HANDSHAKE {
        if state.client_state().is_some_and(|s| s <= target) {
            session.advance(state);
        }
    }
    session
}

fn non_closed_state() -> impl Strategy<Value = ClientState> {
    prop::sample::select(ClientState::ALL[1..].to_vec())
}

fn non_open_state() -> impl Strategy<Value = ClientState> {
    prop::sample::select(ClientState::ALL[..ClientState::ALL.len() - 1].to_vec())
}

proptest! {
    /// Login outside CLOSED fails loudly and changes nothing.
    #[test]
    fn prop_login_requires_closed(target in non_closed_state()) {
        let mut session = reach(target);
        prop_assert_eq!(session.client().state(), target);
        session.recorder().clear();
        session.world().take_calls();

        let result = session.client_mut().login(Credentials::new("other@example.com", "pw"));

        let expected = ClientError::Precondition { state: target, operation: "login" };
        prop_assert_eq!(result, Err(expected));
        prop_assert_eq!(session.client().state(), target);
        prop_assert!(session.recorder().events().is_empty());
        prop_assert!(session.world().calls().is_empty());
    }

    /// Logout outside OPEN is a silent no-op.
    #[test]
    fn prop_logout_outside_open_is_noop(target in non_open_state()) {
        let mut session = reach(target);
        session.recorder().clear();
        session.world().take_calls();

        session.logout();

        prop_assert_eq!(session.client().state(), target);
        prop_assert!(session.recorder().events().is_empty());
        prop_assert!(session.world().calls().is_empty());
    }

    /// Lifecycle invariants hold under arbitrary input sequences.
    #[test]
    fn prop_invariants_hold(steps in prop::collection::vec(step_strategy(), 0..60)) {
        let mut session = SimSession::default();
        let invariants = InvariantRegistry::standard();

        for step in &steps {
            apply(&mut session, step);

            let snapshot = session.snapshot();
            prop_assert!(
                invariants.check_all(&snapshot).is_ok(),
                "Invariant violated after {:?}", step
            );
            prop_assert!(snapshot.external_conversations <= SENDERS.len());
        }
    }

    /// A client that reached CLOSED through a failure can always log in again.
    #[test]
    fn prop_login_succeeds_whenever_closed(steps in prop::collection::vec(step_strategy(), 0..40)) {
        let mut session = SimSession::default();
        for step in &steps {
            apply(&mut session, step);
        }
        prop_assume!(session.client().state() == ClientState::Closed);
        session.world().take_calls();

        prop_assert!(session.login(ACCOUNT).is_ok());
        prop_assert_eq!(session.client().state(), ClientState::Connecting);
        prop_assert_eq!(session.world().calls(), vec![Call::EstablishConnection]);
    }
}
