//! Standard invariant checks.

use std::sync::Arc;

use msnlink_client::{ClientState, Conversation, Event};

use super::{Invariant, InvariantResult, SessionSnapshot, Violation};

/// A state change is only published when the state actually changes.
///
/// The client starts `CLOSED`, so the first published state must differ from
/// it, and no two consecutive state events may carry the same state.
pub struct NoRepeatedStateDispatch;

impl Invariant for NoRepeatedStateDispatch {
    fn name(&self) -> &'static str {
        "no_repeated_state_dispatch"
    }

    fn check(&self, session: &SessionSnapshot) -> InvariantResult {
        let mut previous = ClientState::Closed;
        for (index, state) in session.state_changes().enumerate() {
            if state == previous {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("state change #{index} repeats {state}"),
                });
            }
            previous = state;
        }
        Ok(())
    }
}

/// Every published state change is a legal transition.
///
/// Legal transitions are `CLOSED -> CONNECTING`, `CONNECTING -> CONNECTED`,
/// one protocol step forward, or any non-closed state back to `CLOSED`. The
/// last published state must be the client's current state.
pub struct TransitionsFollowTable;

impl TransitionsFollowTable {
    fn allowed(from: ClientState, to: ClientState) -> bool {
        match to {
            ClientState::Closed => from != ClientState::Closed,
            ClientState::Connecting => from == ClientState::Closed,
            ClientState::Connected => from == ClientState::Connecting,
            _ => to.protocol_predecessor() == Some(from),
        }
    }
}

impl Invariant for TransitionsFollowTable {
    fn name(&self) -> &'static str {
        "transitions_follow_table"
    }

    fn check(&self, session: &SessionSnapshot) -> InvariantResult {
        let mut current = ClientState::Closed;
        for state in session.state_changes() {
            if !Self::allowed(current, state) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("illegal transition {current} -> {state}"),
                });
            }
            current = state;
        }

        if current != session.state {
            return Err(Violation {
                invariant: self.name(),
                message: format!("last published state {current} but client is {}", session.state),
            });
        }
        Ok(())
    }
}

/// A conversation is offered to the application at most once.
pub struct SingleInvitePerConversation;

impl Invariant for SingleInvitePerConversation {
    fn name(&self) -> &'static str {
        "single_invite_per_conversation"
    }

    fn check(&self, session: &SessionSnapshot) -> InvariantResult {
        let mut seen: Vec<&Arc<Conversation>> = Vec::new();
        for event in &session.events {
            let Event::InviteConversation(conversation) = event else {
                continue;
            };
            if seen.iter().any(|known| Arc::ptr_eq(known, conversation)) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("conversation {conversation:?} invited twice"),
                });
            }
            seen.push(conversation);
        }
        Ok(())
    }
}
