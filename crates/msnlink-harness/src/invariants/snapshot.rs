//! Observable session state for invariant checking.
//!
//! A snapshot is taken after an input has been fully processed, so checks
//! never see a half-applied transition.

use msnlink_client::{Backend, Client, ClientState, Event};

use crate::recorder::EventRecorder;

/// Everything a session published, plus where it ended up.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Published events in dispatch order.
    pub events: Vec<Event>,
    /// Client state at snapshot time.
    pub state: ClientState,
    /// Number of registered external conversations.
    pub external_conversations: usize,
}

impl SessionSnapshot {
    /// Snapshot of a client that has published nothing.
    pub fn empty() -> Self {
        Self::from_events(Vec::new(), ClientState::Closed)
    }

    /// Snapshot from a raw event log.
    pub fn from_events(events: Vec<Event>, state: ClientState) -> Self {
        Self { events, state, external_conversations: 0 }
    }

    /// Capture a live client and the recorder attached to its dispatcher.
    pub fn capture<B: Backend>(client: &Client<B>, recorder: &EventRecorder) -> Self {
        Self {
            events: recorder.events(),
            state: client.state(),
            external_conversations: client.conversations().len(),
        }
    }

    /// Dispatched client states, oldest first.
    pub fn state_changes(&self) -> impl Iterator<Item = ClientState> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::ClientStateChanged(state) => Some(*state),
            _ => None,
        })
    }
}
