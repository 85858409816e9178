//! Event recording.
//!
//! [`EventRecorder`] registers a handler for every public event name and keeps
//! what it receives in dispatch order. Tests assert against the log and the
//! invariant checks build their snapshots from it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use msnlink_client::{
    ClientErrorKind, ClientState, Conversation, Event, EventDispatcher, EventName, HandlerId,
};

/// Records every event published through a dispatcher.
#[derive(Debug, Clone)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Event>>>,
    handlers: Vec<HandlerId>,
}

impl EventRecorder {
    /// Attach to every event name on `dispatcher`.
    pub fn attach(dispatcher: &EventDispatcher) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let handlers = EventName::ALL
            .into_iter()
            .map(|name| {
                let sink = Arc::clone(&events);
                dispatcher.register(name, move |event| {
                    sink.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
                })
            })
            .collect();

        Self { events, handlers }
    }

    /// Remove this recorder's handlers from `dispatcher`.
    pub fn detach(&self, dispatcher: &EventDispatcher) {
        for id in &self.handlers {
            dispatcher.unregister(*id);
        }
    }

    /// Every recorded event, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Names of the recorded events, oldest first.
    pub fn names(&self) -> Vec<EventName> {
        self.lock().iter().map(Event::name).collect()
    }

    /// Number of recorded events named `name`.
    pub fn count(&self, name: EventName) -> usize {
        self.lock().iter().filter(|event| event.name() == name).count()
    }

    /// Dispatched client states, oldest first.
    pub fn state_changes(&self) -> Vec<ClientState> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::ClientStateChanged(state) => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Dispatched client errors, oldest first.
    pub fn errors(&self) -> Vec<ClientErrorKind> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::ClientError(kind) => Some(kind.clone()),
                _ => None,
            })
            .collect()
    }

    /// Conversations offered through `on_invite_conversation`, oldest first.
    pub fn invites(&self) -> Vec<Arc<Conversation>> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Event::InviteConversation(conversation) => Some(Arc::clone(conversation)),
                _ => None,
            })
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
