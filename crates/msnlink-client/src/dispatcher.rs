//! Publish mechanism for client events.
//!
//! The [`EventDispatcher`] maps each [`EventName`] to an ordered list of
//! handlers. Dispatch snapshots the list before invoking anything, so
//! handlers may register or unregister handlers (including themselves)
//! without affecting the dispatch that is running.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::event::{Event, EventName};

/// Event handler.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Identifies a registered handler for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Maps event names to handlers and invokes them.
///
/// # Invariants
///
/// - Handlers for a name run in registration order
/// - A dispatch invokes exactly the handlers registered when it started
pub struct EventDispatcher {
    handlers: Mutex<HashMap<EventName, Vec<(HandlerId, Handler)>>>,
    next_id: AtomicU64,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Create a dispatcher with no handlers.
    pub fn new() -> Self {
        Self { handlers: Mutex::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }

    /// Append a handler for `name`.
    pub fn register(
        &self,
        name: EventName,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().entry(name).or_default().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut handlers = self.lock();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(h, _)| *h == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invoke every handler registered for the event's name.
    ///
    /// Returns the number of handlers invoked. Zero is not an error.
    pub fn dispatch(&self, event: &Event) -> usize {
        let name = event.name();
        let snapshot: Vec<Handler> = self
            .lock()
            .get(&name)
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        tracing::trace!(event = %name, handlers = snapshot.len(), "dispatch");

        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    /// Number of handlers registered for `name`.
    pub fn handler_count(&self, name: EventName) -> usize {
        self.lock().get(&name).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventName, Vec<(HandlerId, Handler)>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.lock();
        let counts: HashMap<_, _> = handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventDispatcher").field("handlers", &counts).finish()
    }
}
