//! Conversation objects.
//!
//! A [`Conversation`] is shared between the client, the switchboard manager
//! and the application as an `Arc<Conversation>`. Identity is the allocation:
//! two handles refer to the same conversation iff [`Arc::ptr_eq`] holds.

use std::{
    borrow::Cow,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::contact::ContactId;

/// Listener invoked for every message delivered to a conversation.
pub type MessageListener = Arc<dyn Fn(&InstantMessage) + Send + Sync>;

/// Where a conversation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationOrigin {
    /// Switchboard session, usually application-initiated.
    Switchboard,
    /// Created by the client for an unmanaged inbound message.
    External,
}

/// A message received in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantMessage {
    /// Contact that sent the message.
    pub sender: ContactId,
    /// Message content bytes.
    pub content: Vec<u8>,
}

impl InstantMessage {
    /// Create a message from a sender and content.
    pub fn new(sender: impl Into<ContactId>, content: impl Into<Vec<u8>>) -> Self {
        Self { sender: sender.into(), content: content.into() }
    }

    /// Message content as UTF-8 string (lossy conversion).
    pub fn content_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

#[derive(Default)]
struct Inner {
    listeners: Vec<MessageListener>,
    received: Vec<InstantMessage>,
}

/// Set of participants plus the messages delivered to them.
pub struct Conversation {
    origin: ConversationOrigin,
    participants: Vec<ContactId>,
    inner: Mutex<Inner>,
}

impl Conversation {
    /// Create a switchboard conversation.
    pub fn switchboard(participants: Vec<ContactId>) -> Arc<Self> {
        Arc::new(Self::new(ConversationOrigin::Switchboard, participants))
    }

    /// Create an externally-initiated conversation.
    pub fn external(participants: Vec<ContactId>) -> Arc<Self> {
        Arc::new(Self::new(ConversationOrigin::External, participants))
    }

    fn new(origin: ConversationOrigin, participants: Vec<ContactId>) -> Self {
        Self { origin, participants, inner: Mutex::new(Inner::default()) }
    }

    /// Where the conversation came from.
    pub fn origin(&self) -> ConversationOrigin {
        self.origin
    }

    /// Participants in join order.
    pub fn participants(&self) -> &[ContactId] {
        &self.participants
    }

    /// Participant that started the conversation. `None` if empty.
    pub fn initiator(&self) -> Option<&ContactId> {
        self.participants.first()
    }

    /// Attach a message listener.
    ///
    /// Listeners only see messages delivered after they were attached.
    pub fn on_message(&self, listener: impl Fn(&InstantMessage) + Send + Sync + 'static) {
        self.lock().listeners.push(Arc::new(listener));
    }

    /// Deliver a received message to every listener.
    ///
    /// The listener list is snapshotted before invocation, so a listener may
    /// attach further listeners without affecting this delivery.
    pub fn deliver(&self, message: InstantMessage) {
        let listeners = {
            let mut inner = self.lock();
            inner.received.push(message.clone());
            inner.listeners.clone()
        };

        for listener in listeners {
            listener(&message);
        }
    }

    /// Messages delivered so far, oldest first.
    pub fn received(&self) -> Vec<InstantMessage> {
        self.lock().received.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("origin", &self.origin)
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}
