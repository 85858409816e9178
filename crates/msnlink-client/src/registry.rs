//! Externally-initiated conversation index.
//!
//! Maps a contact to the single conversation it started outside any
//! switchboard session. Switchboard conversations are not indexed: they are
//! unique per invocation and published once when created.

use std::{collections::HashMap, sync::Arc};

use crate::{
    contact::ContactId,
    conversation::{Conversation, InstantMessage},
    dispatcher::EventDispatcher,
    event::Event,
};

/// Registry of external conversations keyed by initiating contact.
///
/// # Invariants
///
/// - A contact maps to at most one conversation
/// - The first registration for a contact wins; later ones are rejected
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    external: HashMap<ContactId, Arc<Conversation>>,
}

impl ConversationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a conversation under its initiating participant.
    ///
    /// Returns `false` (and logs a warning) if that participant already has a
    /// conversation or the conversation has no participants. The existing
    /// entry is left untouched.
    pub fn register_external(&mut self, conversation: Arc<Conversation>) -> bool {
        let Some(initiator) = conversation.initiator().cloned() else {
            tracing::warn!("refusing to register an external conversation without participants");
            return false;
        };

        if self.external.contains_key(&initiator) {
            tracing::warn!(
                contact = %initiator,
                "trying to register an external conversation twice"
            );
            return false;
        }

        self.external.insert(initiator, conversation);
        true
    }

    /// Remove the conversation indexed under its initiating participant.
    ///
    /// Returns `false` if nothing was registered for that participant.
    pub fn unregister_external(&mut self, conversation: &Arc<Conversation>) -> bool {
        conversation
            .initiator()
            .is_some_and(|initiator| self.external.remove(initiator).is_some())
    }

    /// Conversation started by `contact`. `None` if there is none.
    pub fn get(&self, contact: &ContactId) -> Option<&Arc<Conversation>> {
        self.external.get(contact)
    }

    /// Number of indexed conversations.
    pub fn len(&self) -> usize {
        self.external.len()
    }

    /// Check if no conversation is indexed.
    pub fn is_empty(&self) -> bool {
        self.external.is_empty()
    }

    /// Deliver an unmanaged message, creating a conversation if needed.
    ///
    /// A new conversation is registered and announced through
    /// `on_invite_conversation` before the message is delivered, so a
    /// handler attaching to it during the invite sees the message.
    pub fn route_unmanaged_message(
        &mut self,
        sender: ContactId,
        message: InstantMessage,
        dispatcher: &EventDispatcher,
    ) -> Arc<Conversation> {
        if let Some(conversation) = self.external.get(&sender) {
            let conversation = Arc::clone(conversation);
            conversation.deliver(message);
            return conversation;
        }

        let conversation = Conversation::external(vec![sender.clone()]);
        self.register_external(Arc::clone(&conversation));

        let invited = dispatcher.dispatch(&Event::InviteConversation(Arc::clone(&conversation)));
        if invited == 0 {
            tracing::warn!(contact = %sender, "no event handler attached for conversations");
        }

        conversation.deliver(message);
        conversation
    }
}
