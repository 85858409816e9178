//! Contact signal republishing.
//!
//! The [`ContactSignalRouter`] tracks which contacts the client has
//! subscribed to and translates their property changes and named events into
//! public [`Event`]s. Signals from contacts that were never subscribed are
//! dropped.
//!
//! Signal-to-event names come from the explicit tables below rather than from
//! string manipulation at runtime, so a misspelled signal cannot produce a
//! dead event name.

use std::collections::HashSet;

use crate::{
    contact::{Contact, ContactEvent, ContactId, ContactProperty},
    dispatcher::EventDispatcher,
    event::{Event, EventName},
    signal::{ContactSignal, ContactSignalKind},
};

/// Event published when a contact property changes.
pub fn property_event(property: ContactProperty) -> EventName {
    match property {
        ContactProperty::Presence => EventName::ContactPresenceChanged,
        ContactProperty::DisplayName => EventName::ContactDisplayNameChanged,
        ContactProperty::PersonalMessage => EventName::ContactPersonalMessageChanged,
        ContactProperty::CurrentMedia => EventName::ContactCurrentMediaChanged,
        ContactProperty::MsnObject => EventName::ContactMsnObjectChanged,
        ContactProperty::ClientCapabilities => EventName::ContactClientCapabilitiesChanged,
    }
}

/// Event published when a contact emits a named event.
pub fn contact_event(event: &ContactEvent) -> EventName {
    match event {
        ContactEvent::InfosChanged { .. } => EventName::ContactInfosChanged,
    }
}

/// Subscribes to contacts and republishes their signals.
///
/// # Invariants
///
/// - A contact is subscribed at most once
/// - Only signals from subscribed contacts are published
#[derive(Debug, Default)]
pub struct ContactSignalRouter {
    subscribed: HashSet<ContactId>,
}

impl ContactSignalRouter {
    /// Create a router with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a contact's property and event surfaces.
    ///
    /// Returns `false` if the contact was already subscribed.
    pub fn subscribe(&mut self, contact: &Contact) -> bool {
        let inserted = self.subscribed.insert(contact.id.clone());
        if inserted {
            tracing::debug!(contact = %contact.id, "subscribed to contact signals");
        }
        inserted
    }

    /// Check if a contact is subscribed.
    pub fn is_subscribed(&self, id: &ContactId) -> bool {
        self.subscribed.contains(id)
    }

    /// Number of subscribed contacts.
    pub fn len(&self) -> usize {
        self.subscribed.len()
    }

    /// Check if no contact is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribed.is_empty()
    }

    /// Drop every subscription.
    ///
    /// Called when a new address book replaces the old one, since contacts
    /// of the previous session no longer emit signals.
    pub fn clear(&mut self) {
        self.subscribed.clear();
    }

    /// Translate a contact signal into its public event.
    ///
    /// `None` if the contact is not subscribed.
    pub fn translate(&self, signal: ContactSignal) -> Option<Event> {
        if !self.is_subscribed(&signal.contact.id) {
            tracing::trace!(
                contact = %signal.contact.id,
                "signal from unsubscribed contact dropped"
            );
            return None;
        }

        let event = match signal.kind {
            ContactSignalKind::PropertyChanged(property) => {
                Event::ContactPropertyChanged { property, contact: signal.contact }
            },
            ContactSignalKind::Event(event) => Event::Contact(event),
        };
        Some(event)
    }

    /// Translate and dispatch a contact signal.
    ///
    /// Returns the number of handlers invoked, or `None` if the contact is
    /// not subscribed.
    pub fn route(&self, signal: ContactSignal, dispatcher: &EventDispatcher) -> Option<usize> {
        self.translate(signal).map(|event| dispatcher.dispatch(&event))
    }
}
