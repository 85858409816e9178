//! Contact, address-book and offline-message routing tests.
//!
//! Once the client is open, signals from subscribed contacts and the
//! per-session services are republished under their public event names.

use std::collections::BTreeMap;

use msnlink_client::{
    AddressBookEvent, AddressBookSignal, Contact, ContactEvent, ContactId, ContactProperty,
    ContactSignal, Event, EventName, Group, GroupId, OfflineMessage, OimEvent, OimSignal,
    OimState, Presence, ProtocolState, property_event,
};
use msnlink_harness::{InvariantRegistry, SimSession};

const ACCOUNT: &str = "me@example.com";

fn alice() -> Contact {
    Contact::new("alice@example.com").im_contact()
}

fn open_session_with(contacts: Vec<Contact>) -> SimSession {
    let mut session = SimSession::default().with_invariants(InvariantRegistry::standard());
    session.world().set_contacts(contacts);
    assert!(session.handshake(ACCOUNT).is_ok());
    session.recorder().clear();
    session
}

#[test]
fn opening_subscribes_messenger_contacts_only() {
    let session =
        open_session_with(vec![alice(), Contact::new("pending@example.com"), alice()]);

    let contacts = session.client().contacts();
    assert_eq!(contacts.len(), 1);
    assert!(contacts.is_subscribed(&ContactId::new("alice@example.com")));
    assert!(!contacts.is_subscribed(&ContactId::new("pending@example.com")));
}

#[test]
fn contact_signal_posted_on_open_is_delivered() {
    let mut session = SimSession::default();
    session.world().set_contacts(vec![alice()]);
    assert!(session.login(ACCOUNT).is_ok());
    session.connect();
    for state in [
        ProtocolState::Authenticating,
        ProtocolState::Authenticated,
        ProtocolState::Synchronizing,
        ProtocolState::Synchronized,
    ] {
        session.advance(state);
    }
    assert!(session.client().contacts().is_empty());

    let inbox = session.client().inbox();
    session.client().register(EventName::ClientStateChanged, move |event| {
        if matches!(event, Event::ClientStateChanged(msnlink_client::ClientState::Open)) {
            let signal = ContactSignal::property(alice(), ContactProperty::Presence);
            assert!(inbox.post(signal).is_ok());
        }
    });
    session.advance(ProtocolState::Open);

    assert_eq!(session.recorder().count(EventName::ContactPresenceChanged), 1);
}

#[test]
fn every_property_change_is_republished_by_name() {
    let mut session = open_session_with(vec![alice()]);

    for property in ContactProperty::ALL {
        session.handle(ContactSignal::property(alice(), property));
    }

    let expected: Vec<_> = ContactProperty::ALL.into_iter().map(property_event).collect();
    assert_eq!(session.recorder().names(), expected);
}

#[test]
fn property_event_carries_the_updated_contact() {
    let mut session = open_session_with(vec![alice()]);
    let mut updated = alice().with_display_name("Alice");
    updated.properties.presence = Presence::Away;

    session.handle(ContactSignal::property(updated.clone(), ContactProperty::Presence));

    let events = session.recorder().events();
    let [Event::ContactPropertyChanged { property, contact }] = events.as_slice() else {
        unreachable!("expected one property event, got {events:?}");
    };
    assert_eq!(*property, ContactProperty::Presence);
    assert_eq!(*contact, updated);
}

#[test]
fn contact_events_pass_their_payload_through() {
    let mut session = open_session_with(vec![alice()]);
    let infos = BTreeMap::from([("city".to_string(), "Oslo".to_string())]);
    let event = ContactEvent::InfosChanged { infos };

    session.handle(ContactSignal::event(alice(), event.clone()));

    let events = session.recorder().events();
    assert!(matches!(events.as_slice(), [Event::Contact(e)] if *e == event));
    assert_eq!(session.recorder().names(), [EventName::ContactInfosChanged]);
}

#[test]
fn signals_from_unsubscribed_contacts_are_dropped() {
    let mut session = open_session_with(vec![alice()]);
    let stranger = Contact::new("stranger@example.com");

    session.handle(ContactSignal::property(stranger.clone(), ContactProperty::Presence));
    session.handle(ContactSignal::event(stranger, ContactEvent::InfosChanged {
        infos: BTreeMap::new(),
    }));

    assert!(session.recorder().events().is_empty());
}

#[test]
fn added_messenger_contact_is_subscribed_and_published() {
    let mut session = open_session_with(vec![]);
    let carol = Contact::new("carol@example.com").im_contact();

    session.handle(AddressBookSignal::Event(AddressBookEvent::MessengerContactAdded(
        carol.clone(),
    )));
    session.handle(ContactSignal::property(carol.clone(), ContactProperty::DisplayName));

    assert!(session.client().contacts().is_subscribed(&carol.id));
    assert_eq!(session.recorder().names(), [
        EventName::AddressBookMessengerContactAdded,
        EventName::ContactDisplayNameChanged,
    ]);
}

#[test]
fn address_book_events_are_published_by_name() {
    let mut session = open_session_with(vec![]);
    let bob = Contact::new("bob@example.com");
    let friends = Group { id: GroupId("g1".into()), name: "Friends".into() };
    let events = vec![
        AddressBookEvent::NewPendingContact(bob.clone()),
        AddressBookEvent::ContactBlocked(bob.clone()),
        AddressBookEvent::GroupAdded(friends.clone()),
        AddressBookEvent::GroupContactAdded(friends, bob.clone()),
        AddressBookEvent::ContactDeleted(bob),
    ];

    for event in events.clone() {
        session.handle(AddressBookSignal::Event(event));
    }

    let expected: Vec<_> = events.iter().map(AddressBookEvent::event_name).collect();
    assert_eq!(session.recorder().names(), expected);
    assert!(session.client().contacts().is_empty());
}

#[test]
fn reconnecting_clears_subscriptions_until_open() {
    let mut session = open_session_with(vec![alice()]);
    session.drop_connection("connection reset");
    assert!(session.client().contacts().is_subscribed(&alice().id));

    assert!(session.login(ACCOUNT).is_ok());
    session.connect();
    assert!(session.client().contacts().is_empty());

    session.handle(ContactSignal::property(alice(), ContactProperty::Presence));
    assert_eq!(session.recorder().count(EventName::ContactPresenceChanged), 0);

    for state in msnlink_harness::HANDSHAKE {
        session.advance(state);
    }
    assert!(session.client().contacts().is_subscribed(&alice().id));
}

#[test]
fn offline_message_state_is_read_from_the_mailbox() {
    let mut session = open_session_with(vec![]);
    session.world().set_oim_state(OimState::Synchronizing);
    session.handle(OimSignal::StateChanged);
    session.world().set_oim_state(OimState::Synchronized);
    session.handle(OimSignal::StateChanged);

    let states: Vec<_> = session
        .recorder()
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::OimStateChanged(state) => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(states, [OimState::Synchronizing, OimState::Synchronized]);
}

#[test]
fn offline_message_events_are_published_by_name() {
    let mut session = open_session_with(vec![]);
    let message = OfflineMessage {
        id: "oim-1".into(),
        peer: ContactId::new("bob@example.com"),
        text: "call me".into(),
    };

    session.handle(OimSignal::Event(OimEvent::MessagesReceived(vec![message.clone()])));
    session.handle(OimSignal::Event(OimEvent::MessagesFetched(vec![message.clone()])));
    session.handle(OimSignal::Event(OimEvent::MessagesDeleted(vec![message])));

    assert_eq!(session.recorder().names(), [
        EventName::OimMessagesReceived,
        EventName::OimMessagesFetched,
        EventName::OimMessagesDeleted,
    ]);
}
