//! Client
//!
//! Orchestrator for an instant-messaging client. Owns the connection
//! lifecycle, fans typed events out to application handlers, routes inbound
//! conversation traffic and republishes contact notifications.
//!
//! # Architecture
//!
//! The client is Sans-IO. Transport, notification protocol, switchboard and
//! web services are collaborators behind the traits in [`collaborator`]. They
//! report results as [`ClientSignal`]s fed to [`Client::handle`], and the
//! client publishes [`Event`]s through the [`EventDispatcher`].
//!
//! # Components
//!
//! - [`EventDispatcher`]: Name-keyed handler lists with snapshot dispatch
//! - [`Client`]: Top-level lifecycle state machine
//! - [`ConversationRegistry`]: Externally-initiated conversations by contact
//! - [`ContactSignalRouter`]: Contact property and event republishing
//! - [`Inbox`]: Re-entrancy safe queue for handler-issued work

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
pub mod collaborator;
mod config;
mod contact;
mod conversation;
mod dispatcher;
mod error;
mod event;
mod registry;
mod router;
mod signal;
mod state;

pub use client::{Client, Inbox};
pub use collaborator::{
    AddressBook, Backend, Collaborators, NotificationProtocol, OfflineMessageBox, Services,
    SwitchboardManager, Transport,
};
pub use config::{
    ClientConfig, Credentials, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, ProxyConfig, ProxyInfo,
    ProxyKind, ServerAddr,
};
pub use contact::{
    ClientCapabilities, Contact, ContactAttributes, ContactEvent, ContactId, ContactProperties,
    ContactProperty, DataObjectRef, Group, GroupId, Presence,
};
pub use conversation::{Conversation, ConversationOrigin, InstantMessage, MessageListener};
pub use dispatcher::{EventDispatcher, Handler, HandlerId};
pub use error::ClientError;
pub use event::{
    AddressBookEvent, AuthenticationError, ClientErrorKind, Event, EventName, OfflineMessage,
    OimEvent,
};
pub use registry::ConversationRegistry;
pub use router::{ContactSignalRouter, contact_event, property_event};
pub use signal::{
    AddressBookSignal, ClientCommand, ClientSignal, ContactSignal, ContactSignalKind, OimSignal,
    ProtocolSignal, SwitchboardHandler, SwitchboardSignal, TransportSignal,
};
pub use state::{ClientState, OimState, ProtocolState};
