//! Deterministic simulation harness for the msnlink client.
//!
//! In-memory implementations of the collaborator traits, so the client state
//! machine can be driven signal by signal without a network.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks properties that must hold across every
//! execution path, not specific scenarios. Use
//! [`InvariantRegistry::standard()`] for the client lifecycle invariants.
//!
//! # Log Capture
//!
//! Some client behaviour is only observable as a warning log. The
//! `log_capture` module records tracing events so tests can assert on them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod log_capture;
pub mod recorder;
pub mod scenario;
pub mod sim_backend;
pub mod sim_session;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, NoRepeatedStateDispatch, SessionSnapshot,
    SingleInvitePerConversation, TransitionsFollowTable, Violation,
};
pub use log_capture::{CapturedEvent, CapturedLogs, capture};
pub use recorder::EventRecorder;
pub use scenario::{Scenario, ScenarioError};
pub use sim_backend::{
    Call, SimAddressBook, SimBackend, SimOfflineMessages, SimProtocol, SimSingleSignOn, SimSpaces,
    SimSwitchboards, SimTransport, SimWorld,
};
pub use sim_session::{HANDSHAKE, SIM_PASSWORD, SimSession};
