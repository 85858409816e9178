//! Invariant checking for simulated client sessions.
//!
//! Invariants are properties that must hold for any sequence of signals and
//! commands, not just the scripted scenarios.
//!
//! # Architecture
//!
//! The event log captured by an [`crate::EventRecorder`] and the client's
//! current state are folded into a [`SessionSnapshot`]. Registered
//! [`Invariant`] checks then run against it.
//!
//! # Usage
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! let snapshot = SessionSnapshot::capture(&client, &recorder);
//! registry.check_all(&snapshot)?;
//! ```

mod checks;
mod snapshot;

pub use checks::{NoRepeatedStateDispatch, SingleInvitePerConversation, TransitionsFollowTable};
pub use snapshot::SessionSnapshot;

/// Invariant check result.
pub type InvariantResult = Result<(), Violation>;

/// Invariant violation with context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Name of the violated invariant.
    pub invariant: &'static str,
    /// Description of what went wrong.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// An invariant that can be checked against a session snapshot.
pub trait Invariant: Send + Sync {
    /// Invariant name for error reporting.
    fn name(&self) -> &'static str;

    /// Check the invariant.
    ///
    /// Returns `Ok(())` if it holds, or a [`Violation`] describing the first
    /// offending event.
    fn check(&self, session: &SessionSnapshot) -> InvariantResult;
}

/// Registry of invariants to check.
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InvariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { invariants: Vec::new() }
    }

    /// Create a registry with the client lifecycle invariants.
    ///
    /// Includes:
    /// - [`NoRepeatedStateDispatch`]: consecutive state events differ
    /// - [`TransitionsFollowTable`]: every state event is a legal transition
    /// - [`SingleInvitePerConversation`]: a conversation is offered once
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(NoRepeatedStateDispatch);
        registry.add(TransitionsFollowTable);
        registry.add(SingleInvitePerConversation);
        registry
    }

    /// Add an invariant to the registry.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Check all invariants.
    ///
    /// Returns `Ok(())` if all hold, or every violation found.
    pub fn check_all(&self, session: &SessionSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<_> =
            self.invariants.iter().filter_map(|inv| inv.check(session).err()).collect();

        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Check all invariants, panicking with every violation found.
    #[allow(clippy::panic, reason = "Test assertion helper")]
    pub fn assert_all(&self, session: &SessionSnapshot, context: &str) {
        if let Err(violations) = self.check_all(session) {
            let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("Invariant violation {context}:\n  {}", messages.join("\n  "));
        }
    }

    /// Number of registered invariants.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}
