//! Client state machine.
//!
//! The [`Client`] is the top-level orchestrator. It owns the overall
//! [`ClientState`], reacts to collaborator signals, creates the per-session
//! services, and drives the [`ConversationRegistry`] and
//! [`ContactSignalRouter`]. Everything it reports goes through one shared
//! [`EventDispatcher`].
//!
//! # Execution model
//!
//! Single-threaded and cooperative. Each input runs to completion, then the
//! client drains its [`Inbox`] in FIFO order. Handlers that want to change
//! client state post to the inbox instead of re-entering the client, so no
//! handler ever observes a half-applied transition.
//!
//! # Voluntary disconnects
//!
//! `logout` and fatal service errors set a die flag before asking the
//! collaborators to close. The next `ConnectionLost` consumes the flag and is
//! not reported as a network error.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    collaborator::{
        AddressBook, Backend, Collaborators, NotificationProtocol, OfflineMessageBox, Services,
        SwitchboardManager, Transport,
    },
    config::{ClientConfig, Credentials},
    contact::ContactId,
    conversation::{Conversation, InstantMessage},
    dispatcher::{EventDispatcher, HandlerId},
    error::ClientError,
    event::{AddressBookEvent, AuthenticationError, ClientErrorKind, Event, EventName},
    registry::ConversationRegistry,
    router::ContactSignalRouter,
    signal::{
        AddressBookSignal, ClientCommand, ClientSignal, Input, OimSignal, ProtocolSignal,
        SwitchboardHandler, SwitchboardSignal, TransportSignal,
    },
    state::ClientState,
};

/// Cloneable handle for posting work to a [`Client`].
///
/// Posted inputs are processed after the input currently being handled, or
/// on the next call to [`Client::run_pending`].
#[derive(Debug, Clone)]
pub struct Inbox {
    tx: mpsc::UnboundedSender<Input>,
}

impl Inbox {
    /// Post a collaborator signal.
    pub fn post(&self, signal: impl Into<ClientSignal>) -> Result<(), ClientError> {
        self.send(Input::Signal(signal.into()))
    }

    /// Post an application command.
    pub fn command(&self, command: ClientCommand) -> Result<(), ClientError> {
        self.send(Input::Command(command))
    }

    /// Post a login request.
    pub fn login(&self, credentials: Credentials) -> Result<(), ClientError> {
        self.command(ClientCommand::Login(credentials))
    }

    /// Post a logout request.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.command(ClientCommand::Logout)
    }

    /// Post a request to retire an external conversation.
    pub fn close_conversation(&self, conversation: Arc<Conversation>) -> Result<(), ClientError> {
        self.command(ClientCommand::CloseConversation(conversation))
    }

    fn send(&self, input: Input) -> Result<(), ClientError> {
        self.tx.send(input).map_err(|_| ClientError::InboxClosed)
    }
}

/// Instant-messaging client orchestrator.
///
/// Generic over [`Backend`] so production collaborators and simulated ones
/// run through identical state machine code.
pub struct Client<B: Backend> {
    /// Observability context entered for every operation.
    span: tracing::Span,
    config: ClientConfig,
    backend: B,
    transport: B::Transport,
    protocol: B::Protocol,
    switchboards: B::Switchboards,
    /// Per-session services. `None` until the first transport connection.
    services: Option<Services<B>>,
    /// Credentials of the last login. `None` before the first login.
    profile: Option<Credentials>,
    state: ClientState,
    /// Set before a voluntary disconnect, consumed by the next
    /// `ConnectionLost`.
    die: bool,
    dispatcher: Arc<EventDispatcher>,
    conversations: ConversationRegistry,
    contacts: ContactSignalRouter,
    inbox_tx: mpsc::UnboundedSender<Input>,
    inbox_rx: mpsc::UnboundedReceiver<Input>,
}

impl<B: Backend> Client<B> {
    /// Create a closed client.
    pub fn new(backend: B, collaborators: Collaborators<B>, config: ClientConfig) -> Self {
        let span = tracing::info_span!(
            "client",
            server = %config.server,
            account = tracing::field::Empty
        );
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let Collaborators { transport, protocol, switchboards } = collaborators;

        Self {
            span,
            config,
            backend,
            transport,
            protocol,
            switchboards,
            services: None,
            profile: None,
            state: ClientState::Closed,
            die: false,
            dispatcher: Arc::new(EventDispatcher::new()),
            conversations: ConversationRegistry::new(),
            contacts: ContactSignalRouter::new(),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Replace the observability context.
    ///
    /// The span should declare an `account` field; it is recorded at login.
    #[must_use]
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Current client state.
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Credentials of the last login. `None` before the first login.
    pub fn profile(&self) -> Option<&Credentials> {
        self.profile.as_ref()
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared event dispatcher.
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Register an event handler on the shared dispatcher.
    pub fn register(
        &self,
        name: EventName,
        handler: impl Fn(&Event) + Send + Sync + 'static,
    ) -> HandlerId {
        self.dispatcher.register(name, handler)
    }

    /// Handle for posting inputs from handlers and collaborators.
    pub fn inbox(&self) -> Inbox {
        Inbox { tx: self.inbox_tx.clone() }
    }

    /// External conversation index.
    pub fn conversations(&self) -> &ConversationRegistry {
        &self.conversations
    }

    /// Contact subscriptions.
    pub fn contacts(&self) -> &ContactSignalRouter {
        &self.contacts
    }

    /// Per-session services. `None` until the first transport connection.
    pub fn services(&self) -> Option<&Services<B>> {
        self.services.as_ref()
    }

    /// Notification server transport.
    pub fn transport(&self) -> &B::Transport {
        &self.transport
    }

    /// Notification protocol.
    pub fn protocol(&self) -> &B::Protocol {
        &self.protocol
    }

    /// Switchboard manager.
    pub fn switchboards(&self) -> &B::Switchboards {
        &self.switchboards
    }

    /// Sign in.
    ///
    /// Stores the credentials, asks the transport to connect and moves to
    /// `CONNECTING`.
    ///
    /// # Errors
    ///
    /// - `ClientError::Precondition` if the client is not `CLOSED`. The state
    ///   is left unchanged.
    pub fn login(&mut self, credentials: Credentials) -> Result<(), ClientError> {
        let span = self.span.clone();
        let _enter = span.enter();

        self.start_login(credentials)?;
        self.run_pending();
        Ok(())
    }

    /// Sign out.
    ///
    /// Only acts while `OPEN`; anywhere else this is a no-op. Does not wait
    /// for the transport to confirm the disconnect.
    pub fn logout(&mut self) {
        let span = self.span.clone();
        let _enter = span.enter();

        self.sign_out();
        self.run_pending();
    }

    /// Retire an externally-initiated conversation.
    ///
    /// Returns `false` if it was not registered.
    pub fn close_conversation(&mut self, conversation: &Arc<Conversation>) -> bool {
        let span = self.span.clone();
        let _enter = span.enter();

        let removed = self.conversations.unregister_external(conversation);
        self.run_pending();
        removed
    }

    /// Process a collaborator signal, then everything it caused to be posted.
    pub fn handle(&mut self, signal: impl Into<ClientSignal>) {
        let span = self.span.clone();
        let _enter = span.enter();

        self.process(Input::Signal(signal.into()));
        self.run_pending();
    }

    /// Process every input waiting in the inbox.
    ///
    /// Returns the number of inputs processed.
    pub fn run_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(input) = self.inbox_rx.try_recv() {
            self.process(input);
            processed += 1;
        }
        processed
    }

    fn process(&mut self, input: Input) {
        match input {
            Input::Signal(signal) => self.process_signal(signal),
            Input::Command(command) => self.process_command(command),
        }
    }

    fn process_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::Login(credentials) => {
                if let Err(e) = self.start_login(credentials) {
                    tracing::error!(error = %e, "posted login rejected");
                }
            },
            ClientCommand::Logout => self.sign_out(),
            ClientCommand::CloseConversation(conversation) => {
                self.conversations.unregister_external(&conversation);
            },
        }
    }

    fn process_signal(&mut self, signal: ClientSignal) {
        match signal {
            ClientSignal::Transport(signal) => self.on_transport(signal),
            ClientSignal::Protocol(signal) => self.on_protocol(signal),
            ClientSignal::Switchboard(signal) => self.on_switchboard(signal),
            ClientSignal::AddressBook(signal) => self.on_address_book(signal),
            ClientSignal::OfflineMessages(signal) => self.on_offline_messages(signal),
            ClientSignal::Contact(signal) => {
                self.contacts.route(signal, &self.dispatcher);
            },
        }
    }

    fn start_login(&mut self, credentials: Credentials) -> Result<(), ClientError> {
        if self.state != ClientState::Closed {
            return Err(ClientError::Precondition { state: self.state, operation: "login" });
        }

        self.span.record("account", credentials.account.as_str());
        tracing::info!("logging in");

        self.die = false;
        self.profile = Some(credentials);
        self.transport.establish_connection();
        self.set_state(ClientState::Connecting);
        Ok(())
    }

    fn sign_out(&mut self) {
        if self.state != ClientState::Open {
            tracing::debug!(state = %self.state, "logout ignored outside OPEN");
            return;
        }

        tracing::info!("logging out");
        self.die = true;
        self.protocol.sign_off();
        self.switchboards.close();
        self.set_state(ClientState::Closed);
    }

    fn on_transport(&mut self, signal: TransportSignal) {
        match signal {
            TransportSignal::ConnectionSuccess => self.on_connected(),
            TransportSignal::ConnectionFailure { reason } => {
                tracing::warn!(%reason, "connection failed");
                self.report(ClientErrorKind::Network { reason });
                self.close();
            },
            TransportSignal::ConnectionLost { reason } => {
                let voluntary = std::mem::take(&mut self.die);
                if voluntary {
                    tracing::debug!(%reason, "connection closed after voluntary disconnect");
                } else {
                    tracing::warn!(%reason, "connection lost");
                    self.report(ClientErrorKind::Network { reason });
                }
                self.close();
            },
        }
    }

    fn on_connected(&mut self) {
        if self.state != ClientState::Connecting {
            tracing::warn!(state = %self.state, "unexpected connection success ignored");
            return;
        }
        let Some(credentials) = self.profile.as_ref() else {
            tracing::warn!("connection success without credentials ignored");
            return;
        };

        let services = Services::create(&mut self.backend, credentials, &self.config.proxies);
        self.services = Some(services);
        self.contacts.clear();
        self.set_state(ClientState::Connected);
    }

    fn on_protocol(&mut self, signal: ProtocolSignal) {
        match signal {
            ProtocolSignal::StateChanged => self.on_protocol_state_changed(),
            ProtocolSignal::UnmanagedMessage { sender, message } => {
                self.on_unmanaged_message(sender, message);
            },
            ProtocolSignal::AuthenticationFailed => {
                tracing::warn!("authentication failed");
                self.report(ClientErrorKind::Authentication(
                    AuthenticationError::InvalidUsernameOrPassword,
                ));
                self.abort_session();
            },
        }
    }

    fn on_protocol_state_changed(&mut self) {
        let protocol_state = self.protocol.state();
        let Some(target) = protocol_state.client_state() else {
            tracing::trace!(?protocol_state, "protocol state without client mirror");
            return;
        };

        if self.state == ClientState::Closed {
            tracing::debug!(%target, "protocol state change ignored while CLOSED");
            return;
        }
        if target == self.state {
            return;
        }
        if target.protocol_predecessor() != Some(self.state) {
            tracing::warn!(
                from = %self.state,
                to = %target,
                "off-table protocol transition ignored"
            );
            return;
        }

        if target == ClientState::Open {
            self.subscribe_im_contacts();
        }
        self.set_state(target);
    }

    fn subscribe_im_contacts(&mut self) {
        let Some(services) = self.services.as_ref() else {
            tracing::warn!("no address book to subscribe contacts from");
            return;
        };

        let contacts = services.address_book.contacts();
        let subscribed = contacts
            .iter()
            .filter(|contact| contact.attributes.im_contact)
            .filter(|contact| self.contacts.subscribe(contact))
            .count();
        tracing::debug!(subscribed, "subscribed messenger contacts");
    }

    fn on_unmanaged_message(&mut self, sender: ContactId, message: InstantMessage) {
        tracing::debug!(%sender, "unmanaged message received");
        self.conversations.route_unmanaged_message(sender, message, &self.dispatcher);
    }

    fn on_switchboard(&mut self, signal: SwitchboardSignal) {
        match signal {
            SwitchboardSignal::HandlerCreated(SwitchboardHandler::Conversation(conversation)) => {
                let invited = self.dispatcher.dispatch(&Event::InviteConversation(conversation));
                if invited == 0 {
                    tracing::warn!("no event handler attached for conversations");
                }
            },
            SwitchboardSignal::HandlerCreated(SwitchboardHandler::Other { kind }) => {
                tracing::warn!(%kind, "unknown switchboard handler");
            },
        }
    }

    fn on_address_book(&mut self, signal: AddressBookSignal) {
        match signal {
            AddressBookSignal::Error { code } => {
                tracing::warn!(%code, "address book error");
                self.report(ClientErrorKind::AddressBook { code });
                self.abort_session();
            },
            AddressBookSignal::Event(event) => {
                if let AddressBookEvent::MessengerContactAdded(contact) = &event {
                    self.contacts.subscribe(contact);
                }
                self.dispatcher.dispatch(&Event::AddressBook(event));
            },
        }
    }

    fn on_offline_messages(&mut self, signal: OimSignal) {
        match signal {
            OimSignal::StateChanged => {
                let Some(services) = self.services.as_ref() else {
                    tracing::warn!("offline message state change without a mailbox");
                    return;
                };
                let state = services.offline_messages.state();
                self.dispatcher.dispatch(&Event::OimStateChanged(state));
            },
            OimSignal::Error { code } => {
                tracing::warn!(%code, "offline message error");
                self.report(ClientErrorKind::OfflineMessages { code });
            },
            OimSignal::Event(event) => {
                self.dispatcher.dispatch(&Event::Oim(event));
            },
        }
    }

    /// Tear down after a fatal authentication or service error.
    fn abort_session(&mut self) {
        self.die = true;
        self.transport.lose_connection();
        self.close();
    }

    fn close(&mut self) {
        if self.state != ClientState::Closed {
            self.set_state(ClientState::Closed);
        }
    }

    fn report(&self, kind: ClientErrorKind) {
        self.dispatcher.dispatch(&Event::ClientError(kind));
    }

    fn set_state(&mut self, state: ClientState) {
        tracing::info!(from = %self.state, to = %state, "client state changed");
        self.state = state;
        self.dispatcher.dispatch(&Event::ClientStateChanged(state));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use super::*;
    use crate::{
        config::ProxyConfig,
        contact::Contact,
        state::{OimState, ProtocolState},
    };

    #[derive(Default)]
    struct Shared {
        protocol_state: Option<ProtocolState>,
        calls: Vec<&'static str>,
        contacts: Vec<Contact>,
    }

    type SharedRef = Arc<Mutex<Shared>>;

    fn lock(shared: &SharedRef) -> std::sync::MutexGuard<'_, Shared> {
        shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    struct Fake(SharedRef);

    impl Transport for Fake {
        fn establish_connection(&mut self) {
            lock(&self.0).calls.push("establish_connection");
        }

        fn lose_connection(&mut self) {
            lock(&self.0).calls.push("lose_connection");
        }
    }

    impl NotificationProtocol for Fake {
        fn state(&self) -> ProtocolState {
            lock(&self.0).protocol_state.unwrap_or(ProtocolState::Closed)
        }

        fn sign_off(&mut self) {
            lock(&self.0).calls.push("sign_off");
        }
    }

    impl SwitchboardManager for Fake {
        fn close(&mut self) {
            lock(&self.0).calls.push("close_switchboards");
        }
    }

    impl AddressBook for Fake {
        fn contacts(&self) -> Vec<Contact> {
            lock(&self.0).contacts.clone()
        }
    }

    impl OfflineMessageBox for Fake {
        fn state(&self) -> OimState {
            OimState::Synchronized
        }
    }

    struct FakeBackend(SharedRef);

    impl Backend for FakeBackend {
        type Transport = Fake;
        type Protocol = Fake;
        type Switchboards = Fake;
        type SingleSignOn = ();
        type AddressBook = Fake;
        type OfflineMessages = Fake;
        type Spaces = ();

        fn single_sign_on(&mut self, _: &Credentials, _: &ProxyConfig) {
            lock(&self.0).calls.push("single_sign_on");
        }

        fn address_book(&mut self, _: &(), _: &ProxyConfig) -> Fake {
            Fake(Arc::clone(&self.0))
        }

        fn offline_messages(&mut self, _: &(), _: &ProxyConfig) -> Fake {
            Fake(Arc::clone(&self.0))
        }

        fn spaces(&mut self, _: &(), _: &ProxyConfig) {}
    }

    fn client() -> (Client<FakeBackend>, SharedRef, Arc<Mutex<Vec<Event>>>) {
        let shared = SharedRef::default();
        let collaborators = Collaborators {
            transport: Fake(Arc::clone(&shared)),
            protocol: Fake(Arc::clone(&shared)),
            switchboards: Fake(Arc::clone(&shared)),
        };
        let client = Client::new(
            FakeBackend(Arc::clone(&shared)),
            collaborators,
            ClientConfig::default(),
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        for name in EventName::ALL {
            let sink = Arc::clone(&events);
            client.register(name, move |e| {
                sink.lock().unwrap_or_else(PoisonError::into_inner).push(e.clone());
            });
        }
        (client, shared, events)
    }

    fn credentials() -> Credentials {
        Credentials::new("me@example.com", "secret")
    }

    fn advance(client: &mut Client<FakeBackend>, shared: &SharedRef, state: ProtocolState) {
        lock(shared).protocol_state = Some(state);
        client.handle(ProtocolSignal::StateChanged);
    }

    fn open(client: &mut Client<FakeBackend>, shared: &SharedRef) {
        client.login(credentials()).unwrap_or_else(|e| panic!("login failed: {e}"));
        client.handle(TransportSignal::ConnectionSuccess);
        for state in [
            ProtocolState::Authenticating,
            ProtocolState::Authenticated,
            ProtocolState::Synchronizing,
            ProtocolState::Synchronized,
            ProtocolState::Open,
        ] {
            advance(client, shared, state);
        }
    }

    fn states(events: &Arc<Mutex<Vec<Event>>>) -> Vec<ClientState> {
        events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|e| match e {
                Event::ClientStateChanged(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn login_connects_and_stores_profile() {
        let (mut client, shared, events) = client();
        assert!(client.login(credentials()).is_ok());

        assert_eq!(client.state(), ClientState::Connecting);
        assert_eq!(client.profile().map(|p| p.account.as_str()), Some("me@example.com"));
        assert_eq!(lock(&shared).calls, vec!["establish_connection"]);
        assert_eq!(states(&events), vec![ClientState::Connecting]);
    }

    #[test]
    fn double_login_fails_loudly() {
        let (mut client, _, _) = client();
        assert!(client.login(credentials()).is_ok());

        let err = client.login(credentials());
        assert_eq!(
            err,
            Err(ClientError::Precondition { state: ClientState::Connecting, operation: "login" })
        );
        assert_eq!(client.state(), ClientState::Connecting);
    }

    #[test]
    fn connection_success_creates_services() {
        let (mut client, shared, _) = client();
        assert!(client.login(credentials()).is_ok());
        client.handle(TransportSignal::ConnectionSuccess);

        assert_eq!(client.state(), ClientState::Connected);
        assert!(client.services().is_some());
        assert!(lock(&shared).calls.contains(&"single_sign_on"));
    }

    #[test]
    fn open_subscribes_only_im_contacts() {
        let (mut client, shared, _) = client();
        lock(&shared).contacts = vec![
            Contact::new("alice@example.com").im_contact(),
            Contact::new("pending@example.com"),
        ];

        open(&mut client, &shared);

        assert_eq!(client.state(), ClientState::Open);
        assert!(client.contacts().is_subscribed(&"alice@example.com".into()));
        assert!(!client.contacts().is_subscribed(&"pending@example.com".into()));
    }

    #[test]
    fn logout_outside_open_is_noop() {
        let (mut client, shared, events) = client();
        client.logout();
        assert_eq!(client.state(), ClientState::Closed);
        assert!(events.lock().unwrap_or_else(PoisonError::into_inner).is_empty());
        assert!(lock(&shared).calls.is_empty());
    }

    #[test]
    fn logout_suppresses_following_connection_lost() {
        let (mut client, shared, events) = client();
        open(&mut client, &shared);
        client.logout();

        assert_eq!(client.state(), ClientState::Closed);
        assert!(lock(&shared).calls.ends_with(&["sign_off", "close_switchboards"]));

        client.handle(TransportSignal::ConnectionLost { reason: "closed".into() });
        let errors = events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| matches!(e, Event::ClientError(_)))
            .count();
        assert_eq!(errors, 0);
    }

    #[test]
    fn handler_posted_logout_runs_after_dispatch() {
        let (mut client, shared, _) = client();
        let inbox = client.inbox();
        client.register(EventName::ClientStateChanged, move |e| {
            if matches!(e, Event::ClientStateChanged(ClientState::Open)) {
                let _ = inbox.logout();
            }
        });

        open(&mut client, &shared);

        assert_eq!(client.state(), ClientState::Closed);
    }
}
