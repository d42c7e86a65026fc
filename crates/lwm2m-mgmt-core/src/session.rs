//! Session lifecycle: the connection to the daemon.
//!
//! A [`Session`] is a cheap-clone handle around `Rc<RefCell<..>>` rather
//! than a type the application holds behind `&mut` — [`crate::changeset::ChangeSet`]
//! and the server events each carry an owning session reference, and
//! rejecting `Perform` when called from inside a dispatched callback needs
//! a *runtime* check, which only works if the callback can reach the
//! session at all. `Session` is not `Send`/`Sync`: it isn't thread-safe,
//! and any cross-thread use needs external synchronisation, which here
//! means wrapping the whole handle, not just guarding individual fields.

use crate::changeset::ChangeSet;
use crate::config::{SessionConfig, Timeout};
use crate::definition::DefinitionRegistry;
use crate::error::{CoreError, ErrorKind};
use crate::ipc::{IpcChannel, IpcTransport, Message, MessageKind, MessageType};
use crate::observation::Observation;
use crate::path::Path;
use crate::response::{ClientResponse, Response};
use crate::server_events::{ClientDeregisterEvent, ClientRegisterEvent, ClientUpdateEvent, ServerEvent};
use crate::tree::ObjectsTree;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::{Rc, Weak};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type RegisterCallback = Box<dyn FnMut(ClientRegisterEvent)>;
type UpdateCallback = Box<dyn FnMut(ClientUpdateEvent)>;
type DeregisterCallback = Box<dyn FnMut(ClientDeregisterEvent)>;

struct SessionInner {
    config: SessionConfig,
    channel: Option<Box<dyn IpcChannel>>,
    registry: DefinitionRegistry,
    session_id: u32,
    next_message_id: u32,
    connected: bool,
    notifications: VecDeque<Message>,
    observations: HashMap<(String, String), Weak<RefCell<crate::observation::ObservationInner>>>,
    on_register: Option<RegisterCallback>,
    on_update: Option<UpdateCallback>,
    on_deregister: Option<DeregisterCallback>,
    /// Set for the duration of `dispatch_callbacks`; `perform` checks it
    /// and refuses re-entrant calls instead of blocking.
    dispatching: bool,
}

/// Owns the registry, IPC channel, pending operations' shared state,
/// notification queue, and event-callback table for one connection to the
/// daemon.
#[derive(Clone)]
pub struct Session(Rc<RefCell<SessionInner>>);

impl Session {
    /// `New` requires no I/O.
    pub fn new(config: SessionConfig) -> Self {
        Self(Rc::new(RefCell::new(SessionInner {
            config,
            channel: None,
            registry: DefinitionRegistry::new(),
            session_id: 0,
            next_message_id: 1,
            connected: false,
            notifications: VecDeque::new(),
            observations: HashMap::new(),
            on_register: None,
            on_update: None,
            on_deregister: None,
            dispatching: false,
        })))
    }

    /// Installs a custom IPC channel (a mock, in tests) before `connect`.
    /// Production callers can skip this — `connect` lazily builds a real
    /// [`IpcTransport`] from the session's configured address/port.
    pub fn configure_ipc(&self, channel: Box<dyn IpcChannel>) {
        self.0.borrow_mut().channel = Some(channel);
    }

    /// Sends a `Connect` request and, on success, replaces the registry
    /// with the object definitions the daemon returns.
    pub fn connect(&self, timeout: Option<Timeout>) -> Result<(), CoreError> {
        let mut inner = self.0.borrow_mut();
        if inner.channel.is_none() {
            let (address, port) = inner.config.socket_addr();
            let transport = IpcTransport::connect((address.as_str(), port))
                .map_err(|e| CoreError::new(ErrorKind::IpcError).with_cause(e))?;
            inner.channel = Some(Box::new(transport));
        }
        inner.session_id = generate_session_id();
        let message_id = inner.next_message_id;
        inner.next_message_id = inner.next_message_id.wrapping_add(1);
        let request = Message::new(MessageType::Request, MessageKind::Connect, inner.session_id, Some(message_id));

        let duration = resolve_timeout(timeout, inner.config.default_timeout());
        let registry_snapshot = inner.registry.clone();
        let channel = inner.channel.as_mut().expect("just assigned above");
        let response = channel
            .send_request_await_response(&request, duration, &registry_snapshot)
            .map_err(|e| CoreError::new(ErrorKind::IpcError).with_cause(e))?
            .ok_or_else(|| CoreError::new(ErrorKind::Timeout))?;

        inner.registry.replace_all(response.object_definitions);
        inner.connected = true;
        tracing::info!(session_id = inner.session_id, "connected to daemon");
        Ok(())
    }

    /// Idempotent; sends `Disconnect` best-effort if still connected.
    pub fn disconnect(&self) {
        let mut inner = self.0.borrow_mut();
        if !inner.connected {
            return;
        }
        if let Some(channel) = inner.channel.as_mut() {
            let session_id = inner.session_id;
            let message_id = inner.next_message_id;
            inner.next_message_id = inner.next_message_id.wrapping_add(1);
            let request = Message::new(MessageType::Request, MessageKind::Disconnect, session_id, Some(message_id));
            if let Err(e) = channel.send_best_effort(&request) {
                tracing::warn!(error = %e, "best-effort Disconnect failed");
            }
        }
        inner.connected = false;
        tracing::info!("disconnected from daemon");
    }

    pub fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    pub fn default_timeout(&self) -> Timeout {
        Timeout::from(self.0.borrow().config.default_timeout())
    }

    pub fn is_object_defined(&self, object_id: u16) -> bool {
        self.0.borrow().registry.is_object_defined(object_id)
    }

    /// IDs of every object currently in the registry.
    pub fn defined_object_ids(&self) -> Vec<u16> {
        self.0.borrow().registry.iter().map(|d| d.object_id()).collect()
    }

    /// Drains notifications from the IPC channel into the session's
    /// internal queue. Blocks up to `timeout`.
    pub fn process(&self, timeout: Timeout) -> Result<(), CoreError> {
        let mut inner = self.0.borrow_mut();
        if !inner.connected {
            return Err(CoreError::new(ErrorKind::SessionNotConnected));
        }
        let duration = timeout.to_duration().ok_or_else(|| {
            CoreError::new(ErrorKind::OperationInvalid).with_message("negative timeout")
        })?;
        let registry_snapshot = inner.registry.clone();
        let channel = inner.channel.as_mut().ok_or_else(|| CoreError::new(ErrorKind::SessionNotConnected))?;
        channel
            .drain_notifications(duration, &registry_snapshot)
            .map_err(|e| CoreError::new(ErrorKind::IpcError).with_cause(e))?;
        while let Some(message) = channel.pop_notification() {
            inner.notifications.push_back(message);
        }
        Ok(())
    }

    /// Invokes user callbacks for every notification queued by `process`
    /// (or by a recent `Perform`), in FIFO order. Runs entirely on the
    /// calling thread.
    pub fn dispatch_callbacks(&self) {
        loop {
            let next = self.0.borrow_mut().notifications.pop_front();
            let Some(message) = next else { break };
            self.dispatch_one(message);
        }
    }

    fn dispatch_one(&self, message: Message) {
        self.0.borrow_mut().dispatching = true;
        match message.kind {
            MessageKind::NotifyObserve => self.dispatch_observe(message),
            MessageKind::NotifyClientRegister => self.dispatch_client_event(message, ClientEventKind::Register),
            MessageKind::NotifyClientUpdate => self.dispatch_client_event(message, ClientEventKind::Update),
            MessageKind::NotifyClientDeregister => self.dispatch_client_event(message, ClientEventKind::Deregister),
            other => tracing::debug!(?other, "ignoring notification of unexpected kind"),
        }
        self.0.borrow_mut().dispatching = false;
    }

    fn dispatch_observe(&self, message: Message) {
        for (client_id, tree) in message.clients {
            let changed_paths = tree.all_changed_paths();
            let mut already_fired = std::collections::HashSet::new();
            for changed in &changed_paths {
                let matching: Vec<Observation> = {
                    let inner = self.0.borrow();
                    inner
                        .observations
                        .iter()
                        .filter(|(key, _)| key.0 == client_id)
                        .filter_map(|(key, weak)| {
                            let observed_path = Path::parse(&key.1).ok()?;
                            if !observed_path.contains(changed) {
                                return None;
                            }
                            weak.upgrade().map(|rc| Observation { inner: rc })
                        })
                        .collect()
                };
                for observation in matching {
                    let key = observation.registry_key();
                    if !already_fired.insert(key) {
                        continue;
                    }
                    let changeset = ChangeSet::new(self.clone(), client_id.clone(), ClientResponse::new(tree.clone()));
                    observation.invoke(&changeset);
                }
            }
        }
    }

    fn dispatch_client_event(&self, message: Message, kind: ClientEventKind) {
        let response = Response::from_tree(message.clients);
        let event = ServerEvent::new(response);
        match kind {
            ClientEventKind::Register => {
                self.invoke_taken(|inner| &mut inner.on_register, ClientRegisterEvent(event));
            }
            ClientEventKind::Update => {
                self.invoke_taken(|inner| &mut inner.on_update, ClientUpdateEvent(event));
            }
            ClientEventKind::Deregister => {
                self.invoke_taken(|inner| &mut inner.on_deregister, ClientDeregisterEvent(event));
            }
        }
    }

    /// Temporarily takes the callback out of the slot so it can be invoked
    /// without holding `inner`'s borrow — the callback may call back into
    /// the session (e.g. to re-`set_on_client_register`), which would
    /// otherwise panic on a re-borrow.
    fn invoke_taken<T, F>(&self, slot: F, event: T)
    where
        F: Fn(&mut SessionInner) -> &mut Option<Box<dyn FnMut(T)>>,
    {
        let taken = slot(&mut self.0.borrow_mut()).take();
        if let Some(mut callback) = taken {
            callback(event);
            let mut inner = self.0.borrow_mut();
            let target = slot(&mut inner);
            if target.is_none() {
                *target = Some(callback);
            }
        }
    }

    pub fn set_on_client_register(&self, callback: impl FnMut(ClientRegisterEvent) + 'static) {
        self.0.borrow_mut().on_register = Some(Box::new(callback));
    }

    pub fn clear_on_client_register(&self) {
        self.0.borrow_mut().on_register = None;
    }

    pub fn set_on_client_update(&self, callback: impl FnMut(ClientUpdateEvent) + 'static) {
        self.0.borrow_mut().on_update = Some(Box::new(callback));
    }

    pub fn clear_on_client_update(&self) {
        self.0.borrow_mut().on_update = None;
    }

    pub fn set_on_client_deregister(&self, callback: impl FnMut(ClientDeregisterEvent) + 'static) {
        self.0.borrow_mut().on_deregister = Some(Box::new(callback));
    }

    pub fn clear_on_client_deregister(&self) {
        self.0.borrow_mut().on_deregister = None;
    }

    /// Registers the observation at `(clientId, path)`, replacing whatever
    /// was previously registered at that key.
    pub(crate) fn register_observation(&self, observation: &Observation) {
        let key = observation.registry_key();
        self.0.borrow_mut().observations.insert(key, observation.downgrade());
    }

    /// Removes a specific observation from the registry if it is still the
    /// one registered at its key (cancelling a stale duplicate must not
    /// evict whatever replaced it).
    pub(crate) fn cancel_observation(&self, observation: &Observation) {
        let key = observation.registry_key();
        let mut inner = self.0.borrow_mut();
        if let Some(weak) = inner.observations.get(&key) {
            if let Some(current) = weak.upgrade() {
                if Rc::ptr_eq(&current, &observation.inner) {
                    inner.observations.remove(&key);
                }
            } else {
                inner.observations.remove(&key);
            }
        }
    }

    /// Shared `Perform` plumbing for every operation type.
    /// Validates the timeout and connection state, stamps the request with
    /// a fresh message ID, and folds per-path results into an overall
    /// [`crate::response::PerformOutcome`].
    pub(crate) fn perform(
        &self,
        mut request: Message,
        timeout: Timeout,
    ) -> Result<(crate::response::PerformOutcome, BTreeMap<String, ObjectsTree>), CoreError> {
        if !timeout.is_valid() {
            return Err(CoreError::new(ErrorKind::OperationInvalid).with_message("negative timeout"));
        }
        let mut inner = self.0.borrow_mut();
        if !inner.connected {
            return Err(CoreError::new(ErrorKind::SessionNotConnected));
        }
        if inner.dispatching {
            return Err(CoreError::new(ErrorKind::OperationInvalid)
                .with_message("cannot Perform from inside a dispatched callback"));
        }

        let session_id = inner.session_id;
        let message_id = inner.next_message_id;
        inner.next_message_id = inner.next_message_id.wrapping_add(1);
        request.session_id = session_id;
        request.message_id = Some(message_id);

        let duration = timeout.to_duration().expect("validated above");
        let registry_snapshot = inner.registry.clone();
        let channel = inner.channel.as_mut().ok_or_else(|| CoreError::new(ErrorKind::SessionNotConnected))?;

        tracing::debug!(kind = ?request.kind, message_id, "sending request");
        let outcome = channel.send_request_await_response(&request, duration, &registry_snapshot);
        while let Some(notification) = channel.pop_notification() {
            inner.notifications.push_back(notification);
        }
        let response = outcome
            .map_err(|e| CoreError::new(ErrorKind::IpcError).with_cause(e))?
            .ok_or_else(|| CoreError::new(ErrorKind::Timeout))?;

        let all_results: Vec<_> = response.clients.values().flat_map(|t| t.all_results()).collect();
        let outcome = crate::response::outcome_for(all_results.into_iter());
        Ok((outcome, response.clients))
    }

    /// Repeatedly calls [`Session::process`] then [`Session::dispatch_callbacks`]
    /// until `should_stop` returns `true`, checked between iterations.
    /// `poll_timeout` bounds how long each `process` call blocks waiting for
    /// a notification, so `should_stop` is re-checked at least that often.
    pub fn run_until(&self, poll_timeout: Timeout, mut should_stop: impl FnMut() -> bool) -> Result<(), CoreError> {
        while !should_stop() {
            self.process(poll_timeout)?;
            self.dispatch_callbacks();
        }
        Ok(())
    }

    /// Updates the registry after a successful `Define`, atomically adding
    /// the newly-defined objects.
    pub(crate) fn add_to_registry(&self, definition: crate::definition::ObjectDefinition) -> Result<(), CoreError> {
        self.0.borrow_mut().registry.add(definition)
    }
}

enum ClientEventKind {
    Register,
    Update,
    Deregister,
}

fn resolve_timeout(timeout: Option<Timeout>, default: Duration) -> Duration {
    match timeout {
        Some(t) => t.to_duration().unwrap_or(default),
        None => default,
    }
}

fn generate_session_id() -> u32 {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().subsec_nanos();
    nanos ^ 0x5bd1_e995
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockChannel;
    use std::cell::Cell;
    use std::rc::Rc as StdRc;

    fn connected_session() -> Session {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        })));
        session.connect(None).unwrap();
        session
    }

    #[test]
    fn connect_populates_registry_from_daemon() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            response.object_definitions.push(crate::definition::ObjectDefinition::new(10000, "Test", 0, 1));
            Some(response)
        })));
        session.connect(None).unwrap();
        assert!(session.is_object_defined(10000));
    }

    #[test]
    fn disconnect_is_idempotent() {
        let session = connected_session();
        session.disconnect();
        session.disconnect();
        assert!(!session.is_connected());
    }

    #[test]
    fn perform_rejects_when_not_connected() {
        let session = Session::new(SessionConfig::new());
        let request = Message::new(MessageType::Request, MessageKind::Read, 0, None);
        let err = session.perform(request, Timeout::from_millis(100)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SessionNotConnected);
    }

    #[test]
    fn perform_rejects_negative_timeout() {
        let session = connected_session();
        let request = Message::new(MessageType::Request, MessageKind::Read, 0, None);
        let err = session.perform(request, Timeout::from_millis(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInvalid);
    }

    #[test]
    fn perform_from_inside_callback_is_refused() {
        let session = connected_session();
        let refused = StdRc::new(Cell::new(false));
        let refused_clone = refused.clone();
        let inner_session = session.clone();
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, MessageKind::NotifyClientRegister, request.session_id, None);
            response.kind = MessageKind::NotifyClientRegister;
            Some(response)
        })));

        session.set_on_client_register(move |_event| {
            let request = Message::new(MessageType::Request, MessageKind::Read, 0, None);
            let result = inner_session.perform(request, Timeout::from_millis(100));
            refused_clone.set(matches!(result, Err(e) if e.kind() == ErrorKind::OperationInvalid));
        });

        // Manually enqueue a notification as `process` would.
        session
            .0
            .borrow_mut()
            .notifications
            .push_back(Message::new(MessageType::Notification, MessageKind::NotifyClientRegister, 0, None));
        session.dispatch_callbacks();
        assert!(refused.get(), "Perform inside a callback must be refused");
    }
}
