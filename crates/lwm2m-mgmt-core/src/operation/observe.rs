//! Observe: register or cancel long-lived [`Observation`]s.
//!
//! The operation only holds a *weak* reference to each observation it was
//! given — the application's [`Observation`] handle is the strong owner.
//! If that handle is dropped before `perform`, the weak reference fails to
//! upgrade and the path silently drops from the request; every other entry
//! in the same operation still goes out. A successful per-path result is
//! what actually registers (or cancels) the observation with the session —
//! a second Observe at the same key replacing the first falls out of
//! [`crate::session::Session::register_observation`] doing a plain map
//! insert.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::{CoreError, ErrorKind};
use crate::ipc::MessageKind;
use crate::observation::{Observation, ObservationInner};
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;
use std::cell::RefCell;
use std::rc::Weak;

struct Entry {
    client_id: String,
    path: Path,
    weak: Weak<RefCell<ObservationInner>>,
    cancel: bool,
}

pub struct ObserveOperation {
    base: OperationBase,
    entries: Vec<Entry>,
}

impl ObserveOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Observe, true),
            entries: Vec::new(),
        }
    }

    /// Requests that `observation` be registered with the daemon and, on a
    /// successful per-path result, with the session's observation registry.
    pub fn add_observation(&mut self, observation: &Observation) -> Result<(), CoreError> {
        self.add(observation, false)
    }

    /// Requests that `observation` be cancelled. Cancelling an observation
    /// that was never registered still returns `Success` — the daemon, not
    /// this builder, is the source of truth for whether it was registered.
    pub fn add_cancel_observation(&mut self, observation: &Observation) -> Result<(), CoreError> {
        self.add(observation, true)
    }

    fn add(&mut self, observation: &Observation, cancel: bool) -> Result<(), CoreError> {
        let weak = observation.downgrade();
        if self.entries.iter().any(|e| e.weak.as_ptr() == weak.as_ptr()) {
            return Err(CoreError::new(ErrorKind::OperationInvalid)
                .with_message("observation already added to this operation"));
        }
        self.entries.push(Entry {
            client_id: observation.client_id(),
            path: observation.path(),
            weak,
            cancel,
        });
        Ok(())
    }

    pub fn perform(mut self, timeout: Option<Timeout>) -> Result<(PerformOutcome, Response), CoreError> {
        let mut live = Vec::new();
        for entry in &self.entries {
            let Some(rc) = entry.weak.upgrade() else {
                // Observation was freed before Perform; its path silently
                // drops from the request.
                continue;
            };
            self.base.client_tree(&entry.client_id).ensure_path(&entry.path);
            if entry.cancel {
                self.base
                    .message_mut()
                    .observe_cancellations
                    .push((entry.client_id.clone(), entry.path.to_string()));
            }
            live.push((entry.client_id.clone(), entry.path, entry.cancel, Observation { inner: rc }));
        }

        let session = self.base.session().clone();
        let (outcome, response) = self.base.perform(timeout)?;

        for (client_id, path, cancel, observation) in live {
            if !response.path_result(&client_id, &path).is_success() {
                continue;
            }
            if cancel {
                session.cancel_observation(&observation);
            } else {
                session.register_observation(&observation);
            }
        }

        Ok((outcome, response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::ipc::{Message, MessageType};
    use crate::test_support::MockChannel;
    use crate::tree::PathResult;
    use std::cell::Cell;
    use std::rc::Rc;

    fn success_session() -> Session {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            for (client_id, tree) in &request.clients {
                for path in tree.walk_resource_paths() {
                    response.client_tree(client_id).set_result(&path, PathResult::success());
                }
            }
            Some(response)
        })));
        session.connect(None).unwrap();
        session
    }

    #[test]
    fn successful_observe_registers_with_session() {
        let session = success_session();
        let path = Path::parse("/3/0/15").unwrap();
        let observation = Observation::new("TestClient1", path, |_changes| {});

        let mut op = ObserveOperation::new(&session);
        op.add_observation(&observation).unwrap();
        let (outcome, _response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);

        // A second Observe at the same (client, path) replaces the first
        // rather than erroring.
        let replacement = Observation::new("TestClient1", path, |_changes| {});
        let mut op2 = ObserveOperation::new(&session);
        op2.add_observation(&replacement).unwrap();
        op2.perform(None).unwrap();
    }

    #[test]
    fn adding_the_same_observation_twice_is_rejected() {
        let session = success_session();
        let observation = Observation::new("TestClient1", Path::parse("/3/0/15").unwrap(), |_changes| {});
        let mut op = ObserveOperation::new(&session);
        op.add_observation(&observation).unwrap();
        let err = op.add_observation(&observation).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInvalid);
    }

    #[test]
    fn dropping_observation_before_perform_drops_its_path_silently() {
        let session = success_session();
        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        let observation = Observation::new("TestClient1", Path::parse("/3/0/15").unwrap(), move |_changes| {
            fired_clone.set(true);
        });

        let mut op = ObserveOperation::new(&session);
        op.add_observation(&observation).unwrap();
        drop(observation);

        // Zero surviving paths; OperationBase's "requires_paths" check
        // rejects the otherwise-empty request.
        let err = op.perform(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInvalid);
        assert!(!fired.get());
    }

    #[test]
    fn cancel_observation_stops_further_callbacks() {
        let session = success_session();
        let path = Path::parse("/3/0/15").unwrap();
        let observation = Observation::new("TestClient1", path, |_changes| {});

        let mut register = ObserveOperation::new(&session);
        register.add_observation(&observation).unwrap();
        register.perform(None).unwrap();

        let mut cancel = ObserveOperation::new(&session);
        cancel.add_cancel_observation(&observation).unwrap();
        cancel.perform(None).unwrap();

        // The session no longer has anything registered at this key, so a
        // subsequent notification finds nothing to dispatch to.
        session.process(Timeout::from_millis(0)).ok();
        session.dispatch_callbacks();
    }
}
