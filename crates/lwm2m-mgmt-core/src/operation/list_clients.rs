//! List Clients: no builder inputs, one per-client registered-entity
//! iterator in the response.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;

pub struct ListClientsOperation {
    base: OperationBase,
}

impl ListClientsOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::ListClients, false),
        }
    }

    pub fn perform(self, timeout: Option<Timeout>) -> Result<(PerformOutcome, Response), CoreError> {
        self.base.perform(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::ipc::{Message, MessageType};
    use crate::test_support::MockChannel;

    #[test]
    fn list_clients_with_no_registrations_succeeds() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        })));
        session.connect(None).unwrap();

        let (outcome, response) = ListClientsOperation::new(&session).perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        assert_eq!(response.client_ids().count(), 0);
    }
}
