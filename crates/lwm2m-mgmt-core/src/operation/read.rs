//! Read: fetch values at one or more paths.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;

pub struct ReadOperation {
    base: OperationBase,
}

impl ReadOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Read, true),
        }
    }

    /// `path` may address an object, an object instance, or a resource.
    pub fn add_path(&mut self, client_id: &str, path: Path) {
        self.base.client_tree(client_id).ensure_path(&path);
    }

    pub fn perform(self, timeout: Option<Timeout>) -> Result<(PerformOutcome, Response), CoreError> {
        self.base.perform(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::error::ErrorKind;
    use crate::ipc::{Message, MessageType};
    use crate::test_support::MockChannel;
    use crate::tree::PathResult;
    use crate::value::Value;

    #[test]
    fn read_returns_default_value_for_created_instance() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            let path = Path::parse("/10000/0/0").unwrap();
            let tree = response.client_tree("TestClient1");
            tree.set_value(&path, Value::Integer(123456787));
            tree.set_result(&path, PathResult::success());
            Some(response)
        })));
        session.connect(None).unwrap();

        let mut op = ReadOperation::new(&session);
        op.add_path("TestClient1", Path::parse("/10000/0/0").unwrap());
        let (outcome, response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        let client = response.client("TestClient1").unwrap();
        assert_eq!(client.as_integer(&Path::parse("/10000/0/0").unwrap()), Some(123456787));
    }

    #[test]
    fn perform_rejects_zero_paths() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        })));
        session.connect(None).unwrap();

        let err = ReadOperation::new(&session).perform(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInvalid);
    }
}
