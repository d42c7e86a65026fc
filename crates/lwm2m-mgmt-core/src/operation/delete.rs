//! Delete: remove object instances. Resource and object paths
//! are accepted by the builder but rejected by the daemon with
//! `MethodNotAllowed` — only object-instance deletion is meaningful.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;

pub struct DeleteOperation {
    base: OperationBase,
}

impl DeleteOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Delete, true),
        }
    }

    /// Adding both `/O/I` and `/O/I/R` in the same operation is allowed;
    /// the instance delete is not shadowed by the descendant resource path.
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
    use crate::ipc::{Message, MessageType};
    use crate::test_support::MockChannel;
    use crate::tree::PathResult;

    #[test]
    fn delete_of_object_instance_is_requested() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            for (client_id, tree) in &request.clients {
                for &object_id in &tree.object_ids().collect::<Vec<_>>() {
                    if let Some(object) = tree.object(object_id) {
                        for &instance_id in object.instances.keys() {
                            response
                                .client_tree(client_id)
                                .set_result(&Path::for_object_instance(object_id, instance_id).unwrap(), PathResult::success());
                        }
                    }
                }
            }
            Some(response)
        })));
        session.connect(None).unwrap();

        let mut op = DeleteOperation::new(&session);
        let path = Path::parse("/10000/0").unwrap();
        op.add_path("TestClient1", path);
        let (outcome, response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        assert_eq!(response.path_result("TestClient1", &path), PathResult::success());
    }
}
