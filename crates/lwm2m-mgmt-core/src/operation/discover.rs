//! Discover: fetch the write-attributes registered at one or more paths.
//! The per-path attribute iterator and typed attribute
//! accessors already live on [`crate::response::ClientResponse`] — Discover
//! just drives the same request/response shape with a different
//! [`crate::ipc::MessageKind`].

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;

pub struct DiscoverOperation {
    base: OperationBase,
}

impl DiscoverOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Discover, true),
        }
    }

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
    use crate::tree::{AttributeLink, PathResult};

    #[test]
    fn discover_returns_attributes_set_on_a_resource() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            for (client_id, tree) in &request.clients {
                for path in tree.walk_resource_paths() {
                    let client_tree = response.client_tree(client_id);
                    client_tree.set_attribute(&path, AttributeLink::Pmin, 10.0);
                    client_tree.set_attribute(&path, AttributeLink::Pmax, 60.0);
                    client_tree.set_result(&path, PathResult::success());
                }
            }
            Some(response)
        })));
        session.connect(None).unwrap();

        let mut op = DiscoverOperation::new(&session);
        let path = Path::parse("/3/0/15").unwrap();
        op.add_path("TestClient1", path);
        let (outcome, response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        let client = response.client("TestClient1").unwrap();
        assert_eq!(client.attribute(&path, AttributeLink::Pmin), Some(10.0));
        assert_eq!(client.attribute_links(&path).len(), 2);
    }
}
