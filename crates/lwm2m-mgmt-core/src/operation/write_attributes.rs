//! Write-Attributes: tune notification thresholds (`pmin`, `pmax`, `gt`,
//! `lt`, `stp`) on a resource. The daemon applies these
//! atomically: if any attribute is rejected, none are written.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;
use crate::tree::AttributeLink;

pub struct WriteAttributesOperation {
    base: OperationBase,
}

impl WriteAttributesOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::WriteAttributes, true),
        }
    }

    pub fn add_attribute_as_integer(&mut self, client_id: &str, path: Path, link: AttributeLink, value: i64) {
        self.add_attribute(client_id, path, link, value as f64);
    }

    pub fn add_attribute_as_float(&mut self, client_id: &str, path: Path, link: AttributeLink, value: f64) {
        self.add_attribute(client_id, path, link, value);
    }

    fn add_attribute(&mut self, client_id: &str, path: Path, link: AttributeLink, value: f64) {
        self.base.client_tree(client_id).set_attribute(&path, link, value);
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
    fn write_attributes_sets_pmin_and_pmax() {
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

        let mut op = WriteAttributesOperation::new(&session);
        let path = Path::parse("/3/0/15").unwrap();
        op.add_attribute_as_integer("TestClient1", path, AttributeLink::Pmin, 10);
        op.add_attribute_as_integer("TestClient1", path, AttributeLink::Pmax, 60);
        let (outcome, _response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
    }
}
