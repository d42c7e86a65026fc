//! Write: create object instances and set resource values, under a
//! `Replace` (PUT) or `Update` (POST) write mode.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;
use crate::tree::{ResourceInstanceNode, WriteMode};
use crate::value::{ObjectLink, Value};

pub struct WriteOperation {
    base: OperationBase,
    default_mode: WriteMode,
}

impl WriteOperation {
    pub fn new(session: &Session, default_mode: WriteMode) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Write, true),
            default_mode,
        }
    }

    /// Requests creation of the object instance at `path` (with or without
    /// an explicit instance ID — callers needing a daemon-assigned ID
    /// address the instance with [`crate::path::INVALID_ID`]).
    pub fn create_object_instance(&mut self, client_id: &str, path: Path) {
        self.ensure_instance_mode(client_id, &path);
    }

    /// Per-path override of the operation's default write mode, applied to
    /// one object-instance.
    pub fn set_object_instance_write_mode(&mut self, client_id: &str, path: Path, mode: WriteMode) {
        let tree = self.base.client_tree(client_id);
        tree.ensure_path(&path);
        if let Some(instance_id) = path.instance_id() {
            tree.instance_mut(path.object_id(), instance_id).write_mode = Some(mode);
        }
    }

    pub fn add_value(&mut self, client_id: &str, path: Path, value: Value) {
        self.ensure_instance_mode(client_id, &path);
        self.base.client_tree(client_id).set_value(&path, value);
    }

    pub fn add_value_as_string(&mut self, client_id: &str, path: Path, value: impl Into<String>) {
        self.add_value(client_id, path, Value::String(value.into()));
    }

    pub fn add_value_as_integer(&mut self, client_id: &str, path: Path, value: i64) {
        self.add_value(client_id, path, Value::Integer(value));
    }

    pub fn add_value_as_float(&mut self, client_id: &str, path: Path, value: f64) {
        self.add_value(client_id, path, Value::Float(value));
    }

    pub fn add_value_as_boolean(&mut self, client_id: &str, path: Path, value: bool) {
        self.add_value(client_id, path, Value::Boolean(value));
    }

    pub fn add_value_as_opaque(&mut self, client_id: &str, path: Path, value: &[u8]) {
        self.add_value(client_id, path, Value::opaque(value));
    }

    pub fn add_value_as_time(&mut self, client_id: &str, path: Path, value: i64) {
        self.add_value(client_id, path, Value::Time(value));
    }

    pub fn add_value_as_object_link(&mut self, client_id: &str, path: Path, value: ObjectLink) {
        self.add_value(client_id, path, Value::ObjectLink(value));
    }

    /// Sets the resource-instance at `index` within an array resource.
    pub fn add_array_value(&mut self, client_id: &str, path: Path, index: u16, value: Value) {
        self.ensure_instance_mode(client_id, &path);
        let tree = self.base.client_tree(client_id);
        tree.ensure_path(&path);
        if let (Some(instance_id), Some(resource_id)) = (path.instance_id(), path.resource_id()) {
            tree.resource_mut(path.object_id(), instance_id, resource_id)
                .instances
                .insert(index, ResourceInstanceNode { value: Some(value) });
        }
    }

    pub fn add_array_value_as_string(&mut self, client_id: &str, path: Path, index: u16, value: impl Into<String>) {
        self.add_array_value(client_id, path, index, Value::String(value.into()));
    }

    pub fn add_array_value_as_integer(&mut self, client_id: &str, path: Path, index: u16, value: i64) {
        self.add_array_value(client_id, path, index, Value::Integer(value));
    }

    pub fn add_array_value_as_float(&mut self, client_id: &str, path: Path, index: u16, value: f64) {
        self.add_array_value(client_id, path, index, Value::Float(value));
    }

    pub fn add_array_value_as_boolean(&mut self, client_id: &str, path: Path, index: u16, value: bool) {
        self.add_array_value(client_id, path, index, Value::Boolean(value));
    }

    pub fn add_array_value_as_opaque(&mut self, client_id: &str, path: Path, index: u16, value: &[u8]) {
        self.add_array_value(client_id, path, index, Value::opaque(value));
    }

    pub fn add_array_value_as_time(&mut self, client_id: &str, path: Path, index: u16, value: i64) {
        self.add_array_value(client_id, path, index, Value::Time(value));
    }

    pub fn add_array_value_as_object_link(&mut self, client_id: &str, path: Path, index: u16, value: ObjectLink) {
        self.add_array_value(client_id, path, index, Value::ObjectLink(value));
    }

    fn ensure_instance_mode(&mut self, client_id: &str, path: &Path) {
        let tree = self.base.client_tree(client_id);
        tree.ensure_path(path);
        if let Some(instance_id) = path.instance_id() {
            let instance = tree.instance_mut(path.object_id(), instance_id);
            if instance.write_mode.is_none() {
                instance.write_mode = Some(self.default_mode);
            }
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
    use crate::tree::PathResult;

    #[test]
    fn write_then_read_round_trips_string_value() {
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

        let mut op = WriteOperation::new(&session, WriteMode::Update);
        let path = Path::parse("/10000/0/1").unwrap();
        op.add_value_as_string("TestClient1", path, "Pacific/Wellington");
        let (outcome, response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        assert_eq!(response.path_result("TestClient1", &path), PathResult::success());
    }

    #[test]
    fn array_write_round_trips_through_the_shared_tree() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
            for (client_id, tree) in &request.clients {
                for &object_id in &tree.object_ids().collect::<Vec<_>>() {
                    let object = tree.object(object_id).unwrap();
                    for (&instance_id, instance) in &object.instances {
                        for (&resource_id, resource) in &instance.resources {
                            let path = Path::for_resource(object_id, instance_id, resource_id).unwrap();
                            response.client_tree(client_id).ensure_path(&path);
                            let dest = response.client_tree(client_id).resource_mut(object_id, instance_id, resource_id);
                            dest.instances = resource.instances.clone();
                            response.client_tree(client_id).set_result(&path, PathResult::success());
                        }
                    }
                }
            }
            Some(response)
        })));
        session.connect(None).unwrap();

        let mut op = WriteOperation::new(&session, WriteMode::Update);
        let path = Path::parse("/10000/0/6").unwrap();
        op.add_array_value_as_integer("TestClient1", path, 0, 10);
        op.add_array_value_as_integer("TestClient1", path, 2, 30);
        let (outcome, response) = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);

        let client = response.client("TestClient1").unwrap();
        assert!(client.has_value(&path));
        let array = client.as_integer_array(&path).unwrap();
        assert_eq!(array.get(0), Some(&10));
        assert_eq!(array.get(2), Some(&30));
        assert_eq!(array.len(), 2);
    }
}
