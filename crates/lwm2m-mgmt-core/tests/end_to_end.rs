//! Cross-module scenarios against the mock IPC transport: a management
//! application's typical session from connect through disconnect.

use lwm2m_mgmt_core::definition::{ObjectDefinition, Operations, ResourceDefinition};
use lwm2m_mgmt_core::error::{ErrorKind, LwM2MErrorCode};
use lwm2m_mgmt_core::ipc::{Message, MessageType};
use lwm2m_mgmt_core::operation::{
    DefineOperation, DeleteOperation, ExecuteOperation, ListClientsOperation, ObserveOperation, ReadOperation,
    WriteOperation,
};
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::test_support::MockChannel;
use lwm2m_mgmt_core::tree::PathResult;
use lwm2m_mgmt_core::value::{ResourceType, Value};
use lwm2m_mgmt_core::{ChangeType, Observation, Path, Session, SessionConfig, Timeout, WriteMode};
use std::cell::RefCell;
use std::rc::Rc;

fn sample_object() -> ObjectDefinition {
    ObjectDefinition::new(10000, "Test", 0, 1).with_resource(ResourceDefinition::new(
        0,
        "Value",
        ResourceType::Integer,
        1,
        1,
        Operations::ReadWrite,
        Some(Value::Integer(0)),
    ))
}

fn connected_session(handler: impl FnMut(&Message) -> Option<Message> + Send + 'static) -> Session {
    let session = Session::new(SessionConfig::new());
    session.configure_ipc(Box::new(MockChannel::new(handler)));
    session.connect(None).unwrap();
    session
}

#[test]
fn list_clients_with_none_connected_returns_an_empty_success() {
    let session = connected_session(|request| {
        Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
    });

    let (outcome, response) = ListClientsOperation::new(&session).perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::Success);
    assert!(response.client_ids().next().is_none());
}

#[test]
fn define_then_read_returns_the_declared_default_value() {
    let session = connected_session(|request| {
        let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
        for (client_id, tree) in &request.clients {
            for path in tree.walk_resource_paths() {
                response.client_tree(client_id).set_value(&path, Value::Integer(0));
                response.client_tree(client_id).set_result(&path, PathResult::success());
            }
        }
        Some(response)
    });

    let mut define = DefineOperation::new(&session);
    define.add(sample_object());
    assert_eq!(define.perform(None).unwrap(), PerformOutcome::Success);
    assert!(session.is_object_defined(10000));

    let mut read = ReadOperation::new(&session);
    let path = Path::parse("/10000/0/0").unwrap();
    read.add_path("TestClient1", path);
    let (outcome, response) = read.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::Success);
    assert_eq!(response.client("TestClient1").unwrap().as_integer(&path), Some(0));
}

#[test]
fn write_then_read_round_trips_every_scalar_type() {
    let session = connected_session(|request| {
        let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
        for (client_id, tree) in &request.clients {
            for path in tree.walk_resource_paths() {
                if let Some(value) = tree.value_at(&path) {
                    response.client_tree(client_id).set_value(&path, value.clone());
                }
                response.client_tree(client_id).set_result(&path, PathResult::success());
            }
        }
        Some(response)
    });

    let path = Path::parse("/10000/0/0").unwrap();
    let mut write = WriteOperation::new(&session, WriteMode::Update);
    write.add_value("TestClient1", path, Value::Integer(42));
    let (outcome, _response) = write.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::Success);

    let mut read = ReadOperation::new(&session);
    read.add_path("TestClient1", path);
    let (outcome, response) = read.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::Success);
    assert_eq!(response.client("TestClient1").unwrap().as_integer(&path), Some(42));
}

#[test]
fn execute_on_a_non_executable_resource_reports_bad_request() {
    let session = connected_session(|request| {
        let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
        for (client_id, tree) in &request.clients {
            for path in tree.walk_resource_paths() {
                response.client_tree(client_id).set_result(&path, PathResult::lwm2m(LwM2MErrorCode::BadRequest));
            }
        }
        Some(response)
    });

    let path = Path::parse("/3/0/1").unwrap();
    let mut execute = ExecuteOperation::new(&session);
    execute.add_path("TestClient1", path, None);
    let (outcome, response) = execute.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::PartialFailure);
    let result = response.path_result("TestClient1", &path);
    assert_eq!(result.error, ErrorKind::LwM2MError);
    assert_eq!(result.lwm2m_error, Some(LwM2MErrorCode::BadRequest));
}

#[test]
fn delete_of_a_resource_path_is_method_not_allowed() {
    let session = connected_session(|request| {
        let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
        for (client_id, tree) in &request.clients {
            for path in tree.walk_resource_paths() {
                response.client_tree(client_id).set_result(&path, PathResult::lwm2m(LwM2MErrorCode::MethodNotAllowed));
            }
        }
        Some(response)
    });

    let path = Path::parse("/10000/0/0").unwrap();
    let mut delete = DeleteOperation::new(&session);
    delete.add_path("TestClient1", path);
    let (outcome, response) = delete.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::PartialFailure);
    assert_eq!(response.path_result("TestClient1", &path).lwm2m_error, Some(LwM2MErrorCode::MethodNotAllowed));
}

#[test]
fn observe_then_notify_invokes_the_callback_with_the_new_value() {
    let session = Session::new(SessionConfig::new());
    let channel = MockChannel::new(|request| {
        let mut response = Message::new(MessageType::Response, request.kind, request.session_id, request.message_id);
        for (client_id, tree) in &request.clients {
            for path in tree.walk_resource_paths() {
                response.client_tree(client_id).set_result(&path, PathResult::success());
            }
        }
        Some(response)
    });
    let sender = channel.notification_sender();
    session.configure_ipc(Box::new(channel));
    session.connect(None).unwrap();

    let path = Path::parse("/10000/0/0").unwrap();
    let received = Rc::new(RefCell::new(None));
    let received_clone = received.clone();
    let observation = Observation::new("TestClient1", path, move |changes| {
        *received_clone.borrow_mut() = changes.value(&path).cloned();
    });

    let mut observe = ObserveOperation::new(&session);
    observe.add_observation(&observation).unwrap();
    let (outcome, _response) = observe.perform(None).unwrap();
    assert_eq!(outcome, PerformOutcome::Success);

    // Simulate a `NotifyObserve` arriving on the wire: build it the way the
    // codec would after decoding one, and enqueue it the way a real
    // transport's `drain_notifications` would.
    let mut notify = Message::new(MessageType::Notification, lwm2m_mgmt_core::ipc::MessageKind::NotifyObserve, 0, None);
    let tree = notify.client_tree("TestClient1");
    tree.set_value(&path, Value::Integer(99));
    tree.set_change(&path, ChangeType::ResourceModified);
    sender.send(notify);

    session.process(Timeout::from_millis(0)).unwrap();
    session.dispatch_callbacks();

    assert_eq!(*received.borrow(), Some(Value::Integer(99)));
}
