//! Message shape carried over the IPC boundary: `(type, subtype, sessionId,
//! messageId, optional content)`.

use crate::definition::ObjectDefinition;
use crate::tree::ObjectsTree;
use std::collections::BTreeMap;

/// The three root message types carried over IPC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Notification,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Request => "Request",
            MessageType::Response => "Response",
            MessageType::Notification => "Notification",
        }
    }
}

/// Names the operation a message carries — the `Type=` attribute on
/// `<Request>`/`<Response>`, or the subtype of a `<Notification>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Connect,
    Disconnect,
    Read,
    Write,
    Delete,
    Execute,
    Define,
    Discover,
    WriteAttributes,
    ListClients,
    Observe,
    NotifyObserve,
    NotifyClientRegister,
    NotifyClientUpdate,
    NotifyClientDeregister,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Connect => "Connect",
            MessageKind::Disconnect => "Disconnect",
            MessageKind::Read => "Read",
            MessageKind::Write => "Write",
            MessageKind::Delete => "Delete",
            MessageKind::Execute => "Execute",
            MessageKind::Define => "Define",
            MessageKind::Discover => "Discover",
            MessageKind::WriteAttributes => "WriteAttributes",
            MessageKind::ListClients => "ListClients",
            MessageKind::Observe => "Observe",
            MessageKind::NotifyObserve => "Observe",
            MessageKind::NotifyClientRegister => "ClientRegister",
            MessageKind::NotifyClientUpdate => "ClientUpdate",
            MessageKind::NotifyClientDeregister => "ClientDeregister",
        }
    }

    pub fn parse(message_type: MessageType, s: &str) -> Option<Self> {
        Some(match (message_type, s) {
            (MessageType::Notification, "ClientRegister") => MessageKind::NotifyClientRegister,
            (MessageType::Notification, "ClientUpdate") => MessageKind::NotifyClientUpdate,
            (MessageType::Notification, "ClientDeregister") => MessageKind::NotifyClientDeregister,
            (MessageType::Notification, "Observe") => MessageKind::NotifyObserve,
            (_, "Connect") => MessageKind::Connect,
            (_, "Disconnect") => MessageKind::Disconnect,
            (_, "Read") => MessageKind::Read,
            (_, "Write") => MessageKind::Write,
            (_, "Delete") => MessageKind::Delete,
            (_, "Execute") => MessageKind::Execute,
            (_, "Define") => MessageKind::Define,
            (_, "Discover") => MessageKind::Discover,
            (_, "WriteAttributes") => MessageKind::WriteAttributes,
            (_, "ListClients") => MessageKind::ListClients,
            (_, "Observe") => MessageKind::Observe,
            _ => return None,
        })
    }
}

/// One datagram's worth of content. `message_id` is absent on
/// notifications, which don't expect a direct reply.
#[derive(Clone, Debug)]
pub struct Message {
    pub message_type: MessageType,
    pub kind: MessageKind,
    pub session_id: u32,
    pub message_id: Option<u32>,
    /// Per-client objects tree — the shared request/response representation.
    pub clients: BTreeMap<String, ObjectsTree>,
    /// Populated only for a `Define` request/response.
    pub object_definitions: Vec<ObjectDefinition>,
    /// Opaque Execute argument payload, when this message carries one.
    pub arguments: BTreeMap<String, Vec<u8>>,
    /// `(clientId, canonical path)` pairs an Observe request wants cancelled
    /// rather than registered, rendered as a sibling list instead of an
    /// in-band flag bit so the existing per-path tree shape stays unchanged
    /// for every other operation.
    pub observe_cancellations: Vec<(String, String)>,
}

impl Message {
    pub fn new(message_type: MessageType, kind: MessageKind, session_id: u32, message_id: Option<u32>) -> Self {
        Self {
            message_type,
            kind,
            session_id,
            message_id,
            clients: BTreeMap::new(),
            object_definitions: Vec::new(),
            arguments: BTreeMap::new(),
            observe_cancellations: Vec::new(),
        }
    }

    pub fn client_tree(&mut self, client_id: &str) -> &mut ObjectsTree {
        self.clients.entry(client_id.to_string()).or_default()
    }
}
