//! In-process [`crate::ipc::IpcChannel`] test double, public rather than
//! `#[cfg(test)]`-gated so both this crate's unit tests and its `tests/`
//! integration suite can build a [`crate::session::Session`] without a real
//! daemon socket.

use crate::definition::DefinitionRegistry;
use crate::ipc::{IpcChannel, IpcError, Message};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = Box<dyn FnMut(&Message) -> Option<Message> + Send>;

/// A stand-in daemon: every request/best-effort send is handed to a
/// user-supplied closure, and notifications are delivered by pushing them
/// through a [`MockNotificationSender`] rather than over a socket.
pub struct MockChannel {
    handler: Handler,
    notifications: VecDeque<Message>,
    inbox: Arc<Mutex<VecDeque<Message>>>,
}

impl MockChannel {
    pub fn new(handler: impl FnMut(&Message) -> Option<Message> + Send + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            notifications: VecDeque::new(),
            inbox: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// A cloneable handle a test can use to enqueue a notification as if it
    /// had just arrived over the wire, to be picked up by the next
    /// `Session::process`.
    pub fn notification_sender(&self) -> MockNotificationSender {
        MockNotificationSender { inbox: self.inbox.clone() }
    }
}

#[derive(Clone)]
pub struct MockNotificationSender {
    inbox: Arc<Mutex<VecDeque<Message>>>,
}

impl MockNotificationSender {
    pub fn send(&self, message: Message) {
        self.inbox.lock().expect("mock inbox poisoned").push_back(message);
    }
}

impl IpcChannel for MockChannel {
    fn send_request_await_response(
        &mut self,
        message: &Message,
        _timeout: Duration,
        _registry: &DefinitionRegistry,
    ) -> Result<Option<Message>, IpcError> {
        Ok((self.handler)(message))
    }

    fn send_best_effort(&mut self, message: &Message) -> Result<(), IpcError> {
        (self.handler)(message);
        Ok(())
    }

    fn drain_notifications(&mut self, _timeout: Duration, _registry: &DefinitionRegistry) -> Result<(), IpcError> {
        let mut inbox = self.inbox.lock().expect("mock inbox poisoned");
        while let Some(message) = inbox.pop_front() {
            self.notifications.push_back(message);
        }
        Ok(())
    }

    fn pop_notification(&mut self) -> Option<Message> {
        self.notifications.pop_front()
    }

    fn has_queued_notifications(&self) -> bool {
        !self.notifications.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::{MessageKind, MessageType};

    #[test]
    fn handler_answers_requests() {
        let mut channel = MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        });
        let request = Message::new(MessageType::Request, MessageKind::Connect, 1, Some(7));
        let registry = DefinitionRegistry::new();
        let response = channel
            .send_request_await_response(&request, Duration::from_millis(10), &registry)
            .unwrap()
            .unwrap();
        assert_eq!(response.message_id, Some(7));
    }

    #[test]
    fn notification_sender_feeds_drain() {
        let mut channel = MockChannel::new(|_| None);
        let sender = channel.notification_sender();
        sender.send(Message::new(MessageType::Notification, MessageKind::NotifyClientRegister, 1, None));
        let registry = DefinitionRegistry::new();
        channel.drain_notifications(Duration::from_millis(10), &registry).unwrap();
        assert!(channel.has_queued_notifications());
        assert!(channel.pop_notification().is_some());
        assert!(!channel.has_queued_notifications());
    }
}
