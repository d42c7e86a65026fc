//! Define: registers one or more object definitions with the daemon and,
//! on success, the session's local registry.

use crate::config::Timeout;
use crate::definition::ObjectDefinition;
use crate::error::{CoreError, ErrorKind};
use crate::ipc::{Message, MessageKind, MessageType};
use crate::response::PerformOutcome;
use crate::session::Session;

pub struct DefineOperation {
    session: Session,
    message: Message,
}

impl DefineOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
            message: Message::new(MessageType::Request, MessageKind::Define, 0, None),
        }
    }

    /// Deep-copies `definition` into the request — the source may be
    /// dropped or mutated immediately afterward.
    pub fn add(&mut self, definition: ObjectDefinition) {
        self.message.object_definitions.push(definition);
    }

    pub fn perform(self, timeout: Option<Timeout>) -> Result<PerformOutcome, CoreError> {
        if self.message.object_definitions.is_empty() {
            return Err(CoreError::new(ErrorKind::OperationInvalid).with_message("Perform with no object definitions"));
        }
        let definitions = self.message.object_definitions.clone();
        let timeout = timeout.unwrap_or_else(|| self.session.default_timeout());
        let (outcome, _clients) = self.session.perform(self.message, timeout)?;
        if outcome == PerformOutcome::Success {
            for definition in definitions {
                self.session.add_to_registry(definition)?;
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::definition::{Operations, ResourceDefinition};
    use crate::test_support::MockChannel;
    use crate::value::ResourceType;

    fn sample() -> ObjectDefinition {
        ObjectDefinition::new(10000, "Test", 0, 1).with_resource(ResourceDefinition::new(
            0,
            "Value",
            ResourceType::Integer,
            1,
            1,
            Operations::ReadWrite,
            Some(crate::value::Value::Integer(123456787)),
        ))
    }

    #[test]
    fn perform_rejects_empty_definition_set() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        })));
        session.connect(None).unwrap();

        let err = DefineOperation::new(&session).perform(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperationInvalid);
    }

    #[test]
    fn successful_define_updates_local_registry() {
        let session = Session::new(SessionConfig::new());
        session.configure_ipc(Box::new(MockChannel::new(|request| {
            Some(Message::new(MessageType::Response, request.kind, request.session_id, request.message_id))
        })));
        session.connect(None).unwrap();

        let mut op = DefineOperation::new(&session);
        op.add(sample());
        let outcome = op.perform(None).unwrap();
        assert_eq!(outcome, PerformOutcome::Success);
        assert!(session.is_object_defined(10000));
    }
}
