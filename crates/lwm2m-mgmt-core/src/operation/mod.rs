//! Request builders and their matching response objects.
//!
//! Every operation shares the same shape: built from a [`Session`],
//! accumulates `(clientId, path[, payload])` tuples into a request
//! [`Message`], and is performed with a timeout. [`OperationBase`] factors
//! that shared plumbing; each operation type below wraps it with its own
//! typed builder methods.

mod define;
mod delete;
mod discover;
mod execute;
mod list_clients;
mod observe;
mod read;
mod write;
mod write_attributes;

pub use define::DefineOperation;
pub use delete::DeleteOperation;
pub use discover::DiscoverOperation;
pub use execute::ExecuteOperation;
pub use list_clients::ListClientsOperation;
pub use observe::ObserveOperation;
pub use read::ReadOperation;
pub use write::WriteOperation;
pub use write_attributes::WriteAttributesOperation;

use crate::config::Timeout;
use crate::error::{CoreError, ErrorKind};
use crate::ipc::{Message, MessageKind, MessageType};
use crate::response::{PerformOutcome, Response};
use crate::session::Session;
use crate::tree::ObjectsTree;

pub(crate) struct OperationBase {
    session: Session,
    message: Message,
    requires_paths: bool,
}

impl OperationBase {
    fn new(session: Session, kind: MessageKind, requires_paths: bool) -> Self {
        Self {
            message: Message::new(MessageType::Request, kind, 0, None),
            session,
            requires_paths,
        }
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    fn client_tree(&mut self, client_id: &str) -> &mut ObjectsTree {
        self.message.client_tree(client_id)
    }

    /// Sends the accumulated request and folds the per-path results of the
    /// response into an overall [`PerformOutcome`]. General and specific
    /// paths both remain addressable in the result.
    fn perform(self, timeout: Option<Timeout>) -> Result<(PerformOutcome, Response), CoreError> {
        if self.requires_paths && tree_is_empty(&self.message) {
            return Err(CoreError::new(ErrorKind::OperationInvalid).with_message("Perform with zero paths"));
        }
        let timeout = timeout.unwrap_or_else(|| self.session.default_timeout());
        let (outcome, clients) = self.session.perform(self.message, timeout)?;
        Ok((outcome, Response::from_tree(clients)))
    }
}

fn tree_is_empty(message: &Message) -> bool {
    message.clients.is_empty() || message.clients.values().all(|tree| tree.object_ids().next().is_none())
}
