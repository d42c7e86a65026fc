//! Execute: invoke an executable resource with an optional opaque argument
//! payload.

use super::OperationBase;
use crate::config::Timeout;
use crate::error::CoreError;
use crate::ipc::MessageKind;
use crate::path::Path;
use crate::response::{PerformOutcome, Response};
use crate::session::Session;

pub struct ExecuteOperation {
    base: OperationBase,
}

impl ExecuteOperation {
    pub fn new(session: &Session) -> Self {
        Self {
            base: OperationBase::new(session.clone(), MessageKind::Execute, true),
        }
    }

    /// `path` must be a resource; `arguments` may be absent or empty.
    pub fn add_path(&mut self, client_id: &str, path: Path, arguments: Option<&[u8]>) {
        self.base.client_tree(client_id).ensure_path(&path);
        if let Some(arguments) = arguments {
            // Matches the `{client}:{o}:{i}:{r}` key `codec.rs` encodes from
            // and decodes into — keying by the bare path string here would
            // never be found by the encoder's per-client lookup.
            let key = format!(
                "{client_id}:{}:{}:{}",
                path.object_id(),
                path.instance_id().unwrap_or(crate::path::INVALID_ID),
                path.resource_id().unwrap_or(crate::path::INVALID_ID)
            );
            self.base.message_mut().arguments.insert(key, arguments.to_vec());
        }
    }

    pub fn perform(self, timeout: Option<Timeout>) -> Result<(PerformOutcome, Response), CoreError> {
        self.base.perform(timeout)
    }
}
