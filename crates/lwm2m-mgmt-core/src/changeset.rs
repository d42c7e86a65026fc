//! The event delivered to an [`crate::observation::Observation`] callback.

use crate::path::Path;
use crate::response::ClientResponse;
use crate::session::Session;
use crate::tree::ChangeType;

/// Read-only event delivered to an observation callback: the session it
/// came from, the originating client, and the changed paths (each tagged
/// with a [`ChangeType`]).
///
/// `session` is a cheap clone of the same handle the application holds.
/// Starting a new `Perform` from inside the callback is forbidden;
/// `Session::perform` enforces that at runtime by checking a re-entrancy
/// flag set for the duration of `dispatch_callbacks`.
#[derive(Clone)]
pub struct ChangeSet {
    session: Session,
    client_id: String,
    changes: ClientResponse,
}

impl ChangeSet {
    pub(crate) fn new(session: Session, client_id: String, changes: ClientResponse) -> Self {
        Self {
            session,
            client_id,
            changes,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn change_type(&self, path: &Path) -> Option<ChangeType> {
        self.changes.change(path)
    }

    pub fn value(&self, path: &Path) -> Option<&crate::value::Value> {
        self.changes.value(path)
    }

    /// Every path this ChangeSet reports a change for.
    pub fn changed_paths(&self) -> impl Iterator<Item = Path> + '_ {
        self.changes.paths()
    }
}
