//! Register / Update / Deregister server events.
//!
//! Each event wraps a parsed response tree so it can reuse the same
//! client/entity iterators the operation `Response` objects expose —
//! `original_source/api/src/server_notification.c` builds its three event
//! types the same way, from the notification's content node.

use crate::path::Path;
use crate::response::Response;

/// Shared shape behind all three server event kinds: a snapshot of which
/// clients were affected and, for register/update, what they registered.
#[derive(Clone, Debug, Default)]
pub struct ServerEvent {
    response: Response,
}

impl ServerEvent {
    pub(crate) fn new(response: Response) -> Self {
        Self { response }
    }

    pub fn client_ids(&self) -> impl Iterator<Item = &str> {
        self.response.client_ids()
    }

    /// The registered entity paths (object instances and resources) for
    /// one client, empty for a client this event didn't carry details for
    /// (e.g. most Deregister notifications only list the client ID).
    pub fn registered_entities(&self, client_id: &str) -> Vec<Path> {
        self.response
            .client(client_id)
            .map(|c| c.registered_entities().collect())
            .unwrap_or_default()
    }
}

/// A client has registered with the daemon.
#[derive(Clone, Debug, Default)]
pub struct ClientRegisterEvent(pub(crate) ServerEvent);

/// A client's registration has been refreshed/updated.
#[derive(Clone, Debug, Default)]
pub struct ClientUpdateEvent(pub(crate) ServerEvent);

/// A client has deregistered (or its registration lease expired).
#[derive(Clone, Debug, Default)]
pub struct ClientDeregisterEvent(pub(crate) ServerEvent);

macro_rules! delegate_server_event {
    ($ty:ty) => {
        impl $ty {
            pub fn client_ids(&self) -> impl Iterator<Item = &str> {
                self.0.client_ids()
            }

            pub fn registered_entities(&self, client_id: &str) -> Vec<Path> {
                self.0.registered_entities(client_id)
            }
        }
    };
}

delegate_server_event!(ClientRegisterEvent);
delegate_server_event!(ClientUpdateEvent);
delegate_server_event!(ClientDeregisterEvent);
