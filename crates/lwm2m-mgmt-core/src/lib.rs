//! `lwm2m-mgmt-core`: a programmatic Management Application interface to an
//! OMA LWM2M server daemon.
//!
//! A Management Application holds a [`session::Session`] to the daemon,
//! discovers the data model of registered LWM2M clients through the
//! [`definition::DefinitionRegistry`], and issues the full set of LWM2M
//! device-management operations — List Clients, Define, Read, Write,
//! Delete, Execute, Discover, Write-Attributes, Observe — found in
//! [`operation`]. Asynchronous server events (register/update/deregister)
//! and observation notifications are delivered through the session's
//! [`session::Session::process`]/[`session::Session::dispatch_callbacks`]
//! pair.
//!
//! This crate is the server-side core only: it does not speak CoAP or DTLS
//! (that lives in the daemon on the other end of [`ipc`]), does not persist
//! state across restarts, and does not perform admission control — the
//! daemon enforces LWM2M access rules and this crate only surfaces the
//! resulting errors.

pub mod changeset;
#[doc(hidden)]
pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod ipc;
pub mod observation;
pub mod operation;
pub mod path;
pub mod response;
pub mod server_events;
pub mod session;
pub mod test_support;
pub mod tree;
pub mod value;

pub use changeset::ChangeSet;
pub use config::{SessionConfig, Timeout};
pub use definition::{DefinitionRegistry, ObjectDefinition, Operations, ResourceDefinition};
pub use error::{CoreError, ErrorKind, LwM2MErrorCode};
pub use observation::Observation;
pub use path::Path;
pub use response::{PerformOutcome, Response};
pub use session::Session;
pub use tree::{AttributeLink, ChangeType, WriteMode};
pub use value::{ArrayValue, ObjectLink, ResourceType, Value};
