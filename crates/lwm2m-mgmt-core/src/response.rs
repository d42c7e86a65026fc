//! Response objects returned by a performed [`crate::operation`].
//!
//! A [`Response`] is a read-only view keyed by client ID; its lifetime is
//! bound to the owning operation by ordinary Rust ownership — there is no
//! separate "detach on free" step to implement, freeing the operation drops
//! the `Response` along with it.

use crate::error::ErrorKind;
use crate::path::Path;
use crate::tree::{AttributeLink, ChangeType, ObjectsTree, PathResult};
use crate::value::Value;
use std::collections::BTreeMap;

/// One client's slice of a performed operation's result tree.
#[derive(Clone, Debug, Default)]
pub struct ClientResponse {
    tree: ObjectsTree,
}

impl ClientResponse {
    pub(crate) fn new(tree: ObjectsTree) -> Self {
        Self { tree }
    }

    pub(crate) fn tree(&self) -> &ObjectsTree {
        &self.tree
    }

    /// The per-path result recorded by the daemon, if this path was part of
    /// the request.
    pub fn path_result(&self, path: &Path) -> Option<PathResult> {
        self.tree.result_at(path)
    }

    /// `true` only for a resource path that actually carries a value in
    /// this response — i.e. a path that was actually returned, not merely
    /// requested. A resource-array counts too — its scalar entries live
    /// under `instances` rather than `value`.
    pub fn has_value(&self, path: &Path) -> bool {
        if !path.is_resource() {
            return false;
        }
        self.tree.value_at(path).is_some() || self.array_value(path).is_some()
    }

    /// Borrowed typed accessor; lifetime is the response's.
    pub fn value(&self, path: &Path) -> Option<&Value> {
        self.tree.value_at(path)
    }

    pub fn as_string(&self, path: &Path) -> Option<&str> {
        self.value(path)?.as_string()
    }

    pub fn as_integer(&self, path: &Path) -> Option<i64> {
        self.value(path)?.as_integer()
    }

    pub fn as_float(&self, path: &Path) -> Option<f64> {
        self.value(path)?.as_float()
    }

    pub fn as_boolean(&self, path: &Path) -> Option<bool> {
        self.value(path)?.as_boolean()
    }

    pub fn as_opaque(&self, path: &Path) -> Option<&[u8]> {
        Some(self.value(path)?.as_opaque()?.as_ref())
    }

    pub fn as_time(&self, path: &Path) -> Option<i64> {
        self.value(path)?.as_time()
    }

    pub fn as_object_link(&self, path: &Path) -> Option<crate::value::ObjectLink> {
        self.value(path)?.as_object_link()
    }

    /// Reassembles an array resource's per-index scalar entries into one
    /// tagged array [`Value`] — array accessors read from the same node the
    /// scalar accessors do, just via `instances` rather than `value`.
    fn array_value(&self, path: &Path) -> Option<Value> {
        let (i, r) = (path.instance_id()?, path.resource_id()?);
        self.tree.resource(path.object_id(), i, r)?.array_value()
    }

    pub fn as_string_array(&self, path: &Path) -> Option<crate::value::ArrayValue<String>> {
        match self.array_value(path)? {
            Value::StringArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_integer_array(&self, path: &Path) -> Option<crate::value::ArrayValue<i64>> {
        match self.array_value(path)? {
            Value::IntegerArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float_array(&self, path: &Path) -> Option<crate::value::ArrayValue<f64>> {
        match self.array_value(path)? {
            Value::FloatArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_boolean_array(&self, path: &Path) -> Option<crate::value::ArrayValue<bool>> {
        match self.array_value(path)? {
            Value::BooleanArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_opaque_array(&self, path: &Path) -> Option<crate::value::ArrayValue<bytes::Bytes>> {
        match self.array_value(path)? {
            Value::OpaqueArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_time_array(&self, path: &Path) -> Option<crate::value::ArrayValue<i64>> {
        match self.array_value(path)? {
            Value::TimeArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object_link_array(&self, path: &Path) -> Option<crate::value::ArrayValue<crate::value::ObjectLink>> {
        match self.array_value(path)? {
            Value::ObjectLinkArray(a) => Some(a),
            _ => None,
        }
    }

    /// Every resource path present in this client's slice of the tree, in
    /// path order.
    pub fn paths(&self) -> impl Iterator<Item = Path> {
        self.tree.walk_resource_paths().into_iter()
    }

    /// Object-instance and resource paths present — the "registered
    /// entities" surface used by List Clients and server events.
    pub fn registered_entities(&self) -> impl Iterator<Item = Path> {
        self.tree.registered_entity_paths().into_iter()
    }

    pub fn attribute(&self, path: &Path, link: AttributeLink) -> Option<f64> {
        let (i, r) = (path.instance_id()?, path.resource_id()?);
        self.tree.resource(path.object_id(), i, r)?.attributes.get(&link).copied()
    }

    pub fn attribute_links(&self, path: &Path) -> Vec<AttributeLink> {
        let Some((i, r)) = path.instance_id().zip(path.resource_id()) else {
            return Vec::new();
        };
        self.tree
            .resource(path.object_id(), i, r)
            .map(|r| r.attributes.keys().copied().collect())
            .unwrap_or_default()
    }

    /// The kind of change an observation notification reports at this path.
    pub fn change(&self, path: &Path) -> Option<ChangeType> {
        self.tree.change_at(path)
    }
}

/// Read-only, per-client view of a performed operation. `path_result` folds
/// in the "client not present" rule: a path looked up under an unknown
/// client ID reads as `ClientNotFound`.
#[derive(Clone, Debug, Default)]
pub struct Response {
    clients: BTreeMap<String, ClientResponse>,
}

impl Response {
    pub(crate) fn from_tree(clients: BTreeMap<String, ObjectsTree>) -> Self {
        Self {
            clients: clients.into_iter().map(|(id, tree)| (id, ClientResponse::new(tree))).collect(),
        }
    }

    pub fn client(&self, client_id: &str) -> Option<&ClientResponse> {
        self.clients.get(client_id)
    }

    pub fn client_ids(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    /// `ClientNotFound` if `client_id` isn't present in this response at
    /// all; otherwise the per-path result, defaulting to `Success` for a
    /// path that was requested but carries no explicit result (should not
    /// occur against a well-behaved daemon).
    pub fn path_result(&self, client_id: &str, path: &Path) -> PathResult {
        match self.client(client_id) {
            Some(client) => client.path_result(path).unwrap_or_else(PathResult::success),
            None => PathResult::local(ErrorKind::ClientNotFound),
        }
    }
}

/// Outcome of a successful `Perform` call — distinguishes "every per-path
/// result succeeded" from "transport succeeded but at least one per-path
/// result is an error". Either way the operation's `Response` is populated;
/// inspect it when this is `PartialFailure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerformOutcome {
    Success,
    PartialFailure,
}

pub(crate) fn outcome_for(results: impl Iterator<Item = PathResult>) -> PerformOutcome {
    if results.into_iter().all(|r| r.is_success()) {
        PerformOutcome::Success
    } else {
        PerformOutcome::PartialFailure
    }
}
