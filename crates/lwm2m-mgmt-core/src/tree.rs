//! In-memory objects tree, keyed by path, carrying per-node payload.
//!
//! The same node shape is used for request bodies (built by operation
//! builders) and response bodies (built by the IPC response parser) —
//! that's the point of sharing one representation between both sides.

use crate::error::{ErrorKind, LwM2MErrorCode};
use crate::path::Path;
use crate::value::Value;
use std::collections::BTreeMap;

/// The write mode in effect for an object-instance node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// PUT semantics: unspecified resources are reset to default/removed.
    Replace,
    /// POST semantics: unspecified resources are left untouched.
    Update,
}

/// Write-Attributes link name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttributeLink {
    Pmin,
    Pmax,
    Gt,
    Lt,
    Stp,
}

impl AttributeLink {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeLink::Pmin => "pmin",
            AttributeLink::Pmax => "pmax",
            AttributeLink::Gt => "gt",
            AttributeLink::Lt => "lt",
            AttributeLink::Stp => "stp",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pmin" => Some(AttributeLink::Pmin),
            "pmax" => Some(AttributeLink::Pmax),
            "gt" => Some(AttributeLink::Gt),
            "lt" => Some(AttributeLink::Lt),
            "stp" => Some(AttributeLink::Stp),
            _ => None,
        }
    }
}

/// `(error, lwm2mError?)` — the outcome of a single path within one client's
/// response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathResult {
    pub error: ErrorKind,
    pub lwm2m_error: Option<LwM2MErrorCode>,
}

impl PathResult {
    pub fn success() -> Self {
        Self {
            error: ErrorKind::Success,
            lwm2m_error: None,
        }
    }

    pub fn lwm2m(code: LwM2MErrorCode) -> Self {
        Self {
            error: ErrorKind::LwM2MError,
            lwm2m_error: Some(code),
        }
    }

    pub fn local(kind: ErrorKind) -> Self {
        Self {
            error: kind,
            lwm2m_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_success()
    }
}

/// A single resource-instance leaf, holding one scalar value.
#[derive(Clone, Debug, Default)]
pub struct ResourceInstanceNode {
    pub value: Option<Value>,
}

/// What kind of change a `Notify-Observe` notification reports at a given
/// node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeType {
    ResourceModified,
    ResourceCreated,
    ResourceDeleted,
    ObjectInstanceCreated,
    ObjectInstanceDeleted,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::ResourceModified => "ResourceModified",
            ChangeType::ResourceCreated => "ResourceCreated",
            ChangeType::ResourceDeleted => "ResourceDeleted",
            ChangeType::ObjectInstanceCreated => "ObjectInstanceCreated",
            ChangeType::ObjectInstanceDeleted => "ObjectInstanceDeleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "ResourceModified" => ChangeType::ResourceModified,
            "ResourceCreated" => ChangeType::ResourceCreated,
            "ResourceDeleted" => ChangeType::ResourceDeleted,
            "ObjectInstanceCreated" => ChangeType::ObjectInstanceCreated,
            "ObjectInstanceDeleted" => ChangeType::ObjectInstanceDeleted,
            _ => return None,
        })
    }
}

/// A resource node. For a scalar resource, `value` is set directly; for an
/// array resource, `instances` carries the sparse resource-instance map.
#[derive(Clone, Debug, Default)]
pub struct ResourceNode {
    pub value: Option<Value>,
    pub instances: BTreeMap<u16, ResourceInstanceNode>,
    pub attributes: BTreeMap<AttributeLink, f64>,
    pub result: Option<PathResult>,
    pub change: Option<ChangeType>,
}

impl ResourceNode {
    /// Reassembles the sparse per-index scalar map in `instances` into a
    /// single tagged [`Value::StringArray`]/[`Value::IntegerArray`]/…,
    /// inferring the array's element type from its first entry (invariant
    /// 2: a value's tag never changes, so every entry agrees). `None` if
    /// this resource carries no array entries at all.
    pub fn array_value(&self) -> Option<Value> {
        let first = self.instances.values().find_map(|ri| ri.value.as_ref())?;
        Some(match first {
            Value::String(_) => Value::StringArray(self.collect_array(|v| v.as_string().map(str::to_string))),
            Value::Integer(_) => Value::IntegerArray(self.collect_array(Value::as_integer)),
            Value::Float(_) => Value::FloatArray(self.collect_array(Value::as_float)),
            Value::Boolean(_) => Value::BooleanArray(self.collect_array(Value::as_boolean)),
            Value::Opaque(_) => Value::OpaqueArray(self.collect_array(|v| v.as_opaque().cloned())),
            Value::Time(_) => Value::TimeArray(self.collect_array(Value::as_time)),
            Value::ObjectLink(_) => Value::ObjectLinkArray(self.collect_array(Value::as_object_link)),
            _ => return None,
        })
    }

    fn collect_array<T>(&self, extract: impl Fn(&Value) -> Option<T>) -> crate::value::ArrayValue<T> {
        self.instances
            .iter()
            .filter_map(|(&idx, ri)| Some((idx, extract(ri.value.as_ref()?)?)))
            .collect()
    }
}

/// An object-instance node.
#[derive(Clone, Debug, Default)]
pub struct InstanceNode {
    pub resources: BTreeMap<u16, ResourceNode>,
    pub write_mode: Option<WriteMode>,
    pub result: Option<PathResult>,
    pub change: Option<ChangeType>,
}

/// An object node.
#[derive(Clone, Debug, Default)]
pub struct ObjectNode {
    pub instances: BTreeMap<u16, InstanceNode>,
    pub result: Option<PathResult>,
}

/// The objects tree: a map of object ID to [`ObjectNode`], children ordered
/// by ID via `BTreeMap`'s natural iteration order.
#[derive(Clone, Debug, Default)]
pub struct ObjectsTree {
    objects: BTreeMap<u16, ObjectNode>,
}

impl ObjectsTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every node along `path`, creating intermediate nodes as
    /// needed, without disturbing results/values already present elsewhere
    /// in the tree: a general path added after a specific one does not
    /// shadow it, and vice versa — both are separate nodes.
    pub fn ensure_path(&mut self, path: &Path) {
        let object = self.objects.entry(path.object_id()).or_default();
        let Some(instance_id) = path.instance_id() else {
            return;
        };
        let instance = object.instances.entry(instance_id).or_default();
        let Some(resource_id) = path.resource_id() else {
            return;
        };
        instance.resources.entry(resource_id).or_default();
    }

    pub fn object_mut(&mut self, object_id: u16) -> &mut ObjectNode {
        self.objects.entry(object_id).or_default()
    }

    pub fn instance_mut(&mut self, object_id: u16, instance_id: u16) -> &mut InstanceNode {
        self.objects
            .entry(object_id)
            .or_default()
            .instances
            .entry(instance_id)
            .or_default()
    }

    pub fn resource_mut(&mut self, object_id: u16, instance_id: u16, resource_id: u16) -> &mut ResourceNode {
        self.instance_mut(object_id, instance_id)
            .resources
            .entry(resource_id)
            .or_default()
    }

    pub fn set_value(&mut self, path: &Path, value: Value) {
        if let (Some(i), Some(r)) = (path.instance_id(), path.resource_id()) {
            self.resource_mut(path.object_id(), i, r).value = Some(value);
        }
    }

    pub fn set_result(&mut self, path: &Path, result: PathResult) {
        match (path.instance_id(), path.resource_id()) {
            (None, None) => self.object_mut(path.object_id()).result = Some(result),
            (Some(i), None) => self.instance_mut(path.object_id(), i).result = Some(result),
            (Some(i), Some(r)) => self.resource_mut(path.object_id(), i, r).result = Some(result),
            (None, Some(_)) => unreachable!("resource id without instance id"),
        }
    }

    pub fn set_attribute(&mut self, path: &Path, link: AttributeLink, value: f64) {
        if let (Some(i), Some(r)) = (path.instance_id(), path.resource_id()) {
            self.resource_mut(path.object_id(), i, r)
                .attributes
                .insert(link, value);
        }
    }

    /// Tags a node with the kind of change an observation notification
    /// reports there.
    pub fn set_change(&mut self, path: &Path, change: ChangeType) {
        match (path.instance_id(), path.resource_id()) {
            (Some(i), Some(r)) => self.resource_mut(path.object_id(), i, r).change = Some(change),
            (Some(i), None) => self.instance_mut(path.object_id(), i).change = Some(change),
            _ => {}
        }
    }

    pub fn change_at(&self, path: &Path) -> Option<ChangeType> {
        match (path.instance_id(), path.resource_id()) {
            (Some(i), Some(r)) => self.resource(path.object_id(), i, r)?.change,
            (Some(i), None) => self.instance(path.object_id(), i)?.change,
            _ => None,
        }
    }

    pub fn object(&self, object_id: u16) -> Option<&ObjectNode> {
        self.objects.get(&object_id)
    }

    pub fn instance(&self, object_id: u16, instance_id: u16) -> Option<&InstanceNode> {
        self.objects.get(&object_id)?.instances.get(&instance_id)
    }

    pub fn resource(&self, object_id: u16, instance_id: u16, resource_id: u16) -> Option<&ResourceNode> {
        self.instance(object_id, instance_id)?.resources.get(&resource_id)
    }

    /// Looks up whatever node a path refers to and returns its result, if
    /// any was recorded.
    pub fn result_at(&self, path: &Path) -> Option<PathResult> {
        match (path.instance_id(), path.resource_id()) {
            (None, None) => self.object(path.object_id())?.result,
            (Some(i), None) => self.instance(path.object_id(), i)?.result,
            (Some(i), Some(r)) => self.resource(path.object_id(), i, r)?.result,
            (None, Some(_)) => None,
        }
    }

    pub fn value_at(&self, path: &Path) -> Option<&Value> {
        let (i, r) = (path.instance_id()?, path.resource_id()?);
        self.resource(path.object_id(), i, r)?.value.as_ref()
    }

    /// Pre-order walk over every resource path present in the tree,
    /// yielding its canonical path string.
    pub fn walk_resource_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for (&oid, object) in &self.objects {
            for (&iid, instance) in &object.instances {
                for &rid in instance.resources.keys() {
                    out.push(Path::for_resource(oid, iid, rid).expect("ids already in range"));
                }
            }
        }
        out
    }

    /// Leaf-only iteration used by the "registered entities" surface
    /// (List Clients, server events): every object-instance and resource
    /// path present in the tree.
    pub fn registered_entity_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for (&oid, object) in &self.objects {
            for (&iid, instance) in &object.instances {
                out.push(Path::for_object_instance(oid, iid).expect("ids already in range"));
                for &rid in instance.resources.keys() {
                    out.push(Path::for_resource(oid, iid, rid).expect("ids already in range"));
                }
            }
        }
        out
    }

    pub fn object_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.objects.keys().copied()
    }

    /// Every result recorded anywhere in the tree, at any node depth —
    /// used to fold a response into an overall `Success`/`PartialFailure`
    /// [`crate::response::PerformOutcome`].
    pub fn all_results(&self) -> Vec<PathResult> {
        let mut out = Vec::new();
        for object in self.objects.values() {
            if let Some(r) = object.result {
                out.push(r);
            }
            for instance in object.instances.values() {
                if let Some(r) = instance.result {
                    out.push(r);
                }
                for resource in instance.resources.values() {
                    if let Some(r) = resource.result {
                        out.push(r);
                    }
                }
            }
        }
        out
    }

    /// Every object-instance or resource path tagged with a [`ChangeType`]
    /// — the paths an observation notification actually changed.
    pub fn all_changed_paths(&self) -> Vec<Path> {
        let mut out = Vec::new();
        for (&oid, object) in &self.objects {
            for (&iid, instance) in &object.instances {
                if instance.change.is_some() {
                    out.push(Path::for_object_instance(oid, iid).expect("ids already in range"));
                }
                for (&rid, resource) in &instance.resources {
                    if resource.change.is_some() {
                        out.push(Path::for_resource(oid, iid, rid).expect("ids already in range"));
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_and_specific_paths_both_remain_addressable() {
        let mut tree = ObjectsTree::new();
        let instance_path = Path::parse("/3/0").unwrap();
        let resource_path = Path::parse("/3/0/1").unwrap();
        tree.set_result(&resource_path, PathResult::success());
        tree.set_result(&instance_path, PathResult::lwm2m(LwM2MErrorCode::MethodNotAllowed));

        assert_eq!(tree.result_at(&resource_path).unwrap(), PathResult::success());
        assert_eq!(
            tree.result_at(&instance_path).unwrap().lwm2m_error,
            Some(LwM2MErrorCode::MethodNotAllowed)
        );
    }

    #[test]
    fn registered_entities_includes_instance_and_resource() {
        let mut tree = ObjectsTree::new();
        tree.ensure_path(&Path::parse("/3/0/1").unwrap());
        let paths: Vec<String> = tree.registered_entity_paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["/3/0", "/3/0/1"]);
    }
}
