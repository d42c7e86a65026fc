//! Definition registry: the process-level catalogue mapping object IDs to
//! object definitions and resource IDs to resource definitions.

use crate::error::{CoreError, ErrorKind};
use crate::value::ResourceType;
use std::collections::BTreeMap;

/// Access mode for a resource definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operations {
    None,
    ReadOnly,
    WriteOnly,
    ReadWrite,
    Execute,
}

impl Operations {
    pub fn allows_read(self) -> bool {
        matches!(self, Operations::ReadOnly | Operations::ReadWrite)
    }

    pub fn allows_write(self) -> bool {
        matches!(self, Operations::WriteOnly | Operations::ReadWrite)
    }

    pub fn allows_execute(self) -> bool {
        matches!(self, Operations::Execute)
    }

    /// Wire name used in a resource definition's `<Operations>` element.
    pub fn as_str(self) -> &'static str {
        match self {
            Operations::None => "None",
            Operations::ReadOnly => "ReadOnly",
            Operations::WriteOnly => "WriteOnly",
            Operations::ReadWrite => "ReadWrite",
            Operations::Execute => "Execute",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "None" => Operations::None,
            "ReadOnly" => Operations::ReadOnly,
            "WriteOnly" => Operations::WriteOnly,
            "ReadWrite" => Operations::ReadWrite,
            "Execute" => Operations::Execute,
            _ => return None,
        })
    }
}

/// `(resourceId, name, type, minInstances, maxInstances, operations,
/// defaultValue?)`.
#[derive(Clone, Debug)]
pub struct ResourceDefinition {
    resource_id: u16,
    name: String,
    resource_type: ResourceType,
    min_instances: u32,
    max_instances: u32,
    operations: Operations,
    default_value: Option<crate::value::Value>,
}

impl ResourceDefinition {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resource_id: u16,
        name: impl Into<String>,
        resource_type: ResourceType,
        min_instances: u32,
        max_instances: u32,
        operations: Operations,
        default_value: Option<crate::value::Value>,
    ) -> Self {
        Self {
            resource_id,
            name: name.into(),
            resource_type,
            min_instances,
            max_instances,
            operations,
            default_value,
        }
    }

    pub fn resource_id(&self) -> u16 {
        self.resource_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn operations(&self) -> Operations {
        self.operations
    }

    pub fn default_value(&self) -> Option<&crate::value::Value> {
        self.default_value.as_ref()
    }

    pub fn min_instances(&self) -> u32 {
        self.min_instances
    }

    pub fn max_instances(&self) -> u32 {
        self.max_instances
    }

    /// Mandatory if `minInstances >= 1`.
    pub fn is_mandatory(&self) -> bool {
        self.min_instances >= 1
    }

    /// Multiple-instance if `maxInstances > 1`.
    pub fn is_multiple_instance(&self) -> bool {
        self.max_instances > 1
    }
}

/// `(objectId, name, minInstances, maxInstances, resources)`. Owns its
/// resource definitions; deep-copied on registration so the caller may free
/// or mutate the source immediately.
#[derive(Clone, Debug)]
pub struct ObjectDefinition {
    object_id: u16,
    name: String,
    min_instances: u32,
    max_instances: u32,
    resources: BTreeMap<u16, ResourceDefinition>,
}

impl ObjectDefinition {
    pub fn new(object_id: u16, name: impl Into<String>, min_instances: u32, max_instances: u32) -> Self {
        Self {
            object_id,
            name: name.into(),
            min_instances,
            max_instances,
            resources: BTreeMap::new(),
        }
    }

    pub fn with_resource(mut self, resource: ResourceDefinition) -> Self {
        self.resources.insert(resource.resource_id(), resource);
        self
    }

    pub fn object_id(&self) -> u16 {
        self.object_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mandatory(&self) -> bool {
        self.min_instances >= 1
    }

    pub fn is_multiple_instance(&self) -> bool {
        self.max_instances > 1
    }

    pub fn min_instances(&self) -> u32 {
        self.min_instances
    }

    pub fn max_instances(&self) -> u32 {
        self.max_instances
    }

    pub fn resource(&self, resource_id: u16) -> Option<&ResourceDefinition> {
        self.resources.get(&resource_id)
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }
}

/// Process-level catalogue of object definitions. A session holds a
/// reference it refreshes from the daemon on connect and after a successful
/// Define.
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    objects: BTreeMap<u16, ObjectDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects duplicate object IDs with `AlreadyDefined`.
    pub fn add(&mut self, definition: ObjectDefinition) -> Result<(), CoreError> {
        if self.objects.contains_key(&definition.object_id()) {
            return Err(CoreError::new(ErrorKind::AlreadyDefined)
                .with_message(format!("object {} already defined", definition.object_id())));
        }
        self.objects.insert(definition.object_id(), definition);
        Ok(())
    }

    pub fn lookup(&self, object_id: u16) -> Option<&ObjectDefinition> {
        self.objects.get(&object_id)
    }

    pub fn is_object_defined(&self, object_id: u16) -> bool {
        self.objects.contains_key(&object_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectDefinition> {
        self.objects.values()
    }

    /// Replaces the registry contents in one atomic swap — used by
    /// `Session::connect`/`Session::refresh` so a partial refresh from the
    /// daemon never leaves the registry half-updated.
    pub fn replace_all(&mut self, definitions: impl IntoIterator<Item = ObjectDefinition>) {
        self.objects = definitions.into_iter().map(|d| (d.object_id(), d)).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(object_id: u16) -> ObjectDefinition {
        ObjectDefinition::new(object_id, "Test", 0, 1).with_resource(ResourceDefinition::new(
            0,
            "Value",
            ResourceType::Integer,
            1,
            1,
            Operations::ReadWrite,
            None,
        ))
    }

    #[test]
    fn add_rejects_duplicate() {
        let mut registry = DefinitionRegistry::new();
        registry.add(sample(10000)).unwrap();
        let err = registry.add(sample(10000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyDefined);
        // First definition is undisturbed.
        assert!(registry.is_object_defined(10000));
    }

    #[test]
    fn lookup_returns_none_for_unknown_object() {
        let registry = DefinitionRegistry::new();
        assert!(registry.lookup(1).is_none());
    }

    #[test]
    fn replace_all_is_atomic_swap() {
        let mut registry = DefinitionRegistry::new();
        registry.add(sample(1)).unwrap();
        registry.replace_all(vec![sample(2), sample(3)]);
        assert!(!registry.is_object_defined(1));
        assert!(registry.is_object_defined(2));
        assert!(registry.is_object_defined(3));
    }
}
