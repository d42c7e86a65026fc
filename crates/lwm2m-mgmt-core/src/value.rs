//! Tagged-variant value model for LWM2M resources.
//!
//! A [`Value`] owns its storage: scalar constructors take the primitive by
//! value, `Opaque` deep-copies the byte range into a `Bytes`. Arrays are
//! sparse — a [`BTreeMap<u16, T>`] rather than a dense `Vec` — because LWM2M
//! resource-instance indices need not be contiguous, and re-inserting an
//! existing index replaces it.

use bytes::Bytes;
use std::collections::BTreeMap;
use std::fmt;

/// The eight LWM2M scalar resource types plus their array counterparts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    None,
    String,
    Integer,
    Float,
    Boolean,
    Opaque,
    Time,
    ObjectLink,
    StringArray,
    IntegerArray,
    FloatArray,
    BooleanArray,
    OpaqueArray,
    TimeArray,
    ObjectLinkArray,
}

impl ResourceType {
    pub fn is_array(self) -> bool {
        matches!(
            self,
            ResourceType::StringArray
                | ResourceType::IntegerArray
                | ResourceType::FloatArray
                | ResourceType::BooleanArray
                | ResourceType::OpaqueArray
                | ResourceType::TimeArray
                | ResourceType::ObjectLinkArray
        )
    }

    /// Wire name used in an object definition's `<Type>` element.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::None => "None",
            ResourceType::String => "String",
            ResourceType::Integer => "Integer",
            ResourceType::Float => "Float",
            ResourceType::Boolean => "Boolean",
            ResourceType::Opaque => "Opaque",
            ResourceType::Time => "Time",
            ResourceType::ObjectLink => "ObjectLink",
            ResourceType::StringArray => "StringArray",
            ResourceType::IntegerArray => "IntegerArray",
            ResourceType::FloatArray => "FloatArray",
            ResourceType::BooleanArray => "BooleanArray",
            ResourceType::OpaqueArray => "OpaqueArray",
            ResourceType::TimeArray => "TimeArray",
            ResourceType::ObjectLinkArray => "ObjectLinkArray",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "None" => ResourceType::None,
            "String" => ResourceType::String,
            "Integer" => ResourceType::Integer,
            "Float" => ResourceType::Float,
            "Boolean" => ResourceType::Boolean,
            "Opaque" => ResourceType::Opaque,
            "Time" => ResourceType::Time,
            "ObjectLink" => ResourceType::ObjectLink,
            "StringArray" => ResourceType::StringArray,
            "IntegerArray" => ResourceType::IntegerArray,
            "FloatArray" => ResourceType::FloatArray,
            "BooleanArray" => ResourceType::BooleanArray,
            "OpaqueArray" => ResourceType::OpaqueArray,
            "TimeArray" => ResourceType::TimeArray,
            "ObjectLinkArray" => ResourceType::ObjectLinkArray,
            _ => return None,
        })
    }
}

/// `ObjectLink` resource type: a pair `(objectId, objectInstanceId)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectLink {
    pub object_id: u16,
    pub object_instance_id: u16,
}

impl fmt::Display for ObjectLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_id, self.object_instance_id)
    }
}

/// A sparse array of scalar values, keyed by a 16-bit resource-instance
/// index. Two arrays compare equal iff they have the same set of indices
/// and pairwise-equal values, regardless of insertion order.
#[derive(Clone, Debug, Default)]
pub struct ArrayValue<T> {
    entries: BTreeMap<u16, T>,
}

impl<T> ArrayValue<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the value at `index`.
    pub fn set_at(&mut self, index: u16, value: T) {
        self.entries.insert(index, value);
    }

    pub fn delete_at(&mut self, index: u16) -> Option<T> {
        self.entries.remove(&index)
    }

    pub fn get(&self, index: u16) -> Option<&T> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl<T: PartialEq> PartialEq for ArrayValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
impl<T: Eq> Eq for ArrayValue<T> {}

impl<T> FromIterator<(u16, T)> for ArrayValue<T> {
    fn from_iter<I: IntoIterator<Item = (u16, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A tagged-variant LWM2M resource value. The tag never changes after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    None,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Deep-copied opaque byte sequence.
    Opaque(Bytes),
    /// Epoch-seconds integer.
    Time(i64),
    ObjectLink(ObjectLink),
    StringArray(ArrayValue<String>),
    IntegerArray(ArrayValue<i64>),
    FloatArray(ArrayValue<f64>),
    BooleanArray(ArrayValue<bool>),
    OpaqueArray(ArrayValue<Bytes>),
    TimeArray(ArrayValue<i64>),
    ObjectLinkArray(ArrayValue<ObjectLink>),
}

impl Value {
    pub fn opaque(bytes: &[u8]) -> Self {
        // Deep copy: `Bytes::copy_from_slice` owns its storage independent
        // of the caller's buffer.
        Value::Opaque(Bytes::copy_from_slice(bytes))
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Value::None => ResourceType::None,
            Value::String(_) => ResourceType::String,
            Value::Integer(_) => ResourceType::Integer,
            Value::Float(_) => ResourceType::Float,
            Value::Boolean(_) => ResourceType::Boolean,
            Value::Opaque(_) => ResourceType::Opaque,
            Value::Time(_) => ResourceType::Time,
            Value::ObjectLink(_) => ResourceType::ObjectLink,
            Value::StringArray(_) => ResourceType::StringArray,
            Value::IntegerArray(_) => ResourceType::IntegerArray,
            Value::FloatArray(_) => ResourceType::FloatArray,
            Value::BooleanArray(_) => ResourceType::BooleanArray,
            Value::OpaqueArray(_) => ResourceType::OpaqueArray,
            Value::TimeArray(_) => ResourceType::TimeArray,
            Value::ObjectLinkArray(_) => ResourceType::ObjectLinkArray,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&Bytes> {
        match self {
            Value::Opaque(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<i64> {
        match self {
            Value::Time(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object_link(&self) -> Option<ObjectLink> {
        match self {
            Value::ObjectLink(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&ArrayValue<String>> {
        match self {
            Value::StringArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_integer_array(&self) -> Option<&ArrayValue<i64>> {
        match self {
            Value::IntegerArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_float_array(&self) -> Option<&ArrayValue<f64>> {
        match self {
            Value::FloatArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_boolean_array(&self) -> Option<&ArrayValue<bool>> {
        match self {
            Value::BooleanArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_opaque_array(&self) -> Option<&ArrayValue<Bytes>> {
        match self {
            Value::OpaqueArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_time_array(&self) -> Option<&ArrayValue<i64>> {
        match self {
            Value::TimeArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object_link_array(&self) -> Option<&ArrayValue<ObjectLink>> {
        match self {
            Value::ObjectLinkArray(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_constructor_deep_copies() {
        let mut src = vec![1u8, 2, 3];
        let v = Value::opaque(&src);
        src[0] = 99;
        assert_eq!(v.as_opaque().unwrap().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn array_equality_is_order_independent() {
        let mut a = ArrayValue::new();
        a.set_at(2, 20i64);
        a.set_at(0, 0i64);
        let mut b = ArrayValue::new();
        b.set_at(0, 0i64);
        b.set_at(2, 20i64);
        assert_eq!(a, b);
    }

    #[test]
    fn set_at_existing_index_replaces() {
        let mut a: ArrayValue<i64> = ArrayValue::new();
        a.set_at(1, 10);
        a.set_at(1, 20);
        assert_eq!(a.len(), 1);
        assert_eq!(a.get(1), Some(&20));
    }

    #[test]
    fn object_link_display() {
        let link = ObjectLink {
            object_id: 3,
            object_instance_id: 0,
        };
        assert_eq!(link.to_string(), "3:0");
    }

    proptest::proptest! {
        #[test]
        fn array_equality_independent_of_insertion_order(
            pairs in proptest::collection::vec((0u16..50, proptest::num::i64::ANY), 0..20)
        ) {
            let mut forward: ArrayValue<i64> = ArrayValue::new();
            for (k, v) in &pairs {
                forward.set_at(*k, *v);
            }
            let mut reversed: ArrayValue<i64> = ArrayValue::new();
            for (k, v) in pairs.iter().rev() {
                reversed.set_at(*k, *v);
            }
            proptest::prop_assert_eq!(forward, reversed);
        }
    }
}
