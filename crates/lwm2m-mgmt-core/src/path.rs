//! LWM2M path parsing, construction, and canonical formatting.
//!
//! A path is a triple `(objectId?, instanceId?, resourceId?)`, each either
//! absent or in `[0, 65535]`. Valid shapes are object (`/O`), object-instance
//! (`/O/I`), and resource (`/O/I/R`). `65535` parses but is reserved as
//! [`INVALID_ID`]; callers decide whether to reject it.

use crate::error::{CoreError, ErrorKind};
use std::fmt;

/// Reserved ID marking "no identifier" — also the one ID value the grammar
/// accepts but which should never address a real object/instance/resource.
pub const INVALID_ID: u16 = 65535;

/// A validated LWM2M path. Construction always goes through a constructor
/// or `parse`, so a live `Path` is never in an invalid state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    object_id: u16,
    instance_id: Option<u16>,
    resource_id: Option<u16>,
}

impl Path {
    /// Builds an object path `/O`.
    pub fn for_object(object_id: u16) -> Result<Self, CoreError> {
        Ok(Self {
            object_id,
            instance_id: None,
            resource_id: None,
        })
    }

    /// Builds an object-instance path `/O/I`.
    pub fn for_object_instance(object_id: u16, instance_id: u16) -> Result<Self, CoreError> {
        Ok(Self {
            object_id,
            instance_id: Some(instance_id),
            resource_id: None,
        })
    }

    /// Builds a resource path `/O/I/R`.
    pub fn for_resource(object_id: u16, instance_id: u16, resource_id: u16) -> Result<Self, CoreError> {
        Ok(Self {
            object_id,
            instance_id: Some(instance_id),
            resource_id: Some(resource_id),
        })
    }

    /// Parses `"/O"`, `"/O/I"`, or `"/O/I/R"`. Rejects a leading/trailing
    /// slash mismatch, non-canonical integers (e.g. `"03"`), negative
    /// numbers, and anything that doesn't round-trip through [`Path::to_string`].
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() || !s.starts_with('/') || s.ends_with('/') {
            return Err(invalid(s));
        }
        let rest = &s[1..];
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.is_empty() || segments.len() > 3 {
            return Err(invalid(s));
        }

        let mut ids = [0u16; 3];
        for (i, seg) in segments.iter().enumerate() {
            ids[i] = parse_canonical_u16(seg).ok_or_else(|| invalid(s))?;
        }

        let path = match segments.len() {
            1 => Self {
                object_id: ids[0],
                instance_id: None,
                resource_id: None,
            },
            2 => Self {
                object_id: ids[0],
                instance_id: Some(ids[1]),
                resource_id: None,
            },
            3 => Self {
                object_id: ids[0],
                instance_id: Some(ids[1]),
                resource_id: Some(ids[2]),
            },
            _ => unreachable!(),
        };

        // Invariant 1: round-trip through the canonical formatter.
        if path.to_string() != s {
            return Err(invalid(s));
        }
        Ok(path)
    }

    pub fn object_id(&self) -> u16 {
        self.object_id
    }

    pub fn instance_id(&self) -> Option<u16> {
        self.instance_id
    }

    pub fn resource_id(&self) -> Option<u16> {
        self.resource_id
    }

    pub fn is_object(&self) -> bool {
        self.instance_id.is_none()
    }

    pub fn is_object_instance(&self) -> bool {
        self.instance_id.is_some() && self.resource_id.is_none()
    }

    pub fn is_resource(&self) -> bool {
        self.resource_id.is_some()
    }

    /// `true` if `self` addresses `other` or one of its ancestors — i.e. an
    /// observation registered at `self` should fire when `other` changes.
    pub fn contains(&self, other: &Path) -> bool {
        if self.object_id != other.object_id {
            return false;
        }
        match self.instance_id {
            None => true,
            Some(self_instance) => match other.instance_id {
                Some(other_instance) if other_instance == self_instance => match self.resource_id {
                    None => true,
                    Some(self_resource) => other.resource_id == Some(self_resource),
                },
                _ => false,
            },
        }
    }

    /// The parent object-instance path of a resource path, if any.
    pub fn parent(&self) -> Option<Path> {
        match (self.instance_id, self.resource_id) {
            (Some(i), Some(_)) => Some(Path {
                object_id: self.object_id,
                instance_id: Some(i),
                resource_id: None,
            }),
            (Some(_), None) => Some(Path {
                object_id: self.object_id,
                instance_id: None,
                resource_id: None,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.object_id)?;
        if let Some(i) = self.instance_id {
            write!(f, "/{}", i)?;
            if let Some(r) = self.resource_id {
                write!(f, "/{}", r)?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Path {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

fn invalid(s: &str) -> CoreError {
    CoreError::new(ErrorKind::PathInvalid).with_message(format!("invalid path: {s}"))
}

/// Parses a decimal integer with no sign and no leading zeros (except the
/// literal `"0"`), in range `[0, 65535]`. This is what rejects `"03"`.
fn parse_canonical_u16(segment: &str) -> Option<u16> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse::<u16>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_shapes() {
        assert!(Path::parse("/3").unwrap().is_object());
        assert!(Path::parse("/3/0").unwrap().is_object_instance());
        assert!(Path::parse("/3/0/1").unwrap().is_resource());
    }

    #[test]
    fn rejects_non_canonical_leading_zero() {
        assert!(Path::parse("/03/0").is_err());
        assert!(Path::parse("/3/00").is_err());
    }

    #[test]
    fn rejects_trailing_slash_and_empty() {
        assert!(Path::parse("/3/0/").is_err());
        assert!(Path::parse("").is_err());
        assert!(Path::parse("3/0").is_err());
    }

    #[test]
    fn rejects_overflow_and_negative() {
        assert!(Path::parse("/65536").is_err());
        assert!(Path::parse("/-1").is_err());
    }

    #[test]
    fn accepts_reserved_invalid_id_at_parse_time() {
        // Grammar accepts 65535; callers decide whether that's meaningful.
        let p = Path::parse("/65535").unwrap();
        assert_eq!(p.object_id(), INVALID_ID);
    }

    #[test]
    fn parent_of_resource_is_object_instance() {
        let p = Path::parse("/3/0/1").unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.to_string(), "/3/0");
    }

    #[test]
    fn contains_matches_self_and_descendants() {
        let instance = Path::parse("/3/0").unwrap();
        let resource = Path::parse("/3/0/15").unwrap();
        let other_resource = Path::parse("/3/0/1").unwrap();
        let other_instance = Path::parse("/3/1").unwrap();

        assert!(instance.contains(&resource));
        assert!(instance.contains(&other_resource));
        assert!(resource.contains(&resource));
        assert!(!resource.contains(&other_resource));
        assert!(!instance.contains(&other_instance));
    }

    proptest::proptest! {
        #[test]
        fn round_trip_for_all_valid_object_paths(o in 0u16..=65535u16) {
            let p = Path::for_object(o).unwrap();
            let s = p.to_string();
            proptest::prop_assert_eq!(Path::parse(&s).unwrap(), p);
        }

        #[test]
        fn round_trip_for_all_valid_resource_paths(o in 0u16..=65535u16, i in 0u16..=65535u16, r in 0u16..=65535u16) {
            let p = Path::for_resource(o, i, r).unwrap();
            let s = p.to_string();
            proptest::prop_assert_eq!(Path::parse(&s).unwrap(), p);
        }

        #[test]
        fn id_domain_matches_parse_success(x in -10i64..70000i64) {
            let s = format!("/{x}");
            let parsed = Path::parse(&s);
            let should_succeed = (0..=65534).contains(&x) || x == 65535;
            proptest::prop_assert_eq!(parsed.is_ok(), should_succeed);
        }
    }
}
