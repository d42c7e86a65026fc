//! `server-define`: registers object definitions with the daemon. No
//! `awa-server-define` tool survives in `original_source/` to ground a
//! wire/file format on, so this tool reads
//! a small line-oriented text format of its own — no `serde` dependency
//! is introduced for a single one-off parser this shape.
//!
//! Usage: `server-define [FILE]` (reads stdin if `FILE` is omitted)
//!
//! ```text
//! object 3 Device 1 1
//! resource 0 Manufacturer string 1 1 r
//! resource 1 ModelNumber string 1 1 r
//! object 10000 Test 0 1
//! resource 0 Value integer 1 1 rw
//! ```
//!
//! Each `object OBJECT_ID NAME MIN MAX` line starts a new object
//! definition; each following `resource RESOURCE_ID NAME TYPE MIN MAX OPS`
//! line attaches a resource to the most recently declared object. `TYPE`
//! is one of the [`lwm2m_mgmt_core::ResourceType`] names (case-insensitive,
//! e.g. `integer`, `string_array`); `OPS` is one of `none`, `r`, `w`, `rw`,
//! `e`.

use lwm2m_mgmt_core::definition::{ObjectDefinition, Operations, ResourceDefinition};
use lwm2m_mgmt_core::response::PerformOutcome;
use lwm2m_mgmt_core::{cli, ResourceType};
use lwm2m_mgmt_core::operation::DefineOperation;
use std::io::Read;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let common = cli::args_after_program_name();
    cli::init_logging(&common);

    let text = match common.positionals.first() {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("{path}: {e}");
                return 1;
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                eprintln!("failed to read stdin: {e}");
                return 1;
            }
            buf
        }
    };

    let definitions = match parse_definitions(&text) {
        Ok(definitions) => definitions,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    if definitions.is_empty() {
        eprintln!("no object definitions given");
        return 1;
    }

    let session = match cli::connect(&common) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("connect failed: {e}");
            return 1;
        }
    };

    let mut op = DefineOperation::new(&session);
    for definition in definitions {
        op.add(definition);
    }
    match op.perform(None) {
        Ok(PerformOutcome::Success) => 0,
        Ok(PerformOutcome::PartialFailure) => {
            eprintln!("Define partially failed");
            1
        }
        Err(e) => {
            eprintln!("Define failed: {e}");
            1
        }
    }
}

fn parse_definitions(text: &str) -> Result<Vec<ObjectDefinition>, String> {
    let mut objects = Vec::new();
    let mut current: Option<ObjectDefinition> = None;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["object", id, name, min, max] => {
                if let Some(object) = current.take() {
                    objects.push(object);
                }
                let object_id = parse_u16(id, line_no)?;
                let min_instances = parse_u32(min, line_no)?;
                let max_instances = parse_u32(max, line_no)?;
                current = Some(ObjectDefinition::new(object_id, *name, min_instances, max_instances));
            }
            ["resource", id, name, ty, min, max, ops] => {
                let object = current
                    .take()
                    .ok_or_else(|| format!("line {}: resource before any object", line_no + 1))?;
                let resource_id = parse_u16(id, line_no)?;
                let resource_type = parse_resource_type(ty, line_no)?;
                let min_instances = parse_u32(min, line_no)?;
                let max_instances = parse_u32(max, line_no)?;
                let operations = parse_operations(ops, line_no)?;
                current = Some(object.with_resource(ResourceDefinition::new(
                    resource_id,
                    *name,
                    resource_type,
                    min_instances,
                    max_instances,
                    operations,
                    None,
                )));
            }
            _ => return Err(format!("line {}: malformed definition line", line_no + 1)),
        }
    }
    if let Some(object) = current.take() {
        objects.push(object);
    }
    Ok(objects)
}

fn parse_u16(text: &str, line_no: usize) -> Result<u16, String> {
    text.parse().map_err(|_| format!("line {}: {text} is not a valid id", line_no + 1))
}

fn parse_u32(text: &str, line_no: usize) -> Result<u32, String> {
    text.parse().map_err(|_| format!("line {}: {text} is not a valid count", line_no + 1))
}

fn parse_resource_type(text: &str, line_no: usize) -> Result<ResourceType, String> {
    match text.to_ascii_lowercase().as_str() {
        "none" => Ok(ResourceType::None),
        "string" => Ok(ResourceType::String),
        "integer" => Ok(ResourceType::Integer),
        "float" => Ok(ResourceType::Float),
        "boolean" => Ok(ResourceType::Boolean),
        "opaque" => Ok(ResourceType::Opaque),
        "time" => Ok(ResourceType::Time),
        "objectlink" => Ok(ResourceType::ObjectLink),
        "string_array" => Ok(ResourceType::StringArray),
        "integer_array" => Ok(ResourceType::IntegerArray),
        "float_array" => Ok(ResourceType::FloatArray),
        "boolean_array" => Ok(ResourceType::BooleanArray),
        "opaque_array" => Ok(ResourceType::OpaqueArray),
        "time_array" => Ok(ResourceType::TimeArray),
        "objectlink_array" => Ok(ResourceType::ObjectLinkArray),
        other => Err(format!("line {}: unknown resource type {other}", line_no + 1)),
    }
}

fn parse_operations(text: &str, line_no: usize) -> Result<Operations, String> {
    match text.to_ascii_lowercase().as_str() {
        "none" => Ok(Operations::None),
        "r" => Ok(Operations::ReadOnly),
        "w" => Ok(Operations::WriteOnly),
        "rw" => Ok(Operations::ReadWrite),
        "e" => Ok(Operations::Execute),
        other => Err(format!("line {}: unknown operations {other}", line_no + 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_object_with_two_resources() {
        let text = "object 3 Device 1 1\nresource 0 Manufacturer string 1 1 r\nresource 1 Reboot none 1 1 e\n";
        let objects = parse_definitions(text).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].object_id(), 3);
        assert_eq!(objects[0].resource(0).unwrap().resource_type(), ResourceType::String);
        assert_eq!(objects[0].resource(1).unwrap().operations(), Operations::Execute);
    }

    #[test]
    fn resource_before_any_object_is_an_error() {
        let text = "resource 0 Value integer 1 1 rw\n";
        assert!(parse_definitions(text).is_err());
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        let text = "# a comment\n\nobject 10000 Test 0 1\n\nresource 0 Value integer 1 1 rw\n";
        let objects = parse_definitions(text).unwrap();
        assert_eq!(objects.len(), 1);
    }
}
