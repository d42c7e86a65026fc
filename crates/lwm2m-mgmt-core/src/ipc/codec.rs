//! XML wire codec for [`Message`].
//!
//! Strings are UTF-8 plain text, integers/times are decimal, floats are
//! decimal with a dot, booleans are `True`/`False`, opaques are base64, and
//! object links are `O:I`. Resource value *type* isn't self-describing on
//! the wire (LWM2M IPC mirrors the daemon's own definition registry), so
//! decoding a `<Value>` element needs the [`DefinitionRegistry`] to know
//! which scalar type to parse into.

use crate::definition::DefinitionRegistry;
use crate::ipc::message::{Message, MessageKind, MessageType};
use crate::tree::{AttributeLink, ChangeType, PathResult, WriteMode};
use crate::value::{ObjectLink, ResourceType, Value};
use base64::Engine;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed message: {0}")]
    Malformed(String),
}

fn malformed(msg: impl Into<String>) -> CodecError {
    CodecError::Malformed(msg.into())
}

/// Serialises a [`Message`] to the XML document carried in one datagram.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, CodecError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let root_tag = message.message_type.as_str();

    let mut root = BytesStart::new(root_tag);
    root.push_attribute(("Type", message.kind.as_str()));
    root.push_attribute(("SessionID", message.session_id.to_string().as_str()));
    if let Some(message_id) = message.message_id {
        root.push_attribute(("MessageID", message_id.to_string().as_str()));
    }
    writer.write_event(Event::Start(root))?;

    if !message.clients.is_empty() || !message.object_definitions.is_empty() || !message.observe_cancellations.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("Content")))?;

        if !message.clients.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("Clients")))?;
            for (client_id, tree) in &message.clients {
                write_client(&mut writer, client_id, tree, &message.arguments)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Clients")))?;
        }

        if !message.object_definitions.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("ObjectDefinitions")))?;
            for definition in &message.object_definitions {
                write_object_definition(&mut writer, definition)?;
            }
            writer.write_event(Event::End(BytesEnd::new("ObjectDefinitions")))?;
        }

        if !message.observe_cancellations.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("Cancellations")))?;
            for (client_id, path) in &message.observe_cancellations {
                writer.write_event(Event::Start(BytesStart::new("Cancellation")))?;
                write_text_element(&mut writer, "ClientID", client_id)?;
                write_text_element(&mut writer, "Path", path)?;
                writer.write_event(Event::End(BytesEnd::new("Cancellation")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("Cancellations")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Content")))?;
    }

    writer.write_event(Event::End(BytesEnd::new(root_tag)))?;
    Ok(writer.into_inner().into_inner())
}

fn write_client(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    client_id: &str,
    tree: &crate::tree::ObjectsTree,
    arguments: &std::collections::BTreeMap<String, Vec<u8>>,
) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new("Client")))?;
    write_text_element(writer, "ID", client_id)?;
    writer.write_event(Event::Start(BytesStart::new("Objects")))?;

    for object_id in tree.object_ids() {
        let object = tree.object(object_id).expect("id came from object_ids()");
        writer.write_event(Event::Start(BytesStart::new("Object")))?;
        write_text_element(writer, "ID", &object_id.to_string())?;
        if let Some(result) = object.result {
            write_result(writer, result)?;
        }
        for (&instance_id, instance) in &object.instances {
            writer.write_event(Event::Start(BytesStart::new("ObjectInstance")))?;
            write_text_element(writer, "ID", &instance_id.to_string())?;
            for (&resource_id, resource) in &instance.resources {
                writer.write_event(Event::Start(BytesStart::new("Resource")))?;
                write_text_element(writer, "ID", &resource_id.to_string())?;
                if let Some(value) = &resource.value {
                    write_value_element(writer, "Value", None, value)?;
                }
                for (&idx, ri) in &resource.instances {
                    if let Some(value) = &ri.value {
                        write_value_element(writer, "Value", Some(idx), value)?;
                    }
                }
                for (&link, &attr_value) in &resource.attributes {
                    let mut el = BytesStart::new("Attribute");
                    el.push_attribute(("Link", link.as_str()));
                    writer.write_event(Event::Start(el))?;
                    writer.write_event(Event::Text(BytesText::new(&attr_value.to_string())))?;
                    writer.write_event(Event::End(BytesEnd::new("Attribute")))?;
                }
                let argument_key = format!("{client_id}:{object_id}:{instance_id}:{resource_id}");
                if let Some(args) = arguments.get(&argument_key) {
                    write_text_element(writer, "Arguments", &base64::engine::general_purpose::STANDARD.encode(args))?;
                }
                if let Some(change) = resource.change {
                    write_text_element(writer, "ChangeType", change.as_str())?;
                }
                if let Some(result) = resource.result {
                    write_result(writer, result)?;
                }
                writer.write_event(Event::End(BytesEnd::new("Resource")))?;
            }
            if let Some(change) = instance.change {
                write_text_element(writer, "ChangeType", change.as_str())?;
            }
            if let Some(write_mode) = instance.write_mode {
                let text = match write_mode {
                    WriteMode::Replace => "Replace",
                    WriteMode::Update => "Update",
                };
                write_text_element(writer, "WriteMode", text)?;
            }
            if let Some(result) = instance.result {
                write_result(writer, result)?;
            }
            writer.write_event(Event::End(BytesEnd::new("ObjectInstance")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("Object")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("Objects")))?;
    writer.write_event(Event::End(BytesEnd::new("Client")))?;
    Ok(())
}

fn write_object_definition(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    definition: &crate::definition::ObjectDefinition,
) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new("ObjectDefinition")))?;
    write_text_element(writer, "ID", &definition.object_id().to_string())?;
    write_text_element(writer, "Name", definition.name())?;
    write_text_element(writer, "MinInstances", &definition.min_instances().to_string())?;
    write_text_element(writer, "MaxInstances", &definition.max_instances().to_string())?;
    for resource in definition.resources() {
        writer.write_event(Event::Start(BytesStart::new("ResourceDefinition")))?;
        write_text_element(writer, "ID", &resource.resource_id().to_string())?;
        write_text_element(writer, "Name", resource.name())?;
        write_text_element(writer, "Type", resource.resource_type().as_str())?;
        write_text_element(writer, "MinInstances", &resource.min_instances().to_string())?;
        write_text_element(writer, "MaxInstances", &resource.max_instances().to_string())?;
        write_text_element(writer, "Operations", resource.operations().as_str())?;
        if let Some(default) = resource.default_value() {
            write_text_element(writer, "Default", &encode_scalar(default)?)?;
        }
        writer.write_event(Event::End(BytesEnd::new("ResourceDefinition")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("ObjectDefinition")))?;
    Ok(())
}

fn write_result(writer: &mut Writer<Cursor<Vec<u8>>>, result: PathResult) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new("Result")))?;
    write_text_element(writer, "Error", &result.error.to_string())?;
    if let Some(code) = result.lwm2m_error {
        write_text_element(writer, "LWM2MError", &code.to_string())?;
    }
    writer.write_event(Event::End(BytesEnd::new("Result")))?;
    Ok(())
}

fn write_text_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_value_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    array_index: Option<u16>,
    value: &Value,
) -> Result<(), CodecError> {
    let mut el = BytesStart::new(tag);
    if let Some(idx) = array_index {
        el.push_attribute(("ValueID", idx.to_string().as_str()));
    }
    writer.write_event(Event::Start(el))?;
    let text = encode_scalar(value)?;
    writer.write_event(Event::Text(BytesText::new(&text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn encode_scalar(value: &Value) -> Result<String, CodecError> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Time(t) => t.to_string(),
        Value::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.1}")
            } else {
                f.to_string()
            }
        }
        Value::Boolean(b) => if *b { "True" } else { "False" }.to_string(),
        Value::Opaque(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
        Value::ObjectLink(link) => link.to_string(),
        Value::None => String::new(),
        _ => return Err(malformed("cannot encode an array as a single scalar element")),
    })
}

/// Parses the XML document of one datagram into a [`Message`]. `registry`
/// resolves the scalar type for each `<Value>` so the right [`Value`]
/// variant is constructed.
pub fn decode_message(bytes: &[u8], registry: &DefinitionRegistry) -> Result<Message, CodecError> {
    let mut reader = quick_xml::Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut message: Option<Message> = None;

    // Parsing state, pushed/popped as we descend into Clients/Client/
    // Objects/Object/ObjectInstance/Resource/ResourceInstance.
    let mut client_id: Option<String> = None;
    let mut object_id: Option<u16> = None;
    let mut instance_id: Option<u16> = None;
    let mut resource_id: Option<u16> = None;
    let mut pending_value_id: Option<u16> = None;
    let mut pending_attribute_link: Option<AttributeLink> = None;
    let mut result_error: Option<String> = None;
    let mut result_lwm2m: Option<String> = None;
    let mut pending_cancel_client: Option<String> = None;
    let mut tag_stack: Vec<String> = Vec::new();

    // Object/resource definition parsing state, reset on each
    // ObjectDefinition/ResourceDefinition start tag.
    let mut def_object_id: Option<u16> = None;
    let mut def_object_name: Option<String> = None;
    let mut def_object_min: u32 = 0;
    let mut def_object_max: u32 = 1;
    let mut def_resources: Vec<crate::definition::ResourceDefinition> = Vec::new();

    let mut res_id: Option<u16> = None;
    let mut res_name: Option<String> = None;
    let mut res_type: Option<ResourceType> = None;
    let mut res_min: u32 = 0;
    let mut res_max: u32 = 1;
    let mut res_ops: Option<crate::definition::Operations> = None;
    let mut res_default_text: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "Request" | "Response" | "Notification" => {
                        let message_type = match name.as_str() {
                            "Request" => MessageType::Request,
                            "Response" => MessageType::Response,
                            _ => MessageType::Notification,
                        };
                        let mut kind = None;
                        let mut session_id = 0u32;
                        let mut message_id = None;
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                            let val = attr.decode_and_unescape_value(reader.decoder())?.to_string();
                            match key.as_str() {
                                "Type" => kind = MessageKind::parse(message_type, &val),
                                "SessionID" => session_id = val.parse().unwrap_or(0),
                                "MessageID" => message_id = val.parse().ok(),
                                _ => {}
                            }
                        }
                        let kind = kind.ok_or_else(|| malformed("missing or unknown Type attribute"))?;
                        message = Some(Message::new(message_type, kind, session_id, message_id));
                    }
                    "Client" => client_id = None,
                    "Object" => object_id = None,
                    "ObjectInstance" => instance_id = None,
                    "Resource" => resource_id = None,
                    "Value" => {
                        pending_value_id = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ValueID" {
                                let val = attr.decode_and_unescape_value(reader.decoder())?.to_string();
                                pending_value_id = val.parse().ok();
                            }
                        }
                    }
                    "Attribute" => {
                        pending_attribute_link = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"Link" {
                                let val = attr.decode_and_unescape_value(reader.decoder())?.to_string();
                                pending_attribute_link = AttributeLink::parse(&val);
                            }
                        }
                    }
                    "Result" => {
                        result_error = None;
                        result_lwm2m = None;
                    }
                    "ObjectDefinition" => {
                        def_object_id = None;
                        def_object_name = None;
                        def_object_min = 0;
                        def_object_max = 1;
                        def_resources = Vec::new();
                    }
                    "ResourceDefinition" => {
                        res_id = None;
                        res_name = None;
                        res_type = None;
                        res_min = 0;
                        res_max = 1;
                        res_ops = None;
                        res_default_text = None;
                    }
                    _ => {}
                }
                tag_stack.push(name);
            }
            Event::Text(text) => {
                let text = text.unescape()?.to_string();
                let current = tag_stack.last().cloned().unwrap_or_default();
                match current.as_str() {
                    "ID" => {
                        let parent = tag_stack.get(tag_stack.len().wrapping_sub(2)).cloned().unwrap_or_default();
                        match parent.as_str() {
                            "Client" => client_id = Some(text),
                            "Object" => object_id = text.parse().ok(),
                            "ObjectInstance" => instance_id = text.parse().ok(),
                            "Resource" => resource_id = text.parse().ok(),
                            "ObjectDefinition" => def_object_id = text.parse().ok(),
                            "ResourceDefinition" => res_id = text.parse().ok(),
                            _ => {}
                        }
                    }
                    "Name" => {
                        let parent = tag_stack.get(tag_stack.len().wrapping_sub(2)).cloned().unwrap_or_default();
                        match parent.as_str() {
                            "ObjectDefinition" => def_object_name = Some(text),
                            "ResourceDefinition" => res_name = Some(text),
                            _ => {}
                        }
                    }
                    "MinInstances" => {
                        let parent = tag_stack.get(tag_stack.len().wrapping_sub(2)).cloned().unwrap_or_default();
                        match parent.as_str() {
                            "ObjectDefinition" => def_object_min = text.parse().unwrap_or(0),
                            "ResourceDefinition" => res_min = text.parse().unwrap_or(0),
                            _ => {}
                        }
                    }
                    "MaxInstances" => {
                        let parent = tag_stack.get(tag_stack.len().wrapping_sub(2)).cloned().unwrap_or_default();
                        match parent.as_str() {
                            "ObjectDefinition" => def_object_max = text.parse().unwrap_or(1),
                            "ResourceDefinition" => res_max = text.parse().unwrap_or(1),
                            _ => {}
                        }
                    }
                    "Type" => res_type = ResourceType::parse(&text),
                    "Operations" => res_ops = crate::definition::Operations::parse(&text),
                    "Default" => res_default_text = Some(text),
                    "Value" => {
                        let message = message.as_mut().ok_or_else(|| malformed("Value before root"))?;
                        let (Some(cid), Some(oid), Some(iid), Some(rid)) =
                            (client_id.as_deref(), object_id, instance_id, resource_id)
                        else {
                            return Err(malformed("Value outside a resource path"));
                        };
                        let resource_type = registry
                            .lookup(oid)
                            .and_then(|obj| obj.resource(rid))
                            .map(|r| r.resource_type())
                            .unwrap_or(ResourceType::String);
                        let scalar = decode_scalar(&text, resource_type)?;
                        let tree = message.client_tree(cid);
                        match pending_value_id {
                            Some(idx) => {
                                tree.resource_mut(oid, iid, rid)
                                    .instances
                                    .entry(idx)
                                    .or_default()
                                    .value = Some(scalar);
                            }
                            None => {
                                tree.resource_mut(oid, iid, rid).value = Some(scalar);
                            }
                        }
                    }
                    "Attribute" => {
                        let message = message.as_mut().ok_or_else(|| malformed("Attribute before root"))?;
                        let (Some(cid), Some(oid), Some(iid), Some(rid), Some(link)) = (
                            client_id.as_deref(),
                            object_id,
                            instance_id,
                            resource_id,
                            pending_attribute_link,
                        ) else {
                            return Err(malformed("Attribute outside a resource path"));
                        };
                        let numeric: f64 = text.parse().map_err(|_| malformed("non-numeric attribute value"))?;
                        message.client_tree(cid).set_attribute(
                            &crate::path::Path::for_resource(oid, iid, rid).expect("ids in range"),
                            link,
                            numeric,
                        );
                    }
                    "Error" => result_error = Some(text),
                    "LWM2MError" => result_lwm2m = Some(text),
                    "ChangeType" => {
                        let message = message.as_mut().ok_or_else(|| malformed("ChangeType before root"))?;
                        let Some(change) = ChangeType::parse(&text) else {
                            return Err(malformed("unknown ChangeType"));
                        };
                        if let Some(cid) = client_id.as_deref() {
                            if let Some(oid) = object_id {
                                let path = match (instance_id, resource_id) {
                                    (Some(iid), Some(rid)) => crate::path::Path::for_resource(oid, iid, rid).ok(),
                                    (Some(iid), None) => crate::path::Path::for_object_instance(oid, iid).ok(),
                                    _ => None,
                                };
                                if let Some(path) = path {
                                    message.client_tree(cid).set_change(&path, change);
                                }
                            }
                        }
                    }
                    "ClientID" if tag_stack.get(tag_stack.len().wrapping_sub(2)).map(String::as_str) == Some("Cancellation") => {
                        pending_cancel_client = Some(text);
                    }
                    "Path" if tag_stack.get(tag_stack.len().wrapping_sub(2)).map(String::as_str) == Some("Cancellation") => {
                        let message = message.as_mut().ok_or_else(|| malformed("Path before root"))?;
                        if let Some(cid) = pending_cancel_client.clone() {
                            message.observe_cancellations.push((cid, text));
                        }
                    }
                    "Arguments" => {
                        let message = message.as_mut().ok_or_else(|| malformed("Arguments before root"))?;
                        if let (Some(cid), Some(oid), Some(iid), Some(rid)) =
                            (client_id.as_deref(), object_id, instance_id, resource_id)
                        {
                            if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(&text) {
                                let key = format!("{cid}:{oid}:{iid}:{rid}");
                                message.arguments.insert(key, bytes);
                            }
                        }
                    }
                    "WriteMode" => {
                        let message = message.as_mut().ok_or_else(|| malformed("WriteMode before root"))?;
                        if let (Some(cid), Some(oid), Some(iid)) = (client_id.as_deref(), object_id, instance_id) {
                            let mode = if text == "Replace" {
                                WriteMode::Replace
                            } else {
                                WriteMode::Update
                            };
                            message.client_tree(cid).instance_mut(oid, iid).write_mode = Some(mode);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "Result" {
                    if let Some(message) = message.as_mut() {
                        if let (Some(cid), Some(error_text)) = (client_id.as_deref(), result_error.take()) {
                            let error = parse_error_kind(&error_text);
                            let lwm2m_error = result_lwm2m.take().and_then(|s| parse_lwm2m_code(&s));
                            let result = PathResult { error, lwm2m_error };
                            let tree = message.client_tree(cid);
                            match (object_id, instance_id, resource_id) {
                                (Some(oid), Some(iid), Some(rid)) => {
                                    tree.set_result(&crate::path::Path::for_resource(oid, iid, rid).unwrap(), result)
                                }
                                (Some(oid), Some(iid), None) => tree.set_result(
                                    &crate::path::Path::for_object_instance(oid, iid).unwrap(),
                                    result,
                                ),
                                (Some(oid), None, None) => {
                                    tree.set_result(&crate::path::Path::for_object(oid).unwrap(), result)
                                }
                                _ => {}
                            }
                        }
                    }
                } else if name == "ResourceDefinition" {
                    let resource_type = res_type.take().unwrap_or(ResourceType::String);
                    let operations = res_ops.take().unwrap_or(crate::definition::Operations::ReadWrite);
                    let default_value = res_default_text.take().and_then(|text| {
                        if resource_type.is_array() {
                            None
                        } else {
                            decode_scalar(&text, resource_type).ok()
                        }
                    });
                    def_resources.push(crate::definition::ResourceDefinition::new(
                        res_id.take().unwrap_or(0),
                        res_name.take().unwrap_or_default(),
                        resource_type,
                        res_min,
                        res_max,
                        operations,
                        default_value,
                    ));
                } else if name == "ObjectDefinition" {
                    if let Some(defined_object_id) = def_object_id.take() {
                        let mut definition = crate::definition::ObjectDefinition::new(
                            defined_object_id,
                            def_object_name.take().unwrap_or_default(),
                            def_object_min,
                            def_object_max,
                        );
                        for resource in def_resources.drain(..) {
                            definition = definition.with_resource(resource);
                        }
                        if let Some(message) = message.as_mut() {
                            message.object_definitions.push(definition);
                        }
                    }
                }
                tag_stack.pop();
            }
            _ => {}
        }
        buf.clear();
    }

    message.ok_or_else(|| malformed("no root element found"))
}

fn decode_scalar(text: &str, resource_type: ResourceType) -> Result<Value, CodecError> {
    Ok(match resource_type {
        ResourceType::String | ResourceType::StringArray => Value::String(text.to_string()),
        ResourceType::Integer | ResourceType::IntegerArray => {
            Value::Integer(text.parse().map_err(|_| malformed("invalid integer"))?)
        }
        ResourceType::Float | ResourceType::FloatArray => {
            Value::Float(text.parse().map_err(|_| malformed("invalid float"))?)
        }
        ResourceType::Boolean | ResourceType::BooleanArray => Value::Boolean(text == "True"),
        ResourceType::Opaque | ResourceType::OpaqueArray => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(text)
                .map_err(|_| malformed("invalid base64 opaque"))?;
            Value::Opaque(bytes.into())
        }
        ResourceType::Time | ResourceType::TimeArray => {
            Value::Time(text.parse().map_err(|_| malformed("invalid time"))?)
        }
        ResourceType::ObjectLink | ResourceType::ObjectLinkArray => {
            let (o, i) = text.split_once(':').ok_or_else(|| malformed("invalid object link"))?;
            Value::ObjectLink(ObjectLink {
                object_id: o.parse().map_err(|_| malformed("invalid object link object id"))?,
                object_instance_id: i.parse().map_err(|_| malformed("invalid object link instance id"))?,
            })
        }
        ResourceType::None => Value::None,
    })
}

fn parse_error_kind(s: &str) -> crate::error::ErrorKind {
    use crate::error::ErrorKind::*;
    match s {
        "Success" => Success,
        "SessionInvalid" => SessionInvalid,
        "SessionNotConnected" => SessionNotConnected,
        "IPCError" => IpcError,
        "Timeout" => Timeout,
        "OperationInvalid" => OperationInvalid,
        "PathInvalid" => PathInvalid,
        "IDInvalid" => IdInvalid,
        "TypeMismatch" => TypeMismatch,
        "NotDefined" => NotDefined,
        "AlreadyDefined" => AlreadyDefined,
        "ObservationInvalid" => ObservationInvalid,
        "DefinitionInvalid" => DefinitionInvalid,
        "AddInvalid" => AddInvalid,
        "OutOfMemory" => OutOfMemory,
        "Overrun" => Overrun,
        "ClientNotFound" => ClientNotFound,
        "LWM2MError" => LwM2MError,
        _ => IpcError,
    }
}

fn parse_lwm2m_code(s: &str) -> Option<crate::error::LwM2MErrorCode> {
    use crate::error::LwM2MErrorCode::*;
    Some(match s {
        "BadRequest" => BadRequest,
        "Unauthorized" => Unauthorized,
        "NotFound" => NotFound,
        "MethodNotAllowed" => MethodNotAllowed,
        "InternalError" => InternalError,
        "Overrun" => Overrun,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::message::{MessageKind, MessageType};
    use crate::path::Path;

    #[test]
    fn round_trips_a_read_response_through_xml() {
        let mut message = Message::new(MessageType::Response, MessageKind::Read, 7, Some(42));
        let tree = message.client_tree("TestClient1");
        tree.set_value(&Path::parse("/10000/0/0").unwrap(), Value::Integer(123456787));
        tree.set_result(&Path::parse("/10000/0/0").unwrap(), PathResult::success());

        let bytes = encode_message(&message).unwrap();

        let mut registry = DefinitionRegistry::new();
        registry
            .add(
                crate::definition::ObjectDefinition::new(10000, "Test", 0, 1).with_resource(
                    crate::definition::ResourceDefinition::new(
                        0,
                        "Value",
                        ResourceType::Integer,
                        1,
                        1,
                        crate::definition::Operations::ReadWrite,
                        None,
                    ),
                ),
            )
            .unwrap();

        let decoded = decode_message(&bytes, &registry).unwrap();
        assert_eq!(decoded.message_id, Some(42));
        let decoded_tree = decoded.clients.get("TestClient1").unwrap();
        assert_eq!(
            decoded_tree.value_at(&Path::parse("/10000/0/0").unwrap()).unwrap(),
            &Value::Integer(123456787)
        );
    }

    #[test]
    fn round_trips_an_object_definition_through_xml() {
        let definition = crate::definition::ObjectDefinition::new(10000, "Test", 0, 1).with_resource(
            crate::definition::ResourceDefinition::new(
                0,
                "Value",
                ResourceType::Integer,
                1,
                1,
                crate::definition::Operations::ReadWrite,
                Some(Value::Integer(123456787)),
            ),
        );
        let mut message = Message::new(MessageType::Response, MessageKind::Define, 7, Some(1));
        message.object_definitions.push(definition);

        let bytes = encode_message(&message).unwrap();
        let decoded = decode_message(&bytes, &DefinitionRegistry::new()).unwrap();

        assert_eq!(decoded.object_definitions.len(), 1);
        let decoded_def = &decoded.object_definitions[0];
        assert_eq!(decoded_def.object_id(), 10000);
        assert_eq!(decoded_def.name(), "Test");
        assert_eq!(decoded_def.min_instances(), 0);
        assert_eq!(decoded_def.max_instances(), 1);

        let decoded_resource = decoded_def.resource(0).unwrap();
        assert_eq!(decoded_resource.name(), "Value");
        assert_eq!(decoded_resource.resource_type(), ResourceType::Integer);
        assert_eq!(decoded_resource.min_instances(), 1);
        assert_eq!(decoded_resource.max_instances(), 1);
        assert_eq!(decoded_resource.operations(), crate::definition::Operations::ReadWrite);
        assert_eq!(decoded_resource.default_value(), Some(&Value::Integer(123456787)));
    }

    #[test]
    fn connect_response_populates_registry_with_the_decoded_type() {
        // Regression for decoding a Read response against a registry that
        // itself came from a just-decoded Connect response: without the
        // registry, an Integer resource would silently decode as a String.
        let mut connect_response = Message::new(MessageType::Response, MessageKind::Connect, 1, Some(1));
        connect_response.object_definitions.push(
            crate::definition::ObjectDefinition::new(10000, "Test", 0, 1).with_resource(
                crate::definition::ResourceDefinition::new(
                    0,
                    "Value",
                    ResourceType::Integer,
                    1,
                    1,
                    crate::definition::Operations::ReadWrite,
                    None,
                ),
            ),
        );
        let connect_bytes = encode_message(&connect_response).unwrap();
        let decoded_connect = decode_message(&connect_bytes, &DefinitionRegistry::new()).unwrap();

        let mut registry = DefinitionRegistry::new();
        registry.replace_all(decoded_connect.object_definitions);

        let mut read_response = Message::new(MessageType::Response, MessageKind::Read, 1, Some(2));
        read_response
            .client_tree("TestClient1")
            .set_value(&Path::parse("/10000/0/0").unwrap(), Value::Integer(123456787));
        let read_bytes = encode_message(&read_response).unwrap();
        let decoded_read = decode_message(&read_bytes, &registry).unwrap();

        assert_eq!(
            decoded_read.clients.get("TestClient1").unwrap().value_at(&Path::parse("/10000/0/0").unwrap()),
            Some(&Value::Integer(123456787))
        );
    }
}
