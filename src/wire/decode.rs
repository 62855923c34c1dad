//! wire::decode
//!
//! Payload-to-entity deserialization.
//!
//! Every leaf of the inbound payload is routed back through the
//! attribute router after stripping the reserved marker, with the
//! reverse coercion selected by the field the key resolves to. Keys
//! that resolve nowhere are dropped silently, matching a server that is
//! free to add response fields at any time.

use serde_json::Value;

use crate::schema::{BoolWire, Entity, FieldKind, FieldSpec, FieldValue, Schema, SchemaError};

use super::{WireError, IDENTITY_KEY, RESERVED_MARKER};

/// Reconstruct an entity graph from an inbound payload.
///
/// # Errors
///
/// - [`WireError::DecodeFailure`] when the payload is not an object or
///   a declared field carries an uninterpretable value
/// - [`WireError::Enum`] when an enum-typed field carries a value
///   outside the declared constant set
/// - [`WireError::Schema`] when a routed value fails the target field's
///   type check
pub fn decode(schema: &'static Schema, payload: &Value) -> Result<Entity, WireError> {
    let mut entity = Entity::new(schema);
    decode_into(&mut entity, payload)?;
    Ok(entity)
}

/// Route an inbound payload into an existing entity, overwriting any
/// fields the payload names.
pub fn decode_into(entity: &mut Entity, payload: &Value) -> Result<(), WireError> {
    let object = payload
        .as_object()
        .ok_or_else(|| WireError::DecodeFailure(format!("expected an object, got {payload}")))?;

    for (key, value) in object {
        if key == IDENTITY_KEY {
            continue;
        }
        // A declared nesting boundary holds a sub-object whose keys
        // route through this same entity.
        if entity.has_nest_boundary(key) {
            if !value.is_object() {
                return Err(WireError::DecodeFailure(format!(
                    "expected an object under '{key}', got {value}"
                )));
            }
            decode_into(entity, value)?;
            continue;
        }
        route_leaf(entity, key, value)?;
    }
    Ok(())
}

fn route_leaf(entity: &mut Entity, key: &str, value: &Value) -> Result<(), WireError> {
    let name = key.strip_prefix(RESERVED_MARKER).unwrap_or(key);

    let routed = match entity.resolve_field(name) {
        Some(spec) => coerce_in(spec, value)?,
        // Unknown keys go through verbatim; the router decides whether
        // an extension map takes them.
        None => FieldValue::from_json(value),
    };

    match entity.set(name, routed) {
        Ok(()) => Ok(()),
        // Names that resolve nowhere are dropped, never an error.
        Err(SchemaError::PropertyNotFound { .. }) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Apply the field's inbound coercion.
fn coerce_in(spec: &FieldSpec, value: &Value) -> Result<FieldValue, WireError> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }

    match spec.kind {
        FieldKind::Bool { wire, .. } => Ok(FieldValue::Bool(decode_bool(wire, value))),
        FieldKind::Timestamp => decode_timestamp(spec, value),
        FieldKind::Enum(desc) => match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(FieldValue::Enum(desc.instance_int(i)?)),
                None => Err(bad_value(spec, value)),
            },
            Value::String(s) => Ok(FieldValue::Enum(desc.instance_str(s)?)),
            _ => Err(bad_value(spec, value)),
        },
        FieldKind::TagMap => decode_tag_map(spec, value),
        _ => Ok(FieldValue::from_json(value)),
    }
}

/// The accepted truthy forms depend on the wire rendering: a literal
/// boolean decodes from JSON `true` or the string `"1"`; an integer
/// flag additionally decodes from the number `1`. Everything else is
/// false.
fn decode_bool(wire: BoolWire, value: &Value) -> bool {
    match (wire, value) {
        (_, Value::Bool(b)) => *b,
        (_, Value::String(s)) => s == "1",
        (BoolWire::Flag, Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn decode_timestamp(spec: &FieldSpec, value: &Value) -> Result<FieldValue, WireError> {
    let text = value.as_str().ok_or_else(|| bad_value(spec, value))?;
    // The server emits a trailing Z; normalize to an explicit offset.
    let normalized = match text.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => text.to_string(),
    };
    chrono::DateTime::parse_from_rfc3339(&normalized)
        .map(FieldValue::Timestamp)
        .map_err(|_| bad_value(spec, value))
}

/// Tag maps arrive as an embedded encoded string; a bare object is
/// accepted too.
fn decode_tag_map(spec: &FieldSpec, value: &Value) -> Result<FieldValue, WireError> {
    let parsed;
    let object = match value {
        Value::String(s) => {
            parsed = serde_json::from_str::<Value>(s).map_err(|_| bad_value(spec, value))?;
            match parsed.as_object() {
                Some(map) => map,
                None => return Err(bad_value(spec, value)),
            }
        }
        Value::Object(map) => map,
        _ => return Err(bad_value(spec, value)),
    };
    Ok(FieldValue::Map(
        object
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect(),
    ))
}

fn bad_value(spec: &FieldSpec, value: &Value) -> WireError {
    WireError::DecodeFailure(format!(
        "could not read {} field '{}' from {value}",
        spec.kind.expected(),
        spec.name
    ))
}
