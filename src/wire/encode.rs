//! wire::encode
//!
//! Entity-to-payload serialization.

use serde_json::{Map, Value};

use crate::schema::value::TIMESTAMP_FORMAT;
use crate::schema::{BoolWire, Entity, ExtensionPolicy, FieldKind, FieldSpec, FieldValue};

use super::RESERVED_MARKER;

/// Which emission policy to apply.
///
/// Request bodies keep empty/absent values; URL building strips them
/// for brevity. The asymmetry is deliberate and preserved per call
/// site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Destined for an API request body: absent fields emit `null`.
    Body,
    /// Destined for building a navigable URL: empty/falsy values are
    /// stripped.
    Url,
}

/// Serialize an entity graph into a wire payload.
///
/// Fields emit in schema order under their translated wire keys.
/// Delegate entities encode recursively and merge flat into the same
/// payload level, except across a declared nesting boundary, which
/// produces one nested object instead.
pub fn encode(entity: &Entity, mode: EncodeMode) -> Value {
    let mut out = Map::new();
    encode_into(entity, "", &mut out, mode);
    Value::Object(out)
}

fn encode_into(entity: &Entity, prefix: &str, out: &mut Map<String, Value>, mode: EncodeMode) {
    for (spec, slot) in entity.slots() {
        if !spec.outbound {
            continue;
        }
        let raw = coerce_out(spec, slot);
        match mode {
            EncodeMode::Body => {
                // Tag maps are the one field that is omitted rather
                // than nulled when empty.
                if raw.is_none() && matches!(spec.kind, FieldKind::TagMap) {
                    continue;
                }
                out.insert(wire_key(spec, prefix), raw.unwrap_or(Value::Null));
            }
            EncodeMode::Url => {
                if let Some(value) = raw.filter(|v| !is_empty_for_url(v)) {
                    out.insert(wire_key(spec, prefix), value);
                }
            }
        }
    }

    for (delegate_spec, delegate) in entity.delegate_entities() {
        match delegate_spec.nest_key {
            Some(nest_key) => {
                let nested = encode(delegate, mode);
                if mode == EncodeMode::Url && is_empty_for_url(&nested) {
                    continue;
                }
                out.insert(nest_key.to_string(), nested);
            }
            None => {
                let joined;
                let child_prefix = match delegate_spec.prefix {
                    Some(p) => {
                        joined = format!("{prefix}{p}");
                        joined.as_str()
                    }
                    None => prefix,
                };
                encode_into(delegate, child_prefix, out, mode);
            }
        }
    }

    if entity.schema().extension == ExtensionPolicy::Accept {
        for (key, value) in entity.extension() {
            let raw = value.to_json();
            if mode == EncodeMode::Url && is_empty_for_url(&raw) {
                continue;
            }
            // Custom fields go out verbatim and unprefixed.
            out.insert(key.clone(), raw);
        }
    }
}

/// Translate a field name to its wire key: reserved marker plus joined
/// delegate prefixes plus the field name.
fn wire_key(spec: &FieldSpec, prefix: &str) -> String {
    if spec.reserved {
        format!("{RESERVED_MARKER}{prefix}{}", spec.name)
    } else {
        format!("{prefix}{}", spec.name)
    }
}

/// Apply the field's outbound coercion. `None` means absent.
fn coerce_out(spec: &FieldSpec, slot: Option<&FieldValue>) -> Option<Value> {
    match spec.kind {
        FieldKind::Bool { absent, wire } => {
            // Tri-state intent collapses to a definite boolean.
            let definite = match slot {
                Some(FieldValue::Bool(b)) => *b,
                _ => absent,
            };
            Some(match wire {
                BoolWire::Literal => Value::Bool(definite),
                BoolWire::Flag => Value::from(i64::from(definite)),
            })
        }
        FieldKind::Timestamp => slot.and_then(FieldValue::as_timestamp).map(|t| {
            Value::String(t.format(TIMESTAMP_FORMAT).to_string())
        }),
        FieldKind::TagMap => match slot {
            Some(FieldValue::Map(entries)) if !entries.is_empty() => {
                let object: Map<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                Some(Value::String(Value::Object(object).to_string()))
            }
            _ => None,
        },
        _ => slot.map(FieldValue::to_json),
    }
}

/// The empty/falsy contour applied by URL-building emission: `null`,
/// `false`, zero, the empty string, `"0"`, and empty collections are
/// all stripped.
fn is_empty_for_url(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DelegateSpec, Schema};
    use serde_json::json;

    static CARD: Schema = Schema::new(
        "Card",
        &[
            FieldSpec::str("title").reserved(),
            FieldSpec::int("width").reserved(),
        ],
    );

    static BODY: Schema = Schema::new(
        "Body",
        &[
            FieldSpec::bool("active", false).reserved(),
            FieldSpec::bool("visible", true).reserved(),
            FieldSpec::flag("enabled", true),
            FieldSpec::str("note").reserved(),
            FieldSpec::tag_map("meta").reserved(),
            FieldSpec::str_list("labels"),
            FieldSpec::timestamp("seen_at").inbound_only(),
        ],
    )
    .delegates(&[DelegateSpec {
        prefix: Some("card_"),
        nest_key: None,
        schema: &CARD,
    }])
    .accept_extension();

    static TOP: Schema = Schema::new("Top", &[FieldSpec::str("channel")]).delegates(&[
        DelegateSpec {
            prefix: None,
            nest_key: Some("data"),
            schema: &BODY,
        },
    ]);

    mod body_mode {
        use super::*;

        #[test]
        fn absent_booleans_collapse_per_field() {
            let entity = Entity::new(&BODY);
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["$active"], json!(false));
            assert_eq!(payload["$visible"], json!(true));
            assert_eq!(payload["enabled"], json!(1));
        }

        #[test]
        fn absent_scalars_emit_null() {
            let entity = Entity::new(&BODY);
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["$note"], Value::Null);
        }

        #[test]
        fn empty_tag_map_is_omitted() {
            let entity = Entity::new(&BODY);
            let payload = encode(&entity, EncodeMode::Body);
            assert!(payload.get("$meta").is_none());
        }

        #[test]
        fn tag_map_serializes_as_embedded_string() {
            let mut entity = Entity::new(&BODY);
            entity
                .set(
                    "meta",
                    FieldValue::Map(vec![("robots".to_string(), FieldValue::from("noindex"))]),
                )
                .unwrap();
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["$meta"], json!(r#"{"robots":"noindex"}"#));
        }

        #[test]
        fn delegate_keys_merge_flat_with_prefix() {
            let mut entity = Entity::new(&BODY);
            entity.set("card_title", FieldValue::from("hi")).unwrap();
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["$card_title"], json!("hi"));
        }

        #[test]
        fn nesting_boundary_produces_one_object() {
            let mut entity = Entity::new(&TOP);
            entity.set("channel", FieldValue::from("email")).unwrap();
            entity.set("note", FieldValue::from("x")).unwrap();
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["channel"], json!("email"));
            assert_eq!(payload["data"]["$note"], json!("x"));
        }

        #[test]
        fn extension_entries_emit_verbatim() {
            let mut entity = Entity::new(&BODY);
            entity.set("campaign_id", FieldValue::from("xyz")).unwrap();
            let payload = encode(&entity, EncodeMode::Body);
            assert_eq!(payload["campaign_id"], json!("xyz"));
        }

        #[test]
        fn inbound_only_fields_are_skipped() {
            let entity = Entity::new(&BODY);
            let payload = encode(&entity, EncodeMode::Body);
            assert!(payload.get("seen_at").is_none());
        }
    }

    mod url_mode {
        use super::*;

        #[test]
        fn strips_empty_and_falsy_values() {
            let mut entity = Entity::new(&BODY);
            entity.set("note", FieldValue::from("")).unwrap();
            let payload = encode(&entity, EncodeMode::Url);
            let object = payload.as_object().unwrap();
            // Only the booleans that collapse to a truthy value survive.
            assert!(object.get("$active").is_none());
            assert!(object.get("$note").is_none());
            assert!(object.get("labels").is_none());
            assert_eq!(object.len(), 2, "got {object:?}");
            assert_eq!(payload["$visible"], json!(true));
            assert_eq!(payload["enabled"], json!(1));
        }

        #[test]
        fn keeps_set_values() {
            let mut entity = Entity::new(&BODY);
            entity.set("active", FieldValue::from(true)).unwrap();
            entity.set("note", FieldValue::from("x")).unwrap();
            let payload = encode(&entity, EncodeMode::Url);
            assert_eq!(payload["$active"], json!(true));
            assert_eq!(payload["$note"], json!("x"));
        }

        #[test]
        fn empty_nested_block_is_dropped() {
            let entity = Entity::new(&TOP);
            let payload = encode(&entity, EncodeMode::Url);
            assert!(payload.get("data").is_none());
        }
    }
}
