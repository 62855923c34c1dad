//! schema
//!
//! The typed attribute-bag mechanism shared by every wire object.
//!
//! # Overview
//!
//! A [`Schema`] is a static description of one entity: its ordered
//! fields, its delegation edges to nested entities, its side-effecting
//! setters, and whether it accepts arbitrary extension data. An
//! [`Entity`] is a live attribute bag for one schema; all reads and
//! writes go through its router (`get` / `set` / `invoke`), which
//! resolves a name to exactly one owner across the delegation chain or
//! fails explicitly.
//!
//! # Modules
//!
//! - [`enums`]: flyweight enum constants with identity-stable instances
//! - [`value`]: the dynamic [`FieldValue`] algebra
//! - `entity`: the attribute router itself

pub mod enums;
mod entity;
pub mod value;

pub use entity::Entity;
pub use value::FieldValue;

use thiserror::Error;

use enums::EnumDescriptor;

/// Errors from attribute routing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("property '{name}' does not exist on {entity}")]
    PropertyNotFound { entity: &'static str, name: String },

    #[error("method '{name}' does not exist on {entity}")]
    MethodNotFound { entity: &'static str, name: String },

    #[error("type mismatch for {entity}.{field}: expected {expected}")]
    TypeMismatch {
        entity: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

/// Whether an entity accepts arbitrary caller-supplied name/value pairs.
///
/// This is a deliberate per-entity behavioral difference: link data
/// accepts custom data, while the social-preview blocks and the app
/// configuration reject unknown names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionPolicy {
    Deny,
    Accept,
}

/// How a boolean field is rendered on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolWire {
    /// JSON `true` / `false`.
    Literal,
    /// Integer `1` / `0` flags.
    Flag,
}

/// Declared side effect applied when a field is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEffect {
    /// Append the mandatory `{{ link }}` substitution token to the text
    /// unless it is already present.
    EnsureLinkToken,
}

/// The declared type of a field, driving both routing type checks and
/// wire coercion.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Str,
    Int,
    /// Tri-state boolean: `absent` is the definite value emitted when
    /// the field was never set.
    Bool { absent: bool, wire: BoolWire },
    Timestamp,
    Enum(&'static EnumDescriptor),
    /// List of strings, populated by repeated single-item appends.
    StrList,
    /// String-keyed tag map, serialized as an embedded encoded string.
    TagMap,
}

impl FieldKind {
    /// Human-readable name of the expected type, used in errors.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Str => "string",
            FieldKind::Int => "integer",
            FieldKind::Bool { .. } => "boolean",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Enum(desc) => desc.name(),
            FieldKind::StrList => "list of strings",
            FieldKind::TagMap => "string-keyed map",
        }
    }

    /// Check a value against this kind. `Null` always passes (it clears
    /// the field).
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (_, FieldValue::Null) => true,
            (FieldKind::Str, FieldValue::Str(_)) => true,
            (FieldKind::Int, FieldValue::Int(_)) => true,
            (FieldKind::Bool { .. }, FieldValue::Bool(_)) => true,
            (FieldKind::Timestamp, FieldValue::Timestamp(_)) => true,
            (FieldKind::Enum(desc), FieldValue::Enum(v)) => v.owner() == desc.name(),
            (FieldKind::StrList, FieldValue::List(items)) => {
                items.iter().all(|i| matches!(i, FieldValue::Str(_)))
            }
            (FieldKind::TagMap, FieldValue::Map(_)) => true,
            _ => false,
        }
    }
}

/// Declaration of one named, typed field.
#[derive(Debug)]
pub struct FieldSpec {
    /// Field name in the field-naming convention (snake case).
    pub name: &'static str,
    pub kind: FieldKind,
    /// Reserved platform field: the wire key carries the `$` marker.
    pub reserved: bool,
    /// Emitted by encode. Inbound-only fields decode but never encode.
    pub outbound: bool,
    /// Singular name routed to a per-item append for collection fields.
    pub appender: Option<&'static str>,
    pub effect: Option<FieldEffect>,
    /// Enum constant (by name) seeded into the slot at construction.
    pub default_const: Option<&'static str>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            reserved: false,
            outbound: true,
            appender: None,
            effect: None,
            default_const: None,
        }
    }

    pub const fn str(name: &'static str) -> Self {
        Self::new(name, FieldKind::Str)
    }

    pub const fn int(name: &'static str) -> Self {
        Self::new(name, FieldKind::Int)
    }

    /// Boolean with JSON literal wire form.
    pub const fn bool(name: &'static str, absent: bool) -> Self {
        Self::new(
            name,
            FieldKind::Bool {
                absent,
                wire: BoolWire::Literal,
            },
        )
    }

    /// Boolean with `1`/`0` integer wire form.
    pub const fn flag(name: &'static str, absent: bool) -> Self {
        Self::new(
            name,
            FieldKind::Bool {
                absent,
                wire: BoolWire::Flag,
            },
        )
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn enumerated(name: &'static str, desc: &'static EnumDescriptor) -> Self {
        Self::new(name, FieldKind::Enum(desc))
    }

    pub const fn str_list(name: &'static str) -> Self {
        Self::new(name, FieldKind::StrList)
    }

    pub const fn tag_map(name: &'static str) -> Self {
        Self::new(name, FieldKind::TagMap)
    }

    pub const fn reserved(mut self) -> Self {
        self.reserved = true;
        self
    }

    pub const fn inbound_only(mut self) -> Self {
        self.outbound = false;
        self
    }

    pub const fn appender(mut self, singular: &'static str) -> Self {
        self.appender = Some(singular);
        self
    }

    pub const fn with_effect(mut self, effect: FieldEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub const fn default_const(mut self, name: &'static str) -> Self {
        self.default_const = Some(name);
        self
    }
}

/// A delegation edge from an owner entity to a nested delegate.
///
/// Edges are fixed at construction and compose into a tree. A scoped
/// edge owns all names sharing its prefix; an unscoped edge forwards
/// names whole as a fallback.
#[derive(Debug)]
pub struct DelegateSpec {
    /// Namespace prefix, e.g. `"og_"`. `None` forwards unchanged.
    pub prefix: Option<&'static str>,
    /// Encode boundary: nest the delegate's payload under this key
    /// instead of merging its keys flat.
    pub nest_key: Option<&'static str>,
    pub schema: &'static Schema,
}

/// A convenience setter that fans one write out to several fields.
#[derive(Debug)]
pub struct FanOutSpec {
    pub name: &'static str,
    pub targets: &'static [&'static str],
}

/// A setter accepting several positional values in one call, e.g. an
/// image URL with accompanying width and height.
#[derive(Debug)]
pub struct MultiSetterSpec {
    pub name: &'static str,
    /// Target fields in argument order; missing trailing arguments
    /// clear their targets.
    pub fields: &'static [&'static str],
}

/// Static description of one entity type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
    pub delegates: &'static [DelegateSpec],
    pub fan_outs: &'static [FanOutSpec],
    pub multi_setters: &'static [MultiSetterSpec],
    pub extension: ExtensionPolicy,
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self {
            name,
            fields,
            delegates: &[],
            fan_outs: &[],
            multi_setters: &[],
            extension: ExtensionPolicy::Deny,
        }
    }

    pub const fn delegates(mut self, delegates: &'static [DelegateSpec]) -> Self {
        self.delegates = delegates;
        self
    }

    pub const fn fan_outs(mut self, fan_outs: &'static [FanOutSpec]) -> Self {
        self.fan_outs = fan_outs;
        self
    }

    pub const fn multi_setters(mut self, multi_setters: &'static [MultiSetterSpec]) -> Self {
        self.multi_setters = multi_setters;
        self
    }

    pub const fn accept_extension(mut self) -> Self {
        self.extension = ExtensionPolicy::Accept;
        self
    }

    /// Position of a declared field by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
