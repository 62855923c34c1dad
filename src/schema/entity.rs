//! schema::entity
//!
//! The attribute router: a live attribute bag resolving names across a
//! delegation chain.
//!
//! # Resolution Order
//!
//! For `get`, `set`, and `invoke`, a name is resolved in this fixed
//! order:
//!
//! 1. a declared local setter (fan-out) or field, including setter side
//!    effects;
//! 2. a declared local appender for a collection field;
//! 3. a delegation edge whose namespace prefix matches the name: strip
//!    the prefix and forward (transitive); an unscoped edge forwards
//!    the name whole and falls through on a miss;
//! 4. the entity-level extension map, only where the schema opts in;
//! 5. otherwise `PropertyNotFound` / `MethodNotFound`.
//!
//! Resolution is total: a name resolves to exactly one owner or fails
//! explicitly.
//!
//! # Example
//!
//! ```
//! use branchlink::link::LINK_SCHEMA;
//! use branchlink::schema::{Entity, FieldValue};
//!
//! let mut link = Entity::new(&LINK_SCHEMA);
//!
//! // Local field.
//! link.set("channel", FieldValue::from("email")).unwrap();
//!
//! // Two delegation hops deep: link -> link data -> open graph.
//! link.set("og_title", FieldValue::from("My title")).unwrap();
//! assert_eq!(link.get("og_title").unwrap().as_str(), Some("My title"));
//!
//! // Unknown names fail explicitly.
//! assert!(link.get("missing").is_err());
//! ```

use crate::schema::value::FieldValue;
use crate::schema::{
    DelegateSpec, ExtensionPolicy, FieldEffect, FieldKind, FieldSpec, Schema, SchemaError,
};

/// The mandatory SMS substitution token, canonical spelling.
const LINK_TOKEN: &str = "{{ link }}";

/// A live attribute bag for one schema.
///
/// Slots are ordered as the schema declares its fields; delegate
/// entities are constructed eagerly so the delegation tree is fixed for
/// the entity's lifetime.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: &'static Schema,
    slots: Vec<Option<FieldValue>>,
    delegates: Vec<Entity>,
    extension: Vec<(String, FieldValue)>,
}

impl PartialEq for Entity {
    /// Schemas are compared by identity; there is one static instance
    /// per entity type.
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.slots == other.slots
            && self.delegates == other.delegates
            && self.extension == other.extension
    }
}

impl Entity {
    /// Construct an empty entity, applying construction-time defaults:
    /// collection fields start empty and declared enum defaults are
    /// seeded. Defaults apply only here; decode overrides them.
    pub fn new(schema: &'static Schema) -> Self {
        let slots = schema
            .fields
            .iter()
            .map(|f| match f.kind {
                FieldKind::StrList => Some(FieldValue::List(Vec::new())),
                FieldKind::TagMap => Some(FieldValue::Map(Vec::new())),
                FieldKind::Enum(desc) => f
                    .default_const
                    .and_then(|name| desc.by_name(name))
                    .map(FieldValue::Enum),
                _ => None,
            })
            .collect();

        let delegates = schema
            .delegates
            .iter()
            .map(|d| Entity::new(d.schema))
            .collect();

        Self {
            schema,
            slots,
            delegates,
            extension: Vec::new(),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Declared fields paired with their current slot values, in schema
    /// order. Used by the wire codec.
    pub(crate) fn slots<'a>(
        &'a self,
    ) -> impl Iterator<Item = (&'static FieldSpec, Option<&'a FieldValue>)> + 'a {
        self.schema
            .fields
            .iter()
            .zip(self.slots.iter())
            .map(|(spec, slot)| (spec, slot.as_ref()))
    }

    /// Delegation edges paired with their live delegate entities.
    pub(crate) fn delegate_entities<'a>(
        &'a self,
    ) -> impl Iterator<Item = (&'static DelegateSpec, &'a Entity)> + 'a {
        self.schema.delegates.iter().zip(self.delegates.iter())
    }

    /// Extension entries in insertion order.
    pub(crate) fn extension(&self) -> &[(String, FieldValue)] {
        &self.extension
    }

    /// Resolve a name to its declared field spec anywhere in the
    /// delegation chain, without touching values. Used by decode to
    /// select reverse coercions.
    pub(crate) fn resolve_field(&self, name: &str) -> Option<&'static FieldSpec> {
        if let Some(idx) = self.schema.field_index(name) {
            return Some(&self.schema.fields[idx]);
        }
        for (spec, delegate) in self.delegate_entities() {
            match spec.prefix {
                Some(prefix) => {
                    if let Some(rest) = name.strip_prefix(prefix) {
                        return delegate.resolve_field(rest);
                    }
                }
                None => {
                    if let Some(found) = delegate.resolve_field(name) {
                        return Some(found);
                    }
                }
            }
        }
        None
    }

    /// Whether a direct delegation edge nests its payload under `key`.
    pub(crate) fn has_nest_boundary(&self, key: &str) -> bool {
        self.schema.delegates.iter().any(|d| d.nest_key == Some(key))
    }

    /// Read a field by name through the delegation chain.
    ///
    /// Unset fields read as [`FieldValue::Null`].
    ///
    /// # Errors
    ///
    /// `SchemaError::PropertyNotFound` when the name resolves nowhere.
    pub fn get(&self, name: &str) -> Result<FieldValue, SchemaError> {
        if let Some(idx) = self.schema.field_index(name) {
            return Ok(self.slots[idx].clone().unwrap_or(FieldValue::Null));
        }

        for (spec, delegate) in self.schema.delegates.iter().zip(self.delegates.iter()) {
            match spec.prefix {
                Some(prefix) => {
                    if let Some(rest) = name.strip_prefix(prefix) {
                        return delegate.get(rest);
                    }
                }
                None => match delegate.get(name) {
                    Ok(value) => return Ok(value),
                    Err(SchemaError::PropertyNotFound { .. }) => {}
                    Err(err) => return Err(err),
                },
            }
        }

        if self.schema.extension == ExtensionPolicy::Accept {
            if let Some((_, value)) = self.extension.iter().find(|(k, _)| k == name) {
                return Ok(value.clone());
            }
        }

        Err(SchemaError::PropertyNotFound {
            entity: self.schema.name,
            name: name.to_string(),
        })
    }

    /// Write a field by name through the delegation chain.
    ///
    /// Setter side effects apply here: fan-out setters write several
    /// fields, and declared field effects rewrite the value before it
    /// is stored. A value produced for a collection appender name
    /// appends instead of replacing.
    ///
    /// # Errors
    ///
    /// - `SchemaError::TypeMismatch` when the value fails the field's
    ///   declared type check
    /// - `SchemaError::PropertyNotFound` when the name resolves nowhere
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), SchemaError> {
        if let Some(fan_out) = self.schema.fan_outs.iter().find(|f| f.name == name) {
            for target in fan_out.targets {
                self.set(target, value.clone())?;
            }
            return Ok(());
        }

        if let Some(idx) = self.schema.field_index(name) {
            return self.store(idx, value);
        }

        if let Some(idx) = self
            .schema
            .fields
            .iter()
            .position(|f| f.appender == Some(name))
        {
            return self.append(idx, value);
        }

        for (spec, delegate) in self.schema.delegates.iter().zip(self.delegates.iter_mut()) {
            match spec.prefix {
                Some(prefix) => {
                    if let Some(rest) = name.strip_prefix(prefix) {
                        return delegate.set(rest, value);
                    }
                }
                // Unscoped edges are a fallback; a miss there falls
                // through to the extension map.
                None => match delegate.set(name, value.clone()) {
                    Ok(()) => return Ok(()),
                    Err(SchemaError::PropertyNotFound { .. }) => {}
                    Err(err) => return Err(err),
                },
            }
        }

        if self.schema.extension == ExtensionPolicy::Accept {
            match self.extension.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value,
                None => self.extension.push((name.to_string(), value)),
            }
            return Ok(());
        }

        Err(SchemaError::PropertyNotFound {
            entity: self.schema.name,
            name: name.to_string(),
        })
    }

    /// Write an entry straight into the extension map, bypassing name
    /// resolution. The entry is stored verbatim even when the name
    /// collides with a declared field or a delegation prefix; schemas
    /// that deny extension data forward through their unscoped edges.
    ///
    /// # Errors
    ///
    /// `SchemaError::PropertyNotFound` when no schema reachable through
    /// unscoped edges accepts extension data.
    pub fn put_extension(&mut self, name: &str, value: FieldValue) -> Result<(), SchemaError> {
        if self.schema.extension == ExtensionPolicy::Accept {
            match self.extension.iter_mut().find(|(k, _)| k == name) {
                Some(entry) => entry.1 = value,
                None => self.extension.push((name.to_string(), value)),
            }
            return Ok(());
        }

        for (spec, delegate) in self.schema.delegates.iter().zip(self.delegates.iter_mut()) {
            if spec.prefix.is_none() {
                match delegate.put_extension(name, value.clone()) {
                    Ok(()) => return Ok(()),
                    Err(SchemaError::PropertyNotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        Err(SchemaError::PropertyNotFound {
            entity: self.schema.name,
            name: name.to_string(),
        })
    }

    /// Invoke a named operation: `set_<name>` routes to a setter (the
    /// multi-value setters accept several positional arguments),
    /// `add_<name>` routes to a collection appender.
    ///
    /// # Errors
    ///
    /// `SchemaError::MethodNotFound` when no operation matches anywhere
    /// in the delegation chain.
    pub fn invoke(&mut self, name: &str, args: Vec<FieldValue>) -> Result<(), SchemaError> {
        if let Some(target) = name.strip_prefix("set_") {
            return self.invoke_set(name, target, args);
        }
        if let Some(target) = name.strip_prefix("add_") {
            return self.invoke_add(name, target, args);
        }
        Err(self.method_not_found(name))
    }

    fn invoke_set(
        &mut self,
        method: &str,
        target: &str,
        args: Vec<FieldValue>,
    ) -> Result<(), SchemaError> {
        if let Some(multi) = self.schema.multi_setters.iter().find(|m| m.name == target) {
            for (pos, field) in multi.fields.iter().enumerate() {
                let value = args.get(pos).cloned().unwrap_or(FieldValue::Null);
                self.set(field, value)?;
            }
            return Ok(());
        }

        let is_local = self.schema.fan_outs.iter().any(|f| f.name == target)
            || self.schema.field_index(target).is_some();
        if is_local {
            if args.len() != 1 {
                return Err(self.method_not_found(method));
            }
            let mut args = args;
            return self.set(target, args.remove(0));
        }

        for (spec, delegate) in self.schema.delegates.iter().zip(self.delegates.iter_mut()) {
            match spec.prefix {
                Some(prefix) => {
                    if let Some(rest) = target.strip_prefix(prefix) {
                        let forwarded = format!("set_{rest}");
                        return delegate.invoke(&forwarded, args);
                    }
                }
                None => match delegate.invoke_set(method, target, args.clone()) {
                    Ok(()) => return Ok(()),
                    Err(SchemaError::MethodNotFound { .. }) => {}
                    Err(err) => return Err(err),
                },
            }
        }

        Err(self.method_not_found(method))
    }

    fn invoke_add(
        &mut self,
        method: &str,
        target: &str,
        args: Vec<FieldValue>,
    ) -> Result<(), SchemaError> {
        if let Some(idx) = self
            .schema
            .fields
            .iter()
            .position(|f| f.appender == Some(target))
        {
            let value = match self.schema.fields[idx].kind {
                FieldKind::TagMap => {
                    // Tag-map appenders take a (name, value) pair.
                    let mut args = args;
                    if args.len() != 2 {
                        return Err(self.method_not_found(method));
                    }
                    let entry_value = args.remove(1);
                    match args.remove(0) {
                        FieldValue::Str(key) => FieldValue::Map(vec![(key, entry_value)]),
                        _ => {
                            return Err(SchemaError::TypeMismatch {
                                entity: self.schema.name,
                                field: self.schema.fields[idx].name,
                                expected: "string key",
                            })
                        }
                    }
                }
                _ => {
                    let mut args = args;
                    if args.len() != 1 {
                        return Err(self.method_not_found(method));
                    }
                    args.remove(0)
                }
            };
            return self.append(idx, value);
        }

        for (spec, delegate) in self.schema.delegates.iter().zip(self.delegates.iter_mut()) {
            match spec.prefix {
                Some(prefix) => {
                    if let Some(rest) = target.strip_prefix(prefix) {
                        let forwarded = format!("add_{rest}");
                        return delegate.invoke(&forwarded, args);
                    }
                }
                None => match delegate.invoke_add(method, target, args.clone()) {
                    Ok(()) => return Ok(()),
                    Err(SchemaError::MethodNotFound { .. }) => {}
                    Err(err) => return Err(err),
                },
            }
        }

        Err(self.method_not_found(method))
    }

    /// Store into a local slot, enforcing the type check and applying
    /// the field's declared effect.
    fn store(&mut self, idx: usize, value: FieldValue) -> Result<(), SchemaError> {
        let spec = &self.schema.fields[idx];

        if !spec.kind.accepts(&value) {
            return Err(SchemaError::TypeMismatch {
                entity: self.schema.name,
                field: spec.name,
                expected: spec.kind.expected(),
            });
        }

        let value = match (spec.effect, value) {
            (Some(FieldEffect::EnsureLinkToken), FieldValue::Str(text)) => {
                FieldValue::Str(ensure_link_token(text))
            }
            (_, value) => value,
        };

        self.slots[idx] = match value {
            FieldValue::Null => None,
            value => Some(value),
        };
        Ok(())
    }

    /// Append one item (or one batch of tag-map entries) to a
    /// collection slot.
    fn append(&mut self, idx: usize, value: FieldValue) -> Result<(), SchemaError> {
        let spec = &self.schema.fields[idx];
        let mismatch = || SchemaError::TypeMismatch {
            entity: self.schema.name,
            field: spec.name,
            expected: spec.kind.expected(),
        };

        match spec.kind {
            FieldKind::StrList => {
                let item = match value {
                    FieldValue::Str(s) => FieldValue::Str(s),
                    _ => return Err(mismatch()),
                };
                match self.slots[idx].get_or_insert(FieldValue::List(Vec::new())) {
                    FieldValue::List(items) => items.push(item),
                    _ => return Err(mismatch()),
                }
            }
            FieldKind::TagMap => {
                let entries = match value {
                    FieldValue::Map(entries) => entries,
                    _ => return Err(mismatch()),
                };
                match self.slots[idx].get_or_insert(FieldValue::Map(Vec::new())) {
                    FieldValue::Map(existing) => {
                        for (key, entry) in entries {
                            match existing.iter_mut().find(|(k, _)| *k == key) {
                                Some(slot) => slot.1 = entry,
                                None => existing.push((key, entry)),
                            }
                        }
                    }
                    _ => return Err(mismatch()),
                }
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    fn method_not_found(&self, name: &str) -> SchemaError {
        SchemaError::MethodNotFound {
            entity: self.schema.name,
            name: name.to_string(),
        }
    }
}

/// Append the mandatory substitution token unless the text already
/// carries it (with or without inner spacing). Empty text is left
/// untouched.
fn ensure_link_token(text: String) -> String {
    if text.is_empty() || text.contains("{{link}}") || text.contains(LINK_TOKEN) {
        text
    } else {
        format!("{text} {LINK_TOKEN}")
    }
}
