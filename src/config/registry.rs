//! Field metadata registry.
//!
//! # Responsibilities
//! - Map canonical external keys (`maxclients`, `appendonly`) to typed fields
//! - Carry per-field kind and runtime mutability
//! - Coerce raw strings into field values and render them back
//! - Flatten a record into a `PropertiesMap` snapshot
//!
//! # Design Decisions
//! - Static facts (key, kind, mutability) live in `PropertyField`; binding to a
//!   record instance happens per call through plain `fn` accessors
//! - Fields without a canonical key never get an entry (internal-only)
//! - Registry order is declaration order; snapshots preserve it

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Value kinds a configurable setting can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    String,
    Integer,
    Boolean,
    StringList,
}

impl PropertyKind {
    /// Noun phrase used in coercion error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            PropertyKind::String => "a string",
            PropertyKind::Integer => "an integer",
            PropertyKind::Boolean => "a bool",
            PropertyKind::StringList => "a list",
        }
    }
}

/// A raw value could not be converted into the field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("argument couldn't be parsed into {}", .expected.describe())]
pub struct CoerceError {
    /// Kind the field expects.
    pub expected: PropertyKind,
    /// The rejected input.
    pub input: String,
}

impl CoerceError {
    fn new(expected: PropertyKind, input: &str) -> Self {
        Self {
            expected,
            input: input.to_string(),
        }
    }
}

/// Rust types usable as configurable field values.
pub trait PropertyType: Sized {
    const KIND: PropertyKind;

    /// Parse a raw config/command value.
    fn coerce(raw: &str) -> Result<Self, CoerceError>;

    /// Display form used by snapshots and `CONFIG GET`.
    fn render(&self) -> String;
}

impl PropertyType for String {
    const KIND: PropertyKind = PropertyKind::String;

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl PropertyType for i64 {
    const KIND: PropertyKind = PropertyKind::Integer;

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        raw.parse::<i64>()
            .map_err(|_| CoerceError::new(Self::KIND, raw))
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl PropertyType for bool {
    const KIND: PropertyKind = PropertyKind::Boolean;

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        if raw.eq_ignore_ascii_case("yes") {
            Ok(true)
        } else if raw.eq_ignore_ascii_case("no") {
            Ok(false)
        } else {
            Err(CoerceError::new(Self::KIND, raw))
        }
    }

    fn render(&self) -> String {
        let text = if *self { "yes" } else { "no" };
        text.to_string()
    }
}

impl PropertyType for Vec<String> {
    const KIND: PropertyKind = PropertyKind::StringList;

    fn coerce(raw: &str) -> Result<Self, CoerceError> {
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect())
    }

    fn render(&self) -> String {
        self.join(",")
    }
}

/// Metadata for one configurable setting of a record type `T`.
pub struct PropertyField<T> {
    /// Canonical external key.
    pub key: &'static str,
    pub kind: PropertyKind,
    /// Whether `CONFIG SET` may change the value after startup.
    pub mutable: bool,
    render: fn(&T) -> String,
    assign: fn(&mut T, &str) -> Result<(), CoerceError>,
}

impl<T> PropertyField<T> {
    pub const fn new(
        key: &'static str,
        kind: PropertyKind,
        mutable: bool,
        render: fn(&T) -> String,
        assign: fn(&mut T, &str) -> Result<(), CoerceError>,
    ) -> Self {
        Self {
            key,
            kind,
            mutable,
            render,
            assign,
        }
    }

    /// Render this field of `record` as a string.
    pub fn render(&self, record: &T) -> String {
        (self.render)(record)
    }

    /// Coerce `raw` and store it into this field of `record`.
    ///
    /// On error `record` is left untouched.
    pub fn assign(&self, record: &mut T, raw: &str) -> Result<(), CoerceError> {
        (self.assign)(record, raw)
    }
}

impl<T> fmt::Debug for PropertyField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyField")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("mutable", &self.mutable)
            .finish()
    }
}

/// A properties record whose settings are described by a static field table.
pub trait Properties: Clone + Send + Sync + 'static {
    /// Keyed fields in declaration order.
    fn fields() -> &'static [PropertyField<Self>];
}

/// Lookup views over a record type's field table.
pub struct Registry<T: 'static> {
    fields: &'static [PropertyField<T>],
    by_key: HashMap<&'static str, &'static PropertyField<T>>,
}

impl<T: Properties> Registry<T> {
    /// Build the registry for `T` from its declared fields.
    pub fn new() -> Self {
        let fields = T::fields();
        let by_key: HashMap<_, _> = fields.iter().map(|field| (field.key, field)).collect();
        debug_assert_eq!(by_key.len(), fields.len(), "duplicate canonical key");

        Self { fields, by_key }
    }
}

impl<T: Properties> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Registry<T> {
    /// All keyed fields, in declaration order.
    pub fn fields(&self) -> &'static [PropertyField<T>] {
        self.fields
    }

    /// Resolve a canonical key.
    pub fn get(&self, key: &str) -> Option<&'static PropertyField<T>> {
        self.by_key.get(key).copied()
    }

    /// Whether `key` exists and may be changed at runtime.
    pub fn is_mutable(&self, key: &str) -> bool {
        self.get(key).map(|field| field.mutable).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten `record` into its string-keyed view.
    pub fn snapshot(&self, record: &T) -> PropertiesMap {
        PropertiesMap {
            entries: self
                .fields
                .iter()
                .map(|field| (field.key, field.render(record)))
                .collect(),
        }
    }
}

impl<T: 'static> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|field| field.key))
            .finish()
    }
}

/// Stringified snapshot of a record: `canonical key -> display value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesMap {
    entries: Vec<(&'static str, String)>,
}

impl PropertiesMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for PropertiesMap {
    type Output = str;

    fn index(&self, key: &str) -> &str {
        match self.get(key) {
            Some(value) => value,
            None => panic!("no property named '{}'", key),
        }
    }
}

impl Serialize for PropertiesMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
