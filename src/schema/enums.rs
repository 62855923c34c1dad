//! schema::enums
//!
//! Flyweight enum constants with identity-stable instances.
//!
//! # Design
//!
//! Each enumerated type is a fixed, compile-time name/value table
//! ([`EnumDescriptor`]). Looking a value up returns a `&'static`
//! reference into that table, so the canonical instance for a given
//! `(type, value)` pair is the same object on every call and equality
//! checks across the system may use pointer identity.
//!
//! The tables are immutable statics built at compile time; there is no
//! lazy per-type cache to populate and therefore no first-use race
//! between concurrent callers.
//!
//! # Example
//!
//! ```
//! use branchlink::app::APP_TYPE;
//! use branchlink::schema::enums::EnumScalar;
//!
//! let store = APP_TYPE.instance(EnumScalar::Int(1)).unwrap();
//! assert_eq!(store.name(), "STORE");
//!
//! // Repeated lookups return the same object.
//! let again = APP_TYPE.instance(EnumScalar::Int(1)).unwrap();
//! assert!(std::ptr::eq(store, again));
//!
//! // Values outside the declared set fail.
//! assert!(APP_TYPE.instance(EnumScalar::Int(9)).is_err());
//! ```

use std::fmt;

use thiserror::Error;

/// Errors from enum lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnumError {
    #[error("{value} is not a valid {enum_name}")]
    InvalidValue { enum_name: &'static str, value: String },
}

/// The underlying scalar of an enum constant.
///
/// Matching is strict: an integer never equals a string, even when the
/// string spells the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumScalar {
    Int(i64),
    Str(&'static str),
}

impl fmt::Display for EnumScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumScalar::Int(v) => write!(f, "{v}"),
            EnumScalar::Str(v) => write!(f, "{v}"),
        }
    }
}

/// One named constant of an enumerated type.
///
/// Instances live inside their type's [`EnumDescriptor`] table and are
/// only ever handed out as `&'static` references.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumValue {
    owner: &'static str,
    name: &'static str,
    value: EnumScalar,
}

impl EnumValue {
    /// Declare a constant row. Used by the [`declare_enum!`] table macro.
    #[doc(hidden)]
    pub const fn declare(owner: &'static str, name: &'static str, value: EnumScalar) -> Self {
        Self { owner, name, value }
    }

    /// Name of the enumerated type this constant belongs to.
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Constant name, e.g. `"STORE"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying wire value.
    pub fn value(&self) -> EnumScalar {
        self.value
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// A fixed name/value table describing one enumerated type.
pub struct EnumDescriptor {
    name: &'static str,
    constants: &'static [EnumValue],
}

impl EnumDescriptor {
    /// Build a descriptor over a static constant table.
    pub const fn new(name: &'static str, constants: &'static [EnumValue]) -> Self {
        Self { name, constants }
    }

    /// Name of the enumerated type, e.g. `"AppType"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All declared constants, in declaration order.
    pub fn constants(&'static self) -> &'static [EnumValue] {
        self.constants
    }

    /// Get the canonical instance for a constant value.
    ///
    /// The table is scanned in declaration order and the first constant
    /// whose value matches under strict equality wins. Behavior when two
    /// constants share a value is inherited from the declaration order;
    /// no other tie-break is defined.
    ///
    /// # Errors
    ///
    /// Returns [`EnumError::InvalidValue`] if no declared constant
    /// matches `value`.
    pub fn instance(&'static self, value: EnumScalar) -> Result<&'static EnumValue, EnumError> {
        self.constants
            .iter()
            .find(|c| c.value == value)
            .ok_or(EnumError::InvalidValue {
                enum_name: self.name,
                value: value.to_string(),
            })
    }

    /// Look up the canonical instance for an integer wire value.
    pub fn instance_int(&'static self, value: i64) -> Result<&'static EnumValue, EnumError> {
        self.instance(EnumScalar::Int(value))
    }

    /// Look up the canonical instance for a string wire value.
    pub fn instance_str(&'static self, value: &str) -> Result<&'static EnumValue, EnumError> {
        self.constants
            .iter()
            .find(|c| matches!(c.value, EnumScalar::Str(s) if s == value))
            .ok_or_else(|| EnumError::InvalidValue {
                enum_name: self.name,
                value: value.to_string(),
            })
    }

    /// Get a constant by its declared name.
    pub fn by_name(&'static self, name: &str) -> Option<&'static EnumValue> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// Validate a constant name.
    ///
    /// `strict` requires an exact match; otherwise the comparison is
    /// ASCII-case-insensitive.
    pub fn is_valid(&'static self, name: &str, strict: bool) -> bool {
        if strict {
            self.by_name(name).is_some()
        } else {
            self.constants
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(name))
        }
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Declare an enumerated type as a static constant table.
///
/// ```
/// use branchlink::declare_enum;
/// use branchlink::schema::enums::{EnumDescriptor, EnumScalar};
///
/// static COLOR: EnumDescriptor = declare_enum!("Color" {
///     "RED" = EnumScalar::Str("red"),
///     "BLUE" = EnumScalar::Str("blue"),
/// });
///
/// assert!(COLOR.is_valid("RED", true));
/// ```
#[macro_export]
macro_rules! declare_enum {
    ($owner:literal { $($name:literal = $value:expr),+ $(,)? }) => {
        $crate::schema::enums::EnumDescriptor::new(
            $owner,
            &[$($crate::schema::enums::EnumValue::declare($owner, $name, $value)),+],
        )
    };
}
