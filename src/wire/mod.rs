//! wire
//!
//! The bidirectional codec between typed entities and wire payloads.
//!
//! # Overview
//!
//! [`encode`] serializes an entity graph into a nested string-keyed
//! payload, translating field names to wire keys (reserved platform
//! fields gain the `$` marker, delegate prefixes are joined in) and
//! applying per-field coercions. [`decode`] reconstructs an equivalent
//! entity graph from an inbound payload by routing every leaf back
//! through the attribute router with the reverse coercion selected by
//! the original wire key.
//!
//! # Emission Policies
//!
//! Two divergent policies exist per call site and are deliberately not
//! normalized away:
//!
//! - [`EncodeMode::Body`]: payloads destined for an API request body
//!   keep empty/absent values (as `null`)
//! - [`EncodeMode::Url`]: payloads destined for building a navigable
//!   URL strip all empty/falsy values before serialization
//!
//! # Round Trips
//!
//! `encode(decode(encode(e)))` equals `encode(e)` for every field whose
//! coercion is a bijection; timestamps may differ only within second
//! resolution.

mod decode;
mod encode;

pub use decode::{decode, decode_into};
pub use encode::{encode, EncodeMode};

use thiserror::Error;

use crate::schema::enums::EnumError;
use crate::schema::SchemaError;

/// The reserved-field marker distinguishing platform-defined fields
/// from caller-defined custom fields.
pub const RESERVED_MARKER: char = '$';

/// The reserved identity key, always ignored on decode.
pub const IDENTITY_KEY: &str = "~id";

/// Errors from the wire codec.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload is malformed or not a structured object.
    #[error("could not decode payload: {0}")]
    DecodeFailure(String),

    /// An enum-typed field carried a value outside the declared set.
    #[error(transparent)]
    Enum(#[from] EnumError),

    /// A routed value failed the target field's type check.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
