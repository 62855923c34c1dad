//! link
//!
//! The deep link: creation parameters at the top level, the deep-link
//! data block nested under `data`.
//!
//! # Layout
//!
//! A [`Link`] owns the whole delegation tree: its own analytics and
//! control fields, an unscoped edge into the [`LinkData`] block (nested
//! under the `data` key on the wire), and through it the [`OpenGraph`]
//! and [`Twitter`] preview blocks. Any name can be addressed from the
//! top: `channel` stays local, `marketing_title` crosses one hop,
//! `og_title` crosses two.
//!
//! # Example
//!
//! ```
//! use branchlink::link::{Link, LINK_TYPE};
//!
//! let link = Link::new()
//!     .channel("email")
//!     .feature("sharing")
//!     .link_type(LINK_TYPE.by_name("MARKETING").unwrap())
//!     .marketing_title("Spring campaign")
//!     .add_tag("spring");
//!
//! let payload = link.build();
//! assert_eq!(payload["channel"], "email");
//! assert_eq!(payload["type"], 2);
//! assert_eq!(payload["data"]["$marketing_title"], "Spring campaign");
//! ```

mod data;
mod open_graph;
mod twitter;

pub use data::{LinkData, LINK_DATA_SCHEMA};
pub use open_graph::{OpenGraph, OG_TYPE, OPEN_GRAPH_SCHEMA};
pub use twitter::{Twitter, TWITTER_CARD, TWITTER_SCHEMA};

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::declare_enum;
use crate::schema::enums::{EnumDescriptor, EnumScalar, EnumValue};
use crate::schema::{DelegateSpec, Entity, FieldSpec, FieldValue, Schema, SchemaError};
use crate::wire::{self, EncodeMode, WireError};

/// Link generation modes.
pub static LINK_TYPE: EnumDescriptor = declare_enum!("LinkType" {
    "DEFAULT" = EnumScalar::Int(0),
    "ONE_TIME_USE" = EnumScalar::Int(1),
    "MARKETING" = EnumScalar::Int(2),
});

pub static LINK_SCHEMA: Schema = Schema::new(
    "Link",
    &[
        FieldSpec::str_list("tags").appender("tag"),
        FieldSpec::str("channel"),
        FieldSpec::str("feature"),
        FieldSpec::str("stage"),
        FieldSpec::str("alias"),
        FieldSpec::int("duration"),
        FieldSpec::enumerated("type", &LINK_TYPE),
    ],
)
.delegates(&[DelegateSpec {
    prefix: None,
    nest_key: Some("data"),
    schema: &LINK_DATA_SCHEMA,
}]);

/// A deep link under construction or decoded from the API.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    entity: Entity,
}

impl Link {
    pub fn new() -> Self {
        Self {
            entity: Entity::new(&LINK_SCHEMA),
        }
    }

    /// Reconstruct a link from an API response payload.
    ///
    /// The reserved identity key is ignored, declared fields get their
    /// reverse coercions (enum values resolve to canonical instances,
    /// timestamps parse, embedded tag-map strings decode), and unknown
    /// keys fall through to the custom-data map.
    ///
    /// # Errors
    ///
    /// [`WireError`] when the payload is not an object or a declared
    /// field carries an uninterpretable value.
    pub fn parse(payload: &Value) -> Result<Self, WireError> {
        Ok(Self {
            entity: wire::decode(&LINK_SCHEMA, payload)?,
        })
    }

    pub fn add_tag(self, tag: impl Into<String>) -> Self {
        self.set_known("tag", FieldValue::from(tag.into()))
    }

    pub fn channel(self, channel: impl Into<String>) -> Self {
        self.set_known("channel", FieldValue::from(channel.into()))
    }

    pub fn feature(self, feature: impl Into<String>) -> Self {
        self.set_known("feature", FieldValue::from(feature.into()))
    }

    pub fn stage(self, stage: impl Into<String>) -> Self {
        self.set_known("stage", FieldValue::from(stage.into()))
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        self.set_known("alias", FieldValue::from(alias.into()))
    }

    /// Click-match duration in seconds.
    pub fn duration(self, seconds: i64) -> Self {
        self.set_known("duration", FieldValue::from(seconds))
    }

    /// Set the generation mode to one of the [`LINK_TYPE`] constants.
    ///
    /// # Panics
    ///
    /// Panics when handed a constant from a different enumerated type.
    pub fn link_type(self, value: &'static EnumValue) -> Self {
        self.set_known("type", FieldValue::Enum(value))
    }

    // Conveniences crossing into the data block.

    pub fn marketing_title(self, title: impl Into<String>) -> Self {
        self.set_known("marketing_title", FieldValue::from(title.into()))
    }

    pub fn web_only(self, web_only: bool) -> Self {
        self.set_known("web_only", FieldValue::from(web_only))
    }

    /// Set both platform redirect timeouts in one call.
    pub fn timeout(self, millis: i64) -> Self {
        self.set_known("timeout", FieldValue::from(millis))
    }

    /// Set the SMS text. The `{{ link }}` substitution token is
    /// appended when the text does not already carry one.
    pub fn custom_sms_text(self, text: impl Into<String>) -> Self {
        self.set_known("custom_sms_text", FieldValue::from(text.into()))
    }

    pub fn exp_date(self, when: DateTime<FixedOffset>) -> Self {
        self.set_known("exp_date", FieldValue::from(when))
    }

    pub fn add_keyword(self, keyword: impl Into<String>) -> Self {
        self.set_known("keyword", FieldValue::from(keyword.into()))
    }

    /// Attach a custom data entry; it travels verbatim on the wire.
    ///
    /// The entry bypasses name resolution: a name that matches a
    /// declared field or a delegation prefix still lands in the data
    /// block's custom-data map, untouched.
    pub fn custom_data(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        // The data block accepts extension entries for any name.
        if let Err(err) = self.entity.put_extension(&name.into(), value) {
            unreachable!("extension write rejected: {err}");
        }
        self
    }

    /// Read a field by name anywhere in the delegation tree.
    pub fn get(&self, name: &str) -> Result<FieldValue, SchemaError> {
        self.entity.get(name)
    }

    /// Write a field by name anywhere in the delegation tree.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), SchemaError> {
        self.entity.set(name, value)
    }

    /// Invoke a named setter or appender anywhere in the delegation
    /// tree: `set_og_image_url` with three arguments reaches the Open
    /// Graph multi-setter two hops down.
    pub fn invoke(&mut self, name: &str, args: Vec<FieldValue>) -> Result<(), SchemaError> {
        self.entity.invoke(name, args)
    }

    /// Serialize for an API request body: absent fields emit `null`,
    /// the data block nests under `data`.
    pub fn build(&self) -> Value {
        wire::encode(&self.entity, EncodeMode::Body)
    }

    /// Serialize for building a navigable URL: empty and falsy values
    /// are stripped.
    pub fn build_for_url(&self) -> Value {
        wire::encode(&self.entity, EncodeMode::Url)
    }

    fn set_known(mut self, name: &str, value: FieldValue) -> Self {
        // Names written here resolve somewhere in the delegation tree.
        if let Err(err) = self.entity.set(name, value) {
            unreachable!("declared field rejected a write: {err}");
        }
        self
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}
