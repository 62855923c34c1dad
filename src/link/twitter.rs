//! link::twitter
//!
//! The Twitter card preview block nested under link data with the
//! `twitter_` prefix.

use serde_json::Value;

use crate::declare_enum;
use crate::schema::enums::{EnumDescriptor, EnumScalar, EnumValue};
use crate::schema::{Entity, FieldSpec, FieldValue, MultiSetterSpec, Schema, SchemaError};
use crate::wire::{self, EncodeMode};

/// Twitter card rendering styles.
pub static TWITTER_CARD: EnumDescriptor = declare_enum!("TwitterCard" {
    "APP" = EnumScalar::Str("app"),
    "PLAYER" = EnumScalar::Str("player"),
    "SUMMARY" = EnumScalar::Str("summary"),
    "SUMMARY_LARGE_IMAGE" = EnumScalar::Str("summary_large_image"),
});

pub static TWITTER_SCHEMA: Schema = Schema::new(
    "Twitter",
    &[
        FieldSpec::enumerated("card", &TWITTER_CARD).reserved(),
        FieldSpec::str("title").reserved(),
        FieldSpec::str("description").reserved(),
        FieldSpec::str("image_url").reserved(),
        FieldSpec::str("site").reserved(),
        FieldSpec::str("app_country").reserved(),
        FieldSpec::str("player").reserved(),
        FieldSpec::int("player_width").reserved(),
        FieldSpec::int("player_height").reserved(),
    ],
)
.multi_setters(&[MultiSetterSpec {
    name: "player",
    fields: &["player", "player_width", "player_height"],
}]);

/// A Twitter card preview block.
#[derive(Debug, Clone, PartialEq)]
pub struct Twitter {
    entity: Entity,
}

impl Twitter {
    pub fn new() -> Self {
        Self {
            entity: Entity::new(&TWITTER_SCHEMA),
        }
    }

    /// Set the card style to one of the [`TWITTER_CARD`] constants.
    ///
    /// # Panics
    ///
    /// Panics when handed a constant from a different enumerated type.
    pub fn card(self, value: &'static EnumValue) -> Self {
        self.set_known("card", FieldValue::Enum(value))
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set_known("title", FieldValue::from(title.into()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set_known("description", FieldValue::from(description.into()))
    }

    pub fn image_url(self, url: impl Into<String>) -> Self {
        self.set_known("image_url", FieldValue::from(url.into()))
    }

    pub fn site(self, site: impl Into<String>) -> Self {
        self.set_known("site", FieldValue::from(site.into()))
    }

    pub fn app_country(self, country: impl Into<String>) -> Self {
        self.set_known("app_country", FieldValue::from(country.into()))
    }

    /// Set the player URL together with its pixel dimensions.
    pub fn player(self, url: impl Into<String>, width: i64, height: i64) -> Self {
        self.set_known("player", FieldValue::from(url.into()))
            .set_known("player_width", FieldValue::from(width))
            .set_known("player_height", FieldValue::from(height))
    }

    /// Read a field by name through the router.
    pub fn get(&self, name: &str) -> Result<FieldValue, SchemaError> {
        self.entity.get(name)
    }

    /// Write a field by name through the router.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), SchemaError> {
        self.entity.set(name, value)
    }

    /// Invoke a named setter or appender.
    pub fn invoke(&mut self, name: &str, args: Vec<FieldValue>) -> Result<(), SchemaError> {
        self.entity.invoke(name, args)
    }

    /// Serialize for an API request body.
    pub fn build(&self) -> Value {
        wire::encode(&self.entity, EncodeMode::Body)
    }

    fn set_known(mut self, name: &str, value: FieldValue) -> Self {
        // Names written here are declared by the schema above.
        if let Err(err) = self.entity.set(name, value) {
            unreachable!("declared field rejected a write: {err}");
        }
        self
    }
}

impl Default for Twitter {
    fn default() -> Self {
        Self::new()
    }
}
