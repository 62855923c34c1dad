//! link::open_graph
//!
//! The Open Graph preview block nested under link data with the `og_`
//! prefix.

use serde_json::Value;

use crate::declare_enum;
use crate::schema::enums::{EnumDescriptor, EnumScalar, EnumValue};
use crate::schema::{Entity, FieldSpec, FieldValue, MultiSetterSpec, Schema, SchemaError};
use crate::wire::{self, EncodeMode};

/// Open Graph object types.
pub static OG_TYPE: EnumDescriptor = declare_enum!("OgType" {
    "ARTICLE" = EnumScalar::Str("article"),
    "BOOK" = EnumScalar::Str("book"),
    "MUSIC_ALBUM" = EnumScalar::Str("music.album"),
    "MUSIC_PLAYLIST" = EnumScalar::Str("music.playlist"),
    "MUSIC_RADIO_STATION" = EnumScalar::Str("music.radio_station"),
    "MUSIC_SONG" = EnumScalar::Str("music.song"),
    "PROFILE" = EnumScalar::Str("profile"),
    "VIDEO_EPISODE" = EnumScalar::Str("video.episode"),
    "VIDEO_MOVIE" = EnumScalar::Str("video.movie"),
    "VIDEO_OTHER" = EnumScalar::Str("video.other"),
    "VIDEO_TV_SHOW" = EnumScalar::Str("video.tv_show"),
    "WEBSITE" = EnumScalar::Str("website"),
});

pub static OPEN_GRAPH_SCHEMA: Schema = Schema::new(
    "OpenGraph",
    &[
        FieldSpec::str("title").reserved(),
        FieldSpec::str("description").reserved(),
        FieldSpec::str("image_url").reserved(),
        FieldSpec::int("image_width").reserved(),
        FieldSpec::int("image_height").reserved(),
        FieldSpec::str("video").reserved(),
        FieldSpec::str("url").reserved(),
        FieldSpec::enumerated("type", &OG_TYPE).reserved(),
        FieldSpec::str("redirect").reserved(),
        FieldSpec::str("app_id").reserved(),
    ],
)
.multi_setters(&[MultiSetterSpec {
    name: "image_url",
    fields: &["image_url", "image_width", "image_height"],
}]);

/// An Open Graph preview block.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenGraph {
    entity: Entity,
}

impl OpenGraph {
    pub fn new() -> Self {
        Self {
            entity: Entity::new(&OPEN_GRAPH_SCHEMA),
        }
    }

    pub fn title(self, title: impl Into<String>) -> Self {
        self.set_known("title", FieldValue::from(title.into()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set_known("description", FieldValue::from(description.into()))
    }

    /// Set the preview image together with its pixel dimensions.
    pub fn image(self, url: impl Into<String>, width: i64, height: i64) -> Self {
        self.set_known("image_url", FieldValue::from(url.into()))
            .set_known("image_width", FieldValue::from(width))
            .set_known("image_height", FieldValue::from(height))
    }

    pub fn image_url(self, url: impl Into<String>) -> Self {
        self.set_known("image_url", FieldValue::from(url.into()))
    }

    pub fn video(self, video: impl Into<String>) -> Self {
        self.set_known("video", FieldValue::from(video.into()))
    }

    pub fn url(self, url: impl Into<String>) -> Self {
        self.set_known("url", FieldValue::from(url.into()))
    }

    /// Set the object type to one of the [`OG_TYPE`] constants.
    ///
    /// # Panics
    ///
    /// Panics when handed a constant from a different enumerated type.
    pub fn object_type(self, value: &'static EnumValue) -> Self {
        self.set_known("type", FieldValue::Enum(value))
    }

    pub fn redirect(self, redirect: impl Into<String>) -> Self {
        self.set_known("redirect", FieldValue::from(redirect.into()))
    }

    pub fn app_id(self, app_id: impl Into<String>) -> Self {
        self.set_known("app_id", FieldValue::from(app_id.into()))
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

impl Default for OpenGraph {
    fn default() -> Self {
        Self::new()
    }
}
