//! link::data
//!
//! The deep-link data block: the redirect, preview, and routing
//! parameters carried under a link's `data` key.
//!
//! Every declared field is a reserved platform field, so wire keys all
//! carry the `$` marker. The Open Graph and Twitter preview blocks hang
//! off this entity under the `og_` and `twitter_` prefixes, and any
//! name that resolves nowhere lands in the custom-data extension map
//! and travels verbatim.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::link::open_graph::OPEN_GRAPH_SCHEMA;
use crate::link::twitter::TWITTER_SCHEMA;
use crate::schema::{
    DelegateSpec, Entity, FanOutSpec, FieldEffect, FieldSpec, FieldValue, Schema, SchemaError,
};
use crate::wire::{self, EncodeMode};

pub static LINK_DATA_SCHEMA: Schema = Schema::new(
    "LinkData",
    &[
        FieldSpec::bool("web_only", false).reserved(),
        FieldSpec::int("match_duration").reserved(),
        FieldSpec::bool("always_deeplink", true).reserved(),
        FieldSpec::int("ios_redirect_timeout").reserved(),
        FieldSpec::int("android_redirect_timeout").reserved(),
        FieldSpec::bool("one_time_use", false).reserved(),
        FieldSpec::str("custom_sms_text")
            .reserved()
            .with_effect(FieldEffect::EnsureLinkToken),
        FieldSpec::str("marketing_title").reserved(),
        FieldSpec::bool("publicly_indexable", true).reserved(),
        FieldSpec::str_list("keywords").reserved().appender("keyword"),
        FieldSpec::str("canonical_identifier").reserved(),
        FieldSpec::timestamp("exp_date").reserved(),
        FieldSpec::str("content_type").reserved(),
        FieldSpec::tag_map("custom_meta_tags")
            .reserved()
            .appender("custom_meta_tag"),
        FieldSpec::str("android_url").reserved(),
        FieldSpec::str("android_wechat_url").reserved(),
        FieldSpec::str("ios_url").reserved(),
        FieldSpec::str("ios_has_app_url").reserved(),
        FieldSpec::str("ios_wechat_url").reserved(),
        FieldSpec::str("fire_url").reserved(),
        FieldSpec::str("windows_phone_url").reserved(),
        FieldSpec::str("blackberry_url").reserved(),
        FieldSpec::str("desktop_url").reserved(),
        FieldSpec::str("fallback_url").reserved(),
        FieldSpec::str("after_click_url").reserved(),
        FieldSpec::str("android_deepview").reserved(),
        FieldSpec::str("ios_deepview").reserved(),
        FieldSpec::str("desktop_deepview").reserved(),
        FieldSpec::str("deeplink_path").reserved(),
        FieldSpec::str("android_deeplink_path").reserved(),
        FieldSpec::str("ios_deeplink_path").reserved(),
    ],
)
.delegates(&[
    DelegateSpec {
        prefix: Some("og_"),
        nest_key: None,
        schema: &OPEN_GRAPH_SCHEMA,
    },
    DelegateSpec {
        prefix: Some("twitter_"),
        nest_key: None,
        schema: &TWITTER_SCHEMA,
    },
])
.fan_outs(&[FanOutSpec {
    name: "timeout",
    targets: &["android_redirect_timeout", "ios_redirect_timeout"],
}])
.accept_extension();

/// The deep-link data block.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkData {
    entity: Entity,
}

impl LinkData {
    pub fn new() -> Self {
        Self {
            entity: Entity::new(&LINK_DATA_SCHEMA),
        }
    }

    pub fn web_only(self, web_only: bool) -> Self {
        self.set_known("web_only", FieldValue::from(web_only))
    }

    pub fn match_duration(self, seconds: i64) -> Self {
        self.set_known("match_duration", FieldValue::from(seconds))
    }

    pub fn always_deeplink(self, always: bool) -> Self {
        self.set_known("always_deeplink", FieldValue::from(always))
    }

    /// Set both platform redirect timeouts in one call.
    pub fn timeout(self, millis: i64) -> Self {
        self.set_known("timeout", FieldValue::from(millis))
    }

    pub fn ios_redirect_timeout(self, millis: i64) -> Self {
        self.set_known("ios_redirect_timeout", FieldValue::from(millis))
    }

    pub fn android_redirect_timeout(self, millis: i64) -> Self {
        self.set_known("android_redirect_timeout", FieldValue::from(millis))
    }

    pub fn one_time_use(self, one_time: bool) -> Self {
        self.set_known("one_time_use", FieldValue::from(one_time))
    }

    /// Set the SMS text. The `{{ link }}` substitution token is
    /// appended when the text does not already carry one.
    pub fn custom_sms_text(self, text: impl Into<String>) -> Self {
        self.set_known("custom_sms_text", FieldValue::from(text.into()))
    }

    pub fn marketing_title(self, title: impl Into<String>) -> Self {
        self.set_known("marketing_title", FieldValue::from(title.into()))
    }

    pub fn publicly_indexable(self, indexable: bool) -> Self {
        self.set_known("publicly_indexable", FieldValue::from(indexable))
    }

    pub fn add_keyword(self, keyword: impl Into<String>) -> Self {
        self.set_known("keyword", FieldValue::from(keyword.into()))
    }

    pub fn canonical_identifier(self, identifier: impl Into<String>) -> Self {
        self.set_known("canonical_identifier", FieldValue::from(identifier.into()))
    }

    pub fn exp_date(self, when: DateTime<FixedOffset>) -> Self {
        self.set_known("exp_date", FieldValue::from(when))
    }

    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.set_known("content_type", FieldValue::from(content_type.into()))
    }

    pub fn add_custom_meta_tag(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let entry = FieldValue::Map(vec![(name.into(), FieldValue::from(value.into()))]);
        if let Err(err) = self.entity.set("custom_meta_tag", entry) {
            unreachable!("declared appender rejected a write: {err}");
        }
        self
    }

    pub fn deeplink_path(self, path: impl Into<String>) -> Self {
        self.set_known("deeplink_path", FieldValue::from(path.into()))
    }

    pub fn fallback_url(self, url: impl Into<String>) -> Self {
        self.set_known("fallback_url", FieldValue::from(url.into()))
    }

    pub fn desktop_url(self, url: impl Into<String>) -> Self {
        self.set_known("desktop_url", FieldValue::from(url.into()))
    }

    /// Attach a custom data entry; it travels verbatim on the wire.
    ///
    /// The entry bypasses name resolution: a name that matches a
    /// declared field or a delegation prefix still lands in the
    /// custom-data map, untouched.
    pub fn custom_data(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        // This schema accepts extension entries for any name.
        if let Err(err) = self.entity.put_extension(&name.into(), value) {
            unreachable!("extension write rejected: {err}");
        }
        self
    }

    /// Read a field by name through the router.
    pub fn get(&self, name: &str) -> Result<FieldValue, SchemaError> {
        self.entity.get(name)
    }

    /// Write a field by name through the router. Delegated names reach
    /// the preview blocks (`og_title`, `twitter_card`, ...).
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
        // Names written here resolve inside this schema or its
        // extension map.
        if let Err(err) = self.entity.set(name, value) {
            unreachable!("declared field rejected a write: {err}");
        }
        self
    }
}

impl Default for LinkData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod booleans {
        use super::*;

        #[test]
        fn unset_booleans_collapse_to_declared_defaults() {
            let payload = LinkData::new().build();
            assert_eq!(payload["$web_only"], json!(false));
            assert_eq!(payload["$always_deeplink"], json!(true));
            assert_eq!(payload["$one_time_use"], json!(false));
            assert_eq!(payload["$publicly_indexable"], json!(true));
        }

        #[test]
        fn explicit_values_override_defaults() {
            let payload = LinkData::new().always_deeplink(false).build();
            assert_eq!(payload["$always_deeplink"], json!(false));
        }
    }

    mod sms_text {
        use super::*;

        #[test]
        fn token_is_appended() {
            let data = LinkData::new().custom_sms_text("Check this out");
            assert_eq!(
                data.get("custom_sms_text").unwrap().as_str(),
                Some("Check this out {{ link }}")
            );
        }

        #[test]
        fn existing_token_is_kept() {
            let data = LinkData::new().custom_sms_text("Go {{ link }} now");
            assert_eq!(
                data.get("custom_sms_text").unwrap().as_str(),
                Some("Go {{ link }} now")
            );
        }

        #[test]
        fn empty_text_left_untouched() {
            let data = LinkData::new().custom_sms_text("");
            assert_eq!(data.get("custom_sms_text").unwrap().as_str(), Some(""));
        }
    }

    mod routing {
        use super::*;
        use crate::link::open_graph::OG_TYPE;

        #[test]
        fn timeout_fans_out_to_both_platforms() {
            let data = LinkData::new().timeout(750);
            assert_eq!(data.get("android_redirect_timeout").unwrap().as_int(), Some(750));
            assert_eq!(data.get("ios_redirect_timeout").unwrap().as_int(), Some(750));
        }

        #[test]
        fn prefixed_names_reach_preview_blocks() {
            let mut data = LinkData::new();
            data.set("og_title", FieldValue::from("My title")).unwrap();
            data.set(
                "og_type",
                FieldValue::Enum(OG_TYPE.by_name("ARTICLE").unwrap()),
            )
            .unwrap();
            data.set("twitter_site", FieldValue::from("@branch")).unwrap();

            let payload = data.build();
            assert_eq!(payload["$og_title"], json!("My title"));
            assert_eq!(payload["$og_type"], json!("article"));
            assert_eq!(payload["$twitter_site"], json!("@branch"));
        }

        #[test]
        fn unknown_names_become_custom_data() {
            let data = LinkData::new().custom_data("campaign_id", FieldValue::from("xyz"));
            let payload = data.build();
            assert_eq!(payload["campaign_id"], json!("xyz"));
        }

        #[test]
        fn custom_data_bypasses_resolution() {
            let payload = LinkData::new()
                .custom_data("twitter_ref", FieldValue::from("abc"))
                .custom_data("marketing_title", FieldValue::from(7))
                .build();
            // Neither the twitter_ prefix nor the declared string field
            // intercepts the entries; both travel verbatim.
            assert_eq!(payload["twitter_ref"], json!("abc"));
            assert!(payload.get("$twitter_ref").is_none());
            assert_eq!(payload["marketing_title"], json!(7));
            assert_eq!(payload["$marketing_title"], Value::Null);
        }
    }

    mod collections {
        use super::*;

        #[test]
        fn keywords_accumulate() {
            let payload = LinkData::new()
                .add_keyword("rust")
                .add_keyword("links")
                .build();
            assert_eq!(payload["$keywords"], json!(["rust", "links"]));
        }

        #[test]
        fn meta_tags_serialize_as_embedded_string() {
            let payload = LinkData::new()
                .add_custom_meta_tag("robots", "noindex")
                .build();
            assert_eq!(payload["$custom_meta_tags"], json!(r#"{"robots":"noindex"}"#));
        }

        #[test]
        fn empty_meta_tags_are_omitted() {
            let payload = LinkData::new().build();
            assert!(payload.get("$custom_meta_tags").is_none());
        }
    }
}
