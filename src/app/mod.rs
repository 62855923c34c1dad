//! app
//!
//! The application configuration: the per-app settings the platform
//! exposes for reading and writing.
//!
//! Unlike the link family, app configuration keys travel unmarked on
//! the wire, its booleans render as `1`/`0` integer flags, and unknown
//! inbound keys are dropped rather than collected. A handful of fields
//! only ever arrive from the server (identifiers, credentials, the
//! creation date) and are never emitted back.

use serde_json::Value;

use crate::declare_enum;
use crate::schema::enums::{EnumDescriptor, EnumScalar, EnumValue};
use crate::schema::{Entity, FieldSpec, FieldValue, Schema, SchemaError};
use crate::wire::{self, EncodeMode, WireError};

/// How an app handles a platform without the app installed.
pub static APP_TYPE: EnumDescriptor = declare_enum!("AppType" {
    "NONE" = EnumScalar::Int(0),
    "STORE" = EnumScalar::Int(1),
    "FALLBACK" = EnumScalar::Int(2),
});

pub static APP_CONFIG_SCHEMA: Schema = Schema::new(
    "AppConfig",
    &[
        FieldSpec::str("app_name"),
        FieldSpec::str("dev_name"),
        FieldSpec::str("dev_email"),
        FieldSpec::bool("always_open_app", false).inbound_only(),
        FieldSpec::enumerated("android_app", &APP_TYPE).default_const("STORE"),
        FieldSpec::str("android_url"),
        FieldSpec::str("android_uri_scheme"),
        FieldSpec::str("android_package_name"),
        FieldSpec::str_list("sha256_cert_fingerprints").appender("sha256_cert_fingerprint"),
        FieldSpec::flag("android_app_links_enabled", true),
        FieldSpec::enumerated("ios_app", &APP_TYPE).default_const("STORE"),
        FieldSpec::str("ios_url"),
        FieldSpec::str("ios_uri_scheme"),
        FieldSpec::str("ios_store_country"),
        FieldSpec::str("ios_bundle_id"),
        FieldSpec::str("ios_team_id"),
        FieldSpec::flag("universal_linking_enabled", true),
        FieldSpec::str("fire_url"),
        FieldSpec::str("windows_phone_url"),
        FieldSpec::str("blackberry_url"),
        FieldSpec::str("web_url"),
        FieldSpec::str("default_desktop_url"),
        FieldSpec::str("short_url_domain"),
        FieldSpec::str("text_message"),
        FieldSpec::str("og_app_id"),
        FieldSpec::str("og_title"),
        FieldSpec::str("og_image_url"),
        FieldSpec::str("og_description"),
        FieldSpec::str("deepview_desktop"),
        FieldSpec::str("deepview_ios"),
        FieldSpec::str("deepview_android"),
        // Server-assigned, never sent back.
        FieldSpec::str("id").inbound_only(),
        FieldSpec::str("app_key").inbound_only(),
        FieldSpec::timestamp("creation_date").inbound_only(),
        FieldSpec::str("origin").inbound_only(),
        FieldSpec::str("dev_phone_number").inbound_only(),
        FieldSpec::str("default_short_url_domain").inbound_only(),
        FieldSpec::str("alternate_short_url_domain").inbound_only(),
        FieldSpec::str("branch_key").inbound_only(),
        FieldSpec::str("branch_secret").inbound_only(),
    ],
);

/// One app's platform configuration.
///
/// Both platform app types start at [`APP_TYPE`] `STORE`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    entity: Entity,
}

impl AppConfig {
    pub fn new(app_name: impl Into<String>) -> Self {
        let mut entity = Entity::new(&APP_CONFIG_SCHEMA);
        // app_name is declared by the schema above.
        if let Err(err) = entity.set("app_name", FieldValue::from(app_name.into())) {
            unreachable!("declared field rejected a write: {err}");
        }
        Self { entity }
    }

    /// Reconstruct a configuration from an API response payload.
    ///
    /// Boolean flags decode from the server's `"1"` string form, the
    /// platform app types resolve to canonical [`APP_TYPE`] instances,
    /// and unknown keys are dropped.
    ///
    /// # Errors
    ///
    /// [`WireError`] when the payload is not an object or a declared
    /// field carries an uninterpretable value.
    pub fn parse(payload: &Value) -> Result<Self, WireError> {
        Ok(Self {
            entity: wire::decode(&APP_CONFIG_SCHEMA, payload)?,
        })
    }

    pub fn dev_name(self, name: impl Into<String>) -> Self {
        self.set_known("dev_name", FieldValue::from(name.into()))
    }

    pub fn dev_email(self, email: impl Into<String>) -> Self {
        self.set_known("dev_email", FieldValue::from(email.into()))
    }

    /// Set the Android redirect behavior to one of the [`APP_TYPE`]
    /// constants.
    ///
    /// # Panics
    ///
    /// Panics when handed a constant from a different enumerated type.
    pub fn android_app(self, value: &'static EnumValue) -> Self {
        self.set_known("android_app", FieldValue::Enum(value))
    }

    pub fn android_url(self, url: impl Into<String>) -> Self {
        self.set_known("android_url", FieldValue::from(url.into()))
    }

    pub fn android_uri_scheme(self, scheme: impl Into<String>) -> Self {
        self.set_known("android_uri_scheme", FieldValue::from(scheme.into()))
    }

    pub fn android_package_name(self, package: impl Into<String>) -> Self {
        self.set_known("android_package_name", FieldValue::from(package.into()))
    }

    pub fn add_sha256_cert_fingerprint(self, fingerprint: impl Into<String>) -> Self {
        self.set_known("sha256_cert_fingerprint", FieldValue::from(fingerprint.into()))
    }

    pub fn android_app_links_enabled(self, enabled: bool) -> Self {
        self.set_known("android_app_links_enabled", FieldValue::from(enabled))
    }

    /// Set the iOS redirect behavior to one of the [`APP_TYPE`]
    /// constants.
    ///
    /// # Panics
    ///
    /// Panics when handed a constant from a different enumerated type.
    pub fn ios_app(self, value: &'static EnumValue) -> Self {
        self.set_known("ios_app", FieldValue::Enum(value))
    }

    pub fn ios_url(self, url: impl Into<String>) -> Self {
        self.set_known("ios_url", FieldValue::from(url.into()))
    }

    pub fn ios_uri_scheme(self, scheme: impl Into<String>) -> Self {
        self.set_known("ios_uri_scheme", FieldValue::from(scheme.into()))
    }

    pub fn ios_bundle_id(self, bundle_id: impl Into<String>) -> Self {
        self.set_known("ios_bundle_id", FieldValue::from(bundle_id.into()))
    }

    pub fn ios_team_id(self, team_id: impl Into<String>) -> Self {
        self.set_known("ios_team_id", FieldValue::from(team_id.into()))
    }

    pub fn universal_linking_enabled(self, enabled: bool) -> Self {
        self.set_known("universal_linking_enabled", FieldValue::from(enabled))
    }

    pub fn web_url(self, url: impl Into<String>) -> Self {
        self.set_known("web_url", FieldValue::from(url.into()))
    }

    pub fn default_desktop_url(self, url: impl Into<String>) -> Self {
        self.set_known("default_desktop_url", FieldValue::from(url.into()))
    }

    pub fn short_url_domain(self, domain: impl Into<String>) -> Self {
        self.set_known("short_url_domain", FieldValue::from(domain.into()))
    }

    pub fn text_message(self, message: impl Into<String>) -> Self {
        self.set_known("text_message", FieldValue::from(message.into()))
    }

    /// The app's branded short domain, when one is configured.
    pub fn short_url_domain_value(&self) -> Option<String> {
        self.string_field("short_url_domain")
    }

    /// The platform-assigned default short domain.
    pub fn default_short_url_domain(&self) -> Option<String> {
        self.string_field("default_short_url_domain")
    }

    pub fn app_name_value(&self) -> Option<String> {
        self.string_field("app_name")
    }

    pub fn branch_key(&self) -> Option<String> {
        self.string_field("branch_key")
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

    /// Serialize for an API request body. Server-assigned fields are
    /// skipped; boolean flags render as `1`/`0`.
    pub fn build(&self) -> Value {
        wire::encode(&self.entity, EncodeMode::Body)
    }

    fn string_field(&self, name: &str) -> Option<String> {
        self.entity
            .get(name)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
    }

    fn set_known(mut self, name: &str, value: FieldValue) -> Self {
        // Names written here are declared by the schema above.
        if let Err(err) = self.entity.set(name, value) {
            unreachable!("declared field rejected a write: {err}");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod build {
        use super::*;

        #[test]
        fn platform_apps_default_to_store() {
            let payload = AppConfig::new("demo").build();
            assert_eq!(payload["app_name"], json!("demo"));
            assert_eq!(payload["android_app"], json!(1));
            assert_eq!(payload["ios_app"], json!(1));
        }

        #[test]
        fn flags_render_as_integers() {
            let payload = AppConfig::new("demo")
                .universal_linking_enabled(false)
                .build();
            assert_eq!(payload["universal_linking_enabled"], json!(0));
            assert_eq!(payload["android_app_links_enabled"], json!(1));
        }

        #[test]
        fn keys_are_unmarked() {
            let payload = AppConfig::new("demo").web_url("https://example.com").build();
            assert_eq!(payload["web_url"], json!("https://example.com"));
            assert!(payload.get("$web_url").is_none());
        }

        #[test]
        fn server_assigned_fields_are_not_emitted() {
            let config = AppConfig::parse(&json!({
                "app_name": "demo",
                "id": "42",
                "creation_date": "2020-01-01T00:00:00Z",
                "always_open_app": "1"
            }))
            .unwrap();
            let payload = config.build();
            assert!(payload.get("id").is_none());
            assert!(payload.get("creation_date").is_none());
            assert!(payload.get("always_open_app").is_none());
        }

        #[test]
        fn fingerprints_accumulate() {
            let payload = AppConfig::new("demo")
                .add_sha256_cert_fingerprint("AA:BB")
                .add_sha256_cert_fingerprint("CC:DD")
                .build();
            assert_eq!(payload["sha256_cert_fingerprints"], json!(["AA:BB", "CC:DD"]));
        }
    }

    mod parse {
        use super::*;

        #[test]
        fn app_type_resolves_to_canonical_instance() {
            let config = AppConfig::parse(&json!({ "android_app": 1 })).unwrap();
            let store = APP_TYPE.by_name("STORE").unwrap();
            assert!(std::ptr::eq(
                config.get("android_app").unwrap().as_enum().unwrap(),
                store
            ));
        }

        #[test]
        fn out_of_set_app_type_fails() {
            assert!(matches!(
                AppConfig::parse(&json!({ "ios_app": 9 })),
                Err(WireError::Enum(_))
            ));
        }

        #[test]
        fn string_flags_decode() {
            let config = AppConfig::parse(&json!({
                "universal_linking_enabled": "1",
                "android_app_links_enabled": "0"
            }))
            .unwrap();
            assert_eq!(
                config.get("universal_linking_enabled").unwrap().as_bool(),
                Some(true)
            );
            assert_eq!(
                config.get("android_app_links_enabled").unwrap().as_bool(),
                Some(false)
            );
        }

        #[test]
        fn creation_date_normalizes_trailing_z() {
            let config =
                AppConfig::parse(&json!({ "creation_date": "2020-01-01T00:00:00Z" })).unwrap();
            let ts = config.get("creation_date").unwrap().as_timestamp().unwrap();
            assert_eq!(ts.timestamp(), 1577836800);
        }

        #[test]
        fn unknown_keys_are_dropped() {
            let config = AppConfig::parse(&json!({
                "app_name": "demo",
                "surprise": "value"
            }))
            .unwrap();
            assert!(config.get("surprise").is_err());
            assert_eq!(config.app_name_value().as_deref(), Some("demo"));
        }

        #[test]
        fn domains_read_back_for_url_building() {
            let config = AppConfig::parse(&json!({
                "default_short_url_domain": "abc.app.link",
                "short_url_domain": ""
            }))
            .unwrap();
            assert_eq!(
                config.default_short_url_domain().as_deref(),
                Some("abc.app.link")
            );
            assert_eq!(config.short_url_domain_value().as_deref(), Some(""));
        }
    }
}
