//! Named decoder options.
//!
//! Options are stored as strings and converted on access, so callers can set
//! them from command-line text without knowing the expected type.

use std::collections::{BTreeMap, HashMap};

use crate::geometry::GeometryAttributeType;

/// Enables filtered (one attribute per call) payload decoding.
pub const SPLIT_ATTR_KEY: &str = "split_attr";

/// Selects the structural call (`"base"`) or the attribute to decode.
pub const ATTRIBUTE_NAME_KEY: &str = "attribute_name";

/// Exporter hint: write the first generic attribute as `generic`.
pub const TO_GENERIC_KEY: &str = "to_generic";

/// CLI hint: report the result as JSON.
pub const FORMAT_OUTPUT_KEY: &str = "format_output";

/// Per attribute type: keep portable (e.g. quantized) values in the output.
pub const SKIP_ATTRIBUTE_TRANSFORM_KEY: &str = "skip_attribute_transform";

/// A flat string key/value option set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    entries: BTreeMap<String, String>,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw string value.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Set a boolean value (stored as `"1"`/`"0"`).
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.set_string(key, if value { "1" } else { "0" });
    }

    /// Set an integer value.
    pub fn set_int(&mut self, key: impl Into<String>, value: i64) {
        self.set_string(key, value.to_string());
    }

    /// Get a string value.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Get an integer value; unparsable values count as missing.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key).and_then(|v| v.trim().parse().ok())
    }

    /// Get a boolean value. Accepts `true`/`false` and integers (non-zero is true).
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let value = self.get_string(key)?.trim();
        match value {
            "true" => Some(true),
            "false" => Some(false),
            _ => value.parse::<i64>().ok().map(|v| v != 0),
        }
    }

    /// Check if a key is set.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Options consulted while decoding: a global set plus one set per
/// attribute type.
#[derive(Clone, Debug, Default)]
pub struct DecoderOptions {
    global: Options,
    attribute_options: HashMap<GeometryAttributeType, Options>,
}

impl DecoderOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Global option set.
    pub fn global(&self) -> &Options {
        &self.global
    }

    pub fn set_global_bool(&mut self, key: impl Into<String>, value: bool) {
        self.global.set_bool(key, value);
    }

    pub fn set_global_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.global.set_string(key, value);
    }

    pub fn set_global_int(&mut self, key: impl Into<String>, value: i64) {
        self.global.set_int(key, value);
    }

    /// Global boolean, `default` when unset.
    pub fn get_global_bool(&self, key: &str, default: bool) -> bool {
        self.global.get_bool(key).unwrap_or(default)
    }

    /// Global string, `default` when unset.
    pub fn get_global_string<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.global.get_string(key).unwrap_or(default)
    }

    /// Global integer, `default` when unset.
    pub fn get_global_int(&self, key: &str, default: i64) -> i64 {
        self.global.get_int(key).unwrap_or(default)
    }

    /// Set a boolean for one attribute type.
    pub fn set_attribute_bool(
        &mut self,
        att_type: GeometryAttributeType,
        key: impl Into<String>,
        value: bool,
    ) {
        self.attribute_options.entry(att_type).or_default().set_bool(key, value);
    }

    /// Attribute-type boolean, falling back to the global value, then `default`.
    pub fn get_attribute_bool(&self, att_type: GeometryAttributeType, key: &str, default: bool) -> bool {
        self.attribute_options
            .get(&att_type)
            .and_then(|opts| opts.get_bool(key))
            .or_else(|| self.global.get_bool(key))
            .unwrap_or(default)
    }
}
