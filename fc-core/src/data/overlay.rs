//! Partial updates to the unified model
//!
//! An overlay arrives as a generic JSON object and is decoded into a typed
//! patch up front, so unknown device or fan sub-keys are rejected before
//! anything is applied. Unknown top-level keys are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decoded overlay; `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub use_fahrenheit: Option<bool>,
    /// `Some(None)` clears the default logger fan
    #[serde(default, deserialize_with = "double_option")]
    pub default_logger_fan: Option<Option<String>>,
    pub logger_interval_seconds: Option<i64>,
    /// Full replacement of the names side table, keyed `hwmonId_pwmLeaf`
    pub display_names: Option<IndexMap<String, String>>,
    pub interval_seconds: Option<i64>,
    pub devices: Option<IndexMap<String, DevicePatch>>,
    pub fans: Option<IndexMap<String, FanPatch>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DevicePatch {
    pub sysfs_relative_path: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FanPatch {
    pub temp_input_ref: Option<String>,
    pub fan_input_ref: Option<String>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub min_start: Option<i64>,
    pub min_stop: Option<i64>,
    /// `Some(None)` deletes the value
    #[serde(default, deserialize_with = "double_option")]
    pub min_pwm: Option<Option<i64>>,
    /// `Some(None)` deletes the value
    #[serde(default, deserialize_with = "double_option")]
    pub max_pwm: Option<Option<i64>>,
    pub display_name: Option<String>,
}

// Distinguishes an explicit null from an absent key.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Control-file ids and values are space-separated `id=value` tokens, so
/// they cannot carry whitespace or `=`.
pub fn check_token(what: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} must not be empty", what));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '=') {
        return Err(format!("{} '{}' contains whitespace or '='", what, value));
    }
    Ok(())
}

/// Names-table keys are XML element names: `[A-Za-z_][A-Za-z0-9_.-]*`.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

impl Overlay {
    /// Decode a generic overlay value. Anything but an object, an unknown
    /// device or fan sub-key, or a value of the wrong type is an error.
    pub fn decode(value: &Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err("settings must be a JSON object".to_string());
        }
        Self::deserialize(value).map_err(|e| e.to_string())
    }
}

impl DevicePatch {
    pub fn check(&self, id: &str) -> Result<(), String> {
        check_token("device id", id)?;
        if let Some(path) = &self.sysfs_relative_path {
            check_token("sysfsRelativePath", path)?;
        }
        if let Some(name) = &self.display_name {
            check_token("displayName", name)?;
        }
        Ok(())
    }

    /// A new device needs both fields.
    pub fn check_new(&self, id: &str) -> Result<(), String> {
        if self.sysfs_relative_path.is_none() || self.display_name.is_none() {
            return Err(format!("new device {} needs sysfsRelativePath and displayName", id));
        }
        self.check(id)
    }
}

impl FanPatch {
    pub fn check(&self, id: &str) -> Result<(), String> {
        check_token("fan control id", id)?;
        let Some((hwmon, leaf)) = id.split_once('/') else {
            return Err(format!("fan control id {} is not of the form hwmonN/pwmN", id));
        };
        if !is_xml_name(hwmon) || !is_xml_name(leaf) {
            return Err(format!("fan control id {} has characters not allowed in a names key", id));
        }
        for (what, value) in [("tempInputRef", &self.temp_input_ref), ("fanInputRef", &self.fan_input_ref)] {
            if let Some(value) = value {
                check_token(what, value)?;
            }
        }
        Ok(())
    }

    /// A new fan needs every mandatory control field plus a display name.
    pub fn check_new(&self, id: &str) -> Result<(), String> {
        let missing: Vec<&str> = [
            ("tempInputRef", self.temp_input_ref.is_none()),
            ("fanInputRef", self.fan_input_ref.is_none()),
            ("minTemp", self.min_temp.is_none()),
            ("maxTemp", self.max_temp.is_none()),
            ("minStart", self.min_start.is_none()),
            ("minStop", self.min_stop.is_none()),
            ("displayName", self.display_name.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(format!("new fan control {} is missing {}", id, missing.join(", ")));
        }
        self.check(id)
    }
}
