//! Core data types for the unified fancontrol model
//!
//! Ids:
//! - hwmon id: directory name under the class root, e.g. `hwmon0`
//! - fan-control id: `hwmonId/pwmLeaf`, e.g. `hwmon0/pwm1`
//! - input refs: `hwmonId/leaf`, e.g. `hwmon0/temp1_input`

use indexmap::IndexMap;
use serde::Serialize;

use crate::constants::preferences::DEFAULT_LOGGER_INTERVAL;
use crate::display::TempUnit;

/// Split a composite `hwmonId/leaf` id.
pub fn split_ref(id: &str) -> Option<(&str, &str)> {
    id.split_once('/')
}

/// Owning hwmon id of a composite id (the whole id when it has no slash).
pub fn hwmon_of(id: &str) -> &str {
    id.split('/').next().unwrap_or(id)
}

/// Key of a fan-control id in the preferences `names` side table.
pub fn names_key(fan_id: &str) -> String {
    fan_id.replace('/', "_")
}

/// Global settings, persisted entirely in the preferences file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub use_fahrenheit: bool,
    pub default_logger_fan: Option<String>,
    pub logger_interval_seconds: i64,
    /// Side table fanControlId (slash replaced by underscore) -> display name
    pub display_names: IndexMap<String, String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            use_fahrenheit: false,
            default_logger_fan: None,
            logger_interval_seconds: DEFAULT_LOGGER_INTERVAL,
            display_names: IndexMap::new(),
        }
    }
}

impl GlobalSettings {
    pub fn temp_unit(&self) -> TempUnit {
        TempUnit::from_fahrenheit_flag(self.use_fahrenheit)
    }
}

/// One hwmon device, persisted in the control file (DEVPATH / DEVNAME)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device path relative to the sysfs root, e.g. `devices/platform/coretemp.0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysfs_relative_path: Option<String>,
    /// Driver name from the hwmon `name` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Device {
    pub fn new(sysfs_relative_path: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            sysfs_relative_path: Some(sysfs_relative_path.into()),
            display_name: Some(display_name.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }
}

/// One managed fan-control association
///
/// Control fields are optional per entry because a hand-edited control file
/// may lack some keys; registration through the engine requires all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanControl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_input_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_input_ref: Option<String>,
    /// Display unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f64>,
    /// Display unit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stop: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pwm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pwm: Option<i64>,
    /// Preferences field; empty when unnamed
    pub display_name: String,
}

/// The unified in-memory model built from both stores
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedModel {
    pub use_fahrenheit: bool,
    pub default_logger_fan: Option<String>,
    pub logger_interval_seconds: i64,
    pub interval_seconds: i64,
    pub devices: IndexMap<String, Device>,
    /// Insertion order follows the control file
    pub fans: IndexMap<String, FanControl>,
}

impl UnifiedModel {
    pub fn temp_unit(&self) -> TempUnit {
        TempUnit::from_fahrenheit_flag(self.use_fahrenheit)
    }

    /// Global settings with the `names` side table rebuilt from the fans.
    pub fn global_settings(&self) -> GlobalSettings {
        let display_names = self
            .fans
            .iter()
            .filter(|(_, fan)| !fan.display_name.is_empty())
            .map(|(id, fan)| (names_key(id), fan.display_name.clone()))
            .collect();
        GlobalSettings {
            use_fahrenheit: self.use_fahrenheit,
            default_logger_fan: self.default_logger_fan.clone(),
            logger_interval_seconds: self.logger_interval_seconds,
            display_names,
        }
    }

    /// The model without its fan collection
    pub fn settings_view(&self) -> SettingsView {
        SettingsView {
            use_fahrenheit: self.use_fahrenheit,
            default_logger_fan: self.default_logger_fan.clone(),
            logger_interval_seconds: self.logger_interval_seconds,
            interval_seconds: self.interval_seconds,
            devices: self.devices.clone(),
        }
    }
}

/// Model projection without fans
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub use_fahrenheit: bool,
    pub default_logger_fan: Option<String>,
    pub logger_interval_seconds: i64,
    pub interval_seconds: i64,
    pub devices: IndexMap<String, Device>,
}

/// One monitoring sample for a fan control
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub fan_control_id: String,
    pub use_fahrenheit: bool,
    /// Display unit
    pub temperature: f64,
    pub rpm: i64,
    pub pwm_duty: i64,
    pub alarm_status: String,
}

/// Listing entry for a configured fan control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanControlInfo {
    /// Live device name, empty when the hwmon id is not present
    pub device: String,
    /// Display name, or `device:id` when unnamed
    pub name: String,
    /// Whether this is the configured default logger fan
    pub default: bool,
}
