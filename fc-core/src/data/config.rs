//! File and tree locations used by the engine
//!
//! Everything is passed explicitly so the engine can run against a fake tree.

use std::path::PathBuf;

use crate::constants::paths;

/// Where the two stores and the hardware tree live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanConfigPaths {
    pub control_file: PathBuf,
    pub preferences_file: PathBuf,
    /// Modern class root, e.g. `/sys/class/hwmon`
    pub hwmon_root: PathBuf,
    /// sysfs root used by the legacy layout
    pub sys_root: PathBuf,
}

impl Default for FanConfigPaths {
    fn default() -> Self {
        Self {
            control_file: PathBuf::from(paths::CONTROL_FILE),
            preferences_file: PathBuf::from(paths::PREFERENCES_FILE),
            hwmon_root: PathBuf::from(paths::HWMON_ROOT),
            sys_root: PathBuf::from(paths::SYS_ROOT),
        }
    }
}
