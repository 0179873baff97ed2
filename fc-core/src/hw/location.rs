//! Logical id to attribute path resolution
//!
//! Three addressing modes:
//! - a bare hwmon id names the device directory
//! - a composite `hwmonId/leaf` names one attribute directly
//! - a fan-control id plus `temp` or `fan` follows that fan's input ref
//!
//! Paths are built under the class root when it exists, otherwise from the
//! device path stored in the model under the sysfs root.

use std::path::PathBuf;

use tracing::debug;

use crate::data::{split_ref, UnifiedModel};
use crate::hw::hardware::HardwareInventory;

/// What to locate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locate<'a> {
    /// Device directory for an hwmon id
    Device(&'a str),
    /// Attribute addressed as `hwmonId/leaf`
    Attribute(&'a str),
    /// Temperature input of a fan control
    Temp(&'a str),
    /// Tachometer input of a fan control
    Fan(&'a str),
}

impl HardwareInventory {
    /// Absolute path for a location, `None` when anything along the way is
    /// unknown or malformed.
    pub fn resolve_location(&self, model: &UnifiedModel, what: Locate<'_>) -> Option<PathBuf> {
        let (hwmon, leaf) = match what {
            Locate::Device(hwmon) => (hwmon, None),
            Locate::Attribute(id) => {
                let (hwmon, leaf) = split_ref(id)?;
                (hwmon, Some(leaf))
            }
            Locate::Temp(fan_id) | Locate::Fan(fan_id) => {
                let fan = model.fans.get(fan_id)?;
                let input = match what {
                    Locate::Temp(_) => fan.temp_input_ref.as_deref(),
                    _ => fan.fan_input_ref.as_deref(),
                }?;
                let (hwmon, leaf) = split_ref(input)?;
                (hwmon, Some(leaf))
            }
        };
        if hwmon.is_empty() || leaf.is_some_and(str::is_empty) {
            return None;
        }

        let dir = if self.has_class_root() {
            self.hwmon_root().join(hwmon)
        } else {
            let Some(devpath) = model
                .devices
                .get(hwmon)
                .and_then(|device| device.sysfs_relative_path.as_deref())
                .filter(|path| !path.is_empty())
            else {
                debug!(hwmon, "No stored device path for legacy resolution");
                return None;
            };
            self.sys_root().join(devpath).join(hwmon)
        };

        Some(match leaf {
            Some(leaf) => dir.join(leaf),
            None => dir,
        })
    }
}
