//! hwmon device enumeration
//!
//! Devices live under the class root as `hwmonN` directories, each with a
//! `name` attribute and a `device` symlink into the device tree. The link
//! target, relative to the sysfs root, is what the control file stores as
//! DEVPATH.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::attribute::read_text;
use crate::constants::paths::HWMON_PREFIX;
use crate::data::{Device, UnifiedModel};
use crate::hw::location::Locate;

/// Live view of the hardware monitor tree
#[derive(Debug, Clone)]
pub struct HardwareInventory {
    hwmon_root: PathBuf,
    sys_root: PathBuf,
}

impl HardwareInventory {
    pub fn new(hwmon_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self { hwmon_root: hwmon_root.into(), sys_root: sys_root.into() }
    }

    pub fn hwmon_root(&self) -> &Path {
        &self.hwmon_root
    }

    pub fn sys_root(&self) -> &Path {
        &self.sys_root
    }

    /// Whether the modern class root is present. Without it only stored
    /// device paths can be used.
    pub fn has_class_root(&self) -> bool {
        self.hwmon_root.is_dir()
    }

    /// All `hwmonN` entries under the class root; empty in legacy mode.
    pub fn enumerate_devices(&self) -> BTreeMap<String, Device> {
        let mut devices = BTreeMap::new();
        let Ok(entries) = fs::read_dir(&self.hwmon_root) else {
            debug!(root = %self.hwmon_root.display(), "No hwmon class root, legacy mode");
            return devices;
        };

        for entry in entries.flatten() {
            let id = entry.file_name().to_string_lossy().into_owned();
            if !id.starts_with(HWMON_PREFIX) {
                continue;
            }
            let dir = entry.path();
            let device = Device::new(self.device_path(&dir), read_text(&dir.join("name")));
            trace!(hwmon = %id, path = ?device.sysfs_relative_path, name = device.name(), "Found hwmon device");
            devices.insert(id, device);
        }
        devices
    }

    /// Live device for one hwmon id
    pub fn device(&self, hwmon: &str) -> Option<Device> {
        self.enumerate_devices().remove(hwmon)
    }

    // Device link target relative to the sysfs root, empty when unresolvable.
    fn device_path(&self, hwmon_dir: &Path) -> String {
        let link = hwmon_dir.join("device");
        if fs::read_link(&link).is_err() {
            return String::new();
        }
        let (Ok(target), Ok(sys_root)) = (fs::canonicalize(&link), fs::canonicalize(&self.sys_root)) else {
            return String::new();
        };
        match target.strip_prefix(&sys_root) {
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => {
                debug!(target = %target.display(), "device link outside sysfs root");
                String::new()
            }
        }
    }

    /// Temperature inputs: `hwmonN/tempM_input` -> `device:label`
    pub fn temperature_sensors(&self, model: &UnifiedModel) -> BTreeMap<String, String> {
        self.list_attributes(
            model,
            |leaf| leaf.starts_with("temp") && leaf.ends_with("_input"),
            |dir, leaf| read_text(&dir.join(leaf.replace("_input", "_label"))),
        )
    }

    /// Fan tachometer inputs: `hwmonN/fanM_input` -> `device:fanM`
    pub fn fan_inputs(&self, model: &UnifiedModel) -> BTreeMap<String, String> {
        self.list_attributes(
            model,
            |leaf| leaf.starts_with("fan") && leaf.ends_with("_input"),
            |_, leaf| leaf.replace("_input", ""),
        )
    }

    /// PWM outputs: `hwmonN/pwmM` -> `device:pwmM`
    pub fn pwm_outputs(&self, model: &UnifiedModel) -> BTreeMap<String, String> {
        self.list_attributes(
            model,
            |leaf| leaf.starts_with("pwm") && !leaf.contains('_'),
            |_, leaf| leaf.to_string(),
        )
    }

    fn list_attributes(
        &self,
        model: &UnifiedModel,
        select: impl Fn(&str) -> bool,
        describe: impl Fn(&Path, &str) -> String,
    ) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for (hwmon, device) in self.enumerate_devices() {
            let Some(dir) = self.resolve_location(model, Locate::Device(&hwmon)) else {
                continue;
            };
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let leaf = entry.file_name().to_string_lossy().into_owned();
                if select(&leaf) {
                    let label = format!("{}:{}", device.name(), describe(&dir, &leaf));
                    out.insert(format!("{}/{}", hwmon, leaf), label);
                }
            }
        }
        out
    }
}
