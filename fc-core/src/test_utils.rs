//! Test fixtures: fake sysfs trees and config files under a temp dir

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::data::FanConfigPaths;

pub const CONTROL_SCENARIO: &str = "\
# Configuration file generated by pwmconfig
FCFANS=hwmon0/pwm1=hwmon0/fan1_input
FCTEMPS=hwmon0/pwm1=hwmon0/temp1_input
MINTEMP=hwmon0/pwm1=40
MAXTEMP=hwmon0/pwm1=60
MINSTART=hwmon0/pwm1=150
MINSTOP=hwmon0/pwm1=100
";

pub const PREFERENCES_CELSIUS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<settings>
	<!--fixture comment-->
	<farenheit>false</farenheit>
	<logger/>
	<loggerinterval>60</loggerinterval>
	<names/>
</settings>
"#;

/// A temp dir laid out like `/`: `sys/` plus `etc/`
pub struct FakeSystem {
    dir: TempDir,
}

impl FakeSystem {
    /// Modern layout with an (empty) class root
    pub fn new() -> Self {
        let system = Self::legacy();
        fs::create_dir_all(system.hwmon_root()).unwrap();
        system
    }

    /// Legacy layout: no class root
    pub fn legacy() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sys")).unwrap();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn sys_root(&self) -> PathBuf {
        self.root().join("sys")
    }

    pub fn hwmon_root(&self) -> PathBuf {
        self.sys_root().join("class").join("hwmon")
    }

    pub fn paths(&self) -> FanConfigPaths {
        FanConfigPaths {
            control_file: self.root().join("etc").join("fancontrol"),
            preferences_file: self.root().join("etc").join("fancontrol.xml"),
            hwmon_root: self.hwmon_root(),
            sys_root: self.sys_root(),
        }
    }

    /// Add `hwmonN` under the class root, with a `name` attribute and a
    /// `device` symlink into `sys/<devpath>`. Returns the hwmon directory.
    pub fn add_device(&self, hwmon: &str, devpath: &str, name: &str) -> PathBuf {
        let device_dir = self.sys_root().join(devpath);
        fs::create_dir_all(&device_dir).unwrap();
        let hwmon_dir = self.hwmon_root().join(hwmon);
        fs::create_dir_all(&hwmon_dir).unwrap();
        fs::write(hwmon_dir.join("name"), format!("{}\n", name)).unwrap();
        symlink(&device_dir, hwmon_dir.join("device")).unwrap();
        hwmon_dir
    }

    /// Add `sys/<devpath>/<hwmon>` for the legacy layout.
    pub fn add_legacy_device(&self, hwmon: &str, devpath: &str) -> PathBuf {
        let dir = self.sys_root().join(devpath).join(hwmon);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn set_attr(&self, dir: &Path, leaf: &str, value: &str) {
        fs::write(dir.join(leaf), format!("{}\n", value)).unwrap();
    }

    pub fn write_control(&self, text: &str) {
        fs::write(self.paths().control_file, text).unwrap();
    }

    pub fn write_preferences(&self, text: &str) {
        fs::write(self.paths().preferences_file, text).unwrap();
    }

    pub fn read_control(&self) -> String {
        fs::read_to_string(self.paths().control_file).unwrap()
    }

    pub fn read_preferences(&self) -> String {
        fs::read_to_string(self.paths().preferences_file).unwrap()
    }

    /// One coretemp device with temp1/fan1/pwm1 readings
    pub fn with_scenario() -> (Self, PathBuf) {
        let system = Self::new();
        let hwmon0 = system.add_device("hwmon0", "devices/platform/coretemp.0", "coretemp");
        system.set_attr(&hwmon0, "temp1_input", "45000");
        system.set_attr(&hwmon0, "temp1_label", "Package id 0");
        system.set_attr(&hwmon0, "fan1_input", "1200");
        system.set_attr(&hwmon0, "pwm1", "128");
        system.set_attr(&hwmon0, "pwm1_enable", "1");
        system.write_control(CONTROL_SCENARIO);
        system.write_preferences(PREFERENCES_CELSIUS);
        (system, hwmon0)
    }
}
