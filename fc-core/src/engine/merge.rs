//! The merge engine
//!
//! Owns the unified model built from the preferences file and the control
//! file, applies partial updates to it and writes the dirty stores back.
//! Preferences are always loaded first because the control file's
//! thresholds are converted into the unit they select.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::{
    hwmon_of, names_key, ControlFileStore, Device, DevicePatch, FanConfigPaths, FanControl,
    FanControlInfo, FanPatch, GlobalSettings, Overlay, PreferencesStore, Sample, UnifiedModel,
};
use crate::display::TempUnit;
use crate::engine::dirty::{DirtyMask, UpdateRejected};
use crate::hw::HardwareInventory;
use fc_error::Result;

/// Loaded configuration plus the live hardware view
#[derive(Debug)]
pub struct MergeEngine {
    paths: FanConfigPaths,
    inventory: HardwareInventory,
    control: ControlFileStore,
    preferences: PreferencesStore,
    model: UnifiedModel,
    /// Control-file comment lines, written back on every rewrite
    comments: Vec<String>,
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl MergeEngine {
    /// Build the model from both stores. A missing control file or a
    /// malformed preferences file is fatal.
    pub fn load(paths: FanConfigPaths) -> Result<Self> {
        let inventory = HardwareInventory::new(&paths.hwmon_root, &paths.sys_root);
        let control = ControlFileStore::new(&paths.control_file);
        let preferences = PreferencesStore::new(&paths.preferences_file);
        let (model, comments) = Self::build(&control, &preferences)?;

        Ok(Self { paths, inventory, control, preferences, model, comments })
    }

    fn build(control: &ControlFileStore, preferences: &PreferencesStore) -> Result<(UnifiedModel, Vec<String>)> {
        if !preferences.exists() {
            if let Err(e) = preferences.create_default() {
                warn!(error = %e, "Could not create preferences file, using defaults");
            }
        }
        let settings = if preferences.exists() {
            preferences.load()?
        } else {
            GlobalSettings::default()
        };

        let fragment = control.load(settings.temp_unit())?;

        let mut fans = fragment.fans;
        for (id, fan) in fans.iter_mut() {
            if let Some(name) = settings.display_names.get(&names_key(id)) {
                fan.display_name = name.clone();
            }
        }

        let model = UnifiedModel {
            use_fahrenheit: settings.use_fahrenheit,
            default_logger_fan: settings.default_logger_fan,
            logger_interval_seconds: settings.logger_interval_seconds,
            interval_seconds: fragment.interval_seconds,
            devices: fragment.devices,
            fans,
        };
        info!(
            devices = model.devices.len(),
            fans = model.fans.len(),
            fahrenheit = model.use_fahrenheit,
            "Loaded fancontrol configuration"
        );
        Ok((model, fragment.comments))
    }

    /// Re-read both stores. On failure the current model is kept.
    pub fn reload(&mut self) -> Result<()> {
        let (model, comments) = Self::build(&self.control, &self.preferences)?;
        self.model = model;
        self.comments = comments;
        Ok(())
    }

    pub fn model(&self) -> &UnifiedModel {
        &self.model
    }

    pub fn paths(&self) -> &FanConfigPaths {
        &self.paths
    }

    pub fn inventory(&self) -> &HardwareInventory {
        &self.inventory
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Configured fan controls in control-file order
    pub fn enumerate_fan_controls(&self) -> IndexMap<String, FanControlInfo> {
        let live = self.inventory.enumerate_devices();
        self.model
            .fans
            .iter()
            .map(|(id, fan)| {
                let device = live.get(hwmon_of(id)).map(|d| d.name().to_string()).unwrap_or_default();
                let name = if fan.display_name.is_empty() {
                    format!("{}:{}", device, id)
                } else {
                    fan.display_name.clone()
                };
                let default = self.model.default_logger_fan.as_deref() == Some(id.as_str());
                (id.clone(), FanControlInfo { device, name, default })
            })
            .collect()
    }

    /// The configured default logger fan, else the first fan control.
    pub fn default_fan(&self) -> Option<&str> {
        self.model
            .default_logger_fan
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.model.fans.keys().next().map(String::as_str))
    }

    /// One monitoring sample. `None` only when no fan id is given and no
    /// fan is configured; unreadable values come back as zero or empty.
    pub fn query_sample(&self, fan_id: Option<&str>) -> Option<Sample> {
        let id = fan_id.or_else(|| self.default_fan())?;
        debug!(fan = id, "Sampling fan control");
        Some(Sample {
            fan_control_id: id.to_string(),
            use_fahrenheit: self.model.use_fahrenheit,
            temperature: self.inventory.read_temperature(&self.model, id),
            rpm: self.inventory.read_rpm(&self.model, id),
            pwm_duty: self.inventory.read_pwm(&self.model, id),
            alarm_status: self.inventory.read_alarms(&self.model, id),
        })
    }

    pub fn read_temperature(&self, fan_id: &str) -> f64 {
        self.inventory.read_temperature(&self.model, fan_id)
    }

    pub fn read_alarms(&self, fan_id: &str) -> String {
        self.inventory.read_alarms(&self.model, fan_id)
    }

    /// Live device for one hwmon id
    pub fn device(&self, hwmon: &str) -> Option<Device> {
        self.inventory.device(hwmon)
    }

    pub fn temperature_sensors(&self) -> BTreeMap<String, String> {
        self.inventory.temperature_sensors(&self.model)
    }

    pub fn fan_inputs(&self) -> BTreeMap<String, String> {
        self.inventory.fan_inputs(&self.model)
    }

    pub fn pwm_outputs(&self) -> BTreeMap<String, String> {
        self.inventory.pwm_outputs(&self.model)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Apply a partial update. Either every change is applied or, on any
    /// schema violation, none is and the model is left as it was.
    pub fn apply_update(&mut self, overlay: &Value) -> std::result::Result<DirtyMask, UpdateRejected> {
        let overlay = Overlay::decode(overlay).map_err(Self::reject)?;
        let mut next = self.model.clone();
        let mask = self.apply_to(&mut next, &overlay).map_err(Self::reject)?;
        self.model = next;
        info!(mask = mask.bits(), "Applied settings update");
        Ok(mask)
    }

    fn reject(reason: String) -> UpdateRejected {
        warn!(reason = %reason, "Rejected settings update");
        UpdateRejected::new(reason)
    }

    fn apply_to(&self, model: &mut UnifiedModel, overlay: &Overlay) -> std::result::Result<DirtyMask, String> {
        let mut mask = DirtyMask::NONE;

        // Unit first, so thresholds in the same overlay use the new unit.
        if let Some(flag) = overlay.use_fahrenheit {
            if flag != model.use_fahrenheit {
                let (from, to) = (model.temp_unit(), TempUnit::from_fahrenheit_flag(flag));
                for fan in model.fans.values_mut() {
                    fan.min_temp = fan.min_temp.map(|t| to.to_display(from.to_celsius(t)));
                    fan.max_temp = fan.max_temp.map(|t| to.to_display(from.to_celsius(t)));
                }
                model.use_fahrenheit = flag;
                mask |= DirtyMask::PREFERENCES;
            }
        }
        if let Some(fan) = &overlay.default_logger_fan {
            let fan = fan.clone().filter(|id| !id.is_empty());
            if set_if_changed(&mut model.default_logger_fan, fan) {
                mask |= DirtyMask::PREFERENCES;
            }
        }
        if let Some(interval) = overlay.logger_interval_seconds {
            if set_if_changed(&mut model.logger_interval_seconds, interval) {
                mask |= DirtyMask::PREFERENCES;
            }
        }
        if let Some(names) = &overlay.display_names {
            if let Some(unknown) = names.keys().find(|key| !model.fans.keys().any(|id| names_key(id) == **key)) {
                return Err(format!("displayNames key {} matches no fan control", unknown));
            }
            for (id, fan) in model.fans.iter_mut() {
                let name = names.get(&names_key(id)).cloned().unwrap_or_default();
                if set_if_changed(&mut fan.display_name, name) {
                    mask |= DirtyMask::PREFERENCES;
                }
            }
        }
        if let Some(interval) = overlay.interval_seconds {
            if set_if_changed(&mut model.interval_seconds, interval) {
                mask |= DirtyMask::CONTROL;
            }
        }

        for (id, patch) in overlay.devices.iter().flatten() {
            mask |= Self::apply_device(model, id, patch)?;
        }
        for (id, patch) in overlay.fans.iter().flatten() {
            mask |= self.apply_fan(model, id, patch)?;
        }
        Ok(mask)
    }

    fn apply_device(model: &mut UnifiedModel, id: &str, patch: &DevicePatch) -> std::result::Result<DirtyMask, String> {
        patch.check(id)?;
        let mut changed = false;
        match model.devices.get_mut(id) {
            Some(device) => {
                if let Some(path) = &patch.sysfs_relative_path {
                    changed |= set_if_changed(&mut device.sysfs_relative_path, Some(path.clone()));
                }
                if let Some(name) = &patch.display_name {
                    changed |= set_if_changed(&mut device.display_name, Some(name.clone()));
                }
            }
            None => {
                patch.check_new(id)?;
                let device = Device {
                    sysfs_relative_path: patch.sysfs_relative_path.clone(),
                    display_name: patch.display_name.clone(),
                };
                debug!(device = id, "Registering device");
                model.devices.insert(id.to_string(), device);
                changed = true;
            }
        }
        Ok(if changed { DirtyMask::CONTROL } else { DirtyMask::NONE })
    }

    fn apply_fan(&self, model: &mut UnifiedModel, id: &str, patch: &FanPatch) -> std::result::Result<DirtyMask, String> {
        patch.check(id)?;
        let mut mask = DirtyMask::NONE;

        let Some(fan) = model.fans.get_mut(id) else {
            patch.check_new(id)?;
            let fan = FanControl {
                temp_input_ref: patch.temp_input_ref.clone(),
                fan_input_ref: patch.fan_input_ref.clone(),
                min_temp: patch.min_temp,
                max_temp: patch.max_temp,
                min_start: patch.min_start,
                min_stop: patch.min_stop,
                min_pwm: patch.min_pwm.flatten(),
                max_pwm: patch.max_pwm.flatten(),
                display_name: patch.display_name.clone().unwrap_or_default(),
            };
            if !fan.display_name.is_empty() {
                mask |= DirtyMask::PREFERENCES;
            }
            model.fans.insert(id.to_string(), fan);

            let hwmon = hwmon_of(id);
            if !model.devices.contains_key(hwmon) {
                let device = self.inventory.device(hwmon).unwrap_or_default();
                debug!(device = hwmon, path = ?device.sysfs_relative_path, "Adding device for new fan control");
                model.devices.insert(hwmon.to_string(), device);
            }
            info!(fan = id, "Registered fan control");
            return Ok(mask | DirtyMask::CONTROL);
        };

        let mut control = false;
        if let Some(v) = &patch.temp_input_ref {
            control |= set_if_changed(&mut fan.temp_input_ref, Some(v.clone()));
        }
        if let Some(v) = &patch.fan_input_ref {
            control |= set_if_changed(&mut fan.fan_input_ref, Some(v.clone()));
        }
        if let Some(v) = patch.min_temp {
            control |= set_if_changed(&mut fan.min_temp, Some(v));
        }
        if let Some(v) = patch.max_temp {
            control |= set_if_changed(&mut fan.max_temp, Some(v));
        }
        if let Some(v) = patch.min_start {
            control |= set_if_changed(&mut fan.min_start, Some(v));
        }
        if let Some(v) = patch.min_stop {
            control |= set_if_changed(&mut fan.min_stop, Some(v));
        }
        if let Some(v) = patch.min_pwm {
            control |= set_if_changed(&mut fan.min_pwm, v);
        }
        if let Some(v) = patch.max_pwm {
            control |= set_if_changed(&mut fan.max_pwm, v);
        }
        if control {
            mask |= DirtyMask::CONTROL;
        }
        if let Some(name) = &patch.display_name {
            if set_if_changed(&mut fan.display_name, name.clone()) {
                mask |= DirtyMask::PREFERENCES;
            }
        }
        Ok(mask)
    }

    /// Remove a fan control. The names table is dirty too when the fan had
    /// a display name; an unknown id changes nothing.
    pub fn delete_fan(&mut self, fan_id: &str) -> DirtyMask {
        let Some(removed) = self.model.fans.shift_remove(fan_id) else {
            debug!(fan = fan_id, "Delete of unknown fan control");
            return DirtyMask::NONE;
        };
        info!(fan = fan_id, "Removed fan control");
        if removed.display_name.is_empty() {
            DirtyMask::CONTROL
        } else {
            DirtyMask::CONTROL | DirtyMask::PREFERENCES
        }
    }

    /// Write back the stores flagged in `mask`.
    pub fn persist(&self, mask: DirtyMask) -> Result<()> {
        if mask.contains(DirtyMask::PREFERENCES) {
            self.preferences.save(&self.model.global_settings())?;
            info!(path = %self.preferences.path().display(), "Saved preferences");
        }
        if mask.contains(DirtyMask::CONTROL) {
            self.control.save(&self.model, &self.comments)?;
            info!(path = %self.control.path().display(), "Saved fancontrol file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeSystem, CONTROL_SCENARIO};
    use fc_error::FanConfigError;
    use serde_json::json;

    fn scenario() -> (FakeSystem, MergeEngine) {
        let (system, _) = FakeSystem::with_scenario();
        let engine = MergeEngine::load(system.paths()).unwrap();
        (system, engine)
    }

    fn new_fan(hwmon: &str) -> Value {
        json!({"fans": {format!("{}/pwm2", hwmon): {
            "tempInputRef": format!("{}/temp2_input", hwmon),
            "fanInputRef": format!("{}/fan2_input", hwmon),
            "minTemp": 35,
            "maxTemp": 65,
            "minStart": 120,
            "minStop": 80,
            "displayName": "Case"
        }}})
    }

    #[test]
    fn loads_scenario() {
        let (_system, engine) = scenario();
        let controls = engine.enumerate_fan_controls();
        assert_eq!(controls.len(), 1);
        let info = &controls["hwmon0/pwm1"];
        assert_eq!(info.device, "coretemp");
        assert_eq!(info.name, "coretemp:hwmon0/pwm1");
        assert!(!info.default);

        let fan = &engine.model().fans["hwmon0/pwm1"];
        assert_eq!(fan.min_temp, Some(40.0));
        assert_eq!(fan.max_temp, Some(60.0));
        assert_eq!(fan.min_start, Some(150));
        assert_eq!(fan.min_stop, Some(100));
        assert_eq!(engine.model().interval_seconds, 0);
        assert_eq!(engine.default_fan(), Some("hwmon0/pwm1"));
    }

    #[test]
    fn scenario_updates() {
        let (_system, mut engine) = scenario();

        let mask = engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"maxTemp": 70}}})).unwrap();
        assert_eq!(mask.bits(), 2);
        assert_eq!(engine.model().fans["hwmon0/pwm1"].max_temp, Some(70.0));

        let before = engine.model().clone();
        let rejected = engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"bogus": 1}}})).unwrap_err();
        assert_eq!(rejected.code(), -1);
        assert_eq!(engine.model(), &before);
    }

    #[test]
    fn invalid_overlay_leaves_model_untouched() {
        let (_system, mut engine) = scenario();
        let before = engine.model().clone();

        // valid changes ahead of the bad sub-key must not stick
        let overlay = json!({
            "useFahrenheit": true,
            "intervalSeconds": 5,
            "fans": {"hwmon0/pwm1": {"maxTemp": 80}},
            "devices": {"hwmon0": {"driver": "x"}}
        });
        assert!(engine.apply_update(&overlay).is_err());
        assert_eq!(engine.model(), &before);
    }

    #[test]
    fn unchanged_values_are_not_dirty() {
        let (_system, mut engine) = scenario();
        let mask = engine
            .apply_update(&json!({"useFahrenheit": false, "fans": {"hwmon0/pwm1": {"minTemp": 40}}}))
            .unwrap();
        assert!(mask.is_empty());

        let mask = engine.apply_update(&json!({"loggerIntervalSeconds": 30, "intervalSeconds": 10})).unwrap();
        assert_eq!(mask.bits(), 3);
    }

    #[test]
    fn new_fan_needs_every_mandatory_field() {
        let (_system, mut engine) = scenario();
        let mut overlay = new_fan("hwmon0");
        overlay["fans"]["hwmon0/pwm2"].as_object_mut().unwrap().remove("minTemp");

        assert!(engine.apply_update(&overlay).is_err());
        assert!(!engine.model().fans.contains_key("hwmon0/pwm2"));
    }

    #[test]
    fn new_fan_registers_live_device() {
        let (system, mut engine) = scenario();
        system.add_device("hwmon1", "devices/platform/nct6775.656", "nct6775");

        let mask = engine.apply_update(&new_fan("hwmon1")).unwrap();
        assert_eq!(mask.bits(), 3);
        assert_eq!(
            engine.model().devices["hwmon1"],
            Device::new("devices/platform/nct6775.656", "nct6775")
        );
        let fan = &engine.model().fans["hwmon1/pwm2"];
        assert_eq!(fan.display_name, "Case");
        assert_eq!(fan.min_pwm, None);
        assert_eq!(engine.model().fans.keys().last().map(String::as_str), Some("hwmon1/pwm2"));
    }

    #[test]
    fn new_fan_on_unknown_hwmon_gets_empty_device() {
        let (_system, mut engine) = scenario();
        engine.apply_update(&new_fan("hwmon5")).unwrap();
        assert_eq!(engine.model().devices["hwmon5"], Device::default());
    }

    #[test]
    fn devices_validate_sub_keys() {
        let (_system, mut engine) = scenario();

        assert!(engine.apply_update(&json!({"devices": {"hwmon3": {"displayName": "it87"}}})).is_err());
        let mask = engine
            .apply_update(&json!({"devices": {"hwmon3": {"sysfsRelativePath": "devices/platform/it87.656", "displayName": "it87"}}}))
            .unwrap();
        assert_eq!(mask, DirtyMask::CONTROL);
        assert!(engine
            .apply_update(&json!({"devices": {"hwmon3": {"displayName": "it 87"}}}))
            .is_err());
    }

    #[test]
    fn optional_pwm_limits_set_and_delete() {
        let (_system, mut engine) = scenario();
        assert_eq!(
            engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"minPwm": 30, "maxPwm": 255}}})).unwrap(),
            DirtyMask::CONTROL
        );
        assert_eq!(engine.model().fans["hwmon0/pwm1"].min_pwm, Some(30));

        engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"minPwm": null}}})).unwrap();
        let fan = &engine.model().fans["hwmon0/pwm1"];
        assert_eq!(fan.min_pwm, None);
        assert_eq!(fan.max_pwm, Some(255));
    }

    #[test]
    fn display_names() {
        let (_system, mut engine) = scenario();
        let mask = engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"displayName": "CPU"}}})).unwrap();
        assert_eq!(mask, DirtyMask::PREFERENCES);
        assert_eq!(engine.enumerate_fan_controls()["hwmon0/pwm1"].name, "CPU");

        let mask = engine.apply_update(&json!({"displayNames": {}})).unwrap();
        assert_eq!(mask, DirtyMask::PREFERENCES);
        assert_eq!(engine.model().fans["hwmon0/pwm1"].display_name, "");

        assert!(engine.apply_update(&json!({"displayNames": {"hwmon9_pwm1": "x"}})).is_err());
    }

    #[test]
    fn fahrenheit_flip_reexpresses_thresholds() {
        let (system, mut engine) = scenario();
        let mask = engine.apply_update(&json!({"useFahrenheit": true})).unwrap();
        assert_eq!(mask, DirtyMask::PREFERENCES);
        let fan = &engine.model().fans["hwmon0/pwm1"];
        assert_eq!(fan.min_temp, Some(104.0));
        assert_eq!(fan.max_temp, Some(140.0));

        engine.apply_update(&json!({"fans": {"hwmon0/pwm1": {"maxTemp": 158}}})).unwrap();
        engine.persist(DirtyMask::CONTROL | DirtyMask::PREFERENCES).unwrap();
        let text = system.read_control();
        assert!(text.contains("MINTEMP=hwmon0/pwm1=40\n"));
        assert!(text.contains("MAXTEMP=hwmon0/pwm1=70\n"));

        engine.reload().unwrap();
        assert!(engine.model().use_fahrenheit);
        assert_eq!(engine.model().fans["hwmon0/pwm1"].max_temp, Some(158.0));
        assert_eq!(engine.query_sample(None).unwrap().temperature, 113.0);
    }

    #[test]
    fn delete_fan_masks() {
        let (system, mut engine) = scenario();
        system.add_device("hwmon1", "devices/platform/nct6775.656", "nct6775");
        engine.apply_update(&new_fan("hwmon1")).unwrap();

        assert_eq!(engine.delete_fan("hwmon1/pwm2"), DirtyMask::CONTROL | DirtyMask::PREFERENCES);
        assert_eq!(engine.delete_fan("hwmon0/pwm1"), DirtyMask::CONTROL);
        assert_eq!(engine.delete_fan("hwmon0/pwm1"), DirtyMask::NONE);
        assert!(engine.model().fans.is_empty());
        assert_eq!(engine.default_fan(), None);
        assert_eq!(engine.query_sample(None), None);
    }

    #[test]
    fn persist_round_trips_through_both_stores() {
        let (system, mut engine) = scenario();
        let mask = engine
            .apply_update(&json!({
                "defaultLoggerFan": "hwmon0/pwm1",
                "intervalSeconds": 10,
                "fans": {"hwmon0/pwm1": {"displayName": "CPU", "maxPwm": 200}}
            }))
            .unwrap();
        engine.persist(mask).unwrap();

        let control = system.read_control();
        assert!(control.starts_with("# Configuration file generated by pwmconfig\nINTERVAL=10\n"));
        assert!(control.contains("MAXPWM=hwmon0/pwm1=200"));
        let prefs = system.read_preferences();
        assert!(prefs.contains("fixture comment"));
        assert!(prefs.contains("<hwmon0_pwm1>CPU</hwmon0_pwm1>"));

        let reloaded = MergeEngine::load(system.paths()).unwrap();
        assert_eq!(reloaded.model(), engine.model());
        assert!(reloaded.enumerate_fan_controls()["hwmon0/pwm1"].default);
    }

    #[test]
    fn failed_persist_reports_write_error_and_keeps_model() {
        let (system, mut engine) = scenario();
        let mask = engine
            .apply_update(&json!({
                "intervalSeconds": 5,
                "fans": {"hwmon0/pwm1": {"displayName": "CPU"}}
            }))
            .unwrap();
        assert_eq!(mask, DirtyMask::PREFERENCES | DirtyMask::CONTROL);
        let expected = engine.model().clone();

        let etc = system.root().join("etc");
        std::fs::remove_dir_all(&etc).unwrap();
        let err = engine.persist(mask).unwrap_err();
        assert!(matches!(
            err,
            FanConfigError::FileWrite { .. } | FanConfigError::PermissionDenied(_)
        ));
        assert_eq!(engine.model(), &expected);
        assert!(!etc.exists());

        std::fs::create_dir_all(&etc).unwrap();
        engine.persist(mask).unwrap();
        let reloaded = MergeEngine::load(system.paths()).unwrap();
        assert_eq!(reloaded.model(), &expected);
    }

    #[test]
    fn fan_ids_that_cannot_be_names_keys_are_rejected() {
        let (system, mut engine) = scenario();
        let before = engine.model().clone();
        let err = engine
            .apply_update(&json!({"fans": {"hwmon0/pwm<2>": {
                "tempInputRef": "hwmon0/temp1_input",
                "fanInputRef": "hwmon0/fan1_input",
                "minTemp": 35,
                "maxTemp": 65,
                "minStart": 120,
                "minStop": 80,
                "displayName": "Case"
            }}}))
            .unwrap_err();
        assert_eq!(err.code(), -1);
        assert_eq!(engine.model(), &before);
        assert!(!system.read_preferences().contains("pwm<2>"));
    }

    #[test]
    fn samples_and_listings() {
        let (_system, engine) = scenario();
        let sample = engine.query_sample(None).unwrap();
        assert_eq!(sample.fan_control_id, "hwmon0/pwm1");
        assert!(!sample.use_fahrenheit);
        assert_eq!(sample.temperature, 45.0);
        assert_eq!(sample.rpm, 1200);
        assert_eq!(sample.pwm_duty, 128);
        assert_eq!(sample.alarm_status, "Ok");

        let unknown = engine.query_sample(Some("hwmon4/pwm1")).unwrap();
        assert_eq!(unknown.temperature, 0.0);
        assert_eq!(unknown.rpm, 0);

        assert_eq!(engine.temperature_sensors()["hwmon0/temp1_input"], "coretemp:Package id 0");
        assert_eq!(engine.fan_inputs()["hwmon0/fan1_input"], "coretemp:fan1");
        assert_eq!(engine.pwm_outputs()["hwmon0/pwm1"], "coretemp:pwm1");
        assert_eq!(engine.device("hwmon0").unwrap().name(), "coretemp");
    }

    #[test]
    fn missing_control_file_is_fatal() {
        let system = FakeSystem::new();
        let err = MergeEngine::load(system.paths()).unwrap_err();
        assert!(matches!(err, FanConfigError::ControlFileMissing(_)));
        // preferences were created on the way
        assert!(system.read_preferences().contains("<loggerinterval>60</loggerinterval>"));
    }

    #[test]
    fn malformed_preferences_are_fatal() {
        let system = FakeSystem::new();
        system.write_control(CONTROL_SCENARIO);
        system.write_preferences("<settings><farenheit>true</settings>");
        let err = MergeEngine::load(system.paths()).unwrap_err();
        assert!(matches!(err, FanConfigError::PreferencesParse { .. }));
    }

    #[test]
    fn failed_reload_keeps_model() {
        let (system, mut engine) = scenario();
        let before = engine.model().clone();
        std::fs::remove_file(system.paths().control_file).unwrap();
        assert!(engine.reload().is_err());
        assert_eq!(engine.model(), &before);
    }

    #[test]
    fn legacy_layout_uses_stored_devpaths() {
        let system = FakeSystem::legacy();
        let dir = system.add_legacy_device("hwmon0", "devices/platform/coretemp.0");
        system.set_attr(&dir, "temp1_input", "47000");
        system.set_attr(&dir, "fan1_input", "700");
        system.write_control(&format!("DEVPATH=hwmon0=devices/platform/coretemp.0\n{}", CONTROL_SCENARIO));
        system.write_preferences(crate::test_utils::PREFERENCES_CELSIUS);

        let engine = MergeEngine::load(system.paths()).unwrap();
        assert!(engine.inventory().enumerate_devices().is_empty());
        let sample = engine.query_sample(None).unwrap();
        assert_eq!(sample.temperature, 47.0);
        assert_eq!(sample.rpm, 700);
        assert_eq!(engine.enumerate_fan_controls()["hwmon0/pwm1"].device, "");
    }
}
