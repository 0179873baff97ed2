//! Point reads for one fan control
//!
//! Every read degrades to zero or empty when the attribute is unavailable.

use std::path::{Path, PathBuf};

use crate::attribute::{read_attribute, Scalar};
use crate::constants::alarms;
use crate::constants::temperature::MILLIDEGREES_PER_DEGREE;
use crate::data::UnifiedModel;
use crate::hw::hardware::HardwareInventory;
use crate::hw::location::Locate;

/// Combine the three alarm flags into the status text.
pub fn alarm_status(temp_alarm: bool, temp_crit: bool, fan_alarm: bool) -> String {
    let phrases: Vec<&str> = [
        (temp_alarm, alarms::TEMPERATURE),
        (temp_crit, alarms::TEMPERATURE_CRITICAL),
        (fan_alarm, alarms::FAN),
    ]
    .into_iter()
    .filter_map(|(set, phrase)| set.then_some(phrase))
    .collect();

    if phrases.is_empty() {
        alarms::OK.to_string()
    } else {
        phrases.join(alarms::SEPARATOR)
    }
}

// `<dir>/temp1_input` -> `<dir>/temp1<suffix>`
fn sibling_alarm(input: &Path, suffix: &str) -> Option<PathBuf> {
    let leaf = input.file_name()?.to_str()?;
    let (base, _) = leaf.rsplit_once('_')?;
    Some(input.with_file_name(format!("{}{}", base, suffix)))
}

fn flag_set(path: Option<PathBuf>) -> bool {
    path.and_then(|p| read_attribute(&p)).is_some_and(|v| v.is_truthy())
}

impl HardwareInventory {
    fn read_at(&self, model: &UnifiedModel, what: Locate<'_>) -> Option<Scalar> {
        read_attribute(&self.resolve_location(model, what)?)
    }

    /// Temperature of the fan's input in the active display unit
    pub fn read_temperature(&self, model: &UnifiedModel, fan_id: &str) -> f64 {
        self.read_at(model, Locate::Temp(fan_id))
            .and_then(|v| v.as_f64())
            .map(|milli| model.temp_unit().to_display(milli / MILLIDEGREES_PER_DEGREE))
            .unwrap_or(0.0)
    }

    /// Fan speed in RPM
    pub fn read_rpm(&self, model: &UnifiedModel, fan_id: &str) -> i64 {
        self.read_at(model, Locate::Fan(fan_id))
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Current PWM duty (the fan-control id is itself the pwm attribute)
    pub fn read_pwm(&self, model: &UnifiedModel, fan_id: &str) -> i64 {
        self.read_at(model, Locate::Attribute(fan_id))
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
    }

    /// Alarm status text for the fan's temperature and tachometer inputs
    pub fn read_alarms(&self, model: &UnifiedModel, fan_id: &str) -> String {
        let temp = self.resolve_location(model, Locate::Temp(fan_id));
        let fan = self.resolve_location(model, Locate::Fan(fan_id));

        let temp_alarm = flag_set(temp.as_deref().and_then(|p| sibling_alarm(p, alarms::ALARM_SUFFIX)));
        let temp_crit = flag_set(temp.as_deref().and_then(|p| sibling_alarm(p, alarms::CRIT_ALARM_SUFFIX)));
        let fan_alarm = flag_set(fan.as_deref().and_then(|p| sibling_alarm(p, alarms::ALARM_SUFFIX)));

        alarm_status(temp_alarm, temp_crit, fan_alarm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Device, FanControl};
    use crate::test_utils::FakeSystem;

    fn scenario_model(use_fahrenheit: bool) -> UnifiedModel {
        let mut model = UnifiedModel { use_fahrenheit, ..Default::default() };
        model.devices.insert("hwmon0".into(), Device::new("devices/platform/coretemp.0", "coretemp"));
        model.fans.insert(
            "hwmon0/pwm1".into(),
            FanControl {
                temp_input_ref: Some("hwmon0/temp1_input".into()),
                fan_input_ref: Some("hwmon0/fan1_input".into()),
                ..Default::default()
            },
        );
        model
    }

    #[test]
    fn all_alarm_combinations() {
        let cases = [
            ((false, false, false), "Ok"),
            ((true, false, false), "Temperature alarm"),
            ((false, true, false), "Temperature critical"),
            ((false, false, true), "Fan alarm"),
            ((true, true, false), "Temperature alarm & Temperature critical"),
            ((true, false, true), "Temperature alarm & Fan alarm"),
            ((false, true, true), "Temperature critical & Fan alarm"),
            ((true, true, true), "Temperature alarm & Temperature critical & Fan alarm"),
        ];
        for ((t, c, f), expected) in cases {
            assert_eq!(alarm_status(t, c, f), expected, "flags {:?}", (t, c, f));
        }
    }

    #[test]
    fn reads_scenario_values() {
        let (system, _) = FakeSystem::with_scenario();
        let inv = HardwareInventory::new(system.hwmon_root(), system.sys_root());

        let celsius = scenario_model(false);
        assert_eq!(inv.read_temperature(&celsius, "hwmon0/pwm1"), 45.0);
        assert_eq!(inv.read_rpm(&celsius, "hwmon0/pwm1"), 1200);
        assert_eq!(inv.read_pwm(&celsius, "hwmon0/pwm1"), 128);
        assert_eq!(inv.read_alarms(&celsius, "hwmon0/pwm1"), "Ok");

        let fahrenheit = scenario_model(true);
        assert_eq!(inv.read_temperature(&fahrenheit, "hwmon0/pwm1"), 113.0);
    }

    #[test]
    fn reads_alarm_siblings() {
        let (system, hwmon0) = FakeSystem::with_scenario();
        system.set_attr(&hwmon0, "temp1_alarm", "0");
        system.set_attr(&hwmon0, "temp1_crit_alarm", "1");
        system.set_attr(&hwmon0, "fan1_alarm", "1");
        let inv = HardwareInventory::new(system.hwmon_root(), system.sys_root());

        assert_eq!(
            inv.read_alarms(&scenario_model(false), "hwmon0/pwm1"),
            "Temperature critical & Fan alarm"
        );
    }

    #[test]
    fn missing_attributes_degrade() {
        let system = FakeSystem::new();
        let inv = HardwareInventory::new(system.hwmon_root(), system.sys_root());
        let model = scenario_model(false);

        assert_eq!(inv.read_temperature(&model, "hwmon0/pwm1"), 0.0);
        assert_eq!(inv.read_rpm(&model, "hwmon0/pwm1"), 0);
        assert_eq!(inv.read_pwm(&model, "hwmon0/pwm1"), 0);
        assert_eq!(inv.read_alarms(&model, "hwmon0/pwm1"), "Ok");
        assert_eq!(inv.read_temperature(&model, "hwmon7/pwm3"), 0.0);
    }

    #[test]
    fn legacy_layout_reads_through_devpath() {
        let system = FakeSystem::legacy();
        let dir = system.add_legacy_device("hwmon0", "devices/platform/coretemp.0");
        system.set_attr(&dir, "temp1_input", "52500");
        system.set_attr(&dir, "fan1_input", "800");
        let inv = HardwareInventory::new(system.hwmon_root(), system.sys_root());

        let model = scenario_model(false);
        assert_eq!(inv.read_temperature(&model, "hwmon0/pwm1"), 52.5);
        assert_eq!(inv.read_rpm(&model, "hwmon0/pwm1"), 800);
    }
}
