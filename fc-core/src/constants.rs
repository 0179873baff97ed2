//! Constants and configuration values for fancontrol-cfg
//!
//! Fixed file locations, on-disk names and the literal phrases reported to
//! callers. Add new magic values here rather than inline.

/// System paths
pub mod paths {
    /// Legacy fancontrol control file, written by pwmconfig
    pub const CONTROL_FILE: &str = "/etc/fancontrol";

    /// XML preferences file kept next to the control file
    pub const PREFERENCES_FILE: &str = "/etc/fancontrol.xml";

    /// Modern hwmon class root
    pub const HWMON_ROOT: &str = "/sys/class/hwmon";

    /// Generic sysfs root, used by the legacy layout and to relativize device paths
    pub const SYS_ROOT: &str = "/sys";

    /// Directory entries under the class root start with this prefix
    pub const HWMON_PREFIX: &str = "hwmon";
}

/// Control file keys, in the order they are written back
pub mod control {
    pub const INTERVAL: &str = "INTERVAL";
    pub const DEVPATH: &str = "DEVPATH";
    pub const DEVNAME: &str = "DEVNAME";
    pub const FCTEMPS: &str = "FCTEMPS";
    pub const FCFANS: &str = "FCFANS";
    pub const MINTEMP: &str = "MINTEMP";
    pub const MAXTEMP: &str = "MAXTEMP";
    pub const MINSTART: &str = "MINSTART";
    pub const MINSTOP: &str = "MINSTOP";
    pub const MINPWM: &str = "MINPWM";
    pub const MAXPWM: &str = "MAXPWM";

    /// Marker for comment lines
    pub const COMMENT: char = '#';
}

/// Preferences XML element names and defaults
pub mod preferences {
    pub const ROOT: &str = "settings";
    pub const FAHRENHEIT: &str = "farenheit";
    pub const LOGGER: &str = "logger";
    pub const LOGGER_INTERVAL: &str = "loggerinterval";
    pub const NAMES: &str = "names";

    /// Logger interval written into a freshly created preferences file
    pub const DEFAULT_LOGGER_INTERVAL: i64 = 60;

    /// Documentation comment for a freshly created preferences file
    pub const DEFAULT_COMMENT: &str = "This XML file describes the fancontrol configuration.\n            \
         This file is managed by fancontrol-cfg, edit at your own risk.";

    pub const ENCODING: &str = "utf-8";
}

/// Alarm phrases reported by the alarm read
pub mod alarms {
    pub const OK: &str = "Ok";
    pub const TEMPERATURE: &str = "Temperature alarm";
    pub const TEMPERATURE_CRITICAL: &str = "Temperature critical";
    pub const FAN: &str = "Fan alarm";
    pub const SEPARATOR: &str = " & ";

    pub const ALARM_SUFFIX: &str = "_alarm";
    pub const CRIT_ALARM_SUFFIX: &str = "_crit_alarm";
}

/// Temperature conversion
pub mod temperature {
    /// hwmon reports millidegrees Celsius
    pub const MILLIDEGREES_PER_DEGREE: f64 = 1000.0;

    pub const FAHRENHEIT_SCALE: f64 = 1.8;
    pub const FAHRENHEIT_OFFSET: f64 = 32.0;

    /// Values closer than this to an integer are treated as that integer
    pub const INTEGER_EPSILON: f64 = 1e-9;

    /// Fractional digits kept for thresholds written to the control file
    pub const DECIMAL_PLACES: i32 = 3;
}

/// Dirty mask bits
pub mod dirty {
    pub const PREFERENCES: i32 = 1;
    pub const CONTROL: i32 = 2;
    pub const REJECTED: i32 = -1;
}
