/*
 * This file is part of fancontrol-cfg.
 *
 * Copyright (C) 2025 fancontrol-cfg contributors
 *
 * fancontrol-cfg is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * fancontrol-cfg is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with fancontrol-cfg. If not, see <https://www.gnu.org/licenses/>.
 */

//! File locations: command line flag, then environment, then the system default

use std::env;
use std::path::PathBuf;

use clap::Args;
use fc_core::FanConfigPaths;

pub const ENV_CONTROL_FILE: &str = "FANCONTROL_FILE";
pub const ENV_PREFERENCES: &str = "FANCONTROL_PREFERENCES";
pub const ENV_HWMON_ROOT: &str = "FANCONTROL_HWMON_ROOT";
pub const ENV_SYS_ROOT: &str = "FANCONTROL_SYS_ROOT";

/// Path flags shared by every subcommand
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    /// fancontrol control file [env: FANCONTROL_FILE] [default: /etc/fancontrol]
    #[arg(long, global = true, value_name = "FILE")]
    pub control_file: Option<PathBuf>,

    /// XML preferences file [env: FANCONTROL_PREFERENCES] [default: /etc/fancontrol.xml]
    #[arg(long, global = true, value_name = "FILE")]
    pub preferences: Option<PathBuf>,

    /// hwmon class root [env: FANCONTROL_HWMON_ROOT] [default: /sys/class/hwmon]
    #[arg(long, global = true, value_name = "DIR")]
    pub hwmon_root: Option<PathBuf>,

    /// sysfs root for the legacy layout [env: FANCONTROL_SYS_ROOT] [default: /sys]
    #[arg(long, global = true, value_name = "DIR")]
    pub sys_root: Option<PathBuf>,
}

fn pick(flag: &Option<PathBuf>, var: &str, default: PathBuf) -> PathBuf {
    flag.clone()
        .or_else(|| env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or(default)
}

/// Resolve every location
pub fn resolve_paths(overrides: &PathOverrides) -> FanConfigPaths {
    let defaults = FanConfigPaths::default();
    FanConfigPaths {
        control_file: pick(&overrides.control_file, ENV_CONTROL_FILE, defaults.control_file),
        preferences_file: pick(&overrides.preferences, ENV_PREFERENCES, defaults.preferences_file),
        hwmon_root: pick(&overrides.hwmon_root, ENV_HWMON_ROOT, defaults.hwmon_root),
        sys_root: pick(&overrides.sys_root, ENV_SYS_ROOT, defaults.sys_root),
    }
}
