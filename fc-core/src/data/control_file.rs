//! Legacy fancontrol control file
//!
//! Line grammar is `KEY=token token ...` with tokens `id=value`, e.g.
//!
//! ```text
//! # Configuration file generated by pwmconfig
//! INTERVAL=10
//! DEVPATH=hwmon0=devices/platform/coretemp.0
//! FCTEMPS=hwmon0/pwm1=hwmon0/temp1_input
//! MINTEMP=hwmon0/pwm1=40
//! ```
//!
//! Temperatures are Celsius on disk and converted to the active display unit
//! while parsing, so the preferences must be loaded first.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::attribute::Scalar;
use crate::constants::control::*;
use crate::data::write_atomic;
use crate::data::{Device, FanControl, UnifiedModel};
use crate::display::{format_number, TempUnit};
use fc_error::{FanConfigError, Result};

/// Everything the control file contributes to the unified model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlFragment {
    pub interval_seconds: i64,
    pub devices: IndexMap<String, Device>,
    pub fans: IndexMap<String, FanControl>,
    /// Comment lines, kept verbatim for the next write
    pub comments: Vec<String>,
}

/// Parse control file text. Malformed lines and tokens are skipped.
pub fn parse(text: &str, unit: TempUnit) -> ControlFragment {
    let mut fragment = ControlFragment::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(COMMENT) {
            fragment.comments.push(line.to_string());
            continue;
        }
        let Some((key, rest)) = line.split_once('=') else {
            debug!(line, "ignoring line without key");
            continue;
        };

        match key {
            INTERVAL => match rest.trim().parse::<i64>() {
                Ok(v) => fragment.interval_seconds = v,
                Err(_) => warn!(value = rest, "skipping malformed INTERVAL"),
            },
            DEVPATH => for_each_token(key, rest, |id, value| {
                fragment.devices.entry(id.to_string()).or_default().sysfs_relative_path =
                    Some(value.to_string());
                true
            }),
            DEVNAME => for_each_token(key, rest, |id, value| {
                fragment.devices.entry(id.to_string()).or_default().display_name =
                    Some(value.to_string());
                true
            }),
            FCTEMPS => for_each_token(key, rest, |id, value| {
                fan_entry(&mut fragment.fans, id).temp_input_ref = Some(value.to_string());
                true
            }),
            FCFANS => for_each_token(key, rest, |id, value| {
                fan_entry(&mut fragment.fans, id).fan_input_ref = Some(value.to_string());
                true
            }),
            MINTEMP | MAXTEMP => for_each_token(key, rest, |id, value| {
                let Some(celsius) = Scalar::parse(value).as_f64() else {
                    return false;
                };
                let fan = fan_entry(&mut fragment.fans, id);
                let display = Some(unit.to_display(celsius));
                if key == MINTEMP {
                    fan.min_temp = display;
                } else {
                    fan.max_temp = display;
                }
                true
            }),
            MINSTART | MINSTOP | MINPWM | MAXPWM => for_each_token(key, rest, |id, value| {
                let Some(raw) = Scalar::parse(value).as_i64() else {
                    return false;
                };
                let fan = fan_entry(&mut fragment.fans, id);
                let slot = match key {
                    MINSTART => &mut fan.min_start,
                    MINSTOP => &mut fan.min_stop,
                    MINPWM => &mut fan.min_pwm,
                    _ => &mut fan.max_pwm,
                };
                *slot = Some(raw);
                true
            }),
            _ => debug!(key, "ignoring unrecognized key"),
        }
    }

    fragment
}

fn fan_entry<'a>(fans: &'a mut IndexMap<String, FanControl>, id: &str) -> &'a mut FanControl {
    fans.entry(id.to_string()).or_default()
}

// Calls `apply` for every `id=value` token; `apply` returns false when the
// value does not fit the key.
fn for_each_token(key: &str, rest: &str, mut apply: impl FnMut(&str, &str) -> bool) {
    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some((id, value)) if !id.is_empty() => {
                if !apply(id, value) {
                    warn!(key, token, "skipping malformed value");
                }
            }
            _ => warn!(key, token, "skipping malformed token"),
        }
    }
}

/// Serialize the control-file part of the model.
///
/// Comments come first, then one line per key in fixed order. A multi-entry
/// key is only written when at least one entry supplies it. Thresholds are
/// converted back to Celsius.
pub fn serialize(model: &UnifiedModel, comments: &[String]) -> String {
    let unit = model.temp_unit();
    let mut lines: Vec<String> = comments.to_vec();

    lines.push(format!("{}={}", INTERVAL, model.interval_seconds));

    push_line(&mut lines, DEVPATH, model.devices.iter().filter_map(|(id, d)| {
        d.sysfs_relative_path.as_ref().map(|v| (id, v.clone()))
    }));
    push_line(&mut lines, DEVNAME, model.devices.iter().filter_map(|(id, d)| {
        d.display_name.as_ref().map(|v| (id, v.clone()))
    }));

    let fans = &model.fans;
    push_line(&mut lines, FCTEMPS, fans.iter().filter_map(|(id, f)| {
        f.temp_input_ref.as_ref().map(|v| (id, v.clone()))
    }));
    push_line(&mut lines, FCFANS, fans.iter().filter_map(|(id, f)| {
        f.fan_input_ref.as_ref().map(|v| (id, v.clone()))
    }));
    push_line(&mut lines, MINTEMP, fans.iter().filter_map(|(id, f)| {
        f.min_temp.map(|v| (id, format_number(unit.to_celsius(v))))
    }));
    push_line(&mut lines, MAXTEMP, fans.iter().filter_map(|(id, f)| {
        f.max_temp.map(|v| (id, format_number(unit.to_celsius(v))))
    }));
    push_line(&mut lines, MINSTART, fans.iter().filter_map(|(id, f)| {
        f.min_start.map(|v| (id, v.to_string()))
    }));
    push_line(&mut lines, MINSTOP, fans.iter().filter_map(|(id, f)| {
        f.min_stop.map(|v| (id, v.to_string()))
    }));
    push_line(&mut lines, MINPWM, fans.iter().filter_map(|(id, f)| {
        f.min_pwm.map(|v| (id, v.to_string()))
    }));
    push_line(&mut lines, MAXPWM, fans.iter().filter_map(|(id, f)| {
        f.max_pwm.map(|v| (id, v.to_string()))
    }));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_line<'a>(lines: &mut Vec<String>, key: &str, tokens: impl Iterator<Item = (&'a String, String)>) {
    let tokens: Vec<String> = tokens.map(|(id, value)| format!("{}={}", id, value)).collect();
    if !tokens.is_empty() {
        lines.push(format!("{}={}", key, tokens.join(" ")));
    }
}

/// The control file on disk
#[derive(Debug, Clone)]
pub struct ControlFileStore {
    path: PathBuf,
}

impl ControlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the file. A missing file is fatal for the caller.
    pub fn load(&self, unit: TempUnit) -> Result<ControlFragment> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FanConfigError::ControlFileMissing(self.path.clone()),
            _ => FanConfigError::ControlFileRead { path: self.path.clone(), source: e },
        })?;
        let fragment = parse(&text, unit);
        debug!(
            path = %self.path.display(),
            devices = fragment.devices.len(),
            fans = fragment.fans.len(),
            "Parsed control file"
        );
        Ok(fragment)
    }

    /// Rewrite the file from the model, keeping `comments` at the top.
    pub fn save(&self, model: &UnifiedModel, comments: &[String]) -> Result<()> {
        write_atomic(&self.path, serialize(model, comments).as_bytes())
    }
}
