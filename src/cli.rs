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

//! Command Line Interface
//!
//! Every command prints one JSON document on stdout.

use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use fc_core::data::hwmon_of;
use fc_core::{DirtyMask, FanConfigError, MergeEngine};

use crate::config::{resolve_paths, PathOverrides};

const SERVICE: &str = "fancontrol";

#[derive(Parser, Debug)]
#[command(name = "fancontrol-cfg")]
#[command(version)]
#[command(about = "Configure the fancontrol daemon and inspect hwmon sensors")]
#[command(long_about = "Configure the fancontrol daemon and inspect hwmon sensors

Reads and writes the fancontrol control file and its XML preferences
companion, and resolves fan controls to hwmon attributes.

EXAMPLES:
    fancontrol-cfg                                Current values of the default fan
    fancontrol-cfg lst hwmon0/pwm1                Current values of one fan
    fancontrol-cfg get                            All settings as JSON
    fancontrol-cfg set '{\"useFahrenheit\": true}'  Change global settings
    fancontrol-cfg set hwmon0/pwm1 '{\"maxTemp\": 70}'
    fancontrol-cfg del hwmon0/pwm1                Remove a fan control

ENVIRONMENT VARIABLES:
    FANCONTROL_LOG=debug       Log filter (stderr)
    FANCONTROL_FILE            Control file location
    FANCONTROL_PREFERENCES     Preferences file location
    FANCONTROL_HWMON_ROOT      hwmon class root
    FANCONTROL_SYS_ROOT        sysfs root for the legacy layout

FILES:
    /etc/fancontrol            fancontrol control file
    /etc/fancontrol.xml        Display and logger preferences")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug logging on stderr (FANCONTROL_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub paths: PathOverrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Current temperature, RPM, PWM and alarms of a fan control (default)
    Lst {
        /// Fan control id, e.g. hwmon0/pwm1 (default fan when omitted)
        fan: Option<String>,
    },
    /// All settings, or one fan control's settings
    Get {
        fan: Option<String>,
    },
    /// Generic settings without the fan controls
    Gen,
    /// Apply settings from a JSON object: `set [fan] <json>`
    Set {
        /// Fan control id, or the JSON when no id is given
        first: String,
        /// JSON for the given fan control
        second: Option<String>,
    },
    /// Delete a fan control
    Del {
        fan: String,
    },
    /// Configured fan controls
    Fns,
    /// Available temperature sensors
    Tmp,
    /// Available fan RPM inputs
    Rpm,
    /// Available PWM outputs
    Pwm,
    /// Unit, fan controls and every sensor listing
    All,
    /// hwmon device name and path (device of the default fan when omitted)
    Mon {
        hwmon: Option<String>,
    },
}

impl Commands {
    fn mutates(&self) -> bool {
        matches!(self, Commands::Set { .. } | Commands::Del { .. })
    }
}

/// Load the engine from the resolved paths and run the command.
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let paths = resolve_paths(&cli.paths);
    debug!(?paths, "Resolved file locations");
    let mut engine = match MergeEngine::load(paths) {
        Ok(engine) => engine,
        Err(e) if e.is_fatal_load() => {
            return Err(anyhow::Error::new(e).context("Cannot load the fancontrol configuration"))
        }
        Err(e) => return Err(e.into()),
    };

    let command = cli.command.clone().unwrap_or(Commands::Lst { fan: None });
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mask = execute_command(&command, &mut engine, &mut out)?;

    if command.mutates() && mask.contains(DirtyMask::CONTROL) {
        eprintln!(
            "{} was updated, restart the {} service to apply the changes",
            engine.paths().control_file.display(),
            SERVICE
        );
    }
    Ok(())
}

fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Run one command against a loaded engine. Returns the stores that were
/// rewritten (always empty for read-only commands).
pub fn execute_command<W: Write>(
    cmd: &Commands,
    engine: &mut MergeEngine,
    out: &mut W,
) -> anyhow::Result<DirtyMask> {
    match cmd {
        Commands::Lst { fan } => cmd_lst(engine, fan.as_deref(), out)?,
        Commands::Get { fan } => cmd_get(engine, fan.as_deref(), out)?,
        Commands::Gen => print_json(out, &engine.model().settings_view())?,
        Commands::Set { first, second } => {
            let (fan, settings) = match second {
                Some(json) => (Some(first.as_str()), json.as_str()),
                None => (None, first.as_str()),
            };
            return cmd_set(engine, fan, settings);
        }
        Commands::Del { fan } => return cmd_del(engine, fan),
        Commands::Fns => print_json(out, &engine.enumerate_fan_controls())?,
        Commands::Tmp => print_json(out, &engine.temperature_sensors())?,
        Commands::Rpm => print_json(out, &engine.fan_inputs())?,
        Commands::Pwm => print_json(out, &engine.pwm_outputs())?,
        Commands::All => cmd_all(engine, out)?,
        Commands::Mon { hwmon } => cmd_mon(engine, hwmon.as_deref(), out)?,
    }
    Ok(DirtyMask::NONE)
}

// ============================================================================
// Monitoring Commands
// ============================================================================

fn cmd_lst<W: Write>(engine: &MergeEngine, fan: Option<&str>, out: &mut W) -> anyhow::Result<()> {
    if let Some(id) = fan {
        if !engine.model().fans.contains_key(id) {
            return Err(FanConfigError::UnknownFanControl(id.to_string()).into());
        }
    }
    match engine.query_sample(fan) {
        Some(sample) => print_json(out, &sample),
        None => print_json(out, &json!({})),
    }
}

fn cmd_mon<W: Write>(engine: &MergeEngine, hwmon: Option<&str>, out: &mut W) -> anyhow::Result<()> {
    let hwmon = hwmon
        .map(str::to_string)
        .or_else(|| engine.default_fan().map(|id| hwmon_of(id).to_string()));
    let device = hwmon.and_then(|id| engine.device(&id));
    print_json(out, &device)
}

fn cmd_all<W: Write>(engine: &MergeEngine, out: &mut W) -> anyhow::Result<()> {
    print_json(
        out,
        &json!({
            "useFahrenheit": engine.model().use_fahrenheit,
            "fanControls": engine.enumerate_fan_controls(),
            "temperatureSensors": engine.temperature_sensors(),
            "fanInputs": engine.fan_inputs(),
            "pwmOutputs": engine.pwm_outputs(),
        }),
    )
}

// ============================================================================
// Settings Commands
// ============================================================================

fn cmd_get<W: Write>(engine: &MergeEngine, fan: Option<&str>, out: &mut W) -> anyhow::Result<()> {
    match fan {
        None => print_json(out, engine.model()),
        Some(id) => match engine.model().fans.get(id) {
            Some(fan) => print_json(out, fan),
            None => print_json(out, &json!({})),
        },
    }
}

fn cmd_set(engine: &mut MergeEngine, fan: Option<&str>, settings: &str) -> anyhow::Result<DirtyMask> {
    let settings: Value = serde_json::from_str(settings)
        .map_err(|e| FanConfigError::invalid_update(format!("invalid JSON: {}", e)))?;
    let overlay = match fan {
        Some(id) => {
            let mut fans = serde_json::Map::new();
            fans.insert(id.to_string(), settings);
            json!({ "fans": fans })
        }
        None => settings,
    };

    let mask = engine.apply_update(&overlay).map_err(FanConfigError::from)?;
    engine.persist(mask).context("Failed to save settings")?;
    Ok(mask)
}

fn cmd_del(engine: &mut MergeEngine, fan: &str) -> anyhow::Result<DirtyMask> {
    let mask = engine.delete_fan(fan);
    if mask.is_empty() {
        return Err(FanConfigError::UnknownFanControl(fan.to_string()).into());
    }
    engine.persist(mask).context("Failed to save settings")?;
    Ok(mask)
}
