//! fancontrol-cfg Core Library
//!
//! Configuration management for the lm-sensors `fancontrol` daemon.
//!
//! # Features
//!
//! - **Unified model**: the legacy control file and the XML preferences file
//!   merged into one typed model
//! - **Validated updates**: partial overlays applied all-or-nothing, with a
//!   mask telling which file must be rewritten
//! - **Hardware resolution**: fan-control ids resolved to hwmon attribute
//!   files under the class root or, on older kernels, through stored device
//!   paths
//!
//! # Module Structure
//!
//! - `hw/` - Hardware tree access (enumeration, id resolution, point reads)
//! - `data/` - Model types, the two stores, overlays, atomic writes
//! - `engine/` - Merge engine and dirty masks
//!
//! # Example
//!
//! ```no_run
//! use fc_core::{FanConfigPaths, MergeEngine};
//!
//! let mut engine = MergeEngine::load(FanConfigPaths::default()).unwrap();
//! let mask = engine
//!     .apply_update(&serde_json::json!({"fans": {"hwmon0/pwm1": {"maxTemp": 70}}}))
//!     .unwrap();
//! engine.persist(mask).unwrap();
//! ```

// Grouped modules
pub mod data;
pub mod engine;
pub mod hw;

// Standalone modules
pub mod attribute;
pub mod constants;
pub mod display;

#[cfg(test)]
pub mod test_utils;

// Re-export primary types from data/
pub use data::{
    Device, FanConfigPaths, FanControl, FanControlInfo, GlobalSettings, Sample, SettingsView,
    UnifiedModel,
};

// Re-export stores
pub use data::{ControlFileStore, Overlay, PreferencesStore};

// Re-export error types
pub use fc_error::{FanConfigError, Result};

// Re-export engine types
pub use engine::{DirtyMask, MergeEngine, UpdateRejected};

// Re-export hardware types from hw/
pub use hw::{alarm_status, HardwareInventory, Locate};

// Re-export display helpers
pub use display::{format_number, TempUnit};
