//! Data types and the two persisted stores
//!
//! Contains the unified model, the control file and preferences file
//! formats, overlay decoding and atomic persistence.

mod config;
pub mod control_file;
pub mod overlay;
mod persistence;
pub mod preferences;
mod types;

pub use config::FanConfigPaths;
pub use control_file::{ControlFileStore, ControlFragment};
pub use overlay::{DevicePatch, FanPatch, Overlay};
pub use persistence::{dir_writable, write_atomic};
pub use preferences::{PreferencesDocument, PreferencesStore};
pub use types::{
    hwmon_of, names_key, split_ref, Device, FanControl, FanControlInfo, GlobalSettings, Sample,
    SettingsView, UnifiedModel,
};
