//! Hardware interaction modules
//!
//! Read-only access to the hwmon attribute tree: device enumeration, id
//! resolution and point reads.

mod hardware;
mod location;
mod readings;

pub use hardware::HardwareInventory;
pub use location::Locate;
pub use readings::alarm_status;
