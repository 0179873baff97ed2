//! Configuration engine modules
//!
//! Contains the merge engine and its dirty-store bookkeeping.

mod dirty;
mod merge;

pub use dirty::{DirtyMask, UpdateRejected};
pub use merge::MergeEngine;
