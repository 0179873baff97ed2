//! Which persisted stores need rewriting after a change

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::constants::dirty;
use fc_error::FanConfigError;

/// Bit 0: preferences file, bit 1: control file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyMask(i32);

impl DirtyMask {
    pub const NONE: Self = Self(0);
    pub const PREFERENCES: Self = Self(dirty::PREFERENCES);
    pub const CONTROL: Self = Self(dirty::CONTROL);

    pub fn bits(self) -> i32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DirtyMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirtyMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Display for DirtyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An overlay that violated the update schema. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRejected {
    pub reason: String,
}

impl UpdateRejected {
    pub const CODE: i32 = dirty::REJECTED;

    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Numeric result in the mask domain
    pub fn code(&self) -> i32 {
        Self::CODE
    }
}

impl fmt::Display for UpdateRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "update rejected: {}", self.reason)
    }
}

impl std::error::Error for UpdateRejected {}

impl From<UpdateRejected> for FanConfigError {
    fn from(rejected: UpdateRejected) -> Self {
        FanConfigError::InvalidUpdate(rejected.reason)
    }
}
