//! Temperature unit conversion and number formatting
//!
//! The control file always stores Celsius. In memory, threshold temperatures
//! are held in the active display unit, so conversion happens when the
//! control file is parsed and again when it is written back.

use serde::{Deserialize, Serialize};

use crate::constants::temperature::{DECIMAL_PLACES, FAHRENHEIT_OFFSET, FAHRENHEIT_SCALE, INTEGER_EPSILON};

/// Active display unit, selected by the `farenheit` preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub fn from_fahrenheit_flag(use_fahrenheit: bool) -> Self {
        if use_fahrenheit {
            TempUnit::Fahrenheit
        } else {
            TempUnit::Celsius
        }
    }

    /// Celsius to the display unit. Passthrough for Celsius.
    pub fn to_display(self, celsius: f64) -> f64 {
        match self {
            TempUnit::Celsius => celsius,
            TempUnit::Fahrenheit => snap_integer(celsius_to_fahrenheit(celsius)),
        }
    }

    /// Display unit back to Celsius. Passthrough for Celsius.
    pub fn to_celsius(self, value: f64) -> f64 {
        match self {
            TempUnit::Celsius => value,
            TempUnit::Fahrenheit => snap_integer(fahrenheit_to_celsius(value)),
        }
    }
}

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * FAHRENHEIT_SCALE + FAHRENHEIT_OFFSET
}

/// Convert Fahrenheit to Celsius
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - FAHRENHEIT_OFFSET) / FAHRENHEIT_SCALE
}

// 1.8 is not exact in binary, so 104°F comes back as 39.99999999999999°C.
fn snap_integer(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_EPSILON {
        rounded
    } else {
        value
    }
}

/// Format a number the way the control file expects: integral values
/// without a fractional part, everything else rounded to
/// `DECIMAL_PLACES` and printed in shortest form.
pub fn format_number(value: f64) -> String {
    let value = if value.is_finite() {
        let scale = 10f64.powi(DECIMAL_PLACES);
        (value * scale).round() / scale
    } else {
        value
    };
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
