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

//! Diagnostic logging to stderr
//!
//! stdout carries the JSON results, so all tracing output goes to stderr.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "FANCONTROL_LOG";

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

/// Filter from `FANCONTROL_LOG`, else `debug` when verbose, else `warn`.
pub fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL })
    })
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn default_filter_is_warn() {
        env::remove_var(LOG_ENV);
        assert_eq!(build_filter(false).to_string().to_lowercase(), "warn");
        assert_eq!(build_filter(true).to_string().to_lowercase(), "debug");
    }

    #[test]
    #[serial]
    fn env_overrides_verbosity() {
        env::set_var(LOG_ENV, "fc_core=trace");
        assert_eq!(build_filter(false).to_string().to_lowercase(), "fc_core=trace");
        env::remove_var(LOG_ENV);
    }

    #[test]
    #[serial]
    fn init_twice_is_harmless() {
        init_logging(false);
        init_logging(true);
    }
}
