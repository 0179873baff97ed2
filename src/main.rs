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

use clap::Parser;

use fancontrol_cfg::cli::{run_cli, Cli};
use fancontrol_cfg::logger;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);
    run_cli(&cli)
}
