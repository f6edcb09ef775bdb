/*
 * This file is part of pi-fanctl.
 *
 * Copyright (C) 2025 pi-fanctl contributors
 *
 * pi-fanctl is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pi-fanctl is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pi-fanctl. If not, see <https://www.gnu.org/licenses/>.
 */

//! Standalone curve validator for the driver build
//!
//! Prints `-DCURVE_TEMPERATURES="..." ... -DCONTROL_PERIOD_MS=<n>` on one
//! line for the Makefile to pass to the compiler.

use anyhow::Context;
use clap::Parser;
use fc_core::{build_flags_line, load_config, FirmwareIdentity, HostIdentity, IdentitySource};

use pi_fanctl::cli::FlagsCli;
use pi_fanctl::logging::init_logging;
use pi_fanctl::ERROR_PREFIX;

/// Identity assumed when building off-target
const GENERIC_BOARD: u32 = 0;

fn run(cli: &FlagsCli) -> anyhow::Result<String> {
    let identity = match &cli.board_info {
        Some(path) => FirmwareIdentity::new(path).read_identity()?,
        None => HostIdentity::new(GENERIC_BOARD, "generic"),
    };
    let config = load_config(&cli.config, &identity, cli.policy.into())
        .with_context(|| format!("invalid fan config {}", cli.config.display()))?;
    Ok(build_flags_line(&config))
}

fn main() -> anyhow::Result<()> {
    let cli = FlagsCli::parse();
    init_logging(&cli.log_level);

    match run(&cli) {
        Ok(line) => {
            println!("{}", line);
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {:#}", ERROR_PREFIX, err);
            std::process::exit(1);
        }
    }
}
