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

use clap::Parser;
use fc_core::FirmwareIdentity;
use tracing::info;

use pi_fanctl::cli::Cli;
use pi_fanctl::commands::Runner;
use pi_fanctl::logging::init_logging;
use pi_fanctl::settings::Settings;
use pi_fanctl::ERROR_PREFIX;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let settings = Settings::from_cli(&cli);
    info!("STARTUP: fanctl-config {} running {:?}", env!("CARGO_PKG_VERSION"), cli.operations);

    let mut runner = Runner::new(&settings, FirmwareIdentity::new(&settings.board_info));
    if let Err(err) = runner.run_all(&cli.operations) {
        eprintln!("{} {}", ERROR_PREFIX, err);
        std::process::exit(1);
    }

    Ok(())
}
