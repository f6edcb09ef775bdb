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

//! Resolved runtime settings
//!
//! Gathered once from the command line and environment, then passed by
//! reference to everything that needs a path. Nothing re-reads the
//! environment afterwards.

use std::path::{Path, PathBuf};

use fc_core::{FanctlError, Result, ValidationPolicy};

use crate::cli::Cli;

#[derive(Debug, Clone)]
pub struct Settings {
    pub driver_name: Option<String>,
    pub config_path: Option<PathBuf>,
    pub dts_output: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub board_dts: Option<PathBuf>,
    pub boot_config: PathBuf,
    pub board_info: PathBuf,
    pub policy: ValidationPolicy,
    pub list_separator: String,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            driver_name: cli.paths.driver_name.clone(),
            config_path: cli.paths.config_path.clone(),
            dts_output: cli.paths.dts_output.clone(),
            template_dir: cli.paths.template_dir.clone(),
            board_dts: cli.paths.board_dts.clone(),
            boot_config: cli.paths.boot_config.clone(),
            board_info: cli.paths.board_info.clone(),
            policy: cli.validation.policy(),
            list_separator: cli.validation.list_separator.clone(),
        }
    }

    pub fn driver_name(&self) -> Result<&str> {
        self.driver_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| missing("driver name", "--driver-name", "DRIVER_NAME"))
    }

    pub fn config_path(&self) -> Result<&Path> {
        self.config_path
            .as_deref()
            .ok_or_else(|| missing("fan config path", "--config", "DRIVER_CONFIG_PATH"))
    }

    pub fn dts_output(&self) -> Result<&Path> {
        self.dts_output
            .as_deref()
            .ok_or_else(|| missing("overlay output path", "--dts-output", "DRIVER_DTS_PATH"))
    }

    pub fn template_dir(&self) -> Result<&Path> {
        self.template_dir.as_deref().ok_or_else(|| {
            missing(
                "template directory",
                "--template-dir",
                "DRIVER_DTS_TEMPLATE_BASE_PATH",
            )
        })
    }

    pub fn board_dts(&self) -> Result<&Path> {
        self.board_dts
            .as_deref()
            .ok_or_else(|| missing("board DTS path", "--board-dts", "PI_5_DTS_PATH"))
    }
}

fn missing(what: &str, flag: &str, env: &str) -> FanctlError {
    FanctlError::config(format!("no {} given (use {} or set {})", what, flag, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_missing_settings_name_their_source() {
        let cli = Cli::try_parse_from([
            "fanctl-config",
            "--driver-name",
            "fanctl",
            "--boot-config",
            "/tmp/config.txt",
            "boot_add",
        ])
        .unwrap();
        let settings = Settings::from_cli(&cli);

        assert_eq!(settings.driver_name().unwrap(), "fanctl");
        assert_eq!(settings.boot_config, PathBuf::from("/tmp/config.txt"));
        if std::env::var_os("DRIVER_DTS_TEMPLATE_BASE_PATH").is_none() {
            let err = settings.template_dir().unwrap_err();
            assert!(err.to_string().contains("DRIVER_DTS_TEMPLATE_BASE_PATH"));
        }
    }
}
