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

//! Command Line Interface
//!
//! Paths default to the environment variables set by the driver's Makefile
//! and install scripts, so the tool can be called with operation names only.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use fc_core::constants::paths;
use fc_core::engine::DEFAULT_LIST_SEPARATOR;
use fc_core::ValidationPolicy;

#[derive(Parser, Debug)]
#[command(name = "fanctl-config")]
#[command(version)]
#[command(about = "pi-fanctl - configure the fan driver and build its overlay")]
#[command(long_about = "pi-fanctl - configure the fan driver and build its overlay

Runs each OPERATION in the order given. The fan configuration is parsed at
most once per invocation.

EXAMPLES:
    fanctl-config boot_add driver_dts board_dts
    fanctl-config boot_remove
    fanctl-config --policy lenient show_config

ENVIRONMENT VARIABLES:
    RUST_LOG=debug                   Enable debug logging
    DRIVER_NAME                      Driver (and overlay) name
    DRIVER_CONFIG_PATH               Fan curve configuration
    DRIVER_DTS_PATH                  Generated overlay source
    DRIVER_DTS_TEMPLATE_BASE_PATH    Directory of <driver>_<mode>.dts.template
    PI_5_DTS_PATH                    Raspberry Pi 5 board device tree source")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    #[command(flatten)]
    pub validation: ValidationArgs,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Operations to run, in order
    #[arg(value_enum, required = true)]
    pub operations: Vec<Operation>,
}

/// Named operations of `fanctl-config`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Add the overlay load directive to the boot settings
    #[value(name = "boot_add")]
    BootAdd,
    /// Remove the overlay load directive from the boot settings
    #[value(name = "boot_remove")]
    BootRemove,
    /// Compile the driver overlay from its template
    #[value(name = "driver_dts")]
    DriverDts,
    /// Remove the stock fan binding from the Raspberry Pi 5 device tree
    #[value(name = "board_dts")]
    BoardDts,
    /// Print the validated configuration as JSON
    #[value(name = "show_config")]
    ShowConfig,
}

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// Driver name; the boot directive is dtoverlay=<name>
    #[arg(long, env = "DRIVER_NAME")]
    pub driver_name: Option<String>,

    /// Fan curve configuration file
    #[arg(long = "config", env = "DRIVER_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Output path of the compiled overlay
    #[arg(long = "dts-output", env = "DRIVER_DTS_PATH")]
    pub dts_output: Option<PathBuf>,

    /// Directory holding the overlay templates
    #[arg(long = "template-dir", env = "DRIVER_DTS_TEMPLATE_BASE_PATH")]
    pub template_dir: Option<PathBuf>,

    /// Raspberry Pi 5 board device tree source
    #[arg(long = "board-dts", env = "PI_5_DTS_PATH")]
    pub board_dts: Option<PathBuf>,

    /// Boot settings file
    #[arg(long = "boot-config", env = "BOOT_CONFIG_PATH", default_value = paths::BOOT_CONFIG)]
    pub boot_config: PathBuf,

    /// Board identity source
    #[arg(long = "board-info", default_value = paths::BOARD_INFO_SOURCE)]
    pub board_info: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ValidationArgs {
    /// Range and ordering strictness of the curve validation
    #[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
    pub policy: PolicyArg,

    /// Lowest accepted fan speed in percent (overrides the policy's bound)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fan_speed_min: Option<u8>,

    /// Separator between list values substituted into the overlay
    #[arg(long, default_value = DEFAULT_LIST_SEPARATOR)]
    pub list_separator: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Saturate out-of-range values, non-decreasing curve
    Lenient,
    /// Reject out-of-range values, strictly rising curve
    Strict,
}

impl From<PolicyArg> for ValidationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Lenient => ValidationPolicy::lenient(),
            PolicyArg::Strict => ValidationPolicy::strict(),
        }
    }
}

impl ValidationArgs {
    pub fn policy(&self) -> ValidationPolicy {
        let policy = ValidationPolicy::from(self.policy);
        match self.fan_speed_min {
            Some(min) => policy.with_fan_speed_min(min),
            None => policy,
        }
    }
}

/// Standalone validator: prints the curve as compiler flags
#[derive(Parser, Debug)]
#[command(name = "fanctl-flags")]
#[command(version)]
#[command(about = "Validate a compact fan curve config and print it as -D compiler flags")]
pub struct FlagsCli {
    /// Fan curve configuration file
    pub config: PathBuf,

    /// Range and ordering strictness of the curve validation
    #[arg(long, value_enum, default_value_t = PolicyArg::Lenient)]
    pub policy: PolicyArg,

    /// Board identity source; without it a generic board is assumed
    #[arg(long = "board-info")]
    pub board_info: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
