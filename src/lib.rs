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

//! pi-fanctl - configuration tool for the Raspberry Pi fan control driver
//!
//! Validates the fan curve configuration, compiles the driver's device-tree
//! overlay and patches the boot settings. The heavy lifting lives in
//! `fc-core`; this crate holds the command line front end.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;

/// Prefix of every fatal diagnostic on stderr
pub const ERROR_PREFIX: &str = "[ERROR]";
