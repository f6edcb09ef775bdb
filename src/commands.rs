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

//! Operation runner
//!
//! Executes the operations picked on the command line against one immutable
//! [`Settings`] value. The board identity and the fan configuration are
//! loaded on first use and then reused by every later operation.

use fc_core::{
    add_directive_block, generate_overlay, load_config, remove_directive_block,
    update_board_dts, CurveConfig, DirectiveBlock, HostIdentity, IdentitySource,
    OverlayRequest, Result,
};
use tracing::{debug, info};

use crate::cli::Operation;
use crate::settings::Settings;

pub struct Runner<'s, S: IdentitySource> {
    settings: &'s Settings,
    identity_source: S,
    identity: Option<HostIdentity>,
    config: Option<CurveConfig>,
}

impl<'s, S: IdentitySource> Runner<'s, S> {
    pub fn new(settings: &'s Settings, identity_source: S) -> Self {
        Self {
            settings,
            identity_source,
            identity: None,
            config: None,
        }
    }

    /// Run every operation in order, stopping at the first failure
    pub fn run_all(&mut self, operations: &[Operation]) -> Result<()> {
        for operation in operations {
            self.run(*operation)?;
        }
        Ok(())
    }

    pub fn run(&mut self, operation: Operation) -> Result<()> {
        debug!("Running {:?}", operation);
        match operation {
            Operation::BootAdd => {
                let block = DirectiveBlock::dtoverlay(self.settings.driver_name()?);
                add_directive_block(&self.settings.boot_config, &block)?;
            }
            Operation::BootRemove => {
                let block = DirectiveBlock::dtoverlay(self.settings.driver_name()?);
                remove_directive_block(&self.settings.boot_config, &block)?;
            }
            Operation::DriverDts => {
                let request = OverlayRequest::new(
                    self.settings.driver_name()?,
                    self.settings.template_dir()?,
                    self.settings.dts_output()?,
                )
                .with_list_separator(self.settings.list_separator.as_str());
                let config = self.config()?;
                generate_overlay(config, &request)?;
            }
            Operation::BoardDts => {
                let settings = self.settings;
                let config = self.config()?;
                if !config.is_rpi_5() {
                    debug!("Board {} has no board DTS to patch", config.board_id());
                    return Ok(());
                }
                update_board_dts(config, settings.board_dts()?)?;
            }
            Operation::ShowConfig => {
                let config = self.config()?;
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        Ok(())
    }

    /// Validated configuration, loaded once
    pub fn config(&mut self) -> Result<&CurveConfig> {
        let config = match self.config.take() {
            Some(config) => config,
            None => {
                let identity = self.identity()?.clone();
                let path = self.settings.config_path()?;
                let config = load_config(path, &identity, self.settings.policy)?;
                info!(
                    "Loaded fan config {:?} for board {} ({})",
                    path, identity.board_id, identity.soc_name
                );
                config
            }
        };
        Ok(self.config.insert(config))
    }

    /// Board identity, read from the source at most once
    fn identity(&mut self) -> Result<&HostIdentity> {
        let identity = match self.identity.take() {
            Some(identity) => identity,
            None => self.identity_source.read_identity()?,
        };
        Ok(self.identity.insert(identity))
    }
}
