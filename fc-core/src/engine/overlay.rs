//! Driver overlay generation
//!
//! Picks the template matching the configured mode, compiles it and publishes
//! the result. The output file is only replaced once compilation succeeded.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::data::CurveConfig;
use crate::engine::template::{TemplateCompiler, DEFAULT_LIST_SEPARATOR};
use crate::error::{FanctlError, Result};
use crate::files;

/// Where the overlay template lives and where the compiled overlay goes
#[derive(Debug, Clone)]
pub struct OverlayRequest {
    pub driver_name: String,
    pub template_dir: PathBuf,
    pub output: PathBuf,
    pub list_separator: String,
}

impl OverlayRequest {
    pub fn new(
        driver_name: impl Into<String>,
        template_dir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            driver_name: driver_name.into(),
            template_dir: template_dir.into(),
            output: output.into(),
            list_separator: DEFAULT_LIST_SEPARATOR.to_string(),
        }
    }

    pub fn with_list_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }

    /// Template file for the mode of `config`
    pub fn template_path(&self, config: &CurveConfig) -> PathBuf {
        config
            .mode()
            .template_path(&self.template_dir, &self.driver_name)
    }
}

/// Compile the overlay for `config` and write it to `request.output`
pub fn generate_overlay(config: &CurveConfig, request: &OverlayRequest) -> Result<PathBuf> {
    let template_path = request.template_path(config);
    let template = read_template(&template_path, config)?;

    let compiler =
        TemplateCompiler::new(config)?.with_list_separator(request.list_separator.as_str());
    let overlay = compiler.compile(&template)?;

    files::publish_atomically(&request.output, &overlay)?;
    info!(
        "Generated overlay {:?} from {:?} (mode {}, board {})",
        request.output,
        template_path,
        config.mode(),
        config.board_id()
    );
    Ok(request.output.clone())
}

fn read_template(path: &Path, config: &CurveConfig) -> Result<String> {
    files::read_text(path).map_err(|e| match e {
        FanctlError::FileNotFound(path) => FanctlError::config(format!(
            "no overlay template for mode '{}' at {}",
            config.mode(),
            path.display()
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_config, ValidationPolicy};
    use crate::identity::HostIdentity;
    use std::fs;
    use tempfile::TempDir;

    fn pi5_fan_header() -> CurveConfig {
        parse_config(
            "MODE=fanh\nPOINT_1=40C,5C,30%\nPOINT_2=60C,5C,80%\n",
            &HostIdentity::new(5, "bcm2712"),
            ValidationPolicy::strict(),
        )
        .unwrap()
    }

    #[test]
    fn test_generate_overlay_uses_mode_template() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("fanctl_fanh.dts.template"),
            "speeds = <$FAN_SPEEDS>;\n",
        )
        .unwrap();
        let output = dir.path().join("out").join("fanctl.dts");
        let request = OverlayRequest::new("fanctl", dir.path(), &output).with_list_separator(" ");

        generate_overlay(&pi5_fan_header(), &request).unwrap();
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "speeds = <30 80 80 80 80 80 80 80>;\n"
        );
    }

    #[test]
    fn test_missing_template_variant() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fanctl_gpio.dts.template"), "x;\n").unwrap();
        let request = OverlayRequest::new("fanctl", dir.path(), dir.path().join("fanctl.dts"));

        let err = generate_overlay(&pi5_fan_header(), &request).unwrap_err();
        assert!(err.to_string().contains("mode 'fanh'"));
        assert!(!dir.path().join("fanctl.dts").exists());
    }

    #[test]
    fn test_failed_compile_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fanctl_fanh.dts.template"), "x = <$BOGUS>;\n").unwrap();
        let output = dir.path().join("fanctl.dts");
        fs::write(&output, "previous\n").unwrap();
        let request = OverlayRequest::new("fanctl", dir.path(), &output);

        assert!(generate_overlay(&pi5_fan_header(), &request).is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous\n");
    }
}
