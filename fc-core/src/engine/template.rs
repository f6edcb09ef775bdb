//! Device-tree template compiler
//!
//! Resolves board-conditional blocks (see [`super::blocks`]) and replaces
//! `$NAME` placeholders with the lower-cased configuration field of the same
//! name. Curve fields render as a bare list (`20,40,40`), scalars as their
//! display form. The whole output is built in memory; nothing is written here.

use regex::Regex;
use tracing::{debug, trace};

use crate::constants::markers;
use crate::data::{CurveConfig, FieldValue};
use crate::engine::blocks::{BlockScanner, LineAction, Marker};
use crate::error::{FanctlError, Result};

/// Default separator between list items in substituted values
pub const DEFAULT_LIST_SEPARATOR: &str = ",";

pub struct TemplateCompiler<'c> {
    config: &'c CurveConfig,
    board_tag: Regex,
    placeholder: Regex,
    list_separator: String,
}

impl<'c> TemplateCompiler<'c> {
    pub fn new(config: &'c CurveConfig) -> Result<Self> {
        let board_tag = Regex::new(markers::BOARD_TAG_PATTERN)
            .map_err(|e| FanctlError::generic(format!("board tag pattern: {}", e)))?;
        let placeholder = Regex::new(markers::PLACEHOLDER_PATTERN)
            .map_err(|e| FanctlError::generic(format!("placeholder pattern: {}", e)))?;
        Ok(Self {
            config,
            board_tag,
            placeholder,
            list_separator: DEFAULT_LIST_SEPARATOR.to_string(),
        })
    }

    /// Use another separator for list values (e.g. `" "` for dtc cell arrays)
    pub fn with_list_separator(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = separator.into();
        self
    }

    /// Classify a line by its board tags
    pub fn marker(&self, line: &str) -> Marker {
        let mut tagged = false;
        for captures in self.board_tag.captures_iter(line) {
            tagged = true;
            let board = captures.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            if board == Some(self.config.board_id()) {
                return Marker::Matching;
            }
        }
        if tagged {
            Marker::Foreign
        } else {
            Marker::None
        }
    }

    /// Compile a whole template; line endings are preserved
    pub fn compile(&self, template: &str) -> Result<String> {
        let mut scanner = BlockScanner::new();
        let mut output = String::with_capacity(template.len());
        let mut block_start = 0;
        let mut dropped = 0usize;

        for (index, line) in template.split_inclusive('\n').enumerate() {
            let line_no = index + 1;
            let was_in_block = scanner.in_block();
            match scanner.step(line, self.marker(line)) {
                LineAction::Emit => output.push_str(&self.substitute(line, line_no)?),
                LineAction::Drop => {
                    dropped += 1;
                    if !was_in_block && scanner.in_block() {
                        block_start = line_no;
                        trace!("Skipping block for another board at line {}", line_no);
                    }
                }
            }
        }

        if scanner.in_block() {
            return Err(FanctlError::config(format!(
                "conditional block starting at template line {} is never closed",
                block_start
            )));
        }

        debug!(
            "Template compiled for board {}: {} line(s) dropped",
            self.config.board_id(),
            dropped
        );
        Ok(output)
    }

    /// Replace every placeholder in `line`, left to right
    pub fn substitute(&self, line: &str, line_no: usize) -> Result<String> {
        let mut result = String::with_capacity(line.len());
        let mut last = 0;
        for token in self.placeholder.find_iter(line) {
            let name = &token.as_str()[1..];
            let value = self.config.field(&name.to_lowercase()).ok_or_else(|| {
                FanctlError::UndefinedPlaceholder {
                    name: name.to_string(),
                    line: line_no,
                }
            })?;
            result.push_str(&line[last..token.start()]);
            result.push_str(&self.render(&value));
            last = token.end();
        }
        result.push_str(&line[last..]);
        Ok(result)
    }

    fn render(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(&self.list_separator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_config, ValidationPolicy};
    use crate::identity::HostIdentity;

    fn config_for(board_id: u32) -> CurveConfig {
        parse_config(
            "P=500\n1=20,5,30\n2=40,2,60\n",
            &HostIdentity::new(board_id, "bcm2712"),
            ValidationPolicy::lenient(),
        )
        .unwrap()
    }

    const TEMPLATE: &str = "\
/dts-v1/;
/plugin/;

/ {
    compatible = \"brcm,$SOC_NAME\";

    // #PI4
    fragment@0 {
        target = <&pwm>;
    };

    // #PI5
    fragment@1 {
        target = <&rp1_pwm0>;
    };

    fragment@2 {
        temperatures = \"$TEMPERATURES\";
        period = <$PWM_PERIOD>;
    };
};
";

    #[test]
    fn test_untagged_template_is_verbatim() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let text = "a {\n    b;\n};\n\n#address-cells = <1>;\n";
        assert_eq!(compiler.compile(text).unwrap(), text);
    }

    #[test]
    fn test_foreign_block_removed_for_pi5() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let output = compiler.compile(TEMPLATE).unwrap();
        assert_eq!(
            output,
            "\
/dts-v1/;
/plugin/;

/ {
    compatible = \"brcm,bcm2712\";

    fragment@1 {
        target = <&rp1_pwm0>;
    };

    fragment@2 {
        temperatures = \"20,40,40,40,40,40,40,40\";
        period = <20000>;
    };
};
"
        );
    }

    #[test]
    fn test_foreign_block_removed_for_pi4() {
        let config = config_for(4);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let output = compiler.compile(TEMPLATE).unwrap();
        assert!(output.contains("target = <&pwm>;"));
        assert!(!output.contains("rp1_pwm0"));
        assert!(!output.contains("#PI"));
        assert!(output.contains("    };\n\n    fragment@2 {"));
    }

    #[test]
    fn test_multiple_tags_on_one_marker() {
        let config = config_for(4);
        let compiler = TemplateCompiler::new(&config).unwrap();
        assert_eq!(compiler.marker("// #PI3 #PI4"), Marker::Matching);
        assert_eq!(compiler.marker("// #PI3 #PI5"), Marker::Foreign);
        assert_eq!(compiler.marker("#address-cells = <1>;"), Marker::None);
    }

    #[test]
    fn test_substitution_of_several_tokens() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let line = compiler
            .substitute("<$PWM_CHANNEL $PWM_PERIOD $PWM_POLARITY> $FAN_SPEEDS $MODE\n", 1)
            .unwrap();
        assert_eq!(line, "<2 20000 0> 30,60,60,60,60,60,60,60 gpio\n");
        assert_eq!(
            compiler.substitute("$TIME_DELAY/$CONTROL_PERIOD_MS", 1).unwrap(),
            "500/500"
        );
    }

    #[test]
    fn test_list_separator_override() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap().with_list_separator(" ");
        assert_eq!(
            compiler.substitute("<$TEMPERATURES_HYST>", 1).unwrap(),
            "<15 38 38 38 38 38 38 38>"
        );
    }

    #[test]
    fn test_undefined_placeholder() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let err = compiler.compile("ok;\nvalue = <$NOT_A_FIELD>;\n").unwrap_err();
        assert!(matches!(
            err,
            FanctlError::UndefinedPlaceholder { ref name, line: 2 } if name == "NOT_A_FIELD"
        ));
    }

    #[test]
    fn test_placeholder_in_skipped_block_is_not_resolved() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let output = compiler
            .compile("// #PI4\nx {\n    y = <$UNKNOWN>;\n};\nz;\n")
            .unwrap();
        assert_eq!(output, "z;\n");
    }

    #[test]
    fn test_unclosed_block_fails() {
        let config = config_for(5);
        let compiler = TemplateCompiler::new(&config).unwrap();
        let err = compiler.compile("a;\n// #PI4\nx {\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
