//! Constants and configuration values for pi-fanctl
//!
//! Centralizes the fixed values shared by the validator, the overlay compiler
//! and the patchers. Add new magic numbers here rather than inline.

/// Default system paths
pub mod paths {
    /// Firmware-provided board identity (`compatible` property of the root node)
    pub const BOARD_INFO_SOURCE: &str = "/sys/firmware/devicetree/base/compatible";

    /// Raspberry Pi boot settings file
    pub const BOOT_CONFIG: &str = "/boot/config.txt";

    /// Suffix of every overlay template file
    pub const TEMPLATE_EXTENSION: &str = "dts.template";
}

/// Fan curve limits
pub mod curve {
    /// Number of knees in every compiled curve
    pub const POINTS_NUM: usize = 8;

    pub const MIN_TEMPERATURE: i64 = i8::MIN as i64;
    pub const MAX_TEMPERATURE: i64 = i8::MAX as i64;

    pub const MAX_FAN_SPEED: i64 = 100;
}

/// PWM and timing defaults
pub mod pwm {
    /// Default PWM period in nanoseconds (50 kHz)
    pub const DEFAULT_PERIOD_NS: u32 = 20_000;

    pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

    /// Default control loop period in milliseconds
    pub const DEFAULT_CONTROL_PERIOD_MS: u32 = 1000;

    /// PWM channel wired to the dedicated fan header on the Raspberry Pi 5
    pub const FAN_HEADER_CHANNEL: u32 = 2;

    /// PWM channel used for GPIO-pin output on every other board
    pub const GPIO_CHANNEL: u32 = 0;
}

/// Board identification
pub mod board {
    /// The only board revision with a dedicated fan header
    pub const RPI_5: u32 = 5;
}

/// Fixed strings of the template and patch conventions
pub mod markers {
    /// Board tag inside template comments, e.g. `// #PI5`
    pub const BOARD_TAG_PATTERN: &str = r"#PI(\d+)";

    /// Placeholder token, e.g. `$FAN_SPEEDS`
    pub const PLACEHOLDER_PATTERN: &str = r"\$[A-Z_]+";

    /// Section header written ahead of the overlay directive in the boot config
    pub const BOOT_SECTION_HEADER: &str = "[all]";

    /// Prefix of the overlay load directive (`dtoverlay=<driver>`)
    pub const DTOVERLAY_PREFIX: &str = "dtoverlay=";

    /// Node of the stock board DTS that claims the fan PWM
    pub const COOLING_FAN_NODE: &str = "cooling_fan";

    /// Properties removed from the cooling fan node
    pub const COOLING_FAN_PROPERTIES: [&str; 2] = ["compatible=", "pwms="];
}
