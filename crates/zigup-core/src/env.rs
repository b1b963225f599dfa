//! Environment variable constants for zigup.
//!
//! Single source of truth for the environment variables zigup recognizes.

/// Environment variable names used by zigup.
pub struct EnvVars;

impl EnvVars {
    /// Path to the zigup configuration file.
    pub const ZIGUP_CONFIG_FILE: &'static str = "ZIGUP_CONFIG_FILE";

    /// Override the install directory.
    pub const ZIGUP_INSTALL_DIR: &'static str = "ZIGUP_INSTALL_DIR";

    /// Enable verbose output.
    pub const ZIGUP_VERBOSE: &'static str = "ZIGUP_VERBOSE";

    /// Enable JSON log output.
    pub const ZIGUP_LOG_JSON: &'static str = "ZIGUP_LOG_JSON";

    /// Standard NO_COLOR environment variable.
    pub const NO_COLOR: &'static str = "NO_COLOR";

    /// Standard CLICOLOR environment variable.
    pub const CLICOLOR: &'static str = "CLICOLOR";
}

/// Check if colors should be disabled based on environment.
pub fn no_color() -> bool {
    std::env::var(EnvVars::NO_COLOR).is_ok()
        || std::env::var(EnvVars::CLICOLOR)
            .map(|v| v == "0")
            .unwrap_or(false)
}
