//! CLI styling for help output.

use clap::builder::{Styles, styling::AnsiColor};

/// Custom styles for the zigup CLI.
pub const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().bold())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::Cyan.on_default().bold())
    .placeholder(AnsiColor::Cyan.on_default());
