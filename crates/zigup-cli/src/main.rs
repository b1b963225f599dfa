//! zigup - a version manager for the Zig compiler and language server.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod styles;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    zigup_telemetry::init(cli.global.verbose);

    let exit_code = commands::run(cli).await?;

    std::process::exit(exit_code);
}
