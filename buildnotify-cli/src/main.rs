//! ## buildnotify-cli
//! **Command-line front end**
//!
//! Feeds files through a notify transform so notification settings can be
//! tried without a build pipeline around them.

use clap::Parser;

mod commands;
mod source;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::run_command(cli).await
}
