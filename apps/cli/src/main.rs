//! Inkpress CLI — spreadsheet-driven blog writing agent.
//!
//! Reads blog topics from Google Sheets, generates markdown posts through
//! OpenRouter, and optionally publishes them to WordPress.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
