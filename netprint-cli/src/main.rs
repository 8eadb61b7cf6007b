//! netprint CLI
//!
//! Checks, prints to, and discovers ESC/POS printers on the local network.

mod cli;
mod commands;
mod config;
mod logger;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = Config::from_env();

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    logger::init_logger(level, cli.log_json || config.log_json, config.log_dir.as_deref())?;

    tracing::debug!(?config, "Configuration loaded");

    match &cli.command {
        Command::Check { target, timeout_ms } => {
            commands::check(target, *timeout_ms, &config).await
        }
        Command::Print {
            target,
            text,
            timeout_ms,
        } => commands::print_text(target, text, *timeout_ms, &config).await,
        Command::Qr {
            target,
            qr,
            timeout_ms,
        } => commands::print_qr(target, qr, *timeout_ms, &config).await,
        Command::Scan(args) => commands::scan(args, &config).await,
        Command::Dump { job } => commands::dump(job),
    }
}
