//! Command-line interface for baserate
//!
//! Provides `config` and `cache` subcommands on top of the layered
//! configuration in `--config-dir` and `<PREFIX>_*` environment variables.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::{AppOptions, DEFAULT_CONFIG_DIR};

mod cache;
mod config;

const APP_NAME: &str = "baserate";

/// Layered configuration and cache maintenance for baserate scripts
#[derive(Parser)]
#[command(name = "baserate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding *.json and *.enc.json config files
    #[arg(long, global = true, value_name = "DIR", default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Prefix of environment variables that override config values
    #[arg(long, global = true, value_name = "PREFIX", default_value = "BASERATE")]
    prefix: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the merged configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Read, write and clear cache entries in the configured store
    #[command(subcommand)]
    Cache(cache::CacheCommand),
}

pub fn run() -> Result<()> {
    let Cli { command, verbose, config_dir, prefix } = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let options = AppOptions::for_name(APP_NAME).config_dir(config_dir).env_prefix(prefix);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(async move {
        match command {
            Commands::Config(command) => config::run(command, &options).await,
            Commands::Cache(command) => cache::run(command, &options).await,
        }
    })
}
