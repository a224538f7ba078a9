//! `config` subcommands

use anyhow::Result;
use clap::Subcommand;
use serde_json::Value;

use crate::app::{bootstrap, AppOptions};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration with sensitive values masked
    Show,
}

pub async fn run(command: ConfigCommand, options: &AppOptions) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let context = bootstrap(super::APP_NAME, options).await?;
            let redacted = Value::Object(context.redacted());
            println!("{}", serde_json::to_string_pretty(&redacted)?);
            Ok(())
        }
    }
}
