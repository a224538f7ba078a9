//! `cache` subcommands
//!
//! Each command opens the backend selected by the `cache` config section and
//! releases it before returning, also on failure.

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::app::{bootstrap, AppOptions};
use crate::config::env::parse_literal;
use crate::store::{self, KeyValueStore};

#[derive(Subcommand)]
pub enum CacheCommand {
    /// Print the stored JSON value for a key
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Store a value; VALUE is parsed as JSON when possible, else kept as text
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },

    /// Remove a single key
    Delete {
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Remove every key matching a glob pattern (e.g. 'compute_value:*')
    Clear {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
}

pub async fn run(command: CacheCommand, options: &AppOptions) -> Result<()> {
    let context = bootstrap(super::APP_NAME, options).await?;
    let mut backend = store::open(&context.settings.cache);
    tracing::debug!("using {} cache backend", backend.backend());

    let output =
        store::scoped(&mut backend, move |s| Box::pin(execute(command, &**s))).await?;

    println!("{output}");
    Ok(())
}

async fn execute(command: CacheCommand, kv: &dyn KeyValueStore) -> Result<String> {
    match command {
        CacheCommand::Get { key } => match kv.get(&key).await? {
            Some(raw) => Ok(raw),
            None => anyhow::bail!("Key not found: {}", key),
        },
        CacheCommand::Set { key, value } => {
            let encoded = serde_json::to_string(&parse_literal(value))?;
            kv.set(&key, encoded.clone()).await?;
            Ok(encoded)
        }
        CacheCommand::Delete { key } => {
            let removed = kv.delete(&key).await?;
            Ok(if removed { "deleted" } else { "not found" }.to_string())
        }
        CacheCommand::Clear { pattern } => {
            let removed = kv
                .delete_by_pattern(&pattern)
                .await
                .with_context(|| format!("Failed clearing keys matching {pattern}"))?;
            Ok(format!("removed {removed} key(s)"))
        }
    }
}
