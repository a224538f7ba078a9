//! Application bootstrap
//!
//! Loads the layered configuration for a named entry point, logs a redacted
//! copy, and hands the full document to the entry point.

use crate::config::{ConfigLoader, RuntimeSettings};
use crate::document::Document;
use crate::redact::Redactor;
use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Where an entry point finds its configuration.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub config_dir: PathBuf,
    pub env_prefix: String,
}

impl AppOptions {
    /// `./config` and the upper-cased app name as the environment prefix.
    pub fn for_name(name: &str) -> Self {
        Self { config_dir: PathBuf::from(DEFAULT_CONFIG_DIR), env_prefix: name.to_uppercase() }
    }

    pub fn config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn loader(&self) -> ConfigLoader {
        ConfigLoader::new(&self.config_dir, &self.env_prefix)
    }
}

/// Everything an entry point needs after startup.
pub struct AppContext {
    pub name: String,
    pub config: Document,
    pub settings: RuntimeSettings,
    pub redactor: Redactor,
}

impl AppContext {
    pub fn redacted(&self) -> Document {
        self.redactor.redact(&self.config)
    }
}

/// Load configuration and runtime settings. Any failure aborts startup.
pub async fn bootstrap(name: &str, options: &AppOptions) -> Result<AppContext> {
    bootstrap_with(name, options.loader()).await
}

/// [`bootstrap`] with a caller-built loader (custom decryptor or fixed env).
pub async fn bootstrap_with(name: &str, loader: ConfigLoader) -> Result<AppContext> {
    tracing::info!("Starting {}", name);
    tracing::debug!(
        "reading {} with {}_* overrides",
        loader.dir().display(),
        loader.env_prefix()
    );

    let config = loader
        .load()
        .await
        .with_context(|| format!("Failed loading configuration from {}", loader.dir().display()))?;
    let settings = RuntimeSettings::from_document(&config)?;
    let redactor = Redactor::from_settings(&settings.redact);

    let context = AppContext { name: name.to_string(), config, settings, redactor };
    tracing::info!("{} configuration: {}", name, serde_json::Value::Object(context.redacted()));
    Ok(context)
}

/// Bootstrap, then run `entry` with the merged configuration.
pub async fn run<F, Fut>(name: &str, options: &AppOptions, entry: F) -> Result<()>
where
    F: FnOnce(Document) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let context = bootstrap(name, options).await?;
    entry(context.config).await?;
    tracing::info!("{} success", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use crate::redact::DEFAULT_MASK;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn options_derive_prefix_from_name() {
        let options = AppOptions::for_name("baserate");
        assert_eq!(options.env_prefix, "BASERATE");
        assert_eq!(options.config_dir, PathBuf::from("config"));
    }

    #[tokio::test]
    async fn bootstrap_reads_settings_and_redacts() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("01-base.json"),
            r#"{"api": {"token": "t"}, "cache": {"backend": "sqlite"}}"#,
        )
        .expect("write");

        let loader = ConfigLoader::new(tmp.path(), "DEMO")
            .with_env_vars([("DEMO_REDACT_KEYS", r#"["account"]"#), ("DEMO_ACCOUNT", "0xabc")]);
        let ctx = bootstrap_with("demo", loader).await.expect("bootstrap");

        assert_eq!(ctx.settings.cache.backend, CacheBackend::Sqlite);
        assert_eq!(ctx.config.get("account"), Some(&json!("0xabc")));
        let redacted = ctx.redacted();
        assert_eq!(redacted.get("account"), Some(&json!(DEFAULT_MASK)));
        assert_eq!(redacted["api"]["token"], json!(DEFAULT_MASK));
    }

    #[tokio::test]
    async fn numeric_env_overrides_for_text_settings_start_up() {
        let tmp = TempDir::new().expect("tmp");
        let loader = ConfigLoader::new(tmp.path(), "DEMO").with_env_vars([
            ("DEMO_REDACT_MASK", "0"),
            ("DEMO_REDACT_KEYS", "apikey"),
            ("DEMO_CACHE_PATH", "2024"),
            ("DEMO_APIKEY", "abc"),
        ]);
        let ctx = bootstrap_with("demo", loader).await.expect("bootstrap");

        assert_eq!(ctx.settings.redact.mask.as_deref(), Some("0"));
        assert_eq!(ctx.settings.cache.path, PathBuf::from("2024"));
        assert_eq!(ctx.redacted().get("apikey"), Some(&json!("0")));
    }

    #[tokio::test]
    async fn run_passes_config_and_propagates_entry_errors() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("app.json"), r#"{"port": 8080}"#).expect("write");
        let options = AppOptions::for_name("unit_test_app_without_env").config_dir(tmp.path());

        let mut seen = None;
        run("unit_test_app_without_env", &options, |config| {
            seen = config.get("port").cloned();
            async { Ok(()) }
        })
        .await
        .expect("run");
        assert_eq!(seen, Some(json!(8080)));

        let err = run("unit_test_app_without_env", &options, |_| async {
            anyhow::bail!("entry failed")
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "entry failed");
    }

    #[tokio::test]
    async fn missing_config_dir_aborts_startup() {
        let tmp = TempDir::new().expect("tmp");
        let options = AppOptions::for_name("demo").config_dir(tmp.path().join("absent"));
        let err = bootstrap("demo", &options).await.err().expect("should fail");
        assert!(format!("{err:#}").contains("Failed to read"));
    }
}
