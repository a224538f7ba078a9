//! Config directory loading
//!
//! Reads every `*.json` file in the config directory (including `*.enc.json`,
//! which is decrypted first), merges them in path order, then overlays the
//! environment document.

use super::decrypt::{CommandDecryptor, Decryptor};
use super::env::{env_document, process_env_document};
use super::ConfigError;
use crate::document::{deep_merge, Document};
use serde_json::Value;
use std::path::{Path, PathBuf};

const PLAIN_SUFFIX: &str = ".json";
const ENCRYPTED_SUFFIX: &str = ".enc.json";

enum EnvSource {
    Process,
    Fixed(Vec<(String, String)>),
}

/// Loads the layered configuration for one run.
pub struct ConfigLoader {
    dir: PathBuf,
    env_prefix: String,
    decryptor: Box<dyn Decryptor>,
    env: EnvSource,
}

impl ConfigLoader {
    /// Loader for `dir` that reads `<env_prefix>_*` variables from the process
    /// environment and decrypts with `sops --decrypt`.
    pub fn new(dir: impl Into<PathBuf>, env_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            env_prefix: env_prefix.into(),
            decryptor: Box::new(CommandDecryptor::default()),
            env: EnvSource::Process,
        }
    }

    pub fn with_decryptor(mut self, decryptor: impl Decryptor + 'static) -> Self {
        self.decryptor = Box::new(decryptor);
        self
    }

    /// Use a fixed set of variables instead of the process environment.
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env =
            EnvSource::Fixed(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    /// Merge all file sources, then the environment on top.
    pub async fn load(&self) -> Result<Document, ConfigError> {
        let files = self.load_files().await?;
        let env = self.env_document();
        tracing::debug!("merging {} environment override(s)", env.len());
        Ok(deep_merge(files, env))
    }

    /// Merge of the file sources only, in sorted path order.
    pub async fn load_files(&self) -> Result<Document, ConfigError> {
        let mut merged = Document::new();
        for path in self.source_files().await? {
            let doc = self.read_source(&path).await?;
            merged = deep_merge(merged, doc);
        }
        Ok(merged)
    }

    /// Candidate files in the config directory, sorted by path.
    pub async fn source_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let fs_err = |source| ConfigError::FileSystem { path: self.dir.clone(), source };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(fs_err)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(fs_err)? {
            let path = entry.path();
            if !file_name(&path).ends_with(PLAIN_SUFFIX) {
                continue;
            }
            // Follows symlinks, so linked config files count as regular files.
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|source| ConfigError::FileSystem { path: path.clone(), source })?;
            if meta.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    async fn read_source(&self, path: &Path) -> Result<Document, ConfigError> {
        let text = if file_name(path).ends_with(ENCRYPTED_SUFFIX) {
            self.decryptor.decrypt(path).await?
        } else {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::FileSystem { path: path.to_path_buf(), source })?
        };

        tracing::debug!("loaded config source {}", path.display());
        parse_document(&text, path)
    }

    fn env_document(&self) -> Document {
        match &self.env {
            EnvSource::Process => process_env_document(&self.env_prefix),
            EnvSource::Fixed(vars) => {
                env_document(&self.env_prefix, vars.iter().map(|(k, v)| (k.as_str(), v.clone())))
            }
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

fn parse_document(text: &str, path: &Path) -> Result<Document, ConfigError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    match value {
        Value::Object(doc) => Ok(doc),
        _ => Err(ConfigError::NotAnObject { path: path.to_path_buf() }),
    }
}
