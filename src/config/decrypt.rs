//! External decryption of `*.enc.json` sources

use super::ConfigError;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Turns an encrypted config file into plaintext.
#[async_trait]
pub trait Decryptor: Send + Sync {
    async fn decrypt(&self, path: &Path) -> Result<String, ConfigError>;
}

/// Runs an external command (`sops --decrypt <path>` by default) and reads the
/// plaintext from its stdout.
#[derive(Debug, Clone)]
pub struct CommandDecryptor {
    program: String,
    args: Vec<String>,
}

impl CommandDecryptor {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    /// Arguments placed before the file path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for CommandDecryptor {
    fn default() -> Self {
        Self::new("sops").args(["--decrypt"])
    }
}

#[async_trait]
impl Decryptor for CommandDecryptor {
    async fn decrypt(&self, path: &Path) -> Result<String, ConfigError> {
        tracing::debug!("decrypting {} with {}", path.display(), self.program);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .await
            .map_err(|e| ConfigError::Decryption {
                path: path.to_path_buf(),
                message: format!("could not run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ConfigError::Decryption {
                path: path.to_path_buf(),
                message: format!("{} exited with {}: {}", self.program, output.status, stderr),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| ConfigError::Decryption {
            path: path.to_path_buf(),
            message: format!("decrypted output is not UTF-8: {e}"),
        })
    }
}
