use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// One side of the sync pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerConfig {
    /// Container name used for backend lookups and log lines.
    pub name: String,
    /// Backend-specific location: a directory path for the local
    /// backend, a container URI for a remote one.
    pub location: String,
    /// Shared access key, when the backend needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

/// Default seconds between reconciliation passes (one hour)
fn default_interval_secs() -> u64 {
    3600
}

/// Blobsync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub source: ContainerConfig,
    pub destination: ContainerConfig,
    /// Seconds between reconciliation passes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Grant anonymous read access to blobs in both containers before
    /// each pass.
    #[serde(default)]
    pub public_read_access: bool,
}

/// Read the configuration file
pub async fn read_config(path: &Path) -> Result<Option<SyncConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;
    let config: SyncConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(path: &Path, config: &SyncConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content).await?;
    Ok(())
}
