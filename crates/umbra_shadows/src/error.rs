//! Error types for shadow configuration

use thiserror::Error;

/// Errors from loading or parsing shadow configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported shadow map size: {0} (expected a power of two between 256 and 8192)")]
    UnsupportedMapSize(u32),
}
