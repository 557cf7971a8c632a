//! Error types for configuration and the component registry.

use std::path::PathBuf;

/// Errors raised while building the component registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A component with this name is already registered.
    #[error("component `{0}` is already registered")]
    Duplicate(String),

    /// Component names must not be empty.
    #[error("component name must not be empty")]
    EmptyName,
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`LokiConfig`](crate::LokiConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The declared components do not form a valid registry.
    #[error("invalid component table: {0}")]
    Registry(#[from] RegistryError),
}
