//! Error types for configuration files.

use layered_concepts::ConfigurationError;
use thiserror::Error;

/// Errors that can occur while reading, writing or resolving a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The TOML text did not parse into a configuration.
    #[error("{path}: invalid TOML: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The JSON text did not parse.
    #[error("{path}: invalid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The document parsed but does not have the shape of a configuration.
    #[error("{path}: {message}")]
    Shape { path: String, message: String },

    /// The file extension names no supported format.
    #[error("{path}: unknown configuration format, expected .toml or .json")]
    UnknownFormat { path: String },

    /// No predefined configuration has this name.
    #[error("unknown predefined configuration {name:?}")]
    UnknownPredefined { name: String },

    /// Serializing a configuration failed.
    #[error("could not serialize configuration: {message}")]
    Serialize { message: String },

    /// The concepts themselves are invalid.
    #[error(transparent)]
    Concepts(#[from] ConfigurationError),
}

/// Result type for configuration file operations.
pub type ConfigFileResult<T> = Result<T, ConfigError>;
