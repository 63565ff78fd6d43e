//! Error types for the fixture harness.
//!
//! This module defines error types for parsing, fixture loading,
//! and building the concepts a fixture declares.

use layered_concepts::ConfigurationError;
use thiserror::Error;

/// Errors that can occur during fixture processing.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Error parsing a fixture file.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Error loading a fixture or expected-failures file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The concepts declared by a fixture are invalid.
    #[error("invalid fixture concepts: {0}")]
    Config(#[from] ConfigurationError),
}

/// Result type for fixture operations.
pub type SpecResult<T> = Result<T, SpecError>;
