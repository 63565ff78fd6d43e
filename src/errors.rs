//! Error types for concept configuration, scanning and rendering.
//!
//! Configuration errors are fatal to the configuration being loaded. Scan
//! input errors are scoped to a single document so a caller can skip it and
//! keep going with the rest of a document set.

use thiserror::Error;

use crate::DocumentRef;

/// Errors raised while loading or compiling a concept configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A concept was declared with an empty (or whitespace-only) name.
    #[error("concept #{position} has an empty name")]
    EmptyConceptName { position: usize },

    /// The same concept name was declared twice.
    #[error("duplicate concept name: {concept:?}")]
    DuplicateConcept { concept: String },

    /// A term inside a concept is empty (or whitespace-only).
    #[error("concept {concept:?}: term #{position} is empty")]
    EmptyTerm { concept: String, position: usize },

    /// A wildcard term would match the empty string as the whole term.
    #[error("concept {concept:?}: term {term:?} is degenerate, it would match the empty string")]
    DegenerateTerm { concept: String, term: String },

    /// A raw pattern rule did not compile.
    #[error("concept {concept:?}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        concept: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors scoped to a single document handed to the scanner.
#[derive(Debug, Error)]
pub enum ScanInputError {
    /// The reader could not produce any text for the document.
    #[error("document {reference}: text unavailable: {reason}")]
    Unavailable {
        reference: DocumentRef,
        reason: String,
    },

    /// The document content is not valid UTF-8 text.
    #[error("document {reference}: content is not valid UTF-8 (first invalid byte at {offset})")]
    Undecodable { reference: DocumentRef, offset: usize },

    /// A result was paired with text other than the text it was scanned from.
    #[error("document {reference}: text has {actual} characters, result was built for {expected}")]
    LengthMismatch {
        reference: DocumentRef,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by [`RendererRegistry::render`](crate::RendererRegistry::render).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no renderer registered for output kind {kind:?}")]
    UnknownKind { kind: String },

    #[error(transparent)]
    Input(#[from] ScanInputError),

    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Result type for per-document scan operations.
pub type ScanResult<T> = Result<T, ScanInputError>;
