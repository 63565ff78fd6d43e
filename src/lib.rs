#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]
//! Concept search over extracted document text.
//!
//! A concept is a named set of terms, phrases and wildcard patterns. The
//! pipeline compiles a [`ConceptConfig`] once, then for each document scans
//! the text, resolves overlapping matches into a nested span forest and
//! aggregates it into a [`DocumentResult`].
//!
//! ## Core Types
//!
//! - [`ConceptConfig`] - ordered concepts with their term rules
//! - [`CompiledPattern`] / [`PatternCompiler`] - term rules as matchers
//! - [`RawMatch`] / [`Span`] - located matches, flat and nested
//! - [`DocumentResult`] - spans, counts and linearizations for one document
//! - [`ConceptSearch`] - compiled patterns shared across a worker pool
//! - [`RendererRegistry`] - output renderers keyed by kind
//!
//! ## Example
//!
//! ```
//! use layered_concepts::{ConceptConfig, ConceptSearch, DocumentRef};
//!
//! let config = ConceptConfig::load(vec![
//!     ("Performance Metrics", vec!["recall", "sensitivity"]),
//!     ("Data Ethics", vec!["bias"]),
//! ])
//! .unwrap();
//! let search = ConceptSearch::new(&config).unwrap();
//!
//! let text = "Recall and sensitivity are distinct from bias";
//! let result = search.search_text(DocumentRef::new("doc.txt"), text);
//! assert_eq!(result.count_for("Performance Metrics"), 2);
//! assert_eq!(
//!     result.annotated(text).unwrap(),
//!     "«Performance Metrics:Recall» and «Performance Metrics:sensitivity» are distinct from «Data Ethics:bias»"
//! );
//! ```

mod concept;
mod display;
mod document;
mod errors;
mod pattern;
mod render;
mod result;
mod scanner;
mod search;
mod span;

pub use concept::{
    CaseRule, Concept, ConceptConfig, ConceptConfigBuilder, ConceptName, TermKind, TermRule,
    WILDCARD_MANY, WILDCARD_ONE,
};
pub use display::DocumentResultDisplay;
pub use document::{
    Document, DocumentMetadata, DocumentRef, DocumentSource, HintKind, SourceContent,
    StructuralHint,
};
pub use errors::{ConfigResult, ConfigurationError, RenderError, ScanInputError, ScanResult};
pub use pattern::{compile, BoundaryPolicy, CompiledPattern, PatternCompiler};
pub use render::{AnnotatedRenderer, DisplayRenderer, Renderer, RendererRegistry, TextRenderer};
pub use result::{ConceptTerms, DocumentResult, Section, Segment};
pub use scanner::{scan, scan_bytes, RawMatch, Scanner};
pub use search::{
    ConceptSearch, SearchOptions, DEFAULT_END_PAD, DEFAULT_SECTION_SEP, DEFAULT_START_PAD,
};
pub use span::{resolve, Span, SpanIter};
