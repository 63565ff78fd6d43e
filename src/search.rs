//! Running a compiled concept set over documents.
//!
//! The compiled patterns are immutable and shared behind an `Arc`, so one
//! [`ConceptSearch`] serves any number of documents and worker threads
//! without locking. Documents are independent: a document that fails to
//! decode is reported on its own and never affects the others.

use std::sync::Arc;

use rayon::prelude::*;

use crate::concept::ConceptConfig;
use crate::document::{Document, DocumentRef, DocumentSource};
use crate::errors::{ConfigResult, ScanResult};
use crate::pattern::{BoundaryPolicy, CompiledPattern, PatternCompiler};
use crate::result::DocumentResult;
use crate::scanner::{decode, Scanner};
use crate::span::resolve;

/// Default maximum gap, in characters, between matches of one section.
pub const DEFAULT_SECTION_SEP: usize = 125;
/// Default number of characters shown before a section's first match.
pub const DEFAULT_START_PAD: usize = 20;
/// Default number of characters shown after a section's last match.
pub const DEFAULT_END_PAD: usize = 35;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub boundary: BoundaryPolicy,
    /// Worker threads for multi-document searches; `None` uses one per core.
    pub threads: Option<usize>,
    pub section_sep: usize,
    pub start_pad: usize,
    pub end_pad: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::words(),
            threads: None,
            section_sep: DEFAULT_SECTION_SEP,
            start_pad: DEFAULT_START_PAD,
            end_pad: DEFAULT_END_PAD,
        }
    }
}

/// A compiled concept configuration ready to scan documents.
#[derive(Debug, Clone)]
pub struct ConceptSearch {
    name: Arc<str>,
    patterns: Arc<[CompiledPattern]>,
    scanner: Scanner,
    options: SearchOptions,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ConceptSearch {
    pub fn new(config: &ConceptConfig) -> ConfigResult<Self> {
        Self::with_options(config, SearchOptions::default())
    }

    pub fn with_options(config: &ConceptConfig, options: SearchOptions) -> ConfigResult<Self> {
        let patterns = PatternCompiler::new(options.boundary.clone()).compile(config)?;
        let pool = options.threads.and_then(|threads| {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("concept-search-{}", i))
                .build()
            {
                Ok(pool) => Some(Arc::new(pool)),
                Err(err) => {
                    tracing::warn!(threads, error = %err, "could not build worker pool, using the global pool");
                    None
                }
            }
        });
        Ok(Self {
            name: Arc::from(config.short_name()),
            patterns: patterns.into(),
            scanner: Scanner::new(options.boundary.clone()),
            options,
            pool,
        })
    }

    /// Short name of the configuration this search was compiled from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Distinct concept names, sorted.
    pub fn concepts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.patterns.iter().map(|p| p.concept()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn search_text(&self, reference: DocumentRef, text: &str) -> DocumentResult {
        let matches = self.scanner.scan(text, &self.patterns);
        let raw_count = matches.len();
        let spans = resolve(matches);
        let result = DocumentResult::build(reference, spans, text.chars().count());
        tracing::debug!(
            document = %result.reference(),
            matches = raw_count,
            roots = result.spans().len(),
            concepts = result.concepts_present().len(),
            "scanned document"
        );
        result
    }

    pub fn search_document(&self, document: &Document) -> DocumentResult {
        self.search_text(document.reference().clone(), document.text())
            .with_metadata(document.metadata().clone())
    }

    pub fn search_bytes(&self, reference: DocumentRef, bytes: &[u8]) -> ScanResult<DocumentResult> {
        let text = decode(&reference, bytes).map_err(|err| {
            tracing::warn!(document = %reference, error = %err, "skipping undecodable document");
            err
        })?;
        Ok(self.search_text(reference, text))
    }

    /// Search many documents in parallel. Results keep the input order.
    pub fn search_documents(&self, documents: &[Document]) -> Vec<DocumentResult> {
        self.install(|| {
            documents
                .par_iter()
                .map(|doc| self.search_document(doc))
                .collect()
        })
    }

    /// Search reader hand-offs in parallel, one result per source.
    pub fn search_sources(&self, sources: Vec<DocumentSource>) -> Vec<ScanResult<DocumentResult>> {
        self.install(|| {
            sources
                .into_par_iter()
                .map(|source| {
                    let reference = source.reference.clone();
                    source
                        .into_document()
                        .map(|doc| self.search_document(&doc))
                        .map_err(|err| {
                            tracing::warn!(document = %reference, error = %err, "skipping document");
                            err
                        })
                })
                .collect()
        })
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
