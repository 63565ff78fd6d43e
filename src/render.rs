//! Output renderers keyed by kind.
//!
//! The core ships three kinds: `text` (section view), `annotated` (inline
//! `«Concept:text»` markers) and `display` (aligned marker lines). Other
//! output formats register their own [`Renderer`] on a [`RendererRegistry`].

use std::collections::BTreeMap;
use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::display::DocumentResultDisplay;
use crate::errors::RenderError;
use crate::result::{char_slice, DocumentResult};
use crate::search::{DEFAULT_END_PAD, DEFAULT_SECTION_SEP, DEFAULT_START_PAD};

static LAYOUT_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r\x0C\t]").unwrap());

/// Renders a document result together with the text it was scanned from.
///
/// The registry checks that `text` belongs to `result` before calling.
pub trait Renderer: Send + Sync {
    fn render(&self, result: &DocumentResult, text: &str) -> Result<String, RenderError>;
}

/// Section view: the document name, then for each section its padded text
/// window followed by one line per match aligned under it.
///
/// ```text
/// simple-document-1.txt
/// Recall and sensitivity are distinct from bias
/// RECALL[Performance Metrics]
///            SENSITIVITY[Performance Metrics]
///                                          BIAS[Data Ethics]
/// ```
#[derive(Debug, Clone)]
pub struct TextRenderer {
    pub section_sep: usize,
    pub start_pad: usize,
    pub end_pad: usize,
    pub uppercase_match: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            section_sep: DEFAULT_SECTION_SEP,
            start_pad: DEFAULT_START_PAD,
            end_pad: DEFAULT_END_PAD,
            uppercase_match: true,
        }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, result: &DocumentResult, text: &str) -> Result<String, RenderError> {
        let mut out = String::new();
        writeln!(out, "{}", result.reference())?;
        for section in result.sections(self.section_sep) {
            let window = section.window(self.start_pad, self.end_pad, result.text_length());
            let excerpt = char_slice(text, window.clone());
            writeln!(out, "{}", LAYOUT_WHITESPACE.replace_all(excerpt, " "))?;
            for span in &section.spans {
                let indent = span.start - window.start;
                let matched = if self.uppercase_match {
                    span.text.to_uppercase()
                } else {
                    span.text.clone()
                };
                writeln!(out, "{:indent$}{}[{}]", "", matched, span.concept(), indent = indent)?;
            }
        }
        Ok(out)
    }
}

/// Full text with nested `«Concept:text»` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatedRenderer;

impl Renderer for AnnotatedRenderer {
    fn render(&self, result: &DocumentResult, text: &str) -> Result<String, RenderError> {
        Ok(result.annotated(text)?)
    }
}

/// The [`DocumentResultDisplay`] view.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayRenderer;

impl Renderer for DisplayRenderer {
    fn render(&self, result: &DocumentResult, text: &str) -> Result<String, RenderError> {
        let mut out = String::new();
        write!(out, "{}", DocumentResultDisplay::new(result, text))?;
        Ok(out)
    }
}

/// Renderers by output kind.
pub struct RendererRegistry {
    renderers: BTreeMap<String, Box<dyn Renderer>>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("text", TextRenderer::default());
        registry.register("annotated", AnnotatedRenderer);
        registry.register("display", DisplayRenderer);
        registry
    }
}

impl RendererRegistry {
    /// A registry without the built-in kinds.
    pub fn empty() -> Self {
        Self {
            renderers: BTreeMap::new(),
        }
    }

    /// Register `renderer` under `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, renderer: impl Renderer + 'static) {
        self.renderers.insert(kind.into(), Box::new(renderer));
    }

    /// Takes self
    pub fn with(mut self, kind: impl Into<String>, renderer: impl Renderer + 'static) -> Self {
        self.register(kind, renderer);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.renderers.keys().map(String::as_str)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn render(
        &self,
        kind: &str,
        result: &DocumentResult,
        text: &str,
    ) -> Result<String, RenderError> {
        let renderer = self
            .renderers
            .get(kind)
            .ok_or_else(|| RenderError::UnknownKind {
                kind: kind.to_string(),
            })?;
        result.check_text(text)?;
        renderer.render(result, text)
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}
