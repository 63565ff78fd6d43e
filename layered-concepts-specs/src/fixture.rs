//! Fixture types for `.concepts` files.

use std::ops::Range;

use layered_concepts::{BoundaryPolicy, ConceptConfig, SearchOptions};

use crate::errors::SpecResult;

/// A parsed `.concepts` fixture file.
#[derive(Debug, Clone, Default)]
pub struct ConceptFixture {
    /// Title from `# Title` header.
    pub title: Option<String>,
    /// Concept declarations (`@ Concept: term | term`) in file order.
    pub declarations: Vec<Declaration>,
    /// Search options (`@option key: value`).
    pub options: Vec<FixtureOption>,
    /// Paragraphs separated by `---`.
    pub paragraphs: Vec<Paragraph>,
    /// Assertions (`> ...` lines).
    pub assertions: Vec<Assertion>,
}

/// A concept declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub concept: String,
    pub rule: DeclaredRule,
    pub source_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredRule {
    /// `@ Concept: term | term`
    Terms(Vec<String>),
    /// `@pattern Concept: regex`, or `@pattern/i` for case-insensitive.
    Pattern { regex: String, case_insensitive: bool },
}

/// A search option set by the fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureOption {
    /// Extra token characters, e.g. `@option token_chars: -`.
    TokenChars(String),
}

/// A paragraph of fixture text with its expected matches.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// Zero-based paragraph index.
    pub index: usize,
    /// Text with all markers removed.
    pub text: String,
    /// Expected matches, sorted by start then longest first.
    pub markers: Vec<SpanMarker>,
}

/// An expected match written as `«Concept:text»`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanMarker {
    pub concept: String,
    /// The marked text, markers removed.
    pub text: String,
    /// Character range in the paragraph text.
    pub char_range: Range<usize>,
    /// Nesting depth; 0 for top-level markers.
    pub depth: usize,
}

/// An assertion about the matches of one paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    /// Paragraph the assertion follows.
    pub paragraph: usize,
    pub check: Check,
    /// Line in the fixture file (1-based).
    pub source_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// `> count Concept = n`: matches of the concept, nested ones included.
    Count { concept: String, expected: usize },
    /// `> roots = n`: top-level spans.
    Roots(usize),
    /// `> matches = n`: all matches.
    Matches(usize),
    /// `> absent Concept`
    Absent(String),
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::Count { concept, expected } => write!(f, "count {} = {}", concept, expected),
            Check::Roots(n) => write!(f, "roots = {}", n),
            Check::Matches(n) => write!(f, "matches = {}", n),
            Check::Absent(concept) => write!(f, "absent {}", concept),
        }
    }
}

impl ConceptFixture {
    /// All expected markers across paragraphs.
    pub fn markers(&self) -> Vec<&SpanMarker> {
        self.paragraphs.iter().flat_map(|p| &p.markers).collect()
    }

    /// Build the concept configuration the fixture declares.
    pub fn config(&self) -> SpecResult<ConceptConfig> {
        let mut builder = ConceptConfig::builder().short_name(self.title.as_deref().unwrap_or(""));
        for declaration in &self.declarations {
            builder = match &declaration.rule {
                DeclaredRule::Terms(terms) => builder.concept(&declaration.concept, terms)?,
                DeclaredRule::Pattern {
                    regex,
                    case_insensitive,
                } => builder.pattern(&declaration.concept, regex, *case_insensitive)?,
            };
        }
        Ok(builder.build())
    }

    pub fn search_options(&self) -> SearchOptions {
        let mut options = SearchOptions::default();
        for option in &self.options {
            match option {
                FixtureOption::TokenChars(chars) => {
                    options.boundary = BoundaryPolicy::with_token_chars(chars.chars());
                }
            }
        }
        options
    }
}
