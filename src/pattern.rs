//! Compilation of term rules into matchers.
//!
//! Plain terms become escaped literals whose wildcard markers expand to token
//! characters only, so a wildcard never reaches across whitespace or
//! punctuation. Whole-word anchoring is not encoded in the regex; the scanner
//! checks the characters on either side of each candidate against the same
//! [`BoundaryPolicy`] (the regex crate has no look-around).

use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::concept::{CaseRule, ConceptConfig, ConceptName, TermKind, TermRule};
use crate::concept::{WILDCARD_MANY, WILDCARD_ONE};
use crate::errors::{ConfigResult, ConfigurationError};

/// Which characters make up a token.
///
/// Letters, digits and `_` are always token characters. Extra characters
/// (e.g. `-` to keep hyphenated words together) can be added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BoundaryPolicy {
    extra: Vec<char>,
}

impl BoundaryPolicy {
    /// Letters, digits and underscore only.
    pub fn words() -> Self {
        Self::default()
    }

    /// Also treat the given characters as part of a token.
    pub fn with_token_chars(chars: impl IntoIterator<Item = char>) -> Self {
        let mut extra: Vec<char> = chars
            .into_iter()
            .filter(|c| !(c.is_alphanumeric() || *c == '_' || c.is_whitespace()))
            .collect();
        extra.sort_unstable();
        extra.dedup();
        Self { extra }
    }

    pub fn extra_chars(&self) -> &[char] {
        &self.extra
    }

    pub fn is_token_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || self.extra.contains(&c)
    }

    /// Regex character class matching one token character.
    ///
    /// `\p{Alphabetic}\p{N}` mirrors `char::is_alphanumeric`.
    fn token_class(&self) -> String {
        let mut class = String::from(r"[\p{Alphabetic}\p{N}_");
        for c in &self.extra {
            class.push_str(&regex::escape(&c.to_string()));
        }
        class.push(']');
        class
    }
}

/// A term rule compiled into a matcher, with a back-reference to its concept.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    index: usize,
    concept: ConceptName,
    concept_index: usize,
    term_index: usize,
    term: Arc<str>,
    case: CaseRule,
    kind: TermKind,
    regex: Regex,
}

impl CompiledPattern {
    /// Position of this pattern in declaration order across all concepts.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    pub(crate) fn concept_shared(&self) -> &ConceptName {
        &self.concept
    }

    pub fn concept_index(&self) -> usize {
        self.concept_index
    }

    pub fn term_index(&self) -> usize {
        self.term_index
    }

    /// The raw term as written in the configuration.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn case(&self) -> CaseRule {
        self.case
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// The generated regular expression source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether matches must sit on token boundaries.
    pub fn is_anchored(&self) -> bool {
        self.kind == TermKind::Term
    }
}

impl PartialEq for CompiledPattern {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.concept == other.concept
            && self.concept_index == other.concept_index
            && self.term_index == other.term_index
            && self.term == other.term
            && self.case == other.case
            && self.kind == other.kind
            && self.regex.as_str() == other.regex.as_str()
    }
}

impl Eq for CompiledPattern {}

impl std::fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.term.chars().take(20).collect();
        write!(f, "<CompiledPattern {} {:?}>", self.concept, preview)
    }
}

/// Compiles a [`ConceptConfig`] into an ordered list of patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    boundary: BoundaryPolicy,
}

impl PatternCompiler {
    pub fn new(boundary: BoundaryPolicy) -> Self {
        Self { boundary }
    }

    pub fn boundary(&self) -> &BoundaryPolicy {
        &self.boundary
    }

    /// One pattern per term rule, in concept order then term order.
    pub fn compile(&self, config: &ConceptConfig) -> ConfigResult<Vec<CompiledPattern>> {
        let mut patterns = Vec::with_capacity(config.term_count());
        for (concept_index, concept) in config.concepts().iter().enumerate() {
            for (term_index, rule) in concept.terms().iter().enumerate() {
                let regex = self.compile_rule(concept.name(), rule)?;
                patterns.push(CompiledPattern {
                    index: patterns.len(),
                    concept: concept.name_shared(),
                    concept_index,
                    term_index,
                    term: rule.raw_shared(),
                    case: rule.case(),
                    kind: rule.kind(),
                    regex,
                });
            }
        }
        tracing::debug!(
            config = config.short_name(),
            concepts = config.len(),
            patterns = patterns.len(),
            "compiled concept patterns"
        );
        Ok(patterns)
    }

    fn compile_rule(&self, concept: &str, rule: &TermRule) -> ConfigResult<Regex> {
        let source = match rule.kind() {
            TermKind::Term => {
                if !rule
                    .raw()
                    .chars()
                    .any(|c| c != WILDCARD_MANY && c != WILDCARD_ONE)
                {
                    return Err(degenerate(concept, rule));
                }
                self.term_source(rule.raw())
            }
            TermKind::Pattern => rule.raw().to_string(),
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(!rule.case().is_sensitive())
            .build()
            .map_err(|source| ConfigurationError::InvalidPattern {
                concept: concept.to_string(),
                pattern: rule.raw().to_string(),
                source,
            })?;

        if regex.is_match("") {
            return Err(degenerate(concept, rule));
        }
        Ok(regex)
    }

    fn term_source(&self, term: &str) -> String {
        let class = self.boundary.token_class();
        let mut source = String::with_capacity(term.len() * 2);
        let mut buf = [0u8; 4];
        for c in term.chars() {
            match c {
                WILDCARD_MANY => {
                    source.push_str(&class);
                    source.push('*');
                }
                WILDCARD_ONE => {
                    source.push_str(&class);
                    source.push('?');
                }
                _ => source.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            }
        }
        source
    }
}

fn degenerate(concept: &str, rule: &TermRule) -> ConfigurationError {
    ConfigurationError::DegenerateTerm {
        concept: concept.to_string(),
        term: rule.raw().to_string(),
    }
}

/// Compile a configuration with the default word boundary policy.
pub fn compile(config: &ConceptConfig) -> ConfigResult<Vec<CompiledPattern>> {
    PatternCompiler::default().compile(config)
}
