//! Concept configuration: named concepts and their ordered term rules.
//!
//! A configuration is built once and never mutated. Declaration order of
//! concepts, and of terms within a concept, is preserved and later decides
//! tie-breaks when two matches start at the same offset.

use std::sync::Arc;

use crate::errors::{ConfigResult, ConfigurationError};

/// Shared, cheaply clonable concept name.
pub type ConceptName = Arc<str>;

/// Marker for "zero or more token characters".
pub const WILDCARD_MANY: char = '*';

/// Marker for "zero or one token character".
pub const WILDCARD_ONE: char = '?';

/// Case policy of a term rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseRule {
    Sensitive,
    Insensitive,
}

impl CaseRule {
    /// Derive the case rule of a plain term.
    ///
    /// A term whose letters are all uppercase (at least one letter, other
    /// characters ignored) is matched case-sensitively, e.g. `"AI"` or
    /// `"F1"`. Anything else is matched case-insensitively.
    pub fn for_term(term: &str) -> Self {
        let mut letters = term.chars().filter(|c| c.is_alphabetic()).peekable();
        if letters.peek().is_none() {
            return CaseRule::Insensitive;
        }
        if letters.all(|c| c.is_uppercase()) {
            CaseRule::Sensitive
        } else {
            CaseRule::Insensitive
        }
    }

    pub fn is_sensitive(self) -> bool {
        self == CaseRule::Sensitive
    }
}

/// How the raw string of a term rule is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// A literal word or phrase, optionally containing wildcard markers.
    Term,
    /// A raw regular expression, matched without boundary anchoring.
    Pattern,
}

/// A single term or pattern belonging to a concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRule {
    raw: Arc<str>,
    case: CaseRule,
    kind: TermKind,
}

impl TermRule {
    /// A plain term; the case rule is derived from its letters.
    pub fn term(raw: &str) -> Self {
        Self {
            raw: Arc::from(raw),
            case: CaseRule::for_term(raw),
            kind: TermKind::Term,
        }
    }

    /// A raw regular expression with an explicit case rule.
    pub fn pattern(raw: &str, case_insensitive: bool) -> Self {
        Self {
            raw: Arc::from(raw),
            case: if case_insensitive {
                CaseRule::Insensitive
            } else {
                CaseRule::Sensitive
            },
            kind: TermKind::Pattern,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn raw_shared(&self) -> Arc<str> {
        self.raw.clone()
    }

    pub fn case(&self) -> CaseRule {
        self.case
    }

    pub fn kind(&self) -> TermKind {
        self.kind
    }

    /// True if the term contains a wildcard marker.
    pub fn has_wildcard(&self) -> bool {
        self.kind == TermKind::Term && self.raw.contains([WILDCARD_MANY, WILDCARD_ONE])
    }
}

/// A named concept with its ordered term rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    name: ConceptName,
    terms: Vec<TermRule>,
}

impl Concept {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_shared(&self) -> ConceptName {
        self.name.clone()
    }

    pub fn terms(&self) -> &[TermRule] {
        &self.terms
    }
}

/// The normalized, immutable set of concepts used for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptConfig {
    short_name: String,
    concepts: Vec<Concept>,
}

impl ConceptConfig {
    /// Load a configuration from an ordered mapping of concept name to terms.
    ///
    /// ```
    /// use layered_concepts::ConceptConfig;
    ///
    /// let config = ConceptConfig::load(vec![
    ///     ("Performance Metrics", vec!["recall", "sensitivity"]),
    ///     ("Data Ethics", vec!["bias"]),
    /// ])
    /// .unwrap();
    /// assert_eq!(config.len(), 2);
    /// ```
    pub fn load<I, N, T, S>(raw_concepts: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::builder();
        for (name, terms) in raw_concepts {
            builder = builder.concept(name, terms)?;
        }
        Ok(builder.build())
    }

    pub fn builder() -> ConceptConfigBuilder {
        ConceptConfigBuilder::default()
    }

    /// Display name of the configuration, e.g. the file stem it came from.
    pub fn short_name(&self) -> &str {
        if self.short_name.is_empty() {
            "Empty"
        } else {
            &self.short_name
        }
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concept(&self, name: &str) -> Option<&Concept> {
        self.concepts.iter().find(|c| &*c.name == name)
    }

    /// Number of concepts.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Total number of term rules across all concepts.
    pub fn term_count(&self) -> usize {
        self.concepts.iter().map(|c| c.terms.len()).sum()
    }
}

impl std::fmt::Display for ConceptConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<ConceptConfig {}({})>", self.short_name(), self.concepts.len())
    }
}

/// Incremental construction of a [`ConceptConfig`].
#[derive(Debug, Default)]
pub struct ConceptConfigBuilder {
    short_name: String,
    concepts: Vec<Concept>,
    // concepts created implicitly by `pattern`, still open for `concept`
    pattern_only: Vec<usize>,
}

impl ConceptConfigBuilder {
    pub fn short_name(mut self, name: impl Into<String>) -> Self {
        self.short_name = name.into();
        self
    }

    /// Declare a concept with its ordered terms.
    ///
    /// Declaring the same name twice is an error, except that a concept
    /// introduced only through [`pattern`](Self::pattern) may still receive
    /// its term list.
    pub fn concept<N, T, S>(mut self, name: N, terms: T) -> ConfigResult<Self>
    where
        N: AsRef<str>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = self.check_name(name.as_ref())?;
        let idx = match self.position(&name) {
            Some(idx) if self.pattern_only.contains(&idx) => {
                self.pattern_only.retain(|&i| i != idx);
                idx
            }
            Some(_) => return Err(ConfigurationError::DuplicateConcept { concept: name }),
            None => self.push_concept(&name),
        };

        for (position, raw) in terms.into_iter().enumerate() {
            let term = raw.as_ref().trim();
            if term.is_empty() {
                return Err(ConfigurationError::EmptyTerm {
                    concept: name,
                    position,
                });
            }
            let concept = &mut self.concepts[idx];
            if concept
                .terms
                .iter()
                .any(|t| t.kind == TermKind::Term && &*t.raw == term)
            {
                tracing::warn!(concept = %name, term, "skipping duplicate term");
                continue;
            }
            concept.terms.push(TermRule::term(term));
        }
        Ok(self)
    }

    /// Add a raw regular-expression rule to a concept, creating the concept
    /// if it was not declared yet.
    pub fn pattern(
        mut self,
        concept: impl AsRef<str>,
        regex: impl AsRef<str>,
        case_insensitive: bool,
    ) -> ConfigResult<Self> {
        let name = self.check_name(concept.as_ref())?;
        let regex = regex.as_ref();
        if regex.trim().is_empty() {
            let position = self
                .position(&name)
                .map_or(0, |idx| self.concepts[idx].terms.len());
            return Err(ConfigurationError::EmptyTerm {
                concept: name,
                position,
            });
        }
        let idx = match self.position(&name) {
            Some(idx) => idx,
            None => {
                let idx = self.push_concept(&name);
                self.pattern_only.push(idx);
                idx
            }
        };
        self.concepts[idx]
            .terms
            .push(TermRule::pattern(regex, case_insensitive));
        Ok(self)
    }

    pub fn build(self) -> ConceptConfig {
        ConceptConfig {
            short_name: self.short_name,
            concepts: self.concepts,
        }
    }

    fn check_name(&self, name: &str) -> ConfigResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyConceptName {
                position: self.concepts.len(),
            });
        }
        Ok(name.to_string())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.concepts.iter().position(|c| &*c.name == name)
    }

    fn push_concept(&mut self, name: &str) -> usize {
        self.concepts.push(Concept {
            name: Arc::from(name),
            terms: Vec::new(),
        });
        self.concepts.len() - 1
    }
}
