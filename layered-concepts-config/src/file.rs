//! Serialized shape of a concept configuration file.
//!
//! ```toml
//! name = "BasicSearch"
//!
//! [options]
//! section_sep = 125
//! token_chars = "-"
//!
//! [[concepts]]
//! name = "Performance Metrics"
//! terms = ["precision", "recall"]
//!
//! [[concepts]]
//! name = "Dates"
//! patterns = [{ regex = '\b\d{4}\b', case_insensitive = true }]
//! ```

use layered_concepts::{
    BoundaryPolicy, ConceptConfig, ConfigResult, SearchOptions, TermKind,
};
use serde::{Deserialize, Serialize};

/// A whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptFile {
    /// Display name; the file stem is used when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "OptionsSection::is_empty")]
    pub options: OptionsSection,
    #[serde(default)]
    pub concepts: Vec<ConceptEntry>,
}

/// Search options stored alongside the concepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_sep: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_pad: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_pad: Option<usize>,
    /// Characters besides letters, digits and `_` that belong to a token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_chars: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

/// One `[[concepts]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<PatternEntry>,
}

/// A raw regular-expression rule. Case-sensitive unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternEntry {
    pub regex: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub case_insensitive: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ConceptFile {
    /// Build the concept configuration, naming it `default_name` if the
    /// file carries no name of its own.
    pub fn to_config(&self, default_name: &str) -> ConfigResult<ConceptConfig> {
        let name = self.name.as_deref().unwrap_or(default_name);
        let mut builder = ConceptConfig::builder().short_name(name);
        for entry in &self.concepts {
            if !entry.terms.is_empty() || entry.patterns.is_empty() {
                builder = builder.concept(&entry.name, &entry.terms)?;
            }
            for pattern in &entry.patterns {
                builder = builder.pattern(&entry.name, &pattern.regex, pattern.case_insensitive)?;
            }
        }
        Ok(builder.build())
    }

    /// Serializable form of a configuration and its options.
    ///
    /// Pattern rules are written after the plain terms of their concept.
    pub fn from_config(config: &ConceptConfig, options: &SearchOptions) -> Self {
        let concepts = config
            .concepts()
            .iter()
            .map(|concept| {
                let mut entry = ConceptEntry {
                    name: concept.name().to_string(),
                    terms: Vec::new(),
                    patterns: Vec::new(),
                };
                for rule in concept.terms() {
                    match rule.kind() {
                        TermKind::Term => entry.terms.push(rule.raw().to_string()),
                        TermKind::Pattern => entry.patterns.push(PatternEntry {
                            regex: rule.raw().to_string(),
                            case_insensitive: !rule.case().is_sensitive(),
                        }),
                    }
                }
                entry
            })
            .collect();
        Self {
            name: Some(config.short_name().to_string()),
            options: OptionsSection::from_options(options),
            concepts,
        }
    }
}

impl OptionsSection {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Override the fields of `base` that this section sets.
    pub fn apply(&self, mut base: SearchOptions) -> SearchOptions {
        if let Some(sep) = self.section_sep {
            base.section_sep = sep;
        }
        if let Some(pad) = self.start_pad {
            base.start_pad = pad;
        }
        if let Some(pad) = self.end_pad {
            base.end_pad = pad;
        }
        if let Some(chars) = &self.token_chars {
            base.boundary = BoundaryPolicy::with_token_chars(chars.chars());
        }
        if self.threads.is_some() {
            base.threads = self.threads;
        }
        base
    }

    /// The fields of `options` that differ from the defaults.
    pub fn from_options(options: &SearchOptions) -> Self {
        let defaults = SearchOptions::default();
        let differs = |value: usize, default: usize| Some(value).filter(|v| *v != default);
        let extra = options.boundary.extra_chars();
        Self {
            section_sep: differs(options.section_sep, defaults.section_sep),
            start_pad: differs(options.start_pad, defaults.start_pad),
            end_pad: differs(options.end_pad, defaults.end_pad),
            token_chars: if extra.is_empty() {
                None
            } else {
                Some(extra.iter().collect())
            },
            threads: options.threads,
        }
    }
}
