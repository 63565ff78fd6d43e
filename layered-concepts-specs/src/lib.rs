#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing infrastructure for layered-concepts.
//!
//! Test cases are `.concepts` files: concept declarations followed by
//! paragraphs where every expected match is written inline as
//! `«Concept:text»`. Markers nest the way matches nest, so a fixture shows
//! the expected span forest at a glance.
//!
//! ## Modules
//!
//! - [`parser`] - Parses `.concepts` fixture files with inline markers
//! - [`fixture`] - Fixture types and the configuration they declare
//! - [`loader`] - Loads fixture files from disk
//! - [`runner`] - Runs fixtures through concept search and compares results
//! - [`errors`] - Error types for the fixture harness
//! - [`formatter`] - Failure reports with underlined paragraph text
//! - [`failures`] - Expected failures tracking via TOML

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod parser;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{
    Assertion, Check, ConceptFixture, Declaration, DeclaredRule, FixtureOption, Paragraph,
    SpanMarker,
};
pub use formatter::{format_failure, format_summary};
pub use loader::{load_all_fixtures, load_fixture, FIXTURE_EXTENSION};
pub use parser::{parse_fixture, parse_spans};
pub use runner::{
    run_fixture, run_harness, CheckFailure, FailureKind, FixtureRun, FoundSpan, HarnessReport,
    ParagraphRun,
};
