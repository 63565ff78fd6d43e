//! Runs fixtures through concept search and compares against their markers.

use std::ops::Range;
use std::path::Path;

use layered_concepts::{ConceptSearch, DocumentRef, DocumentResult};

use crate::errors::SpecResult;
use crate::failures::{ExpectedFailures, FailureState, HarnessResult};
use crate::fixture::{Assertion, Check, ConceptFixture, Paragraph};
use crate::formatter::{format_failure, format_summary};
use crate::loader::load_all_fixtures;

/// One paragraph of a fixture after searching it.
#[derive(Debug, Clone)]
pub struct ParagraphRun {
    pub index: usize,
    pub text: String,
    pub result: DocumentResult,
}

/// A match as the comparison sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundSpan {
    pub concept: String,
    pub char_range: Range<usize>,
    pub depth: usize,
    pub text: String,
}

/// Why a check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// A marker has no match with the same concept and range.
    Missing(FoundSpan),
    /// A match has no marker.
    Unexpected(FoundSpan),
    /// Marker and match agree except for nesting depth.
    Depth { expected: FoundSpan, actual: usize },
    /// A `>` assertion did not hold.
    Assertion { assertion: Assertion, actual: usize },
}

/// A failed check with its expected-failures reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub paragraph: usize,
    pub reference: String,
    pub kind: FailureKind,
}

/// Outcome of running one fixture.
#[derive(Debug, Clone)]
pub struct FixtureRun {
    pub paragraphs: Vec<ParagraphRun>,
    pub passed: usize,
    pub failures: Vec<CheckFailure>,
}

/// Search every paragraph of `fixture` and check markers and assertions.
pub fn run_fixture(name: &str, fixture: &ConceptFixture) -> SpecResult<FixtureRun> {
    let search = ConceptSearch::with_options(&fixture.config()?, fixture.search_options())?;
    let mut run = FixtureRun {
        paragraphs: Vec::with_capacity(fixture.paragraphs.len()),
        passed: 0,
        failures: Vec::new(),
    };

    for paragraph in &fixture.paragraphs {
        let reference = DocumentRef::new(format!("{}#S{}", name, paragraph.index));
        let result = search.search_text(reference, &paragraph.text);
        compare_markers(paragraph, &result, &mut run);
        run.paragraphs.push(ParagraphRun {
            index: paragraph.index,
            text: paragraph.text.clone(),
            result,
        });
    }

    for assertion in &fixture.assertions {
        let result = match run.paragraphs.get(assertion.paragraph) {
            Some(p) => &p.result,
            None => continue,
        };
        let (holds, actual) = check_assertion(&assertion.check, result);
        if holds {
            run.passed += 1;
        } else {
            run.failures.push(CheckFailure {
                paragraph: assertion.paragraph,
                reference: ExpectedFailures::assertion_ref(assertion.source_line),
                kind: FailureKind::Assertion {
                    assertion: assertion.clone(),
                    actual,
                },
            });
        }
    }

    Ok(run)
}

fn compare_markers(paragraph: &Paragraph, result: &DocumentResult, run: &mut FixtureRun) {
    let mut found: Vec<Option<FoundSpan>> = result
        .iter()
        .with_depth()
        .map(|(depth, span)| {
            Some(FoundSpan {
                concept: span.concept().to_string(),
                char_range: span.start..span.end,
                depth,
                text: span.text.clone(),
            })
        })
        .collect();

    for marker in &paragraph.markers {
        let expected = FoundSpan {
            concept: marker.concept.clone(),
            char_range: marker.char_range.clone(),
            depth: marker.depth,
            text: marker.text.clone(),
        };
        let same_place = |f: &FoundSpan| f.concept == expected.concept && f.char_range == expected.char_range;
        // prefer a match at the same depth
        let slot = found
            .iter()
            .position(|f| f.as_ref().map_or(false, |f| same_place(f) && f.depth == expected.depth))
            .or_else(|| found.iter().position(|f| f.as_ref().map_or(false, same_place)));
        let reference = ExpectedFailures::marker_ref(
            paragraph.index,
            &expected.concept,
            expected.char_range.start,
        );
        match slot.and_then(|i| found[i].take()) {
            Some(actual) if actual.depth == expected.depth => run.passed += 1,
            Some(actual) => run.failures.push(CheckFailure {
                paragraph: paragraph.index,
                reference,
                kind: FailureKind::Depth {
                    expected,
                    actual: actual.depth,
                },
            }),
            None => run.failures.push(CheckFailure {
                paragraph: paragraph.index,
                reference,
                kind: FailureKind::Missing(expected),
            }),
        }
    }

    for actual in found.into_iter().flatten() {
        run.failures.push(CheckFailure {
            paragraph: paragraph.index,
            reference: ExpectedFailures::marker_ref(
                paragraph.index,
                &actual.concept,
                actual.char_range.start,
            ),
            kind: FailureKind::Unexpected(actual),
        });
    }
}

fn check_assertion(check: &Check, result: &DocumentResult) -> (bool, usize) {
    match check {
        Check::Count { concept, expected } => {
            let actual = result.count_for(concept);
            (actual == *expected, actual)
        }
        Check::Roots(expected) => {
            let actual = result.spans().len();
            (actual == *expected, actual)
        }
        Check::Matches(expected) => {
            let actual = result.match_count();
            (actual == *expected, actual)
        }
        Check::Absent(concept) => {
            let actual = result.count_for(concept);
            (actual == 0, actual)
        }
    }
}

/// Harness totals plus the printable report.
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub result: HarnessResult,
    pub report: String,
}

/// Run every fixture under `dir`, classifying failures with `expected`.
pub fn run_harness(dir: &Path, expected: &ExpectedFailures) -> SpecResult<HarnessReport> {
    let mut result = HarnessResult::new();
    let mut report = String::new();

    for (name, fixture) in load_all_fixtures(dir)? {
        let run = run_fixture(&name, &fixture)?;
        let mut fixture_expected = 0;
        let mut fixture_regressions = 0;

        for _ in 0..run.passed {
            result.record_pass();
        }
        for failure in &run.failures {
            let state = expected.state(&name, &failure.reference);
            result.record_failure(state);
            match state {
                FailureState::Regression => {
                    fixture_regressions += 1;
                    let text = run
                        .paragraphs
                        .get(failure.paragraph)
                        .map(|p| p.text.as_str());
                    report.push_str(&format_failure(&name, failure, text));
                }
                FailureState::Known | FailureState::Pending => fixture_expected += 1,
            }
        }
        report.push_str(&format_summary(
            &name,
            run.passed,
            run.failures.len(),
            fixture_expected,
            fixture_regressions,
        ));
    }

    Ok(HarnessReport { result, report })
}
