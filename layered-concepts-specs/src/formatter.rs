//! Failure reports with the paragraph text and an underline.

use crate::runner::{CheckFailure, FailureKind, FoundSpan};
use std::fmt::Write;

/// Format a failed check with the paragraph it belongs to.
pub fn format_failure(fixture_name: &str, failure: &CheckFailure, text_context: Option<&str>) -> String {
    let mut output = String::new();

    writeln!(output, "\nFAIL: {} {}", fixture_name, failure.reference).unwrap();
    writeln!(output).unwrap();

    let underline = match &failure.kind {
        FailureKind::Missing(span) | FailureKind::Unexpected(span) => Some(span),
        FailureKind::Depth { expected, .. } => Some(expected),
        FailureKind::Assertion { .. } => None,
    };
    if let Some(context) = text_context {
        // one line per paragraph line keeps the caret columns right
        let flat: String = context.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
        writeln!(output, "  {}", flat).unwrap();
        if let Some(span) = underline {
            writeln!(output, "{}", carets(&flat, span)).unwrap();
        }
        writeln!(output).unwrap();
    }

    match &failure.kind {
        FailureKind::Missing(span) => {
            writeln!(output, "  expected {} match not found: \"{}\"", span.concept, span.text).unwrap();
        }
        FailureKind::Unexpected(span) => {
            writeln!(
                output,
                "  unexpected {} match at depth {}: \"{}\"",
                span.concept, span.depth, span.text
            )
            .unwrap();
        }
        FailureKind::Depth { expected, actual } => {
            writeln!(
                output,
                "  {} match \"{}\": expected depth {}, found {}",
                expected.concept, expected.text, expected.depth, actual
            )
            .unwrap();
        }
        FailureKind::Assertion { assertion, actual } => {
            writeln!(output, "  assertion failed: {}", assertion.check).unwrap();
            writeln!(output, "    found {}", actual).unwrap();
        }
    }

    if let Some(hint) = generate_hint(&failure.kind) {
        writeln!(output).unwrap();
        writeln!(output, "  hint: {}", hint).unwrap();
    }

    output
}

/// Format a summary of one fixture.
pub fn format_summary(
    fixture_name: &str,
    passed: usize,
    failed: usize,
    expected_failures: usize,
    regressions: usize,
) -> String {
    let mut output = String::new();

    let status = if regressions > 0 { "FAIL" } else { "PASS" };

    writeln!(output, "\n{}: {}", status, fixture_name).unwrap();
    writeln!(
        output,
        "  {} passed, {} failed ({} expected, {} regressions)",
        passed, failed, expected_failures, regressions
    )
    .unwrap();

    output
}

fn carets(context: &str, span: &FoundSpan) -> String {
    let width = span.char_range.end.saturating_sub(span.char_range.start).max(1);
    let start = span.char_range.start.min(context.chars().count());
    format!("{}{}", " ".repeat(start + 2), "^".repeat(width))
}

fn generate_hint(kind: &FailureKind) -> Option<String> {
    match kind {
        FailureKind::Missing(span) if span.text.contains(|c: char| c == '-' || c == '\'') => Some(
            "terms are cut at non-word characters; add `@option token_chars` for hyphens or apostrophes"
                .to_string(),
        ),
        FailureKind::Missing(span) if span.text.chars().any(char::is_lowercase) => None,
        FailureKind::Missing(span) if span.text.chars().any(char::is_alphabetic) => Some(format!(
            "an all-caps term only matches case-sensitively, check the declared spelling of \"{}\"",
            span.text
        )),
        FailureKind::Depth { .. } => Some(
            "a span partly overlapping an earlier one is moved to the top level".to_string(),
        ),
        _ => None,
    }
}
