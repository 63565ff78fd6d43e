//! Parser for `.concepts` fixture files.
//!
//! ```text
//! # Title
//! @ Performance Metrics: recall | sensitivity
//! @pattern/i Dates: \b\d{4}\b
//! @option token_chars: -
//!
//! «Performance Metrics:Recall» in «Dates:2022».
//! > count Performance Metrics = 1
//! ---
//! Next paragraph.
//! ```

use crate::errors::{SpecError, SpecResult};
use crate::fixture::{
    Assertion, Check, ConceptFixture, Declaration, DeclaredRule, FixtureOption, Paragraph,
    SpanMarker,
};

/// Parse span markers from text, returning normalized text and markers.
///
/// Input text may contain nested `«Concept:text»` markers. Character ranges
/// refer to the normalized (marker-free) text. `first_line` is the fixture
/// line the input starts on, used in error messages.
pub fn parse_spans(input: &str, first_line: usize) -> SpecResult<(String, Vec<SpanMarker>)> {
    struct Open {
        concept: String,
        char_start: usize,
        byte_start: usize,
    }

    let mut markers = Vec::new();
    let mut open: Vec<Open> = Vec::new();
    let mut normalized = String::with_capacity(input.len());
    let mut char_len = 0;
    let mut chars = input.char_indices();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '«' => {
                let mut concept = String::new();
                loop {
                    match chars.next() {
                        Some((_, ':')) => break,
                        Some((_, c)) if c == '«' || c == '»' || c == '\n' => {
                            return Err(SpecError::Parse {
                                line: first_line + count_lines(input, pos),
                                message: format!("Invalid span marker: expected ':' before '{}'", c.escape_default()),
                            });
                        }
                        Some((_, c)) => concept.push(c),
                        None => {
                            return Err(SpecError::Parse {
                                line: first_line + count_lines(input, pos),
                                message: "Unclosed span marker: expected ':'".to_string(),
                            });
                        }
                    }
                }
                let concept = concept.trim().to_string();
                if concept.is_empty() {
                    return Err(SpecError::Parse {
                        line: first_line + count_lines(input, pos),
                        message: "Span marker without a concept name".to_string(),
                    });
                }
                open.push(Open {
                    concept,
                    char_start: char_len,
                    byte_start: normalized.len(),
                });
            }
            '»' => {
                let marker = open.pop().ok_or_else(|| SpecError::Parse {
                    line: first_line + count_lines(input, pos),
                    message: "Unmatched '»'".to_string(),
                })?;
                markers.push(SpanMarker {
                    concept: marker.concept,
                    text: normalized[marker.byte_start..].to_string(),
                    char_range: marker.char_start..char_len,
                    depth: open.len(),
                });
            }
            _ => {
                normalized.push(ch);
                char_len += 1;
            }
        }
    }

    if !open.is_empty() {
        return Err(SpecError::Parse {
            line: first_line + count_lines(input, input.len()),
            message: "Unclosed span marker: expected '»'".to_string(),
        });
    }

    markers.sort_by(|a, b| {
        a.char_range
            .start
            .cmp(&b.char_range.start)
            .then(b.char_range.end.cmp(&a.char_range.end))
            .then(a.depth.cmp(&b.depth))
    });
    Ok((normalized, markers))
}

/// Count newlines before a byte position.
fn count_lines(input: &str, byte_pos: usize) -> usize {
    input[..byte_pos.min(input.len())]
        .chars()
        .filter(|&c| c == '\n')
        .count()
}

/// Parse a full `.concepts` fixture file.
pub fn parse_fixture(input: &str) -> SpecResult<ConceptFixture> {
    let mut fixture = ConceptFixture::default();
    // (first line number, lines) per paragraph
    let mut paragraph_lines: Vec<(usize, Vec<&str>)> = vec![(0, Vec::new())];
    let mut assertion_lines = Vec::new();

    for (line_idx, line) in input.lines().enumerate() {
        let line_num = line_idx + 1;
        let trimmed = line.trim();

        if let Some(title) = trimmed.strip_prefix("# ") {
            if fixture.title.is_none() {
                fixture.title = Some(title.trim().to_string());
            }
        } else if trimmed == "---" {
            paragraph_lines.push((0, Vec::new()));
        } else if let Some(rest) = trimmed.strip_prefix('@') {
            parse_directive(rest, line_num, &mut fixture)?;
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            assertion_lines.push((paragraph_lines.len() - 1, line_num, rest.trim()));
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            if let Some((first, lines)) = paragraph_lines.last_mut() {
                if lines.is_empty() {
                    *first = line_num;
                }
                lines.push(line);
            }
        }
    }

    // paragraph indices count only non-empty paragraphs
    let mut remap = Vec::with_capacity(paragraph_lines.len());
    for (first_line, lines) in paragraph_lines {
        if lines.is_empty() {
            remap.push(None);
            continue;
        }
        let index = fixture.paragraphs.len();
        let (text, markers) = parse_spans(&lines.join("\n"), first_line)?;
        fixture.paragraphs.push(Paragraph {
            index,
            text,
            markers,
        });
        remap.push(Some(index));
    }

    for (raw_paragraph, line_num, text) in assertion_lines {
        let paragraph = remap[..=raw_paragraph]
            .iter()
            .rev()
            .find_map(|p| *p)
            .ok_or_else(|| SpecError::Parse {
                line: line_num,
                message: "Assertion before any paragraph".to_string(),
            })?;
        fixture.assertions.push(Assertion {
            paragraph,
            check: parse_check(text, line_num)?,
            source_line: line_num,
        });
    }

    Ok(fixture)
}

fn parse_directive(rest: &str, line: usize, fixture: &mut ConceptFixture) -> SpecResult<()> {
    let (head, body) = rest.split_once(':').ok_or_else(|| SpecError::Parse {
        line,
        message: format!("Expected ':' in directive: @{}", rest),
    })?;
    let body = body.trim();
    // `@ Concept: ...` has no keyword
    let (keyword, name) = if head.starts_with(char::is_whitespace) {
        ("", head.trim())
    } else {
        let (keyword, name) = head.split_once(char::is_whitespace).unwrap_or((head, ""));
        (keyword, name.trim())
    };

    match keyword {
        "" => fixture.declarations.push(Declaration {
            concept: name.to_string(),
            rule: DeclaredRule::Terms(body.split('|').map(|t| t.trim().to_string()).collect()),
            source_line: line,
        }),
        "pattern" | "pattern/i" => fixture.declarations.push(Declaration {
            concept: name.to_string(),
            rule: DeclaredRule::Pattern {
                regex: body.to_string(),
                case_insensitive: keyword == "pattern/i",
            },
            source_line: line,
        }),
        "option" => match name {
            "token_chars" => fixture
                .options
                .push(FixtureOption::TokenChars(body.to_string())),
            other => {
                return Err(SpecError::Parse {
                    line,
                    message: format!("Unknown option: {}", other),
                })
            }
        },
        other => {
            return Err(SpecError::Parse {
                line,
                message: format!("Unknown directive: @{}", other),
            })
        }
    }
    Ok(())
}

fn parse_check(text: &str, line: usize) -> SpecResult<Check> {
    let parse_count = |value: &str| -> SpecResult<usize> {
        value.trim().parse().map_err(|_| SpecError::Parse {
            line,
            message: format!("Expected a count, found '{}'", value.trim()),
        })
    };

    if let Some(concept) = text.strip_prefix("absent ") {
        return Ok(Check::Absent(concept.trim().to_string()));
    }
    let (lhs, rhs) = text.split_once('=').ok_or_else(|| SpecError::Parse {
        line,
        message: format!("Expected 'name = value' assertion: {}", text),
    })?;
    let lhs = lhs.trim();
    match lhs {
        "roots" => Ok(Check::Roots(parse_count(rhs)?)),
        "matches" => Ok(Check::Matches(parse_count(rhs)?)),
        _ => match lhs.strip_prefix("count ") {
            Some(concept) => Ok(Check::Count {
                concept: concept.trim().to_string(),
                expected: parse_count(rhs)?,
            }),
            None => Err(SpecError::Parse {
                line,
                message: format!("Unknown assertion: {}", text),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_markers() {
        let (text, markers) =
            parse_spans("«Performance Metrics:Recall» and «Data Ethics:bias».", 1).unwrap();
        assert_eq!(text, "Recall and bias.");
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].concept, "Performance Metrics");
        assert_eq!(markers[0].char_range, 0..6);
        assert_eq!(markers[1].text, "bias");
        assert_eq!(markers[1].char_range, 11..15);
        assert!(markers.iter().all(|m| m.depth == 0));
    }

    #[test]
    fn test_parse_nested_markers() {
        let (text, markers) = parse_spans(
            "«Justice:«Distribution:distributive» «Ethics:justice»».",
            1,
        )
        .unwrap();
        assert_eq!(text, "distributive justice.");
        let seen: Vec<_> = markers
            .iter()
            .map(|m| (m.concept.as_str(), m.char_range.clone(), m.depth))
            .collect();
        assert_eq!(
            seen,
            [
                ("Justice", 0..20, 0),
                ("Distribution", 0..12, 1),
                ("Ethics", 13..20, 1)
            ]
        );
    }

    #[test]
    fn test_char_ranges_for_multibyte_text() {
        let (text, markers) = parse_spans("naïve «X:bias»", 1).unwrap();
        assert_eq!(text, "naïve bias");
        assert_eq!(markers[0].char_range, 6..10);
    }

    #[test]
    fn test_marker_errors() {
        let err = parse_spans("ok\n«X:unclosed", 4).unwrap_err();
        assert!(matches!(err, SpecError::Parse { line: 5, .. }));
        assert!(parse_spans("stray»", 1).is_err());
        assert!(parse_spans("«:empty»", 1).is_err());
        assert!(parse_spans("«X no colon»", 1).is_err());
    }

    #[test]
    fn test_parse_fixture() {
        let fixture = parse_fixture(
            "# Test: Simple\n\
             // comment\n\
             @ Performance Metrics: recall | sensitivity\n\
             @pattern/i Dates: \\b\\d{4}\\b\n\
             @option token_chars: -\n\
             \n\
             «Performance Metrics:Recall» in «Dates:2022».\n\
             > count Performance Metrics = 1\n\
             > roots = 2\n\
             ---\n\
             Nothing here.\n\
             > absent Dates\n",
        )
        .unwrap();

        assert_eq!(fixture.title.as_deref(), Some("Test: Simple"));
        assert_eq!(fixture.declarations.len(), 2);
        assert_eq!(
            fixture.declarations[0].rule,
            DeclaredRule::Terms(vec!["recall".into(), "sensitivity".into()])
        );
        assert_eq!(
            fixture.declarations[1].rule,
            DeclaredRule::Pattern {
                regex: r"\b\d{4}\b".into(),
                case_insensitive: true
            }
        );
        assert_eq!(fixture.options, [FixtureOption::TokenChars("-".into())]);
        assert_eq!(fixture.paragraphs.len(), 2);
        assert_eq!(fixture.paragraphs[0].text, "Recall in 2022.");
        assert_eq!(fixture.markers().len(), 2);

        let checks: Vec<_> = fixture
            .assertions
            .iter()
            .map(|a| (a.paragraph, a.check.to_string(), a.source_line))
            .collect();
        assert_eq!(
            checks,
            [
                (0, "count Performance Metrics = 1".to_string(), 8),
                (0, "roots = 2".to_string(), 9),
                (1, "absent Dates".to_string(), 12),
            ]
        );
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse_fixture("@frobnicate X: y\n").unwrap_err();
        assert!(err.to_string().contains("Unknown directive"));
        let err = parse_fixture("text\n> count X = many\n").unwrap_err();
        assert!(matches!(err, SpecError::Parse { line: 2, .. }));
    }
}
