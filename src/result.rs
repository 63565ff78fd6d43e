//! Per-document aggregation of resolved spans.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::concept::ConceptName;
use crate::document::{DocumentMetadata, DocumentRef, StructuralHint};
use crate::errors::{ScanInputError, ScanResult};
use crate::span::{Span, SpanIter};

/// Everything found in one document.
///
/// Counts cover every match in the forest, nested or not. Concepts are kept
/// in the order of their first occurrence in a pre-order walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResult {
    reference: DocumentRef,
    spans: Vec<Span>,
    counts: Vec<(ConceptName, usize)>,
    match_count: usize,
    text_length: usize,
    metadata: DocumentMetadata,
}

impl DocumentResult {
    pub fn build(reference: DocumentRef, spans: Vec<Span>, text_length: usize) -> Self {
        let mut counts: Vec<(ConceptName, usize)> = Vec::new();
        let mut match_count = 0;
        for span in SpanIter::forest(&spans) {
            match_count += 1;
            match counts.iter_mut().find(|(name, _)| *name == span.concept) {
                Some((_, n)) => *n += 1,
                None => counts.push((span.concept.clone(), 1)),
            }
        }
        Self {
            reference,
            spans,
            counts,
            match_count,
            text_length,
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn reference(&self) -> &DocumentRef {
        &self.reference
    }

    /// Top-level spans in reading order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Length in characters of the text the result was built from.
    pub fn text_length(&self) -> usize {
        self.text_length
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// The structural unit (page, slide, ...) a character offset falls in.
    pub fn hint_at(&self, offset: usize) -> Option<&StructuralHint> {
        self.metadata.hint_at(offset)
    }

    /// Total number of matches, nested ones included.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Pre-order walk of every span.
    pub fn iter(&self) -> SpanIter<'_> {
        SpanIter::forest(&self.spans)
    }

    pub fn count_for(&self, concept: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| &**name == concept)
            .map_or(0, |(_, n)| *n)
    }

    /// `(concept, count)` pairs in first-occurrence order.
    pub fn counts(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(name, n)| (&**name, *n))
    }

    pub fn concepts_present(&self) -> Vec<&str> {
        self.counts.iter().map(|(name, _)| &**name).collect()
    }

    pub fn matches_for<'a>(&'a self, concept: &'a str) -> impl Iterator<Item = &'a Span> + 'a {
        self.iter().filter(move |span| span.concept() == concept)
    }

    /// Fails unless `text` is the text this result was scanned from.
    pub fn check_text(&self, text: &str) -> ScanResult<()> {
        let actual = text.chars().count();
        let fits = actual == self.text_length
            && self
                .iter()
                .all(|span| text.get(span.byte_range.clone()).is_some());
        if fits {
            Ok(())
        } else {
            Err(ScanInputError::LengthMismatch {
                reference: self.reference.clone(),
                expected: self.text_length,
                actual,
            })
        }
    }

    /// Split `text` into unmatched runs and top-level matches.
    ///
    /// Concatenating the segment texts gives back `text`. A span demoted by a
    /// partial overlap only covers the part after the previous match; a span
    /// entirely covered by an earlier one yields no segment.
    pub fn segments<'a, 't>(&'a self, text: &'t str) -> ScanResult<Vec<Segment<'a, 't>>> {
        self.check_text(text)?;
        let mut out = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in &self.spans {
            let start = span.byte_range.start.max(cursor);
            let end = span.byte_range.end;
            if start >= end {
                continue;
            }
            if cursor < start {
                out.push(Segment::Text(&text[cursor..start]));
            }
            out.push(Segment::Match {
                span,
                text: &text[start..end],
            });
            cursor = end;
        }
        if cursor < text.len() {
            out.push(Segment::Text(&text[cursor..]));
        }
        Ok(out)
    }

    /// The text with every match wrapped as `«Concept:text»`, nested.
    pub fn annotated(&self, text: &str) -> ScanResult<String> {
        self.check_text(text)?;
        let mut out = String::with_capacity(text.len() + self.match_count * 16);
        let mut cursor = 0;
        annotate_into(&mut out, text, &self.spans, &mut cursor);
        out.push_str(&text[cursor..]);
        Ok(out)
    }

    /// Group matches into sections separated by more than `section_sep`
    /// characters of unmatched text.
    pub fn sections(&self, section_sep: usize) -> Vec<Section<'_>> {
        let mut sections = Vec::new();
        let mut current: Option<Section<'_>> = None;
        for span in self.iter() {
            match current.as_mut() {
                Some(section) if section.end.saturating_add(section_sep) >= span.start => {
                    section.end = section.end.max(span.end);
                    section.spans.push(span);
                }
                _ => {
                    sections.extend(current.take());
                    current = Some(Section {
                        start: span.start,
                        end: span.end,
                        spans: vec![span],
                    });
                }
            }
        }
        sections.extend(current);
        sections
    }

    /// Per concept, how often each distinct matched text occurred.
    ///
    /// With `fold_case`, texts differing only in case are counted together
    /// under their lowercase form. Terms are ordered by count, then text.
    pub fn term_counts(&self, fold_case: bool) -> Vec<ConceptTerms> {
        let mut by_concept: Vec<(ConceptName, BTreeMap<String, usize>)> = Vec::new();
        for span in self.iter() {
            let key = if fold_case {
                span.text.to_lowercase()
            } else {
                span.text.clone()
            };
            let idx = match by_concept.iter().position(|(name, _)| *name == span.concept) {
                Some(idx) => idx,
                None => {
                    by_concept.push((span.concept.clone(), BTreeMap::new()));
                    by_concept.len() - 1
                }
            };
            *by_concept[idx].1.entry(key).or_insert(0) += 1;
        }

        by_concept
            .into_iter()
            .map(|(concept, terms)| {
                let mut terms: Vec<_> = terms.into_iter().collect();
                terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                ConceptTerms { concept, terms }
            })
            .collect()
    }
}

fn annotate_into(out: &mut String, text: &str, spans: &[Span], cursor: &mut usize) {
    for span in spans {
        let start = span.byte_range.start.max(*cursor);
        let end = span.byte_range.end;
        if start >= end {
            continue;
        }
        out.push_str(&text[*cursor..start]);
        out.push('«');
        out.push_str(span.concept());
        out.push(':');
        *cursor = start;
        annotate_into(out, text, &span.children, cursor);
        out.push_str(&text[*cursor..end]);
        out.push('»');
        *cursor = end;
    }
}

/// A piece of linearized document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a, 't> {
    Text(&'t str),
    Match { span: &'a Span, text: &'t str },
}

impl<'a, 't> Segment<'a, 't> {
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Text(text) | Segment::Match { text, .. } => text,
        }
    }
}

/// A run of matches close enough together to be read as one passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// First matched character.
    pub start: usize,
    /// One past the last matched character.
    pub end: usize,
    /// Matches in pre-order.
    pub spans: Vec<&'a Span>,
}

impl<'a> Section<'a> {
    /// Character range of the section widened by the given padding, clamped
    /// to the text.
    pub fn window(&self, start_pad: usize, end_pad: usize, text_length: usize) -> Range<usize> {
        self.start.saturating_sub(start_pad)..self.end.saturating_add(end_pad).min(text_length)
    }
}

/// Distinct matched texts of one concept with their counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptTerms {
    pub concept: ConceptName,
    pub terms: Vec<(String, usize)>,
}

/// Slice `text` by a character range, clamped to the text.
pub(crate) fn char_slice(text: &str, range: Range<usize>) -> &str {
    let mut indices = text.char_indices().map(|(b, _)| b).chain(Some(text.len()));
    let start = indices.by_ref().nth(range.start).unwrap_or(text.len());
    let end = if range.end > range.start {
        indices
            .nth(range.end - range.start - 1)
            .unwrap_or(text.len())
    } else {
        start
    };
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::resolve;
    use crate::scanner::RawMatch;
    use std::sync::Arc;

    fn raw(text: &str, concept: &str, pattern: usize, needle: &str, nth: usize) -> RawMatch {
        let byte = text.match_indices(needle).nth(nth).map(|(b, _)| b).unwrap();
        let start = text[..byte].chars().count();
        RawMatch {
            concept: Arc::from(concept),
            pattern,
            start,
            end: start + needle.chars().count(),
            byte_range: byte..byte + needle.len(),
            text: needle.to_string(),
        }
    }

    const JUSTICE: &str = "Fairness means distributive justice.";

    fn justice() -> DocumentResult {
        let text = JUSTICE;
        let spans = resolve(vec![
            raw(text, "Fairness", 0, "Fairness", 0),
            raw(text, "Distributive Justice", 1, "distributive justice", 0),
            raw(text, "Justice", 2, "justice", 0),
            raw(text, "Distribution", 3, "distributive", 0),
        ]);
        DocumentResult::build(DocumentRef::new("justice.txt"), spans, text.chars().count())
    }

    #[test]
    fn test_counts_include_nested() {
        let result = justice();
        assert_eq!(result.match_count(), 4);
        assert_eq!(result.spans().len(), 2);
        assert_eq!(result.count_for("Justice"), 1);
        assert_eq!(result.count_for("Missing"), 0);
        assert_eq!(
            result.concepts_present(),
            ["Fairness", "Distributive Justice", "Distribution", "Justice"]
        );
    }

    #[test]
    fn test_empty_result() {
        let result = DocumentResult::build(DocumentRef::new("empty"), Vec::new(), 0);
        assert!(result.is_empty());
        assert!(result.concepts_present().is_empty());
        assert_eq!(result.annotated("").unwrap(), "");
        assert!(result.segments("").unwrap().is_empty());
        assert!(result.sections(125).is_empty());
    }

    #[test]
    fn test_annotated_nests_markers() {
        let result = justice();
        insta::assert_snapshot!(result.annotated(JUSTICE).unwrap(), @"«Fairness:Fairness» means «Distributive Justice:«Distribution:distributive» «Justice:justice»».");
    }

    #[test]
    fn test_segments_cover_text() {
        let result = justice();
        let segments = result.segments(JUSTICE).unwrap();
        let joined: String = segments.iter().map(|s| s.text()).collect();
        assert_eq!(joined, JUSTICE);
        let matched: Vec<_> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Match { span, text } => Some((span.concept(), *text)),
                Segment::Text(_) => None,
            })
            .collect();
        assert_eq!(
            matched,
            [
                ("Fairness", "Fairness"),
                ("Distributive Justice", "distributive justice")
            ]
        );
    }

    #[test]
    fn test_partial_overlap_linearization() {
        let text = "alpha beta gamma";
        let spans = resolve(vec![
            raw(text, "A", 0, "alpha beta", 0),
            raw(text, "B", 1, "beta gamma", 0),
        ]);
        let result = DocumentResult::build(DocumentRef::new("overlap"), spans, 16);
        assert_eq!(result.annotated(text).unwrap(), "«A:alpha beta»«B: gamma»");
        assert_eq!(result.spans()[1].text, "beta gamma");
    }

    #[test]
    fn test_mismatched_text_rejected() {
        let result = justice();
        let err = result.annotated("something else").unwrap_err();
        assert!(matches!(
            err,
            ScanInputError::LengthMismatch { expected: 36, actual: 14, .. }
        ));
    }

    #[test]
    fn test_matches_for() {
        let text = "bias, more bias and fairness";
        let spans = resolve(vec![
            raw(text, "Data Ethics", 0, "bias", 0),
            raw(text, "Data Ethics", 0, "bias", 1),
            raw(text, "Fairness", 1, "fairness", 0),
        ]);
        let result = DocumentResult::build(DocumentRef::new("doc"), spans, text.len());
        let starts: Vec<_> = result.matches_for("Data Ethics").map(|s| s.start).collect();
        assert_eq!(starts, [0, 11]);
    }

    #[test]
    fn test_sections_split_on_gap() {
        let text = format!("bias{}bias bias", " ".repeat(30));
        let spans = resolve(vec![
            raw(&text, "Data Ethics", 0, "bias", 0),
            raw(&text, "Data Ethics", 0, "bias", 1),
            raw(&text, "Data Ethics", 0, "bias", 2),
        ]);
        let result = DocumentResult::build(DocumentRef::new("doc"), spans, text.len());

        let wide = result.sections(125);
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].spans.len(), 3);

        let narrow = result.sections(10);
        let ranges: Vec<_> = narrow.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(ranges, [(0, 4), (34, 43)]);
        assert_eq!(narrow[1].window(20, 35, result.text_length()), 14..43);
        assert_eq!(narrow[0].window(20, 35, result.text_length()), 0..39);
    }

    #[test]
    fn test_sections_with_unbounded_separation() {
        let text = "bias and bias";
        let spans = resolve(vec![
            raw(text, "Data Ethics", 0, "bias", 0),
            raw(text, "Data Ethics", 0, "bias", 1),
        ]);
        let result = DocumentResult::build(DocumentRef::new("doc"), spans, text.len());

        let sections = result.sections(usize::MAX);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].spans.len(), 2);
        assert_eq!(sections[0].window(usize::MAX, usize::MAX, result.text_length()), 0..13);
    }

    #[test]
    fn test_term_counts() {
        let text = "Bias, bias, BIAS and fairness";
        let spans = resolve(vec![
            raw(text, "Data Ethics", 0, "Bias", 0),
            raw(text, "Data Ethics", 0, "bias", 0),
            raw(text, "Data Ethics", 0, "BIAS", 0),
            raw(text, "Fairness", 1, "fairness", 0),
        ]);
        let result = DocumentResult::build(DocumentRef::new("doc"), spans, text.len());

        let folded = result.term_counts(true);
        assert_eq!(&*folded[0].concept, "Data Ethics");
        assert_eq!(folded[0].terms, [("bias".to_string(), 3)]);
        assert_eq!(folded[1].terms, [("fairness".to_string(), 1)]);

        let exact = result.term_counts(false);
        let terms: Vec<_> = exact[0].terms.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(terms, ["BIAS", "Bias", "bias"]);
    }

    #[test]
    fn test_char_slice() {
        assert_eq!(char_slice("naïve bias", 2..5), "ïve");
        assert_eq!(char_slice("naïve bias", 6..99), "bias");
        assert_eq!(char_slice("abc", 5..9), "");
        assert_eq!(char_slice("abc", 1..1), "");
    }
}
