//! Resolution of raw matches into a nested span forest.
//!
//! Matches are sorted by start ascending, longer first at equal start, and
//! pattern declaration order for identical intervals. A single sweep with a
//! stack of open spans then nests every match under the innermost open span
//! that fully contains it.
//!
//! Partial overlaps have no tree representation. When no open span can
//! contain an incoming match because the innermost one it starts in ends
//! before it does, the incoming match starts a tree of its own and becomes a
//! root. Its own contained matches nest under it. The spans it crossed stay
//! open, so outer spans keep collecting the later matches they contain.
//! Both matches are kept and offsets stay exact; only the nesting of the
//! crossing match is lost.
//!
//! Roots are ordered by start, and so are the children of every span. A
//! pre-order walk follows reading order unless a demoted root starts inside
//! an earlier tree.

use std::ops::Range;

use crate::concept::ConceptName;
use crate::scanner::RawMatch;

/// A match placed in the nesting tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub concept: ConceptName,
    pub pattern: usize,
    pub start: usize,
    pub end: usize,
    pub byte_range: Range<usize>,
    pub text: String,
    pub children: Vec<Span>,
}

impl Span {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    pub fn children(&self) -> &[Span] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True if `other` lies fully inside this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Pre-order walk of this span and its descendants.
    pub fn iter(&self) -> SpanIter<'_> {
        SpanIter {
            stack: vec![(self, 0)],
        }
    }
}

impl From<RawMatch> for Span {
    fn from(m: RawMatch) -> Self {
        Span {
            concept: m.concept,
            pattern: m.pattern,
            start: m.start,
            end: m.end,
            byte_range: m.byte_range,
            text: m.text,
            children: Vec::new(),
        }
    }
}

/// Pre-order iterator over a span forest, yielding each span with its depth.
pub struct SpanIter<'a> {
    stack: Vec<(&'a Span, usize)>,
}

impl<'a> SpanIter<'a> {
    pub(crate) fn forest(roots: &'a [Span]) -> Self {
        SpanIter {
            stack: roots.iter().rev().map(|s| (s, 0)).collect(),
        }
    }

    /// Yield `(depth, span)` pairs instead of bare spans.
    pub fn with_depth(self) -> impl Iterator<Item = (usize, &'a Span)> {
        DepthIter { inner: self }
    }

    fn next_with_depth(&mut self) -> Option<(usize, &'a Span)> {
        let (span, depth) = self.stack.pop()?;
        self.stack
            .extend(span.children.iter().rev().map(|c| (c, depth + 1)));
        Some((depth, span))
    }
}

impl<'a> Iterator for SpanIter<'a> {
    type Item = &'a Span;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_with_depth().map(|(_, span)| span)
    }
}

struct DepthIter<'a> {
    inner: SpanIter<'a>,
}

impl<'a> Iterator for DepthIter<'a> {
    type Item = (usize, &'a Span);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_with_depth()
    }
}

/// Build the span forest for one document's raw matches.
pub fn resolve(mut matches: Vec<RawMatch>) -> Vec<Span> {
    matches.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.len().cmp(&a.len()))
            .then(a.pattern.cmp(&b.pattern))
    });

    let mut roots = Vec::new();
    // one chain of open spans per tree still being built, root first
    let mut chains: Vec<Vec<Span>> = Vec::new();

    for m in matches {
        let span = Span::from(m);
        for chain in chains.iter_mut() {
            while chain.last().map_or(false, |top| top.end <= span.start) {
                close_top(chain, &mut roots);
            }
        }
        chains.retain(|chain| !chain.is_empty());

        // innermost open span that contains the match; later start wins,
        // then the shorter span
        let parent = chains
            .iter()
            .enumerate()
            .filter_map(|(i, chain)| chain.last().map(|top| (i, top)))
            .filter(|(_, top)| top.end >= span.end)
            .max_by(|(_, a), (_, b)| a.start.cmp(&b.start).then(b.end.cmp(&a.end)))
            .map(|(i, _)| i);

        match parent {
            Some(i) => chains[i].push(span),
            None => {
                if let Some(top) = chains.iter().find_map(|chain| chain.last()) {
                    tracing::trace!(
                        concept = %span.concept,
                        start = span.start,
                        end = span.end,
                        over = %top.concept,
                        "partial overlap, demoting span to root"
                    );
                }
                chains.push(vec![span]);
            }
        }
    }
    for mut chain in chains {
        while !chain.is_empty() {
            close_top(&mut chain, &mut roots);
        }
    }
    roots.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(a.pattern.cmp(&b.pattern))
    });
    roots
}

fn close_top(open: &mut Vec<Span>, roots: &mut Vec<Span>) {
    if let Some(span) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(span),
            None => roots.push(span),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn raw(concept: &str, pattern: usize, start: usize, end: usize) -> RawMatch {
        RawMatch {
            concept: Arc::from(concept),
            pattern,
            start,
            end,
            byte_range: start..end,
            text: "x".repeat(end - start),
        }
    }

    /// Compact `concept[start,end){children}` rendering of a forest.
    fn shape(spans: &[Span]) -> String {
        spans
            .iter()
            .map(|s| {
                let mut out = format!("{}[{},{})", s.concept, s.start, s.end);
                if !s.children.is_empty() {
                    out.push('{');
                    out.push_str(&shape(&s.children));
                    out.push('}');
                }
                out
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn assert_well_formed(spans: &[Span]) {
        for span in spans {
            assert!(span.start < span.end);
            for pair in span.children.windows(2) {
                assert!(pair[0].end <= pair[1].start, "siblings cross: {:?}", pair);
            }
            for child in &span.children {
                assert!(span.contains(child));
            }
            assert_well_formed(&span.children);
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_match() {
        let spans = resolve(vec![raw("A", 0, 3, 7)]);
        assert_eq!(shape(&spans), "A[3,7)");
        assert!(spans[0].is_leaf());
    }

    #[test]
    fn test_disjoint_matches_are_roots() {
        let spans = resolve(vec![raw("B", 1, 10, 14), raw("A", 0, 0, 6), raw("C", 2, 20, 27)]);
        assert_eq!(shape(&spans), "A[0,6) B[10,14) C[20,27)");
    }

    #[test]
    fn test_contained_match_nests() {
        let spans = resolve(vec![raw("A", 0, 0, 20), raw("B", 1, 13, 20)]);
        assert_eq!(shape(&spans), "A[0,20){B[13,20)}");
        assert_well_formed(&spans);
    }

    #[test]
    fn test_longer_first_at_equal_start() {
        let spans = resolve(vec![raw("C", 2, 0, 12), raw("A", 0, 0, 20), raw("B", 1, 13, 20)]);
        assert_eq!(shape(&spans), "A[0,20){C[0,12) B[13,20)}");
        assert_well_formed(&spans);
    }

    #[test]
    fn test_identical_interval_nests_under_earlier_pattern() {
        let spans = resolve(vec![raw("B", 5, 4, 8), raw("A", 1, 4, 8)]);
        assert_eq!(shape(&spans), "A[4,8){B[4,8)}");
    }

    #[test]
    fn test_deep_nesting_and_closing() {
        let spans = resolve(vec![
            raw("A", 0, 0, 30),
            raw("B", 1, 2, 10),
            raw("C", 2, 3, 5),
            raw("D", 3, 12, 20),
            raw("E", 4, 40, 45),
        ]);
        assert_eq!(shape(&spans), "A[0,30){B[2,10){C[3,5)} D[12,20)} E[40,45)");
        assert_well_formed(&spans);
    }

    #[test]
    fn test_partial_overlap_demotes_later_match() {
        let spans = resolve(vec![raw("A", 0, 0, 10), raw("B", 1, 5, 15), raw("C", 2, 6, 8)]);
        assert_eq!(shape(&spans), "A[0,10) B[5,15){C[6,8)}");
        assert_well_formed(&spans);
    }

    #[test]
    fn test_partial_overlap_keeps_outer_span_open() {
        let spans = resolve(vec![
            raw("A", 0, 0, 20),
            raw("B", 1, 2, 10),
            raw("C", 2, 5, 15),
            raw("D", 3, 16, 18),
        ]);
        assert_eq!(shape(&spans), "A[0,20){B[2,10) D[16,18)} C[5,15)");
        assert_well_formed(&spans);

        let starts: Vec<_> = SpanIter::forest(&spans).map(|s| s.start).collect();
        assert_eq!(starts, [0, 2, 16, 5]);
    }

    #[test]
    fn test_demoted_match_keeps_its_own_children() {
        // "machine learning fairness metrics report"
        let spans = resolve(vec![
            raw("Report", 0, 0, 40),
            raw("AI", 1, 0, 16),
            raw("Fairness", 2, 8, 25),
            raw("Metric", 3, 17, 25),
            raw("Doc", 4, 34, 40),
        ]);
        assert_eq!(
            shape(&spans),
            "Report[0,40){AI[0,16) Doc[34,40)} Fairness[8,25){Metric[17,25)}"
        );
        assert_well_formed(&spans);
    }

    #[test]
    fn test_match_inside_demoted_root_nests_there() {
        let spans = resolve(vec![
            raw("A", 0, 0, 40),
            raw("B", 1, 0, 16),
            raw("C", 2, 8, 25),
            raw("D", 3, 18, 24),
        ]);
        // D fits both A and C; C is the innermost
        assert_eq!(shape(&spans), "A[0,40){B[0,16)} C[8,25){D[18,24)}");
        assert_well_formed(&spans);
    }

    #[test]
    fn test_every_match_survives() {
        let input = vec![
            raw("A", 0, 0, 10),
            raw("B", 1, 5, 15),
            raw("A", 0, 12, 14),
            raw("C", 2, 12, 14),
            raw("D", 3, 30, 31),
        ];
        let spans = resolve(input.clone());
        assert_eq!(SpanIter::forest(&spans).count(), input.len());
    }

    #[test]
    fn test_iter_with_depth() {
        let spans = resolve(vec![raw("A", 0, 0, 20), raw("B", 1, 2, 10), raw("C", 2, 3, 5)]);
        let seen: Vec<_> = SpanIter::forest(&spans)
            .with_depth()
            .map(|(depth, s)| (depth, s.concept()))
            .collect();
        assert_eq!(seen, [(0, "A"), (1, "B"), (2, "C")]);
        assert_eq!(spans[0].iter().count(), 3);
    }
}
