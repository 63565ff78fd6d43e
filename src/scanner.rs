//! Applies compiled patterns to a document's text.
//!
//! Each pattern is run independently over the whole text (leftmost,
//! non-overlapping occurrences of that one pattern). Matches of different
//! patterns may overlap freely; all of them are kept and merged into one
//! sequence ordered by start offset, then by pattern declaration order.

use std::ops::Range;

use crate::concept::ConceptName;
use crate::errors::{ScanInputError, ScanResult};
use crate::pattern::{BoundaryPolicy, CompiledPattern};
use crate::DocumentRef;

/// One located occurrence of a compiled pattern.
///
/// `start`/`end` are character offsets into the original text (half-open);
/// `byte_range` is the same interval in UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub concept: ConceptName,
    pub pattern: usize,
    pub start: usize,
    pub end: usize,
    pub byte_range: Range<usize>,
    pub text: String,
}

impl RawMatch {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Maps byte offsets to character offsets for one text.
pub(crate) struct CharIndex {
    // byte offset of every char boundary; empty for ASCII text
    boundaries: Vec<usize>,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let boundaries = if text.is_ascii() {
            Vec::new()
        } else {
            text.char_indices().map(|(b, _)| b).collect()
        };
        Self { boundaries }
    }

    /// `byte` must lie on a char boundary (or at the end of the text).
    pub(crate) fn char_offset(&self, byte: usize) -> usize {
        if self.boundaries.is_empty() {
            byte
        } else {
            self.boundaries.partition_point(|&b| b < byte)
        }
    }
}

/// Scan `text` with every pattern, using plain word boundaries.
pub fn scan(text: &str, patterns: &[CompiledPattern]) -> Vec<RawMatch> {
    Scanner::default().scan(text, patterns)
}

/// Scan raw document bytes, failing if they are not UTF-8 text.
pub fn scan_bytes(
    reference: &DocumentRef,
    bytes: &[u8],
    patterns: &[CompiledPattern],
) -> ScanResult<Vec<RawMatch>> {
    let text = decode(reference, bytes)?;
    Ok(scan(text, patterns))
}

pub(crate) fn decode<'a>(reference: &DocumentRef, bytes: &'a [u8]) -> ScanResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|e| ScanInputError::Undecodable {
        reference: reference.clone(),
        offset: e.valid_up_to(),
    })
}

/// Runs patterns over text with a given [`BoundaryPolicy`].
///
/// The policy must be the one the patterns were compiled with.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    boundary: BoundaryPolicy,
}

impl Scanner {
    pub fn new(boundary: BoundaryPolicy) -> Self {
        Self { boundary }
    }

    pub fn scan(&self, text: &str, patterns: &[CompiledPattern]) -> Vec<RawMatch> {
        let index = CharIndex::new(text);
        let mut matches = Vec::new();
        for pattern in patterns {
            self.scan_pattern(text, &index, pattern, &mut matches);
        }
        // stable: equal starts keep pattern order
        matches.sort_by(|a, b| a.start.cmp(&b.start).then(a.pattern.cmp(&b.pattern)));
        matches
    }

    fn scan_pattern(
        &self,
        text: &str,
        index: &CharIndex,
        pattern: &CompiledPattern,
        out: &mut Vec<RawMatch>,
    ) {
        let regex = pattern.regex();
        let mut pos = 0;
        while pos <= text.len() {
            let found = match regex.find_at(text, pos) {
                Some(found) => found,
                None => break,
            };
            if found.start() == found.end() {
                pos = next_char(text, found.end());
                continue;
            }
            if pattern.is_anchored() && !self.on_boundaries(text, found.range()) {
                // retry one character further so a later occurrence
                // overlapping this rejected one is still found
                pos = next_char(text, found.start());
                continue;
            }
            out.push(RawMatch {
                concept: pattern.concept_shared().clone(),
                pattern: pattern.index(),
                start: index.char_offset(found.start()),
                end: index.char_offset(found.end()),
                byte_range: found.range(),
                text: found.as_str().to_string(),
            });
            pos = found.end();
        }
    }

    fn on_boundaries(&self, text: &str, range: Range<usize>) -> bool {
        let before = text[..range.start].chars().next_back();
        let after = text[range.end..].chars().next();
        !before.map_or(false, |c| self.boundary.is_token_char(c))
            && !after.map_or(false, |c| self.boundary.is_token_char(c))
    }
}

fn next_char(text: &str, byte: usize) -> usize {
    match text[byte..].chars().next() {
        Some(c) => byte + c.len_utf8(),
        None => text.len() + 1,
    }
}
