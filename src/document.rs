//! Documents as the core receives them from readers.
//!
//! Readers (plain text, word-processor files, slide decks, ...) live outside
//! this crate. They hand over a reference, the extracted text, and optionally
//! structural hints such as page or slide boundaries, which are passed through
//! to the [`DocumentResult`](crate::DocumentResult) untouched.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{ScanInputError, ScanResult};

/// Identifier of a source document, e.g. its path or a row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef(Arc<str>);

impl DocumentRef {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentRef {
    fn default() -> Self {
        Self::new("No Name")
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DocumentRef {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Path> for DocumentRef {
    fn from(path: &Path) -> Self {
        Self::new(path.to_string_lossy())
    }
}

/// Kind of structural unit a reader reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HintKind {
    Page,
    Slide,
    Section,
    Other(String),
}

/// A structural unit starting at a character offset, e.g. "page 3 starts at 1200".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralHint {
    pub kind: HintKind,
    /// 1-based number of the unit as the reader counts it.
    pub number: usize,
    /// Character offset where the unit starts.
    pub start: usize,
}

impl StructuralHint {
    pub fn page(number: usize, start: usize) -> Self {
        Self {
            kind: HintKind::Page,
            number,
            start,
        }
    }

    pub fn slide(number: usize, start: usize) -> Self {
        Self {
            kind: HintKind::Slide,
            number,
            start,
        }
    }
}

/// Reader-supplied metadata carried through to the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    hints: Vec<StructuralHint>,
}

impl DocumentMetadata {
    pub fn new(mut hints: Vec<StructuralHint>) -> Self {
        hints.sort_by_key(|h| h.start);
        Self { hints }
    }

    pub fn hints(&self) -> &[StructuralHint] {
        &self.hints
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// The last hint starting at or before `offset`.
    pub fn hint_at(&self, offset: usize) -> Option<&StructuralHint> {
        let idx = self.hints.partition_point(|h| h.start <= offset);
        idx.checked_sub(1).map(|i| &self.hints[i])
    }
}

/// A document with its extracted text.
#[derive(Debug, Clone)]
pub struct Document {
    reference: DocumentRef,
    text: String,
    metadata: DocumentMetadata,
}

impl Document {
    pub fn new(reference: impl Into<DocumentRef>, text: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            text: text.into(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Decode raw bytes as UTF-8 text.
    pub fn from_utf8(reference: impl Into<DocumentRef>, bytes: Vec<u8>) -> ScanResult<Self> {
        let reference = reference.into();
        let text = String::from_utf8(bytes).map_err(|e| ScanInputError::Undecodable {
            reference: reference.clone(),
            offset: e.utf8_error().valid_up_to(),
        })?;
        Ok(Self::new(reference, text))
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn reference(&self) -> &DocumentRef {
        &self.reference
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// What a reader produced for one document.
#[derive(Debug, Clone)]
pub enum SourceContent {
    Text(String),
    Bytes(Vec<u8>),
    /// The reader could not extract anything; the reason is reported.
    Unavailable(String),
}

/// A reader's hand-off: reference, content and metadata.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    pub reference: DocumentRef,
    pub content: SourceContent,
    pub metadata: DocumentMetadata,
}

impl DocumentSource {
    pub fn new(reference: impl Into<DocumentRef>, content: SourceContent) -> Self {
        Self {
            reference: reference.into(),
            content,
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn into_document(self) -> ScanResult<Document> {
        let doc = match self.content {
            SourceContent::Text(text) => Document::new(self.reference, text),
            SourceContent::Bytes(bytes) => Document::from_utf8(self.reference, bytes)?,
            SourceContent::Unavailable(reason) => {
                return Err(ScanInputError::Unavailable {
                    reference: self.reference,
                    reason,
                })
            }
        };
        Ok(doc.with_metadata(self.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ref_from_path() {
        let reference = DocumentRef::from(Path::new("docs/simple-document-1.txt"));
        assert_eq!(reference.as_str(), "docs/simple-document-1.txt");
        assert_eq!(DocumentRef::default().to_string(), "No Name");
    }

    #[test]
    fn test_hint_at() {
        let metadata = DocumentMetadata::new(vec![
            StructuralHint::page(2, 100),
            StructuralHint::page(1, 0),
            StructuralHint::page(3, 250),
        ]);
        assert_eq!(metadata.hint_at(0).map(|h| h.number), Some(1));
        assert_eq!(metadata.hint_at(99).map(|h| h.number), Some(1));
        assert_eq!(metadata.hint_at(100).map(|h| h.number), Some(2));
        assert_eq!(metadata.hint_at(1000).map(|h| h.number), Some(3));

        let late = DocumentMetadata::new(vec![StructuralHint::slide(1, 10)]);
        assert!(late.hint_at(5).is_none());
    }

    #[test]
    fn test_source_into_document() {
        let doc = DocumentSource::new("a.txt", SourceContent::Bytes(b"caf\xc3\xa9".to_vec()))
            .into_document()
            .unwrap();
        assert_eq!(doc.text(), "café");
        assert_eq!(doc.char_len(), 4);
    }

    #[test]
    fn test_unavailable_source_names_document() {
        let err = DocumentSource::new("deck.pptx", SourceContent::Unavailable("no reader".into()))
            .into_document()
            .unwrap_err();
        assert!(matches!(err, ScanInputError::Unavailable { .. }));
        assert_eq!(err.to_string(), "document deck.pptx: text unavailable: no reader");
    }

    #[test]
    fn test_undecodable_source() {
        let err = DocumentSource::new("bin.dat", SourceContent::Bytes(vec![0x61, 0xff]))
            .into_document()
            .unwrap_err();
        assert!(matches!(err, ScanInputError::Undecodable { offset: 1, .. }));
    }

    #[test]
    fn test_from_utf8() {
        let doc = Document::from_utf8("café.txt", "naïve bias".as_bytes().to_vec()).unwrap();
        assert_eq!(doc.text(), "naïve bias");

        let err = Document::from_utf8("bin.dat", vec![b'b', b'i', 0xc3, b'a', b's']).unwrap_err();
        assert!(matches!(
            err,
            ScanInputError::Undecodable { ref reference, offset: 2 } if reference.as_str() == "bin.dat"
        ));
    }
}
