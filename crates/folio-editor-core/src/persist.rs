//! Note file format.
//!
//! A note is stored as a JSON envelope:
//!
//! ```json
//! { "format": 1, "title": "Groceries", "blocks": [ { "id": "…", "type": "paragraph", … } ] }
//! ```
//!
//! Blocks are tagged by `type`, drawing rasters are base64. Focus, image
//! selection and UI chrome are not stored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::document::DocumentSnapshot;
use crate::error::PersistError;

/// Envelope version written by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format: u32,
    title: &'a str,
    blocks: &'a [Block],
}

#[derive(Deserialize)]
struct Header {
    format: u32,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    title: String,
    blocks: Vec<Block>,
}

/// Encode the content of a snapshot.
pub fn serialize(doc: &DocumentSnapshot) -> Result<Vec<u8>, PersistError> {
    let envelope = EnvelopeRef {
        format: FORMAT_VERSION,
        title: &doc.title,
        blocks: &doc.blocks,
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Decode a snapshot with the same block ids and field values.
pub fn deserialize(bytes: &[u8]) -> Result<DocumentSnapshot, PersistError> {
    let header: Header = serde_json::from_slice(bytes)?;
    if header.format != FORMAT_VERSION {
        return Err(PersistError::UnsupportedFormat {
            found: header.format,
            expected: FORMAT_VERSION,
        });
    }
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let mut seen = std::collections::HashSet::with_capacity(envelope.blocks.len());
    if let Some(dup) = envelope.blocks.iter().find(|b| !seen.insert(b.id())) {
        return Err(PersistError::DuplicateBlockId(dup.id()));
    }
    Ok(DocumentSnapshot::with_blocks(envelope.title, envelope.blocks))
}

/// Durable storage for a single note.
pub trait NoteStore {
    fn load(&self) -> Result<DocumentSnapshot, PersistError>;

    fn save(&mut self, doc: &DocumentSnapshot) -> Result<(), PersistError>;
}

/// Note stored as a JSON file.
///
/// Writes go to a sibling temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl NoteStore for FileStore {
    fn load(&self) -> Result<DocumentSnapshot, PersistError> {
        let bytes = std::fs::read(&self.path)?;
        let doc = deserialize(&bytes)?;
        tracing::debug!(
            target: "folio::persist",
            path = %self.path.display(),
            blocks = doc.blocks.len(),
            "note loaded"
        );
        Ok(doc)
    }

    fn save(&mut self, doc: &DocumentSnapshot) -> Result<(), PersistError> {
        let bytes = serialize(doc)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("folio.tmp");
        std::fs::write(&tmp, &bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(
            target: "folio::persist",
            path = %self.path.display(),
            bytes = bytes.len(),
            "note written"
        );
        Ok(())
    }
}

/// Note kept in memory, for embedders that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bytes: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl NoteStore for MemoryStore {
    fn load(&self) -> Result<DocumentSnapshot, PersistError> {
        match &self.bytes {
            Some(bytes) => deserialize(bytes),
            None => Ok(DocumentSnapshot::default()),
        }
    }

    fn save(&mut self, doc: &DocumentSnapshot) -> Result<(), PersistError> {
        self.bytes = Some(serialize(doc)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, Paragraph};
    use crate::rich_text::{RichText, SpanStyle, StyleSpan};

    #[test]
    fn test_rejects_unknown_format() {
        let err = deserialize(br#"{"format": 2, "title": "", "blocks": []}"#).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnsupportedFormat {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let block = Block::paragraph("x");
        let doc = DocumentSnapshot::with_blocks("", vec![block.clone(), block.clone()]);
        let bytes = serialize(&doc).unwrap();
        let err = deserialize(&bytes).unwrap_err();
        assert!(matches!(err, PersistError::DuplicateBlockId(id) if id == block.id()));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            deserialize(b"not json").unwrap_err(),
            PersistError::Json(_)
        ));
    }

    #[test]
    fn test_chrome_is_not_persisted() {
        let mut doc = DocumentSnapshot::default();
        doc.focused_block_id = Some(doc.blocks[0].id());
        doc.chrome.toolbar_visible = true;
        let back = deserialize(&serialize(&doc).unwrap()).unwrap();
        assert!(back.content_equals(&doc));
        assert_eq!(back.focused_block_id, None);
        assert!(!back.chrome.toolbar_visible);
    }

    #[test]
    fn test_block_wire_shape() {
        let block = Block::new(BlockKind::Paragraph(Paragraph {
            text: RichText::from_parts(
                "hi",
                vec![
                    StyleSpan::new(0..2, SpanStyle::Bold),
                    StyleSpan::new(1..2, SpanStyle::FontSize(18)),
                ],
            ),
            ..Default::default()
        }));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "paragraph");
        assert_eq!(value["id"], block.id().to_string());
        assert_eq!(
            value["text"]["spans"][0],
            serde_json::json!({ "start": 0, "end": 2, "style": "bold" })
        );
        assert_eq!(
            value["text"]["spans"][1],
            serde_json::json!({ "start": 1, "end": 2, "style": "font_size", "value": 18 })
        );
        assert_eq!(value["align"], "start");

        let back: Block = serde_json::from_value(value).unwrap();
        assert!(back.content_eq(&block));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("notes").join("a.folio"));
        assert!(!store.exists());
        let doc = DocumentSnapshot::with_blocks("Title", vec![Block::paragraph("body")]);
        store.save(&doc).unwrap();
        assert!(store.exists());
        assert!(store.load().unwrap().content_equals(&doc));
    }

    #[test]
    fn test_memory_store_defaults_to_empty_note() {
        let store = MemoryStore::default();
        let doc = store.load().unwrap();
        assert!(doc.content_equals(&doc.duplicate()));
        assert_eq!(doc.blocks.len(), 1);
    }
}
