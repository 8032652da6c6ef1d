//! Whole-note snapshots.
//!
//! A [`DocumentSnapshot`] is the unit the undo engine stores. The live
//! document is a snapshot too: commands mutate it in place, history keeps
//! independent duplicates.

use crate::block::Block;
use crate::types::{BlockId, Selection};

/// Transient presentation state.
///
/// Carried alongside the document so the UI can render from one value, but
/// ignored by content equality and never persisted. Toggling any of it never
/// creates an undo step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiChrome {
    pub toolbar_visible: bool,
    /// Selection inside the focused block.
    pub selection: Selection,
    /// Image block currently in drawing-overlay mode.
    pub drawing_image_id: Option<BlockId>,
    /// Block being dragged for reordering.
    pub dragging_block_id: Option<BlockId>,
    /// Index the dragged block would drop at.
    pub drop_target: Option<usize>,
}

/// The entire note at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    pub title: String,
    pub blocks: Vec<Block>,
    pub focused_block_id: Option<BlockId>,
    pub selected_image_id: Option<BlockId>,
    pub chrome: UiChrome,
}

impl Default for DocumentSnapshot {
    /// Empty title with a single empty paragraph.
    fn default() -> Self {
        Self::with_blocks(String::new(), vec![Block::empty_paragraph()])
    }
}

impl DocumentSnapshot {
    pub fn with_blocks(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            blocks,
            focused_block_id: None,
            selected_image_id: None,
            chrome: UiChrome::default(),
        }
    }

    /// Deep, independent copy. Pointer fields are copied by value.
    pub fn duplicate(&self) -> Self {
        Self {
            title: self.title.clone(),
            blocks: self.blocks.iter().map(Block::duplicate).collect(),
            focused_block_id: self.focused_block_id,
            selected_image_id: self.selected_image_id,
            chrome: self.chrome.clone(),
        }
    }

    /// Same title and, index by index, the same block id, variant and fields.
    ///
    /// Focus, image selection and chrome are not content.
    pub fn content_equals(&self, other: &DocumentSnapshot) -> bool {
        self.title == other.title
            && self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.content_eq(b))
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id() == id)
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    pub fn focused_block(&self) -> Option<&Block> {
        self.focused_block_id.and_then(|id| self.block(id))
    }

    /// Whether every block id occurs once.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.blocks.len());
        self.blocks.iter().all(|b| seen.insert(b.id()))
    }

    /// Drop every pointer that references `id`.
    pub fn clear_pointers_to(&mut self, id: BlockId) {
        if self.focused_block_id == Some(id) {
            self.focused_block_id = None;
            self.chrome.selection = Selection::default();
        }
        if self.selected_image_id == Some(id) {
            self.selected_image_id = None;
        }
        if self.chrome.drawing_image_id == Some(id) {
            self.chrome.drawing_image_id = None;
        }
        if self.chrome.dragging_block_id == Some(id) {
            self.chrome.dragging_block_id = None;
            self.chrome.drop_target = None;
        }
    }

    /// Drop pointers whose target is no longer present.
    pub fn repair_pointers(&mut self) {
        for id in [
            self.focused_block_id,
            self.selected_image_id,
            self.chrome.drawing_image_id,
            self.chrome.dragging_block_id,
        ]
        .into_iter()
        .flatten()
        {
            if self.block(id).is_none() {
                self.clear_pointers_to(id);
            }
        }
    }

    /// Human readable rendering, one block per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.title);
            out.push('\n');
            out.push_str(&"=".repeat(self.title.chars().count()));
            out.push('\n');
        }
        for block in &self.blocks {
            let marker = if self.focused_block_id == Some(block.id()) {
                ">"
            } else {
                " "
            };
            out.push_str(marker);
            out.push(' ');
            out.push_str(&block.summary());
            out.push('\n');
        }
        out
    }

    /// Plain text of the note without markers.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.title.is_empty() {
            lines.push(self.title.clone());
        }
        for block in &self.blocks {
            match block.rich_text() {
                Some(text) => lines.push(text.text().to_owned()),
                None => lines.push(block.summary()),
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, Checkbox};

    #[test]
    fn test_default_is_single_empty_paragraph() {
        let doc = DocumentSnapshot::default();
        assert_eq!(doc.title, "");
        assert_eq!(doc.blocks.len(), 1);
        assert!(doc.blocks[0].is_paragraph());
        assert_eq!(doc.blocks[0].rich_text().map(|t| t.text()), Some(""));
    }

    #[test]
    fn test_chrome_is_not_content() {
        let doc = DocumentSnapshot::default();
        let mut other = doc.duplicate();
        other.chrome.toolbar_visible = true;
        other.focused_block_id = Some(doc.blocks[0].id());
        assert!(doc.content_equals(&other));
    }

    #[test]
    fn test_order_is_content() {
        let a = Block::paragraph("a");
        let b = Block::paragraph("b");
        let one = DocumentSnapshot::with_blocks("", vec![a.clone(), b.clone()]);
        let two = DocumentSnapshot::with_blocks("", vec![b, a]);
        assert!(!one.content_equals(&two));
    }

    #[test]
    fn test_mismatched_variants_are_not_equal() {
        let block = Block::paragraph("x");
        let mut other = block.duplicate();
        other.kind = BlockKind::Checkbox(Checkbox::default());
        let one = DocumentSnapshot::with_blocks("", vec![block]);
        let two = DocumentSnapshot::with_blocks("", vec![other]);
        assert!(!one.content_equals(&two));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let doc = DocumentSnapshot::with_blocks("t", vec![Block::paragraph("hi")]);
        let mut copy = doc.duplicate();
        copy.title.push('!');
        copy.blocks[0].rich_text_mut().unwrap().set_text("bye", None);
        assert_eq!(doc.title, "t");
        assert_eq!(doc.blocks[0].rich_text().unwrap().text(), "hi");
    }

    #[test]
    fn test_clear_pointers_to() {
        let mut doc = DocumentSnapshot::default();
        let id = doc.blocks[0].id();
        doc.focused_block_id = Some(id);
        doc.chrome.selection = Selection::new(0, 0);
        doc.blocks.clear();
        doc.repair_pointers();
        assert_eq!(doc.focused_block_id, None);
    }

    #[test]
    fn test_unique_ids() {
        let block = Block::paragraph("x");
        let doc = DocumentSnapshot::with_blocks("", vec![block.clone(), block]);
        assert!(!doc.has_unique_ids());
        assert!(DocumentSnapshot::default().has_unique_ids());
    }
}
