//! Edit commands on the live document.
//!
//! Every command follows the same order: checkpoint the pre-mutation state
//! (clearing redo), mutate `live` in place, then notify observers. Commands
//! referencing missing blocks or invalid positions log and return `false`.
//! They never error.

use crate::block::{
    Accordion, Block, BlockKind, BlockTemplate, Checkbox, Drawing, Image, Paragraph, RadioGroup,
    RasterImage, ToggleSwitch,
};
use crate::editor::{NoteEditor, TypingTarget, caret_at_end};
use crate::error::{EditorError, PersistError};
use crate::persist::NoteStore;
use crate::rich_text::{SpanStyle, TextEdit};
use crate::types::{BlockId, MediaRef, OptionId, Selection, TextAlign};

/// New content of a text block as reported by the input widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    pub selection: Selection,
}

impl TextInput {
    /// Text with the caret at its end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self {
            text,
            selection: Selection::collapsed(len),
        }
    }

    pub fn with_selection(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }
}

/// Plain-text fields of non-text blocks editable through [`NoteEditor::set_block_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockField {
    ImageCaption,
    ToggleLabel,
    AccordionTitle,
    AccordionBody,
    RadioOptionLabel(OptionId),
}

impl NoteEditor {
    // === Text ===

    /// Replace the title. Consecutive title changes form one undo step.
    pub fn set_title(&mut self, title: &str) -> bool {
        if self.live.title == title {
            return false;
        }
        self.begin_typing(TypingTarget::Title);
        self.live.title = title.to_owned();
        self.document_changed();
        true
    }

    /// Apply new text from a block's input widget.
    ///
    /// Existing spans are re-anchored across the edit and armed pending styles
    /// cover exactly the inserted chars. Consecutive changes to the same block
    /// form one undo step; a change that only moves the caret records nothing.
    pub fn change_block_text(&mut self, id: BlockId, input: TextInput) -> bool {
        let Some(block) = self.live.block(id) else {
            tracing::debug!(target: "folio::commands", "{}", EditorError::NotFound(id));
            return false;
        };
        let Some(current) = block.rich_text() else {
            tracing::debug!(target: "folio::commands", block = %id, kind = block.kind_name(), "not a text block");
            return false;
        };
        let caret = input.selection.is_collapsed().then_some(input.selection.head);
        let new_len = input.text.chars().count();

        let Some(edit) = TextEdit::between(current.text(), &input.text, caret) else {
            if self.live.focused_block_id == Some(id) && self.live.chrome.selection != input.selection {
                self.live.chrome.selection = input.selection.clamped(new_len);
                self.document_changed();
            }
            return false;
        };

        self.begin_typing(TypingTarget::Block(id));
        let pending: Vec<SpanStyle> = self.pending_styles.iter().copied().collect();
        let Some(text) = self.live.block_mut(id).and_then(Block::rich_text_mut) else {
            return false;
        };
        text.set_text(&input.text, caret);
        if edit.inserted > 0 {
            for style in pending {
                text.apply(edit.inserted_range(), style);
            }
        }
        self.pending_styles.clear();
        if self.live.focused_block_id == Some(id) {
            self.live.chrome.selection = input.selection.clamped(new_len);
        }
        tracing::trace!(
            target: "folio::commands",
            block = %id,
            at = edit.at,
            deleted = edit.deleted,
            inserted = edit.inserted,
            "text changed"
        );
        self.document_changed();
        true
    }

    /// Move the caret or selection inside a block, focusing it if needed.
    pub fn set_selection(&mut self, id: BlockId, selection: Selection) -> bool {
        let Some(len) = self
            .live
            .block(id)
            .and_then(Block::rich_text)
            .map(|t| t.len_chars())
        else {
            return false;
        };
        if self.live.focused_block_id != Some(id) {
            self.set_focus(Some(id));
        }
        let selection = selection.clamped(len);
        if self.live.chrome.selection == selection {
            return false;
        }
        self.live.chrome.selection = selection;
        self.document_changed();
        true
    }

    // === Styles ===

    /// Arm or disarm a style for the next inserted text.
    ///
    /// Returns whether the style is now armed. Never records history.
    pub fn toggle_pending_style(&mut self, style: SpanStyle) -> bool {
        if self.pending_styles.remove(&style) {
            return false;
        }
        self.pending_styles.retain(|s| s.kind() != style.kind());
        self.pending_styles.insert(style);
        true
    }

    /// Toggle `style` over the focused block's non-empty selection.
    pub fn toggle_style_on_selection(&mut self, style: SpanStyle) -> bool {
        let Some((id, range)) = self.focused_selection() else {
            return false;
        };
        self.begin_edit();
        let Some(text) = self.live.block_mut(id).and_then(Block::rich_text_mut) else {
            return false;
        };
        let present = text.toggle(range.clone(), style);
        tracing::trace!(target: "folio::commands", block = %id, ?style, ?range, present, "toggled style");
        self.document_changed();
        true
    }

    /// Toolbar entry point: selection toggles spans, a bare caret arms pending styles.
    pub fn toggle_style(&mut self, style: SpanStyle) -> bool {
        if self.focused_selection().is_some() {
            self.toggle_style_on_selection(style)
        } else if self.live.focused_block().and_then(Block::rich_text).is_some() {
            self.toggle_pending_style(style);
            true
        } else {
            false
        }
    }

    /// Set a valued style (size, colors) over the focused block's selection.
    pub fn apply_style_to_selection(&mut self, style: SpanStyle) -> bool {
        let Some((id, range)) = self.focused_selection() else {
            return false;
        };
        if self
            .live
            .block(id)
            .and_then(Block::rich_text)
            .is_some_and(|t| t.is_uniform(range.clone(), style))
        {
            return false;
        }
        self.begin_edit();
        let Some(text) = self.live.block_mut(id).and_then(Block::rich_text_mut) else {
            return false;
        };
        text.apply(range, style);
        self.document_changed();
        true
    }

    pub fn set_text_align(&mut self, align: TextAlign) -> bool {
        let Some(id) = self.live.focused_block_id else {
            return false;
        };
        let Some(block) = self.live.block(id) else {
            return false;
        };
        let mut probe = block.clone();
        match probe.align_mut() {
            Some(current) if *current != align => {}
            _ => return false,
        }
        self.begin_edit();
        if let Some(current) = self.live.block_mut(id).and_then(Block::align_mut) {
            *current = align;
        }
        self.document_changed();
        true
    }

    /// Flip the bullet-list flag of the focused paragraph.
    pub fn toggle_list_item(&mut self) -> bool {
        let Some(id) = self.live.focused_block_id else {
            return false;
        };
        if !self.live.block(id).is_some_and(Block::is_paragraph) {
            return false;
        }
        self.begin_edit();
        if let Some(BlockKind::Paragraph(p)) = self.live.block_mut(id).map(|b| &mut b.kind) {
            p.list_item = !p.list_item;
        }
        self.document_changed();
        true
    }

    // === Block fields ===

    pub fn set_checked(&mut self, id: BlockId, checked: bool) -> bool {
        self.edit_block(id, |kind| match kind {
            BlockKind::Checkbox(c) if c.checked != checked => {
                c.checked = checked;
                true
            }
            _ => false,
        })
    }

    pub fn set_toggle(&mut self, id: BlockId, on: bool) -> bool {
        self.edit_block(id, |kind| match kind {
            BlockKind::ToggleSwitch(t) if t.on != on => {
                t.on = on;
                true
            }
            _ => false,
        })
    }

    pub fn toggle_accordion(&mut self, id: BlockId) -> bool {
        self.edit_block(id, |kind| match kind {
            BlockKind::Accordion(a) => {
                a.expanded = !a.expanded;
                true
            }
            _ => false,
        })
    }

    pub fn select_radio_option(&mut self, group: BlockId, option: OptionId) -> bool {
        self.edit_block(group, |kind| match kind {
            BlockKind::RadioGroup(g) if g.selected != Some(option) && g.option(option).is_some() => {
                g.selected = Some(option);
                true
            }
            _ => false,
        })
    }

    /// Switch an image between full and half width.
    pub fn toggle_image_size(&mut self, id: BlockId) -> bool {
        self.edit_block(id, |kind| match kind {
            BlockKind::Image(img) => {
                img.half_size = !img.half_size;
                true
            }
            _ => false,
        })
    }

    /// Replace a plain-text field. Consecutive changes to one field form one undo step.
    pub fn set_block_field(&mut self, id: BlockId, field: BlockField, value: &str) -> bool {
        let Some(block) = self.live.block(id) else {
            tracing::debug!(target: "folio::commands", "{}", EditorError::NotFound(id));
            return false;
        };
        match field_value(&block.kind, field) {
            Some(current) if current != value => {}
            _ => return false,
        }
        self.begin_typing(TypingTarget::Field(id, field));
        if let Some(slot) = self.live.block_mut(id).and_then(|b| field_slot(&mut b.kind, field)) {
            *slot = value.to_owned();
        }
        self.document_changed();
        true
    }

    // === Structure ===

    /// Insert after the focused block, or at the end when nothing is focused.
    ///
    /// Blocks other than separators, audio and images are followed by a fresh
    /// empty paragraph that takes focus. Audio and image blocks take focus
    /// themselves. Returns the inserted block's id.
    pub fn insert_block_at_cursor(&mut self, block: Block) -> Option<BlockId> {
        let id = block.id();
        if self.live.block(id).is_some() {
            tracing::warn!(target: "folio::commands", block = %id, "refusing to insert duplicate block id");
            return None;
        }
        self.begin_edit();
        let index = self
            .live
            .focused_block_id
            .and_then(|f| self.live.index_of(f))
            .map_or(self.live.blocks.len(), |i| i + 1);

        let takes_focus = matches!(block.kind, BlockKind::Audio(_) | BlockKind::Image(_));
        let needs_trailing = !block.is_self_terminating();
        let kind = block.kind_name();
        self.live.blocks.insert(index, block);

        if needs_trailing {
            let trailing = Block::empty_paragraph();
            let trailing_id = trailing.id();
            self.live.blocks.insert(index + 1, trailing);
            self.live.focused_block_id = Some(trailing_id);
        } else if takes_focus {
            self.live.focused_block_id = Some(id);
        }
        self.live.selected_image_id = None;
        self.live.chrome.selection = caret_at_end(&self.live);
        self.pending_styles.clear();
        tracing::debug!(target: "folio::commands", block = %id, kind, index, "inserted block");
        self.document_changed();
        Some(id)
    }

    /// Insert a freshly created block of a template type.
    pub fn insert_new(&mut self, template: BlockTemplate) -> Option<BlockId> {
        self.insert_block_at_cursor(template.instantiate())
    }

    pub fn insert_checkbox(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Checkbox(Checkbox::default())))
    }

    pub fn insert_separator(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Separator))
    }

    pub fn insert_toggle_switch(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::ToggleSwitch(ToggleSwitch::default())))
    }

    pub fn insert_accordion(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Accordion(Accordion::default())))
    }

    pub fn insert_radio_group(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::RadioGroup(RadioGroup::default())))
    }

    pub fn insert_paragraph(&mut self) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Paragraph(Paragraph::default())))
    }

    /// Insert an image picked or captured by the platform.
    pub fn insert_image(&mut self, resource: MediaRef) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Image(Image {
            resource,
            caption: String::new(),
            half_size: false,
        })))
    }

    /// Insert a finished drawing-canvas raster.
    pub fn insert_drawing(&mut self, raster: RasterImage) -> Option<BlockId> {
        self.insert_block_at_cursor(Block::new(BlockKind::Drawing(Drawing { raster })))
    }

    /// Remove a block.
    ///
    /// Stops playback of it first. Deleting the transient recording block
    /// cancels the recording instead. Pointers to the block are cleared.
    pub fn delete_block(&mut self, id: BlockId) -> bool {
        if self.recording_block().is_some_and(|b| b.id() == id) {
            return self.cancel_recording();
        }
        let Some(index) = self.live.index_of(id) else {
            tracing::debug!(target: "folio::commands", "{}", EditorError::NotFound(id));
            return false;
        };
        if self.playing == Some(id) {
            self.stop_playback();
        }
        self.begin_edit();
        let removed = self.live.blocks.remove(index);
        self.live.clear_pointers_to(id);
        tracing::debug!(target: "folio::commands", block = %id, kind = removed.kind_name(), index, "deleted block");
        self.document_changed();
        true
    }

    /// Move the block at `from` so it ends up at index `to`.
    ///
    /// A non-paragraph block that lands before another non-paragraph block,
    /// or at the end, gets an empty paragraph inserted after it.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        let len = self.live.blocks.len();
        if from >= len || to >= len || from == to {
            tracing::debug!(target: "folio::commands", "{}", EditorError::InvalidMove { from, to, len });
            return false;
        }
        self.begin_edit();
        let block = self.live.blocks.remove(from);
        let moved_is_paragraph = block.is_paragraph();
        self.live.blocks.insert(to, block);
        if !moved_is_paragraph {
            let next_is_paragraph = self.live.blocks.get(to + 1).is_some_and(Block::is_paragraph);
            if !next_is_paragraph {
                self.live.blocks.insert(to + 1, Block::empty_paragraph());
            }
        }
        self.live.chrome.dragging_block_id = None;
        self.live.chrome.drop_target = None;
        tracing::debug!(target: "folio::commands", from, to, "moved block");
        self.document_changed();
        true
    }

    // === Focus and chrome ===

    /// Move focus, committing the outgoing block's edits.
    ///
    /// Clears image selection, drawing mode and pending styles.
    pub fn set_focus(&mut self, target: Option<BlockId>) -> bool {
        if self.live.focused_block_id == target {
            return false;
        }
        if let Some(id) = target
            && self.live.block(id).is_none()
        {
            tracing::debug!(target: "folio::commands", "{}", EditorError::NotFound(id));
            return false;
        }
        self.commit();
        self.live.focused_block_id = target;
        self.live.selected_image_id = None;
        self.live.chrome.drawing_image_id = None;
        self.live.chrome.selection = caret_at_end(&self.live);
        self.pending_styles.clear();
        self.document_changed();
        true
    }

    /// Toggle selection of an image block. Selecting drops text focus.
    pub fn select_image(&mut self, id: BlockId) -> bool {
        if !self
            .live
            .block(id)
            .is_some_and(|b| matches!(b.kind, BlockKind::Image(_)))
        {
            return false;
        }
        let next = if self.live.selected_image_id == Some(id) {
            None
        } else {
            Some(id)
        };
        self.set_focus(None);
        self.live.selected_image_id = next;
        self.document_changed();
        true
    }

    /// Enter or leave drawing mode on an image.
    pub fn toggle_drawing_mode(&mut self, id: BlockId) -> bool {
        if self.live.block(id).is_none() {
            return false;
        }
        if self.live.chrome.drawing_image_id == Some(id) {
            self.live.chrome.drawing_image_id = None;
        } else {
            self.live.chrome.drawing_image_id = Some(id);
            self.live.selected_image_id = None;
        }
        self.document_changed();
        true
    }

    pub fn set_toolbar_visible(&mut self, visible: bool) -> bool {
        if self.live.chrome.toolbar_visible == visible {
            return false;
        }
        self.live.chrome.toolbar_visible = visible;
        self.document_changed();
        true
    }

    /// Track an in-progress drag for the rendering layer.
    pub fn set_drag_state(&mut self, dragging: Option<BlockId>, drop_target: Option<usize>) -> bool {
        let dragging = dragging.filter(|id| self.live.block(*id).is_some());
        let drop_target = dragging.and(drop_target);
        if self.live.chrome.dragging_block_id == dragging && self.live.chrome.drop_target == drop_target {
            return false;
        }
        self.live.chrome.dragging_block_id = dragging;
        self.live.chrome.drop_target = drop_target;
        self.document_changed();
        true
    }

    /// Cancel any recording and commit pending edits.
    pub fn dismiss_keyboard(&mut self) -> bool {
        self.cancel_recording();
        self.commit()
    }

    /// Commit and write the note through `store`.
    pub fn save(&mut self, store: &mut dyn NoteStore) -> Result<(), PersistError> {
        self.commit();
        store.save(&self.live)?;
        tracing::info!(
            target: "folio::commands",
            title = %self.live.title,
            blocks = self.live.blocks.len(),
            "note saved"
        );
        Ok(())
    }

    // === Internal helpers ===

    fn focused_selection(&self) -> Option<(BlockId, std::ops::Range<usize>)> {
        let id = self.live.focused_block_id?;
        let len = self.live.block(id)?.rich_text()?.len_chars();
        let selection = self.live.chrome.selection.clamped(len);
        (!selection.is_collapsed()).then(|| (id, selection.to_range()))
    }

    /// Checkpoint and apply `mutate` to a block's payload.
    ///
    /// `mutate` runs on a probe copy first so a command that would change
    /// nothing records no history.
    fn edit_block(&mut self, id: BlockId, mutate: impl Fn(&mut BlockKind) -> bool) -> bool {
        let Some(block) = self.live.block(id) else {
            tracing::debug!(target: "folio::commands", "{}", EditorError::NotFound(id));
            return false;
        };
        let mut probe = block.kind.clone();
        if !mutate(&mut probe) {
            return false;
        }
        self.begin_edit();
        if let Some(block) = self.live.block_mut(id) {
            block.kind = probe;
        }
        self.document_changed();
        true
    }
}

fn field_value(kind: &BlockKind, field: BlockField) -> Option<&str> {
    match (kind, field) {
        (BlockKind::Image(img), BlockField::ImageCaption) => Some(&img.caption),
        (BlockKind::ToggleSwitch(t), BlockField::ToggleLabel) => Some(&t.label),
        (BlockKind::Accordion(a), BlockField::AccordionTitle) => Some(&a.title),
        (BlockKind::Accordion(a), BlockField::AccordionBody) => Some(&a.body),
        (BlockKind::RadioGroup(g), BlockField::RadioOptionLabel(option)) => {
            g.option(option).map(|o| o.label.as_str())
        }
        _ => None,
    }
}

fn field_slot(kind: &mut BlockKind, field: BlockField) -> Option<&mut String> {
    match (kind, field) {
        (BlockKind::Image(img), BlockField::ImageCaption) => Some(&mut img.caption),
        (BlockKind::ToggleSwitch(t), BlockField::ToggleLabel) => Some(&mut t.label),
        (BlockKind::Accordion(a), BlockField::AccordionTitle) => Some(&mut a.title),
        (BlockKind::Accordion(a), BlockField::AccordionBody) => Some(&mut a.body),
        (BlockKind::RadioGroup(g), BlockField::RadioOptionLabel(option)) => g
            .options
            .iter_mut()
            .find(|o| o.id == option)
            .map(|o| &mut o.label),
        _ => None,
    }
}
