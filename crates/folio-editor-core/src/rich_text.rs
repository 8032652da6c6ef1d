//! Rich text: a base string plus character-level style spans.
//!
//! Spans are stored normalized (sorted, non-empty, identical styles merged) so
//! that two texts carrying the same visible formatting compare equal no matter
//! which sequence of edits produced them. All offsets are char offsets.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A packed `0xRRGGBBAA` color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

/// A character-level style.
///
/// The first four are flags that toolbars toggle; the rest carry a value and a
/// character holds at most one value per [`StyleKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "style", content = "value", rename_all = "snake_case")]
pub enum SpanStyle {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    FontSize(u16),
    Color(Rgba),
    Background(Rgba),
}

/// The slot a [`SpanStyle`] occupies on a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    FontSize,
    Color,
    Background,
}

impl SpanStyle {
    pub fn kind(&self) -> StyleKind {
        match self {
            SpanStyle::Bold => StyleKind::Bold,
            SpanStyle::Italic => StyleKind::Italic,
            SpanStyle::Underline => StyleKind::Underline,
            SpanStyle::Strikethrough => StyleKind::Strikethrough,
            SpanStyle::FontSize(_) => StyleKind::FontSize,
            SpanStyle::Color(_) => StyleKind::Color,
            SpanStyle::Background(_) => StyleKind::Background,
        }
    }
}

/// A style applied over `start..end` (chars, end exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleSpan {
    pub start: usize,
    pub end: usize,
    #[serde(flatten)]
    pub style: SpanStyle,
}

impl StyleSpan {
    pub fn new(range: Range<usize>, style: SpanStyle) -> Self {
        Self {
            start: range.start,
            end: range.end,
            style,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn overlaps(&self, range: &Range<usize>) -> bool {
        self.start < range.end && range.start < self.end
    }
}

/// A single contiguous edit turning one string into another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextEdit {
    /// Char offset where the edit happened.
    pub at: usize,
    /// Chars removed at `at`.
    pub deleted: usize,
    /// Chars inserted at `at` (after the removal).
    pub inserted: usize,
}

impl TextEdit {
    /// Diff two strings down to one edit. Returns None when they are equal.
    ///
    /// `caret` is the caret position in `new` after the edit. When the edit is
    /// a pure insertion or a pure deletion whose position is ambiguous (typing
    /// or backspacing a repeated letter), the caret picks the position the
    /// user actually edited at.
    pub fn between(old: &str, new: &str, caret: Option<usize>) -> Option<Self> {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();

        let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let deleted = old.len() - prefix - suffix;
        let inserted = new.len() - prefix - suffix;
        if deleted == 0 && inserted == 0 {
            return None;
        }

        let mut at = prefix;
        if deleted == 0 {
            if let Some(caret) = caret.filter(|c| *c >= inserted && *c <= new.len()) {
                let candidate = caret - inserted;
                if candidate < at
                    && new[..candidate] == old[..candidate]
                    && new[caret..] == old[candidate..]
                {
                    at = candidate;
                }
            }
        } else if inserted == 0
            && let Some(caret) = caret.filter(|c| *c < at)
            && new[..caret] == old[..caret]
            && new[caret..] == old[caret + deleted..]
        {
            at = caret;
        }

        Some(Self {
            at,
            deleted,
            inserted,
        })
    }

    /// Range of the inserted text in the new string.
    pub fn inserted_range(&self) -> Range<usize> {
        self.at..self.at + self.inserted
    }
}

/// Move spans across an edit of `length_delta` chars at `edit_point`.
///
/// - Insertion (`length_delta > 0`): spans ending at or before the point are
///   unchanged, spans starting at or after it shift right, a span strictly
///   straddling the point grows.
/// - Deletion (`length_delta < 0`, removing `edit_point..edit_point + |delta|`):
///   positions inside the removed range collapse onto the point, so straddling
///   spans are truncated and spans fully inside it are dropped.
pub fn reanchor_spans(spans: &[StyleSpan], edit_point: usize, length_delta: isize) -> Vec<StyleSpan> {
    let mut out: Vec<StyleSpan> = spans
        .iter()
        .filter_map(|span| {
            let (start, end) = if length_delta >= 0 {
                let grow = length_delta as usize;
                if span.end <= edit_point {
                    (span.start, span.end)
                } else if span.start >= edit_point {
                    (span.start + grow, span.end + grow)
                } else {
                    (span.start, span.end + grow)
                }
            } else {
                let removed = length_delta.unsigned_abs();
                let map = |pos: usize| {
                    if pos <= edit_point {
                        pos
                    } else if pos >= edit_point + removed {
                        pos - removed
                    } else {
                        edit_point
                    }
                };
                (map(span.start), map(span.end))
            };
            (start < end).then_some(StyleSpan {
                start,
                end,
                style: span.style,
            })
        })
        .collect();
    normalize(&mut out);
    out
}

/// Sort spans, drop empty ones and merge overlapping or touching spans of the
/// identical style.
pub fn normalize(spans: &mut Vec<StyleSpan>) {
    spans.retain(|s| s.start < s.end);
    spans.sort_by(|a, b| (a.style, a.start, a.end).cmp(&(b.style, b.start, b.end)));

    let mut merged: Vec<StyleSpan> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match merged.last_mut() {
            Some(last) if last.style == span.style && span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged.sort();
    *spans = merged;
}

/// Text content with character-level styles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RichTextRepr")]
pub struct RichText {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    spans: Vec<StyleSpan>,
}

#[derive(Deserialize)]
struct RichTextRepr {
    text: String,
    #[serde(default)]
    spans: Vec<StyleSpan>,
}

impl From<RichTextRepr> for RichText {
    fn from(repr: RichTextRepr) -> Self {
        RichText::from_parts(repr.text, repr.spans)
    }
}

impl RichText {
    /// Unstyled text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    /// Build from raw parts, clamping spans to the text and normalizing them.
    pub fn from_parts(text: impl Into<String>, spans: Vec<StyleSpan>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let mut spans: Vec<StyleSpan> = spans
            .into_iter()
            .map(|s| StyleSpan {
                start: s.start.min(len),
                end: s.end.min(len),
                style: s.style,
            })
            .collect();
        normalize(&mut spans);
        Self { text, spans }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the text, carrying existing spans across the edit.
    ///
    /// Returns the edit that was applied, or None if the text is unchanged.
    pub fn set_text(&mut self, new_text: &str, caret: Option<usize>) -> Option<TextEdit> {
        let edit = TextEdit::between(&self.text, new_text, caret)?;
        let mut spans = self.spans.clone();
        if edit.deleted > 0 {
            spans = reanchor_spans(&spans, edit.at, -(edit.deleted as isize));
        }
        if edit.inserted > 0 {
            spans = reanchor_spans(&spans, edit.at, edit.inserted as isize);
        }
        self.text = new_text.to_owned();
        self.spans = spans;
        Some(edit)
    }

    /// Apply `style` over `range`, replacing other values of the same kind.
    pub fn apply(&mut self, range: Range<usize>, style: SpanStyle) {
        let range = self.clamp(range);
        if range.is_empty() {
            return;
        }
        self.clear_kind(range.clone(), style.kind());
        self.spans.push(StyleSpan::new(range, style));
        normalize(&mut self.spans);
    }

    /// Remove every style of `kind` from `range`, splitting spans at its edges.
    pub fn clear_kind(&mut self, range: Range<usize>, kind: StyleKind) {
        let range = self.clamp(range);
        if range.is_empty() {
            return;
        }
        let mut kept = Vec::with_capacity(self.spans.len() + 1);
        for span in self.spans.drain(..) {
            if span.style.kind() != kind || !span.overlaps(&range) {
                kept.push(span);
                continue;
            }
            if span.start < range.start {
                kept.push(StyleSpan::new(span.start..range.start, span.style));
            }
            if span.end > range.end {
                kept.push(StyleSpan::new(range.end..span.end, span.style));
            }
        }
        normalize(&mut kept);
        self.spans = kept;
    }

    /// Whether every char of a non-empty `range` carries `style`.
    pub fn is_uniform(&self, range: Range<usize>, style: SpanStyle) -> bool {
        let range = self.clamp(range);
        if range.is_empty() {
            return false;
        }
        // Identical styles are merged, so uniform coverage is a single span.
        self.spans
            .iter()
            .any(|s| s.style == style && s.start <= range.start && s.end >= range.end)
    }

    /// Toggle `style` over `range`: removed if uniformly present, applied otherwise.
    ///
    /// Returns whether the style is present afterwards.
    pub fn toggle(&mut self, range: Range<usize>, style: SpanStyle) -> bool {
        if self.is_uniform(range.clone(), style) {
            self.clear_kind(range, style.kind());
            false
        } else {
            self.apply(range, style);
            true
        }
    }

    /// Styles covering the char at `offset`.
    pub fn styles_at(&self, offset: usize) -> Vec<SpanStyle> {
        self.spans
            .iter()
            .filter(|s| s.start <= offset && offset < s.end)
            .map(|s| s.style)
            .collect()
    }

    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let len = self.len_chars();
        range.start.min(len)..range.end.min(len)
    }
}

impl From<&str> for RichText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
