//! Content blocks: the addressable units a note is built from.
//!
//! A [`Block`] pairs an immutable [`BlockId`] with a [`BlockKind`] payload.
//! Every consumer matches `BlockKind` exhaustively, so adding a variant is a
//! compile error everywhere it needs handling.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::rich_text::RichText;
use crate::types::{BlockId, MediaRef, OptionId, TextAlign};

/// Duration label shown for audio that has no measurable length.
pub const ZERO_DURATION: &str = "00:00";

/// One unit of note content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    id: BlockId,
    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Variant-specific block data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph(Paragraph),
    Header(TextLine),
    NumberedListItem(TextLine),
    Image(Image),
    Checkbox(Checkbox),
    Audio(Audio),
    RadioGroup(RadioGroup),
    ToggleSwitch(ToggleSwitch),
    Accordion(Accordion),
    Separator,
    Drawing(Drawing),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: RichText,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub list_item: bool,
}

/// Single rich-text line used by headers and numbered list items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: RichText,
    #[serde(default)]
    pub align: TextAlign,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub resource: MediaRef,
    #[serde(default)]
    pub caption: String,
    /// Shown at reduced size instead of full width.
    #[serde(default)]
    pub half_size: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkbox {
    pub text: RichText,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Audio {
    /// Backing file. None until a recording target has been allocated.
    pub resource: Option<MediaRef>,
    /// Human readable `MM:SS`.
    pub duration: SmolStr,
    #[serde(default)]
    pub recording: bool,
    /// Elapsed recording time in milliseconds.
    #[serde(default)]
    pub elapsed_ms: u64,
    /// Trailing window of amplitude samples, oldest first.
    #[serde(default)]
    pub amplitudes: Vec<u16>,
}

impl Default for Audio {
    fn default() -> Self {
        Self {
            resource: None,
            duration: SmolStr::new_static(ZERO_DURATION),
            recording: false,
            elapsed_ms: 0,
            amplitudes: Vec::new(),
        }
    }
}

impl Audio {
    /// Append a sample, discarding the oldest ones beyond `window`.
    pub fn push_amplitude(&mut self, sample: u16, window: usize) {
        self.amplitudes.push(sample);
        if self.amplitudes.len() > window {
            let excess = self.amplitudes.len() - window;
            self.amplitudes.drain(..excess);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioOption {
    pub id: OptionId,
    pub label: String,
}

impl RadioOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(),
            label: label.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RadioGroup {
    pub options: Vec<RadioOption>,
    pub selected: Option<OptionId>,
}

impl Default for RadioGroup {
    fn default() -> Self {
        let options = vec![RadioOption::new("Option 1"), RadioOption::new("Option 2")];
        let selected = options.first().map(|o| o.id);
        Self { options, selected }
    }
}

impl RadioGroup {
    pub fn option(&self, id: OptionId) -> Option<&RadioOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleSwitch {
    pub label: String,
    #[serde(default)]
    pub on: bool,
}

impl Default for ToggleSwitch {
    fn default() -> Self {
        Self {
            label: "Toggle Switch".to_owned(),
            on: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Accordion {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub expanded: bool,
}

impl Default for Accordion {
    fn default() -> Self {
        Self {
            title: "Accordion Title".to_owned(),
            body: "Collapsible content.".to_owned(),
            expanded: false,
        }
    }
}

/// Opaque raster produced by the drawing canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    #[serde(with = "base64_bytes")]
    pub bytes: Bytes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub raster: RasterImage,
}

impl Block {
    /// Create a block with a freshly generated id.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
        }
    }

    /// Create a block with a known id (deserialization, tests).
    pub fn with_id(id: BlockId, kind: BlockKind) -> Self {
        Self { id, kind }
    }

    pub fn paragraph(text: impl Into<RichText>) -> Self {
        Self::new(BlockKind::Paragraph(Paragraph {
            text: text.into(),
            ..Default::default()
        }))
    }

    pub fn empty_paragraph() -> Self {
        Self::new(BlockKind::Paragraph(Paragraph::default()))
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Independent copy sharing only the id.
    ///
    /// Every mutable container (spans, radio options, amplitude samples) is
    /// freshly allocated. Drawing bytes are immutable and may be shared.
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Same id, same variant, equal fields.
    pub fn content_eq(&self, other: &Block) -> bool {
        self.id == other.id && self.kind == other.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Editable rich text of the block, if it has any.
    pub fn rich_text(&self) -> Option<&RichText> {
        match &self.kind {
            BlockKind::Paragraph(p) => Some(&p.text),
            BlockKind::Header(line) | BlockKind::NumberedListItem(line) => Some(&line.text),
            BlockKind::Checkbox(c) => Some(&c.text),
            BlockKind::Image(_)
            | BlockKind::Audio(_)
            | BlockKind::RadioGroup(_)
            | BlockKind::ToggleSwitch(_)
            | BlockKind::Accordion(_)
            | BlockKind::Separator
            | BlockKind::Drawing(_) => None,
        }
    }

    pub fn rich_text_mut(&mut self) -> Option<&mut RichText> {
        match &mut self.kind {
            BlockKind::Paragraph(p) => Some(&mut p.text),
            BlockKind::Header(line) | BlockKind::NumberedListItem(line) => Some(&mut line.text),
            BlockKind::Checkbox(c) => Some(&mut c.text),
            BlockKind::Image(_)
            | BlockKind::Audio(_)
            | BlockKind::RadioGroup(_)
            | BlockKind::ToggleSwitch(_)
            | BlockKind::Accordion(_)
            | BlockKind::Separator
            | BlockKind::Drawing(_) => None,
        }
    }

    pub fn align_mut(&mut self) -> Option<&mut TextAlign> {
        match &mut self.kind {
            BlockKind::Paragraph(p) => Some(&mut p.align),
            BlockKind::Header(line) | BlockKind::NumberedListItem(line) => Some(&mut line.align),
            _ => None,
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph(_))
    }

    /// Blocks after which no editable paragraph is added on insertion.
    pub fn is_self_terminating(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Separator | BlockKind::Audio(_) | BlockKind::Image(_)
        )
    }

    /// Media file owned by the block, released when the block is deleted.
    pub fn owned_media(&self) -> Option<&MediaRef> {
        match &self.kind {
            BlockKind::Audio(audio) => audio.resource.as_ref(),
            _ => None,
        }
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        match &self.kind {
            BlockKind::Paragraph(p) if p.list_item => format!("• {}", p.text.text()),
            BlockKind::Paragraph(p) => p.text.text().to_owned(),
            BlockKind::Header(line) => format!("# {}", line.text.text()),
            BlockKind::NumberedListItem(line) => format!("1. {}", line.text.text()),
            BlockKind::Image(img) if img.caption.is_empty() => format!("[image {}]", img.resource),
            BlockKind::Image(img) => format!("[image {}] {}", img.resource, img.caption),
            BlockKind::Checkbox(c) => {
                format!("[{}] {}", if c.checked { "x" } else { " " }, c.text.text())
            }
            BlockKind::Audio(a) => format!("[audio {}]", a.duration),
            BlockKind::RadioGroup(group) => group
                .options
                .iter()
                .map(|o| {
                    let mark = if group.selected == Some(o.id) { "(*)" } else { "( )" };
                    format!("{mark} {}", o.label)
                })
                .collect::<Vec<_>>()
                .join(" "),
            BlockKind::ToggleSwitch(t) => {
                format!("[{}] {}", if t.on { "on" } else { "off" }, t.label)
            }
            BlockKind::Accordion(a) => {
                format!("{} {}", if a.expanded { "▾" } else { "▸" }, a.title)
            }
            BlockKind::Separator => "---".to_owned(),
            BlockKind::Drawing(d) => format!("[drawing {}x{}]", d.raster.width, d.raster.height),
        }
    }
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph(_) => "Paragraph",
            BlockKind::Header(_) => "Header",
            BlockKind::NumberedListItem(_) => "NumberedListItem",
            BlockKind::Image(_) => "Image",
            BlockKind::Checkbox(_) => "Checkbox",
            BlockKind::Audio(_) => "Audio",
            BlockKind::RadioGroup(_) => "RadioGroup",
            BlockKind::ToggleSwitch(_) => "ToggleSwitch",
            BlockKind::Accordion(_) => "Accordion",
            BlockKind::Separator => "Separator",
            BlockKind::Drawing(_) => "Drawing",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind_name(), self.summary())
    }
}

/// Block types that can be created empty from a toolbar or script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockTemplate {
    Paragraph,
    Header,
    NumberedListItem,
    Checkbox,
    Separator,
    ToggleSwitch,
    Accordion,
    RadioGroup,
}

impl BlockTemplate {
    pub const ALL: [BlockTemplate; 8] = [
        BlockTemplate::Paragraph,
        BlockTemplate::Header,
        BlockTemplate::NumberedListItem,
        BlockTemplate::Checkbox,
        BlockTemplate::Separator,
        BlockTemplate::ToggleSwitch,
        BlockTemplate::Accordion,
        BlockTemplate::RadioGroup,
    ];

    /// Create a block of this type with its default content.
    pub fn instantiate(self) -> Block {
        let kind = match self {
            BlockTemplate::Paragraph => BlockKind::Paragraph(Paragraph::default()),
            BlockTemplate::Header => BlockKind::Header(TextLine::default()),
            BlockTemplate::NumberedListItem => BlockKind::NumberedListItem(TextLine::default()),
            BlockTemplate::Checkbox => BlockKind::Checkbox(Checkbox::default()),
            BlockTemplate::Separator => BlockKind::Separator,
            BlockTemplate::ToggleSwitch => BlockKind::ToggleSwitch(ToggleSwitch::default()),
            BlockTemplate::Accordion => BlockKind::Accordion(Accordion::default()),
            BlockTemplate::RadioGroup => BlockKind::RadioGroup(RadioGroup::default()),
        };
        Block::new(kind)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            BlockTemplate::Paragraph => "paragraph",
            BlockTemplate::Header => "header",
            BlockTemplate::NumberedListItem => "numbered",
            BlockTemplate::Checkbox => "checkbox",
            BlockTemplate::Separator => "separator",
            BlockTemplate::ToggleSwitch => "toggle",
            BlockTemplate::Accordion => "accordion",
            BlockTemplate::RadioGroup => "radio",
        }
    }
}

impl std::str::FromStr for BlockTemplate {
    type Err = SmolStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockTemplate::ALL
            .into_iter()
            .find(|t| t.keyword().eq_ignore_ascii_case(s))
            .ok_or_else(|| SmolStr::new(s))
    }
}

/// Format milliseconds as `MM:SS`.
pub fn format_duration(millis: u64) -> SmolStr {
    let total_secs = millis / 1000;
    smol_str::format_smolstr!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}
