use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::inline::InlineText;
use crate::types::{BlockId, ItemId, TextAlign};

/// The kind of a block, which selects its renderer and mutation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    Quote,
    UnorderedList,
    OrderedList,
    Checklist,
    Delimiter,
    Media,
    Table,
}

impl BlockKind {
    /// Paragraph, heading and quote hold a single inline text.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph | BlockKind::Heading | BlockKind::Quote
        )
    }

    pub fn is_list(self) -> bool {
        matches!(
            self,
            BlockKind::UnorderedList | BlockKind::OrderedList | BlockKind::Checklist
        )
    }

    /// Kinds the caret can be placed in.
    pub fn is_text_bearing(self) -> bool {
        self.is_text() || self.is_list()
    }

    /// Whether `content` is a valid payload for this kind.
    pub fn accepts(self, content: &BlockContent) -> bool {
        match content {
            BlockContent::Text(_) => self.is_text(),
            BlockContent::List(_) => self.is_list(),
            BlockContent::Delimiter(_) => self == BlockKind::Delimiter,
            BlockContent::Media(_) => self == BlockKind::Media,
            BlockContent::Table(_) => self == BlockKind::Table,
        }
    }
}

/// Heading level, restricted to `h2`..`h6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(EditorError::InvalidHeadingLevel(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HeadingLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for HeadingLevel {
    type Error = EditorError;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<HeadingLevel> for u8 {
    fn from(level: HeadingLevel) -> u8 {
        level.0
    }
}

/// One entry of a list or checklist block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: ItemId,
    pub content: InlineText,
    /// Indentation depth.
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub checked: bool,
}

impl ListItem {
    pub fn new(id: ItemId, content: InlineText, level: u32) -> Self {
        Self {
            id,
            content,
            level,
            checked: false,
        }
    }
}

/// Stroke of a delimiter line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            LineStyle::Solid => "solid",
            LineStyle::Dashed => "dashed",
            LineStyle::Dotted => "dotted",
        }
    }
}

/// Visual attributes of a delimiter block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimiterStyle {
    pub color: String,
    pub line_style: LineStyle,
    /// Dash length in pixels, only used by dashed lines.
    pub dash_length: u32,
    /// Line thickness in pixels.
    pub thickness: u32,
}

impl Default for DelimiterStyle {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            line_style: LineStyle::Solid,
            dash_length: 5,
            thickness: 1,
        }
    }
}

/// A reference to an asset chosen through the host's media picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub name: String,
    pub path: String,
    pub background_color: String,
}

/// Rows of cells, each cell holding inline text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableContent {
    pub rows: Vec<Vec<InlineText>>,
}

impl TableContent {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![InlineText::new(); cols.max(1)]; rows.max(1)],
        }
    }
}

/// Kind-specific payload of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    Text(InlineText),
    List(Vec<ListItem>),
    Delimiter(DelimiterStyle),
    Media(Option<MediaRef>),
    Table(TableContent),
}

impl BlockContent {
    pub fn as_text(&self) -> Option<&InlineText> {
        match self {
            BlockContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut InlineText> {
        match self {
            BlockContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[ListItem]> {
        match self {
            BlockContent::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_items_mut(&mut self) -> Option<&mut Vec<ListItem>> {
        match self {
            BlockContent::List(items) => Some(items),
            _ => None,
        }
    }
}

/// The atomic unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub content: BlockContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<HeadingLevel>,
}

impl Block {
    /// An empty paragraph, the block every document falls back to.
    pub fn paragraph(id: BlockId, text: InlineText) -> Self {
        Self {
            id,
            kind: BlockKind::Paragraph,
            content: BlockContent::Text(text),
            text_align: None,
            heading_level: None,
        }
    }

    pub fn heading(id: BlockId, level: HeadingLevel, text: InlineText) -> Self {
        Self {
            id,
            kind: BlockKind::Heading,
            content: BlockContent::Text(text),
            text_align: None,
            heading_level: Some(level),
        }
    }

    pub fn quote(id: BlockId, text: InlineText) -> Self {
        Self {
            kind: BlockKind::Quote,
            ..Self::paragraph(id, text)
        }
    }

    /// A list block of `kind`. Panics in debug builds on non-list kinds.
    pub fn list(id: BlockId, kind: BlockKind, items: Vec<ListItem>) -> Self {
        debug_assert!(kind.is_list());
        Self {
            id,
            kind,
            content: BlockContent::List(items),
            text_align: None,
            heading_level: None,
        }
    }

    pub fn delimiter(id: BlockId, style: DelimiterStyle) -> Self {
        Self {
            id,
            kind: BlockKind::Delimiter,
            content: BlockContent::Delimiter(style),
            text_align: None,
            heading_level: None,
        }
    }

    pub fn media(id: BlockId, media: Option<MediaRef>) -> Self {
        Self {
            id,
            kind: BlockKind::Media,
            content: BlockContent::Media(media),
            text_align: None,
            heading_level: None,
        }
    }

    pub fn table(id: BlockId, table: TableContent) -> Self {
        Self {
            id,
            kind: BlockKind::Table,
            content: BlockContent::Table(table),
            text_align: None,
            heading_level: None,
        }
    }

    pub fn text(&self) -> Option<&InlineText> {
        self.content.as_text()
    }

    pub fn items(&self) -> Option<&[ListItem]> {
        self.content.as_items()
    }

    pub fn item(&self, item: ItemId) -> Option<&ListItem> {
        self.items()?.iter().find(|i| i.id == item)
    }

    pub fn item_index(&self, item: ItemId) -> Option<usize> {
        self.items()?.iter().position(|i| i.id == item)
    }

    /// Text under the caret: the block text, or the given list item's text.
    pub fn text_at(&self, item: Option<ItemId>) -> Option<&InlineText> {
        match (&self.content, item) {
            (BlockContent::Text(text), _) => Some(text),
            (BlockContent::List(items), Some(id)) => {
                items.iter().find(|i| i.id == id).map(|i| &i.content)
            }
            _ => None,
        }
    }

    /// Whether the block has no meaningful content left.
    pub fn is_blank(&self) -> bool {
        match &self.content {
            BlockContent::Text(text) => text.is_blank(),
            BlockContent::List(items) => items.iter().all(|i| i.content.is_blank()),
            _ => false,
        }
    }
}
