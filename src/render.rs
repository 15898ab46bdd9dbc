//! Per-kind presentation of blocks into editable surfaces.
//!
//! Renderers are stateless: they describe a block as a [`Surface`] and turn
//! a surface's serialized state back into block content. The document stays
//! the only authority; every input goes straight through
//! [`Document::update_content`].

use log::{debug, warn};

use crate::block::{Block, BlockContent, BlockKind, DelimiterStyle, LineStyle, ListItem, MediaRef};
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::focus::{FocusRegistry, FocusTarget};
use crate::inline::InlineText;
use crate::traits::MediaPicker;
use crate::types::{BlockId, ItemId, TextAlign};

/// One list item as presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSurface {
    pub id: ItemId,
    pub markup: String,
    pub level: u32,
    /// `Some` for checklist items.
    pub checked: Option<bool>,
}

/// What a host should draw for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    /// Editable inline markup wrapped in `tag` (`p`, `h2`..`h6`, `blockquote`).
    Inline {
        tag: &'static str,
        markup: String,
        align: Option<TextAlign>,
    },
    Items {
        tag: &'static str,
        checklist: bool,
        align: Option<TextAlign>,
        items: Vec<ItemSurface>,
    },
    /// A horizontal rule; `dash_length` is set for dashed lines only.
    Divider {
        color: String,
        line_style: LineStyle,
        thickness: u32,
        dash_length: Option<u32>,
    },
    /// A picked asset, or a placeholder inviting the user to pick one.
    Media(Option<MediaRef>),
    Table { rows: Vec<Vec<String>> },
}

/// Serialized state a surface reports after a native edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceInput {
    /// The whole surface's markup (text kinds).
    Markup(String),
    ItemMarkup { item: ItemId, markup: String },
    ItemChecked { item: ItemId, checked: bool },
    Cell { row: usize, col: usize, markup: String },
}

/// Presentation contract shared by every block kind.
pub trait BlockRenderer {
    fn render(&self, block: &Block) -> Surface;

    /// The block's content after `input`; the block itself is untouched.
    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent>;
}

fn mismatch(block: &Block) -> EditorError {
    EditorError::KindMismatch {
        block: block.id,
        kind: block.kind,
    }
}

fn inline_input(block: &Block, input: SurfaceInput) -> Result<BlockContent> {
    match input {
        SurfaceInput::Markup(markup) => Ok(BlockContent::Text(InlineText::from_markup(&markup)?)),
        _ => Err(mismatch(block)),
    }
}

fn inline_surface(block: &Block, tag: &'static str) -> Surface {
    Surface::Inline {
        tag,
        markup: block.text().map(InlineText::to_markup).unwrap_or_default(),
        align: block.text_align,
    }
}

pub struct ParagraphRenderer;

impl BlockRenderer for ParagraphRenderer {
    fn render(&self, block: &Block) -> Surface {
        inline_surface(block, "p")
    }

    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent> {
        inline_input(block, input)
    }
}

pub struct HeadingRenderer;

impl BlockRenderer for HeadingRenderer {
    fn render(&self, block: &Block) -> Surface {
        let tag = match block.heading_level.map(|l| l.get()) {
            Some(3) => "h3",
            Some(4) => "h4",
            Some(5) => "h5",
            Some(6) => "h6",
            _ => "h2",
        };
        inline_surface(block, tag)
    }

    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent> {
        inline_input(block, input)
    }
}

pub struct QuoteRenderer;

impl BlockRenderer for QuoteRenderer {
    fn render(&self, block: &Block) -> Surface {
        inline_surface(block, "blockquote")
    }

    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent> {
        inline_input(block, input)
    }
}

pub struct ListRenderer;

impl BlockRenderer for ListRenderer {
    fn render(&self, block: &Block) -> Surface {
        let checklist = block.kind == BlockKind::Checklist;
        let items = block
            .items()
            .unwrap_or_default()
            .iter()
            .map(|item| ItemSurface {
                id: item.id,
                markup: item.content.to_markup(),
                level: item.level,
                checked: checklist.then_some(item.checked),
            })
            .collect();
        Surface::Items {
            tag: if block.kind == BlockKind::OrderedList { "ol" } else { "ul" },
            checklist,
            align: block.text_align,
            items,
        }
    }

    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent> {
        let mut items: Vec<ListItem> = block.items().ok_or_else(|| mismatch(block))?.to_vec();
        match input {
            SurfaceInput::ItemMarkup { item, markup } => {
                item_mut(&mut items, block.id, item)?.content = InlineText::from_markup(&markup)?;
            }
            SurfaceInput::ItemChecked { item, checked } => {
                item_mut(&mut items, block.id, item)?.checked = checked;
            }
            _ => return Err(mismatch(block)),
        }
        Ok(BlockContent::List(items))
    }
}

fn item_mut(items: &mut [ListItem], block: BlockId, item: ItemId) -> Result<&mut ListItem> {
    items
        .iter_mut()
        .find(|i| i.id == item)
        .ok_or(EditorError::ItemNotFound { block, item })
}

pub struct DelimiterRenderer;

impl BlockRenderer for DelimiterRenderer {
    fn render(&self, block: &Block) -> Surface {
        let style = match &block.content {
            BlockContent::Delimiter(style) => style.clone(),
            _ => DelimiterStyle::default(),
        };
        Surface::Divider {
            dash_length: (style.line_style == LineStyle::Dashed).then_some(style.dash_length),
            color: style.color,
            line_style: style.line_style,
            thickness: style.thickness,
        }
    }

    /// Delimiters have no editable text; style changes go through
    /// [`DelimiterEditor`].
    fn apply_input(&self, block: &Block, _input: SurfaceInput) -> Result<BlockContent> {
        Err(mismatch(block))
    }
}

pub struct MediaRenderer;

impl BlockRenderer for MediaRenderer {
    fn render(&self, block: &Block) -> Surface {
        match &block.content {
            BlockContent::Media(media) => Surface::Media(media.clone()),
            _ => Surface::Media(None),
        }
    }

    fn apply_input(&self, block: &Block, _input: SurfaceInput) -> Result<BlockContent> {
        Err(mismatch(block))
    }
}

pub struct TableRenderer;

impl BlockRenderer for TableRenderer {
    fn render(&self, block: &Block) -> Surface {
        let rows = match &block.content {
            BlockContent::Table(table) => table
                .rows
                .iter()
                .map(|row| row.iter().map(InlineText::to_markup).collect())
                .collect(),
            _ => Vec::new(),
        };
        Surface::Table { rows }
    }

    fn apply_input(&self, block: &Block, input: SurfaceInput) -> Result<BlockContent> {
        let BlockContent::Table(table) = &block.content else {
            return Err(mismatch(block));
        };
        let SurfaceInput::Cell { row, col, markup } = input else {
            return Err(mismatch(block));
        };
        let mut table = table.clone();
        let cell = table
            .rows
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| EditorError::Markup(format!("no cell at {row}:{col}")))?;
        *cell = InlineText::from_markup(&markup)?;
        Ok(BlockContent::Table(table))
    }
}

/// The renderer for a block kind.
pub fn renderer_for(kind: BlockKind) -> &'static dyn BlockRenderer {
    match kind {
        BlockKind::Paragraph => &ParagraphRenderer,
        BlockKind::Heading => &HeadingRenderer,
        BlockKind::Quote => &QuoteRenderer,
        BlockKind::UnorderedList | BlockKind::OrderedList | BlockKind::Checklist => &ListRenderer,
        BlockKind::Delimiter => &DelimiterRenderer,
        BlockKind::Media => &MediaRenderer,
        BlockKind::Table => &TableRenderer,
    }
}

pub fn render(block: &Block) -> Surface {
    renderer_for(block.kind).render(block)
}

/// Pushes a surface's serialized state into the document.
pub fn on_input(doc: &mut Document, id: BlockId, input: SurfaceInput) -> Result<()> {
    let block = doc.get(id).ok_or(EditorError::NotFound(id))?;
    let content = renderer_for(block.kind).apply_input(block, input)?;
    doc.update_content(id, content)
}

/// A render pass: mounts every block and list item of `doc` in `focus` and
/// unmounts whatever no longer exists. Returns the surfaces in order.
pub fn commit(doc: &Document, focus: &mut FocusRegistry) -> Vec<(BlockId, Surface)> {
    let mut live = std::collections::HashSet::new();
    let mut surfaces = Vec::with_capacity(doc.len());
    for block in doc.iter() {
        let target = FocusTarget::block(block.id);
        focus.register(target);
        live.insert(target);
        for item in block.items().unwrap_or_default() {
            let target = FocusTarget::item(block.id, item.id);
            focus.register(target);
            live.insert(target);
        }
        surfaces.push((block.id, render(block)));
    }
    focus.retain(|target| live.contains(target));
    surfaces
}

/// Local style editor of a delimiter block.
///
/// Only the open/closed state is local; every style change is written to
/// the block right away.
#[derive(Debug, Clone)]
pub struct DelimiterEditor {
    block: BlockId,
    open: bool,
}

impl DelimiterEditor {
    pub fn new(block: BlockId) -> Self {
        Self { block, open: false }
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    fn update(&self, doc: &mut Document, change: impl FnOnce(&mut DelimiterStyle)) -> Result<()> {
        let block = doc.get(self.block).ok_or(EditorError::NotFound(self.block))?;
        let BlockContent::Delimiter(style) = &block.content else {
            return Err(mismatch(block));
        };
        let mut style = style.clone();
        change(&mut style);
        doc.update_content(self.block, BlockContent::Delimiter(style))
    }

    pub fn set_color(&self, doc: &mut Document, color: &str) -> Result<()> {
        self.update(doc, |s| s.color = color.to_string())
    }

    pub fn set_line_style(&self, doc: &mut Document, line_style: LineStyle) -> Result<()> {
        self.update(doc, |s| s.line_style = line_style)
    }

    pub fn set_dash_length(&self, doc: &mut Document, dash_length: u32) -> Result<()> {
        self.update(doc, |s| s.dash_length = dash_length.max(1))
    }

    pub fn set_thickness(&self, doc: &mut Document, thickness: u32) -> Result<()> {
        self.update(doc, |s| s.thickness = thickness.max(1))
    }
}

/// Opens the picker and stores its selection in a media block.
/// Returns whether a selection was made.
pub fn select_media(doc: &mut Document, id: BlockId, picker: &mut dyn MediaPicker) -> Result<bool> {
    let block = doc.get(id).ok_or(EditorError::NotFound(id))?;
    if block.kind != BlockKind::Media {
        return Err(mismatch(block));
    }
    let Some(media) = picker.pick() else {
        debug!("media picker dismissed for {}", id);
        return Ok(false);
    };
    doc.update_content(id, BlockContent::Media(Some(media)))?;
    Ok(true)
}

/// The media block's delete affordance. Returns the block to focus next.
pub fn delete_media(doc: &mut Document, id: BlockId) -> Result<BlockId> {
    match doc.get(id).map(|b| b.kind) {
        Some(BlockKind::Media) => doc.remove_block(id),
        Some(kind) => {
            warn!("delete_media on {:?} block {}", kind, id);
            Err(EditorError::KindMismatch { block: id, kind })
        }
        None => Err(EditorError::NotFound(id)),
    }
}
