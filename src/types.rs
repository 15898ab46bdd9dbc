use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a block within a document.
///
/// Ids are allocated from a monotonic counter owned by the document and are
/// never reused, even after the block they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

/// Identifier of a list item inside a list or checklist block.
///
/// Item ids come from the same allocator as block ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// The position of the text caret.
///
/// Offsets are zero-indexed and counted in grapheme clusters, not bytes or
/// chars. For list blocks `item` names the list item holding the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    /// The block holding the caret.
    pub block: BlockId,
    /// The list item holding the caret, for list kinds.
    pub item: Option<ItemId>,
    /// Grapheme offset inside the block (or item) text.
    pub offset: usize,
}

impl Caret {
    pub fn new(block: BlockId, offset: usize) -> Self {
        Self {
            block,
            item: None,
            offset,
        }
    }

    pub fn in_item(block: BlockId, item: ItemId, offset: usize) -> Self {
        Self {
            block,
            item: Some(item),
            offset,
        }
    }
}

/// A text selection inside a single block (or list item).
///
/// Selections are half-open intervals `[start, end)` in grapheme offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub block: BlockId,
    pub item: Option<ItemId>,
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// A selection collapsed at the caret.
    pub fn collapsed(caret: Caret) -> Self {
        Self {
            block: caret.block,
            item: caret.item,
            start: caret.offset,
            end: caret.offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start >= self.end
    }
}

/// Vertical direction of a cursor move across blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Where the caret lands when focus moves to another block or item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Start of the target's text.
    Start,
    /// End of the target's text.
    End,
    /// An explicit grapheme offset, used after merges.
    Offset(usize),
}

/// Horizontal alignment of a text-bearing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// An axis-aligned rectangle in surface pixels, as reported by a host's
/// layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Collapsed carets on empty content have no height.
    pub fn is_degenerate(&self) -> bool {
        !(self.height > 0.0) || !self.y.is_finite()
    }
}
