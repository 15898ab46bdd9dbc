//! Cursor-geometry classifiers.
//!
//! Each classifier looks at the block under the caret (and, for vertical
//! moves, at the caret's rendered geometry) and decides whether a key should
//! be left to native text editing or turned into a block-level transition.
//! They do not mutate anything; [`crate::engine::Editor`] acts on the result.

use log::trace;

use crate::block::{Block, BlockKind};
use crate::traits::{TextBearing, TextGeometry};
use crate::types::{Caret, Direction};

/// Whether the caret sits on the first (up) or last (down) visual line.
///
/// The caret rect is compared against the rect of a caret collapsed at the
/// start of the first text node (up) or the end of the last one (down), so
/// wrapped lines count as separate lines. Comparisons are strict: adjacent
/// line boxes share an edge, and that edge alone must not count as overlap.
/// Anything that cannot be measured, including the zero-height caret of an
/// empty block, counts as a boundary.
pub fn classify_vertical_move(
    geometry: &dyn TextGeometry,
    offset: usize,
    direction: Direction,
) -> bool {
    let Some(caret) = geometry.bounding_rect_of(offset) else {
        return true;
    };
    if caret.is_degenerate() {
        return true;
    }
    let boundary = match direction {
        Direction::Up => geometry.first_line(),
        Direction::Down => geometry.last_line(),
    };
    let Some(boundary) = boundary else {
        return true;
    };
    if boundary.is_degenerate() {
        return true;
    }
    let at_boundary = match direction {
        Direction::Up => caret.top() < boundary.bottom(),
        Direction::Down => caret.bottom() > boundary.top(),
    };
    trace!("vertical {:?} at offset {}: boundary={}", direction, offset, at_boundary);
    at_boundary
}

/// Whether backspace should delete the surface instead of a character:
/// true iff nothing but whitespace is left.
pub fn classify_backspace(text: &dyn TextBearing) -> bool {
    text.is_empty()
}

/// What backspace does at a caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackspaceAction {
    /// Delete a character natively.
    Native,
    /// Delete the whole block.
    RemoveBlock,
    /// Delete the caret's list item only.
    RemoveItem,
    /// Join the block's text onto the previous block.
    MergeWithPrevious,
}

pub fn backspace_action(block: &Block, caret: &Caret) -> BackspaceAction {
    if let Some(items) = block.items() {
        let Some(item) = caret.item.and_then(|id| block.item(id)) else {
            return BackspaceAction::Native;
        };
        if !classify_backspace(item) {
            return BackspaceAction::Native;
        }
        return if items.len() > 1 {
            BackspaceAction::RemoveItem
        } else {
            BackspaceAction::RemoveBlock
        };
    }
    match block.text() {
        Some(text) if classify_backspace(text) => BackspaceAction::RemoveBlock,
        Some(_) if caret.offset == 0 => BackspaceAction::MergeWithPrevious,
        _ => BackspaceAction::Native,
    }
}

/// What Enter does at a caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    Native,
    /// Split the text block; the continuation gets `continuation` kind.
    Split { continuation: BlockKind },
    /// Split the caret's list item into a new item at the same level.
    SplitItem,
    /// Remove the empty item and continue with a paragraph after the list.
    ExitList,
    /// Remove the block (empty sole list item).
    RemoveBlock,
    /// Blocks without text get a fresh paragraph after them.
    InsertParagraphAfter,
}

pub fn classify_enter(block: &Block, caret: &Caret) -> EnterAction {
    match block.kind {
        // Enter inside a heading or quote starts body text.
        BlockKind::Paragraph | BlockKind::Heading | BlockKind::Quote => EnterAction::Split {
            continuation: BlockKind::Paragraph,
        },
        BlockKind::UnorderedList | BlockKind::OrderedList | BlockKind::Checklist => {
            let Some(item) = caret.item.and_then(|id| block.item(id)) else {
                return EnterAction::Native;
            };
            let sole = block.items().is_some_and(|items| items.len() == 1);
            match (classify_backspace(item), sole) {
                (false, _) => EnterAction::SplitItem,
                (true, true) => EnterAction::RemoveBlock,
                (true, false) => EnterAction::ExitList,
            }
        }
        BlockKind::Delimiter | BlockKind::Media | BlockKind::Table => {
            EnterAction::InsertParagraphAfter
        }
    }
}

/// New indentation for Tab (`outdent == false`) or Shift+Tab.
pub fn indent_level(level: u32, outdent: bool, max_level: u32) -> u32 {
    if outdent {
        level.saturating_sub(1)
    } else {
        level.saturating_add(1).min(max_level)
    }
}
