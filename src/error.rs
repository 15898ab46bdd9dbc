use thiserror::Error;

use crate::block::BlockKind;
use crate::types::{BlockId, ItemId};

/// Errors raised by document and editor operations.
///
/// None of these are meant to reach the user: the editor turns them into
/// silent no-ops so the editing session stays usable.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The block was removed before the operation ran.
    #[error("block not found: {0}")]
    NotFound(BlockId),

    #[error("list item {item} not found in {block}")]
    ItemNotFound { block: BlockId, item: ItemId },

    #[error("content does not fit a {kind:?} block ({block})")]
    KindMismatch { block: BlockId, kind: BlockKind },

    #[error("heading level must be between 2 and 6, got {0}")]
    InvalidHeadingLevel(u8),

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EditorError {
    /// Whether the error only means the target went away in the meantime.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            EditorError::NotFound(_) | EditorError::ItemNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
