pub mod block;
pub mod command;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod inline;
pub mod key;
pub mod navigation;
pub mod render;
pub mod traits;
pub mod types;

pub use crate::block::{
    Block, BlockContent, BlockKind, DelimiterStyle, HeadingLevel, LineStyle, ListItem, MediaRef,
    TableContent,
};
pub use crate::command::{Command, CommandContext, Conversion, Outcome, Strategy};
pub use crate::config::EditorConfig;
pub use crate::document::Document;
pub use crate::engine::{Disposition, Editor, EditorBuilder, EditorSnapshot, Effect};
pub use crate::error::{EditorError, Result};
pub use crate::focus::{FocusHandle, FocusRegistry, FocusRequest, FocusTarget};
pub use crate::geometry::WrappedTextGeometry;
pub use crate::inline::{InlineText, Mark, MarkKind, Span};
pub use crate::key::{InputEvent, KeyCode, KeyEvent, Modifiers};
pub use crate::traits::{MediaPicker, TextBearing, TextGeometry};
pub use crate::types::{BlockId, Caret, Direction, Edge, ItemId, Rect, Selection, TextAlign};
