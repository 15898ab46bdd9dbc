//! Toolbar commands.
//!
//! Every command maps to exactly one [`Strategy`]; the mapping is a pure
//! function of the command and [`dispatch`] only uses the public
//! [`Document`] API to carry it out.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::block::BlockKind;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::inline::{Mark, MarkKind};
use crate::types::{BlockId, Selection, TextAlign};

/// The toolbar vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Bold,
    Italic,
    Underline,
    UnorderedList,
    OrderedList,
    Quote,
    LeftAlign,
    CenterAlign,
    RightAlign,
    Link,
    Warning,
    Code,
    Media,
    Checkbox,
    Table,
    Delimiter,
}

/// A change to a block's kind or presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Kind(BlockKind),
    Align(TextAlign),
}

/// How a command mutates the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Toggle an inline mark over the selection.
    InlineToggle(MarkKind),
    /// Convert the selected block.
    ConvertBlock(Conversion),
    /// Insert a new block of this kind after the selected one.
    InsertBlock(BlockKind),
}

impl Command {
    pub const ALL: [Command; 16] = [
        Command::Bold,
        Command::Italic,
        Command::Underline,
        Command::UnorderedList,
        Command::OrderedList,
        Command::Quote,
        Command::LeftAlign,
        Command::CenterAlign,
        Command::RightAlign,
        Command::Link,
        Command::Warning,
        Command::Code,
        Command::Media,
        Command::Checkbox,
        Command::Table,
        Command::Delimiter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::Bold => "bold",
            Command::Italic => "italic",
            Command::Underline => "underline",
            Command::UnorderedList => "unordered-list",
            Command::OrderedList => "ordered-list",
            Command::Quote => "quote",
            Command::LeftAlign => "left-align",
            Command::CenterAlign => "center-align",
            Command::RightAlign => "right-align",
            Command::Link => "link",
            Command::Warning => "warning",
            Command::Code => "code",
            Command::Media => "media",
            Command::Checkbox => "checkbox",
            Command::Table => "table",
            Command::Delimiter => "delimiter",
        }
    }

    pub fn strategy(self) -> Strategy {
        use Strategy::*;
        match self {
            Command::Bold => InlineToggle(MarkKind::Bold),
            Command::Italic => InlineToggle(MarkKind::Italic),
            Command::Underline => InlineToggle(MarkKind::Underline),
            Command::Link => InlineToggle(MarkKind::Link),
            Command::Warning => InlineToggle(MarkKind::Warning),
            Command::Code => InlineToggle(MarkKind::Code),
            Command::UnorderedList => ConvertBlock(Conversion::Kind(BlockKind::UnorderedList)),
            Command::OrderedList => ConvertBlock(Conversion::Kind(BlockKind::OrderedList)),
            Command::Quote => ConvertBlock(Conversion::Kind(BlockKind::Quote)),
            Command::Checkbox => ConvertBlock(Conversion::Kind(BlockKind::Checklist)),
            Command::LeftAlign => ConvertBlock(Conversion::Align(TextAlign::Left)),
            Command::CenterAlign => ConvertBlock(Conversion::Align(TextAlign::Center)),
            Command::RightAlign => ConvertBlock(Conversion::Align(TextAlign::Right)),
            Command::Media => InsertBlock(BlockKind::Media),
            Command::Table => InsertBlock(BlockKind::Table),
            Command::Delimiter => InsertBlock(BlockKind::Delimiter),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self> {
        Command::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| EditorError::UnknownCommand(s.to_string()))
    }
}

/// Where a command applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub selection: Selection,
    /// Link target for [`Command::Link`].
    pub href: Option<String>,
}

impl CommandContext {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            href: None,
        }
    }

    pub fn with_href(selection: Selection, href: impl Into<String>) -> Self {
        Self {
            selection,
            href: Some(href.into()),
        }
    }
}

/// What a dispatched command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Changed(BlockId),
    Inserted(BlockId),
}

/// Applies a command to the document.
pub fn dispatch(
    doc: &mut Document,
    command: Command,
    ctx: &CommandContext,
    config: &EditorConfig,
) -> Result<Outcome> {
    let sel = ctx.selection;
    let block = doc.get(sel.block).ok_or(EditorError::NotFound(sel.block))?;
    debug!("dispatch {} on {}", command, sel.block);

    match command.strategy() {
        Strategy::InlineToggle(kind) => {
            let Some(text) = block.text_at(sel.item) else {
                return Ok(Outcome::Unchanged);
            };
            if sel.is_collapsed() {
                return Ok(Outcome::Unchanged);
            }
            let mut text = text.clone();
            let mark = match kind {
                MarkKind::Bold => Mark::Bold,
                MarkKind::Italic => Mark::Italic,
                MarkKind::Underline => Mark::Underline,
                MarkKind::Warning => Mark::Warning,
                MarkKind::Code => Mark::Code,
                MarkKind::Link => {
                    let linked = text.is_marked(sel.start, sel.end, MarkKind::Link);
                    match &ctx.href {
                        Some(href) => Mark::Link(href.clone()),
                        // Unlinking needs no target.
                        None if linked => Mark::Link(String::new()),
                        None => return Ok(Outcome::Unchanged),
                    }
                }
            };
            if !text.toggle(sel.start, sel.end, mark) {
                return Ok(Outcome::Unchanged);
            }
            doc.set_text(sel.block, sel.item, text)?;
            Ok(Outcome::Changed(sel.block))
        }
        Strategy::ConvertBlock(Conversion::Kind(kind)) => {
            // Converting into the current kind turns the block back into a
            // paragraph.
            let target = if block.kind == kind {
                BlockKind::Paragraph
            } else {
                kind
            };
            if block.kind == target {
                return Ok(Outcome::Unchanged);
            }
            doc.convert_kind(sel.block, target, config)?;
            Ok(Outcome::Changed(sel.block))
        }
        Strategy::ConvertBlock(Conversion::Align(align)) => {
            if doc.set_text_align(sel.block, Some(align))? {
                Ok(Outcome::Changed(sel.block))
            } else {
                Ok(Outcome::Unchanged)
            }
        }
        Strategy::InsertBlock(kind) => {
            let new_block = doc.new_block(kind, config);
            let id = doc.insert_after(sel.block, new_block)?;
            Ok(Outcome::Inserted(id))
        }
    }
}
