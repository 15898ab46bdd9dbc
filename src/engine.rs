use log::{debug, warn};

use crate::block::{Block, BlockContent, BlockKind};
use crate::command::{self, Command, CommandContext, Outcome};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EditorError, Result};
use crate::focus::{FocusHandle, FocusRegistry, FocusRequest, FocusTarget};
use crate::key::{InputEvent, KeyCode, KeyEvent};
use crate::navigation::{self, BackspaceAction, EnterAction};
use crate::render::{self, Surface, SurfaceInput};
use crate::traits::{TextBearing, TextGeometry};
use crate::types::{BlockId, Caret, Direction, Edge};

/// Whether the host should run its default handling for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the surface edit text natively.
    Native,
    /// Suppress the default; the editor handled the event.
    Intercepted,
}

/// Changes the host should reflect after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Changed(BlockId),
    Inserted(BlockId),
    Removed(BlockId),
    /// Focus to apply after the next render commit.
    Focus(FocusRequest),
}

#[derive(Debug)]
pub struct Editor {
    document: Document,
    focus: FocusRegistry,
    config: EditorConfig,
}

#[derive(Debug, Clone)]
pub struct EditorSnapshot {
    pub block_count: usize,
    pub mounted: usize,
    pub pending_focus: Option<FocusRequest>,
}

#[derive(Default)]
pub struct EditorBuilder {
    config: EditorConfig,
    blocks: Vec<Block>,
}

impl EditorBuilder {
    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial content; an empty list yields one empty paragraph.
    pub fn blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn build(self) -> Editor {
        Editor {
            document: Document::load(self.blocks),
            focus: FocusRegistry::new(),
            config: self.config,
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        EditorBuilder::default().build()
    }
}

type Handled = (Disposition, Vec<Effect>);

fn native() -> Handled {
    (Disposition::Native, vec![])
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EditorBuilder {
        EditorBuilder::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn focus(&self) -> &FocusRegistry {
        &self.focus
    }

    pub fn focus_mut(&mut self) -> &mut FocusRegistry {
        &mut self.focus
    }

    /// Kind of the block holding the caret, if it still exists.
    pub fn kind_at(&self, caret: &Caret) -> Option<BlockKind> {
        self.document.get(caret.block).map(|b| b.kind)
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            block_count: self.document.len(),
            mounted: self.focus.len(),
            pending_focus: self.focus.pending().copied(),
        }
    }

    /// Replaces the document with loaded blocks.
    pub fn load(&mut self, blocks: Vec<Block>) {
        self.document = Document::load(blocks);
        self.focus.clear();
    }

    /// The current blocks, ready to be serialized by a save action.
    pub fn extract(&self) -> Vec<Block> {
        self.document.extract()
    }

    /// Runs a render pass and returns the surfaces plus any focus request
    /// whose target is now mounted.
    pub fn commit_render(&mut self) -> (Vec<(BlockId, Surface)>, Option<(FocusHandle, FocusRequest)>) {
        let surfaces = render::commit(&self.document, &mut self.focus);
        (surfaces, self.focus.take_ready())
    }

    pub fn dispatch(&mut self, command: Command, ctx: &CommandContext) -> Vec<Effect> {
        match command::dispatch(&mut self.document, command, ctx, &self.config) {
            Ok(Outcome::Unchanged) => vec![],
            Ok(Outcome::Changed(id)) => vec![Effect::Changed(id)],
            Ok(Outcome::Inserted(id)) => {
                let mut effects = vec![Effect::Inserted(id)];
                let request = self.landing(id, Edge::Start);
                self.request_focus(request, &mut effects);
                effects
            }
            Err(err) => {
                warn!("{} ignored: {}", command, err);
                vec![]
            }
        }
    }

    pub fn handle_event(
        &mut self,
        geometry: &dyn TextGeometry,
        caret: Caret,
        input: InputEvent,
    ) -> (Disposition, Vec<Effect>) {
        let result = match input {
            InputEvent::Input(markup) => self.handle_input(caret, markup),
            InputEvent::Key(key) => self.handle_key(geometry, caret, key),
        };
        result.unwrap_or_else(|err| {
            // The UI may already have moved past a removed block.
            if err.is_stale() {
                debug!("stale event ignored: {}", err);
            } else {
                warn!("event ignored: {}", err);
            }
            native()
        })
    }

    fn handle_input(&mut self, caret: Caret, markup: String) -> Result<Handled> {
        let input = match caret.item {
            Some(item) => SurfaceInput::ItemMarkup { item, markup },
            None => SurfaceInput::Markup(markup),
        };
        render::on_input(&mut self.document, caret.block, input)?;
        Ok((Disposition::Native, vec![Effect::Changed(caret.block)]))
    }

    fn handle_key(
        &mut self,
        geometry: &dyn TextGeometry,
        caret: Caret,
        key: KeyEvent,
    ) -> Result<Handled> {
        if self.document.get(caret.block).is_none() {
            return Err(EditorError::NotFound(caret.block));
        }
        match key.code {
            KeyCode::Up if !key.shift() => Ok(self.vertical(geometry, caret, Direction::Up)),
            KeyCode::Down if !key.shift() => Ok(self.vertical(geometry, caret, Direction::Down)),
            KeyCode::Left if !key.shift() => Ok(self.horizontal(caret, Direction::Up)),
            KeyCode::Right if !key.shift() => Ok(self.horizontal(caret, Direction::Down)),
            KeyCode::Enter if !key.shift() => self.enter(caret),
            KeyCode::Backspace => self.backspace(caret),
            KeyCode::Tab => self.indent(caret, key.shift()),
            _ => Ok(native()),
        }
    }

    fn request_focus(&mut self, request: FocusRequest, effects: &mut Vec<Effect>) {
        self.focus.request(request);
        effects.push(Effect::Focus(request));
    }

    /// Where focus lands in `block`: list blocks land in their first item
    /// for `Start` and their last item otherwise.
    fn landing(&self, block: BlockId, edge: Edge) -> FocusRequest {
        let item = self
            .document
            .get(block)
            .and_then(|b| b.items())
            .and_then(|items| match edge {
                Edge::Start => items.first(),
                _ => items.last(),
            })
            .map(|i| i.id);
        FocusRequest::new(FocusTarget { block, item }, edge)
    }

    fn edge_for(direction: Direction) -> Edge {
        match direction {
            Direction::Up => Edge::End,
            Direction::Down => Edge::Start,
        }
    }

    /// Moves to the neighbouring item inside a list, then to the
    /// neighbouring block. `Native` at the document boundary.
    fn step(&mut self, caret: Caret, direction: Direction) -> Handled {
        let edge = Self::edge_for(direction);
        let block = self.document.get(caret.block);
        if let (Some(items), Some(item)) = (block.and_then(|b| b.items()), caret.item) {
            let index = items.iter().position(|i| i.id == item);
            let next = index.and_then(|i| match direction {
                Direction::Up => i.checked_sub(1),
                Direction::Down => Some(i + 1),
            });
            if let Some(next) = next.and_then(|n| items.get(n)) {
                let request = FocusRequest::new(FocusTarget::item(caret.block, next.id), edge);
                let mut effects = Vec::new();
                self.request_focus(request, &mut effects);
                return (Disposition::Intercepted, effects);
            }
        }
        let Some(target) = self.document.move_focus_target(caret.block, direction) else {
            return native();
        };
        let request = self.landing(target, edge);
        let mut effects = Vec::new();
        self.request_focus(request, &mut effects);
        (Disposition::Intercepted, effects)
    }

    fn vertical(&mut self, geometry: &dyn TextGeometry, caret: Caret, direction: Direction) -> Handled {
        let text = self
            .document
            .get(caret.block)
            .and_then(|b| b.text_at(caret.item));
        let at_boundary = match (text, direction) {
            (Some(text), Direction::Up) => text.is_at_top_line(geometry, caret.offset),
            (Some(text), Direction::Down) => text.is_at_bottom_line(geometry, caret.offset),
            // Delimiters, media and tables have no lines to move through.
            (None, _) => true,
        };
        if !at_boundary {
            return native();
        }
        self.step(caret, direction)
    }

    /// Left at the start or Right at the end of the text leaves the block.
    fn horizontal(&mut self, caret: Caret, direction: Direction) -> Handled {
        let len = self
            .document
            .get(caret.block)
            .and_then(|b| b.text_at(caret.item))
            .map_or(0, |t| t.len());
        let at_edge = match direction {
            Direction::Up => caret.offset == 0,
            Direction::Down => caret.offset >= len,
        };
        if !at_edge {
            return native();
        }
        self.step(caret, direction)
    }

    fn enter(&mut self, caret: Caret) -> Result<Handled> {
        let Some(block) = self.document.get(caret.block) else {
            return Ok(native());
        };
        let kind = block.kind;
        let mut effects = Vec::new();
        match navigation::classify_enter(block, &caret) {
            EnterAction::Native => return Ok(native()),
            EnterAction::Split { continuation } => {
                let text = block.text().cloned().unwrap_or_default();
                let (before, after) = text.split_at(caret.offset);
                let id = self.document.split_at_cursor(
                    caret.block,
                    BlockContent::Text(before),
                    BlockContent::Text(after),
                )?;
                if continuation != kind {
                    self.document.convert_kind(id, continuation, &self.config)?;
                }
                effects.push(Effect::Changed(caret.block));
                effects.push(Effect::Inserted(id));
                self.request_focus(FocusRequest::new(FocusTarget::block(id), Edge::Start), &mut effects);
            }
            EnterAction::SplitItem => {
                let Some(item) = caret.item else {
                    return Ok(native());
                };
                let new_item = self.document.split_item(caret.block, item, caret.offset)?;
                effects.push(Effect::Changed(caret.block));
                self.request_focus(
                    FocusRequest::new(FocusTarget::item(caret.block, new_item), Edge::Start),
                    &mut effects,
                );
            }
            EnterAction::ExitList => {
                let Some(item) = caret.item else {
                    return Ok(native());
                };
                self.document.remove_item(caret.block, item)?;
                let paragraph = self.document.empty_paragraph();
                let id = self.document.insert_after(caret.block, paragraph)?;
                effects.push(Effect::Changed(caret.block));
                effects.push(Effect::Inserted(id));
                self.request_focus(FocusRequest::new(FocusTarget::block(id), Edge::Start), &mut effects);
            }
            EnterAction::RemoveBlock => self.remove_block(caret.block, &mut effects)?,
            EnterAction::InsertParagraphAfter => {
                let paragraph = self.document.empty_paragraph();
                let id = self.document.insert_after(caret.block, paragraph)?;
                effects.push(Effect::Inserted(id));
                self.request_focus(FocusRequest::new(FocusTarget::block(id), Edge::Start), &mut effects);
            }
        }
        Ok((Disposition::Intercepted, effects))
    }

    fn backspace(&mut self, caret: Caret) -> Result<Handled> {
        let Some(block) = self.document.get(caret.block) else {
            return Ok(native());
        };
        let mut effects = Vec::new();
        match navigation::backspace_action(block, &caret) {
            BackspaceAction::Native => return Ok(native()),
            BackspaceAction::RemoveBlock => self.remove_block(caret.block, &mut effects)?,
            BackspaceAction::RemoveItem => {
                let Some(item) = caret.item else {
                    return Ok(native());
                };
                let was_first = block.item_index(item) == Some(0);
                let Some(focus) = self.document.remove_item(caret.block, item)? else {
                    return Ok(native());
                };
                let edge = if was_first { Edge::Start } else { Edge::End };
                effects.push(Effect::Changed(caret.block));
                self.request_focus(
                    FocusRequest::new(FocusTarget::item(caret.block, focus), edge),
                    &mut effects,
                );
            }
            BackspaceAction::MergeWithPrevious => {
                let Some(join) = self.document.merge_into_previous(caret.block)? else {
                    return Ok(native());
                };
                effects.push(Effect::Removed(caret.block));
                effects.push(Effect::Changed(join.block));
                self.request_focus(FocusRequest::at(join), &mut effects);
            }
        }
        Ok((Disposition::Intercepted, effects))
    }

    /// Removes a block and focuses the block the store hands back: at its
    /// end when it came before the removed one, else at its start.
    fn remove_block(&mut self, id: BlockId, effects: &mut Vec<Effect>) -> Result<()> {
        let was_first = self.document.position(id) == Some(0);
        let sole = self.document.len() == 1;
        let focus = self.document.remove_block(id)?;
        effects.push(Effect::Removed(id));
        if sole {
            effects.push(Effect::Inserted(focus));
        }
        let edge = if was_first { Edge::Start } else { Edge::End };
        let request = self.landing(focus, edge);
        self.request_focus(request, effects);
        Ok(())
    }

    fn indent(&mut self, caret: Caret, outdent: bool) -> Result<Handled> {
        let Some(item) = caret.item else {
            return Ok(native());
        };
        let Some(block) = self.document.get(caret.block) else {
            return Ok(native());
        };
        if !block.kind.is_list() {
            return Ok(native());
        }
        let Some(current) = block.item(item).map(|i| i.level) else {
            return Ok(native());
        };
        let level = navigation::indent_level(current, outdent, self.config.max_list_level);
        let mut effects = Vec::new();
        if level != current {
            self.document.set_item_level(caret.block, item, level)?;
            effects.push(Effect::Changed(caret.block));
        }
        // Tab never leaves the list, even when the level is already at a bound.
        Ok((Disposition::Intercepted, effects))
    }
}
