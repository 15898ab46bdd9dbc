//! The block store: an ordered, never-empty sequence of blocks.

use std::collections::HashSet;

use log::{debug, warn};

use crate::block::{Block, BlockContent, BlockKind, HeadingLevel, ListItem, TableContent};
use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::inline::InlineText;
use crate::traits::TextBearing;
use crate::types::{BlockId, Caret, Direction, ItemId, TextAlign};

/// Loaded ids above this are renumbered so the allocator never runs out.
const ID_CEILING: u64 = u64::MAX / 2;

/// An ordered sequence of blocks.
///
/// Two invariants hold after every public call: the sequence is never empty,
/// and no block id or list-item id is ever handed out twice.
#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding one empty paragraph.
    pub fn new() -> Self {
        Self::load(Vec::new())
    }

    /// Builds a document from previously extracted blocks.
    ///
    /// An empty input yields one empty paragraph. Duplicate ids are replaced
    /// with fresh ones and payloads that do not fit their kind are reset.
    /// When any id lies above `u64::MAX / 2` every id is renumbered.
    pub fn load(blocks: Vec<Block>) -> Self {
        let max_seen = blocks
            .iter()
            .flat_map(|b| {
                let items = b.items().unwrap_or_default().iter().map(|i| i.id.0);
                std::iter::once(b.id.0).chain(items)
            })
            .max();
        let renumber = max_seen.is_some_and(|m| m > ID_CEILING);
        if renumber {
            warn!("ids above {} on load, renumbering", ID_CEILING);
        }
        let mut doc = Self {
            blocks: Vec::with_capacity(blocks.len().max(1)),
            next_id: match max_seen {
                Some(m) if !renumber => m + 1,
                _ => 1,
            },
        };

        let mut block_ids = HashSet::new();
        let mut item_ids = HashSet::new();
        for mut block in blocks {
            if renumber || !block_ids.insert(block.id) {
                let fresh = doc.new_block_id();
                if !renumber {
                    warn!("duplicate {} on load, reassigned to {}", block.id, fresh);
                }
                block.id = fresh;
                block_ids.insert(fresh);
            }
            if !block.kind.accepts(&block.content) {
                warn!("{} has content unfit for {:?}, reset", block.id, block.kind);
                block.content = doc.default_content(block.kind, &EditorConfig::default());
            }
            if let Some(items) = block.content.as_items_mut() {
                for item in items.iter_mut() {
                    if renumber || !item_ids.insert(item.id) {
                        item.id = ItemId(doc.allocate());
                        item_ids.insert(item.id);
                    }
                }
                if items.is_empty() {
                    items.push(ListItem::new(ItemId(doc.allocate()), InlineText::new(), 0));
                }
            }
            Self::fix_attributes(&mut block);
            doc.blocks.push(block);
        }
        if doc.blocks.is_empty() {
            let paragraph = doc.empty_paragraph();
            doc.blocks.push(paragraph);
        }
        doc
    }

    /// Parses a JSON array of blocks, see [`Document::load`].
    pub fn from_json(json: &str) -> Result<Self> {
        let blocks: Vec<Block> = serde_json::from_str(json)?;
        Ok(Self::load(blocks))
    }

    /// The current blocks, in order, for an external save.
    pub fn extract(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.blocks)?)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn first_id(&self) -> BlockId {
        self.blocks[0].id
    }

    pub fn last_id(&self) -> BlockId {
        self.blocks[self.blocks.len() - 1].id
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn new_block_id(&mut self) -> BlockId {
        BlockId(self.allocate())
    }

    pub fn new_item_id(&mut self) -> ItemId {
        ItemId(self.allocate())
    }

    /// A fresh empty paragraph, not yet part of the sequence.
    pub fn empty_paragraph(&mut self) -> Block {
        Block::paragraph(self.new_block_id(), InlineText::new())
    }

    /// A fresh block of `kind` with that kind's default content.
    pub fn new_block(&mut self, kind: BlockKind, config: &EditorConfig) -> Block {
        let id = self.new_block_id();
        let content = self.default_content(kind, config);
        Block {
            id,
            kind,
            content,
            text_align: None,
            heading_level: (kind == BlockKind::Heading).then_some(config.default_heading_level),
        }
    }

    fn default_content(&mut self, kind: BlockKind, config: &EditorConfig) -> BlockContent {
        match kind {
            BlockKind::Paragraph | BlockKind::Heading | BlockKind::Quote => {
                BlockContent::Text(InlineText::new())
            }
            BlockKind::UnorderedList | BlockKind::OrderedList | BlockKind::Checklist => {
                BlockContent::List(vec![ListItem::new(self.new_item_id(), InlineText::new(), 0)])
            }
            BlockKind::Delimiter => BlockContent::Delimiter(config.default_delimiter.clone()),
            BlockKind::Media => BlockContent::Media(None),
            BlockKind::Table => {
                BlockContent::Table(TableContent::empty(config.table_rows, config.table_cols))
            }
        }
    }

    fn fix_attributes(block: &mut Block) {
        if block.kind == BlockKind::Heading {
            block.heading_level.get_or_insert_with(HeadingLevel::default);
        } else {
            block.heading_level = None;
        }
        if !block.kind.is_text_bearing() {
            block.text_align = None;
        }
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EditorError::NotFound(id))
    }

    fn index_of(&self, id: BlockId) -> Result<usize> {
        self.position(id).ok_or(EditorError::NotFound(id))
    }

    /// Inserts `block` right after `after`.
    ///
    /// The block and its list items always receive fresh ids, so an id that
    /// was removed earlier never comes back. Returns the block's new id.
    pub fn insert_after(&mut self, after: BlockId, mut block: Block) -> Result<BlockId> {
        let index = self.index_of(after)?;
        block.id = self.new_block_id();
        self.refresh_item_ids(&mut block.content);
        Ok(self.place(index + 1, block))
    }

    fn refresh_item_ids(&mut self, content: &mut BlockContent) {
        if let Some(items) = content.as_items_mut() {
            for item in items.iter_mut() {
                item.id = self.new_item_id();
            }
            if items.is_empty() {
                items.push(ListItem::new(self.new_item_id(), InlineText::new(), 0));
            }
        }
    }

    fn place(&mut self, index: usize, mut block: Block) -> BlockId {
        Self::fix_attributes(&mut block);
        let id = block.id;
        debug!("insert {:?} {} at {}", block.kind, id, index);
        self.blocks.insert(index, block);
        id
    }

    /// Removes a block and returns the block that should receive focus.
    ///
    /// Focus goes to the predecessor, or to the successor when the first
    /// block was removed. Removing the only block replaces it with a fresh
    /// empty paragraph, which is then the focus target.
    pub fn remove_block(&mut self, id: BlockId) -> Result<BlockId> {
        let index = self.index_of(id)?;
        if self.blocks.len() == 1 {
            let paragraph = self.empty_paragraph();
            let replacement = paragraph.id;
            self.blocks[0] = paragraph;
            debug!("removed last block {}, replaced by {}", id, replacement);
            return Ok(replacement);
        }
        self.blocks.remove(index);
        let focus = if index > 0 {
            self.blocks[index - 1].id
        } else {
            self.blocks[0].id
        };
        debug!("removed {}, focus {}", id, focus);
        Ok(focus)
    }

    /// Replaces a block's payload in place. Kind and id are unchanged.
    ///
    /// List items keep their ids only when the block already holds them;
    /// any other item id is replaced with a fresh one.
    pub fn update_content(&mut self, id: BlockId, mut content: BlockContent) -> Result<()> {
        let block = self.get(id).ok_or(EditorError::NotFound(id))?;
        let kind = block.kind;
        if !kind.accepts(&content) {
            return Err(EditorError::KindMismatch { block: id, kind });
        }
        let mut owned: HashSet<ItemId> = block
            .items()
            .unwrap_or_default()
            .iter()
            .map(|i| i.id)
            .collect();
        if let Some(items) = content.as_items_mut() {
            for item in items.iter_mut() {
                if !owned.remove(&item.id) {
                    item.id = self.new_item_id();
                }
            }
            if items.is_empty() {
                items.push(ListItem::new(self.new_item_id(), InlineText::new(), 0));
            }
        }
        self.block_mut(id)?.content = content;
        Ok(())
    }

    /// The adjacent block in sequence order, `None` at either end.
    pub fn move_focus_target(&self, id: BlockId, direction: Direction) -> Option<BlockId> {
        let index = self.position(id)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1)?,
            Direction::Down => index + 1,
        };
        self.blocks.get(target).map(|b| b.id)
    }

    /// Keeps `before` in the block and inserts a block of the same kind
    /// holding `after` right behind it. Returns the new block's id.
    pub fn split_at_cursor(
        &mut self,
        id: BlockId,
        before: BlockContent,
        after: BlockContent,
    ) -> Result<BlockId> {
        let block = self.get(id).ok_or(EditorError::NotFound(id))?;
        let (kind, text_align, heading_level) = (block.kind, block.text_align, block.heading_level);
        if !kind.accepts(&before) || !kind.accepts(&after) {
            return Err(EditorError::KindMismatch { block: id, kind });
        }
        self.update_content(id, before)?;
        let mut content = after;
        self.refresh_item_ids(&mut content);
        let continuation = Block {
            id: self.new_block_id(),
            kind,
            content,
            text_align,
            heading_level,
        };
        let index = self.index_of(id)?;
        Ok(self.place(index + 1, continuation))
    }

    /// Appends a block's text to the previous block and removes it.
    ///
    /// The previous block absorbs the text when it is text-bearing; a list
    /// absorbs it into its last item. Returns where the caret belongs (the
    /// join point), or `None` when nothing could be merged.
    pub fn merge_into_previous(&mut self, id: BlockId) -> Result<Option<Caret>> {
        let index = self.index_of(id)?;
        let Some(text) = self.blocks[index].text().cloned() else {
            return Ok(None);
        };
        let Some(prev) = index.checked_sub(1) else {
            return Ok(None);
        };
        let prev_block = &mut self.blocks[prev];
        let prev_id = prev_block.id;
        let caret = match &mut prev_block.content {
            BlockContent::Text(prev_text) => {
                let offset = prev_text.len();
                prev_text.append(text);
                Caret::new(prev_id, offset)
            }
            BlockContent::List(items) => {
                let Some(last) = items.last_mut() else {
                    return Ok(None);
                };
                let offset = last.content.len();
                last.content.append(text);
                Caret::in_item(prev_id, last.id, offset)
            }
            _ => return Ok(None),
        };
        self.blocks.remove(index);
        debug!("merged {} into {}", id, prev_id);
        Ok(Some(caret))
    }

    /// Changes a block's kind, carrying its content across where possible.
    pub fn convert_kind(&mut self, id: BlockId, kind: BlockKind, config: &EditorConfig) -> Result<()> {
        let index = self.index_of(id)?;
        let from = self.blocks[index].kind;
        if from == kind {
            return Ok(());
        }
        let content = std::mem::replace(
            &mut self.blocks[index].content,
            BlockContent::Media(None),
        );
        let content = match content {
            BlockContent::Text(text) if kind.is_text() => BlockContent::Text(text),
            BlockContent::Text(text) if kind.is_list() => {
                BlockContent::List(vec![ListItem::new(self.new_item_id(), text, 0)])
            }
            BlockContent::List(mut items) if kind.is_list() => {
                if kind == BlockKind::Checklist {
                    items.iter_mut().for_each(|i| i.checked = false);
                }
                BlockContent::List(items)
            }
            BlockContent::List(items) if kind.is_text() => {
                let mut joined = InlineText::new();
                for (n, item) in items.into_iter().enumerate() {
                    if n > 0 {
                        joined.append(InlineText::plain("\n"));
                    }
                    joined.append(item.content);
                }
                BlockContent::Text(joined)
            }
            _ => self.default_content(kind, config),
        };

        let block = &mut self.blocks[index];
        let level = block.heading_level.unwrap_or(config.default_heading_level);
        block.kind = kind;
        block.content = content;
        block.heading_level = (kind == BlockKind::Heading).then_some(level);
        Self::fix_attributes(block);
        debug!("converted {} from {:?} to {:?}", id, from, kind);
        Ok(())
    }

    /// Sets the alignment of a text-bearing block. Returns false for kinds
    /// that carry no alignment.
    pub fn set_text_align(&mut self, id: BlockId, align: Option<TextAlign>) -> Result<bool> {
        let block = self.block_mut(id)?;
        if !block.kind.is_text_bearing() {
            return Ok(false);
        }
        block.text_align = align;
        Ok(true)
    }

    /// Sets the level of a heading. Returns false for other kinds.
    pub fn set_heading_level(&mut self, id: BlockId, level: HeadingLevel) -> Result<bool> {
        let block = self.block_mut(id)?;
        if block.kind != BlockKind::Heading {
            return Ok(false);
        }
        block.heading_level = Some(level);
        Ok(true)
    }

    fn items_mut(&mut self, id: BlockId) -> Result<&mut Vec<ListItem>> {
        let block = self.block_mut(id)?;
        let kind = block.kind;
        block
            .content
            .as_items_mut()
            .ok_or(EditorError::KindMismatch { block: id, kind })
    }

    fn item_index(&self, block: BlockId, item: ItemId) -> Result<usize> {
        self.get(block)
            .ok_or(EditorError::NotFound(block))?
            .item_index(item)
            .ok_or(EditorError::ItemNotFound { block, item })
    }

    /// Inserts a new item after `item`, returning its id.
    pub fn insert_item_after(
        &mut self,
        block: BlockId,
        item: ItemId,
        content: InlineText,
        level: u32,
    ) -> Result<ItemId> {
        let index = self.item_index(block, item)?;
        let new_id = self.new_item_id();
        self.items_mut(block)?
            .insert(index + 1, ListItem::new(new_id, content, level));
        Ok(new_id)
    }

    /// Splits a list item at a grapheme offset; the tail moves into a new
    /// item at the same level, whose id is returned.
    pub fn split_item(&mut self, block: BlockId, item: ItemId, offset: usize) -> Result<ItemId> {
        let index = self.item_index(block, item)?;
        let items = self.items_mut(block)?;
        let (head, tail) = items[index].content.split_at(offset);
        let level = items[index].level;
        items[index].content = head;
        self.insert_item_after(block, item, tail, level)
    }

    /// Removes an item from a list that has other items and returns the
    /// item that should receive focus: the previous one, or the next one
    /// when the first item was removed. Returns `None` for a sole item,
    /// which is left in place.
    pub fn remove_item(&mut self, block: BlockId, item: ItemId) -> Result<Option<ItemId>> {
        let index = self.item_index(block, item)?;
        let items = self.items_mut(block)?;
        if items.len() <= 1 {
            return Ok(None);
        }
        items.remove(index);
        let focus = items[index.saturating_sub(1)].id;
        Ok(Some(focus))
    }

    /// Sets an item's indentation level.
    pub fn set_item_level(&mut self, block: BlockId, item: ItemId, level: u32) -> Result<()> {
        let index = self.item_index(block, item)?;
        self.items_mut(block)?[index].level = level;
        Ok(())
    }

    pub fn set_item_checked(&mut self, block: BlockId, item: ItemId, checked: bool) -> Result<()> {
        let index = self.item_index(block, item)?;
        self.items_mut(block)?[index].checked = checked;
        Ok(())
    }

    /// Replaces the text of a text block or a list item.
    pub fn set_text(&mut self, block: BlockId, item: Option<ItemId>, text: InlineText) -> Result<()> {
        match item {
            Some(item) => {
                let index = self.item_index(block, item)?;
                self.items_mut(block)?[index].set_content(text);
            }
            None => {
                let b = self.block_mut(block)?;
                let kind = b.kind;
                b.content
                    .as_text_mut()
                    .ok_or(EditorError::KindMismatch { block, kind })?
                    .set_content(text);
            }
        }
        Ok(())
    }
}
