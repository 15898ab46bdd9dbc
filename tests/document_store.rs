use std::collections::HashSet;

use block_editor::{
    Block, BlockContent, BlockId, BlockKind, Direction, Document, EditorConfig, EditorError,
    HeadingLevel, InlineText, ItemId, ListItem,
};

fn text_of(doc: &Document, id: BlockId) -> String {
    doc.get(id)
        .and_then(|b| b.text())
        .map(|t| t.text().to_string())
        .unwrap_or_default()
}

fn paragraphs(texts: &[&str]) -> Document {
    let blocks = texts
        .iter()
        .enumerate()
        .map(|(n, t)| Block::paragraph(BlockId(n as u64 + 1), InlineText::plain(*t)))
        .collect();
    Document::load(blocks)
}

#[test]
fn new_document_holds_one_empty_paragraph() {
    let doc = Document::new();
    assert_eq!(doc.len(), 1);
    let block = &doc.blocks()[0];
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(block.text().map(|t| t.text()), Some(""));
}

#[test]
fn removing_the_last_block_leaves_a_fresh_paragraph() {
    let mut doc = paragraphs(&["only"]);
    let old = doc.first_id();

    let focus = doc.remove_block(old).unwrap();

    assert_eq!(doc.len(), 1);
    assert_ne!(focus, old);
    assert_eq!(doc.first_id(), focus);
    assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
    assert_eq!(text_of(&doc, focus), "");
}

#[test]
fn remove_returns_predecessor_or_successor() {
    let mut doc = paragraphs(&["a", "b", "c"]);

    // middle block: focus the predecessor
    assert_eq!(doc.remove_block(BlockId(2)).unwrap(), BlockId(1));
    // first block: no predecessor, focus the successor
    assert_eq!(doc.remove_block(BlockId(1)).unwrap(), BlockId(3));
    assert_eq!(doc.len(), 1);
}

#[test]
fn repeated_removal_never_empties_the_document() {
    let mut doc = paragraphs(&["a", "b", "c", "d"]);
    for _ in 0..10 {
        let id = doc.last_id();
        doc.remove_block(id).unwrap();
        assert!(doc.len() >= 1);
    }
    assert_eq!(doc.len(), 1);
    assert_eq!(text_of(&doc, doc.first_id()), "");
}

#[test]
fn stale_ids_report_not_found() {
    let mut doc = paragraphs(&["a"]);
    let missing = BlockId(999);

    let new_block = doc.empty_paragraph();
    assert!(matches!(
        doc.insert_after(missing, new_block),
        Err(EditorError::NotFound(id)) if id == missing
    ));
    assert!(matches!(doc.remove_block(missing), Err(EditorError::NotFound(_))));
    assert!(matches!(
        doc.update_content(missing, BlockContent::Text(InlineText::new())),
        Err(EditorError::NotFound(_))
    ));
    assert_eq!(doc.move_focus_target(missing, Direction::Down), None);
    assert_eq!(doc.len(), 1);
}

#[test]
fn insert_after_places_block_directly_behind() {
    let mut doc = paragraphs(&["a", "c"]);
    let b = Block::paragraph(doc.new_block_id(), InlineText::plain("b"));

    let id = doc.insert_after(BlockId(1), b).unwrap();

    let texts: Vec<String> = doc.iter().map(|b| text_of(&doc, b.id)).collect();
    assert_eq!(texts, ["a", "b", "c"]);
    assert_eq!(doc.position(id), Some(1));
}

#[test]
fn insert_after_refreshes_taken_ids() {
    let mut doc = paragraphs(&["a", "b"]);
    let clash = Block::paragraph(BlockId(2), InlineText::plain("clash"));

    let id = doc.insert_after(BlockId(1), clash).unwrap();

    assert_ne!(id, BlockId(2));
    assert_eq!(doc.len(), 3);
    assert_eq!(text_of(&doc, id), "clash");
    assert_eq!(text_of(&doc, BlockId(2)), "b");
}

#[test]
fn update_content_keeps_kind_and_id() {
    let mut doc = paragraphs(&["old"]);
    doc.update_content(BlockId(1), BlockContent::Text(InlineText::plain("new")))
        .unwrap();

    let block = doc.get(BlockId(1)).unwrap();
    assert_eq!(block.kind, BlockKind::Paragraph);
    assert_eq!(text_of(&doc, BlockId(1)), "new");
}

#[test]
fn update_content_rejects_payload_of_another_kind() {
    let mut doc = paragraphs(&["text"]);
    let err = doc
        .update_content(BlockId(1), BlockContent::Media(None))
        .unwrap_err();
    assert!(matches!(err, EditorError::KindMismatch { kind: BlockKind::Paragraph, .. }));
    assert_eq!(text_of(&doc, BlockId(1)), "text");
}

#[test]
fn move_focus_target_stops_at_boundaries() {
    let doc = paragraphs(&["a", "b", "c"]);
    assert_eq!(doc.move_focus_target(BlockId(1), Direction::Up), None);
    assert_eq!(doc.move_focus_target(BlockId(1), Direction::Down), Some(BlockId(2)));
    assert_eq!(doc.move_focus_target(BlockId(2), Direction::Up), Some(BlockId(1)));
    assert_eq!(doc.move_focus_target(BlockId(3), Direction::Down), None);
}

#[test]
fn split_and_merge_round_trip() {
    let mut doc = paragraphs(&["Hello World"]);
    let (before, after) = InlineText::plain("Hello World").split_at(5);

    let second = doc
        .split_at_cursor(BlockId(1), BlockContent::Text(before), BlockContent::Text(after))
        .unwrap();

    assert_eq!(doc.len(), 2);
    assert_eq!(text_of(&doc, BlockId(1)), "Hello");
    assert_eq!(text_of(&doc, second), " World");
    assert_eq!(doc.get(second).unwrap().kind, BlockKind::Paragraph);

    let caret = doc.merge_into_previous(second).unwrap().unwrap();
    assert_eq!(caret.block, BlockId(1));
    assert_eq!(caret.offset, 5);
    assert_eq!(doc.len(), 1);
    assert_eq!(text_of(&doc, BlockId(1)), "Hello World");
}

#[test]
fn split_keeps_kind_and_heading_level() {
    let config = EditorConfig::default();
    let mut doc = paragraphs(&["Title"]);
    doc.convert_kind(BlockId(1), BlockKind::Heading, &config).unwrap();

    let id = doc
        .split_at_cursor(
            BlockId(1),
            BlockContent::Text(InlineText::plain("Ti")),
            BlockContent::Text(InlineText::plain("tle")),
        )
        .unwrap();

    let block = doc.get(id).unwrap();
    assert_eq!(block.kind, BlockKind::Heading);
    assert_eq!(block.heading_level, doc.get(BlockId(1)).unwrap().heading_level);
}

#[test]
fn merge_into_a_list_appends_to_its_last_item() {
    let list = Block::list(
        BlockId(1),
        BlockKind::UnorderedList,
        vec![
            ListItem::new(ItemId(10), InlineText::plain("one"), 0),
            ListItem::new(ItemId(11), InlineText::plain("two"), 1),
        ],
    );
    let para = Block::paragraph(BlockId(2), InlineText::plain("!"));
    let mut doc = Document::load(vec![list, para]);

    let caret = doc.merge_into_previous(BlockId(2)).unwrap().unwrap();

    assert_eq!(caret.item, Some(ItemId(11)));
    assert_eq!(caret.offset, 3);
    let items = doc.get(BlockId(1)).unwrap().items().unwrap();
    assert_eq!(items[1].content.text(), "two!");
    assert_eq!(doc.len(), 1);
}

#[test]
fn merge_does_nothing_without_a_text_predecessor() {
    let config = EditorConfig::default();
    let mut doc = paragraphs(&["a"]);
    let delimiter = doc.new_block(BlockKind::Delimiter, &config);
    let delimiter = doc.insert_after(BlockId(1), delimiter).unwrap();
    let para = Block::paragraph(doc.new_block_id(), InlineText::plain("b"));
    let para = doc.insert_after(delimiter, para).unwrap();

    assert_eq!(doc.merge_into_previous(para).unwrap(), None);
    assert_eq!(doc.merge_into_previous(BlockId(1)).unwrap(), None);
    assert_eq!(doc.len(), 3);
}

#[test]
fn fresh_ids_are_never_reused() {
    let mut doc = paragraphs(&["a", "b"]);
    let mut seen: Vec<u64> = doc.iter().map(|b| b.id.0).collect();

    for _ in 0..5 {
        let last = doc.last_id();
        doc.remove_block(last).unwrap();
        let block = doc.empty_paragraph();
        let first = doc.first_id();
        let id = doc.insert_after(first, block).unwrap();
        assert!(!seen.contains(&id.0), "{id} handed out twice");
        seen.push(id.0);
    }
}

#[test]
fn load_repairs_duplicate_ids() {
    let doc = Document::load(vec![
        Block::paragraph(BlockId(4), InlineText::plain("a")),
        Block::paragraph(BlockId(4), InlineText::plain("b")),
    ]);
    let ids: Vec<BlockId> = doc.iter().map(|b| b.id).collect();
    assert_eq!(ids[0], BlockId(4));
    assert_ne!(ids[1], BlockId(4));
    // fresh ids start above everything loaded
    assert!(ids[1].0 > 4);
}

#[test]
fn load_of_nothing_synthesizes_a_paragraph() {
    let doc = Document::load(Vec::new());
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
}

#[test]
fn json_extract_and_reload() {
    let json = r##"[
        {"id": 1, "kind": "heading", "headingLevel": 3, "content": {"text": "<b>Hi</b> there"}},
        {"id": 2, "kind": "checklist", "content": {"list": [
            {"id": 5, "content": "milk", "level": 0, "checked": true},
            {"id": 6, "content": "eggs", "level": 1}
        ]}},
        {"id": 3, "kind": "delimiter", "content": {"delimiter":
            {"color": "#ff0000", "lineStyle": "dashed", "dashLength": 8, "thickness": 2}}},
        {"id": 4, "kind": "paragraph", "textAlign": "center", "content": {"text": "end"}}
    ]"##;

    let doc = Document::from_json(json).unwrap();
    assert_eq!(doc.len(), 4);
    let heading = doc.get(BlockId(1)).unwrap();
    assert_eq!(heading.heading_level.map(|l| l.get()), Some(3));
    assert_eq!(heading.text().unwrap().text(), "Hi there");
    let items = doc.get(BlockId(2)).unwrap().items().unwrap();
    assert!(items[0].checked);
    assert!(!items[1].checked);
    assert_eq!(items[1].level, 1);

    let reloaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(reloaded.extract(), doc.extract());

    // the allocator starts above every loaded id, items included
    let mut doc = doc;
    assert!(doc.new_block_id().0 > 6);
}

#[test]
fn invalid_heading_level_is_rejected_on_load() {
    let json = r#"[{"id": 1, "kind": "heading", "headingLevel": 1, "content": {"text": "x"}}]"#;
    assert!(matches!(Document::from_json(json), Err(EditorError::Json(_))));
}

#[test]
fn converting_between_text_and_list_kinds() {
    let config = EditorConfig::default();
    let mut doc = paragraphs(&["first"]);

    doc.convert_kind(BlockId(1), BlockKind::OrderedList, &config).unwrap();
    let block = doc.get(BlockId(1)).unwrap();
    assert_eq!(block.kind, BlockKind::OrderedList);
    let item = block.items().unwrap()[0].id;
    assert_eq!(block.items().unwrap()[0].content.text(), "first");

    doc.insert_item_after(BlockId(1), item, InlineText::plain("second"), 0)
        .unwrap();
    doc.convert_kind(BlockId(1), BlockKind::Quote, &config).unwrap();
    let block = doc.get(BlockId(1)).unwrap();
    assert_eq!(block.kind, BlockKind::Quote);
    assert_eq!(block.text().unwrap().text(), "first\nsecond");
}

#[test]
fn heading_level_follows_the_kind() {
    let config = EditorConfig::default();
    let mut doc = paragraphs(&["x"]);

    doc.convert_kind(BlockId(1), BlockKind::Heading, &config).unwrap();
    assert_eq!(doc.get(BlockId(1)).unwrap().heading_level, Some(config.default_heading_level));

    doc.convert_kind(BlockId(1), BlockKind::Paragraph, &config).unwrap();
    assert_eq!(doc.get(BlockId(1)).unwrap().heading_level, None);
}

#[test]
fn heading_level_only_applies_to_headings() {
    let config = EditorConfig::default();
    let mut doc = paragraphs(&["x", "y"]);
    let level = HeadingLevel::new(4).unwrap();

    assert!(!doc.set_heading_level(BlockId(1), level).unwrap());
    assert_eq!(doc.get(BlockId(1)).unwrap().heading_level, None);

    doc.convert_kind(BlockId(2), BlockKind::Heading, &config).unwrap();
    assert!(doc.set_heading_level(BlockId(2), level).unwrap());
    assert_eq!(doc.get(BlockId(2)).unwrap().heading_level, Some(level));

    assert!(doc.set_heading_level(BlockId(9), level).unwrap_err().is_stale());
}

#[test]
fn list_item_operations() {
    let config = EditorConfig::default();
    let mut doc = Document::new();
    let first = doc.first_id();
    doc.convert_kind(first, BlockKind::Checklist, &config).unwrap();
    let a = doc.get(first).unwrap().items().unwrap()[0].id;

    let b = doc
        .insert_item_after(first, a, InlineText::plain("b"), 0)
        .unwrap();
    doc.set_item_level(first, b, 2).unwrap();
    doc.set_item_checked(first, b, true).unwrap();

    let item = doc.get(first).unwrap().item(b).unwrap();
    assert_eq!(item.level, 2);
    assert!(item.checked);

    // removing the first item focuses the next one
    assert_eq!(doc.remove_item(first, a).unwrap(), Some(b));
    // a sole item stays put
    assert_eq!(doc.remove_item(first, b).unwrap(), None);
    assert_eq!(doc.get(first).unwrap().items().unwrap().len(), 1);

    assert!(matches!(
        doc.set_item_level(first, ItemId(12345), 1),
        Err(EditorError::ItemNotFound { .. })
    ));
}

fn all_ids(doc: &Document) -> Vec<u64> {
    doc.iter()
        .flat_map(|b| {
            let items = b.items().unwrap_or_default().iter().map(|i| i.id.0);
            std::iter::once(b.id.0).chain(items)
        })
        .collect()
}

fn assert_unique(doc: &Document) {
    let ids = all_ids(doc);
    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {ids:?}");
}

#[test]
fn removed_ids_are_not_brought_back_by_insert() {
    let mut doc = paragraphs(&["a", "b", "c"]);
    doc.remove_block(BlockId(2)).unwrap();

    let id = doc
        .insert_after(BlockId(1), Block::paragraph(BlockId(2), InlineText::plain("again")))
        .unwrap();

    assert_ne!(id, BlockId(2));
    assert!(doc.get(BlockId(2)).is_none());
    assert!(!doc.is_empty());
    assert_eq!(text_of(&doc, id), "again");
}

#[test]
fn ids_ahead_of_the_allocator_are_not_trusted() {
    let mut doc = paragraphs(&["a"]);
    let id = doc
        .insert_after(BlockId(1), Block::paragraph(BlockId(1000), InlineText::plain("far")))
        .unwrap();

    assert_ne!(id, BlockId(1000));
    let next = doc.new_block_id();
    assert_ne!(next, id);
    assert!(doc.get(next).is_none());
}

#[test]
fn inserted_list_items_get_distinct_ids() {
    let config = EditorConfig::default();
    let mut doc = Document::new();
    let first = doc.first_id();
    doc.convert_kind(first, BlockKind::Checklist, &config).unwrap();
    let taken = doc.get(first).unwrap().items().unwrap()[0].id;

    let list = Block::list(
        BlockId(0),
        BlockKind::UnorderedList,
        vec![
            ListItem::new(taken, InlineText::plain("x"), 0),
            ListItem::new(ItemId(0), InlineText::plain("y"), 0),
            ListItem::new(ItemId(0), InlineText::plain("z"), 1),
        ],
    );
    let id = doc.insert_after(first, list).unwrap();

    let items = doc.get(id).unwrap().items().unwrap();
    let texts: Vec<&str> = items.iter().map(|i| i.content.text()).collect();
    assert_eq!(texts, ["x", "y", "z"]);
    assert!(items.iter().all(|i| i.id != taken));
    assert_unique(&doc);

    // each item is addressable on its own
    let (first_item, second) = (items[0].id, items[1].id);
    assert_eq!(doc.remove_item(id, second).unwrap(), Some(first_item));
    assert_eq!(doc.get(id).unwrap().items().unwrap().len(), 2);
}

#[test]
fn split_refreshes_foreign_item_ids() {
    let mut doc = Document::load(vec![Block::list(
        BlockId(1),
        BlockKind::OrderedList,
        vec![
            ListItem::new(ItemId(10), InlineText::plain("a"), 0),
            ListItem::new(ItemId(11), InlineText::plain("b"), 0),
        ],
    )]);

    let before = BlockContent::List(vec![
        ListItem::new(ItemId(10), InlineText::plain("a"), 0),
        ListItem::new(ItemId(99), InlineText::plain("stray"), 0),
    ]);
    let after = BlockContent::List(vec![
        ListItem::new(ItemId(11), InlineText::plain("b"), 0),
        ListItem::new(ItemId(10), InlineText::plain("copy"), 0),
    ]);
    let second = doc.split_at_cursor(BlockId(1), before, after).unwrap();

    let kept: Vec<ItemId> = doc
        .get(BlockId(1))
        .unwrap()
        .items()
        .unwrap()
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(kept[0], ItemId(10));
    assert_ne!(kept[1], ItemId(99));
    let moved = doc.get(second).unwrap().items().unwrap();
    assert!(moved.iter().all(|i| i.id != ItemId(10) && i.id != ItemId(11)));
    assert_unique(&doc);
}

#[test]
fn update_content_keeps_only_owned_item_ids() {
    let mut doc = Document::load(vec![
        Block::list(
            BlockId(1),
            BlockKind::UnorderedList,
            vec![ListItem::new(ItemId(10), InlineText::plain("a"), 0)],
        ),
        Block::list(
            BlockId(2),
            BlockKind::UnorderedList,
            vec![ListItem::new(ItemId(20), InlineText::plain("b"), 0)],
        ),
    ]);

    doc.update_content(
        BlockId(1),
        BlockContent::List(vec![
            ListItem::new(ItemId(10), InlineText::plain("a"), 0),
            ListItem::new(ItemId(10), InlineText::plain("dup"), 0),
            ListItem::new(ItemId(20), InlineText::plain("stolen"), 0),
        ]),
    )
    .unwrap();

    let items = doc.get(BlockId(1)).unwrap().items().unwrap();
    assert_eq!(items[0].id, ItemId(10));
    assert!(items[1..].iter().all(|i| i.id != ItemId(10) && i.id != ItemId(20)));
    assert_unique(&doc);
}

#[test]
fn load_renumbers_ids_near_the_top_of_the_range() {
    let mut doc = Document::load(vec![
        Block::paragraph(BlockId(u64::MAX), InlineText::plain("a")),
        Block::list(
            BlockId(u64::MAX - 1),
            BlockKind::Checklist,
            vec![
                ListItem::new(ItemId(u64::MAX), InlineText::plain("x"), 0),
                ListItem::new(ItemId(7), InlineText::plain("y"), 0),
            ],
        ),
    ]);

    assert_unique(&doc);
    assert!(all_ids(&doc).iter().all(|&id| id < u64::MAX / 2));
    let texts: Vec<String> = doc.iter().map(|b| text_of(&doc, b.id)).collect();
    assert_eq!(texts, ["a", ""]);

    let paragraph = doc.empty_paragraph();
    let fresh = doc.new_item_id();
    assert!(!all_ids(&doc).contains(&paragraph.id.0));
    assert!(!all_ids(&doc).contains(&fresh.0));
    assert_ne!(paragraph.id.0, fresh.0);
}

#[test]
fn load_keeps_ids_below_the_ceiling() {
    let mut doc = Document::load(vec![Block::paragraph(BlockId(u64::MAX / 2), InlineText::plain("a"))]);
    assert_eq!(doc.first_id(), BlockId(u64::MAX / 2));
    assert_eq!(doc.new_block_id(), BlockId(u64::MAX / 2 + 1));
}
