//! Integration tests for inline line construction.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! All tests use the deterministic test font: every glyph is 10px wide,
//! so "Hello" = 50, "world" = 50, "foo" = 30, and a space = 10.

mod common;

use common::{container_with_span_text, event_log, BlockStub, StubEvent, TestResourceCache};
use wallaby_boxtree::style::{ComputedValues, Display, TextIndent};
use wallaby_boxtree::{BoxNodeId, BoxTree};
use wallaby_layout::generated::GeneratedBoxId;
use wallaby_layout::geometry::{Rect, Size};
use wallaby_layout::node::LayoutNode;
use wallaby_layout::stacking::StackingContextTree;
use wallaby_layout::values::{ConstraintHeight, ConstraintWidth, LayoutCursor, LayoutStrategy};
use wallaby_layout::{BlockFormattingContext, InlineLayout};

/// Helper: lay out `text` inside a span inside a block container.
fn layout_text(
    text: &str,
    width: ConstraintWidth,
    height: ConstraintHeight,
    strategy: LayoutStrategy,
) -> (InlineLayout, BoxTree) {
    let (tree, container) = container_with_span_text(text, ComputedValues::default());
    let stacking = StackingContextTree::with_root();
    let mut layout =
        InlineLayout::from_subtree(&tree, container, width, height, stacking.root(), &mut |_| None);
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, strategy)
        .expect("layout succeeds");
    (layout, tree)
}

/// Helper: concatenate the text slices of one line's fragments.
fn line_text(layout: &InlineLayout, tree: &BoxTree, line: GeneratedBoxId) -> String {
    let arena = layout.arena();
    let mut out = String::new();
    let mut cur = Some(line);
    while let Some(id) = cur {
        let node = &arena[id];
        if let Some(text) = node.box_node.and_then(|b| tree.as_text(b)) {
            out.push_str(&text.processed_text[node.text_start..node.text_end]);
        }
        cur = arena.next_in_tree(id);
    }
    out
}

/// Helper: geometry snapshot of every fragment, for idempotence checks.
fn geometry_snapshot(layout: &InlineLayout) -> Vec<(f32, f32, f32, f32, usize, usize)> {
    let arena = layout.arena();
    let mut out = Vec::new();
    for &line in layout.lines() {
        let mut cur = Some(line);
        while let Some(id) = cur {
            let node = &arena[id];
            out.push((
                node.x,
                node.y,
                node.width,
                node.height,
                node.text_start,
                node.text_end,
            ));
            cur = arena.next_in_tree(id);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Width strategy scenarios
//
// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//
// "the shrink-to-fit width is: min(max(preferred minimum width, available
// width), preferred width)."
// ---------------------------------------------------------------------------

/// Content width 150 fits the 200px container on a single line.
#[test]
fn test_normal_strategy_single_line() {
    let (layout, tree) = layout_text(
        "Hello world foo",
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.lines().len(), 1, "150px of content fits in 200px");
    assert_eq!(line_text(&layout, &tree, layout.lines()[0]), "Hello world foo");
}

/// Under the minimum (min-content) strategy, only the first segment of
/// each line is kept: one word per line.
#[test]
fn test_minimum_strategy_one_word_per_line() {
    let (layout, tree) = layout_text(
        "Hello world foo",
        ConstraintWidth::expanding(),
        ConstraintHeight::auto(),
        LayoutStrategy::Minimum,
    );
    assert_eq!(layout.lines().len(), 3, "min-content wraps at every word");
    let words: Vec<String> = layout
        .lines()
        .iter()
        .map(|&l| line_text(&layout, &tree, l).trim_end().to_string())
        .collect();
    assert_eq!(words, ["Hello", "world", "foo"]);
    assert!(
        layout.width.value >= 50.0,
        "expanding width grew to the widest word, got {}",
        layout.width.value
    );
}

/// Under the preferred (max-content) strategy, segments never wrap.
#[test]
fn test_preferred_strategy_never_wraps() {
    let (layout, tree) = layout_text(
        "Hello world foo",
        ConstraintWidth::expanding(),
        ConstraintHeight::auto(),
        LayoutStrategy::Preferred,
    );
    assert_eq!(layout.lines().len(), 1, "max-content never wraps");
    assert_eq!(line_text(&layout, &tree, layout.lines()[0]), "Hello world foo");
    assert!(
        (layout.width.value - 150.0).abs() < 0.5,
        "preferred width is the full content width, got {}",
        layout.width.value
    );
}

/// Real wrapping under the normal strategy with a narrow container.
#[test]
fn test_normal_strategy_wraps_at_fixed_width() {
    let (layout, tree) = layout_text(
        "Hello world foo",
        ConstraintWidth::fixed(120.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.lines().len(), 2);
    assert_eq!(
        line_text(&layout, &tree, layout.lines()[0]).trim_end(),
        "Hello world"
    );
    assert_eq!(line_text(&layout, &tree, layout.lines()[1]), "foo");
}

/// The first segment of a line is kept even when it overflows: a line
/// always makes progress.
#[test]
fn test_overlong_first_segment_is_kept() {
    let (layout, tree) = layout_text(
        "incomprehensibilities",
        ConstraintWidth::fixed(50.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.lines().len(), 1, "no zero-progress lines");
    assert_eq!(
        line_text(&layout, &tree, layout.lines()[0]),
        "incomprehensibilities"
    );
}

// ---------------------------------------------------------------------------
// Hard breaks and blank content
//
// [§ 16.6.1](https://www.w3.org/TR/CSS2/text.html#white-space-model)
// "A line break is forced at a preserved newline."
// ---------------------------------------------------------------------------

/// A preserved newline always terminates the line that includes it.
#[test]
fn test_hard_newline_forces_break() {
    let (layout, tree) = layout_text(
        "one\ntwo",
        ConstraintWidth::fixed(1000.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.lines().len(), 2, "newline splits into two lines");
    assert_eq!(
        line_text(&layout, &tree, layout.lines()[0]).trim_end_matches('\n'),
        "one"
    );
    assert_eq!(line_text(&layout, &tree, layout.lines()[1]), "two");
}

/// An entirely-blank line of collapsible whitespace is suppressed.
#[test]
fn test_blank_content_produces_no_lines() {
    let (layout, _tree) = layout_text(
        "   ",
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert!(layout.lines().is_empty(), "collapsible whitespace only");
}

/// `is_empty` is true for whitespace-only content with a content-driven
/// height, and false once the container has an explicit nonzero height.
#[test]
fn test_is_empty_depends_on_height_constraint() {
    let (layout, tree) = layout_text(
        "   ",
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert!(layout.is_empty(&tree));

    let (layout, tree) = layout_text(
        "   ",
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::fixed(50.0),
        LayoutStrategy::Normal,
    );
    assert!(!layout.is_empty(&tree), "explicit height keeps the box");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

/// Two layout passes with identical constraints produce identical line
/// geometry.
#[test]
fn test_layout_is_idempotent() {
    let (tree, container) = container_with_span_text("Hello world foo", ComputedValues::default());
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(120.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |_| None,
    );

    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("first pass succeeds");
    let first = geometry_snapshot(&layout);

    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("second pass succeeds");
    let second = geometry_snapshot(&layout);

    assert_eq!(first, second, "identical inputs give identical geometry");
}

// ---------------------------------------------------------------------------
// text-indent
//
// [§ 16.1](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
// "This property specifies the indentation of the first line of text in
// a block container."
// ---------------------------------------------------------------------------

/// The indent applies to the first line only.
#[test]
fn test_text_indent_first_line_only() {
    let style = common::style_with(|s| s.text_indent = TextIndent::Length(20.0));
    let (tree, container) = container_with_span_text("Hello world foo", style);
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(120.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |_| None,
    );
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("layout succeeds");

    assert!(layout.lines().len() >= 2, "content wraps");
    let arena = layout.arena();
    let first_line = layout.lines()[0];
    let second_line = layout.lines()[1];
    let first_fragment = arena[first_line].first_child.expect("line has fragments");
    let second_fragment = arena[second_line].first_child.expect("line has fragments");
    assert!(
        (arena[first_fragment].x - 20.0).abs() < 0.01,
        "first line starts at the indent, got {}",
        arena[first_fragment].x
    );
    assert!(
        arena[second_fragment].x.abs() < 0.01,
        "later lines are not indented, got {}",
        arena[second_fragment].x
    );
}

// ---------------------------------------------------------------------------
// Baseline queries
// ---------------------------------------------------------------------------

/// First/last baselines derive from the line position plus ascent.
#[test]
fn test_line_baselines() {
    let (layout, _tree) = layout_text(
        "Hello world foo",
        ConstraintWidth::fixed(120.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.lines().len(), 2);
    // Test font ascent is 8; line height 10.
    let first = layout.first_line_baseline().expect("first baseline exists");
    let last = layout.last_line_baseline().expect("last baseline exists");
    assert!((first - 8.0).abs() < 0.01, "first baseline at {first}");
    assert!((last - 18.0).abs() < 0.01, "last baseline at {last}");
}

/// No lines, no baselines.
#[test]
fn test_baselines_without_lines() {
    let (layout, _tree) = layout_text(
        "   ",
        ConstraintWidth::fixed(120.0),
        ConstraintHeight::auto(),
        LayoutStrategy::Normal,
    );
    assert_eq!(layout.first_line_baseline(), None);
    assert_eq!(layout.last_line_baseline(), None);
}

// ---------------------------------------------------------------------------
// Block-level interruptions
//
// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
// "When an inline box contains an in-flow block-level box, the inline box
// ... is broken around the block-level box."
// ---------------------------------------------------------------------------

/// Build a container with text, a nested block-level box, then more text.
fn container_with_block_interruption(
    block_style: ComputedValues,
) -> (BoxTree, BoxNodeId, BoxNodeId) {
    let mut tree = BoxTree::new();
    let container_style = common::style_with(|s| s.display = Display::Block);
    let container = tree.alloc_element(container_style.clone());

    let mut text_style = container_style.clone();
    text_style.display = Display::Inline;
    let before = tree.alloc_text("aa", text_style.clone());
    tree.append_child(container, before);

    let mut block_style = block_style;
    block_style.display = Display::Block;
    let block = tree.alloc_element(block_style);
    tree.append_child(container, block);

    let after = tree.alloc_text("bb", text_style);
    tree.append_child(container, after);

    (tree, container, block)
}

/// A block-level box interrupts line construction with a block line of
/// its own, laid out in the normal flow.
#[test]
fn test_block_level_box_interrupts_lines() {
    let (tree, container, _block) = container_with_block_interruption(ComputedValues::default());
    let events = event_log();
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |id| {
            Some(Box::new(BlockStub::new(id, 100.0, 30.0, events.clone())) as Box<dyn LayoutNode>)
        },
    );
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("layout succeeds");

    assert_eq!(layout.lines().len(), 3, "text, block line, text");
    assert!(!layout.is_block_line(layout.lines()[0]));
    assert!(layout.is_block_line(layout.lines()[1]));
    assert!(!layout.is_block_line(layout.lines()[2]));
    assert!(
        events.borrow().contains(&StubEvent::LayoutNormal),
        "in-flow block was laid out in the normal flow"
    );
    // Line 1 spans [0, 10), the block [10, 40), line 3 starts at 40.
    assert!(
        (cursor.y - 50.0).abs() < 0.01,
        "cursor advanced past both lines and the block, got {}",
        cursor.y
    );
}

/// Absolute content at a block boundary is not laid out during line
/// construction: only its static position is recorded, and the deferred
/// pass lays it out later.
#[test]
fn test_absolute_content_is_deferred() {
    let abs_style = common::style_with(|s| s.position = wallaby_boxtree::style::Position::Absolute);
    let (tree, container, _block) = container_with_block_interruption(abs_style);
    let events = event_log();
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |id| {
            Some(Box::new(BlockStub::new(id, 100.0, 30.0, events.clone())) as Box<dyn LayoutNode>)
        },
    );
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("layout succeeds");

    assert_eq!(layout.lines().len(), 2, "the absolute box produces no line");
    {
        let log = events.borrow();
        assert!(
            log.iter()
                .any(|e| matches!(e, StubEvent::StaticPosition(_))),
            "static position was recorded"
        );
        assert!(
            !log.contains(&StubEvent::AbsoluteLayout),
            "absolute layout is deferred past line construction"
        );
        assert!(
            !log.contains(&StubEvent::LayoutNormal),
            "absolute content does not join the normal flow"
        );
    }

    layout
        .layout_absolute_and_fixed_content(
            &tree,
            &TestResourceCache,
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Size::new(800.0, 600.0),
        )
        .expect("deferred pass succeeds");
    assert!(
        events.borrow().contains(&StubEvent::AbsoluteLayout),
        "deferred pass laid the absolute box out"
    );
}
