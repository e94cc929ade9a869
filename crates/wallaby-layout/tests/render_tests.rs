//! Integration tests for the render walkers.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)

mod common;

use common::{container_with_span_text, event_log, BlockStub, StubEvent, TestResourceCache};
use wallaby_boxtree::style::{Color, Display, Float, Position, Visibility};
use wallaby_boxtree::BoxTree;
use wallaby_layout::display_list::{DisplayCommand, DisplayList};
use wallaby_layout::node::LayoutNode;
use wallaby_layout::stacking::StackingContextTree;
use wallaby_layout::values::{ConstraintHeight, ConstraintWidth, LayoutCursor, LayoutStrategy};
use wallaby_layout::{BlockFormattingContext, InlineLayout};

const RED: Color = Color {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

/// Helper: a span with padding/border/background wrapping wrapping text.
fn decorated_span_layout(visibility: Visibility) -> (InlineLayout, BoxTree, BlockFormattingContext) {
    let style = common::style_with(|s| {
        s.visibility = visibility;
        s.background_color = RED;
        s.padding.left = wallaby_boxtree::style::LengthOrPercent::Px(5.0);
        s.padding.right = wallaby_boxtree::style::LengthOrPercent::Px(7.0);
        s.border_width.left = 2.0;
        s.border_width.right = 3.0;
    });
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
    (layout, tree, fc)
}

/// An inline element split across lines renders its left edge only on the
/// opening fragment and its right edge only on the closing fragment.
#[test]
fn test_split_inline_edge_suppression() {
    let (layout, tree, fc) = decorated_span_layout(Visibility::Visible);
    assert!(layout.lines().len() >= 2, "span wraps across lines");

    let mut list = DisplayList::new();
    layout
        .render_layer_background(&tree, &fc, &mut list)
        .expect("background pass succeeds");

    // One background per fragment, one left border strip (opening
    // fragment), one right border strip (closing fragment).
    let fills: Vec<&DisplayCommand> = list.commands().iter().collect();
    let backgrounds = fills
        .iter()
        .filter(|c| matches!(c, DisplayCommand::FillRect { color, .. } if *color == RED))
        .count();
    assert_eq!(backgrounds, layout.lines().len(), "one background per fragment");

    let borders: Vec<(f32, f32)> = fills
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::FillRect { width, height, color, .. }
                if *color == Color::BLACK =>
            {
                Some((*width, *height))
            }
            _ => None,
        })
        .collect();
    assert_eq!(borders.len(), 2, "one left strip + one right strip: {borders:?}");
    assert!(
        borders.iter().any(|(w, _)| (*w - 2.0).abs() < 0.01),
        "left border on the opening fragment only"
    );
    assert!(
        borders.iter().any(|(w, _)| (*w - 3.0).abs() < 0.01),
        "right border on the closing fragment only"
    );
}

/// The inline pass draws every text fragment at its baseline.
#[test]
fn test_inline_pass_draws_text() {
    let (layout, tree, fc) = decorated_span_layout(Visibility::Visible);
    let mut list = DisplayList::new();
    layout
        .render_layer_inline(&tree, &TestResourceCache, &fc, &mut list)
        .expect("inline pass succeeds");

    let texts: Vec<(String, f32)> = list
        .commands()
        .iter()
        .filter_map(|c| match c {
            DisplayCommand::DrawText { text, y, .. } => Some((text.clone(), *y)),
            _ => None,
        })
        .collect();
    assert_eq!(texts.len(), layout.lines().len(), "one run per line");
    // Test font ascent is 8: first line baseline at y=8.
    assert!(
        (texts[0].1 - 8.0).abs() < 0.01,
        "text drawn at the baseline, y={}",
        texts[0].1
    );
}

/// 'visibility: hidden' suppresses painting but not layout.
#[test]
fn test_hidden_content_not_painted() {
    let (layout, tree, fc) = decorated_span_layout(Visibility::Hidden);
    assert!(!layout.lines().is_empty(), "hidden boxes still lay out");

    let mut list = DisplayList::new();
    layout
        .render_layer_background(&tree, &fc, &mut list)
        .expect("background pass succeeds");
    layout
        .render_layer_inline(&tree, &TestResourceCache, &fc, &mut list)
        .expect("inline pass succeeds");
    assert!(list.is_empty(), "nothing painted for hidden content");
}

/// Floats paint as their own mini stack: background, non-inline content,
/// nested floats, then inline content.
#[test]
fn test_float_layer_recurses_fully() {
    let mut tree = BoxTree::new();
    let container_style = common::style_with(|s| s.display = Display::Block);
    let container = tree.alloc_element(container_style.clone());

    let mut float_style = container_style.clone();
    float_style.float = Float::Left;
    let float_box = tree.alloc_element(float_style);
    tree.append_child(container, float_box);

    let mut text_style = container_style;
    text_style.display = Display::Inline;
    let run = tree.alloc_text("Hello", text_style);
    tree.append_child(container, run);

    let events = event_log();
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |id| {
            Some(Box::new(BlockStub::new(id, 50.0, 40.0, events.clone())) as Box<dyn LayoutNode>)
        },
    );
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("layout succeeds");

    events.borrow_mut().clear();
    let mut list = DisplayList::new();
    layout
        .render_layer_floats(&tree, &mut list)
        .expect("float pass succeeds");

    let rendered: Vec<StubEvent> = events.borrow().clone();
    assert_eq!(
        rendered,
        [
            StubEvent::Render("background"),
            StubEvent::Render("non_inline"),
            StubEvent::Render("floats"),
            StubEvent::Render("inline"),
        ],
        "a float paints its full layer sequence"
    );
}

/// Positioned descendants paint in the positioned pass, not the in-flow
/// passes.
#[test]
fn test_positioned_content_partition() {
    let mut tree = BoxTree::new();
    let container_style = common::style_with(|s| s.display = Display::Block);
    let container = tree.alloc_element(container_style.clone());

    let mut positioned_style = container_style.clone();
    positioned_style.display = Display::Block;
    positioned_style.position = Position::Absolute;
    let positioned = tree.alloc_element(positioned_style);
    tree.append_child(container, positioned);

    let mut text_style = container_style;
    text_style.display = Display::Inline;
    let run = tree.alloc_text("Hello", text_style);
    tree.append_child(container, run);

    let events = event_log();
    let stacking = StackingContextTree::with_root();
    let mut layout = InlineLayout::from_subtree(
        &tree,
        container,
        ConstraintWidth::fixed(200.0),
        ConstraintHeight::auto(),
        stacking.root(),
        &mut |id| {
            Some(Box::new(BlockStub::new(id, 50.0, 40.0, events.clone())) as Box<dyn LayoutNode>)
        },
    );
    let mut fc = BlockFormattingContext::new();
    let mut cursor = LayoutCursor::new(0.0, 0.0);
    layout
        .layout_content(&tree, &mut fc, &TestResourceCache, &mut cursor, LayoutStrategy::Normal)
        .expect("layout succeeds");

    events.borrow_mut().clear();
    let mut list = DisplayList::new();
    layout
        .render_layer_non_inline(&tree, &mut list)
        .expect("non-inline pass succeeds");
    layout
        .render_layer_floats(&tree, &mut list)
        .expect("float pass succeeds");
    assert!(
        events.borrow().is_empty(),
        "positioned box skipped by in-flow passes: {:?}",
        events.borrow()
    );

    layout
        .render_layer_positioned(&tree, &stacking, &mut list)
        .expect("positioned pass succeeds");
    let rendered: Vec<StubEvent> = events.borrow().clone();
    assert_eq!(
        rendered,
        [
            StubEvent::Render("background"),
            StubEvent::Render("non_inline"),
            StubEvent::Render("floats"),
            StubEvent::Render("inline"),
            StubEvent::Render("positioned"),
        ],
        "positioned box paints its layers in the positioned pass"
    );
}
