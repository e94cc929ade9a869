//! Shared helpers for the layout integration tests: a deterministic test
//! font (every glyph 10px wide, ascent 8 / descent 2) and a recording
//! stub for nested layout nodes.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use wallaby_boxtree::style::ComputedValues;
use wallaby_boxtree::{BoxNodeId, BoxTree};
use wallaby_common::WallabyError;
use wallaby_layout::display_list::DisplayList;
use wallaby_layout::fonts::{Font, FontMetrics, ResourceCache};
use wallaby_layout::geometry::{Rect, Size};
use wallaby_layout::node::LayoutNode;
use wallaby_layout::stacking::StackingContextId;
use wallaby_layout::values::{ConstraintWidth, LayoutCursor, LayoutStrategy};

/// A font where every glyph advances exactly 10px, newlines advance 0,
/// and the ascent/descent are 8/2. Keeps expected widths trivially
/// computable in tests ("Hello" = 50, a space = 10).
pub struct TestFont;

impl Font for TestFont {
    fn text_size(&self, text: &str) -> Size {
        let glyphs = text.chars().filter(|&c| c != '\n').count();
        Size::new(glyphs as f32 * 10.0, 10.0)
    }

    fn font_metrics(&self) -> FontMetrics {
        FontMetrics {
            ascent: 8.0,
            descent: 2.0,
        }
    }
}

/// Resource cache that always resolves [`TestFont`].
#[derive(Default)]
pub struct TestResourceCache;

impl ResourceCache for TestResourceCache {
    fn get_font(&self, _style: &ComputedValues) -> Result<Box<dyn Font + '_>, WallabyError> {
        Ok(Box::new(TestFont))
    }
}

/// Observable calls made against a [`BlockStub`].
#[derive(Debug, Clone, PartialEq)]
pub enum StubEvent {
    /// `layout_float` ran under the given strategy.
    LayoutFloat(LayoutStrategy),
    /// `layout_normal` ran.
    LayoutNormal,
    /// `layout_formatting_root` ran.
    LayoutFormattingRoot,
    /// The final block position was recorded.
    RootPosition(f32, f32),
    /// A static position was recorded for deferred abs/fixed layout.
    StaticPosition(Rect),
    /// The deferred absolute/fixed layout ran.
    AbsoluteLayout,
    /// A render layer hook ran.
    Render(&'static str),
}

/// Shared event log handed to every stub a test creates.
pub type EventLog = Rc<RefCell<Vec<StubEvent>>>;

/// Create an empty event log.
pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A fixed-size stand-in for a nested block/atomic formatting context.
/// Records every call into the shared event log.
pub struct BlockStub {
    /// The box node the stub stands in for.
    pub box_node: BoxNodeId,
    /// Fixed margin-box width.
    pub width: f32,
    /// Fixed margin-box height.
    pub height: f32,
    /// Reported by `is_replaced`.
    pub replaced: bool,
    /// Reported by `is_empty`.
    pub empty: bool,
    /// Reported by the baseline queries.
    pub first_baseline: Option<f32>,
    /// Reported by `stacking_context`.
    pub stacking: StackingContextId,
    /// Shared log of every call made against this stub.
    pub events: EventLog,
}

impl BlockStub {
    /// A stub of the given size logging into `events`.
    pub fn new(box_node: BoxNodeId, width: f32, height: f32, events: EventLog) -> Self {
        Self {
            box_node,
            width,
            height,
            replaced: false,
            empty: false,
            first_baseline: None,
            stacking: StackingContextId(0),
            events,
        }
    }

    fn log(&self, event: StubEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl LayoutNode for BlockStub {
    fn box_node(&self) -> BoxNodeId {
        self.box_node
    }

    fn block_width(&self) -> f32 {
        self.width
    }

    fn block_height(&self) -> f32 {
        self.height
    }

    fn layout_float(
        &mut self,
        _cache: &dyn ResourceCache,
        _containing: ConstraintWidth,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        self.log(StubEvent::LayoutFloat(strategy));
        Ok(())
    }

    fn layout_normal(
        &mut self,
        _cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        _containing: ConstraintWidth,
        _strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        self.log(StubEvent::LayoutNormal);
        cursor.apply_margin();
        cursor.y += self.height;
        Ok(())
    }

    fn layout_formatting_root(
        &mut self,
        _cache: &dyn ResourceCache,
        _containing: ConstraintWidth,
        _strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        self.log(StubEvent::LayoutFormattingRoot);
        Ok(())
    }

    fn set_root_block_position(&mut self, x: f32, y: f32) {
        self.log(StubEvent::RootPosition(x, y));
    }

    fn set_static_position(&mut self, rect: Rect) {
        self.log(StubEvent::StaticPosition(rect));
    }

    fn layout_absolute_or_fixed(
        &mut self,
        _cache: &dyn ResourceCache,
        _containing_block: Rect,
        _viewport: Size,
    ) -> Result<(), WallabyError> {
        self.log(StubEvent::AbsoluteLayout);
        Ok(())
    }

    fn layout_absolute_and_fixed_content(
        &mut self,
        _cache: &dyn ResourceCache,
        _containing_block: Rect,
        _viewport: Size,
    ) -> Result<(), WallabyError> {
        Ok(())
    }

    fn first_line_baseline(&self) -> Option<f32> {
        self.first_baseline
    }

    fn last_line_baseline(&self) -> Option<f32> {
        self.first_baseline
    }

    fn is_formatting_context_root(&self) -> bool {
        false
    }

    fn local_y(&self) -> f32 {
        0.0
    }

    fn is_empty(&self) -> bool {
        self.empty
    }

    fn is_replaced(&self) -> bool {
        self.replaced
    }

    fn stacking_context(&self) -> StackingContextId {
        self.stacking
    }

    fn render_background(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("background"));
        Ok(())
    }

    fn render_non_inline(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("non_inline"));
        Ok(())
    }

    fn render_floats(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("floats"));
        Ok(())
    }

    fn render_inline(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("inline"));
        Ok(())
    }

    fn render_positioned(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("positioned"));
        Ok(())
    }

    fn render_stacking_root(&self, _list: &mut DisplayList) -> Result<(), WallabyError> {
        self.log(StubEvent::Render("stacking_root"));
        Ok(())
    }
}

/// Build a computed-style value starting from the defaults.
pub fn style_with(build: impl FnOnce(&mut ComputedValues)) -> ComputedValues {
    let mut style = ComputedValues::default();
    build(&mut style);
    style
}

/// Build a tree with a block container wrapping an inline span wrapping
/// one text run. Returns (tree, container id).
pub fn container_with_span_text(text: &str, container_style: ComputedValues) -> (BoxTree, BoxNodeId) {
    use wallaby_boxtree::style::Display;

    let mut tree = BoxTree::new();
    let mut block_style = container_style;
    block_style.display = Display::Block;
    let container = tree.alloc_element(block_style.clone());

    let mut span_style = block_style.clone();
    span_style.display = Display::Inline;
    span_style.text_indent = wallaby_boxtree::style::TextIndent::Length(0.0);
    let span = tree.alloc_element(span_style.clone());
    tree.append_child(container, span);

    let run = tree.alloc_text(text, span_style);
    tree.append_child(span, run);

    (tree, container)
}
