//! CSS Inline Layout: line construction for an inline formatting context.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block. Horizontal
//! margins, borders, and padding are respected between these boxes."
//!
//! "The width of a line box is determined by a containing block and the
//! presence of floats."
//!
//! [`InlineLayout`] drives one container's inline content through three
//! phases: pre-layout of floats and atomic inline-level boxes, greedy
//! line-by-line construction against float-aware line boxes, and a final
//! alignment/justification pass. Each produced line is a generated-box
//! tree in the pass's arena; block-level interruptions become single
//! block lines of their own.

use wallaby_boxtree::style::LineHeight;
use wallaby_boxtree::{BoxNodeId, BoxTree, TextBox};
use wallaby_common::warning::warn_once;
use wallaby_common::WallabyError;

use crate::breaks::{create_linebreak_opportunities, LinebreakOpportunity};
use crate::float::BlockFormattingContext;
use crate::fonts::ResourceCache;
use crate::generated::{BoxArena, GeneratedBox, GeneratedBoxId, InlinePosition};
use crate::geometry::{Rect, Size};
use crate::node::{LayoutNode, LayoutNodeId, LayoutNodeSlab};
use crate::stacking::StackingContextId;
use crate::values::{ConstraintHeight, ConstraintWidth, LayoutCursor, LayoutStrategy};

/// Effectively unbounded line width, used when measuring preferred
/// (max-content) width of an expanding container: segments and floats are
/// placed as if the line could never run out of room.
pub(crate) const UNBOUNDED_WIDTH: f32 = 1_000_000.0;

/// The inline formatting context layout engine for one container.
///
/// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Owns the per-pass generated box arena, the layout nodes of embedded
/// block-level/atomic boxes, and the produced `lines`. The box tree it
/// reads is an external collaborator and stays untouched.
pub struct InlineLayout {
    /// The container element in the box tree.
    pub(crate) element: BoxNodeId,
    /// The width constraint of this layout pass. Grown monotonically by
    /// intrinsic passes when `expanding` is set.
    pub width: ConstraintWidth,
    /// The height constraint of this layout pass.
    pub height: ConstraintHeight,
    /// Width of this container's containing block, for percentage edges.
    pub containing_width: f32,
    /// Horizontal offset from relative positioning of ancestors.
    pub relative_x: f32,
    /// Vertical offset from relative positioning of ancestors.
    pub relative_y: f32,
    /// Arena owning every generated box of the current pass.
    pub(crate) arena: BoxArena,
    /// Root of the pre-layout generated box tree mirroring the inline
    /// content.
    pub(crate) boxes: GeneratedBoxId,
    /// Completed lines in visual (top-to-bottom) order. Each entry roots
    /// a generated-box tree in the arena.
    pub(crate) lines: Vec<GeneratedBoxId>,
    /// Floats registered at their first successful placement, in
    /// placement order. Each is registered exactly once.
    pub(crate) floats: Vec<LayoutNodeId>,
    /// The break candidates of the current pass.
    pub(crate) linebreak_opportunities: Vec<LinebreakOpportunity>,
    /// Layout nodes of the embedded block-level and atomic boxes.
    pub(crate) nodes: LayoutNodeSlab,
    /// The stacking context this container belongs to.
    pub(crate) stacking: StackingContextId,
}

impl InlineLayout {
    /// Create an empty inline layout for `element`.
    #[must_use]
    pub fn new(
        element: BoxNodeId,
        width: ConstraintWidth,
        height: ConstraintHeight,
        stacking: StackingContextId,
    ) -> Self {
        let mut arena = BoxArena::new();
        let boxes = arena.alloc(GeneratedBox::default());
        Self {
            element,
            width,
            height,
            containing_width: width.value,
            relative_x: 0.0,
            relative_y: 0.0,
            arena,
            boxes,
            lines: Vec::new(),
            floats: Vec::new(),
            linebreak_opportunities: Vec::new(),
            nodes: LayoutNodeSlab::new(),
            stacking,
        }
    }

    /// Build an inline layout by mirroring the inline content of
    /// `element`'s subtree into generated boxes.
    ///
    /// `make_node` is invoked for every block-level, atomic (replaced /
    /// inline-block), floated, or out-of-flow descendant; the produced
    /// layout node represents that nested formatting context and its
    /// subtree is not descended into.
    ///
    /// # Panics
    /// Panics if `make_node` returns `None` for a box that requires a
    /// layout node; the caller controls both the tree and the factory, so
    /// this is a caller bug.
    pub fn from_subtree(
        tree: &BoxTree,
        element: BoxNodeId,
        width: ConstraintWidth,
        height: ConstraintHeight,
        stacking: StackingContextId,
        make_node: &mut dyn FnMut(BoxNodeId) -> Option<Box<dyn LayoutNode>>,
    ) -> Self {
        let mut layout = Self::new(element, width, height, stacking);
        let root = layout.boxes;
        layout.mirror_children(tree, element, root, make_node);
        layout
    }

    /// Recursively mirror `parent_box`'s children under `parent_gen`.
    fn mirror_children(
        &mut self,
        tree: &BoxTree,
        parent_box: BoxNodeId,
        parent_gen: GeneratedBoxId,
        make_node: &mut dyn FnMut(BoxNodeId) -> Option<Box<dyn LayoutNode>>,
    ) {
        for &child in tree.children(parent_box) {
            let style = tree.style(child);
            let needs_layout_node = tree.as_element(child).is_some()
                && (style.is_block_level()
                    || style.is_inline_block_level()
                    || style.is_float()
                    || style.is_absolute()
                    || style.is_fixed()
                    || tree.is_replaced(child));
            if needs_layout_node {
                let node = make_node(child)
                    .expect("layout node factory must produce a node for block-level and atomic boxes");
                let node_id = self.nodes.insert(node);
                let mirrored = self.arena.alloc(GeneratedBox {
                    box_node: Some(child),
                    layout_node: Some(node_id),
                    ..GeneratedBox::default()
                });
                self.arena.add_box(parent_gen, mirrored);
            } else {
                let mirrored = self.arena.alloc(GeneratedBox {
                    box_node: Some(child),
                    ..GeneratedBox::default()
                });
                self.arena.add_box(parent_gen, mirrored);
                if tree.as_element(child).is_some() {
                    self.mirror_children(tree, child, mirrored, make_node);
                }
            }
        }
    }

    /// Append a generated box mirroring `box_node` under `parent` (the
    /// pre-layout tree root when `None`).
    pub fn add_box(
        &mut self,
        parent: Option<GeneratedBoxId>,
        box_node: BoxNodeId,
    ) -> GeneratedBoxId {
        let id = self.arena.alloc(GeneratedBox {
            box_node: Some(box_node),
            ..GeneratedBox::default()
        });
        self.arena.add_box(parent.unwrap_or(self.boxes), id);
        id
    }

    /// Append a generated box for a block-level or atomic box, embedding
    /// its layout node.
    pub fn add_layout_box(
        &mut self,
        parent: Option<GeneratedBoxId>,
        box_node: BoxNodeId,
        node: Box<dyn LayoutNode>,
    ) -> GeneratedBoxId {
        let node_id = self.nodes.insert(node);
        let id = self.arena.alloc(GeneratedBox {
            box_node: Some(box_node),
            layout_node: Some(node_id),
            ..GeneratedBox::default()
        });
        self.arena.add_box(parent.unwrap_or(self.boxes), id);
        id
    }

    /// The generated box arena of the current pass.
    #[must_use]
    pub const fn arena(&self) -> &BoxArena {
        &self.arena
    }

    /// Root of the pre-layout generated box tree.
    #[must_use]
    pub const fn root_box(&self) -> GeneratedBoxId {
        self.boxes
    }

    /// The completed lines in visual order.
    #[must_use]
    pub fn lines(&self) -> &[GeneratedBoxId] {
        &self.lines
    }

    /// The floats registered during the current pass, in placement order.
    #[must_use]
    pub fn floats(&self) -> &[LayoutNodeId] {
        &self.floats
    }

    /// The layout nodes of the embedded boxes.
    #[must_use]
    pub const fn layout_nodes(&self) -> &LayoutNodeSlab {
        &self.nodes
    }

    /// True if the line is a block-level line (a single embedded block,
    /// not a constructed line of fragments).
    #[must_use]
    pub fn is_block_line(&self, line: GeneratedBoxId) -> bool {
        self.arena[line].layout_node.is_some()
    }

    /// The position at the start of the flattened inline content.
    #[must_use]
    pub fn begin(&self) -> InlinePosition {
        match self.arena[self.boxes].first_child {
            Some(first) => InlinePosition::at(first),
            None => InlinePosition::end(),
        }
    }

    /// True if the position sits on a box embedding a block-level layout
    /// node.
    fn pos_is_block_level(&self, tree: &BoxTree, pos: InlinePosition) -> bool {
        pos.box_id.is_some_and(|id| {
            self.arena[id].layout_node.is_some()
                && self.arena[id]
                    .box_node
                    .is_some_and(|b| tree.style(b).is_block_level())
        })
    }

    /// True if the position sits on a floated box.
    fn pos_is_float(&self, tree: &BoxTree, pos: InlinePosition) -> bool {
        pos.box_id.is_some_and(|id| {
            self.arena[id]
                .box_node
                .is_some_and(|b| tree.style(b).is_float())
        })
    }

    /// Advance a position to the next box in document order, resetting
    /// its text offset.
    fn advance(&self, pos: InlinePosition) -> InlinePosition {
        match pos.box_id.and_then(|id| self.arena.next_in_tree(id)) {
            Some(next) => InlinePosition::at(next),
            None => InlinePosition::end(),
        }
    }

    /// [§ 4.1.2 Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
    ///
    /// "A sequence of collapsible spaces at the beginning of a line is
    /// removed."
    ///
    /// Narrow a text range so collapsible leading spaces at the start of a
    /// line are skipped, and track whether the cursor is still at the
    /// start of the line. Preserved-whitespace text keeps its spaces and
    /// immediately ends the start-of-line state.
    pub(crate) fn adjust_start_of_line_text_range(
        text: &TextBox,
        text_start: &mut usize,
        text_end: &mut usize,
        start_of_line: &mut bool,
    ) {
        use wallaby_boxtree::style::WhiteSpace;

        if !*start_of_line || *text_start >= *text_end {
            return;
        }
        match text.style.white_space {
            WhiteSpace::Pre | WhiteSpace::PreWrap => {
                *start_of_line = false;
            }
            _ => match text.processed_text[*text_start..].find(|c| c != ' ') {
                Some(rel) if *text_start + rel < *text_end => {
                    *text_start += rel;
                    *start_of_line = false;
                }
                _ => {
                    *text_start = *text_end;
                }
            },
        }
    }

    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// Lay out this container's inline content against `fc` under the
    /// given strategy, producing `lines` and updating `width.value` /
    /// the flow cursor.
    ///
    /// Strategy passes mutate this layout in place; `lines` and `floats`
    /// are cleared on entry, other state carries over. Callers computing
    /// shrink-to-fit widths must run the `Minimum` and/or `Preferred`
    /// passes before `Normal`.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    ///
    /// # Panics
    /// Panics if the generated box tree is structurally inconsistent
    /// (a bug in this subsystem, not recoverable).
    pub fn layout_content(
        &mut self,
        tree: &BoxTree,
        fc: &mut BlockFormattingContext,
        cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        self.lines.clear();
        self.layout_inline_blocks_and_floats(tree, cache, strategy)?;
        self.linebreak_opportunities = create_linebreak_opportunities(&self.arena, self.boxes, tree);

        let mut line_start_pos = self.begin();
        let mut next_linebreak_opportunity = 0_usize;
        while !line_start_pos.is_end() {
            if self.pos_is_block_level(tree, line_start_pos) && !self.pos_is_float(tree, line_start_pos)
            {
                line_start_pos = self.layout_block_boundary(
                    tree,
                    fc,
                    cache,
                    cursor,
                    strategy,
                    line_start_pos,
                    &mut next_linebreak_opportunity,
                )?;
            } else {
                let restart = self.build_line(
                    tree,
                    fc,
                    cache,
                    cursor,
                    strategy,
                    &mut line_start_pos,
                    &mut next_linebreak_opportunity,
                )?;
                if restart {
                    continue;
                }
            }
        }

        let lines = self.lines.clone();
        for (i, &line) in lines.iter().enumerate() {
            let last_line = i + 1 == lines.len();
            if !self.is_block_line(line) {
                self.align_line(line, tree, cache, last_line)?;
            }
        }

        // An entirely blank container still advances the flow when it has
        // a non-content-driven nonzero height.
        if self.lines.is_empty() && self.height.value > 0.0 {
            cursor.apply_margin();
        }
        Ok(())
    }

    /// Handle the AT_BLOCK_BOUNDARY state: the cursor sits on a
    /// block-level, non-floated box. Generates a single block line (or
    /// records a deferred static position for absolute/fixed content) and
    /// returns the position past that subtree.
    #[allow(clippy::too_many_arguments)]
    fn layout_block_boundary(
        &mut self,
        tree: &BoxTree,
        fc: &mut BlockFormattingContext,
        cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        strategy: LayoutStrategy,
        line_start_pos: InlinePosition,
        next_linebreak_opportunity: &mut usize,
    ) -> Result<InlinePosition, WallabyError> {
        let box_id = line_start_pos
            .box_id
            .expect("block boundary position has a box");
        let box_node = self.arena[box_id]
            .box_node
            .expect("block-level generated box references its box node");
        let node_id = self.arena[box_id]
            .layout_node
            .expect("block-level generated box embeds a layout node");
        let style = tree.style(box_node);

        if style.is_absolute() || style.is_fixed() {
            // Absolute and fixed content is laid out later, once the
            // container's height is known; only the static position is
            // recorded now.
            let left = cursor.x;
            let top = cursor.y + cursor.total_margin();
            self.nodes
                .get_mut(node_id)
                .set_static_position(Rect::new(left, top, 0.0, 0.0));
        } else {
            self.generate_block_line(box_id);
            let line = *self.lines.last().expect("block line was just pushed");
            self.layout_block_line(line, tree, fc, cache, cursor, strategy)?;
        }

        if *next_linebreak_opportunity < self.linebreak_opportunities.len()
            && line_start_pos == self.linebreak_opportunities[*next_linebreak_opportunity].pos
        {
            *next_linebreak_opportunity += 1;
        }

        Ok(self.advance(line_start_pos))
    }

    /// Handle the BUILDING_LINE state: greedily consume break
    /// opportunities until the line is full, a hard break or block-level
    /// boundary is included, or a float placement forces a restart.
    ///
    /// Returns true if a float was placed and line building must restart
    /// from the same position with updated line-box geometry.
    #[allow(clippy::too_many_arguments)]
    fn build_line(
        &mut self,
        tree: &BoxTree,
        fc: &mut BlockFormattingContext,
        cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        strategy: LayoutStrategy,
        line_start_pos: &mut InlinePosition,
        next_linebreak_opportunity: &mut usize,
    ) -> Result<bool, WallabyError> {
        let y = cursor.y + cursor.total_margin();
        let mut line_box = Rect::default();

        let mut line_end_pos = *line_start_pos;
        let mut used_width = 0.0_f32;
        let mut available_width = self.width.value;
        let mut start_of_line = true;

        while *next_linebreak_opportunity < self.linebreak_opportunities.len() {
            let opportunity = self.linebreak_opportunities[*next_linebreak_opportunity];
            let linebreak_pos = opportunity.pos;

            let mut next_start_of_line = start_of_line;
            let segment_width =
                self.measure(tree, cache, line_end_pos, linebreak_pos, &mut next_start_of_line)?;

            if start_of_line {
                // [§ 16.1](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
                // "This property specifies the indentation of the first
                // line of text in a block container."
                let text_indent = if self.lines.is_empty() {
                    tree.style(self.element).text_indent.to_px(self.width.value)
                } else {
                    0.0
                };

                let mut w = self.width.value;
                if self.width.expanding && strategy == LayoutStrategy::Preferred {
                    w = UNBOUNDED_WIDTH;
                }
                line_box = fc.find_line_box(cursor.x + text_indent, cursor.x + w, y, 1.0, segment_width);
                available_width = line_box.width;
            }

            let mut fits_on_line = used_width + segment_width <= available_width;
            if !fits_on_line && start_of_line {
                // The first segment is kept even when it overflows: a line
                // must always make progress. Character-level emergency
                // breaking is out of scope.
                warn_once(
                    "Layout",
                    "unbreakable segment wider than its line box; overflowing",
                );
                fits_on_line = true;
            }

            if self.width.expanding {
                if strategy == LayoutStrategy::Preferred {
                    fits_on_line = true;
                } else if strategy == LayoutStrategy::Minimum {
                    fits_on_line = start_of_line;
                }
            }

            if !fits_on_line {
                break;
            }

            if self.place_floats(tree, fc, *line_start_pos, linebreak_pos, cursor.x, y, strategy)? {
                // Placing a float can shrink or shift the remaining line
                // box; rebuild this line from the same position.
                return Ok(true);
            }
            used_width += segment_width;
            line_end_pos = linebreak_pos;
            *next_linebreak_opportunity += 1;
            start_of_line = next_start_of_line;
            if opportunity.newline
                || (self.pos_is_block_level(tree, line_end_pos)
                    && !self.pos_is_float(tree, line_end_pos))
            {
                break;
            }
        }

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE] strategy={strategy:?} used_width={used_width} available={available_width} lines={}",
            self.lines.len()
        );

        if !self.is_empty_line(tree, *line_start_pos, line_end_pos) {
            self.generate_line(tree, *line_start_pos, line_end_pos);
            let line = *self.lines.last().expect("line was just generated");
            self.layout_line(line, &mut line_box, tree, cache)?;
            cursor.apply_margin();
            cursor.y = line_box.bottom();

            if strategy != LayoutStrategy::Normal && self.width.expanding {
                self.width.value = self
                    .width
                    .value
                    .max(line_box.x + used_width - cursor.x);
            }
        }

        *line_start_pos = line_end_pos;
        Ok(false)
    }

    /// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
    ///
    /// Pre-layout pass: every float, inline-block, and replaced element in
    /// the inline flow is laid out once, in document order, before any
    /// line is built. Under the `Minimum` strategy an expanding container
    /// grows to fit the widest such element, since min-content width
    /// cannot wrap inside an atomic box.
    fn layout_inline_blocks_and_floats(
        &mut self,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        self.floats.clear();
        let mut cur = self.arena[self.boxes].first_child;
        while let Some(id) = cur {
            if let Some(node_id) = self.arena[id].layout_node {
                let box_node = self.arena[id]
                    .box_node
                    .expect("layout-node generated box references its box node");
                let style = tree.style(box_node);
                if style.is_float()
                    || style.is_inline_block_level()
                    || self.nodes.get(node_id).is_replaced()
                {
                    self.arena[id].floated = false;
                    let containing = self.width;
                    self.nodes
                        .get_mut(node_id)
                        .layout_float(cache, containing, strategy)?;

                    if strategy == LayoutStrategy::Minimum && self.width.expanding {
                        let block_width = self.nodes.get(node_id).block_width();
                        self.width.value = self.width.value.max(block_width);
                    }
                }
            }
            cur = self.arena.next_in_tree(id);
        }
        Ok(())
    }

    /// [§ 9.5.1](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place the first not-yet-placed float between `start` and `end`.
    /// Returns true if one was placed (the caller restarts line building,
    /// because a placed float can change the line box). Each float is
    /// registered in `floats` exactly once, at its first successful
    /// placement.
    #[allow(clippy::too_many_arguments)]
    fn place_floats(
        &mut self,
        tree: &BoxTree,
        fc: &mut BlockFormattingContext,
        start: InlinePosition,
        end: InlinePosition,
        x: f32,
        y: f32,
        strategy: LayoutStrategy,
    ) -> Result<bool, WallabyError> {
        use wallaby_boxtree::style::{Clear, Float};

        let mut cur = start.box_id;
        while cur != end.box_id {
            let id = cur.expect("positions before the line end have boxes");
            let node_id = self.arena[id].layout_node;
            if let Some(node_id) = node_id {
                let box_node = self.arena[id]
                    .box_node
                    .expect("layout-node generated box references its box node");
                let style = tree.style(box_node);
                if !self.arena[id].floated && style.is_float() {
                    self.arena[id].floated = true;
                    self.floats.push(node_id);

                    let mut y = y;
                    // [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
                    // A cleared float starts below the floats it clears.
                    if matches!(style.clear, Clear::Left | Clear::Both) {
                        y = y.max(fc.find_left_clearance());
                    }
                    if matches!(style.clear, Clear::Right | Clear::Both) {
                        y = y.max(fc.find_right_clearance());
                    }

                    let float_box = Rect::new(
                        x,
                        y,
                        self.nodes.get(node_id).block_width(),
                        self.nodes.get(node_id).block_height(),
                    );

                    let placed = if strategy == LayoutStrategy::Preferred && self.width.expanding {
                        match style.float {
                            Float::Left => fc.float_left(float_box, x + UNBOUNDED_WIDTH),
                            Float::Right => {
                                fc.float_right_shrink_to_fit(float_box, x + UNBOUNDED_WIDTH)
                            }
                            Float::None => unreachable!("placed box is floated"),
                        }
                    } else {
                        match style.float {
                            Float::Left => fc.float_left(float_box, x + self.width.value),
                            Float::Right => {
                                let shifted =
                                    float_box.translated(self.width.value - float_box.width, 0.0);
                                fc.float_right(shifted, x + self.width.value)
                            }
                            Float::None => unreachable!("placed box is floated"),
                        }
                    };
                    self.nodes
                        .get_mut(node_id)
                        .set_root_block_position(placed.x, placed.y);

                    if strategy != LayoutStrategy::Normal && self.width.expanding {
                        self.width.value = self.width.value.max(placed.right() - x);
                    }

                    return Ok(true);
                }
            }

            cur = self.arena.next_in_tree(id);
        }
        Ok(false)
    }

    /// Measure the advance width of the flattened content in
    /// `[start, end)`, including inline-element edge widths, with
    /// start-of-line space trimming.
    pub(crate) fn measure(
        &self,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
        start: InlinePosition,
        end: InlinePosition,
        start_of_line: &mut bool,
    ) -> Result<f32, WallabyError> {
        let mut width = 0.0_f32;
        let mut cur = start;
        while cur != end {
            let id = cur.box_id.expect("positions before the end have boxes");
            let node = &self.arena[id];
            let box_node = node.box_node;

            if let Some(text) = box_node.and_then(|b| tree.as_text(b)) {
                let mut text_start = cur.text_pos;
                let mut text_end = if cur.box_id == end.box_id {
                    end.text_pos
                } else {
                    text.processed_text.len()
                };
                Self::adjust_start_of_line_text_range(
                    text,
                    &mut text_start,
                    &mut text_end,
                    start_of_line,
                );
                let font = cache.get_font(&text.style)?;
                width += font
                    .text_size(&text.processed_text[text_start..text_end])
                    .width;
            } else if let Some(b) = box_node {
                let style = tree.style(b);
                if !style.is_float() {
                    if node.layout_node.is_some() {
                        *start_of_line = false;
                    }
                    if self.is_atomic(tree, id) {
                        width += self
                            .nodes
                            .get(node.layout_node.expect("atomic boxes embed a layout node"))
                            .block_width();
                    } else {
                        width += style.margin.left.to_px(self.containing_width)
                            + style.border_width.left
                            + style.padding.left.to_px(self.containing_width);
                    }
                }
            }

            if cur.box_id == end.box_id {
                break;
            }

            // Step in document order, closing element edges as we leave
            // their subtrees.
            cur.text_pos = 0;
            if let Some(first) = self.arena[id].first_child {
                cur.box_id = Some(first);
            } else if self.arena[id].next_sibling.is_some() {
                width += self.closing_edge_width(tree, id);
                cur.box_id = self.arena[id].next_sibling;
            } else {
                let mut climb = Some(id);
                while let Some(c) = climb {
                    if self.arena[c].next_sibling.is_some() {
                        break;
                    }
                    width += self.closing_edge_width(tree, c);
                    climb = self.arena[c].parent;
                }
                if let Some(c) = climb {
                    width += self.closing_edge_width(tree, c);
                    cur.box_id = self.arena[c].next_sibling;
                } else {
                    cur.box_id = None;
                }
            }
        }
        Ok(width)
    }

    /// True if the generated box embeds a replaced or inline-block layout
    /// node (an atomic inline-level box whose width is its block width).
    fn is_atomic(&self, tree: &BoxTree, id: GeneratedBoxId) -> bool {
        let node = &self.arena[id];
        let Some(n) = node.layout_node else {
            return false;
        };
        self.nodes.get(n).is_replaced()
            || node
                .box_node
                .is_some_and(|b| tree.style(b).is_inline_block_level())
    }

    /// The right margin+border+padding of an element box being exited, or
    /// zero for text, floats, and atomic boxes (whose block width already
    /// includes the edges).
    fn closing_edge_width(&self, tree: &BoxTree, id: GeneratedBoxId) -> f32 {
        let node = &self.arena[id];
        let Some(b) = node.box_node else { return 0.0 };
        if tree.as_element(b).is_none() {
            return 0.0;
        }
        let style = tree.style(b);
        if style.is_float() {
            return 0.0;
        }
        if let Some(n) = node.layout_node {
            if self.nodes.get(n).is_replaced() || style.is_inline_block_level() {
                return 0.0;
            }
        }
        style.margin.right.to_px(self.containing_width)
            + style.border_width.right
            + style.padding.right.to_px(self.containing_width)
    }

    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "Line boxes that contain no text, no preserved white space...
    /// must be treated as zero-height line boxes."
    ///
    /// True if `[start, end)` contains only collapsible whitespace and
    /// empty non-floated nested content.
    pub(crate) fn is_empty_line(
        &self,
        tree: &BoxTree,
        start: InlinePosition,
        end: InlinePosition,
    ) -> bool {
        let mut start_of_line = true;
        let mut cur = start;
        while cur != end {
            let id = cur.box_id.expect("positions before the end have boxes");
            let node = &self.arena[id];

            if let Some(text) = node.box_node.and_then(|b| tree.as_text(b)) {
                let mut text_start = cur.text_pos;
                let mut text_end = if cur.box_id == end.box_id {
                    end.text_pos
                } else {
                    text.processed_text.len()
                };
                Self::adjust_start_of_line_text_range(
                    text,
                    &mut text_start,
                    &mut text_end,
                    &mut start_of_line,
                );
                if text.processed_text[text_start..text_end]
                    .bytes()
                    .any(|b| b != b' ')
                {
                    return false;
                }
            } else if let Some(node_id) = node.layout_node {
                let box_node = node
                    .box_node
                    .expect("layout-node generated box references its box node");
                if !tree.style(box_node).is_float() && !self.nodes.get(node_id).is_empty() {
                    return false;
                }
            }

            if cur.box_id == end.box_id {
                break;
            }
            cur = self.advance(cur);
        }
        true
    }

    /// True if the container's whole content is collapsible whitespace and
    /// empty in-flow nested content, and its height is content-driven (or
    /// explicitly zero).
    #[must_use]
    pub fn is_empty(&self, tree: &BoxTree) -> bool {
        let mut start_of_line = true;
        let mut cur = self.arena[self.boxes].first_child;
        while let Some(id) = cur {
            let node = &self.arena[id];
            if let Some(text) = node.box_node.and_then(|b| tree.as_text(b)) {
                let mut text_start = 0;
                let mut text_end = text.processed_text.len();
                Self::adjust_start_of_line_text_range(
                    text,
                    &mut text_start,
                    &mut text_end,
                    &mut start_of_line,
                );
                if text.processed_text[text_start..text_end]
                    .bytes()
                    .any(|b| b != b' ')
                {
                    return false;
                }
            } else if let Some(node_id) = node.layout_node {
                let box_node = node
                    .box_node
                    .expect("layout-node generated box references its box node");
                let style = tree.style(box_node);
                if !style.is_float()
                    && !style.is_absolute()
                    && !style.is_fixed()
                    && !self.nodes.get(node_id).is_empty()
                {
                    return false;
                }
            }
            cur = self.arena.next_in_tree(id);
        }

        if self.height.use_content {
            true
        } else {
            self.height.value == 0.0
        }
    }

    /// Generate a block-level line: a single line entry referencing the
    /// embedded layout node.
    fn generate_block_line(&mut self, box_id: GeneratedBoxId) {
        let (box_node, layout_node) = {
            let node = &self.arena[box_id];
            (node.box_node, node.layout_node)
        };
        let line = self.arena.alloc(GeneratedBox {
            box_node,
            layout_node,
            ..GeneratedBox::default()
        });
        self.lines.push(line);
    }

    /// Rebuild the ancestor chain of `start` inside a fresh line tree.
    ///
    /// A line beginning in the middle of nested inline elements needs
    /// non-opening fragments of each ancestor so the line tree mirrors the
    /// structural nesting; only the fragment on the line where an element
    /// truly starts renders its left edge.
    ///
    /// Returns the fragment that new content should be appended under.
    ///
    /// # Panics
    /// Panics if `start` is detached from the pre-layout tree (a bug in
    /// this subsystem).
    fn begin_tree(&mut self, start: GeneratedBoxId, line: GeneratedBoxId) -> GeneratedBoxId {
        let mut input = start;
        let mut output: Option<GeneratedBoxId> = None;
        let mut cur: Option<GeneratedBoxId> = None;
        loop {
            let parent = self.arena[input]
                .parent
                .expect("generated box must have a parent during line generation");
            if self.arena[parent].parent.is_none() {
                break;
            }
            input = parent;
            let (box_node, layout_node) = {
                let node = &self.arena[input];
                (node.box_node, node.layout_node)
            };
            let fragment = self.arena.alloc(GeneratedBox {
                opening: false,
                box_node,
                layout_node,
                ..GeneratedBox::default()
            });
            if let Some(c) = cur {
                self.arena.add_box(fragment, c);
            } else {
                output = Some(fragment);
            }
            cur = Some(fragment);
        }
        if let Some(c) = cur {
            self.arena.add_box(line, c);
        }
        output.unwrap_or(line)
    }

    /// Generate one line's fragment tree for the content in
    /// `[start, end)`: text fragments with their trimmed ranges, inline
    /// element fragments with opening/closing flags, and embedded
    /// non-floated layout nodes. Floats generate no fragments (they are
    /// placed from the pre-layout tree).
    fn generate_line(&mut self, tree: &BoxTree, start: InlinePosition, end: InlinePosition) {
        let line = self.arena.alloc(GeneratedBox::default());
        let start_box = start.box_id.expect("line start has a box");
        let mut parent = Some(self.begin_tree(start_box, line));

        let mut start_of_line = true;
        let mut cur = start;
        while cur != end {
            let cur_box = cur.box_id.expect("positions before the end have boxes");
            let (box_node, layout_node) = {
                let node = &self.arena[cur_box];
                (node.box_node, node.layout_node)
            };
            let mut output: Option<GeneratedBoxId> = None;

            if let Some(text) = box_node.and_then(|b| tree.as_text(b)) {
                let mut text_start = cur.text_pos;
                let mut text_end = if cur.box_id == end.box_id {
                    end.text_pos
                } else {
                    text.processed_text.len()
                };
                Self::adjust_start_of_line_text_range(
                    text,
                    &mut text_start,
                    &mut text_end,
                    &mut start_of_line,
                );
                let fragment = self.arena.alloc(GeneratedBox {
                    box_node,
                    layout_node,
                    text_start,
                    text_end,
                    closing: false,
                    ..GeneratedBox::default()
                });
                self.arena
                    .add_box(parent.expect("line parent exists while content remains"), fragment);
                output = Some(fragment);
            } else if layout_node.is_none() {
                let fragment = self.arena.alloc(GeneratedBox {
                    box_node,
                    closing: false,
                    ..GeneratedBox::default()
                });
                self.arena
                    .add_box(parent.expect("line parent exists while content remains"), fragment);
                output = Some(fragment);
            } else if !box_node.is_some_and(|b| tree.style(b).is_float()) {
                start_of_line = false;
                let fragment = self.arena.alloc(GeneratedBox {
                    box_node,
                    layout_node,
                    ..GeneratedBox::default()
                });
                self.arena
                    .add_box(parent.expect("line parent exists while content remains"), fragment);
                output = Some(fragment);
            }

            if cur.box_id == end.box_id {
                break;
            }

            cur.text_pos = 0;
            if let Some(first) = self.arena[cur_box].first_child {
                cur.box_id = Some(first);
                parent = output;
            } else if self.arena[cur_box].next_sibling.is_some() {
                if let Some(o) = output {
                    self.arena[o].closing = true;
                }
                cur.box_id = self.arena[cur_box].next_sibling;
            } else {
                let mut climb = Some(cur_box);
                while let Some(c) = climb {
                    if self.arena[c].next_sibling.is_some() {
                        break;
                    }
                    if let Some(o) = output {
                        self.arena[o].closing = true;
                    }
                    climb = self.arena[c].parent;
                    output = parent;
                    parent = parent.and_then(|p| self.arena[p].parent);
                }
                match climb {
                    Some(c) => {
                        if let Some(o) = output {
                            self.arena[o].closing = true;
                        }
                        cur.box_id = self.arena[c].next_sibling;
                    }
                    None => {
                        cur.box_id = None;
                    }
                }
            }
        }

        self.lines.push(line);
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Walk one generated line assigning x advances, per-fragment vertical
    /// metrics, and ascent/descent/height propagation up the fragment
    /// tree; then floor the line height by the container's own
    /// line-height and record the line-box bottom.
    fn layout_line(
        &mut self,
        line: GeneratedBoxId,
        line_box: &mut Rect,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
    ) -> Result<(), WallabyError> {
        let mut x = line_box.x;
        self.arena[line].y = line_box.y;
        let line_y = line_box.y;

        let mut cur = self.arena[line].first_child;
        while let Some(id) = cur {
            self.arena[id].y = line_y;
            let box_node = self.arena[id].box_node;

            if let Some(text) = box_node.and_then(|b| tree.as_text(b)) {
                self.arena[id].x = x;
                let font = cache.get_font(&text.style)?;
                let metrics = font.font_metrics();
                self.arena[id].ascent = metrics.ascent;
                self.arena[id].descent = metrics.descent;
                self.arena[id].height = match text.style.line_height {
                    LineHeight::Normal => metrics.ascent + metrics.descent,
                    LineHeight::Length(length) => length,
                    LineHeight::Number(number) => number * text.style.font_size,
                };
                self.arena[id].baseline_offset = 0.0;
                self.propagate_metrics(id);
                let slice =
                    &text.processed_text[self.arena[id].text_start..self.arena[id].text_end];
                self.arena[id].width = font.text_size(slice).width;
                x += self.arena[id].width;
            } else if let Some(b) = box_node {
                let style = tree.style(b);
                let atomic = self.arena[id].layout_node.is_some_and(|n| {
                    self.nodes.get(n).is_replaced() || style.is_inline_block_level()
                });
                if atomic {
                    let node_id = self.arena[id]
                        .layout_node
                        .expect("atomic boxes embed a layout node");
                    self.arena[id].height = self.nodes.get(node_id).block_height();
                    // The bottom edge of an atomic box sits on the baseline.
                    self.arena[id].ascent = self.arena[id].height;
                    self.propagate_metrics(id);
                    self.arena[id].x = x;
                    x += self.nodes.get(node_id).block_width();
                } else {
                    if self.arena[id].opening {
                        x += style.margin.left.to_px(self.containing_width)
                            + style.border_width.left
                            + style.padding.left.to_px(self.containing_width);
                    }
                    self.arena[id].x = x;
                    self.arena[id].height = match style.line_height {
                        LineHeight::Normal => 0.0,
                        LineHeight::Length(length) => length,
                        LineHeight::Number(number) => number * style.font_size,
                    };
                }
            }

            // Step in document order, finalizing widths and closing edges
            // on the way out of each subtree.
            if let Some(first) = self.arena[id].first_child {
                cur = Some(first);
            } else if self.arena[id].next_sibling.is_some() {
                self.arena[id].width = x - self.arena[id].x;
                self.propagate_metrics(id);
                x += self.layout_closing_edge(tree, id);
                cur = self.arena[id].next_sibling;
            } else {
                let mut climb = Some(id);
                loop {
                    let Some(c) = climb else { break };
                    if self.arena[c].next_sibling.is_some() {
                        break;
                    }
                    self.arena[c].width = x - self.arena[c].x;
                    if self.arena[c].parent.is_some() {
                        self.propagate_metrics(c);
                    }
                    x += self.layout_closing_edge(tree, c);
                    climb = self.arena[c].parent;
                }
                match climb {
                    Some(c) => {
                        self.arena[c].width = x - self.arena[c].x;
                        self.propagate_metrics(c);
                        x += self.layout_closing_edge(tree, c);
                        cur = self.arena[c].next_sibling;
                    }
                    None => cur = None,
                }
            }
        }

        // The container's own line-height floors every line.
        let container = tree.style(self.element);
        match container.line_height {
            LineHeight::Normal => {}
            LineHeight::Length(length) => {
                self.arena[line].height = self.arena[line].height.max(length);
            }
            LineHeight::Number(number) => {
                self.arena[line].height =
                    self.arena[line].height.max(number * container.font_size);
            }
        }

        self.arena[line].width = line_box.width;
        line_box.height = self.arena[line].y + self.arena[line].height - line_box.y;
        Ok(())
    }

    /// Fold a fragment's ascent/descent/height into its parent.
    fn propagate_metrics(&mut self, id: GeneratedBoxId) {
        let Some(parent) = self.arena[id].parent else {
            return;
        };
        let (ascent, descent, height) = {
            let node = &self.arena[id];
            (node.ascent, node.descent, node.height)
        };
        let p = &mut self.arena[parent];
        p.ascent = p.ascent.max(ascent);
        p.descent = p.descent.max(descent);
        p.height = p.height.max(height);
    }

    /// The closing-edge advance for a fragment being exited during line
    /// geometry: right margin+border+padding of a closing, non-atomic,
    /// non-floated element fragment.
    fn layout_closing_edge(&self, tree: &BoxTree, id: GeneratedBoxId) -> f32 {
        if !self.arena[id].closing {
            return 0.0;
        }
        self.closing_edge_width(tree, id)
    }

    /// Lay out a block-level line: either in the normal flow (overflow
    /// visible) or as a formatting root placed next to the floats, with
    /// clearance.
    fn layout_block_line(
        &mut self,
        line: GeneratedBoxId,
        tree: &BoxTree,
        fc: &mut BlockFormattingContext,
        cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError> {
        use wallaby_boxtree::style::Clear;

        let node_id = self.arena[line]
            .layout_node
            .expect("block line embeds a layout node");
        let box_node = self.arena[line]
            .box_node
            .expect("block line references its box node");
        let style = tree.style(box_node);

        if style.is_overflow_visible() && !self.nodes.get(node_id).is_replaced() {
            let containing = self.width;
            self.nodes
                .get_mut(node_id)
                .layout_normal(cache, cursor, containing, strategy)?;
            if strategy != LayoutStrategy::Normal && self.width.expanding {
                let block_width = self.nodes.get(node_id).block_width();
                self.width.value = self.width.value.max(block_width);
            }
        } else {
            let mut box_y = cursor.y + cursor.total_margin();
            if matches!(style.clear, Clear::Left | Clear::Both) {
                box_y = box_y.max(fc.find_left_clearance());
            }
            if matches!(style.clear, Clear::Right | Clear::Both) {
                box_y = box_y.max(fc.find_right_clearance());
            }

            let mut containing = self.width;
            if strategy == LayoutStrategy::Normal {
                containing.value = fc
                    .find_line_box(cursor.x, cursor.x + self.width.value, box_y, 1.0, 0.0)
                    .width;
            }
            self.nodes
                .get_mut(node_id)
                .layout_formatting_root(cache, containing, strategy)?;

            let float_box = Rect::new(
                cursor.x,
                box_y,
                self.nodes.get(node_id).block_width(),
                self.nodes.get(node_id).block_height(),
            );
            let limit = if strategy == LayoutStrategy::Preferred && self.width.expanding {
                cursor.x + UNBOUNDED_WIDTH
            } else {
                cursor.x + self.width.value
            };
            let placed = fc.place_left(float_box, limit);
            cursor.apply_margin();
            cursor.y = placed.bottom();

            if strategy != LayoutStrategy::Normal && self.width.expanding {
                self.width.value = self.width.value.max(placed.right() - cursor.x);
            }

            self.nodes
                .get_mut(node_id)
                .set_root_block_position(placed.x, placed.y);
        }
        Ok(())
    }

    /// The baseline of the first line, if any, in this container's
    /// coordinate space. Nested formatting contexts contribute their own
    /// first baseline offset by their local position.
    #[must_use]
    pub fn first_line_baseline(&self) -> Option<f32> {
        for &line in &self.lines {
            let node = &self.arena[line];
            if let Some(node_id) = node.layout_node {
                let nested = self.nodes.get(node_id);
                if let Some(mut baseline) = nested.first_line_baseline() {
                    if nested.is_formatting_context_root() {
                        baseline += nested.local_y();
                    }
                    return Some(baseline);
                }
            } else {
                return Some(node.y + node.ascent);
            }
        }
        None
    }

    /// The baseline of the last line, if any. Lines are scanned bottom-up.
    #[must_use]
    pub fn last_line_baseline(&self) -> Option<f32> {
        for &line in self.lines.iter().rev() {
            let node = &self.arena[line];
            if let Some(node_id) = node.layout_node {
                let nested = self.nodes.get(node_id);
                if let Some(mut baseline) = nested.last_line_baseline() {
                    if nested.is_formatting_context_root() {
                        baseline += nested.local_y();
                    }
                    return Some(baseline);
                }
            } else {
                return Some(node.y + node.ascent);
            }
        }
        None
    }

    /// [§ 10.1 Definition of containing block](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// The deferred pass for absolutely positioned and fixed descendants,
    /// run once the container's height is known. Recurses through nested
    /// layout nodes.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn layout_absolute_and_fixed_content(
        &mut self,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
        containing_block: Rect,
        viewport: Size,
    ) -> Result<(), WallabyError> {
        let mut containing_block = containing_block;
        if tree.style(self.element).is_positioned() {
            // A positioned container establishes the containing block for
            // its absolutely positioned descendants.
            containing_block = Rect::new(
                self.relative_x,
                self.relative_y,
                self.width.value,
                self.height.value,
            );
        }

        let mut cur = self.arena[self.boxes].first_child;
        while let Some(id) = cur {
            if let Some(node_id) = self.arena[id].layout_node {
                let box_node = self.arena[id]
                    .box_node
                    .expect("layout-node generated box references its box node");
                let style = tree.style(box_node);
                if style.is_absolute() || style.is_fixed() {
                    self.nodes.get_mut(node_id).layout_absolute_or_fixed(
                        cache,
                        containing_block,
                        viewport,
                    )?;
                }
                self.nodes.get_mut(node_id).layout_absolute_and_fixed_content(
                    cache,
                    containing_block,
                    viewport,
                )?;
            }
            cur = self.arena.next_in_tree(id);
        }
        Ok(())
    }
}
