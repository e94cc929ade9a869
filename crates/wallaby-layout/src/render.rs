//! Render walkers over the line forest.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! "Within each stacking context, the following layers are painted in
//! back-to-front order:
//!
//! 1. the background and borders of the element forming the stacking context.
//! 3. the in-flow, non-inline-level, non-positioned descendants.
//! 4. the non-positioned floats.
//! 5. the in-flow, inline-level, non-positioned descendants.
//! 6. the child stacking contexts with stack level 0 and the positioned
//!    descendants with stack level 0."
//!
//! The walkers traverse the *line* forest (and, for floats and positioned
//! content, the pre-layout forest) in the same document order as
//! construction, filtering by stacking-context membership and positioning
//! scheme. Nested formatting contexts paint through their layout node's
//! layer hooks.

use wallaby_boxtree::style::Visibility;
use wallaby_boxtree::{BoxNodeId, BoxTree};
use wallaby_common::WallabyError;

use crate::display_list::{DisplayCommand, DisplayList};
use crate::float::BlockFormattingContext;
use crate::fonts::ResourceCache;
use crate::generated::GeneratedBoxId;
use crate::geometry::Rect;
use crate::inline::InlineLayout;
use crate::stacking::StackingContextTree;

impl InlineLayout {
    /// Absolute origin of this container's content, from its relative
    /// offsets and the formatting context position.
    fn paint_origin(&self, fc: &BlockFormattingContext) -> (f32, f32) {
        (self.relative_x + fc.get_x(), self.relative_y + fc.get_y())
    }

    /// Layer 1: backgrounds and borders of every element fragment.
    ///
    /// [Appendix E.2](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
    /// "the background and borders of the element"
    ///
    /// An inline element split across lines shows its left edge only on
    /// its opening fragment and its right edge only on its closing
    /// fragment.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn render_layer_background(
        &self,
        tree: &BoxTree,
        fc: &BlockFormattingContext,
        list: &mut DisplayList,
    ) -> Result<(), WallabyError> {
        let (pos_x, pos_y) = self.paint_origin(fc);
        for &line in &self.lines {
            let mut cur = Some(line);
            while let Some(id) = cur {
                let node = &self.arena[id];
                if node.layout_node.is_none() {
                    if let Some(element) = node.box_node.filter(|&b| tree.as_element(b).is_some())
                    {
                        self.paint_fragment_box(tree, id, element, pos_x, pos_y, list);
                    }
                }
                cur = self.arena.next_in_tree(id);
            }
        }
        Ok(())
    }

    /// Paint one element fragment's background and border strips.
    fn paint_fragment_box(
        &self,
        tree: &BoxTree,
        id: GeneratedBoxId,
        element: BoxNodeId,
        pos_x: f32,
        pos_y: f32,
        list: &mut DisplayList,
    ) {
        let style = tree.style(element);
        if style.visibility != Visibility::Visible {
            return;
        }

        let node = &self.arena[id];
        let content = Rect::new(
            pos_x + node.x,
            pos_y + node.y,
            node.width,
            node.ascent + node.descent,
        );

        // Left/right edges are suppressed on non-opening/non-closing
        // fragments of an element split across lines.
        let padding_box = content.expanded(
            if node.opening {
                style.padding.left.to_px(self.containing_width)
            } else {
                0.0
            },
            style.padding.top.to_px(self.containing_width),
            if node.closing {
                style.padding.right.to_px(self.containing_width)
            } else {
                0.0
            },
            style.padding.bottom.to_px(self.containing_width),
        );
        let border_left = if node.opening {
            style.border_width.left
        } else {
            0.0
        };
        let border_right = if node.closing {
            style.border_width.right
        } else {
            0.0
        };
        let border_box = padding_box.expanded(
            border_left,
            style.border_width.top,
            border_right,
            style.border_width.bottom,
        );

        if style.background_color.is_visible() {
            list.push(DisplayCommand::FillRect {
                x: padding_box.x,
                y: padding_box.y,
                width: padding_box.width,
                height: padding_box.height,
                color: style.background_color,
            });
        }

        if style.border_color.is_visible() {
            if style.border_width.top > 0.0 {
                list.push(DisplayCommand::FillRect {
                    x: border_box.x,
                    y: border_box.y,
                    width: border_box.width,
                    height: style.border_width.top,
                    color: style.border_color,
                });
            }
            if style.border_width.bottom > 0.0 {
                list.push(DisplayCommand::FillRect {
                    x: border_box.x,
                    y: border_box.bottom() - style.border_width.bottom,
                    width: border_box.width,
                    height: style.border_width.bottom,
                    color: style.border_color,
                });
            }
            if border_left > 0.0 {
                list.push(DisplayCommand::FillRect {
                    x: border_box.x,
                    y: border_box.y,
                    width: border_left,
                    height: border_box.height,
                    color: style.border_color,
                });
            }
            if border_right > 0.0 {
                list.push(DisplayCommand::FillRect {
                    x: border_box.right() - border_right,
                    y: border_box.y,
                    width: border_right,
                    height: border_box.height,
                    color: style.border_color,
                });
            }
        }
    }

    /// Layer 3: in-flow, non-inline, non-positioned descendants in the
    /// same stacking context.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn render_layer_non_inline(
        &self,
        tree: &BoxTree,
        list: &mut DisplayList,
    ) -> Result<(), WallabyError> {
        for &line in &self.lines {
            let mut cur = Some(line);
            while let Some(id) = cur {
                if let Some(node_id) = self.arena[id].layout_node {
                    let nested = self.nodes.get(node_id);
                    let style = tree.style(nested.box_node());
                    let same_context = nested.stacking_context() == self.stacking;
                    if same_context && !style.is_positioned() && !style.is_float() {
                        nested.render_background(list)?;
                        nested.render_non_inline(list)?;
                    }
                }
                cur = self.arena.next_in_tree(id);
            }
        }
        Ok(())
    }

    /// Layer 4: floats in the same stacking context. A float paints as a
    /// mini stacking context of its own: background, non-inline content,
    /// nested floats, then inline content.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn render_layer_floats(
        &self,
        tree: &BoxTree,
        list: &mut DisplayList,
    ) -> Result<(), WallabyError> {
        let mut cur = self.arena[self.boxes].first_child;
        while let Some(id) = cur {
            if let Some(node_id) = self.arena[id].layout_node {
                let nested = self.nodes.get(node_id);
                let style = tree.style(nested.box_node());
                let same_context = nested.stacking_context() == self.stacking;
                if same_context && !style.is_positioned() {
                    if style.is_float() {
                        nested.render_background(list)?;
                        nested.render_non_inline(list)?;
                        nested.render_floats(list)?;
                        nested.render_inline(list)?;
                    } else {
                        nested.render_floats(list)?;
                    }
                }
            }
            cur = self.arena.next_in_tree(id);
        }
        Ok(())
    }

    /// Layer 5: the inline content itself, text runs and nested
    /// same-context, non-positioned inline layouts.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn render_layer_inline(
        &self,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
        fc: &BlockFormattingContext,
        list: &mut DisplayList,
    ) -> Result<(), WallabyError> {
        let (pos_x, pos_y) = self.paint_origin(fc);
        for &line in &self.lines {
            let mut cur = Some(line);
            while let Some(id) = cur {
                let node = &self.arena[id];
                if let Some(text) = node.box_node.and_then(|b| tree.as_text(b)) {
                    if text.style.visibility == Visibility::Visible {
                        let font = cache.get_font(&text.style)?;
                        let metrics = font.font_metrics();
                        list.push(DisplayCommand::DrawText {
                            x: pos_x + node.x,
                            y: pos_y + node.y + metrics.ascent,
                            text: text.processed_text[node.text_start..node.text_end].to_string(),
                            font_size: text.style.font_size,
                            color: text.style.color,
                        });
                    }
                } else if let Some(node_id) = node.layout_node {
                    let nested = self.nodes.get(node_id);
                    let style = tree.style(nested.box_node());
                    let same_context = nested.stacking_context() == self.stacking;
                    if same_context && !style.is_positioned() {
                        nested.render_inline(list)?;
                    }
                }
                cur = self.arena.next_in_tree(id);
            }
        }
        Ok(())
    }

    /// Layers 6-7: positioned descendants, in paint order. Same-context
    /// positioned nodes paint their full layer sequence; out-of-context
    /// level-0 stacking roots are dispatched to their own ordered render
    /// routine.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    pub fn render_layer_positioned(
        &self,
        tree: &BoxTree,
        stacking: &StackingContextTree,
        list: &mut DisplayList,
    ) -> Result<(), WallabyError> {
        let mut cur = self.arena[self.boxes].first_child;
        while let Some(id) = cur {
            if let Some(node_id) = self.arena[id].layout_node {
                let nested = self.nodes.get(node_id);
                let style = tree.style(nested.box_node());
                let same_context = nested.stacking_context() == self.stacking;
                let level = stacking.level(nested.stacking_context());
                if same_context {
                    if style.is_positioned() {
                        nested.render_background(list)?;
                        nested.render_non_inline(list)?;
                        nested.render_floats(list)?;
                        nested.render_inline(list)?;
                    }
                    nested.render_positioned(list)?;
                } else if level == 0 {
                    nested.render_stacking_root(list)?;
                }
            }
            cur = self.arena.next_in_tree(id);
        }
        Ok(())
    }
}
