//! Line alignment and justification.
//!
//! [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
//!
//! "This property describes how inline-level content of a block container
//! is aligned."
//!
//! Right and center alignment apply one uniform offset to a completed
//! line. Justification re-walks the line, splits text fragments at word
//! boundaries, and distributes the line's surplus width across the
//! boundaries with cumulative truncating division, so the distributed
//! total equals the surplus exactly regardless of word count.

use wallaby_boxtree::style::TextAlign;
use wallaby_boxtree::BoxTree;
use wallaby_common::WallabyError;

use crate::fonts::ResourceCache;
use crate::generated::{GeneratedBox, GeneratedBoxId};
use crate::inline::InlineLayout;

/// The word-start predicate shared by [`InlineLayout::find_word_count`]
/// and the justification walk in `align_line`: a non-space character
/// whose predecessor in line document order was a space, excluding the
/// start of the line. Both callers must agree on this exactly or the
/// distributed offsets would not match the counted boundaries.
pub(crate) const fn is_word_start(prev_space: bool, start_of_line: bool) -> bool {
    prev_space && !start_of_line
}

impl InlineLayout {
    /// [§ 16.2](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Position a completed line's fragments horizontally per the
    /// container's 'text-align', and settle every fragment on the line's
    /// baseline. The last line of a justified container is never
    /// justified.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator (fragment
    /// splits re-measure the split halves).
    ///
    /// # Panics
    /// Panics if the line has no fragments; empty lines are suppressed
    /// before alignment.
    pub(crate) fn align_line(
        &mut self,
        line: GeneratedBoxId,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
        last_line: bool,
    ) -> Result<(), WallabyError> {
        let first_child = self.arena[line]
            .first_child
            .expect("aligned line has at least one fragment");
        let last_child = self.arena[line]
            .last_child
            .expect("aligned line has at least one fragment");
        let segments_width =
            self.arena[last_child].x + self.arena[last_child].width - self.arena[first_child].x;
        let extra_total = (self.arena[line].width - segments_width).max(0.0);

        let mut offset_x = 0.0_f32;
        let mut word_count = 0_i32;
        let mut word_index = 0_i32;
        match tree.style(self.element).text_align {
            TextAlign::Right => offset_x = extra_total,
            TextAlign::Center => offset_x = extra_total / 2.0,
            TextAlign::Justify if !last_line => {
                word_count = self.find_word_count(tree, line);
            }
            TextAlign::Left | TextAlign::Justify => {}
        }

        let mut start_of_line = true;
        let mut prev_space = true;
        let baseline_y = {
            let l = &self.arena[line];
            l.y + (l.height - l.ascent - l.descent) / 2.0 + l.ascent
        };

        let mut cur = self.arena[line].first_child;
        while let Some(mut id) = cur {
            self.arena[id].x += offset_x;
            self.arena[id].y = baseline_y - self.arena[id].ascent;
            if let Some(node_id) = self.arena[id].layout_node {
                let box_node = self.arena[id]
                    .box_node
                    .expect("layout-node fragment references its box node");
                if self.nodes.get(node_id).is_replaced()
                    || tree.style(box_node).is_inline_block_level()
                {
                    let (x, y) = (self.arena[id].x, self.arena[id].y);
                    self.nodes.get_mut(node_id).set_root_block_position(x, y);
                }
            }

            if word_count != 0 {
                if let Some(box_node) = self.arena[id].box_node {
                    if tree.as_text(box_node).is_some() {
                        let mut j = self.arena[id].text_start;
                        while j < self.arena[id].text_end {
                            let byte = tree
                                .as_text(box_node)
                                .expect("fragment box node is a text run")
                                .processed_text
                                .as_bytes()[j];
                            if byte == b' ' {
                                prev_space = true;
                            } else {
                                if is_word_start(prev_space, start_of_line) {
                                    self.split_text(id, j, tree, cache)?;
                                    id = self.arena[id]
                                        .next_sibling
                                        .expect("split produced a tail fragment");

                                    // Cumulative truncating distribution:
                                    // the offsets sum to extra_total with
                                    // no rounding drift.
                                    let v1 = (extra_total * word_index as f32
                                        / word_count as f32)
                                        .floor();
                                    let v2 = (extra_total * (word_index + 1) as f32
                                        / word_count as f32)
                                        .floor();
                                    let word_offset_x = v2 - v1;
                                    word_index += 1;

                                    self.arena[id].x += word_offset_x;
                                    if let Some(parent) = self.arena[id].parent {
                                        self.expand_box(parent, word_offset_x);
                                    }
                                    offset_x += word_offset_x;
                                }
                                prev_space = false;
                                start_of_line = false;
                            }
                            j += 1;
                        }
                    }
                }
            }

            cur = self.arena.next_in_tree(id);
        }
        Ok(())
    }

    /// Split a text fragment in two at `text_pos`, in place: the original
    /// keeps `[text_start, text_pos)`, a new sibling fragment takes
    /// `[text_pos, text_end)`, and both halves are re-measured. The tail
    /// starts where the head's new width ends.
    pub(crate) fn split_text(
        &mut self,
        box_id: GeneratedBoxId,
        text_pos: usize,
        tree: &BoxTree,
        cache: &dyn ResourceCache,
    ) -> Result<(), WallabyError> {
        // Duplicate the fragment's static data into a fresh arena slot and
        // relink siblings.
        let original = self.arena[box_id].clone();
        let tail = self.arena.alloc(GeneratedBox {
            box_node: original.box_node,
            x: original.x,
            y: original.y,
            width: original.width,
            height: original.height,
            ascent: original.ascent,
            descent: original.descent,
            baseline_offset: original.baseline_offset,
            text_start: text_pos,
            text_end: original.text_end,
            parent: original.parent,
            next_sibling: original.next_sibling,
            ..GeneratedBox::default()
        });
        self.arena[box_id].text_end = text_pos;
        self.arena[box_id].next_sibling = Some(tail);
        if let Some(parent) = original.parent {
            if self.arena[parent].last_child == Some(box_id) {
                self.arena[parent].last_child = Some(tail);
            }
        }

        let text = original
            .box_node
            .and_then(|b| tree.as_text(b))
            .expect("split target is a text fragment");
        let font = cache.get_font(&text.style)?;
        let head_width = font
            .text_size(&text.processed_text[self.arena[box_id].text_start..text_pos])
            .width;
        let tail_width = font
            .text_size(&text.processed_text[text_pos..self.arena[tail].text_end])
            .width;
        self.arena[box_id].width = head_width;
        self.arena[tail].width = tail_width;
        self.arena[tail].x += head_width;
        Ok(())
    }

    /// Widen a fragment and all its ancestors below the line root by
    /// `extra`, keeping wrapping-element widths consistent with the
    /// offsets applied inside them.
    pub(crate) fn expand_box(&mut self, box_id: GeneratedBoxId, extra: f32) {
        let mut cur = box_id;
        while let Some(parent) = self.arena[cur].parent {
            self.arena[cur].width += extra;
            cur = parent;
        }
    }

    /// Count the word boundaries on a line: maximal runs of non-space
    /// characters preceded by a space, excluding the start of the line.
    /// Uses the same predicate as the justification walk in
    /// [`InlineLayout::align_line`].
    pub(crate) fn find_word_count(&self, tree: &BoxTree, line: GeneratedBoxId) -> i32 {
        let mut start_of_line = true;
        let mut word_count = 0_i32;
        let mut prev_space = true;
        let mut cur = Some(line);
        while let Some(id) = cur {
            if let Some(text) = self.arena[id].box_node.and_then(|b| tree.as_text(b)) {
                for j in self.arena[id].text_start..self.arena[id].text_end {
                    if text.processed_text.as_bytes()[j] == b' ' {
                        prev_space = true;
                    } else {
                        if is_word_start(prev_space, start_of_line) {
                            word_count += 1;
                        }
                        prev_space = false;
                        start_of_line = false;
                    }
                }
            }

            cur = self.arena.next_in_tree(id);
        }
        word_count
    }
}
