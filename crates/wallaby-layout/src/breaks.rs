//! Linebreak opportunity scanning.
//!
//! [§ 5.5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "A soft wrap opportunity is a position in the text where the UA may
//! choose to break."
//!
//! The scanner flattens the generated box tree in document order and
//! produces the ordered sequence of candidate break points consumed by the
//! line builder. The sequence is monotonically non-decreasing in document
//! order and always terminates with the end-of-content sentinel.

use wallaby_boxtree::style::WhiteSpace;
use wallaby_boxtree::BoxTree;

use crate::generated::{BoxArena, GeneratedBoxId, InlinePosition};

/// A candidate break point.
///
/// [§ 5.5.1 Line Breaking Details](https://www.w3.org/TR/css-text-3/#line-break-details)
///
/// "A line break is forced at a preserved newline". Such opportunities
/// carry `newline = true` and always terminate the line that includes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinebreakOpportunity {
    /// Where the break may occur. The sentinel entry has the
    /// end-of-content position.
    pub pos: InlinePosition,
    /// True for a hard break at a preserved `\n`.
    pub newline: bool,
}

impl LinebreakOpportunity {
    /// A soft wrap opportunity at the given position.
    #[must_use]
    pub const fn soft(pos: InlinePosition) -> Self {
        Self {
            pos,
            newline: false,
        }
    }

    /// A hard break at the given position.
    #[must_use]
    pub const fn hard(pos: InlinePosition) -> Self {
        Self { pos, newline: true }
    }
}

/// [§ 16.6 'white-space'](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
///
/// Whether a run of collapsed spaces under this policy offers a soft wrap
/// opportunity after it. Only fully preformatted text refuses: preformatted
/// lines break at preserved newlines alone.
#[must_use]
pub const fn should_break_at_end_of_spaces(white_space: WhiteSpace) -> bool {
    !matches!(white_space, WhiteSpace::Pre)
}

/// Scan the generated box tree rooted at `boxes` and produce the break
/// opportunity sequence.
///
/// Rules:
/// - a run of spaces collapses to one opportunity positioned at the first
///   character after the run (unless the text is preformatted);
/// - a preserved `\n` is a hard break positioned just after it;
/// - entry into a block-level, non-floated box is itself an opportunity
///   (it forces the current line to end);
/// - the end-of-content sentinel is always appended last.
#[must_use]
pub fn create_linebreak_opportunities(
    arena: &BoxArena,
    boxes: GeneratedBoxId,
    tree: &BoxTree,
) -> Vec<LinebreakOpportunity> {
    let mut opportunities = Vec::new();
    let mut prev_space = true;

    let mut cur = arena[boxes].first_child;
    while let Some(id) = cur {
        let node = &arena[id];
        if let Some(text) = node.box_node.and_then(|b| tree.as_text(b)) {
            // Byte scan: the delimiters are ASCII, so byte offsets at
            // spaces and newlines are always valid char boundaries.
            for (j, byte) in text.processed_text.bytes().enumerate() {
                if byte == b' ' {
                    prev_space = true;
                } else if byte == b'\n' {
                    opportunities.push(LinebreakOpportunity::hard(InlinePosition {
                        box_id: Some(id),
                        text_pos: j + 1,
                    }));
                    prev_space = false;
                } else {
                    if prev_space && should_break_at_end_of_spaces(text.style.white_space) {
                        opportunities.push(LinebreakOpportunity::soft(InlinePosition {
                            box_id: Some(id),
                            text_pos: j,
                        }));
                    }
                    prev_space = false;
                }
            }
        } else if node.layout_node.is_some()
            && node
                .box_node
                .is_some_and(|b| tree.style(b).is_block_level() && !tree.style(b).is_float())
        {
            opportunities.push(LinebreakOpportunity::soft(InlinePosition::at(id)));
        }

        cur = arena.next_in_tree(id);
    }

    opportunities.push(LinebreakOpportunity::soft(InlinePosition::end()));
    opportunities
}
