//! Float placement and the line-box geometry of a block formatting context.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current
//! line. The most interesting characteristic of a float is that content may
//! flow along its side."
//!
//! "Since a float is not in the flow, non-positioned block boxes created
//! before and after the float box flow vertically as if the float did not
//! exist. However, the current and subsequent line boxes created next to
//! the float are shortened as necessary to make room for the margin box
//! of the float."
//!
//! The inline engine consults this context through a narrow query surface:
//! float-aware line boxes, float placement on either side, clearances, and
//! in-flow placement of formatting roots next to floats.

use crate::geometry::Rect;

/// The float bands and origin of one block formatting context.
///
/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "Floats... establish new block formatting contexts for their contents."
#[derive(Debug, Clone, Default)]
pub struct BlockFormattingContext {
    /// Margin boxes of placed left floats, in placement order.
    left_floats: Vec<Rect>,
    /// Margin boxes of placed right floats, in placement order.
    right_floats: Vec<Rect>,
    /// Absolute x of the context origin.
    x: f32,
    /// Absolute y of the context origin.
    y: f32,
    /// Vertical offset of this context within its parent context.
    local_y: f32,
}

impl BlockFormattingContext {
    /// Create an empty formatting context at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left_floats: Vec::new(),
            right_floats: Vec::new(),
            x: 0.0,
            y: 0.0,
            local_y: 0.0,
        }
    }

    /// Set the absolute position of the context origin.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Set the vertical offset of this context within its parent.
    pub fn set_local_y(&mut self, local_y: f32) {
        self.local_y = local_y;
    }

    /// Absolute x of the context origin.
    #[must_use]
    pub const fn get_x(&self) -> f32 {
        self.x
    }

    /// Absolute y of the context origin.
    #[must_use]
    pub const fn get_y(&self) -> f32 {
        self.y
    }

    /// Vertical offset of this context within its parent context.
    #[must_use]
    pub const fn get_local_y(&self) -> f32 {
        self.local_y
    }

    /// Rightmost right-edge of left floats overlapping the band
    /// `[y, y + height)`, floored at `x_start`.
    fn left_bound(&self, x_start: f32, y: f32, height: f32) -> f32 {
        let band_bottom = y + height;
        let mut edge = x_start;
        for f in &self.left_floats {
            if f.y < band_bottom && f.bottom() > y && f.right() > edge {
                edge = f.right();
            }
        }
        edge
    }

    /// Leftmost left-edge of right floats overlapping the band
    /// `[y, y + height)`, capped at `x_end`.
    fn right_bound(&self, x_end: f32, y: f32, height: f32) -> f32 {
        let band_bottom = y + height;
        let mut edge = x_end;
        for f in &self.right_floats {
            if f.y < band_bottom && f.bottom() > y && f.x < edge {
                edge = f.x;
            }
        }
        edge
    }

    /// Find the smallest float bottom edge that is strictly greater than
    /// `y`. Used to scan downward band by band instead of pixel by pixel.
    fn next_float_bottom_after(&self, y: f32) -> Option<f32> {
        let mut next: Option<f32> = None;
        for f in self.left_floats.iter().chain(self.right_floats.iter()) {
            let bottom = f.bottom();
            if bottom > y && next.is_none_or(|n| bottom < n) {
                next = Some(bottom);
            }
        }
        next
    }

    /// [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "The width of a line box is determined by a containing block and
    /// the presence of floats."
    ///
    /// Find the widest horizontal band for a line at or below `y`, within
    /// `[x_start, x_end]`, that is at least `min_width` wide. Scans past
    /// float bottoms until the band fits; if no band below the floats fits
    /// either, the last (unobstructed) band is returned and the content
    /// overflows.
    #[must_use]
    pub fn find_line_box(
        &self,
        x_start: f32,
        x_end: f32,
        y: f32,
        min_height: f32,
        min_width: f32,
    ) -> Rect {
        let mut y = y;
        loop {
            let left = self.left_bound(x_start, y, min_height);
            let right = self.right_bound(x_end, y, min_height);
            if right - left >= min_width {
                return Rect::new(left, y, (right - left).max(0.0), min_height);
            }
            match self.next_float_bottom_after(y) {
                Some(next) => y = next,
                // No floats constrain the band below this point; keep the
                // full span and let the segment overflow.
                None => return Rect::new(left, y, (right - left).max(0.0), min_height),
            }
        }
    }

    /// [§ 9.5.1 Rule 9](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// "A left-floating box must be put as far to the left as possible...
    /// a higher position is preferred over one that is further to the
    /// left/right."
    ///
    /// Place and register a left float. `rect` arrives at the candidate
    /// flow position; `limit` is the x coordinate its right edge may not
    /// cross while other placements still fit.
    pub fn float_left(&mut self, rect: Rect, limit: f32) -> Rect {
        let placed = self.place_band(rect, limit, false);
        self.left_floats.push(placed);
        placed
    }

    /// [§ 9.5.1 Rule 9](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// "An analogous rule holds for right-floating elements."
    ///
    /// Place and register a right float against the right edge `limit`.
    pub fn float_right(&mut self, rect: Rect, limit: f32) -> Rect {
        let placed = self.place_band(rect, limit, true);
        self.right_floats.push(placed);
        placed
    }

    /// Place and register a right float while the container width is still
    /// being measured (shrink-to-fit). The float is packed leftward like a
    /// left float, so its right edge contributes the container's needed
    /// width, but it is registered in the right-float band.
    pub fn float_right_shrink_to_fit(&mut self, rect: Rect, limit: f32) -> Rect {
        let placed = self.place_band(rect, limit, false);
        self.right_floats.push(placed);
        placed
    }

    /// [§ 9.5.1 Rules 2, 3, 7](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a box as high as possible at or below its given y, between
    /// the active float bands, without registering it as a float. Used for
    /// block-level formatting roots that sit next to floats.
    pub fn place_left(&mut self, rect: Rect, limit: f32) -> Rect {
        self.place_band(rect, limit, false)
    }

    /// Shared band-scanning placement.
    ///
    /// Scans downward from `rect.y` to the first band wide enough for
    /// `rect.width` between the float edges and `limit`; if no band below
    /// all floats fits, the box is placed at the last band anyway and
    /// overflows (a float wider than its containing block still gets
    /// placed).
    fn place_band(&self, rect: Rect, limit: f32, align_right: bool) -> Rect {
        let mut y = rect.y;
        loop {
            let left = self.left_bound(rect.x.min(limit), y, rect.height);
            let right = self.right_bound(limit, y, rect.height);
            let fits = right - left >= rect.width;
            if fits || self.next_float_bottom_after(y).is_none() {
                let x = if align_right {
                    (right - rect.width).max(left)
                } else {
                    left
                };
                return Rect::new(x, y, rect.width, rect.height);
            }
            // Unwrap is safe: the branch above returns when there is no
            // next float bottom.
            y = self.next_float_bottom_after(y).unwrap_or(y);
        }
    }

    /// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// "Requires that the top border edge of the box be below the bottom
    /// outer edge of any left-floating boxes."
    ///
    /// The y below every placed left float.
    #[must_use]
    pub fn find_left_clearance(&self) -> f32 {
        self.left_floats
            .iter()
            .map(Rect::bottom)
            .fold(0.0_f32, f32::max)
    }

    /// [§ 9.5.2](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// The y below every placed right float.
    #[must_use]
    pub fn find_right_clearance(&self) -> f32 {
        self.right_floats
            .iter()
            .map(Rect::bottom)
            .fold(0.0_f32, f32::max)
    }

    /// The bottom edge of the lowest placed float, used by the enclosing
    /// block to extend its height past floated content.
    #[must_use]
    pub fn max_float_bottom(&self) -> f32 {
        self.find_left_clearance().max(self.find_right_clearance())
    }

    /// Forget all placed floats (called between strategy passes).
    pub fn clear_floats(&mut self) {
        self.left_floats.clear();
        self.right_floats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_box_unconstrained() {
        let fc = BlockFormattingContext::new();
        let band = fc.find_line_box(0.0, 200.0, 0.0, 1.0, 50.0);
        assert_eq!(band, Rect::new(0.0, 0.0, 200.0, 1.0));
    }

    #[test]
    fn test_line_box_narrowed_by_left_float() {
        let mut fc = BlockFormattingContext::new();
        let placed = fc.float_left(Rect::new(0.0, 0.0, 50.0, 40.0), 200.0);
        assert_eq!(placed, Rect::new(0.0, 0.0, 50.0, 40.0));

        let band = fc.find_line_box(0.0, 200.0, 0.0, 1.0, 10.0);
        assert!((band.x - 50.0).abs() < 0.01);
        assert!((band.width - 150.0).abs() < 0.01);
    }

    #[test]
    fn test_line_box_drops_below_floats_when_too_narrow() {
        let mut fc = BlockFormattingContext::new();
        let _ = fc.float_left(Rect::new(0.0, 0.0, 150.0, 40.0), 200.0);

        // 100px cannot fit beside the float; the band moves below it.
        let band = fc.find_line_box(0.0, 200.0, 0.0, 1.0, 100.0);
        assert!((band.y - 40.0).abs() < 0.01);
        assert!((band.x - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_second_left_float_stacks_beside() {
        let mut fc = BlockFormattingContext::new();
        let _ = fc.float_left(Rect::new(0.0, 0.0, 50.0, 40.0), 200.0);
        let second = fc.float_left(Rect::new(0.0, 0.0, 60.0, 20.0), 200.0);
        assert_eq!(second, Rect::new(50.0, 0.0, 60.0, 20.0));
    }

    #[test]
    fn test_right_float_aligns_to_right_edge() {
        let mut fc = BlockFormattingContext::new();
        let placed = fc.float_right(Rect::new(150.0, 0.0, 50.0, 40.0), 200.0);
        assert_eq!(placed, Rect::new(150.0, 0.0, 50.0, 40.0));
    }

    #[test]
    fn test_clearances_track_float_bottoms() {
        let mut fc = BlockFormattingContext::new();
        let _ = fc.float_left(Rect::new(0.0, 0.0, 50.0, 40.0), 200.0);
        let _ = fc.float_right(Rect::new(150.0, 0.0, 50.0, 70.0), 200.0);
        assert!((fc.find_left_clearance() - 40.0).abs() < 0.01);
        assert!((fc.find_right_clearance() - 70.0).abs() < 0.01);
        assert!((fc.max_float_bottom() - 70.0).abs() < 0.01);
    }

    #[test]
    fn test_place_left_does_not_register() {
        let mut fc = BlockFormattingContext::new();
        let placed = fc.place_left(Rect::new(0.0, 0.0, 100.0, 30.0), 200.0);
        assert_eq!(placed, Rect::new(0.0, 0.0, 100.0, 30.0));
        assert!((fc.find_left_clearance() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_oversized_float_still_places() {
        let mut fc = BlockFormattingContext::new();
        let placed = fc.float_left(Rect::new(0.0, 0.0, 500.0, 40.0), 200.0);
        assert_eq!(placed, Rect::new(0.0, 0.0, 500.0, 40.0));
    }
}
