//! Width/height constraint records, layout strategies, and the flow cursor.
//!
//! [§ 10 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)

/// The sizing pass being performed.
///
/// [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "the shrink-to-fit width is: min(max(preferred minimum width,
/// available width), preferred width)."
///
/// Intrinsic width bounds are measured by re-running layout under the
/// `Minimum` and `Preferred` strategies before the final `Normal` pass.
/// Callers must run the intrinsic passes first when a container has an
/// expanding (shrink-to-fit) width: the `Normal` pass reads the
/// `width.value` those passes grew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LayoutStrategy {
    /// Real wrapping against the given width constraint.
    Normal,
    /// Measure the preferred minimum (min-content) width: every line
    /// keeps only its first segment.
    Minimum,
    /// Measure the preferred (max-content) width: segments never wrap.
    Preferred,
}

/// The width constraint handed to a layout pass.
///
/// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
///
/// When `expanding` is set the container is sized shrink-to-fit: intrinsic
/// passes grow `value` monotonically and never shrink it within a pass.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConstraintWidth {
    /// The used width in pixels (or the width grown so far, if expanding).
    pub value: f32,
    /// True if the width is shrink-to-fit rather than fixed.
    pub expanding: bool,
}

impl ConstraintWidth {
    /// A fixed width constraint.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self {
            value,
            expanding: false,
        }
    }

    /// A shrink-to-fit width constraint, starting from zero.
    #[must_use]
    pub const fn expanding() -> Self {
        Self {
            value: 0.0,
            expanding: true,
        }
    }
}

/// The height constraint handed to a layout pass.
///
/// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConstraintHeight {
    /// The used height in pixels (meaningful when `use_content` is false,
    /// or after layout when it is true).
    pub value: f32,
    /// True if the height is driven by content ('height: auto').
    pub use_content: bool,
}

impl ConstraintHeight {
    /// A content-driven ('auto') height.
    #[must_use]
    pub const fn auto() -> Self {
        Self {
            value: 0.0,
            use_content: true,
        }
    }

    /// A fixed height constraint.
    #[must_use]
    pub const fn fixed(value: f32) -> Self {
        Self {
            value,
            use_content: false,
        }
    }
}

/// The flow cursor threaded through a block formatting context.
///
/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// "In a block formatting context, boxes are laid out one after the
/// other, vertically, beginning at the top of a containing block."
///
/// Margins waiting to collapse are accumulated separately from `y`
/// ([§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)):
/// line boxes and cleared floats apply the pending margin before using
/// the cursor position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutCursor {
    /// Current x position (the content left edge of the container).
    pub x: f32,
    /// Current y position in the flow.
    pub y: f32,
    /// Margin accumulated since the last in-flow content, not yet
    /// applied to `y`.
    margin: f32,
}

impl LayoutCursor {
    /// Create a cursor at the given content origin.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, margin: 0.0 }
    }

    /// The margin currently pending collapse.
    #[must_use]
    pub const fn total_margin(&self) -> f32 {
        self.margin
    }

    /// Accumulate a margin that may still collapse with a following one.
    pub fn add_margin(&mut self, margin: f32) {
        self.margin = self.margin.max(margin);
    }

    /// Commit the pending margin: in-flow content is about to be placed.
    pub fn apply_margin(&mut self) {
        self.y += self.margin;
        self.margin = 0.0;
    }
}
