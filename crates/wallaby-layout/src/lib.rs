//! CSS inline formatting context layout for the Wallaby renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Generated Box Tree** ([§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Per-pass arena of line fragments with index links
//!   - Document-order cursor shared by every traversal
//!
//! - **Linebreak Opportunity Scanner** ([§ 5.5 Line Breaking](https://www.w3.org/TR/css-text-3/#line-breaking))
//!   - Soft wrap opportunities after collapsed space runs
//!   - Hard breaks at preserved newlines
//!   - Block-level boundaries as forced breaks
//!
//! - **Line Builder** ([§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Greedy consumption of break opportunities against float-aware
//!     line boxes
//!   - Float placement interleaved with line construction
//!   - Minimum / preferred / normal width strategies for shrink-to-fit
//!     sizing
//!
//! - **Line Aligner / Justifier** ([§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop))
//!   - Uniform offsets for right/center alignment
//!   - Word-level space redistribution with in-place fragment splitting
//!
//! - **Float / Inline-Block Pre-Layout** ([§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats))
//!   - Document-order pre-layout feeding shrink-to-fit width growth
//!
//! - **Render Walkers** ([CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html))
//!   - Background/border, non-inline, float, inline, and positioned
//!     passes over the line forest, partitioned by stacking context
//!
//! # Not Implemented
//!
//! - Bidirectional text and vertical writing modes
//! - Ruby and multi-column layout
//! - Character-level emergency breaking of unbreakable segments
//! - Table formatting internals (tables are opaque nested contexts)

/// Line alignment and justification per [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop).
pub mod align;
/// Linebreak opportunity scanning per [§ 5.5 Line Breaking](https://www.w3.org/TR/css-text-3/#line-breaking).
pub mod breaks;
/// Display list output per [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html).
pub mod display_list;
/// Float bands and line-box queries per [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats).
pub mod float;
/// Font measurement seam per [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height).
pub mod fonts;
/// The generated box arena and inline cursor.
pub mod generated;
/// Geometry primitives.
pub mod geometry;
/// Line construction for inline formatting contexts per [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting).
pub mod inline;
/// The seam to nested block and atomic formatting contexts.
pub mod node;
/// Render walkers per [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order).
pub mod render;
/// Stacking contexts per [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers).
pub mod stacking;
/// Constraint records, strategies, and the flow cursor.
pub mod values;

// Re-exports for convenience
pub use breaks::{create_linebreak_opportunities, should_break_at_end_of_spaces, LinebreakOpportunity};
pub use display_list::{DisplayCommand, DisplayList};
pub use float::BlockFormattingContext;
pub use fonts::{ApproximateFont, ApproximateResourceCache, Font, FontMetrics, ResourceCache};
pub use generated::{BoxArena, GeneratedBox, GeneratedBoxId, InlinePosition};
pub use geometry::{Rect, Size};
pub use inline::InlineLayout;
pub use node::{LayoutNode, LayoutNodeId, LayoutNodeSlab};
pub use stacking::{StackingContext, StackingContextId, StackingContextTree};
pub use values::{ConstraintHeight, ConstraintWidth, LayoutCursor, LayoutStrategy};
