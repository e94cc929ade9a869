//! The seam between inline layout and nested formatting contexts.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! Every block-level or atomic (replaced / inline-block) box participating
//! in an inline formatting context is represented by a layout node. The
//! inline engine drives these nodes through the narrow [`LayoutNode`]
//! trait: it never looks inside a nested formatting context, it only sizes
//! it, positions it, and asks it to paint its layers.

use wallaby_boxtree::BoxNodeId;
use wallaby_common::WallabyError;

use crate::display_list::DisplayList;
use crate::fonts::ResourceCache;
use crate::geometry::{Rect, Size};
use crate::stacking::StackingContextId;
use crate::values::{ConstraintWidth, LayoutCursor, LayoutStrategy};

/// A type-safe index into a [`LayoutNodeSlab`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutNodeId(pub usize);

/// A nested block-level or atomic box, seen from the inline engine.
///
/// The node owns its geometry results (`block_width`, `block_height`,
/// block position) and a back-reference to its box node. Its lifetime
/// spans one full layout pass of the containing block; it is mutated in
/// place across strategy passes.
pub trait LayoutNode {
    /// The box node this layout node was generated for.
    fn box_node(&self) -> BoxNodeId;

    /// The node's margin-box width after its last layout.
    fn block_width(&self) -> f32;

    /// The node's margin-box height after its last layout.
    fn block_height(&self) -> f32;

    /// Lay the node out as a float / inline-block / replaced element
    /// against the containing width constraint, in isolation from the
    /// surrounding line flow.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn layout_float(
        &mut self,
        cache: &dyn ResourceCache,
        containing: ConstraintWidth,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError>;

    /// Lay the node out in the normal flow at the cursor (block-level
    /// boxes whose overflow is visible).
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn layout_normal(
        &mut self,
        cache: &dyn ResourceCache,
        cursor: &mut LayoutCursor,
        containing: ConstraintWidth,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError>;

    /// Lay the node out as a formatting context root (block-level boxes
    /// that establish a new context, e.g. overflow other than visible).
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn layout_formatting_root(
        &mut self,
        cache: &dyn ResourceCache,
        containing: ConstraintWidth,
        strategy: LayoutStrategy,
    ) -> Result<(), WallabyError>;

    /// Record the node's final position within its formatting context.
    fn set_root_block_position(&mut self, x: f32, y: f32);

    /// Record the static position of an absolute/fixed node discovered
    /// during line construction. Layout of such nodes is deferred to
    /// [`LayoutNode::layout_absolute_or_fixed`] because it may depend on
    /// the container's eventual height.
    fn set_static_position(&mut self, rect: Rect);

    /// Lay out an absolutely positioned or fixed node against its
    /// containing block, after normal flow completed.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn layout_absolute_or_fixed(
        &mut self,
        cache: &dyn ResourceCache,
        containing_block: Rect,
        viewport: Size,
    ) -> Result<(), WallabyError>;

    /// Recurse the deferred absolute/fixed pass into this node's own
    /// content.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn layout_absolute_and_fixed_content(
        &mut self,
        cache: &dyn ResourceCache,
        containing_block: Rect,
        viewport: Size,
    ) -> Result<(), WallabyError>;

    /// The baseline of the node's first line, if it has one, in the
    /// node's own coordinate space.
    fn first_line_baseline(&self) -> Option<f32>;

    /// The baseline of the node's last line, if it has one.
    fn last_line_baseline(&self) -> Option<f32>;

    /// True if the node establishes its own formatting context, in which
    /// case baselines must be offset by [`LayoutNode::local_y`].
    fn is_formatting_context_root(&self) -> bool;

    /// Vertical offset of the node's formatting context within its parent
    /// context.
    fn local_y(&self) -> f32;

    /// True if the node contains no content that would produce output
    /// (used for blank-line suppression in the enclosing flow).
    fn is_empty(&self) -> bool;

    /// True if the node is a replaced element.
    fn is_replaced(&self) -> bool;

    /// The stacking context this node belongs to.
    fn stacking_context(&self) -> StackingContextId;

    /// Paint the node's backgrounds and borders.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_background(&self, list: &mut DisplayList) -> Result<(), WallabyError>;

    /// Paint the node's in-flow, non-inline descendants.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_non_inline(&self, list: &mut DisplayList) -> Result<(), WallabyError>;

    /// Paint the node's floats.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_floats(&self, list: &mut DisplayList) -> Result<(), WallabyError>;

    /// Paint the node's inline content.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_inline(&self, list: &mut DisplayList) -> Result<(), WallabyError>;

    /// Paint the node's positioned descendants, in paint order.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_positioned(&self, list: &mut DisplayList) -> Result<(), WallabyError>;

    /// Paint this node as the root of its own stacking context, running
    /// the full layer sequence of CSS 2.1 Appendix E.
    ///
    /// # Errors
    /// Propagates resource failures from the font collaborator.
    fn render_stacking_root(&self, list: &mut DisplayList) -> Result<(), WallabyError>;
}

/// Slab owning the layout nodes of one inline formatting context.
///
/// Generated boxes reference entries by [`LayoutNodeId`]; the slab lives
/// as long as the inline layout that created it.
#[derive(Default)]
pub struct LayoutNodeSlab {
    nodes: Vec<Box<dyn LayoutNode>>,
}

impl LayoutNodeSlab {
    /// Create an empty slab.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert a layout node and return its ID.
    pub fn insert(&mut self, node: Box<dyn LayoutNode>) -> LayoutNodeId {
        let id = LayoutNodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Borrow a node.
    ///
    /// # Panics
    /// Panics on a dangling ID; layout node IDs are minted by this slab
    /// and a dangling one indicates a bug in this subsystem.
    #[must_use]
    pub fn get(&self, id: LayoutNodeId) -> &dyn LayoutNode {
        self.nodes[id.0].as_ref()
    }

    /// Mutably borrow a node.
    ///
    /// # Panics
    /// Panics on a dangling ID, as for [`LayoutNodeSlab::get`].
    pub fn get_mut(&mut self, id: LayoutNodeId) -> &mut dyn LayoutNode {
        self.nodes[id.0].as_mut()
    }

    /// Number of nodes in the slab.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the slab has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::fmt::Debug for LayoutNodeSlab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutNodeSlab")
            .field("len", &self.nodes.len())
            .finish()
    }
}
