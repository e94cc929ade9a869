//! CSS Stacking Contexts.
//!
//! [§ 9.9 Layered presentation](https://www.w3.org/TR/CSS2/visuren.html#layers)
//!
//! "An element in CSS 2 may have a stack level, which describes its position
//! within a set of elements sharing the same stacking context."
//!
//! [CSS 2.1 Appendix E: Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The render walkers partition their work by stacking context membership:
//! content in a different stacking context is never painted inline with
//! this one, and level-0 out-of-context roots are dispatched to their own
//! ordered render routine instead.

/// A type-safe index into the stacking context tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackingContextId(pub usize);

/// A stacking context in the CSS painting order.
///
/// [§ Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
///
/// "Each box belongs to one stacking context. Each positioned box in a
/// given stacking context has an integer stack level, which is its position
/// on the z-axis relative to other stack levels within the same stacking
/// context."
#[derive(Debug, Clone)]
pub struct StackingContext {
    /// The stack level of this context (from z-index; 0 for 'auto').
    pub level: i32,
    /// The enclosing stacking context, if any (the root context has none).
    pub parent: Option<StackingContextId>,
}

/// Arena of stacking contexts for one layout pass.
#[derive(Debug, Clone, Default)]
pub struct StackingContextTree {
    contexts: Vec<StackingContext>,
}

impl StackingContextTree {
    /// Create a tree containing only the root stacking context.
    ///
    /// "The root element forms the root stacking context."
    #[must_use]
    pub fn with_root() -> Self {
        Self {
            contexts: vec![StackingContext {
                level: 0,
                parent: None,
            }],
        }
    }

    /// The root stacking context.
    #[must_use]
    pub const fn root(&self) -> StackingContextId {
        StackingContextId(0)
    }

    /// Allocate a child stacking context at the given stack level.
    pub fn push_context(&mut self, parent: StackingContextId, level: i32) -> StackingContextId {
        let id = StackingContextId(self.contexts.len());
        self.contexts.push(StackingContext {
            level,
            parent: Some(parent),
        });
        id
    }

    /// The stack level of a context.
    ///
    /// # Panics
    /// Panics on a dangling ID; stacking contexts are created internally
    /// and a dangling ID indicates a bug in this subsystem.
    #[must_use]
    pub fn level(&self, id: StackingContextId) -> i32 {
        self.contexts[id.0].level
    }

    /// The parent of a context.
    #[must_use]
    pub fn parent(&self, id: StackingContextId) -> Option<StackingContextId> {
        self.contexts.get(id.0).and_then(|c| c.parent)
    }
}
