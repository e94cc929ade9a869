//! Styled box tree consumed by the Wallaby layout engine.
//!
//! This crate provides the arena-based box tree that the inline layout
//! engine takes as input, following the box generation model of
//! [CSS 2.1 § 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen).
//!
//! # Design
//!
//! The tree uses arena allocation with [`BoxNodeId`] indices for all
//! relationships, providing O(1) access and traversal without borrow
//! checker issues. Each node is either a text run (whitespace-processed
//! string plus computed style) or an element (computed style plus child
//! boxes). The tree is produced by the box-generation collaborator and is
//! strictly read-only during layout.

pub mod style;

pub use style::ComputedValues;

/// A type-safe index into the box tree.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// "Each box is associated with its generating element."
///
/// `BoxNodeId` provides O(1) access to any box in the tree without
/// borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxNodeId(pub usize);

/// A text run in the box tree.
///
/// [§ 2.5 Text Runs](https://www.w3.org/TR/css-display-3/#text-nodes)
///
/// "A text run is the most basic box generated."
#[derive(Debug, Clone)]
pub struct TextBox {
    /// The text content after white-space processing phase one
    /// ([§ 4.1.1](https://www.w3.org/TR/css-text-3/#white-space-phase-1)):
    /// collapsible whitespace sequences are already reduced to single
    /// spaces, preserved newlines remain as `\n`.
    pub processed_text: String,
    /// Computed style of the text run (inherited from its parent element).
    pub style: ComputedValues,
}

/// An element box in the box tree.
///
/// [§ 9.2 Principal box](https://www.w3.org/TR/css-display-3/#principal-box)
///
/// "Most elements generate a single principal box."
#[derive(Debug, Clone)]
pub struct ElementBox {
    /// Computed style of the element.
    pub style: ComputedValues,
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "A replaced element is an element whose content is outside the scope
    /// of the CSS formatting model, such as an image."
    pub replaced: bool,
}

/// The kind of a box node: a closed sum over text runs and elements.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
#[derive(Debug, Clone)]
pub enum BoxNodeKind {
    /// A text run.
    Text(TextBox),
    /// An element box.
    Element(ElementBox),
}

/// A node in the box tree with its structural links.
///
/// Links are indices, enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct BoxNode {
    /// The node payload (text run or element).
    pub kind: BoxNodeKind,
    /// Parent box, if any.
    pub parent: Option<BoxNodeId>,
    /// Child boxes in document order.
    pub children: Vec<BoxNodeId>,
    /// Next sibling in document order.
    pub next_sibling: Option<BoxNodeId>,
    /// Previous sibling in document order.
    pub prev_sibling: Option<BoxNodeId>,
}

/// Arena-based box tree with O(1) node access and traversal.
///
/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// This structure stores all boxes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any box by `BoxNodeId`
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    /// All nodes in the tree, indexed by `BoxNodeId`.
    nodes: Vec<BoxNode>,
}

impl BoxTree {
    /// Create an empty box tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: BoxNodeId) -> Option<&BoxNode> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, kind: BoxNodeKind) -> BoxNodeId {
        let id = BoxNodeId(self.nodes.len());
        self.nodes.push(BoxNode {
            kind,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Allocate an element box with the given style.
    pub fn alloc_element(&mut self, style: ComputedValues) -> BoxNodeId {
        self.alloc(BoxNodeKind::Element(ElementBox {
            style,
            replaced: false,
        }))
    }

    /// Allocate a replaced element box with the given style.
    pub fn alloc_replaced(&mut self, style: ComputedValues) -> BoxNodeId {
        self.alloc(BoxNodeKind::Element(ElementBox {
            style,
            replaced: true,
        }))
    }

    /// Allocate a text run with the given processed text and style.
    pub fn alloc_text(&mut self, processed_text: impl Into<String>, style: ComputedValues) -> BoxNodeId {
        self.alloc(BoxNodeKind::Text(TextBox {
            processed_text: processed_text.into(),
            style,
        }))
    }

    /// Appends `child` as the last child of `parent`, updating all
    /// relationships.
    pub fn append_child(&mut self, parent: BoxNodeId, child: BoxNodeId) {
        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        // Update parent's children list
        self.nodes[parent.0].children.push(child);

        // Set child's parent
        self.nodes[child.0].parent = Some(parent);

        // Set up sibling links
        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: BoxNodeId) -> Option<BoxNodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: BoxNodeId) -> &[BoxNodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: BoxNodeId) -> Option<BoxNodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: BoxNodeId) -> Option<BoxNodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the text run data if this node is a text run.
    #[must_use]
    pub fn as_text(&self, id: BoxNodeId) -> Option<&TextBox> {
        self.get(id).and_then(|n| match &n.kind {
            BoxNodeKind::Text(t) => Some(t),
            BoxNodeKind::Element(_) => None,
        })
    }

    /// Get the element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: BoxNodeId) -> Option<&ElementBox> {
        self.get(id).and_then(|n| match &n.kind {
            BoxNodeKind::Element(e) => Some(e),
            BoxNodeKind::Text(_) => None,
        })
    }

    /// Get the computed style of a node, regardless of its kind.
    ///
    /// # Panics
    /// Panics if `id` is not a node of this tree; the box tree is built by
    /// the box-generation collaborator and dangling IDs indicate a bug.
    #[must_use]
    pub fn style(&self, id: BoxNodeId) -> &ComputedValues {
        match &self.nodes[id.0].kind {
            BoxNodeKind::Text(t) => &t.style,
            BoxNodeKind::Element(e) => &e.style,
        }
    }

    /// True if the node is a replaced element.
    #[must_use]
    pub fn is_replaced(&self, id: BoxNodeId) -> bool {
        self.as_element(id).is_some_and(|e| e.replaced)
    }
}
