//! Computed style values consumed during inline layout.
//!
//! [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! "The computed value is the result of resolving the specified value...
//! as far as possible without laying out the document."
//!
//! This is the property subset the inline layout engine reads. The cascade
//! and style computation live in an upstream collaborator; everything here
//! arrives pre-validated.

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
///
/// "Values of this property have the following meanings:
///
/// block
///   This value causes an element to generate a principal block box.
///
/// inline
///   This value causes an element to generate one or more inline boxes.
///
/// inline-block
///   This value causes an element to generate a principal inline-level
///   block container."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Display {
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate a principal block box."
    Block,
    /// "A principal inline-level block container."
    InlineBlock,
}

/// [§ 9.5.1 Positioning the float: the 'float' property](https://www.w3.org/TR/CSS2/visuren.html#float-position)
///
/// "This property specifies whether a box should float to the left, right,
/// or not at all."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Float {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
///
/// "This property indicates which sides of an element's box(es) may not
/// be adjacent to an earlier floating box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Clear {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// "Requires the top border edge be below any left-floating boxes."
    Left,
    /// "Requires the top border edge be below any right-floating boxes."
    Right,
    /// "Requires the top border edge be below any floating boxes."
    Both,
}

/// [§ 9.3.1 Choosing a positioning scheme: 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
///
/// "The 'position' and 'float' properties determine which of the CSS 2
/// positioning algorithms is used to calculate the position of a box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Position {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow...
    /// then the box is offset relative to its normal position."
    Relative,
    /// "The box's position is specified with the offset properties.
    /// The box is removed from the normal flow entirely."
    Absolute,
    /// "The box's position is calculated according to the 'absolute' model,
    /// but in addition, the box is fixed with respect to the viewport."
    Fixed,
}

/// [§ 16.6 White space: the 'white-space' property](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
///
/// "This property declares how white space inside the element is handled."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum WhiteSpace {
    /// "This value directs user agents to collapse sequences of white space,
    /// and break lines as necessary to fill line boxes."
    #[default]
    Normal,
    /// "This value collapses white space as for 'normal', but suppresses
    /// line breaks within text."
    Nowrap,
    /// "This value prevents user agents from collapsing sequences of
    /// white space. Lines are only broken at preserved newline characters."
    Pre,
    /// "This value prevents user agents from collapsing sequences of white
    /// space. Lines are broken... as necessary to fill line boxes."
    PreWrap,
    /// "This value directs user agents to collapse sequences of white space.
    /// Lines are broken at preserved newline characters."
    PreLine,
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
///
/// "This property describes how inline-level content of a block container
/// is aligned."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum TextAlign {
    /// "Aligns content to the left edge of the line box."
    #[default]
    Left,
    /// "Aligns content to the right edge of the line box."
    Right,
    /// "Centers content within the line box."
    Center,
    /// "Content is justified... text should be spaced to line up its left
    /// and right edges to the left and right edges of the line box, except
    /// for the last line."
    Justify,
}

/// [§ 16.1 Indentation: the 'text-indent' property](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
///
/// "This property specifies the indentation of the first line of text in
/// a block container."
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum TextIndent {
    /// "The indentation is a fixed length."
    Length(f32),
    /// "The indentation is a percentage of the containing block width."
    Percentage(f32),
}

impl Default for TextIndent {
    fn default() -> Self {
        Self::Length(0.0)
    }
}

impl TextIndent {
    /// Resolve the indentation against the containing block width.
    #[must_use]
    pub fn to_px(self, containing_width: f32) -> f32 {
        match self {
            Self::Length(px) => px,
            Self::Percentage(pct) => containing_width * pct / 100.0,
        }
    }
}

/// [§ 10.8.1 Leading and half-leading: 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "On a block container element whose content is composed of inline-level
/// elements, 'line-height' specifies the minimal height of line boxes
/// within the element."
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a reasonable value
    /// based on the font of the element."
    #[default]
    Normal,
    /// "The specified length is used in the calculation of the line box
    /// height."
    Length(f32),
    /// "The used value of the property is this number multiplied by the
    /// element's font size."
    Number(f32),
}

/// [§ 11.2 Visibility: the 'visibility' property](https://www.w3.org/TR/CSS2/visufx.html#visibility)
///
/// "The 'visibility' property specifies whether the boxes generated by an
/// element are rendered. Invisible boxes still affect layout."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Visibility {
    /// "The generated box is visible."
    #[default]
    Visible,
    /// "The generated box is invisible (fully transparent, nothing is
    /// drawn), but still affects layout."
    Hidden,
}

/// [§ 11.1.1 Overflow: the 'overflow' property](https://www.w3.org/TR/CSS2/visufx.html#overflow)
///
/// "This property specifies whether content of a block container element
/// is clipped when it overflows the element's box."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum Overflow {
    /// "Content is not clipped, i.e., it may be rendered outside the box."
    #[default]
    Visible,
    /// "Content is clipped and no scrolling mechanism is provided."
    Hidden,
}

/// [§ 9.9.1 Specifying the stack level: the 'z-index' property](https://www.w3.org/TR/CSS2/visuren.html#z-index)
///
/// "For a positioned box, the 'z-index' property specifies the stack level
/// of the box in the current stacking context."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum ZIndex {
    /// "The stack level of the generated box in the current stacking
    /// context is 0."
    #[default]
    Auto,
    /// "This integer is the stack level of the generated box in the
    /// current stacking context."
    Integer(i32),
}

/// An RGBA color value.
///
/// [§ 4 Representing Colors](https://www.w3.org/TR/css-color-4/#color-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque black, the initial value of 'color'.
    pub const BLACK: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Fully transparent, the initial value of 'background-color'.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Whether painting this color would have any effect.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        self.a != 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A length that is either an absolute pixel value or a percentage of the
/// containing block width.
///
/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "The percentage is calculated with respect to the width of the
/// generated box's containing block."
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub enum LengthOrPercent {
    /// An absolute length in pixels.
    Px(f32),
    /// A percentage of the containing block width.
    Percent(f32),
}

impl Default for LengthOrPercent {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl LengthOrPercent {
    /// Resolve against the containing block width.
    #[must_use]
    pub fn to_px(self, containing_width: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => containing_width * pct / 100.0,
        }
    }
}

/// Per-side edge values for margin or padding.
///
/// [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct EdgeValues {
    /// Top edge.
    pub top: LengthOrPercent,
    /// Right edge.
    pub right: LengthOrPercent,
    /// Bottom edge.
    pub bottom: LengthOrPercent,
    /// Left edge.
    pub left: LengthOrPercent,
}

/// Per-side border widths, already resolved to pixels.
///
/// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
///
/// "Unlike margins and paddings, border widths never take percentages."
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct BorderWidths {
    /// Top border width.
    pub top: f32,
    /// Right border width.
    pub right: f32,
    /// Bottom border width.
    pub bottom: f32,
    /// Left border width.
    pub left: f32,
}

/// The computed-property subset the inline layout engine consumes.
///
/// [§ 6 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Produced by the styling collaborator; read-only during layout.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ComputedValues {
    /// [§ 9.2.4 'display'](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    pub display: Display,
    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: Float,
    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: Clear,
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Position,
    /// [§ 16.6 'white-space'](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
    pub white_space: WhiteSpace,
    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    pub text_align: TextAlign,
    /// [§ 16.1 'text-indent'](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
    pub text_indent: TextIndent,
    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    pub line_height: LineHeight,
    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
    ///
    /// Resolved font size in pixels.
    pub font_size: f32,
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property)
    pub color: Color,
    /// [§ 3.10 'background-color'](https://www.w3.org/TR/css-backgrounds-3/#background-color)
    pub background_color: Color,
    /// [§ 8.5.2 Border color](https://www.w3.org/TR/CSS2/box.html#border-color-properties)
    pub border_color: Color,
    /// [§ 11.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
    pub visibility: Visibility,
    /// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    pub overflow: Overflow,
    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index)
    pub z_index: ZIndex,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: EdgeValues,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    pub border_width: BorderWidths,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: EdgeValues,
}

impl Default for ComputedValues {
    fn default() -> Self {
        Self {
            display: Display::default(),
            float: Float::default(),
            clear: Clear::default(),
            position: Position::default(),
            white_space: WhiteSpace::default(),
            text_align: TextAlign::default(),
            text_indent: TextIndent::default(),
            line_height: LineHeight::default(),
            font_size: 16.0,
            color: Color::BLACK,
            background_color: Color::TRANSPARENT,
            border_color: Color::BLACK,
            visibility: Visibility::default(),
            overflow: Overflow::default(),
            z_index: ZIndex::default(),
            margin: EdgeValues::default(),
            border_width: BorderWidths::default(),
            padding: EdgeValues::default(),
        }
    }
}

impl ComputedValues {
    /// [§ 9.5.1](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// True if the box is floated to either side.
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.float != Float::None
    }

    /// [§ 9.2.1 Block-level elements](https://www.w3.org/TR/CSS2/visuren.html#block-level)
    ///
    /// "Block-level elements are those elements of the source document that
    /// are formatted visually as blocks."
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        self.display == Display::Block
    }

    /// [§ 9.2.4](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    ///
    /// True for inline-block boxes (inline-level block containers).
    #[must_use]
    pub fn is_inline_block_level(&self) -> bool {
        self.display == Display::InlineBlock
    }

    /// [§ 9.6 Absolute positioning](https://www.w3.org/TR/CSS2/visuren.html#absolute-positioning)
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.position == Position::Absolute
    }

    /// [§ 9.6.1 Fixed positioning](https://www.w3.org/TR/CSS2/visuren.html#fixed-positioning)
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.position == Position::Fixed
    }

    /// [§ 9.3.1](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    ///
    /// True if 'position' is anything other than 'static'.
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.position != Position::Static
    }

    /// [§ 11.1.1](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    ///
    /// True if overflowing content is rendered outside the box.
    #[must_use]
    pub fn is_overflow_visible(&self) -> bool {
        self.overflow == Overflow::Visible
    }
}
