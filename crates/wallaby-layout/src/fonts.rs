//! Font measurement interface for inline layout.
//!
//! [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
//!
//! "CSS assumes that every font has font metrics that specify a
//! characteristic height above the baseline and a depth below it."
//!
//! The layout engine never loads fonts itself: it asks a [`ResourceCache`]
//! collaborator for a [`Font`] per computed style and measures text
//! fragments through it. Every call is treated as idempotent and pure for
//! a given style and string, so the collaborator is free to cache.

use wallaby_boxtree::style::ComputedValues;
use wallaby_common::WallabyError;

use crate::geometry::Size;

/// Vertical font metrics.
///
/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FontMetrics {
    /// Height above the baseline.
    pub ascent: f32,
    /// Depth below the baseline.
    pub descent: f32,
}

/// A resolved font, ready to measure text.
///
/// Implementors provide the actual per-glyph advance widths and vertical
/// metrics needed for inline layout. The layout engine calls these methods
/// to measure text for line breaking and fragment placement.
pub trait Font {
    /// Measure the total advance size of a text string.
    ///
    /// This should sum the advance width of each glyph in the string,
    /// matching the cursor advancement used during text rendering.
    fn text_size(&self, text: &str) -> Size;

    /// The font's vertical metrics.
    fn font_metrics(&self) -> FontMetrics;
}

/// The resource collaborator that resolves fonts for computed styles.
///
/// Results may be cached by the collaborator; the layout engine treats
/// each call as pure for a given style.
pub trait ResourceCache {
    /// Resolve a font for the given computed style.
    ///
    /// # Errors
    /// Returns [`WallabyError::FontNotFound`] if no font can satisfy the
    /// style. The layout engine has no fallback logic and propagates the
    /// error to its caller unchanged.
    fn get_font(&self, style: &ComputedValues) -> Result<Box<dyn Font + '_>, WallabyError>;
}

/// Approximate font metrics using fixed ratios.
///
/// Implementation note: Without access to actual font data, we use fixed
/// ratio approximations. The average advance width of Latin glyphs in a
/// proportional font is approximately 0.6× the font size (typical for
/// Helvetica/Arial body text); ascent and descent split the em square
/// 80/20. This is used as a fallback when no font backend is wired up,
/// and in tests.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateFont {
    font_size: f32,
}

impl ApproximateFont {
    /// Create an approximate font at the given size.
    #[must_use]
    pub const fn new(font_size: f32) -> Self {
        Self { font_size }
    }
}

impl Font for ApproximateFont {
    fn text_size(&self, text: &str) -> Size {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        let metrics = self.font_metrics();
        Size {
            width: text.chars().count() as f32 * self.font_size * CHAR_WIDTH_RATIO,
            height: metrics.ascent + metrics.descent,
        }
    }

    fn font_metrics(&self) -> FontMetrics {
        const ASCENT_RATIO: f32 = 0.8;
        const DESCENT_RATIO: f32 = 0.2;
        FontMetrics {
            ascent: self.font_size * ASCENT_RATIO,
            descent: self.font_size * DESCENT_RATIO,
        }
    }
}

/// A [`ResourceCache`] that hands out [`ApproximateFont`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateResourceCache;

impl ResourceCache for ApproximateResourceCache {
    fn get_font(&self, style: &ComputedValues) -> Result<Box<dyn Font + '_>, WallabyError> {
        Ok(Box::new(ApproximateFont::new(style.font_size)))
    }
}
