//! Glyph metrics providers and the per-layout font cache.
//!
//! The layout engine never rasterizes. It asks a [`GlyphMetrics`] provider
//! for advances and vertical extents of a (resolved) character style and
//! memoizes the answers per style in a [`FontCache`].
//!
//! Two providers ship with the crate:
//!
//! - [`MonospaceMetrics`]: fixed advance, height and descent, scaled by font size
//! - [`CellMetrics`]: terminal cells measured with `unicode-width`
//!
//! # Examples
//!
//! ```
//! use richlayout::{CharStyle, GlyphMetrics, MonospaceMetrics};
//!
//! let metrics = MonospaceMetrics::new(10, 16, 4);
//! assert_eq!(metrics.measure(&CharStyle::new().resolved(), "abc"), 30);
//! // Twice the default size, twice the advance.
//! assert_eq!(metrics.measure(&CharStyle::sized(32).resolved(), "abc"), 60);
//! ```

use crate::style::{CharStyle, DEFAULT_FONT_SIZE};
use crate::unicode::{WidthMethod, char_columns, str_columns};
use std::collections::HashMap;
use std::sync::Arc;

/// Glyph drawn (and measured) in place of an unsupported control character.
pub const PLACEHOLDER_GLYPH: char = '\u{25A1}';

/// Measurement interface to the font system.
///
/// Styles passed in are always resolved (no base style). Answers must be
/// stable for equal styles: the layout caches them.
pub trait GlyphMetrics {
    /// Line height (ascent plus descent) for `style`.
    fn height_of(&self, style: &CharStyle) -> i32;

    /// Distance from the baseline to the bottom of the line.
    fn descent_of(&self, style: &CharStyle) -> i32;

    /// Advance widths of the characters U+0000..U+00FF.
    fn widths_of(&self, style: &CharStyle) -> [i32; 256];

    /// Advance width of an arbitrary run of characters.
    fn measure(&self, style: &CharStyle, text: &str) -> i32;
}

/// Everything the scanner needs to know about one resolved style.
#[derive(Debug)]
pub struct FontInfo {
    style: CharStyle,
    widths: [i32; 256],
    height: i32,
    descent: i32,
    tab: i32,
    placeholder: i32,
}

impl FontInfo {
    /// Query `metrics` for a resolved style.
    pub fn load<M: GlyphMetrics + ?Sized>(metrics: &M, style: CharStyle, tab_columns: u8) -> Self {
        let widths = metrics.widths_of(&style);
        let height = metrics.height_of(&style).max(0);
        let descent = metrics.descent_of(&style).clamp(0, height);
        let mut buf = [0u8; 4];
        let placeholder = metrics.measure(&style, PLACEHOLDER_GLYPH.encode_utf8(&mut buf));
        Self {
            tab: widths[usize::from(b' ')] * i32::from(tab_columns),
            widths,
            height,
            descent,
            placeholder,
            style,
        }
    }

    /// The resolved style this font was loaded for.
    #[must_use]
    pub const fn style(&self) -> &CharStyle {
        &self.style
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub const fn descent(&self) -> i32 {
        self.descent
    }

    #[must_use]
    pub const fn ascent(&self) -> i32 {
        self.height - self.descent
    }

    /// Font-derived tab width.
    #[must_use]
    pub const fn tab_width(&self) -> i32 {
        self.tab
    }

    #[must_use]
    pub const fn placeholder_width(&self) -> i32 {
        self.placeholder
    }

    /// Advance of `ch`, using the width table for low code points.
    pub fn advance<M: GlyphMetrics + ?Sized>(&self, metrics: &M, ch: char) -> i32 {
        match u8::try_from(u32::from(ch)) {
            Ok(low) => self.widths[usize::from(low)],
            Err(_) => {
                let mut buf = [0u8; 4];
                metrics.measure(&self.style, ch.encode_utf8(&mut buf))
            }
        }
    }
}

/// Memoized [`FontInfo`] per resolved style.
#[derive(Debug)]
pub struct FontCache {
    fonts: HashMap<CharStyle, Arc<FontInfo>>,
    tab_columns: u8,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new(4)
    }
}

impl FontCache {
    #[must_use]
    pub fn new(tab_columns: u8) -> Self {
        Self {
            fonts: HashMap::new(),
            tab_columns,
        }
    }

    /// Font for `style`, loading it on first use.
    pub fn font<M: GlyphMetrics + ?Sized>(&mut self, metrics: &M, style: &CharStyle) -> Arc<FontInfo> {
        let resolved = style.resolved();
        if let Some(font) = self.fonts.get(&resolved) {
            return Arc::clone(font);
        }
        let font = Arc::new(FontInfo::load(metrics, resolved.clone(), self.tab_columns));
        self.fonts.insert(resolved, Arc::clone(&font));
        font
    }

    /// Tab width in spaces used for font-derived tab stops.
    #[must_use]
    pub const fn tab_columns(&self) -> u8 {
        self.tab_columns
    }

    /// Number of distinct fonts loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Forget every loaded font (e.g. after the metrics provider changed).
    pub fn clear(&mut self) {
        self.fonts.clear();
    }
}

/// Fixed-pitch metrics: every character has the same advance.
///
/// Values are given for [`DEFAULT_FONT_SIZE`] and scale linearly with the
/// effective font size of the style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonospaceMetrics {
    advance: i32,
    height: i32,
    descent: i32,
}

impl MonospaceMetrics {
    #[must_use]
    pub const fn new(advance: i32, height: i32, descent: i32) -> Self {
        Self {
            advance,
            height,
            descent,
        }
    }

    fn scale(value: i32, style: &CharStyle) -> i32 {
        value * i32::from(style.effective_font_size()) / i32::from(DEFAULT_FONT_SIZE)
    }

    fn advance_for(&self, style: &CharStyle) -> i32 {
        Self::scale(self.advance, style)
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn height_of(&self, style: &CharStyle) -> i32 {
        Self::scale(self.height, style)
    }

    fn descent_of(&self, style: &CharStyle) -> i32 {
        Self::scale(self.descent, style)
    }

    fn widths_of(&self, style: &CharStyle) -> [i32; 256] {
        [self.advance_for(style); 256]
    }

    fn measure(&self, style: &CharStyle, text: &str) -> i32 {
        let count = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        count.saturating_mul(self.advance_for(style))
    }
}

/// Terminal cell metrics: one unit per column, one unit per line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellMetrics {
    method: WidthMethod,
}

impl CellMetrics {
    #[must_use]
    pub const fn new(method: WidthMethod) -> Self {
        Self { method }
    }

    #[must_use]
    pub const fn method(&self) -> WidthMethod {
        self.method
    }
}

impl GlyphMetrics for CellMetrics {
    fn height_of(&self, _style: &CharStyle) -> i32 {
        1
    }

    fn descent_of(&self, _style: &CharStyle) -> i32 {
        0
    }

    fn widths_of(&self, _style: &CharStyle) -> [i32; 256] {
        let mut widths = [0; 256];
        for (code, width) in (0u8..=255).zip(widths.iter_mut()) {
            *width = char_columns(char::from(code), self.method) as i32;
        }
        widths
    }

    fn measure(&self, _style: &CharStyle, text: &str) -> i32 {
        i32::try_from(str_columns(text, self.method)).unwrap_or(i32::MAX)
    }
}
