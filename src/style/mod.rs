//! Character and paragraph style value objects.
//!
//! This module provides the immutable values the buffers store in their
//! run arrays:
//!
//! - [`TextAttributes`]: Bitflags for bold, italic, underline, strikethrough
//! - [`CharStyle`]: Per-character overrides composed onto an optional base style
//! - [`StyleModifier`]: Partial transform applied run by run
//! - [`ParagraphStyle`]: Indents, spacing, tabs, alignment, heading and base style
//!
//! Styles compare structurally; two runs holding equal styles are merged.
//!
//! # Examples
//!
//! ```
//! use richlayout::{CharStyle, Rgba, StyleModifier, TextAttributes};
//!
//! let body = CharStyle::builder().font_size(14).fg(Rgba::BLACK).build();
//! let strong = StyleModifier::new().add(TextAttributes::BOLD).apply(&body);
//!
//! assert!(strong.effective_attributes().contains(TextAttributes::BOLD));
//! assert_eq!(strong.font_size, Some(14));
//! ```

mod paragraph;

pub use paragraph::{
    Alignment, Heading, ParagraphStyle, ParagraphStyleBuilder, ParagraphStyleModifier,
};

use crate::color::Rgba;
use bitflags::bitflags;
use std::sync::Arc;

/// Font size used when neither a style nor its base sets one.
pub const DEFAULT_FONT_SIZE: u16 = 16;

bitflags! {
    /// Text rendering attributes (bold, italic, underline, strikethrough).
    ///
    /// Attributes are represented as bitflags and can be combined using
    /// bitwise OR. Bold and italic usually change glyph metrics; the
    /// decorations do not.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TextAttributes: u8 {
        /// Bold/increased weight.
        const BOLD          = 0x01;
        /// Italic.
        const ITALIC        = 0x02;
        /// Underlined text.
        const UNDERLINE     = 0x04;
        /// Strikethrough text.
        const STRIKETHROUGH = 0x08;
    }
}

/// Character style: optional overrides on top of an optional base style.
///
/// `None` fields inherit from the base style (normally the base style of
/// the enclosing paragraph). The buffers keep the base pointer current as
/// paragraph styles change; [`CharStyle::resolved`] produces the effective
/// style that metrics providers and renderers see.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CharStyle {
    /// Font size in pixels (None = inherit).
    pub font_size: Option<u16>,
    /// Rendering attributes (None = inherit).
    pub attributes: Option<TextAttributes>,
    /// Foreground color (None = inherit / renderer default).
    pub fg: Option<Rgba>,
    /// Background color (None = inherit / no background).
    pub bg: Option<Rgba>,
    base: Option<Arc<CharStyle>>,
}

impl CharStyle {
    /// Style with no overrides and no base.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            font_size: None,
            attributes: None,
            fg: None,
            bg: None,
            base: None,
        }
    }

    /// Create a new style builder.
    #[must_use]
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    /// Create a style that only sets the font size.
    #[must_use]
    pub fn sized(font_size: u16) -> Self {
        Self {
            font_size: Some(font_size),
            ..Self::new()
        }
    }

    /// Return a new style with the given font size.
    #[must_use]
    pub fn with_font_size(self, font_size: u16) -> Self {
        Self {
            font_size: Some(font_size),
            ..self
        }
    }

    /// Return a new style with the given attributes.
    #[must_use]
    pub fn with_attributes(self, attributes: TextAttributes) -> Self {
        Self {
            attributes: Some(attributes),
            ..self
        }
    }

    /// Return a new style with the specified foreground color.
    #[must_use]
    pub fn with_fg(self, color: Rgba) -> Self {
        Self {
            fg: Some(color),
            ..self
        }
    }

    /// Return a new style with the specified background color.
    #[must_use]
    pub fn with_bg(self, color: Rgba) -> Self {
        Self {
            bg: Some(color),
            ..self
        }
    }

    /// Return a new style composed onto `base`.
    #[must_use]
    pub fn with_base(self, base: Option<Arc<Self>>) -> Self {
        Self { base, ..self }
    }

    /// The base style this style is composed onto.
    #[must_use]
    pub fn base(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    /// Check whether the style sets no overrides of its own.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.font_size.is_none()
            && self.attributes.is_none()
            && self.fg.is_none()
            && self.bg.is_none()
    }

    /// Effective font size, walking the base chain.
    #[must_use]
    pub fn effective_font_size(&self) -> u16 {
        self.font_size
            .or_else(|| self.base.as_deref().map(Self::effective_font_size))
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Effective attributes, walking the base chain.
    #[must_use]
    pub fn effective_attributes(&self) -> TextAttributes {
        self.attributes
            .or_else(|| self.base.as_deref().map(Self::effective_attributes))
            .unwrap_or_default()
    }

    /// Flatten base-then-override into a style without a base.
    ///
    /// The font size is always materialized so that two resolved styles
    /// that measure the same compare equal.
    #[must_use]
    pub fn resolved(&self) -> Self {
        let mut out = self
            .base
            .as_deref()
            .map_or_else(Self::new, Self::resolved);
        if self.font_size.is_some() {
            out.font_size = self.font_size;
        }
        if self.attributes.is_some() {
            out.attributes = self.attributes;
        }
        if self.fg.is_some() {
            out.fg = self.fg;
        }
        if self.bg.is_some() {
            out.bg = self.bg;
        }
        out.font_size = Some(out.font_size.unwrap_or(DEFAULT_FONT_SIZE));
        out
    }
}

/// Builder for creating character styles fluently.
#[derive(Clone, Debug, Default)]
pub struct StyleBuilder {
    style: CharStyle,
}

impl StyleBuilder {
    /// Set the font size.
    #[must_use]
    pub fn font_size(mut self, size: u16) -> Self {
        self.style.font_size = Some(size);
        self
    }

    /// Set foreground color.
    #[must_use]
    pub fn fg(mut self, color: Rgba) -> Self {
        self.style.fg = Some(color);
        self
    }

    /// Set background color.
    #[must_use]
    pub fn bg(mut self, color: Rgba) -> Self {
        self.style.bg = Some(color);
        self
    }

    /// Add bold attribute.
    #[must_use]
    pub fn bold(self) -> Self {
        self.attribute(TextAttributes::BOLD)
    }

    /// Add italic attribute.
    #[must_use]
    pub fn italic(self) -> Self {
        self.attribute(TextAttributes::ITALIC)
    }

    /// Add underline attribute.
    #[must_use]
    pub fn underline(self) -> Self {
        self.attribute(TextAttributes::UNDERLINE)
    }

    /// Add strikethrough attribute.
    #[must_use]
    pub fn strikethrough(self) -> Self {
        self.attribute(TextAttributes::STRIKETHROUGH)
    }

    fn attribute(mut self, attr: TextAttributes) -> Self {
        self.style.attributes = Some(self.style.attributes.unwrap_or_default() | attr);
        self
    }

    /// Compose the style onto a base style.
    #[must_use]
    pub fn base(mut self, base: CharStyle) -> Self {
        self.style.base = Some(Arc::new(base));
        self
    }

    /// Build the final style.
    #[must_use]
    pub fn build(self) -> CharStyle {
        self.style
    }
}

/// A partial-attribute transform applied to existing character styles.
///
/// Unset fields leave the style untouched, so applying a modifier across a
/// range only materializes new runs where the result actually differs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StyleModifier {
    font_size: Option<u16>,
    add: TextAttributes,
    remove: TextAttributes,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
}

impl StyleModifier {
    /// Modifier that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a font size.
    #[must_use]
    pub fn font_size(mut self, size: u16) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Add attributes.
    #[must_use]
    pub fn add(mut self, attrs: TextAttributes) -> Self {
        self.add |= attrs;
        self.remove &= !attrs;
        self
    }

    /// Remove attributes.
    #[must_use]
    pub fn remove(mut self, attrs: TextAttributes) -> Self {
        self.remove |= attrs;
        self.add &= !attrs;
        self
    }

    /// Force a foreground color.
    #[must_use]
    pub fn fg(mut self, color: Rgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Force a background color.
    #[must_use]
    pub fn bg(mut self, color: Rgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Check whether applying the modifier is a no-op.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.font_size.is_none()
            && self.add.is_empty()
            && self.remove.is_empty()
            && self.fg.is_none()
            && self.bg.is_none()
    }

    /// Apply to a style, keeping its base.
    #[must_use]
    pub fn apply(&self, style: &CharStyle) -> CharStyle {
        let mut out = style.clone();
        if self.font_size.is_some() {
            out.font_size = self.font_size;
        }
        if !self.add.is_empty() || !self.remove.is_empty() {
            let attrs = (style.effective_attributes() | self.add) & !self.remove;
            out.attributes = Some(attrs);
        }
        if self.fg.is_some() {
            out.fg = self.fg;
        }
        if self.bg.is_some() {
            out.bg = self.bg;
        }
        out
    }
}
