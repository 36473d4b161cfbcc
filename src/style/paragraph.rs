//! Paragraph-level style values.

use crate::error::{Error, Result};
use crate::style::CharStyle;
use std::str::FromStr;
use std::sync::Arc;

/// Horizontal alignment of the lines of a paragraph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
}

impl Alignment {
    /// Name used by `FromStr`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }

    /// Horizontal offset of a line with `remaining` unused width.
    #[must_use]
    pub const fn offset(self, remaining: i32) -> i32 {
        let slack = if remaining > 0 { remaining } else { 0 };
        match self {
            Self::Left => 0,
            Self::Right => slack,
            Self::Center => slack / 2,
        }
    }
}

impl TryFrom<u8> for Alignment {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Left),
            1 => Ok(Self::Right),
            2 => Ok(Self::Center),
            other => Err(Error::enum_value("alignment", other)),
        }
    }
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" | "centre" => Ok(Self::Center),
            _ => Err(Error::enum_value("alignment", s)),
        }
    }
}

/// Decoration drawn in front of the first line of a paragraph (bullet,
/// number, rule). Its extent pushes the text margin of every line of the
/// paragraph to the right so wrapped lines hang under the first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Heading {
    /// Width reserved for the decoration itself.
    pub size: i32,
    /// Gap between the decoration and the text.
    pub space: i32,
}

/// Paragraph style: margins, spacing, tabs, alignment, heading and the base
/// character style every character of the paragraph is composed onto.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParagraphStyle {
    left_indent: i32,
    right_indent: i32,
    line_space: i32,
    paragraph_space: i32,
    tab_width: i32,
    alignment: Alignment,
    heading: Option<Heading>,
    base_style: Option<Arc<CharStyle>>,
}

impl ParagraphStyle {
    /// Create a new paragraph style builder.
    #[must_use]
    pub fn builder() -> ParagraphStyleBuilder {
        ParagraphStyleBuilder::default()
    }

    /// Start a builder from this style's values.
    #[must_use]
    pub fn to_builder(&self) -> ParagraphStyleBuilder {
        ParagraphStyleBuilder {
            left_indent: self.left_indent,
            right_indent: self.right_indent,
            line_space: self.line_space,
            paragraph_space: self.paragraph_space,
            tab_width: self.tab_width,
            alignment: self.alignment,
            heading_size: self.heading.map(|h| h.size),
            heading_space: self.heading_space(),
            base_style: self.base_style.clone(),
        }
    }

    #[must_use]
    pub const fn left_indent(&self) -> i32 {
        self.left_indent
    }

    #[must_use]
    pub const fn right_indent(&self) -> i32 {
        self.right_indent
    }

    /// Extra vertical space after every line.
    #[must_use]
    pub const fn line_space(&self) -> i32 {
        self.line_space
    }

    /// Extra vertical space after the last line of the paragraph.
    #[must_use]
    pub const fn paragraph_space(&self) -> i32 {
        self.paragraph_space
    }

    /// Explicit tab width; 0 means "derive from the font".
    #[must_use]
    pub const fn tab_width(&self) -> i32 {
        self.tab_width
    }

    #[must_use]
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[must_use]
    pub const fn heading(&self) -> Option<Heading> {
        self.heading
    }

    #[must_use]
    pub const fn has_heading(&self) -> bool {
        self.heading.is_some()
    }

    #[must_use]
    pub const fn heading_size(&self) -> i32 {
        match self.heading {
            Some(h) => h.size,
            None => 0,
        }
    }

    /// Heading gap; always 0 without a heading.
    #[must_use]
    pub const fn heading_space(&self) -> i32 {
        match self.heading {
            Some(h) => h.space,
            None => 0,
        }
    }

    #[must_use]
    pub const fn has_base_style(&self) -> bool {
        self.base_style.is_some()
    }

    #[must_use]
    pub fn base_style(&self) -> Option<&Arc<CharStyle>> {
        self.base_style.as_ref()
    }

    /// Left text margin: indent plus the heading extent.
    #[must_use]
    pub const fn text_indent(&self) -> i32 {
        self.left_indent + self.heading_size() + self.heading_space()
    }

    /// Copy with paragraph spacing removed (fixed line height layouts).
    #[must_use]
    pub(crate) fn without_paragraph_space(&self) -> Self {
        Self {
            paragraph_space: 0,
            ..self.clone()
        }
    }
}

/// Builder for [`ParagraphStyle`]; validates on `build`.
#[derive(Clone, Debug, Default)]
pub struct ParagraphStyleBuilder {
    left_indent: i32,
    right_indent: i32,
    line_space: i32,
    paragraph_space: i32,
    tab_width: i32,
    alignment: Alignment,
    heading_size: Option<i32>,
    heading_space: i32,
    base_style: Option<Arc<CharStyle>>,
}

impl ParagraphStyleBuilder {
    #[must_use]
    pub fn left_indent(mut self, value: i32) -> Self {
        self.left_indent = value;
        self
    }

    #[must_use]
    pub fn right_indent(mut self, value: i32) -> Self {
        self.right_indent = value;
        self
    }

    #[must_use]
    pub fn line_space(mut self, value: i32) -> Self {
        self.line_space = value;
        self
    }

    #[must_use]
    pub fn paragraph_space(mut self, value: i32) -> Self {
        self.paragraph_space = value;
        self
    }

    #[must_use]
    pub fn tab_width(mut self, value: i32) -> Self {
        self.tab_width = value;
        self
    }

    #[must_use]
    pub fn alignment(mut self, value: Alignment) -> Self {
        self.alignment = value;
        self
    }

    /// Reserve a heading decoration of `size` in front of the first line.
    #[must_use]
    pub fn heading(mut self, size: i32) -> Self {
        self.heading_size = Some(size);
        self
    }

    /// Remove the heading decoration.
    #[must_use]
    pub fn no_heading(mut self) -> Self {
        self.heading_size = None;
        self
    }

    /// Gap after the heading; dropped when there is no heading.
    #[must_use]
    pub fn heading_space(mut self, value: i32) -> Self {
        self.heading_space = value;
        self
    }

    #[must_use]
    pub fn base_style(mut self, style: CharStyle) -> Self {
        self.base_style = Some(Arc::new(style));
        self
    }

    #[must_use]
    pub fn shared_base_style(mut self, style: Option<Arc<CharStyle>>) -> Self {
        self.base_style = style;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<ParagraphStyle> {
        let checks = [
            ("left indent", self.left_indent),
            ("right indent", self.right_indent),
            ("line space", self.line_space),
            ("paragraph space", self.paragraph_space),
            ("tab width", self.tab_width),
            ("heading size", self.heading_size.unwrap_or(0)),
            ("heading space", self.heading_space),
        ];
        if let Some((name, value)) = checks.iter().find(|(_, v)| *v < 0) {
            return Err(Error::InvalidStyle(format!("{name} must not be negative, got {value}")));
        }

        Ok(ParagraphStyle {
            left_indent: self.left_indent,
            right_indent: self.right_indent,
            line_space: self.line_space,
            paragraph_space: self.paragraph_space,
            tab_width: self.tab_width,
            alignment: self.alignment,
            heading: self.heading_size.map(|size| Heading {
                size,
                space: self.heading_space,
            }),
            base_style: self.base_style,
        })
    }
}

/// Partial update applied to every paragraph in a range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParagraphStyleModifier {
    left_indent: Option<i32>,
    right_indent: Option<i32>,
    line_space: Option<i32>,
    paragraph_space: Option<i32>,
    tab_width: Option<i32>,
    alignment: Option<Alignment>,
    heading: Option<Option<i32>>,
    heading_space: Option<i32>,
    base_style: Option<Option<Arc<CharStyle>>>,
}

impl ParagraphStyleModifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn left_indent(mut self, value: i32) -> Self {
        self.left_indent = Some(value);
        self
    }

    #[must_use]
    pub fn right_indent(mut self, value: i32) -> Self {
        self.right_indent = Some(value);
        self
    }

    #[must_use]
    pub fn line_space(mut self, value: i32) -> Self {
        self.line_space = Some(value);
        self
    }

    #[must_use]
    pub fn paragraph_space(mut self, value: i32) -> Self {
        self.paragraph_space = Some(value);
        self
    }

    #[must_use]
    pub fn tab_width(mut self, value: i32) -> Self {
        self.tab_width = Some(value);
        self
    }

    #[must_use]
    pub fn alignment(mut self, value: Alignment) -> Self {
        self.alignment = Some(value);
        self
    }

    #[must_use]
    pub fn heading(mut self, size: i32) -> Self {
        self.heading = Some(Some(size));
        self
    }

    #[must_use]
    pub fn no_heading(mut self) -> Self {
        self.heading = Some(None);
        self
    }

    #[must_use]
    pub fn heading_space(mut self, value: i32) -> Self {
        self.heading_space = Some(value);
        self
    }

    #[must_use]
    pub fn base_style(mut self, style: Option<CharStyle>) -> Self {
        self.base_style = Some(style.map(Arc::new));
        self
    }

    /// Apply to one paragraph's style.
    ///
    /// Runs the same validation as [`ParagraphStyleBuilder::build`], so a
    /// heading space requested without a heading comes out as 0.
    pub fn apply(&self, style: &ParagraphStyle) -> Result<ParagraphStyle> {
        let mut b = style.to_builder();
        if let Some(v) = self.left_indent {
            b = b.left_indent(v);
        }
        if let Some(v) = self.right_indent {
            b = b.right_indent(v);
        }
        if let Some(v) = self.line_space {
            b = b.line_space(v);
        }
        if let Some(v) = self.paragraph_space {
            b = b.paragraph_space(v);
        }
        if let Some(v) = self.tab_width {
            b = b.tab_width(v);
        }
        if let Some(v) = self.alignment {
            b = b.alignment(v);
        }
        match self.heading {
            Some(Some(size)) => b = b.heading(size),
            Some(None) => b = b.no_heading(),
            None => {}
        }
        if let Some(v) = self.heading_space {
            b = b.heading_space(v);
        }
        if let Some(base) = &self.base_style {
            b = b.shared_base_style(base.clone());
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_parsing() {
        assert_eq!("Right".parse::<Alignment>(), Ok(Alignment::Right));
        assert_eq!(Alignment::try_from(2), Ok(Alignment::Center));
        assert!(matches!(
            Alignment::try_from(7),
            Err(Error::InvalidEnumValue { kind: "alignment", .. })
        ));
        assert!("justify".parse::<Alignment>().is_err());
    }

    #[test]
    fn test_alignment_offset() {
        assert_eq!(Alignment::Left.offset(10), 0);
        assert_eq!(Alignment::Right.offset(10), 10);
        assert_eq!(Alignment::Center.offset(11), 5);
        assert_eq!(Alignment::Right.offset(-4), 0);
    }

    #[test]
    fn test_heading_space_without_heading_is_zero() {
        let style = ParagraphStyle::builder().heading_space(6).build().unwrap();
        assert!(!style.has_heading());
        assert_eq!(style.heading_space(), 0);
        assert_eq!(style.text_indent(), 0);
    }

    #[test]
    fn test_heading_extends_text_indent() {
        let style = ParagraphStyle::builder()
            .left_indent(5)
            .heading(8)
            .heading_space(2)
            .build()
            .unwrap();
        assert_eq!(style.text_indent(), 15);
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = ParagraphStyle::builder().left_indent(-1).build();
        assert!(matches!(err, Err(Error::InvalidStyle(_))));
        assert!(ParagraphStyle::builder().tab_width(-8).build().is_err());
    }

    #[test]
    fn test_modifier_drops_heading_space_with_heading() {
        let styled = ParagraphStyle::builder()
            .heading(10)
            .heading_space(4)
            .build()
            .unwrap();
        let out = ParagraphStyleModifier::new()
            .no_heading()
            .heading_space(6)
            .apply(&styled)
            .unwrap();
        assert!(!out.has_heading());
        assert_eq!(out.heading_space(), 0);
    }

    #[test]
    fn test_modifier_keeps_unset_fields() {
        let styled = ParagraphStyle::builder()
            .left_indent(3)
            .alignment(Alignment::Center)
            .build()
            .unwrap();
        let out = ParagraphStyleModifier::new()
            .line_space(2)
            .apply(&styled)
            .unwrap();
        assert_eq!(out.left_indent(), 3);
        assert_eq!(out.alignment(), Alignment::Center);
        assert_eq!(out.line_space(), 2);
    }
}
