//! Layout policy shared by a paragraphed buffer and its line cache.

use crate::error::{Error, Result};
use crate::text::{LINE_BREAK, OBJECT_MARKER};
use std::str::FromStr;

/// Text wrapping mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WrapMode {
    /// No wrapping - lines extend past the margin and the layout grows.
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries.
    #[default]
    Word,
}

impl TryFrom<u8> for WrapMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Char),
            2 => Ok(Self::Word),
            other => Err(Error::enum_value("wrap mode", other)),
        }
    }
}

impl FromStr for WrapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "nowrap" => Ok(Self::None),
            "char" | "character" => Ok(Self::Char),
            "word" => Ok(Self::Word),
            _ => Err(Error::enum_value("wrap mode", s)),
        }
    }
}

/// Whether every line shares one height or lines size to their content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LineHeight {
    /// One paragraph style for the whole buffer, one line height for every
    /// line. Paragraph spacing is forced to zero.
    #[default]
    Fixed,
    /// Per-paragraph styles, per-line heights and baselines.
    Variable,
}

impl TryFrom<u8> for LineHeight {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Fixed),
            1 => Ok(Self::Variable),
            other => Err(Error::enum_value("line height", other)),
        }
    }
}

impl FromStr for LineHeight {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "uniform" => Ok(Self::Fixed),
            "variable" => Ok(Self::Variable),
            _ => Err(Error::enum_value("line height", s)),
        }
    }
}

/// How characters are turned into glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GlyphMode {
    /// Every character is drawn as itself.
    #[default]
    Normal,
    /// Every visible character is drawn (and measured) as the echo
    /// character, as in a password field.
    Echo(char),
}

impl GlyphMode {
    /// Character actually measured and drawn for `ch`.
    #[must_use]
    pub const fn display_char(self, ch: char) -> char {
        match self {
            Self::Normal => ch,
            Self::Echo(echo) => echo,
        }
    }
}

/// Configuration of a paragraphed buffer and the layouts built on it.
///
/// ```
/// use richlayout::{LineHeight, TextPolicy, WrapMode};
///
/// let policy = TextPolicy::default()
///     .with_wrap(WrapMode::Char)
///     .with_line_height(LineHeight::Variable);
/// assert!(policy.validate().is_ok());
/// assert!(policy.with_paragraph_separator('\t').validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextPolicy {
    pub line_height: LineHeight,
    pub wrap: WrapMode,
    /// Character that ends a paragraph. Must be below U+0100 so the stop
    /// table can classify it.
    pub paragraph_separator: char,
    pub glyphs: GlyphMode,
    /// Font-derived tab width in spaces, used when a paragraph style sets no
    /// explicit tab width.
    pub tab_columns: u8,
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            line_height: LineHeight::Fixed,
            wrap: WrapMode::Word,
            paragraph_separator: '\n',
            glyphs: GlyphMode::Normal,
            tab_columns: 4,
        }
    }
}

impl TextPolicy {
    #[must_use]
    pub const fn with_line_height(mut self, line_height: LineHeight) -> Self {
        self.line_height = line_height;
        self
    }

    #[must_use]
    pub const fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    #[must_use]
    pub const fn with_paragraph_separator(mut self, separator: char) -> Self {
        self.paragraph_separator = separator;
        self
    }

    #[must_use]
    pub const fn with_glyphs(mut self, glyphs: GlyphMode) -> Self {
        self.glyphs = glyphs;
        self
    }

    #[must_use]
    pub const fn with_tab_columns(mut self, columns: u8) -> Self {
        self.tab_columns = columns;
        self
    }

    #[must_use]
    pub const fn is_variable(&self) -> bool {
        matches!(self.line_height, LineHeight::Variable)
    }

    /// Check that the separator can be used as a stop character.
    pub fn validate(&self) -> Result<()> {
        let sep = self.paragraph_separator;
        if u32::from(sep) >= 0x100 || sep == '\t' || sep == LINE_BREAK || sep == OBJECT_MARKER {
            return Err(Error::InvalidSeparator(sep));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = TextPolicy::default();
        assert_eq!(policy.wrap, WrapMode::Word);
        assert_eq!(policy.line_height, LineHeight::Fixed);
        assert_eq!(policy.paragraph_separator, '\n');
        assert_eq!(policy.tab_columns, 4);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_separator_validation() {
        let base = TextPolicy::default();
        assert!(base.with_paragraph_separator('\u{2029}').validate().is_err());
        assert_eq!(
            base.with_paragraph_separator(LINE_BREAK).validate(),
            Err(Error::InvalidSeparator(LINE_BREAK))
        );
        assert!(base.with_paragraph_separator('\r').validate().is_ok());
        assert!(base.with_paragraph_separator('\u{1e}').validate().is_ok());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("char".parse::<WrapMode>(), Ok(WrapMode::Char));
        assert_eq!(WrapMode::try_from(0), Ok(WrapMode::None));
        assert!(WrapMode::try_from(3).is_err());
        assert_eq!("Variable".parse::<LineHeight>(), Ok(LineHeight::Variable));
        assert!(matches!(
            "tall".parse::<LineHeight>(),
            Err(Error::InvalidEnumValue { kind: "line height", .. })
        ));
    }

    #[test]
    fn test_echo_display_char() {
        assert_eq!(GlyphMode::Normal.display_char('x'), 'x');
        assert_eq!(GlyphMode::Echo('*').display_char('x'), '*');
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_policy_from_json() {
        let policy: TextPolicy =
            serde_json::from_str(r#"{"wrap": "char", "glyphs": {"echo": "*"}}"#).unwrap();
        assert_eq!(policy.wrap, WrapMode::Char);
        assert_eq!(policy.glyphs, GlyphMode::Echo('*'));
        assert_eq!(policy.paragraph_separator, '\n');

        let json = serde_json::to_string(&TextPolicy::default()).unwrap();
        assert!(json.contains(r#""line_height":"fixed""#));
    }
}
