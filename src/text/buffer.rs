//! Styled character buffer.
//!
//! [`StyledBuffer`] stores characters in a rope, character styles in a
//! run-length encoded [`RunArray`], and embedded objects in an ordered map
//! keyed by position. Every edit keeps the three in step: the style runs
//! always cover exactly `len()` characters and attachment positions are
//! renumbered together with the text.

use crate::attachment::AttachmentRef;
use crate::error::{Error, Result, check_position, check_range};
use crate::style::{CharStyle, StyleModifier};
use crate::text::OBJECT_MARKER;
use crate::text::rope::RopeWrapper;
use crate::text::runs::RunArray;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Characters with run-length encoded styles and embedded objects.
///
/// Cloning is cheap: character chunks are shared between clones until one
/// of them is edited, and style values are interned per buffer.
///
/// ```
/// use richlayout::{CharStyle, StyledBuffer};
///
/// let mut buffer = StyledBuffer::with_text("hello world");
/// buffer.restyle(0, 5, CharStyle::builder().bold().build()).unwrap();
/// assert_eq!(buffer.run_length_at(0).unwrap(), 5);
///
/// buffer.replace(5, 6, &StyledBuffer::with_text(", ")).unwrap();
/// assert_eq!(buffer.text(), "hello, world");
/// ```
#[derive(Clone, Debug, Default)]
pub struct StyledBuffer {
    rope: RopeWrapper,
    styles: RunArray<CharStyle>,
    attachments: BTreeMap<usize, AttachmentRef>,
    default_style: CharStyle,
}

impl StyledBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` in the default style.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        Self::styled(text, CharStyle::new())
    }

    /// Create a buffer holding `text` in one style.
    #[must_use]
    pub fn styled(text: &str, style: CharStyle) -> Self {
        let rope = RopeWrapper::from_str(text);
        let styles = RunArray::with_value(rope.len_chars(), style.clone());
        Self {
            rope,
            styles,
            attachments: BTreeMap::new(),
            default_style: style,
        }
    }

    /// Append `text` in `style`.
    pub fn append(&mut self, text: &str, style: CharStyle) {
        let begin = self.len();
        self.rope.append(text);
        let added = self.rope.len_chars() - begin;
        self.styles.replace_with(begin..begin, added, style);
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    /// Character at `pos`.
    pub fn char_at(&self, pos: usize) -> Result<char> {
        self.rope.get_char(pos).ok_or(Error::PositionOutOfBounds {
            pos,
            len: self.len(),
        })
    }

    /// The whole content as a string.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Characters `begin..end` as a string.
    pub fn slice_text(&self, begin: usize, end: usize) -> Result<String> {
        check_range(begin, end, self.len())?;
        Ok(self.rope.slice(begin..end).to_string())
    }

    /// Iterate characters from `pos` to the end.
    pub fn chars_from(&self, pos: usize) -> impl Iterator<Item = char> + '_ {
        self.rope.chars_from(pos)
    }

    pub(crate) const fn rope(&self) -> &RopeWrapper {
        &self.rope
    }

    /// Style used for text typed into an empty buffer.
    #[must_use]
    pub const fn default_style(&self) -> &CharStyle {
        &self.default_style
    }

    pub fn set_default_style(&mut self, style: CharStyle) {
        self.default_style = style;
    }

    /// Style at `pos`.
    ///
    /// `pos == len()` is allowed and answers the style text appended at the
    /// end would get: the style of the last character, or the default style
    /// of an empty buffer.
    pub fn style_at(&self, pos: usize) -> Result<&CharStyle> {
        check_position(pos, self.len())?;
        let at = if pos == self.len() { pos.checked_sub(1) } else { Some(pos) };
        Ok(at
            .and_then(|p| self.styles.get(p))
            .unwrap_or(&self.default_style))
    }

    /// Distance from `pos` to the next style change (0 at the end).
    pub fn run_length_at(&self, pos: usize) -> Result<usize> {
        check_position(pos, self.len())?;
        Ok(self.styles.run_range(pos).map_or(0, |r| r.end - pos))
    }

    /// Style runs overlapping `begin..end`, clipped to it.
    pub fn style_runs(
        &self,
        begin: usize,
        end: usize,
    ) -> Result<impl Iterator<Item = (Range<usize>, &CharStyle)> + '_> {
        check_range(begin, end, self.len())?;
        Ok(self.styles.iter_range(begin..end))
    }

    /// Replace `begin..end` with the characters, styles and attachments of
    /// `replacement`.
    ///
    /// Attachments before `begin` keep their position, those at or after
    /// `end` shift by the length change, and those inside the removed range
    /// are dropped.
    pub fn replace(&mut self, begin: usize, end: usize, replacement: &Self) -> Result<()> {
        check_range(begin, end, self.len())?;
        let inserted = replacement.len();
        self.rope.splice(begin..end, &replacement.rope);
        self.styles.replace(begin..end, &replacement.styles);
        self.renumber_attachments(begin, end, inserted, &replacement.attachments);
        debug_assert_eq!(self.styles.len(), self.rope.len_chars());
        Ok(())
    }

    /// Replace `begin..end` with plain text in `style`.
    pub fn replace_str(
        &mut self,
        begin: usize,
        end: usize,
        text: &str,
        style: CharStyle,
    ) -> Result<()> {
        self.replace(begin, end, &Self::styled(text, style))
    }

    fn renumber_attachments(
        &mut self,
        begin: usize,
        end: usize,
        inserted: usize,
        incoming: &BTreeMap<usize, AttachmentRef>,
    ) {
        if self.attachments.is_empty() && incoming.is_empty() {
            return;
        }
        let old = std::mem::take(&mut self.attachments);
        self.attachments = old
            .into_iter()
            .filter_map(|(pos, object)| {
                if pos < begin {
                    Some((pos, object))
                } else if pos >= end {
                    Some((pos - end + begin + inserted, object))
                } else {
                    None
                }
            })
            .chain(incoming.iter().map(|(pos, object)| (begin + pos, object.clone())))
            .collect();
    }

    /// Set every character of `begin..end` to `style`.
    pub fn restyle(&mut self, begin: usize, end: usize, style: CharStyle) -> Result<()> {
        check_range(begin, end, self.len())?;
        self.styles.set(begin..end, style);
        Ok(())
    }

    /// Apply `modifier` run by run. Returns whether any style changed.
    pub fn modify_style(
        &mut self,
        begin: usize,
        end: usize,
        modifier: &StyleModifier,
    ) -> Result<bool> {
        check_range(begin, end, self.len())?;
        if modifier.is_identity() {
            return Ok(false);
        }
        Ok(self.styles.map_range(begin..end, |style| modifier.apply(style)))
    }

    /// Apply an arbitrary per-run transform. Returns whether any style
    /// changed.
    pub fn map_styles(
        &mut self,
        begin: usize,
        end: usize,
        f: impl FnMut(&CharStyle) -> CharStyle,
    ) -> Result<bool> {
        check_range(begin, end, self.len())?;
        Ok(self.styles.map_range(begin..end, f))
    }

    /// Compose every style of `begin..end` onto `base`.
    ///
    /// Only runs whose base actually differs are rewritten.
    pub fn rebase_on(
        &mut self,
        begin: usize,
        end: usize,
        base: Option<&Arc<CharStyle>>,
    ) -> Result<bool> {
        check_range(begin, end, self.len())?;
        Ok(self.styles.map_range(begin..end, |style| {
            if style.base() == base {
                style.clone()
            } else {
                style.clone().with_base(base.cloned())
            }
        }))
    }

    /// Embedded object at `pos`, if any.
    #[must_use]
    pub fn attachment_at(&self, pos: usize) -> Option<&AttachmentRef> {
        self.attachments.get(&pos)
    }

    /// Iterate attachments in position order.
    pub fn attachments(&self) -> impl Iterator<Item = (usize, &AttachmentRef)> + '_ {
        self.attachments.iter().map(|(pos, object)| (*pos, object))
    }

    /// Attach (or with `None`, detach) an object at an object-marker
    /// character.
    pub fn set_attachment(&mut self, pos: usize, attachment: Option<AttachmentRef>) -> Result<()> {
        if self.char_at(pos)? != OBJECT_MARKER {
            return Err(Error::NotAnAttachment(pos));
        }
        match attachment {
            Some(object) => {
                self.attachments.insert(pos, object);
            }
            None => {
                self.attachments.remove(&pos);
            }
        }
        Ok(())
    }

    /// Insert an object-marker character carrying `attachment` at `pos`.
    pub fn insert_attachment(
        &mut self,
        pos: usize,
        attachment: AttachmentRef,
        style: CharStyle,
    ) -> Result<()> {
        let mut marker = Self::styled(&OBJECT_MARKER.to_string(), style);
        marker.attachments.insert(0, attachment);
        self.replace(pos, pos, &marker)
    }

    /// Copy out `begin..end` as an independent buffer.
    pub fn slice(&self, begin: usize, end: usize) -> Result<Self> {
        check_range(begin, end, self.len())?;
        Ok(Self {
            rope: self.rope.sub_rope(begin..end),
            styles: self.styles.slice(begin..end),
            attachments: self
                .attachments
                .range(begin..end)
                .map(|(pos, object)| (pos - begin, object.clone()))
                .collect(),
            default_style: self.style_at(begin)?.clone(),
        })
    }
}

impl From<&str> for StyledBuffer {
    fn from(text: &str) -> Self {
        Self::with_text(text)
    }
}
