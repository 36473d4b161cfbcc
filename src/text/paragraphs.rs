//! Paragraph-styled text and the edit API.
//!
//! [`ParagraphedBuffer`] wraps a [`StyledBuffer`] and segments it into
//! paragraphs at the configured separator. In variable line-height mode
//! every paragraph carries its own [`ParagraphStyle`], stored as a run
//! array over `len + 1` slots; the extra slot is the style of the paragraph
//! text appended at the end would start. Run boundaries always sit on
//! paragraph starts.
//!
//! Every edit returns a [`TextChange`] the line cache uses to patch its
//! layout.

use crate::error::{Result, check_position, check_range};
use crate::style::{CharStyle, ParagraphStyle, ParagraphStyleModifier, StyleModifier};
use crate::text::buffer::StyledBuffer;
use crate::text::change::TextChange;
use crate::text::policy::TextPolicy;
use crate::text::runs::RunArray;
use std::ops::Range;
use tracing::debug;

#[derive(Clone, Debug)]
enum ParagraphStyles {
    /// Fixed line height: one style, no paragraph spacing.
    Uniform(ParagraphStyle),
    /// Variable line height: one style per paragraph over `len + 1` slots.
    PerParagraph(RunArray<ParagraphStyle>),
}

/// Styled characters segmented into styled paragraphs.
#[derive(Clone, Debug)]
pub struct ParagraphedBuffer {
    chars: StyledBuffer,
    paragraphs: ParagraphStyles,
    policy: TextPolicy,
    constraint: Option<StyleModifier>,
}

impl ParagraphedBuffer {
    /// Wrap `chars`, giving every paragraph `style`.
    pub fn new(chars: StyledBuffer, policy: TextPolicy, style: ParagraphStyle) -> Result<Self> {
        policy.validate()?;
        let paragraphs = if policy.is_variable() {
            ParagraphStyles::PerParagraph(RunArray::with_value(chars.len() + 1, style))
        } else {
            ParagraphStyles::Uniform(style.without_paragraph_space())
        };
        let mut buffer = Self {
            chars,
            paragraphs,
            policy,
            constraint: None,
        };
        let len = buffer.len();
        buffer.rebase_range(0, len)?;
        Ok(buffer)
    }

    /// Plain text with the default paragraph style.
    pub fn with_text(text: &str, policy: TextPolicy) -> Result<Self> {
        Self::new(StyledBuffer::with_text(text), policy, ParagraphStyle::default())
    }

    #[must_use]
    pub const fn policy(&self) -> &TextPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.policy.paragraph_separator
    }

    /// The underlying character buffer.
    #[must_use]
    pub const fn chars(&self) -> &StyledBuffer {
        &self.chars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.chars.text()
    }

    pub fn char_at(&self, pos: usize) -> Result<char> {
        self.chars.char_at(pos)
    }

    pub fn style_at(&self, pos: usize) -> Result<&CharStyle> {
        self.chars.style_at(pos)
    }

    #[must_use]
    pub const fn constraint(&self) -> Option<&StyleModifier> {
        self.constraint.as_ref()
    }

    /// Paragraph style in effect at `pos` (`pos == len()` allowed).
    pub fn paragraph_style_at(&self, pos: usize) -> Result<&ParagraphStyle> {
        check_position(pos, self.len())?;
        Ok(self.paragraph_style_unchecked(pos))
    }

    fn paragraph_style_unchecked(&self, pos: usize) -> &ParagraphStyle {
        match &self.paragraphs {
            ParagraphStyles::Uniform(style) => style,
            ParagraphStyles::PerParagraph(runs) => runs
                .get(pos.min(runs.len() - 1))
                .unwrap_or_else(|| unreachable!("paragraph runs cover len + 1 slots")),
        }
    }

    /// Paragraph style runs overlapping `begin..end` (over the `len + 1`
    /// slot domain).
    pub fn paragraph_runs(&self, begin: usize, end: usize) -> Vec<(Range<usize>, ParagraphStyle)> {
        match &self.paragraphs {
            ParagraphStyles::Uniform(style) => {
                vec![(begin..end.max(begin), style.clone())]
            }
            ParagraphStyles::PerParagraph(runs) => runs
                .iter_range(begin..end.min(runs.len()))
                .map(|(range, style)| (range, style.clone()))
                .collect(),
        }
    }

    /// Start of the paragraph containing `i`.
    #[must_use]
    pub fn paragraph_begin_index_of(&self, i: usize) -> usize {
        self.chars
            .rope()
            .find_backward(i.min(self.len()), self.separator())
            .map_or(0, |sep| sep + 1)
    }

    /// Position of the separator ending the paragraph containing `i`, or
    /// the last position when the paragraph is the last one.
    #[must_use]
    pub fn paragraph_end_index_of(&self, i: usize) -> usize {
        self.chars
            .rope()
            .find_forward(i, self.separator())
            .unwrap_or_else(|| self.len().saturating_sub(1))
    }

    /// Start of the paragraph after the one containing `i`, or `None` when
    /// that paragraph is the last.
    #[must_use]
    pub fn next_paragraph_begin_index_of(&self, i: usize) -> Option<usize> {
        self.chars
            .rope()
            .find_forward(i, self.separator())
            .map(|sep| sep + 1)
    }

    /// Whether `pos` starts a paragraph.
    #[must_use]
    pub fn is_paragraph_start(&self, pos: usize) -> bool {
        pos == 0 || self.chars.char_at(pos - 1).is_ok_and(|c| c == self.separator())
    }

    /// Style new text typed at `pos` gets: the style of the character
    /// before it.
    pub fn typing_style(&self, pos: usize) -> Result<CharStyle> {
        check_position(pos, self.len())?;
        let at = pos.saturating_sub(1).min(self.len());
        Ok(self.chars.style_at(at)?.clone())
    }

    /// Replace `begin..end` with plain text in the typing style.
    pub fn replace_str(&mut self, begin: usize, end: usize, text: &str) -> Result<TextChange> {
        let style = self.typing_style(begin)?;
        self.replace_text(begin, end, &StyledBuffer::styled(text, style))
    }

    /// Replace `begin..end` with styled characters.
    ///
    /// The inserted text and the rest of the last paragraph it touches take
    /// the paragraph style that was in effect at `begin`, unless the
    /// replacement ends with a separator, in which case the trailing text
    /// keeps its own paragraph.
    pub fn replace_text(
        &mut self,
        begin: usize,
        end: usize,
        replacement: &StyledBuffer,
    ) -> Result<TextChange> {
        self.splice(begin, end, replacement, None)
    }

    /// Replace `begin..end` with text that carries its own paragraph
    /// styles.
    ///
    /// When `begin` is inside a paragraph, the replacement's first
    /// paragraph joins it and takes its style; the text after the
    /// replacement joins the replacement's last paragraph unless the
    /// replacement ends with a separator.
    pub fn replace_rich_text(
        &mut self,
        begin: usize,
        end: usize,
        replacement: &Self,
    ) -> Result<TextChange> {
        let incoming = replacement.paragraph_slots();
        self.splice(begin, end, &replacement.chars, Some(incoming))
    }

    /// Paragraph styles of the character slots, without the trailing slot.
    fn paragraph_slots(&self) -> RunArray<ParagraphStyle> {
        match &self.paragraphs {
            ParagraphStyles::Uniform(style) => RunArray::with_value(self.len(), style.clone()),
            ParagraphStyles::PerParagraph(runs) => runs.slice(0..self.len()),
        }
    }

    fn splice(
        &mut self,
        begin: usize,
        end: usize,
        replacement: &StyledBuffer,
        incoming: Option<RunArray<ParagraphStyle>>,
    ) -> Result<TextChange> {
        let old_len = self.len();
        check_range(begin, end, old_len)?;
        let sep = self.separator();
        let inserted = replacement.len();
        let new_end = begin + inserted;
        let ends_with_separator = inserted > 0 && replacement.char_at(inserted - 1)? == sep;
        let joins_paragraph = !self.is_paragraph_start(begin);
        let rich = incoming.is_some();

        self.chars.replace(begin, end, replacement)?;
        if let Some(constraint) = &self.constraint {
            self.chars.modify_style(begin, new_end, constraint)?;
        }
        let new_len = self.len();

        let change_end = if ends_with_separator {
            new_end
        } else {
            self.next_paragraph_begin_index_of(new_end)
                .unwrap_or(new_len + 1)
        };

        let mut tail_changed = false;
        if let ParagraphStyles::PerParagraph(runs) = &mut self.paragraphs {
            let inheriting = runs
                .get(begin)
                .cloned()
                .unwrap_or_else(|| unreachable!("paragraph runs cover len + 1 slots"));
            let tail_style = match incoming {
                None => {
                    runs.replace_with(begin..end, inserted, inheriting.clone());
                    inheriting
                }
                Some(mut slots) => {
                    if joins_paragraph {
                        let first_end = replacement
                            .rope()
                            .find_forward(0, sep)
                            .map_or(inserted, |p| p + 1);
                        slots.set(0..first_end, inheriting.clone());
                    }
                    runs.replace(begin..end, &slots);
                    match new_end.checked_sub(1).and_then(|p| runs.get(p)) {
                        Some(last) if !ends_with_separator => last.clone(),
                        _ => inheriting,
                    }
                }
            };
            if new_end < change_end {
                tail_changed = runs.map_range(new_end..change_end, |_| tail_style.clone());
            }
        }

        let rebase_end = change_end.min(new_len);
        self.rebase_range(begin, rebase_end)?;

        let length_delta = new_len as isize - old_len as isize;
        // Back to pre-edit coordinates.
        let old_change_end = (change_end + old_len - new_len).min(old_len);
        let change = TextChange {
            edit_begin: begin,
            edit_end: end,
            layout_begin: begin,
            layout_end: if tail_changed { old_change_end.max(end) } else { end },
            length_delta,
            full_relayout: begin == 0 && end == old_len,
            paragraph_style_changed: tail_changed || rich,
            style_only: false,
        };
        Ok(change)
    }

    /// Set the character style of `begin..end`.
    pub fn set_style(&mut self, begin: usize, end: usize, style: CharStyle) -> Result<TextChange> {
        check_range(begin, end, self.len())?;
        let style = match &self.constraint {
            Some(constraint) => constraint.apply(&style),
            None => style,
        };
        self.chars.restyle(begin, end, style)?;
        self.rebase_range(begin, end)?;
        Ok(TextChange::restyle(begin, end))
    }

    /// Apply a partial style change to `begin..end`.
    pub fn modify_style(
        &mut self,
        begin: usize,
        end: usize,
        modifier: &StyleModifier,
    ) -> Result<TextChange> {
        check_range(begin, end, self.len())?;
        self.chars.modify_style(begin, end, modifier)?;
        if let Some(constraint) = &self.constraint {
            self.chars.modify_style(begin, end, constraint)?;
        }
        self.rebase_range(begin, end)?;
        Ok(TextChange::restyle(begin, end))
    }

    /// Set (or clear) the modifier applied to every stored character
    /// style. A new constraint is applied to the whole text once.
    pub fn set_constraint(&mut self, constraint: Option<StyleModifier>) -> Result<TextChange> {
        let len = self.len();
        if let Some(modifier) = &constraint {
            let changed = self.chars.modify_style(0, len, modifier)?;
            debug!(len, changed, "applied style constraint");
        }
        self.constraint = constraint;
        Ok(TextChange::full(len))
    }

    /// Snap `begin..end` outward to whole paragraphs over the slot domain.
    /// With a uniform style every edit spans the whole text.
    fn paragraph_span(&self, begin: usize, end: usize) -> Range<usize> {
        if !self.policy.is_variable() {
            return 0..self.len() + 1;
        }
        let first = self.paragraph_begin_index_of(begin);
        let last = if end > begin { end - 1 } else { begin };
        let stop = self
            .next_paragraph_begin_index_of(last)
            .unwrap_or(self.len() + 1);
        first..stop
    }

    /// Give every paragraph touching `begin..end` the style `style`.
    pub fn set_paragraph_style(
        &mut self,
        begin: usize,
        end: usize,
        style: ParagraphStyle,
    ) -> Result<TextChange> {
        check_range(begin, end, self.len())?;
        let span = self.paragraph_span(begin, end);
        match &mut self.paragraphs {
            ParagraphStyles::Uniform(current) => *current = style.without_paragraph_space(),
            ParagraphStyles::PerParagraph(runs) => runs.set(span.clone(), style),
        }
        self.paragraph_change(span)
    }

    /// Apply `modifier` to the style of every paragraph touching
    /// `begin..end`.
    pub fn modify_paragraph_style(
        &mut self,
        begin: usize,
        end: usize,
        modifier: &ParagraphStyleModifier,
    ) -> Result<TextChange> {
        check_range(begin, end, self.len())?;
        let span = self.paragraph_span(begin, end);
        match &mut self.paragraphs {
            ParagraphStyles::Uniform(current) => {
                *current = modifier.apply(current)?.without_paragraph_space();
            }
            ParagraphStyles::PerParagraph(runs) => {
                let updated = runs
                    .iter_range(span.clone())
                    .map(|(range, style)| Ok((range, modifier.apply(style)?)))
                    .collect::<Result<Vec<_>>>()?;
                for (range, style) in updated {
                    runs.set(range, style);
                }
            }
        }
        self.paragraph_change(span)
    }

    fn paragraph_change(&mut self, span: Range<usize>) -> Result<TextChange> {
        let end = span.end.min(self.len());
        self.rebase_range(span.start, end)?;
        Ok(TextChange {
            paragraph_style_changed: true,
            ..TextChange::restyle(span.start, end)
        })
    }

    /// Compose the characters of `begin..end` onto their paragraph's base
    /// style.
    fn rebase_range(&mut self, begin: usize, end: usize) -> Result<()> {
        if begin >= end {
            return Ok(());
        }
        for (range, style) in self.paragraph_runs(begin, end) {
            let range_end = range.end.min(end);
            if range.start < range_end {
                self.chars
                    .rebase_on(range.start, range_end, style.base_style())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Alignment, TextAttributes};
    use crate::text::policy::LineHeight;

    fn variable() -> TextPolicy {
        TextPolicy::default().with_line_height(LineHeight::Variable)
    }

    fn indented(n: i32) -> ParagraphStyle {
        ParagraphStyle::builder().left_indent(n).build().unwrap()
    }

    #[test]
    fn test_paragraph_boundaries() {
        let text = ParagraphedBuffer::with_text("ab\ncd\n\nef", TextPolicy::default()).unwrap();
        assert_eq!(text.paragraph_begin_index_of(0), 0);
        assert_eq!(text.paragraph_begin_index_of(2), 0);
        assert_eq!(text.paragraph_begin_index_of(3), 3);
        assert_eq!(text.paragraph_begin_index_of(6), 6);
        assert_eq!(text.paragraph_begin_index_of(9), 7);
        assert_eq!(text.paragraph_end_index_of(0), 2);
        assert_eq!(text.paragraph_end_index_of(7), 8);
        assert_eq!(text.next_paragraph_begin_index_of(4), Some(6));
        assert_eq!(text.next_paragraph_begin_index_of(7), None);
    }

    #[test]
    fn test_custom_separator() {
        let policy = TextPolicy::default().with_paragraph_separator('\r');
        let text = ParagraphedBuffer::with_text("ab\rcd\nef", policy).unwrap();
        assert_eq!(text.next_paragraph_begin_index_of(0), Some(3));
        assert_eq!(text.next_paragraph_begin_index_of(3), None);
    }

    #[test]
    fn test_invalid_separator_rejected() {
        let policy = TextPolicy::default().with_paragraph_separator('\u{2028}');
        assert!(ParagraphedBuffer::with_text("x", policy).is_err());
    }

    #[test]
    fn test_replace_reports_change() {
        let mut text = ParagraphedBuffer::with_text("hello world", TextPolicy::default()).unwrap();
        let change = text.replace_str(6, 11, "there!").unwrap();
        assert_eq!(text.text(), "hello there!");
        assert_eq!(change.edit_begin, 6);
        assert_eq!(change.edit_end, 11);
        assert_eq!(change.length_delta, 1);
        assert!(!change.full_relayout);
        assert!(!change.style_only);

        let change = text.replace_str(0, 12, "").unwrap();
        assert!(change.full_relayout);
        assert!(text.is_empty());
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut text = ParagraphedBuffer::with_text("abc", TextPolicy::default()).unwrap();
        assert!(text.replace_str(2, 5, "x").is_err());
        assert!(text.replace_str(3, 2, "x").is_err());
        assert_eq!(text.text(), "abc");
    }

    #[test]
    fn test_typing_style_follows_previous_char() {
        let mut text = ParagraphedBuffer::with_text("ab", TextPolicy::default()).unwrap();
        text.set_style(1, 2, CharStyle::builder().italic().build())
            .unwrap();
        text.replace_str(2, 2, "c").unwrap();
        assert!(text
            .style_at(2)
            .unwrap()
            .effective_attributes()
            .contains(TextAttributes::ITALIC));
    }

    #[test]
    fn test_inserted_paragraph_inherits_style() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("one\ntwo"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        text.set_paragraph_style(0, 0, indented(10)).unwrap();
        assert_eq!(text.paragraph_style_at(4).unwrap().left_indent(), 0);

        // Split the first paragraph: both halves keep its style.
        text.replace_str(1, 1, "\n").unwrap();
        assert_eq!(text.text(), "o\nne\ntwo");
        assert_eq!(text.paragraph_style_at(0).unwrap().left_indent(), 10);
        assert_eq!(text.paragraph_style_at(2).unwrap().left_indent(), 10);
        assert_eq!(text.paragraph_style_at(5).unwrap().left_indent(), 0);
    }

    #[test]
    fn test_joining_paragraphs_takes_first_style() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("one\ntwo"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        text.set_paragraph_style(4, 4, indented(7)).unwrap();
        let change = text.replace_str(3, 4, "").unwrap();
        assert_eq!(text.text(), "onetwo");
        for pos in 0..=6 {
            assert_eq!(text.paragraph_style_at(pos).unwrap().left_indent(), 0);
        }
        assert!(change.paragraph_style_changed);
        assert_eq!(change.layout_end, 7);
    }

    #[test]
    fn test_set_paragraph_style_snaps_to_paragraphs() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("aa\nbb\ncc"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        let change = text.set_paragraph_style(4, 4, indented(3)).unwrap();
        assert_eq!(change.layout_begin, 3);
        assert_eq!(change.layout_end, 6);
        assert!(change.paragraph_style_changed);
        assert!(!change.full_relayout);
        assert_eq!(text.paragraph_style_at(2).unwrap().left_indent(), 0);
        assert_eq!(text.paragraph_style_at(3).unwrap().left_indent(), 3);
        assert_eq!(text.paragraph_style_at(5).unwrap().left_indent(), 3);
        assert_eq!(text.paragraph_style_at(6).unwrap().left_indent(), 0);
    }

    #[test]
    fn test_modify_paragraph_style_per_paragraph() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("aa\nbb"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        text.set_paragraph_style(0, 0, indented(4)).unwrap();
        let modifier = ParagraphStyleModifier::new().alignment(Alignment::Right);
        text.modify_paragraph_style(0, 5, &modifier).unwrap();
        let first = text.paragraph_style_at(0).unwrap();
        let second = text.paragraph_style_at(4).unwrap();
        assert_eq!(first.left_indent(), 4);
        assert_eq!(second.left_indent(), 0);
        assert_eq!(first.alignment(), Alignment::Right);
        assert_eq!(second.alignment(), Alignment::Right);
    }

    #[test]
    fn test_uniform_mode_drops_paragraph_space() {
        let mut text = ParagraphedBuffer::with_text("aa\nbb", TextPolicy::default()).unwrap();
        let style = ParagraphStyle::builder().paragraph_space(12).build().unwrap();
        let change = text.set_paragraph_style(0, 1, style).unwrap();
        assert_eq!(text.paragraph_style_at(4).unwrap().paragraph_space(), 0);
        assert_eq!(change.layout_begin, 0);
        assert_eq!(change.layout_end, 5);
    }

    #[test]
    fn test_base_style_rebased_on_paragraph_change() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("aa\nbb"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        let big = ParagraphStyle::builder()
            .base_style(CharStyle::sized(32))
            .build()
            .unwrap();
        text.set_paragraph_style(3, 5, big).unwrap();
        assert_eq!(text.style_at(0).unwrap().effective_font_size(), 16);
        assert_eq!(text.style_at(4).unwrap().effective_font_size(), 32);

        // Text typed into the big paragraph picks up its base.
        text.replace_str(5, 5, "c").unwrap();
        assert_eq!(text.style_at(5).unwrap().effective_font_size(), 32);
    }

    #[test]
    fn test_rich_replace_joins_first_paragraph() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("abcd"),
            variable(),
            indented(1),
        )
        .unwrap();
        let mut incoming = ParagraphedBuffer::new(
            StyledBuffer::with_text("xx\nyy"),
            variable(),
            indented(9),
        )
        .unwrap();
        incoming.set_paragraph_style(3, 5, indented(5)).unwrap();

        text.replace_rich_text(2, 2, &incoming).unwrap();
        assert_eq!(text.text(), "abxx\nyycd");
        // "abxx\n" keeps the existing paragraph style.
        assert_eq!(text.paragraph_style_at(0).unwrap().left_indent(), 1);
        assert_eq!(text.paragraph_style_at(4).unwrap().left_indent(), 1);
        // "yycd" is the incoming last paragraph.
        assert_eq!(text.paragraph_style_at(5).unwrap().left_indent(), 5);
        assert_eq!(text.paragraph_style_at(9).unwrap().left_indent(), 5);
    }

    #[test]
    fn test_constraint_applies_to_inbound_styles() {
        let mut text = ParagraphedBuffer::with_text("abc", TextPolicy::default()).unwrap();
        let change = text
            .set_constraint(Some(StyleModifier::new().remove(TextAttributes::BOLD)))
            .unwrap();
        assert!(change.full_relayout);
        text.set_style(0, 3, CharStyle::builder().bold().italic().build())
            .unwrap();
        let attrs = text.style_at(1).unwrap().effective_attributes();
        assert!(!attrs.contains(TextAttributes::BOLD));
        assert!(attrs.contains(TextAttributes::ITALIC));

        text.replace_text(3, 3, &StyledBuffer::styled("d", CharStyle::builder().bold().build()))
            .unwrap();
        assert!(!text
            .style_at(3)
            .unwrap()
            .effective_attributes()
            .contains(TextAttributes::BOLD));
    }

    #[test]
    fn test_heading_space_normalized_without_heading() {
        let mut text = ParagraphedBuffer::new(
            StyledBuffer::with_text("title\nbody"),
            variable(),
            ParagraphStyle::default(),
        )
        .unwrap();
        let with_heading = ParagraphStyle::builder()
            .heading(12)
            .heading_space(4)
            .build()
            .unwrap();
        text.set_paragraph_style(0, 0, with_heading).unwrap();
        assert!(text.paragraph_style_at(0).unwrap().has_heading());

        let modifier = ParagraphStyleModifier::new().no_heading().heading_space(5);
        text.modify_paragraph_style(0, 0, &modifier).unwrap();
        let style = text.paragraph_style_at(0).unwrap();
        assert!(!style.has_heading());
        assert_eq!(style.heading_space(), 0);
    }
}
