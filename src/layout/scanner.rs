//! The line scanner.
//!
//! [`LineScanner`] walks the character stream of a [`ParagraphedBuffer`]
//! one glyph at a time, switching fonts at style-run boundaries and
//! classifying every character through a [`StopTable`]. The walk itself is
//! shared; three drivers put it to different use:
//!
//! - layout ([`LineScanner::scan_line`]): find where a line ends and how
//!   tall it is
//! - locate ([`LineScanner::locate`], [`LineScanner::x_of`]): map between x
//!   positions and character indices
//! - paint (`LineScanner::paint_line`, in the paint module): emit drawable
//!   runs
//!
//! All scanner state lives in the driver's locals; a line can be scanned
//! again from its begin position at any time and produces the same result.

use crate::attachment::{AttachmentRef, layout_size};
use crate::layout::stops::{StopClass, StopTable};
use crate::metrics::{FontCache, FontInfo, GlyphMetrics};
use crate::text::{GlyphMode, ParagraphedBuffer, WrapMode};
use crate::unicode::last_break_opportunity;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::trace;

/// Horizontal constraints of one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineBounds {
    /// Text margin; scanning starts here.
    pub left: i32,
    /// Right margin; crossing it wraps the line.
    pub right: i32,
    /// Explicit tab width; 0 uses the font-derived width.
    pub tab: i32,
}

/// One measured character.
#[derive(Clone, Debug)]
pub struct Glyph {
    pub index: usize,
    pub ch: char,
    pub class: StopClass,
    /// Left edge.
    pub x: i32,
    pub advance: i32,
    /// Contribution above the baseline.
    pub ascent: i32,
    /// Contribution below the baseline.
    pub descent: i32,
    /// The embedded object, for attachment glyphs.
    pub attachment: Option<AttachmentRef>,
}

/// Where a line ends and how big it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScannedLine {
    pub begin: usize,
    /// Exclusive end; includes a terminating separator and hanging spaces.
    pub end: usize,
    /// Right edge of the content, excluding hanging spaces.
    pub x: i32,
    pub ascent: i32,
    pub descent: i32,
    /// The line ends a paragraph (separator or end of text).
    pub paragraph_end: bool,
    /// The line was ended by a separator or a line break.
    pub terminated: bool,
    /// One past the last character the scan examined. Edits at or after
    /// this position cannot change the line.
    pub reach: usize,
}

/// Per-pass scanner over one buffer.
pub struct LineScanner<'a, M: GlyphMetrics + ?Sized> {
    text: &'a ParagraphedBuffer,
    metrics: &'a M,
    fonts: &'a mut FontCache,
    stops: StopTable,
    glyphs: GlyphMode,
    wrap: WrapMode,
}

impl<'a, M: GlyphMetrics + ?Sized> LineScanner<'a, M> {
    #[must_use]
    pub fn new(text: &'a ParagraphedBuffer, metrics: &'a M, fonts: &'a mut FontCache) -> Self {
        let policy = text.policy();
        Self {
            stops: StopTable::new(policy.paragraph_separator),
            glyphs: policy.glyphs,
            wrap: policy.wrap,
            text,
            metrics,
            fonts,
        }
    }

    pub(crate) const fn text(&self) -> &'a ParagraphedBuffer {
        self.text
    }

    pub(crate) const fn glyph_mode(&self) -> GlyphMode {
        self.glyphs
    }

    /// Font of the style in effect at `pos` (`pos == len` allowed).
    pub fn font_at(&mut self, pos: usize) -> Arc<FontInfo> {
        let chars = self.text.chars();
        let style = chars.style_at(pos).unwrap_or_else(|_| chars.default_style());
        self.fonts.font(self.metrics, style)
    }

    /// Visit the glyphs of `begin..end` laid out from `bounds.left`.
    ///
    /// Stops early when `visit` breaks. Returns the x position reached:
    /// the left edge of the glyph that broke, or the right edge of the last
    /// glyph visited.
    pub fn walk<F>(&mut self, begin: usize, end: usize, bounds: LineBounds, mut visit: F) -> i32
    where
        F: FnMut(&Glyph, &FontInfo) -> ControlFlow<()>,
    {
        let chars = self.text.chars();
        let mut x = bounds.left;
        let Ok(runs) = chars.style_runs(begin, end) else {
            return x;
        };
        let mut text = chars.chars_from(begin);
        for (range, style) in runs {
            let font = self.fonts.font(self.metrics, style);
            for index in range {
                let Some(ch) = text.next() else {
                    return x;
                };
                let glyph = self.glyph(index, ch, x, bounds, &font);
                if visit(&glyph, &font).is_break() {
                    return glyph.x;
                }
                x = glyph.x + glyph.advance;
            }
        }
        x
    }

    fn glyph(&self, index: usize, ch: char, x: i32, bounds: LineBounds, font: &FontInfo) -> Glyph {
        let class = self.stops.classify(ch);
        let mut glyph = Glyph {
            index,
            ch,
            class,
            x,
            advance: 0,
            ascent: font.ascent(),
            descent: font.descent(),
            attachment: None,
        };
        match class {
            StopClass::None => {
                glyph.advance = font.advance(self.metrics, self.glyphs.display_char(ch));
            }
            StopClass::Unsupported => {
                glyph.advance = match self.glyphs {
                    GlyphMode::Normal => font.placeholder_width(),
                    GlyphMode::Echo(echo) => font.advance(self.metrics, echo),
                };
            }
            StopClass::Tab => {
                let tab = if bounds.tab > 0 {
                    bounds.tab
                } else {
                    font.tab_width()
                };
                if tab > 0 {
                    let next = bounds.left + ((x - bounds.left).div_euclid(tab) + 1) * tab;
                    glyph.advance = next - x;
                }
            }
            StopClass::ParagraphSeparator | StopClass::LineBreak => {}
            StopClass::Attachment => {
                if let Some(object) = self.text.chars().attachment_at(index) {
                    let (mut width, height) = layout_size(object.as_ref());
                    let ratio = object.width_ratio();
                    if ratio > 0.0 {
                        let span = (bounds.right - bounds.left).max(0);
                        width = (ratio * span as f32).round() as i32;
                        if object.is_resizable() {
                            object.set_size(width, height);
                        }
                    }
                    let (ascent, descent) =
                        object.vertical_alignment().extents(height, font.ascent());
                    glyph.advance = width;
                    glyph.ascent = ascent.max(font.ascent());
                    glyph.descent = descent.max(font.descent());
                    glyph.attachment = Some(Arc::clone(object));
                }
            }
        }
        glyph
    }

    /// Scan one line starting at `begin`.
    ///
    /// At the end of the text the line is a paragraph end. If the text
    /// ends with a terminator, the caller adds the empty line after it.
    pub fn scan_line(&mut self, begin: usize, bounds: LineBounds) -> ScannedLine {
        let len = self.text.len();
        let start = self.font_at(begin);
        let mut line = ScannedLine {
            begin,
            end: len,
            x: bounds.left,
            ascent: start.ascent(),
            descent: start.descent(),
            paragraph_end: true,
            terminated: false,
            reach: len,
        };
        let wraps = self.wrap != WrapMode::None;
        let mut overflow = None;

        self.walk(begin, len, bounds, |g, _| {
            if g.class.is_terminator() {
                line.ascent = line.ascent.max(g.ascent);
                line.descent = line.descent.max(g.descent);
                line.end = g.index + 1;
                line.paragraph_end = g.class == StopClass::ParagraphSeparator;
                line.terminated = true;
                line.reach = line.end;
                return ControlFlow::Break(());
            }
            // The first glyph always stays on the line.
            if wraps && g.index > begin && g.x + g.advance > bounds.right {
                overflow = Some(g.clone());
                return ControlFlow::Break(());
            }
            line.ascent = line.ascent.max(g.ascent);
            line.descent = line.descent.max(g.descent);
            line.x = g.x + g.advance;
            ControlFlow::Continue(())
        });

        if let Some(glyph) = overflow {
            self.break_line(&mut line, &glyph, bounds);
        }
        line
    }

    /// Settle the end of a line whose glyph `overflow` crossed the margin.
    fn break_line(&mut self, line: &mut ScannedLine, overflow: &Glyph, bounds: LineBounds) {
        line.paragraph_end = false;
        line.terminated = false;
        line.end = overflow.index;
        line.reach = overflow.index + 1;
        if self.wrap != WrapMode::Word {
            return;
        }
        if overflow.ch == ' ' {
            self.hang_spaces(line);
            return;
        }
        match self.word_break(line.begin, overflow.index) {
            Some(at) => self.remeasure(line, at, bounds),
            None => {
                trace!(
                    begin = line.begin,
                    at = overflow.index,
                    "no word boundary, breaking at character"
                );
            }
        }
    }

    /// Keep the run of spaces at `line.end` (and a terminator right after
    /// it) on the line without counting their width.
    fn hang_spaces(&self, line: &mut ScannedLine) {
        let len = self.text.len();
        let mut chars = self.text.chars().chars_from(line.end).peekable();
        while chars.next_if_eq(&' ').is_some() {
            line.end += 1;
        }
        line.reach = line.reach.max((line.end + 1).min(len));
        if let Some(&next) = chars.peek() {
            let class = self.stops.classify(next);
            if class.is_terminator() {
                line.end += 1;
                line.terminated = true;
                line.paragraph_end = class == StopClass::ParagraphSeparator;
            }
        }
        if line.end == len {
            line.paragraph_end = true;
        }
    }

    /// Last word-wrap opportunity in `begin + 1..=overflow`.
    fn word_break(&self, begin: usize, overflow: usize) -> Option<usize> {
        let text = self.text.chars().slice_text(begin, overflow + 1).ok()?;
        last_break_opportunity(&text, overflow - begin).map(|offset| begin + offset)
    }

    /// Shorten `line` to end at `end` and recompute its extent.
    fn remeasure(&mut self, line: &mut ScannedLine, end: usize, bounds: LineBounds) {
        let start = self.font_at(line.begin);
        let (mut ascent, mut descent) = (start.ascent(), start.descent());
        let x = self.walk(line.begin, end, bounds, |g, _| {
            ascent = ascent.max(g.ascent);
            descent = descent.max(g.descent);
            ControlFlow::Continue(())
        });
        line.end = end;
        line.x = x;
        line.ascent = ascent;
        line.descent = descent;
    }

    /// Left edge of the glyph at `pos` on a line starting at `begin`.
    pub fn x_of(&mut self, begin: usize, pos: usize, bounds: LineBounds) -> i32 {
        self.walk(begin, pos, bounds, |_, _| ControlFlow::Continue(()))
    }

    /// Character index of `begin..end` nearest to `target_x`.
    ///
    /// Snaps to whichever side of a glyph is closer; a terminator is never
    /// passed. Returns `end` when `target_x` lies past the last glyph.
    pub fn locate(&mut self, begin: usize, end: usize, bounds: LineBounds, target_x: i32) -> usize {
        let mut found = end;
        self.walk(begin, end, bounds, |g, _| {
            if g.class.is_terminator() || target_x < g.x + g.advance / 2 {
                found = g.index;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        found
    }
}
