//! The paint driver: turns laid-out lines into drawable runs.

use crate::attachment::{AttachmentRef, layout_size};
use crate::layout::scanner::{LineBounds, LineScanner};
use crate::layout::stops::StopClass;
use crate::metrics::{FontInfo, GlyphMetrics, PLACEHOLDER_GLYPH};
use crate::style::CharStyle;
use crate::text::GlyphMode;
use std::ops::{ControlFlow, Range};

/// A run of characters sharing one resolved style, ready to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    /// Buffer range the run was built from.
    pub range: Range<usize>,
    /// Characters to draw, after echo and placeholder substitution.
    pub text: String,
    /// Resolved style.
    pub style: CharStyle,
    pub x: i32,
    pub width: i32,
    /// Top of the line box.
    pub top: i32,
    pub baseline: i32,
    /// Height of the line box, including spacing.
    pub height: i32,
}

/// Where an embedded object is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttachmentBox {
    pub index: usize,
    pub x: i32,
    /// Top edge of the object itself.
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Decoration drawn in the heading area left of a paragraph's first line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadingMark {
    /// First character of the paragraph.
    pub paragraph: usize,
    pub x: i32,
    pub size: i32,
    pub top: i32,
    pub baseline: i32,
    pub height: i32,
}

/// Drawing surface driven by [`LineCache::paint`](crate::LineCache::paint).
///
/// Positions are absolute: the paint origin is already applied.
pub trait Renderer {
    fn draw_text(&mut self, run: &TextRun);

    fn draw_attachment(&mut self, _attachment: &AttachmentRef, _at: AttachmentBox) {}

    fn draw_heading(&mut self, _mark: HeadingMark) {}
}

/// One cached line positioned for painting.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LinePlacement {
    pub begin: usize,
    pub end: usize,
    pub bounds: LineBounds,
    /// Added to scanner x positions: origin plus alignment offset.
    pub shift: i32,
    pub top: i32,
    pub baseline: i32,
    pub height: i32,
}

impl LinePlacement {
    fn start_run(&self, index: usize, x: i32, font: &FontInfo) -> TextRun {
        TextRun {
            range: index..index,
            text: String::new(),
            style: font.style().clone(),
            x,
            width: 0,
            top: self.top,
            baseline: self.baseline,
            height: self.height,
        }
    }
}

fn flush<R: Renderer + ?Sized>(pending: &mut Option<TextRun>, renderer: &mut R) {
    if let Some(run) = pending.take() {
        renderer.draw_text(&run);
    }
}

impl<M: GlyphMetrics + ?Sized> LineScanner<'_, M> {
    /// Emit the part of `line` inside `range`.
    ///
    /// Runs split at style changes, tabs and attachments; terminators are
    /// not drawn.
    pub(crate) fn paint_line<R: Renderer + ?Sized>(
        &mut self,
        line: &LinePlacement,
        range: Range<usize>,
        renderer: &mut R,
    ) {
        let from = range.start.max(line.begin);
        let end = range.end.min(line.end);
        if from >= end {
            return;
        }
        let glyphs = self.glyph_mode();
        let mut pending: Option<TextRun> = None;

        self.walk(line.begin, end, line.bounds, |g, font| {
            if g.index < from {
                return ControlFlow::Continue(());
            }
            let x = line.shift + g.x;
            let drawn = match g.class {
                StopClass::None => Some(glyphs.display_char(g.ch)),
                StopClass::Unsupported => Some(match glyphs {
                    GlyphMode::Normal => PLACEHOLDER_GLYPH,
                    GlyphMode::Echo(echo) => echo,
                }),
                _ => None,
            };
            match drawn {
                Some(ch) => {
                    let extends = pending
                        .as_ref()
                        .is_some_and(|run| run.range.end == g.index && run.style == *font.style());
                    if !extends {
                        flush(&mut pending, renderer);
                        pending = Some(line.start_run(g.index, x, font));
                    }
                    if let Some(run) = pending.as_mut() {
                        run.text.push(ch);
                        run.width += g.advance;
                        run.range.end = g.index + 1;
                    }
                }
                None => {
                    flush(&mut pending, renderer);
                    if let Some(object) = &g.attachment {
                        let (_, height) = layout_size(object.as_ref());
                        let (ascent, _) = object.vertical_alignment().extents(height, font.ascent());
                        let at = AttachmentBox {
                            index: g.index,
                            x,
                            y: line.baseline - ascent,
                            width: g.advance,
                            height,
                        };
                        renderer.draw_attachment(object, at);
                    }
                }
            }
            ControlFlow::Continue(())
        });
        flush(&mut pending, renderer);
    }
}
