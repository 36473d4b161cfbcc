//! Cached line layout with incremental relayout.
//!
//! A [`LineCache`] is either invalid (no lines) or valid for one requested
//! width. [`LineCache::validate`] lays out the whole text;
//! [`LineCache::update`] consumes the [`TextChange`] of an edit and rescans
//! only the lines that can have changed, stopping as soon as a fresh line
//! begins where a shifted old line began.

use crate::error::{Error, Result, check_position, check_range};
use crate::layout::Point;
use crate::layout::paint::{HeadingMark, LinePlacement, Renderer};
use crate::layout::scanner::{LineBounds, LineScanner, ScannedLine};
use crate::metrics::{FontCache, GlyphMetrics};
use crate::style::{Alignment, ParagraphStyle};
use crate::text::{ParagraphedBuffer, TextChange, WrapMode};
use std::cell::RefCell;
use std::ops::Range;
use tracing::debug;

/// One cached line.
///
/// A line ends where the next one begins; the last line ends at the text
/// length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineEntry {
    pub begin: usize,
    /// The line ends its paragraph (always true for the last line).
    pub paragraph_end: bool,
    /// Right margin minus content width, before no-wrap growth.
    pub remaining: i32,
    /// One past the last character the line's scan examined.
    pub reach: usize,
}

/// Vertical placement of one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineGeometry {
    pub top: i32,
    pub baseline: i32,
    /// Distance to the next line's top, including spacing.
    pub height: i32,
}

/// Everything known about one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineInfo {
    pub begin: usize,
    pub end: usize,
    pub paragraph_end: bool,
    /// Free space on the line after no-wrap growth.
    pub remaining: i32,
    /// Left edge of the content, after indent and alignment.
    pub left: i32,
    pub top: i32,
    pub baseline: i32,
    pub height: i32,
}

/// Counters for layout work done since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutStats {
    /// Lines produced by the scanner.
    pub lines_scanned: usize,
    pub full_passes: usize,
    pub incremental_passes: usize,
}

/// The region to redraw after an update, in post-edit coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Repaint {
    pub paint_begin: usize,
    pub paint_end: usize,
    /// Repaint from the start of the line holding `paint_begin`.
    pub from_line_begin: bool,
    /// Repaint to the end of the line holding `paint_end`.
    pub to_line_end: bool,
    pub height_delta: i32,
    pub width_delta: i32,
    /// Every line moved; redraw everything.
    pub full: bool,
}

impl Repaint {
    const fn everything(len: usize, height_delta: i32, width_delta: i32) -> Self {
        Self {
            paint_begin: 0,
            paint_end: len,
            from_line_begin: true,
            to_line_end: true,
            height_delta,
            width_delta,
            full: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Heights {
    /// Fixed line height: every line is as tall as the tallest line.
    Uniform {
        ascent: i32,
        descent: i32,
        line_space: i32,
        /// Ascent and descent of each line's own content.
        extents: Vec<(i32, i32)>,
    },
    PerLine(Vec<LineGeometry>),
}

impl Heights {
    fn geometry(&self, line: usize) -> LineGeometry {
        match self {
            Self::Uniform {
                ascent,
                descent,
                line_space,
                ..
            } => {
                let skip = ascent + descent + line_space;
                let top = line as i32 * skip;
                LineGeometry {
                    top,
                    baseline: top + ascent,
                    height: skip,
                }
            }
            Self::PerLine(lines) => lines.get(line).copied().unwrap_or_default(),
        }
    }
}

/// A scanned line with the spacing of its paragraph.
#[derive(Clone, Copy, Debug)]
struct Measured {
    entry: LineEntry,
    ascent: i32,
    descent: i32,
    spacing: i32,
}

impl Measured {
    fn new(line: &ScannedLine, bounds: LineBounds, style: &ParagraphStyle) -> Self {
        let paragraph_space = if line.paragraph_end {
            style.paragraph_space()
        } else {
            0
        };
        Self {
            entry: LineEntry {
                begin: line.begin,
                paragraph_end: line.paragraph_end,
                remaining: bounds.right - line.x,
                reach: line.reach,
            },
            ascent: line.ascent,
            descent: line.descent,
            spacing: style.line_space() + paragraph_space,
        }
    }

    const fn geometry(&self, top: i32) -> LineGeometry {
        LineGeometry {
            top,
            baseline: top + self.ascent,
            height: self.ascent + self.descent + self.spacing,
        }
    }
}

/// Largest ascent and descent over all lines.
fn tallest(extents: &[(i32, i32)]) -> (i32, i32) {
    extents
        .iter()
        .fold((0, 0), |(a, d), &(ascent, descent)| (a.max(ascent), d.max(descent)))
}

fn stack(lines: &[Measured], mut top: i32) -> (Vec<LineGeometry>, i32) {
    let geometry = lines
        .iter()
        .map(|line| {
            let g = line.geometry(top);
            top += g.height;
            g
        })
        .collect();
    (geometry, top)
}

#[derive(Clone, Debug)]
struct Layout {
    entries: Vec<LineEntry>,
    heights: Heights,
    text_len: usize,
    /// Width added past the requested width by unwrapped content.
    growth: i32,
    height: i32,
}

impl Layout {
    fn build(text: &ParagraphedBuffer, lines: &[Measured]) -> Result<Self> {
        let heights = if text.policy().is_variable() {
            Heights::PerLine(stack(lines, 0).0)
        } else {
            let extents: Vec<(i32, i32)> = lines.iter().map(|l| (l.ascent, l.descent)).collect();
            let (ascent, descent) = tallest(&extents);
            Heights::Uniform {
                ascent,
                descent,
                line_space: text.paragraph_style_at(0)?.line_space(),
                extents,
            }
        };
        let mut layout = Self {
            entries: lines.iter().map(|l| l.entry).collect(),
            heights,
            text_len: text.len(),
            growth: 0,
            height: 0,
        };
        layout.refresh(text.policy().wrap);
        Ok(layout)
    }

    /// Recompute no-wrap growth and total height.
    fn refresh(&mut self, wrap: WrapMode) {
        self.growth = match wrap {
            WrapMode::None => self
                .entries
                .iter()
                .map(|e| -e.remaining)
                .max()
                .unwrap_or(0)
                .max(0),
            WrapMode::Char | WrapMode::Word => 0,
        };
        self.height = match &self.heights {
            Heights::Uniform { .. } => {
                let count = self.entries.len();
                let skip = self.heights.geometry(0).height;
                count as i32 * skip
            }
            Heights::PerLine(lines) => lines.last().map_or(0, |g| g.top + g.height),
        };
    }

    fn line_end(&self, line: usize) -> usize {
        self.entries.get(line + 1).map_or(self.text_len, |e| e.begin)
    }

    fn line_index_of(&self, pos: usize) -> usize {
        line_index(&self.entries, pos)
    }
}

fn line_index(entries: &[LineEntry], pos: usize) -> usize {
    entries.partition_point(|e| e.begin <= pos).saturating_sub(1)
}

const fn shifted(pos: usize, delta: isize) -> usize {
    pos.saturating_add_signed(delta)
}

/// Paragraph style and horizontal bounds of a line starting at `begin`.
fn line_bounds(
    text: &ParagraphedBuffer,
    begin: usize,
    width: i32,
) -> Result<(&ParagraphStyle, LineBounds)> {
    let style = text.paragraph_style_at(begin)?;
    let bounds = LineBounds {
        left: style.text_indent(),
        right: width - style.right_indent(),
        tab: style.tab_width(),
    };
    Ok((style, bounds))
}

/// Scan lines from `from` until `converged` accepts a line end or the text
/// runs out. Returns the lines and whether the end of the text was reached.
fn scan_lines<M, F>(
    scanner: &mut LineScanner<'_, M>,
    width: i32,
    from: usize,
    mut converged: F,
) -> Result<(Vec<Measured>, bool)>
where
    M: GlyphMetrics + ?Sized,
    F: FnMut(usize) -> bool,
{
    let text = scanner.text();
    let len = text.len();
    let mut lines = Vec::new();
    let mut pos = from;
    loop {
        let (style, bounds) = line_bounds(text, pos, width)?;
        let line = scanner.scan_line(pos, bounds);
        lines.push(Measured::new(&line, bounds, style));
        if line.end >= len {
            if line.terminated {
                let (style, bounds) = line_bounds(text, len, width)?;
                let last = scanner.scan_line(len, bounds);
                lines.push(Measured::new(&last, bounds, style));
            }
            return Ok((lines, true));
        }
        pos = line.end;
        if converged(pos) {
            return Ok((lines, false));
        }
    }
}

/// Line layout of one [`ParagraphedBuffer`] at a requested width.
///
/// The cache does not own the text: every call takes the buffer (already
/// in its post-edit state for [`LineCache::update`]) and the metrics
/// provider. Queries fail with [`Error::LayoutInvalid`] until the cache has
/// been validated for the current text.
#[derive(Debug)]
pub struct LineCache {
    width: i32,
    layout: Option<Layout>,
    fonts: RefCell<FontCache>,
    stats: LayoutStats,
}

impl LineCache {
    #[must_use]
    pub fn new(width: i32) -> Self {
        Self {
            width,
            layout: None,
            fonts: RefCell::new(FontCache::default()),
            stats: LayoutStats::default(),
        }
    }

    /// The width lines are broken at.
    #[must_use]
    pub const fn requested_width(&self) -> i32 {
        self.width
    }

    /// Change the requested width; a different width invalidates.
    pub fn set_width(&mut self, width: i32) {
        if width != self.width {
            self.width = width;
            self.layout = None;
        }
    }

    /// Drop the cached lines and fonts (e.g. after an attachment resized or
    /// the metrics provider changed).
    pub fn invalidate(&mut self) {
        self.layout = None;
        self.fonts.get_mut().clear();
    }

    /// Whether the cache holds lines for a text of this length.
    #[must_use]
    pub fn is_valid_for(&self, text: &ParagraphedBuffer) -> bool {
        self.layout
            .as_ref()
            .is_some_and(|layout| layout.text_len == text.len())
    }

    #[must_use]
    pub const fn stats(&self) -> LayoutStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = LayoutStats::default();
    }

    /// Lay out the whole text unless the cache is already valid.
    pub fn validate<M: GlyphMetrics + ?Sized>(
        &mut self,
        text: &ParagraphedBuffer,
        metrics: &M,
    ) -> Result<()> {
        if self.is_valid_for(text) {
            return Ok(());
        }
        self.relayout(text, metrics)
    }

    fn relayout<M: GlyphMetrics + ?Sized>(
        &mut self,
        text: &ParagraphedBuffer,
        metrics: &M,
    ) -> Result<()> {
        let tab_columns = text.policy().tab_columns;
        let fonts = self.fonts.get_mut();
        if fonts.tab_columns() != tab_columns {
            *fonts = FontCache::new(tab_columns);
        }
        let mut scanner = LineScanner::new(text, metrics, fonts);
        let (lines, _) = scan_lines(&mut scanner, self.width, 0, |_| false)?;
        let layout = Layout::build(text, &lines)?;
        self.stats.lines_scanned += lines.len();
        self.stats.full_passes += 1;
        debug!(
            lines = layout.entries.len(),
            width = self.width + layout.growth,
            height = layout.height,
            "full layout"
        );
        self.layout = Some(layout);
        Ok(())
    }

    fn relayout_all<M: GlyphMetrics + ?Sized>(
        &mut self,
        text: &ParagraphedBuffer,
        metrics: &M,
    ) -> Result<Repaint> {
        let before = self.layout.as_ref().map(|l| (l.height, self.width + l.growth));
        self.relayout(text, metrics)?;
        let (height, width) = (self.height_unchecked(), self.width_unchecked());
        let (height_delta, width_delta) =
            before.map_or((0, 0), |(h, w)| (height - h, width - w));
        Ok(Repaint::everything(text.len(), height_delta, width_delta))
    }

    fn height_unchecked(&self) -> i32 {
        self.layout.as_ref().map_or(0, |l| l.height)
    }

    fn width_unchecked(&self) -> i32 {
        self.width + self.layout.as_ref().map_or(0, |l| l.growth)
    }

    /// Bring the cache up to date after `change` was applied to `text`.
    ///
    /// Falls back to a full layout when the change asks for it, when the
    /// cache was invalid, or when fixed-height paragraph metrics changed.
    pub fn update<M: GlyphMetrics + ?Sized>(
        &mut self,
        text: &ParagraphedBuffer,
        metrics: &M,
        change: &TextChange,
    ) -> Result<Repaint> {
        let new_len = text.len();
        let Some(mut layout) = self.layout.take() else {
            return self.relayout_all(text, metrics);
        };
        let patchable = !change.full_relayout
            && !(change.paragraph_style_changed && !text.policy().is_variable())
            && change.layout_begin <= change.layout_end
            && change.layout_end <= layout.text_len
            && layout.text_len.checked_add_signed(change.length_delta) == Some(new_len);
        if !patchable {
            self.layout = Some(layout);
            return self.relayout_all(text, metrics);
        }

        let wrap = text.policy().wrap;
        let delta = change.length_delta;
        let old_len = layout.text_len;
        let old_height = layout.height;
        let old_width = self.width + layout.growth;

        let edit_line = layout.line_index_of(change.layout_begin);
        let mut first = edit_line;
        // Lines whose scan looked at edited text can break differently.
        while first > 0 && layout.entries[first - 1].reach > change.layout_begin {
            first -= 1;
        }
        let start = layout.entries[first].begin;
        let settled = layout
            .entries
            .partition_point(|e| e.begin < change.layout_end);

        let mut converge = layout.entries.len();
        let (lines, reached_end) = {
            let entries = &layout.entries;
            let mut next = settled;
            let mut scanner = LineScanner::new(text, metrics, self.fonts.get_mut());
            scan_lines(&mut scanner, self.width, start, |pos| {
                while next < entries.len() && shifted(entries[next].begin, delta) < pos {
                    next += 1;
                }
                let hit = next < entries.len() && shifted(entries[next].begin, delta) == pos;
                if hit {
                    converge = next;
                }
                hit
            })?
        };
        if reached_end {
            converge = layout.entries.len();
        }

        let old_lines: Vec<(LineEntry, LineGeometry, usize)> = (first..converge)
            .map(|i| (layout.entries[i], layout.heights.geometry(i), layout.line_end(i)))
            .collect();
        let scan_end = if reached_end {
            new_len
        } else {
            shifted(layout.entries[converge].begin, delta)
        };

        let scanned = lines.len();
        layout
            .entries
            .splice(first..converge, lines.iter().map(|l| l.entry));
        for entry in &mut layout.entries[first + scanned..] {
            entry.begin = shifted(entry.begin, delta);
            entry.reach = shifted(entry.reach, delta);
        }

        let mut resized = false;
        let mut moved = false;
        match &mut layout.heights {
            Heights::Uniform {
                ascent,
                descent,
                extents,
                ..
            } => {
                extents.splice(first..converge, lines.iter().map(|l| (l.ascent, l.descent)));
                let (new_ascent, new_descent) = tallest(extents);
                if (new_ascent, new_descent) != (*ascent, *descent) {
                    resized = true;
                    *ascent = new_ascent;
                    *descent = new_descent;
                }
            }
            Heights::PerLine(geometry) => {
                let top = geometry.get(first).map_or(0, |g| g.top);
                let old_bottom = geometry.get(converge).map_or(old_height, |g| g.top);
                let (fresh, bottom) = stack(&lines, top);
                geometry.splice(first..converge, fresh);
                let shift = bottom - old_bottom;
                if shift != 0 {
                    moved = true;
                    for g in &mut geometry[first + scanned..] {
                        g.top += shift;
                        g.baseline += shift;
                    }
                }
            }
        }
        layout.text_len = new_len;
        layout.refresh(wrap);

        let height_delta = layout.height - old_height;
        let width_delta = self.width + layout.growth - old_width;
        let full = resized || width_delta != 0;

        let mut repaint = Repaint {
            paint_begin: change.layout_begin.min(new_len),
            paint_end: change.layout_end.min(new_len),
            from_line_begin: change.paragraph_style_changed,
            to_line_end: false,
            height_delta,
            width_delta,
            full,
        };
        if full {
            repaint = Repaint::everything(new_len, height_delta, width_delta);
        } else {
            let fresh = |k: usize| (layout.entries[first + k], layout.heights.geometry(first + k));
            let same = |k: usize| {
                old_lines
                    .get(k)
                    .is_some_and(|(entry, geometry, _)| (*entry, *geometry) == fresh(k))
            };

            let k_edit = edit_line - first;
            let moved_before = (0..k_edit.min(scanned)).find(|&k| {
                !same(k) || old_lines.get(k).map(|old| old.2) != Some(layout.line_end(first + k))
            });
            if let Some(k) = moved_before {
                repaint.paint_begin = layout.entries[first + k].begin;
                repaint.from_line_begin = true;
            }
            if k_edit < scanned {
                let (entry, geometry) = fresh(k_edit);
                let shifts = text
                    .paragraph_style_at(entry.begin)
                    .is_ok_and(|s| s.alignment() != Alignment::Left);
                let differs = old_lines.get(k_edit).is_none_or(|(old, old_geometry, _)| {
                    *old_geometry != geometry
                        || old.paragraph_end != entry.paragraph_end
                        || (shifts && old.remaining != entry.remaining)
                });
                if differs || repaint.from_line_begin {
                    repaint.paint_begin = repaint.paint_begin.min(entry.begin);
                    repaint.from_line_begin = true;
                }
            }
            let unchanged = scanned == old_lines.len() && (0..scanned).all(same);
            if !(change.style_only && unchanged) {
                repaint.to_line_end = true;
                repaint.paint_end = if moved { new_len } else { scan_end };
            }
        }

        self.stats.lines_scanned += scanned;
        self.stats.incremental_passes += 1;
        debug!(
            first,
            scanned,
            replaced = converge - first,
            old_len,
            new_len,
            ?repaint,
            "incremental layout"
        );
        self.layout = Some(layout);
        Ok(repaint)
    }

    fn layout_for(&self, text: &ParagraphedBuffer) -> Result<&Layout> {
        match &self.layout {
            Some(layout) if layout.text_len == text.len() => Ok(layout),
            _ => Err(Error::LayoutInvalid),
        }
    }

    fn valid_layout(&self) -> Result<&Layout> {
        self.layout.as_ref().ok_or(Error::LayoutInvalid)
    }

    /// Cached lines, in order.
    pub fn entries(&self) -> Result<&[LineEntry]> {
        Ok(&self.valid_layout()?.entries)
    }

    pub fn line_count(&self) -> Result<usize> {
        Ok(self.valid_layout()?.entries.len())
    }

    /// Laid-out width: the requested width plus no-wrap growth.
    pub fn width(&self) -> Result<i32> {
        Ok(self.width + self.valid_layout()?.growth)
    }

    pub fn height(&self) -> Result<i32> {
        Ok(self.valid_layout()?.height)
    }

    pub fn line(&self, text: &ParagraphedBuffer, line: usize) -> Result<LineInfo> {
        let layout = self.layout_for(text)?;
        let entry = *layout
            .entries
            .get(line)
            .ok_or(Error::PositionOutOfBounds {
                pos: line,
                len: layout.entries.len(),
            })?;
        let geometry = layout.heights.geometry(line);
        let remaining = entry.remaining + layout.growth;
        let style = text.paragraph_style_at(entry.begin)?;
        Ok(LineInfo {
            begin: entry.begin,
            end: layout.line_end(line),
            paragraph_end: entry.paragraph_end,
            remaining,
            left: style.text_indent() + style.alignment().offset(remaining),
            top: geometry.top,
            baseline: geometry.baseline,
            height: geometry.height,
        })
    }

    /// Line holding `pos` (`pos == len` allowed).
    pub fn line_index_of(&self, text: &ParagraphedBuffer, pos: usize) -> Result<usize> {
        let layout = self.layout_for(text)?;
        check_position(pos, text.len())?;
        Ok(layout.line_index_of(pos))
    }

    /// Line under `y`, clamped to the first and last line.
    pub fn line_index_at_y(&self, y: i32) -> Result<usize> {
        let layout = self.valid_layout()?;
        let last = layout.entries.len().saturating_sub(1);
        let line = match &layout.heights {
            Heights::Uniform { .. } => {
                let skip = layout.heights.geometry(0).height;
                if skip > 0 { (y.max(0) / skip) as usize } else { 0 }
            }
            Heights::PerLine(lines) => lines.partition_point(|g| g.top <= y).saturating_sub(1),
        };
        Ok(line.min(last))
    }

    /// Left edge of a line's content: text indent plus alignment offset.
    pub fn line_left(&self, text: &ParagraphedBuffer, line: usize) -> Result<i32> {
        Ok(self.line(text, line)?.left)
    }

    /// Caret position before the character at `pos`: x and the top of its
    /// line.
    pub fn point_of<M: GlyphMetrics + ?Sized>(
        &self,
        text: &ParagraphedBuffer,
        metrics: &M,
        pos: usize,
    ) -> Result<Point> {
        let line = self.line_index_of(text, pos)?;
        let info = self.line(text, line)?;
        let (_, bounds) = line_bounds(text, info.begin, self.width)?;
        let mut fonts = self.fonts.borrow_mut();
        let mut scanner = LineScanner::new(text, metrics, &mut fonts);
        let x = scanner.x_of(info.begin, pos, bounds);
        Ok(Point {
            x: x + info.left - bounds.left,
            y: info.top,
        })
    }

    /// Character index nearest to `point`.
    ///
    /// Past the end of a line this answers the line's terminator, or the
    /// line end for wrapped and last lines.
    pub fn index_at<M: GlyphMetrics + ?Sized>(
        &self,
        text: &ParagraphedBuffer,
        metrics: &M,
        point: Point,
    ) -> Result<usize> {
        self.layout_for(text)?;
        let line = self.line_index_at_y(point.y)?;
        let info = self.line(text, line)?;
        let (_, bounds) = line_bounds(text, info.begin, self.width)?;
        let mut fonts = self.fonts.borrow_mut();
        let mut scanner = LineScanner::new(text, metrics, &mut fonts);
        let target = point.x - (info.left - bounds.left);
        Ok(scanner.locate(info.begin, info.end, bounds, target))
    }

    /// Draw the characters of `range` with `renderer`, offset by `origin`.
    pub fn paint<M, R>(
        &self,
        text: &ParagraphedBuffer,
        metrics: &M,
        renderer: &mut R,
        origin: Point,
        range: Range<usize>,
    ) -> Result<()>
    where
        M: GlyphMetrics + ?Sized,
        R: Renderer + ?Sized,
    {
        let layout = self.layout_for(text)?;
        check_range(range.start, range.end, text.len())?;
        if range.is_empty() {
            return Ok(());
        }
        let first = layout.line_index_of(range.start);
        let last = layout.line_index_of(range.end - 1);
        let mut fonts = self.fonts.borrow_mut();
        let mut scanner = LineScanner::new(text, metrics, &mut fonts);
        for line in first..=last {
            let info = self.line(text, line)?;
            let (style, bounds) = line_bounds(text, info.begin, self.width)?;
            let top = origin.y + info.top;
            let baseline = origin.y + info.baseline;
            let starts_paragraph = line == 0 || layout.entries[line - 1].paragraph_end;
            if starts_paragraph && style.has_heading() && range.start <= info.begin {
                renderer.draw_heading(HeadingMark {
                    paragraph: info.begin,
                    x: origin.x + style.left_indent(),
                    size: style.heading_size(),
                    top,
                    baseline,
                    height: info.height,
                });
            }
            let placement = LinePlacement {
                begin: info.begin,
                end: info.end,
                bounds,
                shift: origin.x + info.left - bounds.left,
                top,
                baseline,
                height: info.height,
            };
            scanner.paint_line(&placement, range.clone(), renderer);
        }
        Ok(())
    }
}
