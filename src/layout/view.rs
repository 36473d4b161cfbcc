//! A buffer together with its layout.

use crate::attachment::AttachmentRef;
use crate::error::Result;
use crate::layout::cache::{LayoutStats, LineCache, LineInfo, Repaint};
use crate::layout::paint::Renderer;
use crate::layout::Point;
use crate::metrics::GlyphMetrics;
use crate::style::{CharStyle, ParagraphStyle, ParagraphStyleModifier, StyleModifier};
use crate::text::{ParagraphedBuffer, StyledBuffer, TextChange};
use std::ops::Range;

/// Owns a [`ParagraphedBuffer`], its [`LineCache`] and the metrics
/// provider, so that every edit reaches the cache right after the buffer.
///
/// Edits return the region to repaint. Queries lay the text out first when
/// the cache is invalid.
#[derive(Debug)]
pub struct TextLayout<M: GlyphMetrics> {
    text: ParagraphedBuffer,
    cache: LineCache,
    metrics: M,
}

impl<M: GlyphMetrics> TextLayout<M> {
    #[must_use]
    pub fn new(text: ParagraphedBuffer, metrics: M, width: i32) -> Self {
        Self {
            text,
            cache: LineCache::new(width),
            metrics,
        }
    }

    #[must_use]
    pub const fn text(&self) -> &ParagraphedBuffer {
        &self.text
    }

    #[must_use]
    pub const fn metrics(&self) -> &M {
        &self.metrics
    }

    #[must_use]
    pub const fn cache(&self) -> &LineCache {
        &self.cache
    }

    /// Swap the metrics provider; the layout is rebuilt on next use.
    pub fn set_metrics(&mut self, metrics: M) {
        self.metrics = metrics;
        self.cache.invalidate();
    }

    pub fn set_width(&mut self, width: i32) {
        self.cache.set_width(width);
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn validate(&mut self) -> Result<()> {
        self.cache.validate(&self.text, &self.metrics)
    }

    fn apply(&mut self, change: &TextChange) -> Result<Repaint> {
        self.cache.update(&self.text, &self.metrics, change)
    }

    pub fn replace_str(&mut self, begin: usize, end: usize, text: &str) -> Result<Repaint> {
        let change = self.text.replace_str(begin, end, text)?;
        self.apply(&change)
    }

    pub fn replace_text(
        &mut self,
        begin: usize,
        end: usize,
        replacement: &StyledBuffer,
    ) -> Result<Repaint> {
        let change = self.text.replace_text(begin, end, replacement)?;
        self.apply(&change)
    }

    pub fn replace_rich_text(
        &mut self,
        begin: usize,
        end: usize,
        replacement: &ParagraphedBuffer,
    ) -> Result<Repaint> {
        let change = self.text.replace_rich_text(begin, end, replacement)?;
        self.apply(&change)
    }

    /// Insert an embedded object at `pos` in the typing style.
    pub fn insert_attachment(&mut self, pos: usize, attachment: AttachmentRef) -> Result<Repaint> {
        let style = self.text.typing_style(pos)?;
        let mut marker = StyledBuffer::new();
        marker.insert_attachment(0, attachment, style)?;
        self.replace_text(pos, pos, &marker)
    }

    pub fn set_style(&mut self, begin: usize, end: usize, style: CharStyle) -> Result<Repaint> {
        let change = self.text.set_style(begin, end, style)?;
        self.apply(&change)
    }

    pub fn modify_style(
        &mut self,
        begin: usize,
        end: usize,
        modifier: &StyleModifier,
    ) -> Result<Repaint> {
        let change = self.text.modify_style(begin, end, modifier)?;
        self.apply(&change)
    }

    pub fn set_constraint(&mut self, constraint: Option<StyleModifier>) -> Result<Repaint> {
        let change = self.text.set_constraint(constraint)?;
        self.apply(&change)
    }

    pub fn set_paragraph_style(
        &mut self,
        begin: usize,
        end: usize,
        style: ParagraphStyle,
    ) -> Result<Repaint> {
        let change = self.text.set_paragraph_style(begin, end, style)?;
        self.apply(&change)
    }

    pub fn modify_paragraph_style(
        &mut self,
        begin: usize,
        end: usize,
        modifier: &ParagraphStyleModifier,
    ) -> Result<Repaint> {
        let change = self.text.modify_paragraph_style(begin, end, modifier)?;
        self.apply(&change)
    }

    pub fn line_count(&mut self) -> Result<usize> {
        self.validate()?;
        self.cache.line_count()
    }

    pub fn line(&mut self, line: usize) -> Result<LineInfo> {
        self.validate()?;
        self.cache.line(&self.text, line)
    }

    pub fn line_index_of(&mut self, pos: usize) -> Result<usize> {
        self.validate()?;
        self.cache.line_index_of(&self.text, pos)
    }

    pub fn line_index_at_y(&mut self, y: i32) -> Result<usize> {
        self.validate()?;
        self.cache.line_index_at_y(y)
    }

    pub fn point_of(&mut self, pos: usize) -> Result<Point> {
        self.validate()?;
        self.cache.point_of(&self.text, &self.metrics, pos)
    }

    pub fn index_at(&mut self, point: Point) -> Result<usize> {
        self.validate()?;
        self.cache.index_at(&self.text, &self.metrics, point)
    }

    pub fn width(&mut self) -> Result<i32> {
        self.validate()?;
        self.cache.width()
    }

    pub fn height(&mut self) -> Result<i32> {
        self.validate()?;
        self.cache.height()
    }

    pub fn paint<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        origin: Point,
        range: Range<usize>,
    ) -> Result<()> {
        self.validate()?;
        self.cache
            .paint(&self.text, &self.metrics, renderer, origin, range)
    }

    #[must_use]
    pub const fn stats(&self) -> LayoutStats {
        self.cache.stats()
    }

    pub fn reset_stats(&mut self) {
        self.cache.reset_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::BoxAttachment;
    use crate::metrics::MonospaceMetrics;
    use crate::text::{TextPolicy, WrapMode};

    fn layout(text: &str, width: i32) -> TextLayout<MonospaceMetrics> {
        let policy = TextPolicy::default().with_wrap(WrapMode::Word);
        let text = ParagraphedBuffer::with_text(text, policy).unwrap();
        TextLayout::new(text, MonospaceMetrics::new(10, 16, 4), width)
    }

    #[test]
    fn test_queries_validate_lazily() {
        let mut layout = layout("ab\ncd", 100);
        assert_eq!(layout.stats().full_passes, 0);
        assert_eq!(layout.line_count().unwrap(), 2);
        assert_eq!(layout.line_count().unwrap(), 2);
        assert_eq!(layout.stats().full_passes, 1);
    }

    #[test]
    fn test_edit_reaches_cache() {
        let mut layout = layout("ab\ncd", 100);
        layout.validate().unwrap();
        layout.replace_str(5, 5, "\nef").unwrap();
        assert_eq!(layout.stats().incremental_passes, 1);
        assert_eq!(layout.line_count().unwrap(), 3);
        assert_eq!(layout.line(2).unwrap().begin, 6);
    }

    #[test]
    fn test_insert_attachment() {
        let mut layout = layout("ab", 100);
        layout.validate().unwrap();
        layout
            .insert_attachment(1, BoxAttachment::new(30, 40).into_ref())
            .unwrap();
        assert_eq!(layout.text().len(), 3);
        assert!(layout.text().chars().attachment_at(1).is_some());
        assert_eq!(layout.point_of(2).unwrap(), Point::new(40, 0));
        assert_eq!(layout.height().unwrap(), 44);
    }

    #[test]
    fn test_set_metrics_relayouts() {
        let mut layout = layout("abcdef", 100);
        assert_eq!(layout.point_of(6).unwrap().x, 60);
        layout.set_metrics(MonospaceMetrics::new(5, 16, 4));
        assert_eq!(layout.point_of(6).unwrap().x, 30);
    }
}
