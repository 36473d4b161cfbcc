//! Shared fixtures for the layout integration tests.

#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)]

use richlayout::layout::{AttachmentBox, HeadingMark};
use richlayout::{
    AttachmentRef, LineCache, MonospaceMetrics, ParagraphedBuffer, Renderer, TextPolicy, TextRun,
    WrapMode,
};
use std::sync::Once;

/// 10 units per character, 16 high with a descent of 4, at the default size.
pub const METRICS: MonospaceMetrics = MonospaceMetrics::new(10, 16, 4);

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

pub fn policy(wrap: WrapMode) -> TextPolicy {
    TextPolicy::default().with_wrap(wrap)
}

pub fn buffer(text: &str, policy: TextPolicy) -> ParagraphedBuffer {
    ParagraphedBuffer::with_text(text, policy).expect("valid policy")
}

/// A validated cache for `text` at `width`.
pub fn validated(text: &ParagraphedBuffer, width: i32) -> LineCache {
    let mut cache = LineCache::new(width);
    cache.validate(text, &METRICS).expect("layout");
    cache
}

/// `(begin, end)` of every cached line.
pub fn ranges(cache: &LineCache, text: &ParagraphedBuffer) -> Vec<(usize, usize)> {
    (0..cache.line_count().expect("valid cache"))
        .map(|i| {
            let line = cache.line(text, i).expect("line");
            (line.begin, line.end)
        })
        .collect()
}

/// Records everything painted.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub runs: Vec<TextRun>,
    pub attachments: Vec<(AttachmentRef, AttachmentBox)>,
    pub headings: Vec<HeadingMark>,
}

impl RecordingRenderer {
    /// Text of all runs, concatenated.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_text(&mut self, run: &TextRun) {
        self.runs.push(run.clone());
    }

    fn draw_attachment(&mut self, attachment: &AttachmentRef, at: AttachmentBox) {
        self.attachments.push((attachment.clone(), at));
    }

    fn draw_heading(&mut self, mark: HeadingMark) {
        self.headings.push(mark);
    }
}
