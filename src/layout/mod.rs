//! Line layout: scanning, caching, querying and painting.
//!
//! - [`LineScanner`]: measures characters and finds line ends
//! - [`LineCache`]: the cached lines of one buffer, patched incrementally
//! - [`TextLayout`]: owns a buffer, its cache and the metrics provider
//!
//! # Examples
//!
//! ```
//! use richlayout::{MonospaceMetrics, ParagraphedBuffer, TextLayout, TextPolicy, WrapMode};
//!
//! let policy = TextPolicy::default().with_wrap(WrapMode::Word);
//! let text = ParagraphedBuffer::with_text("aaaaa bbbbb", policy).unwrap();
//! let mut layout = TextLayout::new(text, MonospaceMetrics::new(10, 16, 4), 55);
//!
//! assert_eq!(layout.line_count().unwrap(), 2);
//! let repaint = layout.replace_str(0, 0, "x").unwrap();
//! assert!(!repaint.full);
//! ```

mod cache;
mod paint;
mod scanner;
mod stops;
mod view;

pub use cache::{LayoutStats, LineCache, LineEntry, LineGeometry, LineInfo, Repaint};
pub use paint::{AttachmentBox, HeadingMark, Renderer, TextRun};
pub use scanner::{Glyph, LineBounds, LineScanner, ScannedLine};
pub use stops::{StopClass, StopTable};
pub use view::TextLayout;

/// A position in layout coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
