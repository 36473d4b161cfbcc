//! `richlayout` - Incremental rich-text line layout
//!
//! Styled characters live in run-length encoded buffers, paragraphs carry
//! their own indents, spacing, alignment and headings, and a line cache
//! breaks the text into lines for a given width. After an edit only the
//! lines that can have changed are rescanned.

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_precision_loss)] // Ratio widths are small
#![allow(clippy::cast_possible_wrap)] // Line indices fit in i32
#![allow(clippy::module_name_repetitions)] // Allow LineCache::LineEntry etc
#![allow(clippy::struct_excessive_bools)] // Change and repaint descriptors are flag sets
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for styles
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference
#![allow(clippy::needless_collect)] // Collect for assertions is clear

pub mod attachment;
pub mod color;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod style;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use color::Rgba;
pub use error::{Error, Result};
pub use style::{
    Alignment, CharStyle, Heading, ParagraphStyle, ParagraphStyleBuilder, ParagraphStyleModifier,
    StyleBuilder, StyleModifier, TextAttributes,
};

// Re-export embedded objects
pub use attachment::{Attachment, AttachmentRef, BoxAttachment, VerticalAlignment};

// Re-export text storage
pub use text::{
    GlyphMode, LINE_BREAK, LineHeight, OBJECT_MARKER, ParagraphedBuffer, StyledBuffer,
    TextChange, TextPolicy, WrapMode,
};

// Re-export metrics and layout
pub use layout::{
    LayoutStats, LineCache, LineInfo, LineScanner, Point, Renderer, Repaint, TextLayout, TextRun,
};
pub use metrics::{CellMetrics, FontCache, GlyphMetrics, MonospaceMetrics};
pub use unicode::WidthMethod;
