//! Text storage: styled characters, paragraph styles and edit descriptors.
//!
//! Key types:
//!
//! - [`StyledBuffer`]: Rope-backed characters with run-length encoded styles
//!   and embedded objects
//! - [`ParagraphedBuffer`]: Adds paragraph styles and owns the edit API
//! - [`TextChange`]: What an edit touched, consumed by the line cache
//! - [`RunArray`]: The run-length encoded store behind both style arrays
//!
//! Three characters are reserved: the paragraph separator (configurable,
//! `'\n'` by default), [`LINE_BREAK`] which ends a line without ending the
//! paragraph, and [`OBJECT_MARKER`] which holds an embedded object.
//!
//! # Examples
//!
//! ```
//! use richlayout::{ParagraphedBuffer, TextPolicy};
//!
//! let mut text = ParagraphedBuffer::with_text("first\nsecond", TextPolicy::default()).unwrap();
//! assert_eq!(text.paragraph_begin_index_of(8), 6);
//! assert_eq!(text.next_paragraph_begin_index_of(2), Some(6));
//!
//! let change = text.replace_str(0, 5, "1st").unwrap();
//! assert_eq!(change.length_delta, -2);
//! assert_eq!(text.text(), "1st\nsecond");
//! ```

mod buffer;
mod change;
mod paragraphs;
mod policy;
mod rope;
mod runs;

pub use buffer::StyledBuffer;
pub use change::TextChange;
pub use paragraphs::ParagraphedBuffer;
pub use policy::{GlyphMode, LineHeight, TextPolicy, WrapMode};
pub use rope::RopeWrapper;
pub use runs::RunArray;

/// Ends a line without ending the paragraph.
pub const LINE_BREAK: char = '\u{000B}';

/// Stands in for an embedded object in the character stream.
pub const OBJECT_MARKER: char = '\u{FFFC}';

/// Paragraph separator used by [`TextPolicy::default`].
pub const DEFAULT_PARAGRAPH_SEPARATOR: char = '\n';
