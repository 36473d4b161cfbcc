//! Stop classification of characters for the line scanner.

use crate::text::{LINE_BREAK, OBJECT_MARKER};

/// Why the scanner has to stop at a character instead of just measuring it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StopClass {
    /// Ordinary character: measure and continue.
    #[default]
    None,
    /// Advance to the next tab stop.
    Tab,
    /// Ends the line and the paragraph.
    ParagraphSeparator,
    /// Ends the line, not the paragraph.
    LineBreak,
    /// Embedded object marker.
    Attachment,
    /// Control character drawn as a placeholder glyph.
    Unsupported,
}

impl StopClass {
    /// Whether the character ends the line it is on.
    #[must_use]
    pub const fn is_terminator(self) -> bool {
        matches!(self, Self::ParagraphSeparator | Self::LineBreak)
    }
}

/// Classification table for U+0000..U+00FF plus the object marker.
///
/// Characters above U+00FF never stop the scan, except the object marker.
#[derive(Clone, Debug)]
pub struct StopTable {
    classes: [StopClass; 256],
}

impl StopTable {
    /// Table for a buffer whose paragraphs end at `separator`.
    ///
    /// `separator` must be below U+0100 (checked by `TextPolicy::validate`).
    #[must_use]
    pub fn new(separator: char) -> Self {
        let mut classes = [StopClass::None; 256];
        for (code, class) in classes.iter_mut().enumerate() {
            if code < 0x20 || (0x7f..0xa0).contains(&code) {
                *class = StopClass::Unsupported;
            }
        }
        classes[usize::from(b'\t')] = StopClass::Tab;
        classes[LINE_BREAK as usize] = StopClass::LineBreak;
        if let Ok(sep) = u8::try_from(u32::from(separator)) {
            classes[usize::from(sep)] = StopClass::ParagraphSeparator;
        }
        Self { classes }
    }

    #[must_use]
    pub fn classify(&self, ch: char) -> StopClass {
        match u8::try_from(u32::from(ch)) {
            Ok(low) => self.classes[usize::from(low)],
            Err(_) if ch == OBJECT_MARKER => StopClass::Attachment,
            Err(_) => StopClass::None,
        }
    }
}
