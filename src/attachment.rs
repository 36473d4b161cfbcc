//! Embedded objects placed in the text at object-marker characters.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

/// Where an embedded object sits relative to the text baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// Top edge aligned with the ascent of the surrounding font.
    Top,
    /// Centered on the ascent of the surrounding font.
    Middle,
    /// Bottom edge on the baseline.
    #[default]
    Bottom,
}

impl VerticalAlignment {
    /// Split an object of `height` into (ascent, descent) contributions for
    /// a line whose font has `font_ascent`.
    #[must_use]
    pub const fn extents(self, height: i32, font_ascent: i32) -> (i32, i32) {
        match self {
            Self::Bottom => (height, 0),
            Self::Top => {
                let ascent = if height < font_ascent { height } else { font_ascent };
                (ascent, height - ascent)
            }
            Self::Middle => {
                let ascent = (height + font_ascent) / 2;
                let ascent = if ascent > height { height } else { ascent };
                (ascent, height - ascent)
            }
        }
    }
}

impl TryFrom<u8> for VerticalAlignment {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Top),
            1 => Ok(Self::Middle),
            2 => Ok(Self::Bottom),
            other => Err(Error::enum_value("vertical alignment", other)),
        }
    }
}

impl FromStr for VerticalAlignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "middle" | "center" => Ok(Self::Middle),
            "bottom" | "baseline" => Ok(Self::Bottom),
            _ => Err(Error::enum_value("vertical alignment", s)),
        }
    }
}

/// An embedded object (image, widget, formula) occupying one marker
/// character.
///
/// The size query may block in the implementor (e.g. while an image
/// decodes). Implementations that load asynchronously should report a
/// provisional size and have the owner invalidate the layout once the real
/// size is known.
pub trait Attachment: fmt::Debug + Send + Sync {
    /// Current `(width, height)`. Degenerate sizes are laid out as zero.
    fn size(&self) -> (i32, i32);

    /// Resize the object. Only called when [`Attachment::is_resizable`].
    fn set_size(&self, _width: i32, _height: i32) {}

    fn is_resizable(&self) -> bool {
        false
    }

    fn vertical_alignment(&self) -> VerticalAlignment {
        VerticalAlignment::Bottom
    }

    /// Fraction of the line's text width the object should take; 0 disables
    /// ratio sizing.
    fn width_ratio(&self) -> f32 {
        0.0
    }
}

/// Shared handle stored in the buffer's attachment map.
pub type AttachmentRef = Arc<dyn Attachment>;

/// Clamp a reported size to non-negative values.
pub(crate) fn layout_size(attachment: &dyn Attachment) -> (i32, i32) {
    let (w, h) = attachment.size();
    (w.max(0), h.max(0))
}

/// A plain box with a fixed or ratio-driven size.
#[derive(Debug)]
pub struct BoxAttachment {
    width: AtomicI32,
    height: AtomicI32,
    ratio_bits: AtomicU32,
    alignment: VerticalAlignment,
    resizable: bool,
}

impl BoxAttachment {
    /// A non-resizable box.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: AtomicI32::new(width),
            height: AtomicI32::new(height),
            ratio_bits: AtomicU32::new(0f32.to_bits()),
            alignment: VerticalAlignment::Bottom,
            resizable: false,
        }
    }

    /// A resizable box that takes `ratio` of the line's text width.
    #[must_use]
    pub fn with_ratio(height: i32, ratio: f32) -> Self {
        Self {
            ratio_bits: AtomicU32::new(ratio.max(0.0).to_bits()),
            resizable: true,
            ..Self::new(0, height)
        }
    }

    #[must_use]
    pub fn aligned(mut self, alignment: VerticalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Wrap in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> AttachmentRef {
        Arc::new(self)
    }
}

impl Attachment for BoxAttachment {
    fn size(&self) -> (i32, i32) {
        (
            self.width.load(Ordering::Relaxed),
            self.height.load(Ordering::Relaxed),
        )
    }

    fn set_size(&self, width: i32, height: i32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
    }

    fn is_resizable(&self) -> bool {
        self.resizable
    }

    fn vertical_alignment(&self) -> VerticalAlignment {
        self.alignment
    }

    fn width_ratio(&self) -> f32 {
        f32::from_bits(self.ratio_bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_by_alignment() {
        assert_eq!(VerticalAlignment::Bottom.extents(30, 12), (30, 0));
        assert_eq!(VerticalAlignment::Top.extents(30, 12), (12, 18));
        assert_eq!(VerticalAlignment::Top.extents(8, 12), (8, 0));
        assert_eq!(VerticalAlignment::Middle.extents(30, 12), (21, 9));
    }

    #[test]
    fn test_degenerate_size_clamped() {
        let b = BoxAttachment::new(-5, -1);
        assert_eq!(layout_size(&b), (0, 0));
    }

    #[test]
    fn test_box_resize() {
        let b = BoxAttachment::with_ratio(20, 0.5);
        assert!(b.is_resizable());
        assert!((b.width_ratio() - 0.5).abs() < f32::EPSILON);
        b.set_size(40, 20);
        assert_eq!(b.size(), (40, 20));
    }

    #[test]
    fn test_vertical_alignment_parse() {
        assert_eq!("Top".parse::<VerticalAlignment>(), Ok(VerticalAlignment::Top));
        assert!("sideways".parse::<VerticalAlignment>().is_err());
    }
}
