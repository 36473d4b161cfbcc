//! Error types for richlayout.

use thiserror::Error;

/// Result type alias for richlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for buffer, style and layout operations.
///
/// Out-of-range positions are programming errors: every range-taking
/// operation reports them instead of clamping, since a clamped edit would
/// break the length invariant of the run arrays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A `begin..end` range fell outside `0..=len` or had `begin > end`.
    #[error("range {begin}..{end} out of bounds for length {len}")]
    RangeOutOfBounds { begin: usize, end: usize, len: usize },
    /// A single position fell outside `0..=len`.
    #[error("position {pos} out of bounds for length {len}")]
    PositionOutOfBounds { pos: usize, len: usize },
    /// An enum-valued setting was given an unknown value.
    #[error("invalid {kind} value: {value}")]
    InvalidEnumValue { kind: &'static str, value: String },
    /// Invalid color format (e.g., malformed hex string).
    #[error("invalid color format: {0}")]
    InvalidColor(String),
    /// A style value object was constructed with out-of-range fields.
    #[error("invalid style: {0}")]
    InvalidStyle(String),
    /// The configured paragraph separator cannot be used as a stop character.
    #[error("invalid paragraph separator {0:?}")]
    InvalidSeparator(char),
    /// An attachment was placed on a character that is not the object marker.
    #[error("no embedded object marker at position {0}")]
    NotAnAttachment(usize),
    /// A geometric query was made against an invalidated line cache.
    #[error("line layout is not valid")]
    LayoutInvalid,
}

impl Error {
    pub(crate) fn enum_value(kind: &'static str, value: impl ToString) -> Self {
        Self::InvalidEnumValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Check `begin..end` against a buffer length.
pub(crate) fn check_range(begin: usize, end: usize, len: usize) -> Result<()> {
    if begin > end || end > len {
        return Err(Error::RangeOutOfBounds { begin, end, len });
    }
    Ok(())
}

/// Check a single position against a buffer length (inclusive).
pub(crate) fn check_position(pos: usize, len: usize) -> Result<()> {
    if pos > len {
        return Err(Error::PositionOutOfBounds { pos, len });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RangeOutOfBounds {
            begin: 4,
            end: 2,
            len: 10,
        };
        assert!(err.to_string().contains("4..2"));

        let err = Error::enum_value("alignment", 9);
        assert_eq!(err.to_string(), "invalid alignment value: 9");

        let err = Error::InvalidColor("#zz".to_string());
        assert!(err.to_string().contains("invalid color format"));
    }

    #[test]
    fn test_range_checks() {
        assert!(check_range(0, 0, 0).is_ok());
        assert!(check_range(2, 5, 5).is_ok());
        assert_eq!(
            check_range(3, 2, 5),
            Err(Error::RangeOutOfBounds {
                begin: 3,
                end: 2,
                len: 5
            })
        );
        assert!(check_range(0, 6, 5).is_err());
        assert!(check_position(5, 5).is_ok());
        assert_eq!(
            check_position(6, 5),
            Err(Error::PositionOutOfBounds { pos: 6, len: 5 })
        );
    }
}
