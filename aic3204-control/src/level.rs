//! Logical 0–100 control level.

use crate::error::ValidationError;

/// A logical control level, clamped to 0–100.
///
/// Wraps a `u8` with the invariant `0 <= value <= 100`. The clamping
/// constructors ([`Level::new`], `From<i32>`, [`Level::from_unit`]) truncate
/// out-of-range input instead of rejecting it; [`Level::try_new`] is the
/// strict variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Level(u8);

impl Level {
    /// Silent / minimum gain.
    pub const MIN: Self = Self(0);

    /// Full scale.
    pub const MAX: Self = Self(100);

    /// Create a level, clamping values above 100 to 100.
    pub const fn new(value: u8) -> Self {
        if value > 100 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Create a level, rejecting values above 100.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            Err(ValidationError::OutOfRange {
                value: i32::from(value),
            })
        } else {
            Ok(Self(value))
        }
    }

    /// Map a unit-scale value (0.0 = silent, 1.0 = full scale) to a level.
    ///
    /// Rounds to the nearest step; NaN maps to 0.
    pub fn from_unit(level: f32) -> Self {
        // `as` saturates and sends NaN to 0.
        Self::from(libm::roundf(level * 100.0) as i32)
    }

    /// The inner value (0–100).
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Self(value.clamp(0, 100) as u8)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl core::fmt::Display for Level {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
