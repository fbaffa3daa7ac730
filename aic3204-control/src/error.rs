//! Error types for AIC3204 control operations.

use core::fmt;

/// Error returned by controller and control-surface operations.
///
/// `E` is the transport's error type (e.g. `I2C::Error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A byte-level read or write on the bus failed.
    Transport(E),
    /// Control-surface input was malformed or out of range.
    Validation(ValidationError),
    /// The initialization sequence failed at entry `index`.
    SequenceAbort {
        /// Position of the failing entry in the init sequence.
        index: usize,
        /// Transport error reported for that entry.
        source: E,
    },
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Transport(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "bus transfer failed: {e:?}"),
            Error::Validation(e) => write!(f, "invalid input: {e}"),
            Error::SequenceAbort { index, source } => {
                write!(f, "init sequence aborted at entry {index}: {source:?}")
            }
        }
    }
}

/// Rejected control-surface input or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// No input at all.
    Empty,
    /// A field is not a signed decimal integer that fits in `i32`.
    NotANumber,
    /// Fewer fields than the control expects.
    MissingField,
    /// More fields than the control expects.
    TrailingInput,
    /// A numeric field is outside its legal range.
    OutOfRange {
        /// The rejected value.
        value: i32,
    },
    /// The control name is not one of the exposed controls.
    UnknownControl,
    /// An input curve threshold that would leave one band empty.
    InvalidThreshold {
        /// The rejected threshold.
        threshold: u8,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty => f.write_str("empty input"),
            ValidationError::NotANumber => f.write_str("not a decimal integer"),
            ValidationError::MissingField => f.write_str("missing field"),
            ValidationError::TrailingInput => f.write_str("unexpected trailing input"),
            ValidationError::OutOfRange { value } => write!(f, "value {value} out of range"),
            ValidationError::UnknownControl => f.write_str("unknown control"),
            ValidationError::InvalidThreshold { threshold } => {
                write!(f, "input curve threshold {threshold} leaves a band empty")
            }
        }
    }
}
