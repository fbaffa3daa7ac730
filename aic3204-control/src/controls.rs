//! Text control surface.
//!
//! Three named controls take and produce ASCII decimal text, the way a
//! sysfs-style attribute or a serial console would drive them:
//!
//! | Control | `store` input | `show` query | `show` output |
//! |---------|---------------|--------------|---------------|
//! | `volume_level` | `<0-100>` (clamped) | ignored | reconstructed volume |
//! | `input_gain` | `<0-100>` (clamped) | ignored | reconstructed input gain |
//! | `register_access` | `<page> <reg> <value>` | `<page> <reg>` | register contents |
//!
//! Surrounding whitespace is ignored. Malformed input is rejected before
//! anything is sent on the bus.

use core::fmt;
use core::str::FromStr;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::i2c::I2c;

use crate::codec::{Aic3204, Ready};
use crate::error::{Error, ValidationError};

/// One of the exposed controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// `volume_level`
    VolumeLevel,
    /// `input_gain`
    InputGain,
    /// `register_access`
    RegisterAccess,
}

impl Control {
    /// Every control, in listing order.
    pub const ALL: [Control; 3] = [Control::VolumeLevel, Control::InputGain, Control::RegisterAccess];

    /// The control's attribute name.
    pub const fn name(self) -> &'static str {
        match self {
            Control::VolumeLevel => "volume_level",
            Control::InputGain => "input_gain",
            Control::RegisterAccess => "register_access",
        }
    }

    /// Look a control up by attribute name.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|control| control.name() == name.trim())
            .ok_or(ValidationError::UnknownControl)
    }
}

impl FromStr for Control {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value read from a control. Displays as decimal followed by a newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlValue(u8);

impl ControlValue {
    /// The numeric value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.0)
    }
}

/// Text front end over a ready controller.
pub struct ControlSurface<'c, 'bus, M: RawMutex, I2C> {
    codec: &'c mut Aic3204<'bus, M, I2C, Ready>,
}

impl<'c, 'bus, M: RawMutex, I2C: I2c> ControlSurface<'c, 'bus, M, I2C> {
    /// Expose `codec` through the text controls.
    pub fn new(codec: &'c mut Aic3204<'bus, M, I2C, Ready>) -> Self {
        Self { codec }
    }

    /// Write `input` to `control`.
    pub fn store(&mut self, control: Control, input: &str) -> Result<(), Error<I2C::Error>> {
        match control {
            Control::VolumeLevel => {
                let [volume] = parse_fields::<1>(input).map_err(Error::Validation)?;
                self.codec.set_volume(volume)
            }
            Control::InputGain => {
                let [gain] = parse_fields::<1>(input).map_err(Error::Validation)?;
                self.codec.set_input_gain(gain)
            }
            Control::RegisterAccess => {
                let [page, register, value] = parse_bytes::<3>(input).map_err(Error::Validation)?;
                self.codec.write_register(page, register, value)
            }
        }
    }

    /// Read `control`. Only `register_access` uses `query`.
    pub fn show(&mut self, control: Control, query: &str) -> Result<ControlValue, Error<I2C::Error>> {
        let value = match control {
            Control::VolumeLevel => self.codec.read_volume()?.get(),
            Control::InputGain => self.codec.read_input_gain()?.get(),
            Control::RegisterAccess => {
                let [page, register] = parse_bytes::<2>(query).map_err(Error::Validation)?;
                self.codec.read_register(page, register)?
            }
        };
        Ok(ControlValue(value))
    }
}

/// Split `input` into exactly `N` signed decimal fields.
fn parse_fields<const N: usize>(input: &str) -> Result<[i32; N], ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    let mut fields = input.split_ascii_whitespace();
    let mut values = [0i32; N];
    for slot in values.iter_mut() {
        let field = fields.next().ok_or(ValidationError::MissingField)?;
        *slot = field.parse().map_err(|_| ValidationError::NotANumber)?;
    }
    if fields.next().is_some() {
        return Err(ValidationError::TrailingInput);
    }
    Ok(values)
}

/// Like [`parse_fields`], with every field in 0–255.
fn parse_bytes<const N: usize>(input: &str) -> Result<[u8; N], ValidationError> {
    let values = parse_fields::<N>(input)?;
    let mut bytes = [0u8; N];
    for (byte, value) in bytes.iter_mut().zip(values) {
        *byte = u8::try_from(value).map_err(|_| ValidationError::OutOfRange { value })?;
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_tolerate_surrounding_whitespace() {
        assert_eq!(parse_fields::<1>("42\n"), Ok([42]));
        assert_eq!(parse_fields::<1>("  -3 "), Ok([-3]));
        assert_eq!(parse_fields::<1>("+7"), Ok([7]));
        assert_eq!(parse_fields::<3>("0\t65  1\n"), Ok([0, 65, 1]));
    }

    #[test]
    fn malformed_fields() {
        assert_eq!(parse_fields::<1>(""), Err(ValidationError::Empty));
        assert_eq!(parse_fields::<1>(" \n"), Err(ValidationError::Empty));
        assert_eq!(parse_fields::<1>("loud"), Err(ValidationError::NotANumber));
        assert_eq!(parse_fields::<1>("0x10"), Err(ValidationError::NotANumber));
        assert_eq!(parse_fields::<1>("99999999999"), Err(ValidationError::NotANumber));
        assert_eq!(parse_fields::<1>("1 2"), Err(ValidationError::TrailingInput));
        assert_eq!(parse_fields::<3>("1 2"), Err(ValidationError::MissingField));
    }

    #[test]
    fn bytes_are_range_checked() {
        assert_eq!(parse_bytes::<2>("0 255"), Ok([0, 255]));
        assert_eq!(
            parse_bytes::<2>("0 256"),
            Err(ValidationError::OutOfRange { value: 256 })
        );
        assert_eq!(
            parse_bytes::<3>("-1 0 0"),
            Err(ValidationError::OutOfRange { value: -1 })
        );
    }

    #[test]
    fn control_names() {
        for control in Control::ALL {
            assert_eq!(control.name().parse::<Control>(), Ok(control));
        }
        assert_eq!(Control::from_name("volume_level\n"), Ok(Control::VolumeLevel));
        assert_eq!(Control::from_name("mic_gain"), Err(ValidationError::UnknownControl));
    }

    #[test]
    fn value_renders_with_newline() {
        use std::string::ToString;
        assert_eq!(ControlValue(42).to_string(), "42\n");
        assert_eq!(ControlValue(0).to_string(), "0\n");
    }
}
