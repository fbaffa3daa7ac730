//! Input (ADC gain) curve.
//!
//! Two bands over the ADC digital volume register:
//! - low levels descend from 0x68 (−12 dB) toward 0x29,
//! - high levels ascend from 0x00 (0 dB) to 0x28 (+20 dB).
//!
//! Where the split falls is a parameter. Two parameterisations are in use and
//! they produce different bytes for the same level, so both are provided as
//! presets: [`InputCurve::BELOW_20`] and [`InputCurve::THROUGH_20`].

use super::GainCurve;
use crate::codec::registers::ADC_VOLUME_MASK;
use crate::error::ValidationError;
use crate::level::Level;

/// ADC byte for level 0; also the start of the reserved high range.
const ADC_ATTENUATION_MAX: u16 = 0x68;
/// ADC byte for the last level of the descending band.
const ADC_ATTENUATION_MIN: u16 = 0x29;
/// ADC byte for level 100 (+20 dB).
const ADC_BOOST_MAX: u16 = 0x28;

/// Whether the descending band includes the threshold level itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BandEdge {
    /// Descending band is `0..threshold`.
    Exclusive,
    /// Descending band is `0..=threshold`.
    Inclusive,
}

/// ADC gain curve with a configurable band split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputCurve {
    threshold: u8,
    edge: BandEdge,
    /// Last level of the descending band (>= 1).
    last_low: u8,
}

impl InputCurve {
    /// Descending band 0–19, ascending band 20–100.
    pub const BELOW_20: Self = Self {
        threshold: 20,
        edge: BandEdge::Exclusive,
        last_low: 19,
    };

    /// Descending band 0–20, ascending band 21–100.
    pub const THROUGH_20: Self = Self {
        threshold: 20,
        edge: BandEdge::Inclusive,
        last_low: 20,
    };

    /// Build a curve splitting at `threshold`.
    ///
    /// Both bands must hold at least two levels.
    pub const fn new(threshold: u8, edge: BandEdge) -> Result<Self, ValidationError> {
        let last_low = match edge {
            BandEdge::Exclusive => threshold.wrapping_sub(1),
            BandEdge::Inclusive => threshold,
        };
        if last_low == 0 || last_low >= 99 {
            return Err(ValidationError::InvalidThreshold { threshold });
        }
        Ok(Self {
            threshold,
            edge,
            last_low,
        })
    }

    /// The configured threshold.
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Whether the threshold level belongs to the descending band.
    pub const fn edge(&self) -> BandEdge {
        self.edge
    }

    /// First level of the ascending (0 dB and above) band.
    pub const fn first_boost_level(&self) -> u8 {
        self.last_low + 1
    }
}

impl Default for InputCurve {
    fn default() -> Self {
        Self::BELOW_20
    }
}

impl GainCurve for InputCurve {
    type Registers = u8;

    fn forward(&self, level: Level) -> u8 {
        let g = u16::from(level.get());
        let last_low = u16::from(self.last_low);
        let first_high = last_low + 1;
        let adc = if g <= last_low {
            ADC_ATTENUATION_MAX - (g * (ADC_ATTENUATION_MAX - ADC_ATTENUATION_MIN)) / last_low
        } else {
            ((g - first_high) * ADC_BOOST_MAX) / (100 - first_high)
        };
        adc as u8
    }

    fn inverse(&self, raw: u8) -> Level {
        let adc = u16::from(raw & ADC_VOLUME_MASK);
        let last_low = u16::from(self.last_low);
        let first_high = last_low + 1;
        let gain = if adc >= ADC_ATTENUATION_MAX {
            0
        } else if adc <= ADC_BOOST_MAX {
            first_high + (adc * (100 - first_high)) / ADC_BOOST_MAX
        } else {
            ((ADC_ATTENUATION_MAX - adc) * last_low) / (ADC_ATTENUATION_MAX - ADC_ATTENUATION_MIN)
        };
        Level::new(gain.min(100) as u8)
    }
}
