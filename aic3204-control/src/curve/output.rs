//! Output (volume) curve.
//!
//! The headphone/line driver analog stage does most of the work; the DAC
//! digital stage only trims the extremes:
//!
//! | Level | Driver gain byte | DAC volume byte |
//! |-------|------------------|-----------------|
//! | 0 | mute bit, gain 0 | 0x00 |
//! | 1–20 | 0x3A (−6 dB) down to 0x00 (0 dB) | 0xA0 (−48 dB) |
//! | 21–60 | 0x00 up to 0x14 (+20 dB) | 0x00 |
//! | 61–90 | 0x14 up to 0x1D (+29 dB) | 0x00 |
//! | 91–100 | 0x1D | 0x04 (+2 dB) up to 0x10 (+8 dB) |

use super::GainCurve;
use crate::codec::registers::{DRIVER_GAIN_MASK, DRIVER_MUTE};
use crate::level::Level;

/// Driver gain at the bottom of the attenuated band (−6 dB).
const HP_ATTENUATED: u16 = 0x3A;
/// Driver gain at the top of the mid band (+20 dB).
const HP_MID: u16 = 0x14;
/// Maximum driver gain (+29 dB).
const HP_MAX: u16 = 0x1D;

/// DAC attenuation held throughout the attenuated band.
const DAC_ATTENUATED: u8 = 0xA0;
/// DAC 0 dB.
const DAC_0DB: u8 = 0x00;
/// DAC boost at level 91.
const DAC_BOOST_MIN: u16 = 0x04;
/// DAC boost at level 100.
const DAC_BOOST_MAX: u16 = 0x10;

/// Register pair written by a volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputSetting {
    /// Output driver gain register (HPL/HPR/LOL/LOR): mute bit + 6-bit gain.
    pub headphone: u8,
    /// DAC digital volume register (left/right).
    pub dac: u8,
}

impl OutputSetting {
    /// Whether the driver mute bit is set.
    pub const fn is_muted(self) -> bool {
        self.headphone & DRIVER_MUTE != 0
    }

    /// The 6-bit driver gain field.
    pub const fn gain_field(self) -> u8 {
        self.headphone & DRIVER_GAIN_MASK
    }
}

/// The five contiguous bands of the output curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputBand {
    /// Level 0.
    Muted,
    /// Levels 1–20.
    Attenuated,
    /// Levels 21–60.
    Mid,
    /// Levels 61–90.
    High,
    /// Levels 91–100.
    Boost,
}

impl OutputBand {
    /// The band a level falls in.
    pub const fn of(level: Level) -> Self {
        match level.get() {
            0 => OutputBand::Muted,
            1..=20 => OutputBand::Attenuated,
            21..=60 => OutputBand::Mid,
            61..=90 => OutputBand::High,
            _ => OutputBand::Boost,
        }
    }
}

/// Volume curve for the AIC3204 headphone/line drivers and DAC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputCurve;

impl OutputCurve {
    fn mid_level(hp: u16) -> u16 {
        21 + (hp * 39) / HP_MID
    }

    fn high_level(hp: u16) -> u16 {
        (61 + ((hp - HP_MID) * 29) / (HP_MAX - HP_MID)).min(90)
    }
}

impl GainCurve for OutputCurve {
    type Registers = OutputSetting;

    fn forward(&self, level: Level) -> OutputSetting {
        let v = u16::from(level.get());
        let (hp, dac) = match OutputBand::of(level) {
            OutputBand::Muted => {
                return OutputSetting {
                    headphone: DRIVER_MUTE,
                    dac: DAC_0DB,
                }
            }
            OutputBand::Attenuated => (HP_ATTENUATED - ((v - 1) * HP_ATTENUATED) / 19, DAC_ATTENUATED),
            OutputBand::Mid => (((v - 21) * HP_MID) / 39, DAC_0DB),
            OutputBand::High => (HP_MID + ((v - 61) * (HP_MAX - HP_MID)) / 29, DAC_0DB),
            OutputBand::Boost => {
                let dac = DAC_BOOST_MIN + ((v - 91) * (DAC_BOOST_MAX - DAC_BOOST_MIN)) / 9;
                (HP_MAX, dac as u8)
            }
        };
        OutputSetting {
            headphone: hp as u8,
            dac,
        }
    }

    fn inverse(&self, setting: OutputSetting) -> Level {
        if setting.is_muted() {
            return Level::MIN;
        }
        let hp = u16::from(setting.gain_field());
        let dac = u16::from(setting.dac);
        let zero_db = setting.dac == DAC_0DB;

        let level = if (DAC_BOOST_MIN..=DAC_BOOST_MAX).contains(&dac) {
            91 + ((dac - DAC_BOOST_MIN) * 9) / (DAC_BOOST_MAX - DAC_BOOST_MIN)
        } else if zero_db && (HP_MID..=HP_MAX).contains(&hp) {
            Self::high_level(hp)
        } else if zero_db && hp <= HP_MID {
            Self::mid_level(hp)
        } else if setting.dac == DAC_ATTENUATED && hp <= HP_ATTENUATED {
            1 + ((HP_ATTENUATED - hp) * 19) / HP_ATTENUATED
        } else if hp == 0 {
            21
        } else if hp <= HP_MID {
            Self::mid_level(hp)
        } else if hp <= HP_MAX {
            Self::high_level(hp)
        } else {
            // Driver gain in the attenuation range with an unexpected DAC value.
            20
        };
        Level::new(level.min(100) as u8)
    }
}
