//! Bring-up register sequence.
//!
//! An [`InitSequence`] is an ordered, immutable list of [`RegisterWrite`]s.
//! Entries at offset 0 are page selects; the rest are functional writes on
//! the page selected before them. The list is replayed verbatim, one transfer
//! per entry, inside a single bus transaction.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::i2c::I2c;

use super::bus::PagedBus;
use super::registers::{self as reg, RegisterAddress};
use crate::error::Error;

/// One register write: page, offset and the value to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    /// Page the write applies to.
    pub page: u8,
    /// Register offset; 0 is the page-select register.
    pub offset: u8,
    /// Value written.
    pub value: u8,
}

impl RegisterWrite {
    /// A page-select entry.
    pub const fn select_page(page: u8) -> Self {
        Self {
            page,
            offset: reg::PAGE_SELECT,
            value: page,
        }
    }

    /// A functional write to `address`.
    pub const fn write(address: RegisterAddress, value: u8) -> Self {
        Self {
            page: address.page,
            offset: address.offset,
            value,
        }
    }

    /// Whether this entry writes the page-select register.
    pub const fn is_page_select(&self) -> bool {
        self.offset == reg::PAGE_SELECT
    }

    /// The register this entry writes.
    pub const fn address(&self) -> RegisterAddress {
        RegisterAddress::new(self.page, self.offset)
    }
}

/// Ordered bring-up table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitSequence(&'static [RegisterWrite]);

use RegisterWrite as W;

/// Stock bring-up: clocks from MCLK, analog power, outputs routed from the
/// DAC, MicPGA on IN1, ADC and DAC powered and unmuted.
const STOCK_TABLE: &[RegisterWrite] = &[
    W::select_page(reg::PAGE_0),
    W::write(reg::SOFTWARE_RESET, 0x01),
    W::select_page(reg::PAGE_0),
    // NDAC = 1, MDAC = 4
    W::write(reg::CLK_NDAC, 0x81),
    W::write(reg::CLK_MDAC, 0x84),
    // NADC = 1, MADC = 4
    W::write(reg::CLK_NADC, 0x81),
    W::write(reg::CLK_MADC, 0x84),
    // CLKOUT from ADC_MOD_CLK, M = 1, routed to GPIO
    W::write(reg::CLKOUT_MUX, 0x07),
    W::write(reg::CLKOUT_M, 0x81),
    W::write(reg::GPIO_CTRL, 0x10),

    W::select_page(reg::PAGE_1),
    // Weak AVDD off after the LDO is up
    W::write(reg::LDO_CTRL, 0x09),
    W::write(reg::POWER_CONFIG, 0x08),
    W::write(reg::LDO_CTRL, 0x01),
    W::write(reg::MICBIAS, 0x00),
    // Reference charges in 40 ms
    W::write(reg::REF_POWERUP, 0x01),

    W::select_page(reg::PAGE_1),
    W::write(reg::HP_STARTUP, 0x25),
    // DAC to HPL, HPR, LOL, LOR
    W::write(reg::HPL_ROUTING, 0x08),
    W::write(reg::HPR_ROUTING, 0x08),
    W::write(reg::LOL_ROUTING, 0x08),
    W::write(reg::LOR_ROUTING, 0x08),
    // Power up all four drivers
    W::write(reg::OUTPUT_DRIVER_POWER, 0x3C),
    // +7 dB, unmuted
    W::write(reg::HPL_GAIN, 0x07),
    W::write(reg::HPR_GAIN, 0x07),
    W::write(reg::LOL_GAIN, 0x07),
    W::write(reg::LOR_GAIN, 0x07),

    W::select_page(reg::PAGE_1),
    // IN1 to MicPGA through 20k, CM through 20k
    W::write(reg::LEFT_MICPGA_P, 0x80),
    W::write(reg::LEFT_MICPGA_N, 0x80),
    W::write(reg::RIGHT_MICPGA_P, 0x80),
    W::write(reg::RIGHT_MICPGA_N, 0x80),
    // MicPGA +7.5 dB
    W::write(reg::LEFT_MICPGA_VOLUME, 0x0F),
    W::write(reg::RIGHT_MICPGA_VOLUME, 0x0F),

    W::select_page(reg::PAGE_0),
    // Power both ADCs, unmute
    W::write(reg::ADC_SETUP, 0xC0),
    W::write(reg::ADC_FINE_GAIN, 0x00),

    W::select_page(reg::PAGE_0),
    W::write(reg::ADC_LEFT_VOLUME, 0x23),
    W::write(reg::ADC_RIGHT_VOLUME, 0x23),
    W::write(reg::DAC_LEFT_VOLUME, 0x30),
    W::write(reg::DAC_RIGHT_VOLUME, 0x30),

    W::select_page(reg::PAGE_0),
    W::write(reg::DAC_LEFT_VOLUME, 0x00),
    W::write(reg::DAC_RIGHT_VOLUME, 0x00),
    // Power both DACs, left/right data paths
    W::write(reg::DAC_SETUP, 0xD6),
    // Unmute both DACs
    W::write(reg::DAC_MUTE_CTRL, 0x00),
];

impl InitSequence {
    /// The stock AIC3204 bring-up table.
    pub const AIC3204_DEFAULT: Self = Self(STOCK_TABLE);

    /// Wrap a custom table.
    pub const fn new(writes: &'static [RegisterWrite]) -> Self {
        Self(writes)
    }

    /// The entries in order.
    pub fn iter(&self) -> core::slice::Iter<'static, RegisterWrite> {
        self.0.iter()
    }

    /// Number of entries (and of transfers when applied).
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no entries.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replay the table on `bus`, one transfer per entry, under one lock.
    ///
    /// Stops at the first failing entry and reports its index.
    pub fn apply<M, I2C>(&self, bus: &PagedBus<M, I2C>) -> Result<(), Error<I2C::Error>>
    where
        M: RawMutex,
        I2C: I2c,
    {
        bus.transaction(|tx| {
            for (index, entry) in self.iter().enumerate() {
                let result = if entry.is_page_select() {
                    tx.select_page(entry.value)
                } else {
                    tx.write(entry.address(), entry.value)
                };
                if let Err(source) = result {
                    #[cfg(feature = "defmt")]
                    defmt::error!("init entry {} ({}) failed", index, entry);
                    return Err(Error::SequenceAbort { index, source });
                }
            }
            Ok(())
        })
    }
}

impl Default for InitSequence {
    fn default() -> Self {
        Self::AIC3204_DEFAULT
    }
}

impl IntoIterator for &InitSequence {
    type Item = &'static RegisterWrite;
    type IntoIter = core::slice::Iter<'static, RegisterWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
