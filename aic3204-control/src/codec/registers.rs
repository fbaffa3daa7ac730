//! TLV320AIC3204 register addresses and bitfield definitions.
//!
//! The AIC3204 exposes 8-bit registers through a paged register file: offset
//! `0x00` of every page is the page-select register, and each other offset only
//! has meaning relative to the page selected last. Every address below
//! therefore carries its page explicitly as a [`RegisterAddress`].

/// One byte-wide register: a page selector value plus an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterAddress {
    /// Value written to the page-select register before the access.
    pub page: u8,
    /// Register offset inside the page.
    pub offset: u8,
}

impl RegisterAddress {
    /// Build an address from a page and an offset.
    pub const fn new(page: u8, offset: u8) -> Self {
        Self { page, offset }
    }

    /// Whether this is the page-select register of its page.
    pub const fn is_page_select(self) -> bool {
        self.offset == PAGE_SELECT
    }
}

// ── I2C address ────────────────────────────────────────────────────────────

/// Default 7-bit I2C address.
pub const I2C_ADDR: u8 = crate::constants::DEFAULT_I2C_ADDRESS;

// ── Pages ──────────────────────────────────────────────────────────────────

/// Page-select register offset, present on every page.
pub const PAGE_SELECT: u8 = 0x00;

/// Page 0: clocks, digital audio interface, DAC/ADC digital volume.
pub const PAGE_0: u8 = 0;

/// Page 1: analog power, output drivers, MicPGA.
pub const PAGE_1: u8 = 1;

// ── Page 0 ─────────────────────────────────────────────────────────────────

/// Software reset (bit 0, self-clearing).
pub const SOFTWARE_RESET: RegisterAddress = RegisterAddress::new(PAGE_0, 0x01);

/// NDAC divider. Bit 7 = power, bits 6:0 = divider.
pub const CLK_NDAC: RegisterAddress = RegisterAddress::new(PAGE_0, 0x0B);

/// MDAC divider. Bit 7 = power, bits 6:0 = divider.
pub const CLK_MDAC: RegisterAddress = RegisterAddress::new(PAGE_0, 0x0C);

/// NADC divider.
pub const CLK_NADC: RegisterAddress = RegisterAddress::new(PAGE_0, 0x12);

/// MADC divider.
pub const CLK_MADC: RegisterAddress = RegisterAddress::new(PAGE_0, 0x13);

/// CDIV_CLKIN mux for the CLKOUT divider.
pub const CLKOUT_MUX: RegisterAddress = RegisterAddress::new(PAGE_0, 0x19);

/// CLKOUT M divider. Bit 7 = power.
pub const CLKOUT_M: RegisterAddress = RegisterAddress::new(PAGE_0, 0x1A);

/// GPIO/MFP5 control.
pub const GPIO_CTRL: RegisterAddress = RegisterAddress::new(PAGE_0, 0x34);

/// DAC channel setup.
/// - Bit 7 — left DAC power
/// - Bit 6 — right DAC power
/// - Bits 5:4 — left data path
/// - Bits 3:2 — right data path
pub const DAC_SETUP: RegisterAddress = RegisterAddress::new(PAGE_0, 0x3F);

/// DAC channel mute and volume control.
pub const DAC_MUTE_CTRL: RegisterAddress = RegisterAddress::new(PAGE_0, 0x40);

/// Left DAC digital volume, signed 0.5 dB steps.
/// - `0x30` = +24 dB
/// - `0x00` = 0 dB
/// - `0x81` = −63.5 dB
pub const DAC_LEFT_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_0, 0x41);

/// Right DAC digital volume (same encoding as [`DAC_LEFT_VOLUME`]).
pub const DAC_RIGHT_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_0, 0x42);

/// ADC channel setup (power for left/right ADC).
pub const ADC_SETUP: RegisterAddress = RegisterAddress::new(PAGE_0, 0x51);

/// ADC fine gain and mute.
pub const ADC_FINE_GAIN: RegisterAddress = RegisterAddress::new(PAGE_0, 0x52);

/// Left ADC digital volume, 7-bit signed 0.5 dB steps.
/// - `0x28` = +20 dB
/// - `0x00` = 0 dB
/// - `0x68` = −12 dB
/// - Bit 7 reserved
pub const ADC_LEFT_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_0, 0x53);

/// Right ADC digital volume (same encoding as [`ADC_LEFT_VOLUME`]).
pub const ADC_RIGHT_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_0, 0x54);

// ── Page 1 ─────────────────────────────────────────────────────────────────

/// Power configuration (weak AVDD connection).
pub const POWER_CONFIG: RegisterAddress = RegisterAddress::new(PAGE_1, 0x01);

/// LDO control and master analog power.
pub const LDO_CTRL: RegisterAddress = RegisterAddress::new(PAGE_1, 0x02);

/// Output driver power control (HPL, HPR, LOL, LOR, mixer amps).
pub const OUTPUT_DRIVER_POWER: RegisterAddress = RegisterAddress::new(PAGE_1, 0x09);

/// HPL routing.
pub const HPL_ROUTING: RegisterAddress = RegisterAddress::new(PAGE_1, 0x0C);

/// HPR routing.
pub const HPR_ROUTING: RegisterAddress = RegisterAddress::new(PAGE_1, 0x0D);

/// LOL routing.
pub const LOL_ROUTING: RegisterAddress = RegisterAddress::new(PAGE_1, 0x0E);

/// LOR routing.
pub const LOR_ROUTING: RegisterAddress = RegisterAddress::new(PAGE_1, 0x0F);

/// HPL driver gain.
/// - Bit 6 — mute
/// - Bits 5:0 — gain, 6-bit signed 1 dB steps (`0x3A` = −6 dB, `0x1D` = +29 dB)
pub const HPL_GAIN: RegisterAddress = RegisterAddress::new(PAGE_1, 0x10);

/// HPR driver gain (same encoding as [`HPL_GAIN`]).
pub const HPR_GAIN: RegisterAddress = RegisterAddress::new(PAGE_1, 0x11);

/// LOL driver gain (same encoding as [`HPL_GAIN`]).
pub const LOL_GAIN: RegisterAddress = RegisterAddress::new(PAGE_1, 0x12);

/// LOR driver gain (same encoding as [`HPL_GAIN`]).
pub const LOR_GAIN: RegisterAddress = RegisterAddress::new(PAGE_1, 0x13);

/// Headphone driver start-up (de-pop) control.
pub const HP_STARTUP: RegisterAddress = RegisterAddress::new(PAGE_1, 0x14);

/// MICBIAS configuration.
pub const MICBIAS: RegisterAddress = RegisterAddress::new(PAGE_1, 0x21);

/// Left MicPGA positive terminal routing.
pub const LEFT_MICPGA_P: RegisterAddress = RegisterAddress::new(PAGE_1, 0x34);

/// Left MicPGA negative terminal routing.
pub const LEFT_MICPGA_N: RegisterAddress = RegisterAddress::new(PAGE_1, 0x36);

/// Right MicPGA positive terminal routing.
pub const RIGHT_MICPGA_P: RegisterAddress = RegisterAddress::new(PAGE_1, 0x37);

/// Right MicPGA negative terminal routing.
pub const RIGHT_MICPGA_N: RegisterAddress = RegisterAddress::new(PAGE_1, 0x39);

/// Left MicPGA volume.
pub const LEFT_MICPGA_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_1, 0x3B);

/// Right MicPGA volume.
pub const RIGHT_MICPGA_VOLUME: RegisterAddress = RegisterAddress::new(PAGE_1, 0x3C);

/// Reference power-up timing.
pub const REF_POWERUP: RegisterAddress = RegisterAddress::new(PAGE_1, 0x7B);

// ── Bitfields ──────────────────────────────────────────────────────────────

/// Output driver mute bit (D6 of the HPL/HPR/LOL/LOR gain registers).
pub const DRIVER_MUTE: u8 = 1 << 6;

/// Output driver gain field (D5–D0).
pub const DRIVER_GAIN_MASK: u8 = 0x3F;

/// ADC volume field; bit 7 is reserved.
pub const ADC_VOLUME_MASK: u8 = 0x7F;

/// Output driver gains written together by a volume change, in write order.
pub const OUTPUT_DRIVER_GAINS: [RegisterAddress; 4] = [HPL_GAIN, HPR_GAIN, LOL_GAIN, LOR_GAIN];

/// DAC volume registers written by a volume change, in write order.
pub const DAC_VOLUMES: [RegisterAddress; 2] = [DAC_LEFT_VOLUME, DAC_RIGHT_VOLUME];

/// ADC volume registers written by an input gain change, in write order.
pub const ADC_VOLUMES: [RegisterAddress; 2] = [ADC_LEFT_VOLUME, ADC_RIGHT_VOLUME];
