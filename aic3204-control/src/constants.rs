/// Default 7-bit I2C address of the AIC3204.
pub const DEFAULT_I2C_ADDRESS: u8 = 0x18;

/// Volume applied at bring-up.
pub const DEFAULT_VOLUME: u8 = 50;

/// Input gain applied at bring-up.
pub const DEFAULT_INPUT_GAIN: u8 = 50;
