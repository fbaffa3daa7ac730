//! Gain curves: pure mappings between a 0–100 [`Level`] and register bytes.
//!
//! | Curve | Registers | Bands |
//! |-------|-----------|-------|
//! | [`OutputCurve`] | headphone/line driver gain (page 1) + DAC volume (page 0) | mute, attenuated, mid, high, boost |
//! | [`InputCurve`] | ADC volume (page 0) | below 0 dB, at/above 0 dB |
//!
//! The inverse direction reconstructs a level from register readback. It is
//! lossy: several levels share a register state, so `inverse(forward(v))` is
//! only close to `v`, never guaranteed equal.

mod input;
mod output;

pub use input::{BandEdge, InputCurve};
pub use output::{OutputBand, OutputCurve, OutputSetting};

use crate::level::Level;

/// A stateless mapping between a logical level and register contents.
pub trait GainCurve {
    /// Register contents produced by [`forward`](Self::forward).
    type Registers: Copy;

    /// Map a level to register contents. Total over 0–100.
    fn forward(&self, level: Level) -> Self::Registers;

    /// Reconstruct an approximate level from register contents. Total over
    /// every representable value.
    fn inverse(&self, registers: Self::Registers) -> Level;
}
