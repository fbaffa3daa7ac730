//! # aic3204-control
//!
//! A `no_std` driver for the gain stages of the Texas Instruments
//! TLV320AIC3204 audio codec, generic over any [`embedded_hal::i2c::I2c`]
//! transport.
//!
//! The codec's registers are 8-bit and paged: every access is a write to the
//! page-select register followed by the access itself, and nothing may reach
//! the bus in between. Volume and input gain are single 0–100 levels that
//! fan out to several coupled registers through piecewise curves, and can be
//! reconstructed (approximately) from register readback.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Transport | [`codec::bus`] | [`PagedBus`]: page select + access under one lock |
//! | Registers | [`codec::registers`] / [`codec::init`] | Register map and bring-up table |
//! | Policy | [`curve`] | [`OutputCurve`] and [`InputCurve`], forward and inverse |
//! | Controller | [`codec`] | [`Aic3204`] typestate controller, [`AudioControl`] |
//! | Front end | [`controls`] | Text controls `volume_level`, `input_gain`, `register_access` |
//!
//! ## Quick start
//!
//! ```ignore
//! use aic3204_control::{Aic3204, CodecConfig, PagedBus, SharedBus};
//! use aic3204_control::controls::{Control, ControlSurface};
//!
//! let bus: SharedBus<_> = PagedBus::new(i2c);
//! let mut codec = Aic3204::new(&bus, CodecConfig::new())
//!     .attach()
//!     .map_err(|e| e.error)?;
//!
//! codec.set_volume(65)?;
//!
//! let mut surface = ControlSurface::new(&mut codec);
//! surface.store(Control::RegisterAccess, "0 65 0\n")?;
//! let volume = surface.show(Control::VolumeLevel, "")?;
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | `defmt` logging and `defmt::Format` on public types |
//! | `mock` | no | [`mock::MockAic3204`], a simulated register file (needs `std`) |

#![cfg_attr(not(test), no_std)]

#[cfg(feature = "mock")]
extern crate std;

pub mod constants;
pub mod control;
pub mod error;
pub mod level;
pub mod curve;
pub mod codec;
pub mod controls;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use codec::{Aic3204, BringUpError, CodecConfig, CodecState, LocalBus, PagedBus, SharedBus};
pub use control::AudioControl;
pub use curve::{GainCurve, InputCurve, OutputCurve};
pub use error::{Error, ValidationError};
pub use level::Level;
