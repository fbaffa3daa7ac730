//! TLV320AIC3204 gain controller.
//!
//! [`Aic3204`] owns the logical volume and input gain, turns them into
//! register bytes through the configured [`GainCurve`]s and writes them over a
//! shared [`PagedBus`]. Bring-up is a typestate transition:
//!
//! ```text
//! [Uninitialized] --run_init_sequence() / attach()--> [Ready] --detach()--> [Uninitialized]
//! ```
//!
//! # Example
//!
//! ```ignore
//! let bus: SharedBus<_> = PagedBus::new(i2c);
//! let mut codec = Aic3204::new(&bus, CodecConfig::new())
//!     .attach()
//!     .map_err(BringUpError::into_error)?;
//! codec.set_volume(70)?;
//! let now = codec.read_volume()?;
//! ```

use core::fmt;
use core::marker::PhantomData;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::i2c::I2c;

use super::bus::PagedBus;
use super::init::InitSequence;
use super::registers as reg;
use crate::constants::{DEFAULT_INPUT_GAIN, DEFAULT_VOLUME};
use crate::control::AudioControl;
use crate::curve::{GainCurve, InputCurve, OutputCurve, OutputSetting};
use crate::error::Error;
use crate::level::Level;

// ── State types (zero-sized) ──────────────────────────────────────────────

/// Bring-up has not run, or the controller was detached.
pub struct Uninitialized;

/// The init sequence completed; gain operations are available.
pub struct Ready;

// ── State and configuration ───────────────────────────────────────────────

/// Cached logical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CodecState {
    /// Output volume.
    pub volume: Level,
    /// ADC input gain.
    pub input_gain: Level,
}

impl Default for CodecState {
    fn default() -> Self {
        Self {
            volume: Level::new(DEFAULT_VOLUME),
            input_gain: Level::new(DEFAULT_INPUT_GAIN),
        }
    }
}

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Volume curve.
    pub output_curve: OutputCurve,
    /// Input gain curve.
    pub input_curve: InputCurve,
    /// Levels applied by [`Aic3204::attach`].
    pub defaults: CodecState,
    /// Bring-up table.
    pub init_sequence: InitSequence,
}

impl CodecConfig {
    /// Stock configuration: [`InputCurve::BELOW_20`], volume and input gain
    /// 50, [`InitSequence::AIC3204_DEFAULT`].
    pub const fn new() -> Self {
        Self {
            output_curve: OutputCurve,
            input_curve: InputCurve::BELOW_20,
            defaults: CodecState {
                volume: Level::new(DEFAULT_VOLUME),
                input_gain: Level::new(DEFAULT_INPUT_GAIN),
            },
            init_sequence: InitSequence::AIC3204_DEFAULT,
        }
    }

    /// Use a different input gain curve.
    pub const fn with_input_curve(mut self, curve: InputCurve) -> Self {
        self.input_curve = curve;
        self
    }

    /// Apply different levels on attach.
    pub const fn with_defaults(mut self, defaults: CodecState) -> Self {
        self.defaults = defaults;
        self
    }

    /// Use a different bring-up table.
    pub const fn with_init_sequence(mut self, sequence: InitSequence) -> Self {
        self.init_sequence = sequence;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Controller ────────────────────────────────────────────────────────────

/// AIC3204 gain controller.
///
/// Borrows the bus, so other control paths (raw register access, a second
/// controller on a different thread) can share it. `S` is the bring-up state.
pub struct Aic3204<'bus, M: RawMutex, I2C, S = Ready> {
    bus: &'bus PagedBus<M, I2C>,
    config: CodecConfig,
    state: CodecState,
    _state: PhantomData<S>,
}

/// A failed bring-up: the controller, still uninitialized, and the cause.
pub struct BringUpError<'bus, M: RawMutex, I2C: I2c> {
    /// The controller, ready to retry.
    pub codec: Aic3204<'bus, M, I2C, Uninitialized>,
    /// What went wrong.
    pub error: Error<I2C::Error>,
}

impl<'bus, M: RawMutex, I2C: I2c> BringUpError<'bus, M, I2C> {
    /// Drop the controller and keep the error.
    pub fn into_error(self) -> Error<I2C::Error> {
        self.error
    }
}

impl<M: RawMutex, I2C: I2c> fmt::Debug for BringUpError<'_, M, I2C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BringUpError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<M: RawMutex, I2C, S> fmt::Debug for Aic3204<'_, M, I2C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aic3204")
            .field("address", &self.bus.address())
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}

impl<'bus, M: RawMutex, I2C, S> Aic3204<'bus, M, I2C, S> {
    /// Cached logical state.
    pub fn state(&self) -> CodecState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The bus this controller drives.
    pub fn bus(&self) -> &'bus PagedBus<M, I2C> {
        self.bus
    }

    fn into_state<T>(self) -> Aic3204<'bus, M, I2C, T> {
        Aic3204 {
            bus: self.bus,
            config: self.config,
            state: self.state,
            _state: PhantomData,
        }
    }
}

impl<'bus, M: RawMutex, I2C: I2c> Aic3204<'bus, M, I2C, Uninitialized> {
    /// Create a controller. Nothing is sent on the bus.
    pub fn new(bus: &'bus PagedBus<M, I2C>, config: CodecConfig) -> Self {
        Self {
            bus,
            config,
            state: config.defaults,
            _state: PhantomData,
        }
    }

    /// Replay the init sequence and move to [`Ready`].
    ///
    /// The cached state is reset to the configured defaults, but nothing
    /// beyond the table is written; use [`attach`](Self::attach) for a full
    /// bring-up.
    pub fn run_init_sequence(mut self) -> Result<Aic3204<'bus, M, I2C, Ready>, BringUpError<'bus, M, I2C>> {
        #[cfg(feature = "defmt")]
        defmt::info!("aic3204: init sequence ({} writes)", self.config.init_sequence.len());

        if let Err(error) = self.config.init_sequence.apply(self.bus) {
            return Err(BringUpError { codec: self, error });
        }
        self.state = self.config.defaults;
        Ok(self.into_state())
    }

    /// Full bring-up: init sequence, then the default levels through
    /// [`set_volume`](Aic3204::set_volume) and
    /// [`set_input_gain`](Aic3204::set_input_gain).
    pub fn attach(self) -> Result<Aic3204<'bus, M, I2C, Ready>, BringUpError<'bus, M, I2C>> {
        let mut codec = self.run_init_sequence()?;
        let defaults = codec.config.defaults;
        match codec.apply_state(defaults) {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::info!("aic3204: attached, {}", codec.state);
                Ok(codec)
            }
            Err(error) => Err(BringUpError {
                codec: codec.detach(),
                error,
            }),
        }
    }
}

impl<'bus, M: RawMutex, I2C: I2c> Aic3204<'bus, M, I2C, Ready> {
    /// Tear down. Register contents are left as they are.
    pub fn detach(self) -> Aic3204<'bus, M, I2C, Uninitialized> {
        #[cfg(feature = "defmt")]
        defmt::info!("aic3204: detached");
        self.into_state()
    }

    /// Set the output volume.
    ///
    /// Eight transfers: page 1, the HPL/HPR/LOL/LOR gains, page 0, the
    /// left/right DAC volumes. The cached volume changes only once all of them
    /// succeed; writes already made stay applied when a later one fails.
    pub fn set_volume(&mut self, volume: impl Into<Level>) -> Result<(), Error<I2C::Error>> {
        let level = volume.into();
        let setting = self.config.output_curve.forward(level);

        self.bus
            .transaction(|tx| -> Result<(), I2C::Error> {
                tx.select_page(reg::PAGE_1)?;
                for register in reg::OUTPUT_DRIVER_GAINS {
                    tx.write(register, setting.headphone)?;
                }
                tx.select_page(reg::PAGE_0)?;
                for register in reg::DAC_VOLUMES {
                    tx.write(register, setting.dac)?;
                }
                Ok(())
            })
            .inspect_err(|_e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("aic3204: set_volume({}) failed", level);
            })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("aic3204: volume {} -> {}", level, setting);
        self.state.volume = level;
        Ok(())
    }

    /// Reconstruct the volume from HPL gain and left DAC volume.
    ///
    /// The result replaces the cached volume.
    pub fn read_volume(&mut self) -> Result<Level, Error<I2C::Error>> {
        let setting = self.bus.transaction(|tx| -> Result<OutputSetting, I2C::Error> {
            let headphone = tx.read(reg::HPL_GAIN)?;
            let dac = tx.read(reg::DAC_LEFT_VOLUME)?;
            Ok(OutputSetting { headphone, dac })
        })
        .inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("aic3204: read_volume failed");
        })?;
        let level = self.config.output_curve.inverse(setting);

        #[cfg(feature = "defmt")]
        defmt::debug!("aic3204: read {} -> volume {}", setting, level);
        self.state.volume = level;
        Ok(level)
    }

    /// Set the ADC input gain: page 0, then left and right ADC volume.
    pub fn set_input_gain(&mut self, gain: impl Into<Level>) -> Result<(), Error<I2C::Error>> {
        let level = gain.into();
        let adc = self.config.input_curve.forward(level);

        self.bus
            .transaction(|tx| -> Result<(), I2C::Error> {
                tx.select_page(reg::PAGE_0)?;
                for register in reg::ADC_VOLUMES {
                    tx.write(register, adc)?;
                }
                Ok(())
            })
            .inspect_err(|_e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("aic3204: set_input_gain({}) failed", level);
            })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("aic3204: input gain {} -> adc {=u8:#x}", level, adc);
        self.state.input_gain = level;
        Ok(())
    }

    /// Reconstruct the input gain from the left ADC volume.
    pub fn read_input_gain(&mut self) -> Result<Level, Error<I2C::Error>> {
        let adc = self
            .bus
            .transaction(|tx| tx.read(reg::ADC_LEFT_VOLUME))
            .inspect_err(|_e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("aic3204: read_input_gain failed");
            })?;
        let level = self.config.input_curve.inverse(adc);

        #[cfg(feature = "defmt")]
        defmt::debug!("aic3204: read adc {=u8:#x} -> input gain {}", adc, level);
        self.state.input_gain = level;
        Ok(level)
    }

    /// Raw write: select `page`, then write `value` to `register`.
    pub fn write_register(&mut self, page: u8, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        #[cfg(feature = "defmt")]
        defmt::info!("aic3204: raw write p{} r{=u8:#x} = {=u8:#x}", page, register, value);
        self.bus.write(page, register, value).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("aic3204: raw write p{} r{=u8:#x} failed", page, register);
        })?;
        Ok(())
    }

    /// Raw read: select `page`, then read `register`.
    pub fn read_register(&mut self, page: u8, register: u8) -> Result<u8, Error<I2C::Error>> {
        let value = self.bus.read(page, register).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("aic3204: raw read p{} r{=u8:#x} failed", page, register);
        })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("aic3204: raw read p{} r{=u8:#x} = {=u8:#x}", page, register, value);
        Ok(value)
    }

    fn apply_state(&mut self, state: CodecState) -> Result<(), Error<I2C::Error>> {
        self.set_volume(state.volume)?;
        self.set_input_gain(state.input_gain)
    }
}

impl<M: RawMutex, I2C: I2c> AudioControl for Aic3204<'_, M, I2C, Ready> {
    type Error = Error<I2C::Error>;

    /// Replay the init sequence and restore the cached levels, e.g. after the
    /// codec lost power.
    ///
    /// Unlike [`Aic3204::attach`], a failure here does not leave the
    /// controller [`Uninitialized`]: it stays `Ready` with its cached levels,
    /// while the codec may be partly re-initialised. Call `enable` again, or
    /// go through [`detach`](Aic3204::detach) and [`attach`](Aic3204::attach)
    /// to get back to a known state.
    fn enable(&mut self) -> Result<(), Self::Error> {
        self.config.init_sequence.apply(self.bus).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("aic3204: re-enable aborted");
        })?;
        let state = self.state;
        self.apply_state(state)
    }

    /// Nothing to do: teardown leaves the registers alone.
    fn disable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn volume(&mut self, level: f32) -> Result<(), Self::Error> {
        self.set_volume(Level::from_unit(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::bus::LocalBus;
    use crate::codec::init::{InitSequence, RegisterWrite};
    use crate::mock::{MockAic3204, Transfer};

    const NO_INIT: CodecConfig = CodecConfig::new().with_init_sequence(InitSequence::new(&[]));

    fn ready<'b>(bus: &'b LocalBus<MockAic3204>) -> Aic3204<'b, embassy_sync::blocking_mutex::raw::NoopRawMutex, MockAic3204> {
        Aic3204::new(bus, NO_INIT).run_init_sequence().unwrap()
    }

    fn w(reg: u8, value: u8) -> Transfer {
        Transfer::Write { reg, value }
    }

    #[test]
    fn set_volume_writes_page1_then_page0() {
        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.set_volume(0).unwrap();
        assert_eq!(codec.state().volume, Level::MIN);
        drop(codec);

        let dev = bus.release();
        assert_eq!(
            dev.log(),
            &[
                w(0x00, 1),
                w(0x10, 0x40),
                w(0x11, 0x40),
                w(0x12, 0x40),
                w(0x13, 0x40),
                w(0x00, 0),
                w(0x41, 0x00),
                w(0x42, 0x00),
            ]
        );
    }

    #[test]
    fn set_volume_clamps() {
        let high = LocalBus::new(MockAic3204::new());
        ready(&high).set_volume(150).unwrap();
        let max = LocalBus::new(MockAic3204::new());
        ready(&max).set_volume(100).unwrap();
        assert_eq!(high.release().log(), max.release().log());

        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.set_volume(-7).unwrap();
        assert_eq!(codec.state().volume, Level::MIN);
        drop(codec);
        assert_eq!(bus.release().peek(1, 0x10), 0x40);
    }

    #[test]
    fn failed_step_stops_and_keeps_cached_volume() {
        for k in 0..8 {
            let mut dev = MockAic3204::new();
            dev.fail_at(k);
            let bus = LocalBus::new(dev);
            let mut codec = ready(&bus);
            let before = codec.state();
            assert!(matches!(codec.set_volume(80), Err(Error::Transport(_))));
            assert_eq!(codec.state(), before);
            drop(codec);
            assert_eq!(bus.release().log().len(), k + 1, "step {k}");
        }
    }

    #[test]
    fn earlier_writes_are_not_rolled_back() {
        let mut dev = MockAic3204::new();
        // Fail the left DAC volume write.
        dev.fail_at(6);
        let bus = LocalBus::new(dev);
        assert!(ready(&bus).set_volume(95).is_err());
        let dev = bus.release();
        assert_eq!(dev.peek(1, 0x13), 0x1D);
        // Level 95 would have written DAC 0x09.
        assert_eq!(dev.peek(0, 0x41), 0x00);
        assert_eq!(dev.peek(0, 0x42), 0x00);
    }

    #[test]
    fn muted_volume_reads_back_as_zero() {
        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.set_volume(0).unwrap();
        assert_eq!(codec.read_volume(), Ok(Level::MIN));
    }

    #[test]
    fn read_volume_overwrites_cache() {
        let mut dev = MockAic3204::new();
        dev.poke(1, 0x10, 0x1D);
        dev.poke(0, 0x41, 0x10);
        let bus = LocalBus::new(dev);
        let mut codec = ready(&bus);
        assert_eq!(codec.read_volume(), Ok(Level::MAX));
        assert_eq!(codec.state().volume, Level::MAX);
        drop(codec);
        assert_eq!(
            bus.release().log(),
            &[
                w(0x00, 1),
                Transfer::Read { reg: 0x10 },
                w(0x00, 0),
                Transfer::Read { reg: 0x41 },
            ]
        );
    }

    #[test]
    fn failed_read_keeps_cache() {
        let mut dev = MockAic3204::new();
        dev.fail_at(3);
        let bus = LocalBus::new(dev);
        let mut codec = ready(&bus);
        assert!(codec.read_volume().is_err());
        assert_eq!(codec.state(), CodecState::default());
    }

    #[test]
    fn failed_input_step_stops_and_keeps_cached_gain() {
        for k in 0..3 {
            let mut dev = MockAic3204::new();
            dev.fail_at(k);
            let bus = LocalBus::new(dev);
            let mut codec = ready(&bus);
            let before = codec.state();
            assert!(matches!(codec.set_input_gain(90), Err(Error::Transport(_))));
            assert_eq!(codec.state(), before);
            drop(codec);
            assert_eq!(bus.release().log().len(), k + 1, "step {k}");
        }
    }

    #[test]
    fn failed_input_read_keeps_cache() {
        for k in 0..2 {
            let mut dev = MockAic3204::new();
            // Would read back as 100 if the read went through.
            dev.poke(0, 0x53, 0x28);
            dev.fail_at(k);
            let bus = LocalBus::new(dev);
            let mut codec = ready(&bus);
            assert!(matches!(codec.read_input_gain(), Err(Error::Transport(_))));
            assert_eq!(codec.state(), CodecState::default());
        }
    }

    #[test]
    fn input_gain_writes_both_adcs() {
        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.set_input_gain(100).unwrap();
        assert_eq!(codec.read_input_gain(), Ok(Level::MAX));
        drop(codec);
        let dev = bus.release();
        assert_eq!(&dev.log()[..3], &[w(0x00, 0), w(0x53, 0x28), w(0x54, 0x28)]);
    }

    #[test]
    fn input_curve_is_configurable() {
        let bus = LocalBus::new(MockAic3204::new());
        let config = NO_INIT.with_input_curve(InputCurve::THROUGH_20);
        let mut codec = Aic3204::new(&bus, config).run_init_sequence().unwrap();
        codec.set_input_gain(20).unwrap();
        drop(codec);
        assert_eq!(bus.release().peek(0, 0x53), 0x29);
    }

    #[test]
    fn raw_register_round_trip() {
        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.write_register(2, 0x33, 0xAB).unwrap();
        assert_eq!(codec.read_register(2, 0x33), Ok(0xAB));
    }

    #[test]
    fn attach_applies_defaults_after_table() {
        let bus = LocalBus::new(MockAic3204::new());
        let codec = Aic3204::new(&bus, CodecConfig::new()).attach().unwrap();
        assert_eq!(codec.state(), CodecState::default());
        drop(codec);

        let dev = bus.release();
        let table = InitSequence::AIC3204_DEFAULT.len();
        assert_eq!(dev.log().len(), table + 8 + 3);
        // Volume 50: (29 * 0x14) / 39 = 14
        assert_eq!(dev.peek(1, 0x10), 14);
        // Input gain 50: (30 * 0x28) / 80 = 15
        assert_eq!(dev.peek(0, 0x53), 15);
    }

    #[test]
    fn failed_attach_can_be_retried() {
        let mut dev = MockAic3204::new();
        dev.fail_at(4);
        let bus = LocalBus::new(dev);
        let err = Aic3204::new(&bus, CodecConfig::new()).attach().unwrap_err();
        assert!(matches!(err.error, Error::SequenceAbort { index: 4, .. }));
        let codec = err.codec.attach().unwrap();
        assert_eq!(codec.state().volume, Level::new(50));
    }

    #[test]
    fn failed_default_write_aborts_attach() {
        let mut dev = MockAic3204::new();
        // First transfer after the table.
        dev.fail_at(InitSequence::AIC3204_DEFAULT.len());
        let bus = LocalBus::new(dev);
        let err = Aic3204::new(&bus, CodecConfig::new()).attach().unwrap_err();
        assert!(matches!(err.into_error(), Error::Transport(_)));
    }

    #[test]
    fn enable_restores_cached_levels() {
        static TABLE: [RegisterWrite; 2] = [
            RegisterWrite::select_page(0),
            RegisterWrite::write(reg::SOFTWARE_RESET, 0x01),
        ];
        let bus = LocalBus::new(MockAic3204::new());
        let config = CodecConfig::new().with_init_sequence(InitSequence::new(&TABLE));
        let mut codec = Aic3204::new(&bus, config).attach().unwrap();
        codec.volume(0.3).unwrap();
        codec.set_input_gain(100).unwrap();
        codec.enable().unwrap();
        codec.disable().unwrap();
        drop(codec);

        let dev = bus.release();
        // (9 * 0x14) / 39 = 4
        assert_eq!(dev.peek(1, 0x10), 4);
        assert_eq!(dev.peek(0, 0x53), 0x28);
        // attach (2 + 11), volume (8), input gain (3), enable (2 + 11)
        assert_eq!(dev.log().len(), 37);
    }

    #[test]
    fn aborted_enable_stays_ready_and_can_retry() {
        static TABLE: [RegisterWrite; 2] = [
            RegisterWrite::select_page(0),
            RegisterWrite::write(reg::SOFTWARE_RESET, 0x01),
        ];
        let mut dev = MockAic3204::new();
        // attach (2 + 11) and set_volume (8) come first; fail the replayed reset.
        dev.fail_at(22);
        let bus = LocalBus::new(dev);
        let config = CodecConfig::new().with_init_sequence(InitSequence::new(&TABLE));
        let mut codec = Aic3204::new(&bus, config).attach().unwrap();
        codec.set_volume(70).unwrap();
        let before = codec.state();

        assert!(matches!(codec.enable(), Err(Error::SequenceAbort { index: 1, .. })));
        assert_eq!(codec.state(), before);
        codec.enable().unwrap();
        assert_eq!(codec.state(), before);
    }

    #[test]
    fn accessors_expose_config_and_bus() {
        let bus = LocalBus::new(MockAic3204::new());
        let defaults = CodecState {
            volume: Level::new(10),
            input_gain: Level::new(90),
        };
        let config = NO_INIT
            .with_input_curve(InputCurve::THROUGH_20)
            .with_defaults(defaults);
        let codec = Aic3204::new(&bus, config);
        assert_eq!(codec.config().input_curve, InputCurve::THROUGH_20);
        assert_eq!(codec.state(), defaults);
        assert!(core::ptr::eq(codec.bus(), &bus));
        assert_eq!(codec.bus().address(), 0x18);
    }

    #[test]
    fn detach_leaves_registers() {
        let bus = LocalBus::new(MockAic3204::new());
        let mut codec = ready(&bus);
        codec.set_volume(90).unwrap();
        let codec = codec.detach();
        assert_eq!(codec.state().volume, Level::new(90));
        drop(codec);
        assert_eq!(bus.release().peek(1, 0x10), 0x1D);
    }
}
