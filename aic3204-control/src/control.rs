//! Runtime control shared by codec drivers.

/// A component whose output can be reconfigured at run time.
///
/// Implemented by [`Aic3204`](crate::Aic3204) once it is ready.
pub trait AudioControl {
    /// Error reported by the driver or its transport.
    type Error;

    /// Bring the component to a working state, reapplying cached settings.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Stop using the component. Settings already applied may stay in effect.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Set the output volume on a unit scale (0.0 = silent, 1.0 = full scale).
    /// Values outside that range are clamped.
    fn volume(&mut self, level: f32) -> Result<(), Self::Error>;
}
