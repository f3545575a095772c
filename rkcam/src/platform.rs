//! The board-level signals that surround a sensor module.

#[cfg(any(test, feature = "fake"))]
pub mod fake;

/// Implementations of `Platform` give the driver access to the control
/// signals wired between the host and the sensor module, other than the
/// control bus itself.
///
/// Whether a high or low level on the powerdown line actually powers the
/// chip up varies between sensor models, so the driver always tells the
/// platform the raw line level it wants. See
/// [`SensorDescriptor::power_on_level`](crate::descriptor::SensorDescriptor::power_on_level).
pub trait Platform {
    type Error;

    /// Drive the sensor's powerdown line to the given level.
    fn set_powerdown(&mut self, level: bool) -> Result<(), Self::Error>;

    /// Pulse the sensor's reset line.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Switch the flash LED, if the board has one.
    ///
    /// The default implementation does nothing, for boards without a flash.
    fn flash(&mut self, state: FlashState) -> Result<(), Self::Error> {
        let _ = state;
        Ok(())
    }

    /// Sleep for at least the given number of milliseconds, to give the
    /// sensor time to settle.
    fn sleep_ms(&mut self, ms: u32);
}

/// Physical states of the flash LED.
///
/// Torch is a distinct, continuously-lit state rather than a synonym for
/// `On`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlashState {
    Off,
    On,
    Torch,
}

impl<T: Platform + ?Sized> Platform for &mut T {
    type Error = T::Error;

    fn set_powerdown(&mut self, level: bool) -> Result<(), Self::Error> {
        (**self).set_powerdown(level)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        (**self).reset()
    }

    fn flash(&mut self, state: FlashState) -> Result<(), Self::Error> {
        (**self).flash(state)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }
}
