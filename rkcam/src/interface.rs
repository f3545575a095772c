//! The boundary between this crate and a physical control bus.

#[cfg(any(test, feature = "fake"))]
pub mod fake;

/// Implementations of `Interface` serve as adapters between the interface
/// this library expects and a specific physical implementation of the
/// sensor control bus, which is typically I2C.
///
/// The main library contains no real implementations of this trait, in
/// order to make the library portable across systems big and small. Other
/// crates, including `rkcam-hal`, take on additional dependencies in order
/// to bind this library to specific systems/hardware.
///
/// Each method represents exactly one bus transaction. Retrying failed
/// transactions is the responsibility of
/// [`LowLevel`](crate::low_level::LowLevel), so implementations should
/// report failures as soon as they happen.
pub trait Interface {
    type Error;

    /// Send the given bytes to the device at the given 7-bit bus address.
    fn write(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Send the given bytes to the device at the given 7-bit bus address and
    /// then, without releasing the bus, read enough bytes to fill `into`.
    fn write_read(&mut self, addr: u8, data: &[u8], into: &mut [u8])
        -> Result<(), Self::Error>;

    /// Busy-wait for at least the given number of microseconds. Used for the
    /// short backoff between attempts of a failed transaction.
    fn pause_us(&mut self, us: u32);

    /// Called at the start of a batch of writes which must not be interleaved
    /// with traffic to other devices sharing the same bus.
    ///
    /// Calls are never nested: `LowLevel` counts nested batches itself and
    /// only calls this for the outermost one. The default implementation does
    /// nothing, which is appropriate when the caller already serializes all
    /// access to the bus.
    fn begin_exclusive(&mut self) {}

    /// Ends a section started with `begin_exclusive`.
    fn end_exclusive(&mut self) {}
}

impl<T: Interface + ?Sized> Interface for &mut T {
    type Error = T::Error;

    fn write(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(addr, data)
    }

    fn write_read(
        &mut self,
        addr: u8,
        data: &[u8],
        into: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).write_read(addr, data, into)
    }

    fn pause_us(&mut self, us: u32) {
        (**self).pause_us(us)
    }

    fn begin_exclusive(&mut self) {
        (**self).begin_exclusive()
    }

    fn end_exclusive(&mut self) {
        (**self).end_exclusive()
    }
}
