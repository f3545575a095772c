#![no_std]

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::i2c::{Write, WriteRead};
use embedded_hal::digital::v2::OutputPin;
use rkcam::platform::FlashState;
use rkcam::{Interface, Platform};

/// `HalI2cInterface` is an implementation of `rkcam::Interface` that
/// communicates with a sensor over I2C using the `embedded-hal` blocking
/// I2C traits, and waits between retries using an `embedded-hal` delay.
pub struct HalI2cInterface<I2C, D>
where
    I2C: Write + WriteRead,
    D: DelayUs<u32>,
{
    i2c: I2C,
    delay: D,
}

impl<I2C, D> HalI2cInterface<I2C, D>
where
    I2C: Write + WriteRead,
    D: DelayUs<u32>,
{
    /// Create a new interface in terms of the given I2C bus and delay
    /// implementations.
    ///
    /// The bus must not be shared with other drivers unless they are all
    /// serialized by the caller, because this interface can't keep their
    /// traffic out of a register table write.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c: i2c,
            delay: delay,
        }
    }

    /// Consumes the interface and returns the bus and delay it was created
    /// with.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> Interface for HalI2cInterface<I2C, D>
where
    I2C: Write + WriteRead,
    D: DelayUs<u32>,
{
    type Error = HalI2cError<<I2C as Write>::Error, <I2C as WriteRead>::Error>;

    fn write(&mut self, addr: u8, data: &[u8]) -> Result<(), Self::Error> {
        let r = Write::write(&mut self.i2c, addr, data);
        <Self as Interface>::Error::write_result(r)
    }

    fn write_read(&mut self, addr: u8, data: &[u8], into: &mut [u8]) -> Result<(), Self::Error> {
        let r = WriteRead::write_read(&mut self.i2c, addr, data, into);
        <Self as Interface>::Error::write_read_result(r)
    }

    fn pause_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum HalI2cError<WriteError, WriteReadError> {
    Write(WriteError),
    WriteRead(WriteReadError),
}

impl<WriteError, WriteReadError> HalI2cError<WriteError, WriteReadError> {
    fn write_result<T>(r: Result<T, WriteError>) -> Result<T, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Self::Write(e)),
        }
    }

    fn write_read_result<T>(r: Result<T, WriteReadError>) -> Result<T, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Self::WriteRead(e)),
        }
    }
}

/// `HalPlatform` is an implementation of `rkcam::Platform` that drives the
/// camera module's control signals through `embedded-hal` output pins.
///
/// The reset pin is active low. The flash pin is optional, for boards that
/// have no flash LED: use [`NoPin`] as its type and pass `None`.
pub struct HalPlatform<PD, RST, FL, D>
where
    PD: OutputPin,
    RST: OutputPin,
    FL: OutputPin,
    D: DelayMs<u32>,
{
    powerdown: PD,
    reset: RST,
    flash: Option<FL>,
    delay: D,
}

impl<PD, RST, FL, D> HalPlatform<PD, RST, FL, D>
where
    PD: OutputPin,
    RST: OutputPin,
    FL: OutputPin,
    D: DelayMs<u32>,
{
    /// How long the reset line is held low.
    pub const RESET_PULSE_MS: u32 = 1;

    pub fn new(powerdown: PD, reset: RST, flash: Option<FL>, delay: D) -> Self {
        Self {
            powerdown: powerdown,
            reset: reset,
            flash: flash,
            delay: delay,
        }
    }

    pub fn has_flash(&self) -> bool {
        self.flash.is_some()
    }

    pub fn release(self) -> (PD, RST, Option<FL>, D) {
        (self.powerdown, self.reset, self.flash, self.delay)
    }
}

impl<PD, RST, FL, D> Platform for HalPlatform<PD, RST, FL, D>
where
    PD: OutputPin,
    RST: OutputPin,
    FL: OutputPin,
    D: DelayMs<u32>,
{
    type Error = HalPinError<PD::Error, RST::Error, FL::Error>;

    fn set_powerdown(&mut self, level: bool) -> Result<(), Self::Error> {
        let r = if level {
            self.powerdown.set_high()
        } else {
            self.powerdown.set_low()
        };
        <Self as Platform>::Error::powerdown_result(r)
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        <Self as Platform>::Error::reset_result(self.reset.set_low())?;
        self.delay.delay_ms(Self::RESET_PULSE_MS);
        <Self as Platform>::Error::reset_result(self.reset.set_high())
    }

    fn flash(&mut self, state: FlashState) -> Result<(), Self::Error> {
        let pin = match self.flash.as_mut() {
            Some(pin) => pin,
            None => {
                log::trace!("no flash pin, ignoring {:?}", state);
                return Ok(());
            }
        };
        let r = match state {
            FlashState::Off => pin.set_low(),
            FlashState::On | FlashState::Torch => pin.set_high(),
        };
        <Self as Platform>::Error::flash_result(r)
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum HalPinError<PDError, RSTError, FLError> {
    Powerdown(PDError),
    Reset(RSTError),
    Flash(FLError),
}

impl<PDError, RSTError, FLError> HalPinError<PDError, RSTError, FLError> {
    fn powerdown_result<T>(r: Result<T, PDError>) -> Result<T, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Self::Powerdown(e)),
        }
    }

    fn reset_result<T>(r: Result<T, RSTError>) -> Result<T, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Self::Reset(e)),
        }
    }

    fn flash_result<T>(r: Result<T, FLError>) -> Result<T, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Self::Flash(e)),
        }
    }
}

/// A stand-in output pin for boards that have no flash LED.
pub struct NoPin;

impl OutputPin for NoPin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
