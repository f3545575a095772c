use crate::interface::Interface;
use crate::registers::build_read_header;
use crate::registers::RegOp;

/// `LowLevel` is a low-level interface to a sensor which matches the
/// primitive single-register operations that sensor datasheets describe.
///
/// This is slightly higher-level than the `Interface` trait: it knows that
/// registers are addressed with 16 bits, most significant byte first, and
/// that each holds an 8-bit value. It also retries transactions that fail,
/// because sensors on a shared bus will occasionally miss one.
///
/// `LowLevel` remembers which bus address the sensor answers on. The
/// dispatcher changes that address while it searches for a sensor.
pub struct LowLevel<I: Interface> {
    raw: I,
    addr: u8,
    exclusive_depth: u32,
}

impl<I: Interface> LowLevel<I> {
    /// Number of times a single register transaction is attempted before
    /// giving up.
    pub const ATTEMPTS: u32 = 3;

    /// Pause between attempts of a single register transaction.
    pub const RETRY_PAUSE_US: u32 = 10;

    pub fn new(interface: I) -> Self {
        Self {
            raw: interface,
            addr: 0,
            exclusive_depth: 0,
        }
    }

    /// Consumes the `LowLevel` object and returns the interface it was
    /// created with.
    pub fn take_interface(self) -> I {
        self.raw
    }

    /// Returns a mutable reference to the underlying interface.
    ///
    /// Transactions sent directly to the interface bypass the retry logic.
    pub fn borrow_interface<'a>(&'a mut self) -> &'a mut I {
        &mut self.raw
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    pub fn set_address(&mut self, addr: u8) {
        self.addr = addr;
    }

    pub fn wr8(&mut self, reg: u16, v: u8) -> Result<(), I::Error> {
        let mut msg: [u8; 3] = [0; 3];
        RegOp::new(reg, v).build_write_message(&mut msg);
        self.with_retry(reg, |raw, addr| raw.write(addr, &msg))
    }

    pub fn rd8(&mut self, reg: u16) -> Result<u8, I::Error> {
        let mut header: [u8; 2] = [0; 2];
        build_read_header(reg, &mut header);
        let mut data: [u8; 1] = [0; 1];
        self.with_retry(reg, |raw, addr| raw.write_read(addr, &header, &mut data))?;
        Ok(data[0])
    }

    /// Reads two consecutive 8-bit registers, `hi` first, and combines them
    /// into a 16-bit value.
    pub fn rd16_pair(&mut self, hi: u16, lo: u16) -> Result<u16, I::Error> {
        let h = self.rd8(hi)?;
        let l = self.rd8(lo)?;
        Ok((h as u16) << 8 | (l as u16))
    }

    /// Runs the given function inside an exclusive section of the bus.
    ///
    /// Exclusive sections nest: only the outermost call tells the interface
    /// to begin and end the section, so a function called from inside one
    /// can safely start another.
    pub fn with_exclusive<F, R, E>(&mut self, func: F) -> Result<R, E>
    where
        F: FnOnce(&mut Self) -> Result<R, E>,
    {
        if self.exclusive_depth == 0 {
            self.raw.begin_exclusive();
        }
        self.exclusive_depth += 1;
        let result = func(self);
        self.exclusive_depth -= 1;
        if self.exclusive_depth == 0 {
            self.raw.end_exclusive();
        }
        result
    }

    fn with_retry<F>(&mut self, reg: u16, mut func: F) -> Result<(), I::Error>
    where
        F: FnMut(&mut I, u8) -> Result<(), I::Error>,
    {
        let mut attempt = 1;
        loop {
            match func(&mut self.raw, self.addr) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if attempt >= Self::ATTEMPTS {
                        return Err(err);
                    }
                    log::warn!(
                        "register {:#06x} at {:#04x}: attempt {} failed, retrying",
                        reg,
                        self.addr,
                        attempt
                    );
                    attempt += 1;
                    self.raw.pause_us(Self::RETRY_PAUSE_US);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::interface::fake::{Call, Error, Interface as FakeInterface};

    fn low_level() -> LowLevel<FakeInterface> {
        let mut ll = LowLevel::new(FakeInterface::new().with_device(0x36));
        ll.set_address(0x36);
        ll
    }

    #[test]
    fn test_wr8() {
        let mut ll = low_level();
        ll.wr8(0x3021, 0x62).unwrap();
        let ei = ll.borrow_interface();
        assert_eq!(ei.writes(), std::vec![(0x36, 0x3021, 0x62)]);
        assert_eq!(ei.register(0x36, 0x3021), Some(0x62));
    }

    #[test]
    fn test_rd16_pair() {
        let mut ll = LowLevel::new(
            FakeInterface::new().with_registers(0x36, &[(0x307e, 0x01), (0x307f, 0x05)]),
        );
        ll.set_address(0x36);
        assert_eq!(ll.rd16_pair(0x307e, 0x307f), Ok(0x0105));
    }

    #[test]
    fn test_retry_then_success() {
        let mut ll = low_level();
        ll.borrow_interface().fail_next(LowLevel::<FakeInterface>::ATTEMPTS - 1);
        ll.wr8(0x3021, 0x62).unwrap();

        let ei = ll.borrow_interface();
        assert_eq!(ei.calls().len(), 3);
        assert_eq!(ei.paused_us(), 20);
        assert_eq!(ei.register(0x36, 0x3021), Some(0x62));
    }

    #[test]
    fn test_retry_exhausted() {
        let mut ll = low_level();
        ll.borrow_interface().fail_next(LowLevel::<FakeInterface>::ATTEMPTS);
        assert_eq!(ll.rd8(0x3021), Err(Error::Injected));
        let ei = ll.borrow_interface();
        assert_eq!(
            ei.calls(),
            &[Call::Read {
                addr: 0x36,
                reg: 0x3021
            }; 3][..]
        );
    }

    #[test]
    fn test_retry_returns_last_error() {
        let mut ll = low_level();
        // Two injected failures and then the device turns out to be absent.
        ll.set_address(0x3c);
        ll.borrow_interface().fail_next(2);
        assert_eq!(ll.wr8(0x0101, 0x00), Err(Error::Nack(0x3c)));
    }

    #[test]
    fn test_exclusive_nests() {
        let mut ll = low_level();
        let got: Result<(), Error> = ll.with_exclusive(|ll| {
            assert!(ll.borrow_interface().in_exclusive());
            ll.with_exclusive(|ll| ll.wr8(0x3025, 0x01))?;
            assert!(ll.borrow_interface().in_exclusive());
            Ok(())
        });
        got.unwrap();
        let ei = ll.borrow_interface();
        assert!(!ei.in_exclusive());
        assert_eq!(ei.exclusive_sections(), 1);
    }
}
