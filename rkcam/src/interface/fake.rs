//! Fake `Interface` implementation for testing and bench simulation.

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// An implementation of [`Interface`](super::Interface) which simulates a
/// bus with any number of register-addressed devices attached.
///
/// Each device is a sparse map from 16-bit register address to 8-bit value.
/// Writing a register stores the value, and reading a register returns
/// whatever was most recently stored there, or zero if nothing was. A
/// transaction addressed to a device that isn't attached is not
/// acknowledged, just as on a real bus.
///
/// Every transaction is appended to a call log, including those that fail,
/// so that tests can make assertions about exactly what was sent.
pub struct Interface {
    devices: BTreeMap<u8, BTreeMap<u16, u8>>,
    fail_when: Option<Box<dyn FnMut(&Call) -> bool>>,
    fail_next: u32,
    calls: Vec<Call>,
    paused_us: u64,
    exclusive_depth: u32,
    exclusive_sections: u32,
}

/// One transaction recorded by the fake [`Interface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    Write { addr: u8, reg: u16, val: u8 },
    Read { addr: u8, reg: u16 },
}

impl Call {
    pub fn addr(&self) -> u8 {
        match *self {
            Call::Write { addr, .. } => addr,
            Call::Read { addr, .. } => addr,
        }
    }

    pub fn is_write(&self) -> bool {
        match self {
            Call::Write { .. } => true,
            Call::Read { .. } => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// No device is attached at the given address.
    Nack(u8),

    /// The failure was requested by `fail_when` or `fail_next`.
    Injected,

    /// The transaction didn't have the shape of a register access.
    Malformed,
}

impl Interface {
    pub fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            fail_when: None,
            fail_next: 0,
            calls: Vec::new(),
            paused_us: 0,
            exclusive_depth: 0,
            exclusive_sections: 0,
        }
    }

    /// Attach a device with no registers set at the given address.
    pub fn with_device(mut self, addr: u8) -> Self {
        self.devices.entry(addr).or_insert_with(BTreeMap::new);
        self
    }

    /// Attach a device at the given address, if not already present, and
    /// preset one of its registers.
    pub fn with_register(mut self, addr: u8, reg: u16, val: u8) -> Self {
        self.set_register(addr, reg, val);
        self
    }

    pub fn with_registers(mut self, addr: u8, regs: &[(u16, u8)]) -> Self {
        for (reg, val) in regs {
            self.set_register(addr, *reg, *val);
        }
        self
    }

    /// Fail every transaction for which the given function returns `true`.
    ///
    /// Failed transactions are still recorded in the call log but have no
    /// effect on the simulated registers.
    pub fn fail_when<F>(&mut self, f: F)
    where
        F: FnMut(&Call) -> bool + 'static,
    {
        self.fail_when = Some(Box::new(f));
    }

    /// Fail the next `n` transactions, whatever they are.
    pub fn fail_next(&mut self, n: u32) {
        self.fail_next = n;
    }

    /// Stop injecting failures.
    pub fn heal(&mut self) {
        self.fail_when = None;
        self.fail_next = 0;
    }

    /// Directly set a register value without it being a logged transaction.
    pub fn set_register(&mut self, addr: u8, reg: u16, val: u8) {
        self.devices
            .entry(addr)
            .or_insert_with(BTreeMap::new)
            .insert(reg, val);
    }

    /// Directly read a register value without it being a logged transaction.
    pub fn register(&self, addr: u8, reg: u16) -> Option<u8> {
        self.devices.get(&addr)?.get(&reg).copied()
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Returns the call log so far and starts a fresh one.
    pub fn take_calls(&mut self) -> Vec<Call> {
        core::mem::replace(&mut self.calls, Vec::new())
    }

    /// The register writes in the call log, in order, as
    /// `(addr, reg, val)` tuples.
    pub fn writes(&self) -> Vec<(u8, u16, u8)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                Call::Write { addr, reg, val } => Some((addr, reg, val)),
                _ => None,
            })
            .collect()
    }

    /// Total time requested through `pause_us`.
    pub fn paused_us(&self) -> u64 {
        self.paused_us
    }

    /// Number of outermost exclusive sections entered so far.
    pub fn exclusive_sections(&self) -> u32 {
        self.exclusive_sections
    }

    pub fn in_exclusive(&self) -> bool {
        self.exclusive_depth > 0
    }

    fn should_fail(&mut self, call: &Call) -> bool {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return true;
        }
        match self.fail_when {
            Some(ref mut f) => f(call),
            None => false,
        }
    }

    fn transact(&mut self, call: Call) -> Result<Option<u8>, Error> {
        self.calls.push(call);
        if self.should_fail(&call) {
            return Err(Error::Injected);
        }
        let regs = match self.devices.get_mut(&call.addr()) {
            Some(regs) => regs,
            None => return Err(Error::Nack(call.addr())),
        };
        match call {
            Call::Write { reg, val, .. } => {
                regs.insert(reg, val);
                Ok(None)
            }
            Call::Read { reg, .. } => Ok(Some(regs.get(&reg).copied().unwrap_or(0x00))),
        }
    }
}

impl Default for Interface {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Interface for Interface {
    type Error = Error;

    fn write(&mut self, addr: u8, data: &[u8]) -> core::result::Result<(), Error> {
        if data.len() != 3 {
            return Err(Error::Malformed);
        }
        let reg = (data[0] as u16) << 8 | (data[1] as u16);
        self.transact(Call::Write {
            addr: addr,
            reg: reg,
            val: data[2],
        })?;
        Ok(())
    }

    fn write_read(
        &mut self,
        addr: u8,
        data: &[u8],
        into: &mut [u8],
    ) -> core::result::Result<(), Error> {
        if data.len() != 2 || into.len() != 1 {
            return Err(Error::Malformed);
        }
        let reg = (data[0] as u16) << 8 | (data[1] as u16);
        if let Some(v) = self.transact(Call::Read {
            addr: addr,
            reg: reg,
        })? {
            into[0] = v;
        }
        Ok(())
    }

    fn pause_us(&mut self, us: u32) {
        self.paused_us += us as u64;
    }

    fn begin_exclusive(&mut self) {
        self.exclusive_depth += 1;
        self.exclusive_sections += 1;
    }

    fn end_exclusive(&mut self) {
        self.exclusive_depth -= 1;
    }
}
