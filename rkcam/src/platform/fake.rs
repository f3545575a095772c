//! Fake `Platform` implementation for testing and bench simulation.

extern crate alloc;

use super::FlashState;
use alloc::vec::Vec;

/// An implementation of [`Platform`](super::Platform) that just remembers
/// what it was asked to do.
#[derive(Debug, Default)]
pub struct Platform {
    events: Vec<Event>,
    powerdown: Option<bool>,
    flash: Option<FlashState>,
    fail_powerdown: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Powerdown(bool),
    Reset,
    Flash(FlashState),
    Sleep(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Requested with `fail_powerdown`.
    Powerdown,
}

impl Platform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent request to drive the powerdown line to
    /// `level` fail, or stop failing if `level` is `None`.
    ///
    /// Failed requests leave the line where it was and aren't recorded as
    /// events.
    pub fn fail_powerdown(&mut self, level: Option<bool>) {
        self.fail_powerdown = level;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        core::mem::replace(&mut self.events, Vec::new())
    }

    /// The level most recently driven on the powerdown line, if any.
    pub fn powerdown_level(&self) -> Option<bool> {
        self.powerdown
    }

    /// The flash state most recently requested, if any.
    pub fn flash_state(&self) -> Option<FlashState> {
        self.flash
    }

    /// Total time requested through `sleep_ms`.
    pub fn slept_ms(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match *e {
                Event::Sleep(ms) => ms as u64,
                _ => 0,
            })
            .sum()
    }
}

impl super::Platform for Platform {
    type Error = Error;

    fn set_powerdown(&mut self, level: bool) -> Result<(), Error> {
        if self.fail_powerdown == Some(level) {
            return Err(Error::Powerdown);
        }
        self.events.push(Event::Powerdown(level));
        self.powerdown = Some(level);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.events.push(Event::Reset);
        Ok(())
    }

    fn flash(&mut self, state: FlashState) -> Result<(), Error> {
        self.events.push(Event::Flash(state));
        self.flash = Some(state);
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.events.push(Event::Sleep(ms));
    }
}
