//! The supported sensor models and the operations that differ between them.

pub mod gt2005;
pub mod nt99250;

#[cfg(test)]
pub(crate) mod fake;

use crate::descriptor::SensorDescriptor;
use crate::error::Error;
use crate::format::Resolution;
use crate::interface::Interface;
use crate::platform::Platform;
use crate::Camera;

/// The sensors that [`Camera::probe`](crate::Camera::probe) looks for, in
/// the order it tries them.
pub static CANDIDATES: [&SensorDescriptor; 2] = [&nt99250::SENSOR, &gt2005::SENSOR];

/// Which way up the device is being held.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Orientation {
    Landscape,
    Portrait,
}

/// The operations a sensor model performs, with the canonical behavior as
/// default implementations. Models override only the ones where their
/// hardware needs something different.
///
/// Although the Rust compiler would allow implementations of this
/// elsewhere, this trait is intended only for implementation inside this
/// crate and its requirements are subject to change in future, even in
/// minor releases.
pub trait Operations {
    /// Powers the sensor up and checks that its identity registers hold the
    /// expected value. On a mismatch the sensor is powered down again before
    /// returning, so that probing the next candidate starts clean.
    fn video_probe<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
    ) -> Result<(), Error<I, P>> {
        crate::init::video_probe(cam)
    }

    fn init<I: Interface, P: Platform>(&self, cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
        crate::init::init(cam)
    }

    fn deactivate<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
    ) -> Result<(), Error<I, P>> {
        crate::init::deactivate(cam)
    }

    fn read<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        reg: u16,
    ) -> Result<u8, Error<I, P>> {
        Error::interface_result(cam.ll.rd8(reg))
    }

    fn write<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        reg: u16,
        val: u8,
    ) -> Result<(), Error<I, P>> {
        Error::interface_result(cam.ll.wr8(reg, val))
    }

    /// Adjusts the sensor's readout direction to suit the given device
    /// orientation. Called only while the sensor is active.
    fn change_orientation<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        orientation: Orientation,
    ) -> Result<(), Error<I, P>> {
        let _ = (cam, orientation);
        Ok(())
    }

    /// Called after the window table for a new mode has been programmed
    /// successfully, before the mode is recorded as current.
    fn mode_changed<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        mode: Resolution,
    ) -> Result<(), Error<I, P>> {
        let _ = (cam, mode);
        Ok(())
    }
}

/// A sensor with no model-specific behavior.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Generic;

impl Operations for Generic {}

/// Selects the [`Operations`] implementation for a descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Backend {
    Generic,
    Gt2005,
    Nt99250,
}

macro_rules! dispatch {
    ($self:expr, $ops:ident => $call:expr) => {
        match $self {
            Backend::Generic => {
                let $ops = Generic;
                $call
            }
            Backend::Gt2005 => {
                let $ops = gt2005::Gt2005;
                $call
            }
            Backend::Nt99250 => {
                let $ops = nt99250::Nt99250;
                $call
            }
        }
    };
}

impl Operations for Backend {
    fn video_probe<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
    ) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.video_probe(cam))
    }

    fn init<I: Interface, P: Platform>(&self, cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.init(cam))
    }

    fn deactivate<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
    ) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.deactivate(cam))
    }

    fn read<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        reg: u16,
    ) -> Result<u8, Error<I, P>> {
        dispatch!(*self, ops => ops.read(cam, reg))
    }

    fn write<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        reg: u16,
        val: u8,
    ) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.write(cam, reg, val))
    }

    fn change_orientation<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        orientation: Orientation,
    ) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.change_orientation(cam, orientation))
    }

    fn mode_changed<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        mode: Resolution,
    ) -> Result<(), Error<I, P>> {
        dispatch!(*self, ops => ops.mode_changed(cam, mode))
    }
}
