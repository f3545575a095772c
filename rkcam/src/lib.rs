#![no_std]

pub mod config;
pub mod console;
pub mod controls;
pub mod descriptor;
mod dispatch;
pub mod error;
pub mod format;
mod init;
pub mod interface;
pub mod low_level;
mod mode;
pub mod models;
pub mod platform;
pub mod programmer;
pub mod registers;
pub mod state;

pub use config::Config;
pub use controls::{Capabilities, ControlId, ControlSpec, FlashMode};
pub use descriptor::SensorDescriptor;
pub use error::{BatchError, Error};
pub use format::{Format, PixelFormat, Resolution};
pub use interface::Interface;
pub use models::Orientation;
pub use platform::{FlashState, Platform};

use models::Operations;

/// The identity reported by [`Camera::chip_ident`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChipIdent {
    pub ident: u16,
    pub revision: u16,
}

/// A camera module: a sensor on a control bus, plus the board signals that
/// power it and fire its flash.
///
/// A new `Camera` isn't bound to any sensor. Call [`probe`](Self::probe) to
/// find out which one is fitted, then [`init`](Self::init) to bring it up,
/// after which formats and controls can be set.
pub struct Camera<I: Interface, P: Platform> {
    pub(crate) ll: low_level::LowLevel<I>,
    pub(crate) platform: P,
    pub(crate) config: Config,
    pub(crate) descriptor: Option<&'static SensorDescriptor>,
    pub(crate) state: state::SensorState,
}

impl<I: Interface, P: Platform> Camera<I, P> {
    pub fn new(ei: I, platform: P) -> Self {
        Self::with_config(ei, platform, Config::new())
    }

    pub fn with_config(ei: I, platform: P, config: Config) -> Self {
        Self {
            ll: low_level::LowLevel::new(ei),
            platform: platform,
            config: config,
            descriptor: None,
            state: state::SensorState::default(),
        }
    }

    /// Searches for any of the sensors this crate supports, binding the
    /// first one that answers with its expected identity.
    ///
    /// [`Error::NoDeviceFound`] is a normal outcome on boards that have no
    /// camera fitted. In that case the `Camera` is left unbound and every
    /// candidate is left powered down.
    pub fn probe(&mut self) -> Result<&'static SensorDescriptor, Error<I, P>> {
        dispatch::probe(self, &models::CANDIDATES)
    }

    /// Like [`probe`](Self::probe), but searching only the given
    /// descriptors, in the given order.
    pub fn probe_candidates(
        &mut self,
        candidates: &[&'static SensorDescriptor],
    ) -> Result<&'static SensorDescriptor, Error<I, P>> {
        dispatch::probe(self, candidates)
    }

    /// The descriptor of the bound sensor, if any.
    pub fn descriptor(&self) -> Option<&'static SensorDescriptor> {
        self.descriptor
    }

    pub(crate) fn bound(&self) -> Result<&'static SensorDescriptor, Error<I, P>> {
        match self.descriptor {
            Some(desc) => Ok(desc),
            None => Err(Error::NoDeviceFound),
        }
    }

    /// The bound sensor's name, or `"none"` if no sensor is bound.
    pub fn name(&self) -> &'static str {
        match self.descriptor {
            Some(desc) => desc.name,
            None => "none",
        }
    }

    /// The optional controls offered by the bound sensor on this board.
    pub fn capabilities(&self) -> Capabilities {
        match self.descriptor {
            Some(desc) => {
                if self.config.flash {
                    desc.capabilities
                } else {
                    desc.capabilities.without(Capabilities::FLASH)
                }
            }
            None => Capabilities::NONE,
        }
    }

    /// Powers up the bound sensor, checks its identity again and programs
    /// its initial configuration, after which it is active.
    ///
    /// If anything fails the sensor is deactivated again before returning.
    pub fn init(&mut self) -> Result<(), Error<I, P>> {
        self.bound()?.backend.init(self)
    }

    /// Powers the bound sensor down. It must be initialized again before
    /// it can be used.
    pub fn deactivate(&mut self) -> Result<(), Error<I, P>> {
        self.bound()?.backend.deactivate(self)
    }

    pub fn suspend(&mut self) -> Result<(), Error<I, P>> {
        init::suspend(self)
    }

    pub fn resume(&mut self) -> Result<(), Error<I, P>> {
        init::resume(self)
    }

    /// Switches the sensor to the smallest output window that covers the
    /// requested size, returning the format it actually produces.
    ///
    /// Requesting the window that's already programmed is cheap: nothing
    /// is written to the sensor. If no window is large enough, the sensor
    /// is switched to its default window and the result is
    /// [`Error::FormatUnsupported`], which carries that window's format.
    pub fn set_format(
        &mut self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<Format, Error<I, P>> {
        mode::set_format(self, width, height, pixel_format)
    }

    pub fn get_format(&self) -> Result<Format, Error<I, P>> {
        mode::get_format(self)
    }

    /// Adjusts a requested format to fit the bound sensor's limits, without
    /// touching the hardware.
    pub fn try_format(
        &self,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
    ) -> Result<Format, Error<I, P>> {
        mode::try_format(self, width, height, pixel_format)
    }

    pub fn get_control(&self, id: ControlId) -> Result<i32, Error<I, P>> {
        controls::get_control(self, id)
    }

    /// Sets a control, programming its register table if the value has
    /// changed.
    ///
    /// Values outside the control's range are rejected before anything is
    /// sent to the sensor, and the stored value only changes once the
    /// sensor has accepted the new setting.
    pub fn set_control(&mut self, id: ControlId, value: i32) -> Result<(), Error<I, P>> {
        controls::set_control(self, id, value)
    }

    /// Sets several controls in order, stopping at the first that fails.
    pub fn set_controls(&mut self, controls: &[(ControlId, i32)]) -> Result<(), BatchError<I, P>> {
        for (index, (id, value)) in controls.iter().copied().enumerate() {
            if let Err(error) = self.set_control(id, value) {
                return Err(BatchError {
                    index: index,
                    error: error,
                });
            }
        }
        Ok(())
    }

    /// Describes a control offered by the bound sensor.
    pub fn query_control(&self, id: ControlId) -> Result<ControlSpec, Error<I, P>> {
        controls::query_control(self, id)
    }

    /// Adjusts the sensor's readout direction to suit the way the device is
    /// being held. Does nothing unless the sensor is active.
    pub fn change_orientation(&mut self, orientation: Orientation) -> Result<(), Error<I, P>> {
        let desc = self.bound()?;
        if !self.state.active {
            log::trace!("{} not active, ignoring orientation", desc.name);
            return Ok(());
        }
        desc.backend.change_orientation(self, orientation)
    }

    /// Reports the bound sensor's identity, if `addr` is the bus address it
    /// answers on.
    pub fn chip_ident(&self, addr: u8) -> Result<ChipIdent, Error<I, P>> {
        let desc = self.bound()?;
        if addr != self.ll.address() {
            return Err(Error::NoDeviceFound);
        }
        Ok(ChipIdent {
            ident: desc.expected_id,
            revision: 0,
        })
    }

    pub fn funmodule(&self) -> state::FunModule {
        self.state.funmodule
    }

    pub fn state(&self) -> &state::SensorState {
        &self.state
    }

    pub fn read_register(&mut self, reg: u16) -> Result<u8, Error<I, P>> {
        self.bound()?.backend.read(self, reg)
    }

    pub fn write_register(&mut self, reg: u16, val: u8) -> Result<(), Error<I, P>> {
        self.bound()?.backend.write(self, reg, val)
    }

    /// Runs one line of the register debug console. See
    /// [`console`](crate::console) for the syntax.
    pub fn console(&mut self, line: &str) -> Result<console::Reply, Error<I, P>> {
        console::run(self, line)
    }

    /// Returns a mutable reference to the underlying bus interface.
    ///
    /// Transactions sent directly to the interface bypass retries and
    /// aren't reflected in the driver's view of the sensor.
    pub fn borrow_interface<'a>(&'a mut self) -> &'a mut I {
        self.ll.borrow_interface()
    }

    pub fn borrow_platform<'a>(&'a mut self) -> &'a mut P {
        &mut self.platform
    }

    /// Consumes the `Camera` and returns the interface and platform it was
    /// created with.
    pub fn release(self) -> (I, P) {
        (self.ll.take_interface(), self.platform)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::models::fake;

    #[test]
    fn test_unbound() {
        let cam = Camera::new(
            interface::fake::Interface::new(),
            platform::fake::Platform::new(),
        );
        assert_eq!(cam.name(), "none");
        assert_eq!(cam.capabilities(), Capabilities::NONE);
        assert_eq!(cam.get_format(), Err(Error::NoDeviceFound));
    }

    #[test]
    fn test_chip_ident() {
        let cam = fake::probed_camera();
        assert_eq!(
            cam.chip_ident(fake::ADDR),
            Ok(ChipIdent {
                ident: 0x2656,
                revision: 0
            })
        );
        assert_eq!(cam.chip_ident(0x31), Err(Error::NoDeviceFound));
    }

    #[test]
    fn test_capabilities_without_flash() {
        let cam = fake::probed_camera_with(Config::new().with_flash(false));
        assert!(!cam.capabilities().contains(Capabilities::FLASH));
        assert!(cam.capabilities().contains(Capabilities::EFFECT));
        assert!(fake::probed_camera()
            .capabilities()
            .contains(Capabilities::FLASH));
    }

    #[test]
    fn test_set_controls_reports_index() {
        let mut cam = fake::initialized_camera();
        let err = cam
            .set_controls(&[
                (ControlId::Effect, 1),
                (ControlId::WhiteBalance, 9),
                (ControlId::Scene, 1),
            ])
            .unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.error, Error::InvalidValue);
        assert_eq!(cam.get_control(ControlId::Effect), Ok(1));
        assert_eq!(cam.get_control(ControlId::Scene), Ok(0));
    }

    #[test]
    fn test_query_control() {
        let cam = fake::initialized_camera();
        let spec = cam.query_control(ControlId::Brightness).unwrap();
        assert_eq!((spec.min, spec.max, spec.default), (-3, 2, 0));
    }

    #[test]
    fn test_register_access() {
        let mut cam = fake::probed_camera();
        cam.write_register(0x3000, 0x12).unwrap();
        assert_eq!(cam.read_register(0x3000), Ok(0x12));
        let (ei, _) = cam.release();
        assert_eq!(ei.register(fake::ADDR, 0x3000), Some(0x12));
    }

    #[test]
    fn test_orientation_needs_active() {
        let mut cam = fake::probed_camera();
        cam.borrow_interface().take_calls();
        assert_eq!(cam.change_orientation(Orientation::Portrait), Ok(()));
        assert!(cam.borrow_interface().calls().is_empty());
    }
}
