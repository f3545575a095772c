//! The mutable state the driver keeps for a bound sensor.

use crate::controls::ControlValues;
use crate::format::{Format, PixelFormat, Resolution};

/// Flags recording which parts of sensor bring-up have completed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FunModule(u32);

impl FunModule {
    /// Autofocus firmware was loaded successfully.
    pub const AF_OK: u32 = 1 << 0;

    /// The sensor was initialized successfully and hasn't been deactivated
    /// since.
    pub const INIT_OK: u32 = 1 << 28;

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, flag: u32) -> bool {
        (self.0 & flag) == flag
    }

    pub(crate) fn insert(&mut self, flag: u32) {
        self.0 |= flag;
    }

    pub(crate) fn remove(&mut self, flag: u32) {
        self.0 &= !flag;
    }
}

/// Exposure settings carried over from a high-resolution capture back into
/// preview, for sensors whose automatic exposure loses them on the way.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ExposureCarry {
    pub(crate) captured: bool,
    pub(crate) shutter: u16,
    pub(crate) again_h: u8,
    pub(crate) again_l: u8,
    pub(crate) dgain: u8,
}

impl ExposureCarry {
    /// Whether the sensor is currently holding settings captured on entry to
    /// its high-resolution mode.
    pub fn captured(&self) -> bool {
        self.captured
    }

    pub fn shutter(&self) -> u16 {
        self.shutter
    }

    pub fn analog_gain(&self) -> (u8, u8) {
        (self.again_h, self.again_l)
    }

    pub fn digital_gain(&self) -> u8 {
        self.dgain
    }
}

/// Everything the driver remembers about a bound sensor between calls.
#[derive(Clone, Debug, Default)]
pub struct SensorState {
    pub(crate) mode: Option<Resolution>,
    pub(crate) pixel_format: Option<PixelFormat>,
    pub(crate) format: Option<Format>,
    pub(crate) controls: ControlValues,
    pub(crate) funmodule: FunModule,
    pub(crate) active: bool,
    pub(crate) snap2preview: bool,
    pub(crate) video2preview: bool,
    pub(crate) carry: ExposureCarry,
}

impl SensorState {
    /// The output window currently programmed, or `None` before the sensor
    /// has been initialized.
    pub fn mode(&self) -> Option<Resolution> {
        self.mode
    }

    pub fn pixel_format(&self) -> Option<PixelFormat> {
        self.pixel_format
    }

    pub fn controls(&self) -> &ControlValues {
        &self.controls
    }

    pub fn funmodule(&self) -> FunModule {
        self.funmodule
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn exposure_carry(&self) -> &ExposureCarry {
        &self.carry
    }

    /// Whether the next plain preview switch must refresh the controls that
    /// the sensor forgets on a mode change.
    pub fn pending_refresh(&self) -> bool {
        self.snap2preview || self.video2preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funmodule_flags() {
        let mut f = FunModule::default();
        f.insert(FunModule::INIT_OK);
        assert!(f.contains(FunModule::INIT_OK));
        assert!(!f.contains(FunModule::AF_OK));
        assert_eq!(f.bits(), 0x1000_0000);
        f.remove(FunModule::INIT_OK);
        assert_eq!(f.bits(), 0);
    }
}
