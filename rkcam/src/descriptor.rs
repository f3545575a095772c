//! Static descriptions of the supported sensor models.

use crate::controls::{Capabilities, ControlId, ControlSpec};
use crate::format::{Format, PixelFormat, Resolution};
use crate::models::Backend;
use crate::registers::{RegisterTable, EMPTY};

/// Everything the driver needs to know about one sensor model.
///
/// Descriptors are immutable and statically allocated, one per model. See
/// [`models`](crate::models) for the ones this crate ships.
#[derive(Debug)]
pub struct SensorDescriptor {
    pub name: &'static str,

    /// 7-bit address the sensor answers on.
    pub bus_address: u8,

    /// Registers holding the high and low bytes of the chip identifier.
    pub id_registers: (u16, u16),
    pub expected_id: u16,

    /// Optional controls this model offers.
    pub capabilities: Capabilities,

    /// The powerdown line level which powers the chip up.
    pub power_on_level: bool,

    /// Extra settle time after power-up, before the chip is first addressed
    /// during initialization.
    pub power_up_delay_ms: u32,

    pub min_size: (u32, u32),
    pub max_size: (u32, u32),

    /// Rounds negotiated widths and heights up to even values.
    pub align_even: bool,

    pub init_table: RegisterTable,
    pub init_mode: Resolution,
    pub init_pixel_format: PixelFormat,

    /// Output window tables. A resolution that's missing, or whose table is
    /// empty, is never selected.
    pub modes: &'static [ModeTable],

    /// The pixel formats this model can produce, with the table that
    /// switches to each.
    pub formats: &'static [FormatTable],

    pub controls: &'static [ControlSpec],

    /// Written before the chip is powered down for suspend.
    pub power_down_table: RegisterTable,

    pub backend: Backend,
}

#[derive(Clone, Copy, Debug)]
pub struct ModeTable {
    pub resolution: Resolution,
    pub regs: RegisterTable,
}

#[derive(Clone, Copy, Debug)]
pub struct FormatTable {
    pub pixel_format: PixelFormat,
    pub regs: RegisterTable,
}

impl SensorDescriptor {
    /// The window table for the given resolution, which is empty if this
    /// model doesn't support it.
    pub fn mode_table(&self, res: Resolution) -> RegisterTable {
        self.modes
            .iter()
            .find(|m| m.resolution == res)
            .map(|m| m.regs)
            .unwrap_or(EMPTY)
    }

    pub fn has_mode(&self, res: Resolution) -> bool {
        !self.mode_table(res).is_empty()
    }

    /// Chooses the smallest populated mode that is at least as large as
    /// the requested size in both directions, or `None` if no mode is large
    /// enough.
    pub fn select_mode(&self, width: u32, height: u32) -> Option<Resolution> {
        Resolution::ASCENDING
            .iter()
            .copied()
            .find(|res| res.covers(width, height) && self.has_mode(*res))
    }

    /// The table that switches to the given pixel format, or `None` if this
    /// model can't produce it.
    pub fn format_table(&self, pf: PixelFormat) -> Option<RegisterTable> {
        self.formats
            .iter()
            .find(|f| f.pixel_format == pf)
            .map(|f| f.regs)
    }

    pub fn supports(&self, pf: PixelFormat) -> bool {
        self.format_table(pf).is_some()
    }

    pub fn control(&self, id: ControlId) -> Option<&'static ControlSpec> {
        // Copy the `'static` slice out so the result isn't tied to `self`.
        let controls = self.controls;
        controls.iter().find(|c| c.id == id)
    }

    pub fn init_format(&self) -> Format {
        Format::from_resolution(self.init_mode, self.init_pixel_format)
    }
}

#[cfg(test)]
mod tests {
    use crate::controls::ControlId;
    use crate::format::Resolution;
    use crate::models::{fake, CANDIDATES};

    #[test]
    fn test_init_modes_are_populated() {
        for desc in CANDIDATES.iter().copied().chain(core::iter::once(&fake::SENSOR)) {
            assert!(desc.has_mode(desc.init_mode), "{}", desc.name);
            assert!(desc.supports(desc.init_pixel_format), "{}", desc.name);
            assert!(!desc.init_table.is_empty(), "{}", desc.name);
        }
    }

    #[test]
    fn test_control_ranges_hold_defaults() {
        for desc in CANDIDATES.iter().copied().chain(core::iter::once(&fake::SENSOR)) {
            for spec in desc.controls {
                assert!(spec.contains(spec.default), "{} {:?}", desc.name, spec.id);
                assert!(spec.tables.len() <= (spec.max - spec.min + 1) as usize);
            }
        }
    }

    #[test]
    fn test_select_mode_skips_empty() {
        // The test sensor has an empty QVGA table, so a request that QVGA
        // would cover lands on CIF.
        assert_eq!(fake::SENSOR.select_mode(300, 200), Some(Resolution::Cif));
        assert_eq!(fake::SENSOR.select_mode(100, 100), Some(Resolution::Qcif));
        assert_eq!(fake::SENSOR.select_mode(1600, 1200), Some(Resolution::Uxga));
        assert_eq!(fake::SENSOR.select_mode(1601, 1200), None);
    }

    #[test]
    fn test_missing_control() {
        assert!(fake::SENSOR.control(ControlId::Exposure).is_none());
        assert!(fake::SENSOR.control(ControlId::Effect).is_some());
    }
}
