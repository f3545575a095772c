//! Novatek NT99250, a two-megapixel sensor with a flash LED driver.

use super::{Backend, Operations, Orientation};
use crate::controls::{Capabilities, ControlId, ControlSpec};
use crate::descriptor::{FormatTable, ModeTable, SensorDescriptor};
use crate::error::Error;
use crate::format::{PixelFormat, Resolution};
use crate::interface::Interface;
use crate::platform::Platform;
use crate::registers::{RegisterTable, EMPTY};
use crate::Camera;
use rkcam_macros::register_table;

/// Operations for the NT99250.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Nt99250;

const REG_READOUT: u16 = 0x3022;
const REG_OUTPUT_HALT: u16 = 0x3025;
const ORIENTATION_MASK: u8 = 0x03;

/// How long the sensor needs to finish the current frame after output is
/// halted, and again after the readout direction changes.
const ORIENTATION_SETTLE_MS: u32 = 75;

impl Operations for Nt99250 {
    /// Changing the readout direction mid-frame corrupts the output, so
    /// this halts the output around the change.
    fn change_orientation<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        orientation: Orientation,
    ) -> Result<(), Error<I, P>> {
        let current = Error::interface_result(cam.ll.rd8(REG_READOUT))? & ORIENTATION_MASK;
        let (want, readout) = match orientation {
            Orientation::Landscape => (0x00, 0x24),
            Orientation::Portrait => (ORIENTATION_MASK, 0x27),
        };
        if current == want {
            return Ok(());
        }
        log::debug!("nt99250 orientation {:#04x} -> {:?}", current, orientation);

        Error::interface_result(cam.ll.wr8(REG_OUTPUT_HALT, 0x01))?;
        cam.platform.sleep_ms(ORIENTATION_SETTLE_MS);
        Error::interface_result(cam.ll.wr8(REG_READOUT, readout))?;
        cam.platform.sleep_ms(ORIENTATION_SETTLE_MS);
        Error::interface_result(cam.ll.wr8(REG_OUTPUT_HALT, 0x00))
    }
}

const WHITE_BALANCE: &[RegisterTable] = &[
    register_table!("nt99250/wb_auto.regs"),
    register_table!("nt99250/wb_incandescent.regs"),
    register_table!("nt99250/wb_fluorescent.regs"),
    register_table!("nt99250/wb_daylight.regs"),
    register_table!("nt99250/wb_cloudy.regs"),
];

const EFFECT: &[RegisterTable] = &[
    register_table!("nt99250/effect_none.regs"),
    register_table!("nt99250/effect_mono.regs"),
    register_table!("nt99250/effect_negative.regs"),
    register_table!("nt99250/effect_sepia.regs"),
    register_table!("nt99250/effect_bluish.regs"),
    register_table!("nt99250/effect_green.regs"),
];

const EXPOSURE: &[RegisterTable] = &[
    register_table!("nt99250/exposure_0.regs"),
    register_table!("nt99250/exposure_1.regs"),
    register_table!("nt99250/exposure_2.regs"),
    register_table!("nt99250/exposure_3.regs"),
    register_table!("nt99250/exposure_4.regs"),
    register_table!("nt99250/exposure_5.regs"),
    register_table!("nt99250/exposure_6.regs"),
];

const SCENE: &[RegisterTable] = &[
    register_table!("nt99250/scene_auto.regs"),
    register_table!("nt99250/scene_night.regs"),
];

pub static SENSOR: SensorDescriptor = SensorDescriptor {
    name: "nt99250",
    bus_address: 0x36,
    id_registers: (0x307e, 0x307f),
    expected_id: 0x0105,
    capabilities: Capabilities::WHITE_BALANCE
        .union(Capabilities::EFFECT)
        .union(Capabilities::SCENE)
        .union(Capabilities::FLASH),
    power_on_level: false,
    power_up_delay_ms: 5,
    min_size: (176, 144),
    max_size: (1600, 1200),
    align_even: false,
    init_table: register_table!("nt99250/init.regs"),
    init_mode: Resolution::Svga,
    init_pixel_format: PixelFormat::Yuyv,
    modes: &[
        ModeTable {
            resolution: Resolution::Qcif,
            regs: register_table!("nt99250/qcif.regs"),
        },
        ModeTable {
            resolution: Resolution::Qvga,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Cif,
            regs: register_table!("nt99250/cif.regs"),
        },
        ModeTable {
            resolution: Resolution::Vga,
            regs: register_table!("nt99250/vga.regs"),
        },
        ModeTable {
            resolution: Resolution::Svga,
            regs: register_table!("nt99250/svga.regs"),
        },
        ModeTable {
            resolution: Resolution::Xga,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Hd720,
            regs: register_table!("nt99250/720p.regs"),
        },
        ModeTable {
            resolution: Resolution::Sxga,
            regs: register_table!("nt99250/sxga.regs"),
        },
        ModeTable {
            resolution: Resolution::Uxga,
            regs: register_table!("nt99250/uxga.regs"),
        },
    ],
    formats: &[
        FormatTable {
            pixel_format: PixelFormat::Yuyv,
            regs: EMPTY,
        },
        FormatTable {
            pixel_format: PixelFormat::Uyvy,
            regs: EMPTY,
        },
    ],
    controls: &[
        ControlSpec::new(ControlId::WhiteBalance, 0, 4, 0, WHITE_BALANCE),
        ControlSpec::new(ControlId::Brightness, -3, 2, 0, &[EMPTY; 6]),
        ControlSpec::new(ControlId::Effect, 0, 5, 0, EFFECT),
        // Exposure tables exist but the module doesn't offer the control.
        ControlSpec::new(ControlId::Exposure, 0, 6, 0, EXPOSURE),
        ControlSpec::new(ControlId::Saturation, 0, 2, 0, &[EMPTY; 3]),
        ControlSpec::new(ControlId::Contrast, -3, 3, 0, &[EMPTY; 7]),
        ControlSpec::new(ControlId::Scene, 0, 1, 0, SCENE),
        ControlSpec::new(ControlId::Flash, 0, 3, 0, &[]),
    ],
    power_down_table: EMPTY,
    backend: Backend::Nt99250,
};
