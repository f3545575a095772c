//! GalaxyCore GT2005, a two-megapixel sensor.
//!
//! This sensor's automatic exposure doesn't survive the switch into its
//! full-resolution UXGA window, so on the way in the driver freezes the
//! shutter and gains at their preview values, and on the way back to SVGA
//! it writes them back before handing control to the sensor again.

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

/// Operations for the GT2005.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Gt2005;

const REG_ORIENTATION: u16 = 0x0101;
const ORIENTATION_MASK: u8 = 0x03;

const REG_SHUTTER_MODE: u16 = 0x0300;
const REG_PREVIEW_CTRL: u16 = 0x0104;

const REG_SHUTTER_H: u16 = 0x0012;
const REG_SHUTTER_L: u16 = 0x0013;
const REG_AGAIN_H: u16 = 0x0014;
const REG_AGAIN_L: u16 = 0x0015;
const REG_DGAIN_H: u16 = 0x0016;
const REG_DGAIN_L: u16 = 0x0017;

const REG_MAN_SHUTTER_H: u16 = 0x0304;
const REG_MAN_SHUTTER_L: u16 = 0x0305;
const REG_MAN_AGAIN_H: u16 = 0x0306;
const REG_MAN_AGAIN_L: u16 = 0x0307;
const REG_MAN_DGAIN: u16 = 0x0308;

impl Operations for Gt2005 {
    fn change_orientation<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        orientation: Orientation,
    ) -> Result<(), Error<I, P>> {
        let current = Error::interface_result(cam.ll.rd8(REG_ORIENTATION))? & ORIENTATION_MASK;
        let want = match orientation {
            Orientation::Landscape => 0x00,
            Orientation::Portrait => ORIENTATION_MASK,
        };
        if current == want {
            log::trace!("gt2005 already in {:?} orientation", orientation);
            return Ok(());
        }
        log::debug!("gt2005 orientation {:#04x} -> {:?}", current, orientation);
        Error::interface_result(cam.ll.wr8(REG_ORIENTATION, want))
    }

    fn mode_changed<I: Interface, P: Platform>(
        &self,
        cam: &mut Camera<I, P>,
        mode: Resolution,
    ) -> Result<(), Error<I, P>> {
        match mode {
            Resolution::Uxga => hold_exposure(cam),
            Resolution::Svga => {
                if cam.state.carry.captured {
                    restore_exposure(cam)?;
                }
                resume_preview(cam)
            }
            _ => Ok(()),
        }
    }
}

fn wr<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    reg: u16,
    val: u8,
) -> Result<(), Error<I, P>> {
    Error::interface_result(cam.ll.wr8(reg, val))
}

fn rd<I: Interface, P: Platform>(cam: &mut Camera<I, P>, reg: u16) -> Result<u8, Error<I, P>> {
    Error::interface_result(cam.ll.rd8(reg))
}

/// Freezes exposure at the values the sensor settled on during preview,
/// remembering them for [`restore_exposure`].
fn hold_exposure<I: Interface, P: Platform>(cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
    wr(cam, REG_SHUTTER_MODE, 0xc1)?;
    cam.platform.sleep_ms(20);

    let shutter_h = rd(cam, REG_SHUTTER_H)?;
    let shutter_l = rd(cam, REG_SHUTTER_L)?;
    let again_h = rd(cam, REG_AGAIN_H)?;
    let again_l = rd(cam, REG_AGAIN_L)?;
    let dgain_h = rd(cam, REG_DGAIN_H)?;
    let dgain_l = rd(cam, REG_DGAIN_L)?;

    // Only a complete set of readings is worth restoring later.
    let carry = &mut cam.state.carry;
    carry.captured = true;
    carry.shutter = (shutter_h as u16) << 8 | (shutter_l as u16);
    carry.again_h = again_h;
    carry.again_l = again_l;
    carry.dgain = (((dgain_h as u16) << 8 | (dgain_l as u16)) >> 2) as u8;
    let carry = *carry;
    log::debug!(
        "gt2005 holding shutter {:#06x} again {:#04x}{:02x} dgain {:#04x}",
        carry.shutter,
        carry.again_h,
        carry.again_l,
        carry.dgain
    );

    wr(cam, REG_SHUTTER_MODE, 0x41)?;
    write_exposure(cam)?;
    cam.platform.sleep_ms(50);
    Ok(())
}

fn restore_exposure<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
) -> Result<(), Error<I, P>> {
    cam.state.carry.captured = false;
    log::debug!("gt2005 restoring preview exposure");
    wr(cam, REG_PREVIEW_CTRL, 0x00)?;
    write_exposure(cam)?;
    cam.platform.sleep_ms(50);
    wr(cam, REG_SHUTTER_MODE, 0x41)?;
    cam.platform.sleep_ms(50);
    Ok(())
}

fn write_exposure<I: Interface, P: Platform>(cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
    let carry = cam.state.carry;
    wr(cam, REG_MAN_SHUTTER_H, (carry.shutter >> 8) as u8)?;
    wr(cam, REG_MAN_SHUTTER_L, (carry.shutter & 0xff) as u8)?;
    wr(cam, REG_MAN_AGAIN_L, carry.again_l)?;
    wr(cam, REG_MAN_AGAIN_H, carry.again_h)?;
    wr(cam, REG_MAN_DGAIN, carry.dgain)
}

/// Hands exposure back to the sensor's automatic control.
fn resume_preview<I: Interface, P: Platform>(cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
    cam.platform.sleep_ms(50);
    wr(cam, REG_PREVIEW_CTRL, 0x03)?;
    wr(cam, REG_SHUTTER_MODE, 0x81)?;
    cam.platform.sleep_ms(300);
    Ok(())
}

const WHITE_BALANCE: &[RegisterTable] = &[
    register_table!("gt2005/wb_auto.regs"),
    register_table!("gt2005/wb_incandescent.regs"),
    register_table!("gt2005/wb_fluorescent.regs"),
    register_table!("gt2005/wb_daylight.regs"),
    register_table!("gt2005/wb_cloudy.regs"),
];

const EFFECT: &[RegisterTable] = &[
    register_table!("gt2005/effect_none.regs"),
    register_table!("gt2005/effect_mono.regs"),
    register_table!("gt2005/effect_negative.regs"),
    register_table!("gt2005/effect_sepia.regs"),
    register_table!("gt2005/effect_bluish.regs"),
    register_table!("gt2005/effect_green.regs"),
];

const SCENE: &[RegisterTable] = &[
    register_table!("gt2005/scene_auto.regs"),
    register_table!("gt2005/scene_night.regs"),
];

const MIRROR: &[RegisterTable] = &[
    register_table!("gt2005/mirror_off.regs"),
    register_table!("gt2005/mirror_on.regs"),
];

const FLIP: &[RegisterTable] = &[
    register_table!("gt2005/flip_off.regs"),
    register_table!("gt2005/flip_on.regs"),
];

pub static SENSOR: SensorDescriptor = SensorDescriptor {
    name: "gt2005",
    bus_address: 0x3c,
    id_registers: (0x0000, 0x0001),
    expected_id: 0x5138,
    capabilities: Capabilities::WHITE_BALANCE
        .union(Capabilities::EFFECT)
        .union(Capabilities::SCENE),
    power_on_level: true,
    power_up_delay_ms: 0,
    min_size: (640, 480),
    max_size: (1600, 1200),
    align_even: true,
    init_table: register_table!("gt2005/init.regs"),
    init_mode: Resolution::Vga,
    init_pixel_format: PixelFormat::Yuyv,
    modes: &[
        ModeTable {
            resolution: Resolution::Qcif,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Qvga,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Cif,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Vga,
            regs: register_table!("gt2005/vga.regs"),
        },
        ModeTable {
            resolution: Resolution::Svga,
            regs: register_table!("gt2005/svga.regs"),
        },
        ModeTable {
            resolution: Resolution::Sxga,
            regs: register_table!("gt2005/sxga.regs"),
        },
        ModeTable {
            resolution: Resolution::Uxga,
            regs: register_table!("gt2005/uxga.regs"),
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
        ControlSpec::new(ControlId::Exposure, 0, 6, 0, &[EMPTY; 7]),
        ControlSpec::new(ControlId::Saturation, 0, 2, 0, &[EMPTY; 3]),
        ControlSpec::new(ControlId::Contrast, -3, 3, 0, &[EMPTY; 7]),
        // Mirror and flip have tables but the module doesn't offer them.
        ControlSpec::new(ControlId::Mirror, 0, 1, 1, MIRROR),
        ControlSpec::new(ControlId::Flip, 0, 1, 1, FLIP),
        ControlSpec::new(ControlId::Scene, 0, 1, 0, SCENE),
    ],
    power_down_table: EMPTY,
    backend: Backend::Gt2005,
};

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::format::Format;
    use crate::interface::fake::{Call, Error as FakeError, Interface as FakeInterface};
    use crate::models::fake::TestCamera;
    use crate::platform::fake::{Event, Platform as FakePlatform};
    use std::vec::Vec;

    const ADDR: u8 = 0x3c;

    fn camera() -> TestCamera {
        let bus = FakeInterface::new().with_registers(ADDR, &[(0x0000, 0x51), (0x0001, 0x38)]);
        let mut cam = Camera::new(bus, FakePlatform::new());
        cam.probe().unwrap();
        cam.init().unwrap();
        let exposure = [
            (REG_SHUTTER_H, 0x01),
            (REG_SHUTTER_L, 0x80),
            (REG_AGAIN_H, 0x02),
            (REG_AGAIN_L, 0x20),
            (REG_DGAIN_H, 0x01),
            (REG_DGAIN_L, 0x00),
        ];
        for (reg, val) in exposure.iter().copied() {
            cam.borrow_interface().set_register(ADDR, reg, val);
        }
        cam.borrow_interface().take_calls();
        cam.borrow_platform().take_events();
        cam
    }

    fn writes_after(cam: &mut TestCamera, table: RegisterTable) -> Vec<(u16, u8)> {
        let writes = cam.borrow_interface().writes();
        let regs: Vec<(u16, u8)> = writes.iter().map(|w| (w.1, w.2)).collect();
        let expected: Vec<(u16, u8)> = table.iter().map(|op| (op.reg, op.val)).collect();
        assert_eq!(&regs[..expected.len()], &expected[..]);
        regs[expected.len()..].to_vec()
    }

    #[test]
    fn test_probe_binds() {
        let cam = camera();
        assert_eq!(cam.name(), "gt2005");
        assert_eq!(cam.chip_ident(ADDR).map(|id| id.ident), Ok(0x5138));
    }

    #[test]
    fn test_capture_holds_exposure() {
        let mut cam = camera();
        let got = cam.set_format(1600, 1200, PixelFormat::Yuyv);
        assert_eq!(got, Ok(Format::new(1600, 1200, PixelFormat::Yuyv)));

        let after = writes_after(&mut cam, register_table!("gt2005/uxga.regs"));
        assert_eq!(
            &after[..7],
            &[
                (0x0300, 0xc1),
                (0x0300, 0x41),
                (0x0304, 0x01),
                (0x0305, 0x80),
                (0x0307, 0x20),
                (0x0306, 0x02),
                (0x0308, 0x40),
            ]
        );
        assert_eq!(
            cam.borrow_platform().events(),
            &[Event::Sleep(20), Event::Sleep(50)]
        );

        let carry = cam.state().exposure_carry();
        assert!(carry.captured());
        assert_eq!(carry.shutter(), 0x0180);
        assert_eq!(carry.analog_gain(), (0x02, 0x20));
        assert_eq!(carry.digital_gain(), 0x40);
    }

    #[test]
    fn test_preview_restores_exposure() {
        let mut cam = camera();
        cam.set_format(1600, 1200, PixelFormat::Yuyv).unwrap();
        cam.borrow_interface().take_calls();
        cam.borrow_platform().take_events();

        cam.set_format(800, 600, PixelFormat::Yuyv).unwrap();
        let after = writes_after(&mut cam, register_table!("gt2005/svga.regs"));
        assert_eq!(
            &after[..9],
            &[
                (0x0104, 0x00),
                (0x0304, 0x01),
                (0x0305, 0x80),
                (0x0307, 0x20),
                (0x0306, 0x02),
                (0x0308, 0x40),
                (0x0300, 0x41),
                (0x0104, 0x03),
                (0x0300, 0x81),
            ]
        );
        assert_eq!(
            cam.borrow_platform().events(),
            &[
                Event::Sleep(50),
                Event::Sleep(50),
                Event::Sleep(50),
                Event::Sleep(300)
            ]
        );
        assert!(!cam.state().exposure_carry().captured());
    }

    #[test]
    fn test_failed_hold_is_not_restored() {
        let mut cam = camera();
        cam.borrow_interface().fail_when(|call| {
            *call
                == Call::Read {
                    addr: ADDR,
                    reg: REG_SHUTTER_H,
                }
        });
        assert_eq!(
            cam.set_format(1600, 1200, PixelFormat::Yuyv),
            Err(Error::Interface(FakeError::Injected))
        );
        assert!(!cam.state().exposure_carry().captured());

        // Nothing was captured, so going back to preview must not write a
        // zero exposure.
        cam.borrow_interface().heal();
        cam.borrow_interface().take_calls();
        cam.borrow_platform().take_events();
        cam.set_format(800, 600, PixelFormat::Yuyv).unwrap();
        let after = writes_after(&mut cam, register_table!("gt2005/svga.regs"));
        assert_eq!(&after[..2], &[(0x0104, 0x03), (0x0300, 0x81)]);
        assert!(!after.iter().any(|w| w.0 == REG_MAN_SHUTTER_H));
        assert_eq!(
            cam.borrow_platform().events(),
            &[Event::Sleep(50), Event::Sleep(300)]
        );
    }

    #[test]
    fn test_svga_without_capture() {
        let mut cam = camera();
        cam.set_format(800, 600, PixelFormat::Yuyv).unwrap();
        let after = writes_after(&mut cam, register_table!("gt2005/svga.regs"));
        assert_eq!(&after[..], &[(0x0104, 0x03), (0x0300, 0x81)]);
        assert_eq!(
            cam.borrow_platform().events(),
            &[Event::Sleep(50), Event::Sleep(300)]
        );
    }

    #[test]
    fn test_orientation() {
        let mut cam = camera();
        // The init table leaves the mirror bit set.
        assert_eq!(cam.borrow_interface().register(ADDR, 0x0101), Some(0x01));

        cam.change_orientation(Orientation::Landscape).unwrap();
        assert_eq!(cam.borrow_interface().register(ADDR, 0x0101), Some(0x00));

        cam.change_orientation(Orientation::Portrait).unwrap();
        assert_eq!(cam.borrow_interface().register(ADDR, 0x0101), Some(0x03));

        cam.borrow_interface().take_calls();
        cam.change_orientation(Orientation::Portrait).unwrap();
        assert!(cam.borrow_interface().writes().is_empty());
    }

    #[test]
    fn test_mirror_not_offered() {
        let cam = camera();
        assert_eq!(cam.get_control(ControlId::Mirror), Err(Error::Unsupported));
        assert_eq!(cam.get_control(ControlId::Effect), Ok(0));
    }

    #[test]
    fn test_try_format_rounds_even() {
        let cam = camera();
        assert_eq!(
            cam.try_format(641, 481, PixelFormat::Uyvy),
            Ok(Format::new(642, 482, PixelFormat::Uyvy))
        );
        assert_eq!(
            cam.try_format(100, 100, PixelFormat::Yuyv),
            Ok(Format::new(640, 480, PixelFormat::Yuyv))
        );
    }
}
