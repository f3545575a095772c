//! A fake sensor model for testing.
//!
//! Its tables write small, easily-recognized values so tests can tell them
//! apart in the fake bus's call log. It offers every control except
//! exposure, has no QVGA or XGA window, and identifies as 0x2656 at
//! registers 0x0000 and 0x0001.

use super::Backend;
use crate::config::Config;
use crate::controls::{Capabilities, ControlId, ControlSpec};
use crate::descriptor::{FormatTable, ModeTable, SensorDescriptor};
use crate::format::{PixelFormat, Resolution};
use crate::interface::fake::Interface as FakeInterface;
use crate::platform::fake::Platform as FakePlatform;
use crate::registers::{RegOp, RegisterTable, EMPTY};
use crate::Camera;

pub(crate) const ADDR: u8 = 0x30;

pub(crate) type TestCamera = Camera<FakeInterface, FakePlatform>;

const fn op(reg: u16, val: u8) -> RegOp {
    RegOp::new(reg, val)
}

const INIT: RegisterTable = &[op(0x1000, 0x01), op(0x1001, 0x02)];
pub(crate) const QCIF: RegisterTable = &[op(0x1100, 0x01), op(0x1101, 0xb0), op(0x1102, 0x90)];
const CIF: RegisterTable = &[op(0x1100, 0x03)];
pub(crate) const VGA: RegisterTable = &[op(0x1100, 0x04)];
const SVGA: RegisterTable = &[op(0x1100, 0x05)];
pub(crate) const HD720: RegisterTable = &[op(0x1100, 0x06)];
pub(crate) const SXGA: RegisterTable = &[op(0x1100, 0x07)];
pub(crate) const UXGA: RegisterTable = &[op(0x1100, 0x08)];
pub(crate) const UYVY: RegisterTable = &[op(0x1200, 0x01)];

const WHITE_BALANCE: &[RegisterTable] = &[
    &[op(0x2002, 0)],
    &[op(0x2002, 1)],
    &[op(0x2002, 2)],
    &[op(0x2002, 3)],
    &[op(0x2002, 4)],
];

const EFFECT: &[RegisterTable] = &[
    &[op(0x2001, 0)],
    &[op(0x2001, 1)],
    &[op(0x2001, 2)],
    &[op(0x2001, 3)],
    &[op(0x2001, 4)],
    &[op(0x2001, 5)],
];

const BRIGHTNESS: &[RegisterTable] = &[
    &[op(0x2004, 0)],
    &[op(0x2004, 1)],
    &[op(0x2004, 2)],
    &[op(0x2004, 3)],
    &[op(0x2004, 4)],
    &[op(0x2004, 5)],
];

const CONTRAST: &[RegisterTable] = &[EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY, EMPTY];

// One table short of the declared range.
const SATURATION: &[RegisterTable] = &[&[op(0x2005, 0)], &[op(0x2005, 1)]];

const SCENE: &[RegisterTable] = &[&[op(0x2006, 0)], &[op(0x2006, 1)]];
const MIRROR: &[RegisterTable] = &[&[op(0x2007, 0)], &[op(0x2007, 1)]];
const FLIP: &[RegisterTable] = &[&[op(0x2008, 0)], &[op(0x2008, 1)]];

const ZOOM: &[RegisterTable] = &[
    &[op(0x2100, 0)],
    &[op(0x2100, 1)],
    &[op(0x2100, 2)],
    &[op(0x2100, 3)],
];

pub(crate) static SENSOR: SensorDescriptor = SensorDescriptor {
    name: "fake",
    bus_address: ADDR,
    id_registers: (0x0000, 0x0001),
    expected_id: 0x2656,
    capabilities: Capabilities::WHITE_BALANCE
        .union(Capabilities::BRIGHTNESS)
        .union(Capabilities::CONTRAST)
        .union(Capabilities::SATURATION)
        .union(Capabilities::EFFECT)
        .union(Capabilities::SCENE)
        .union(Capabilities::DIGITAL_ZOOM)
        .union(Capabilities::FOCUS)
        .union(Capabilities::FLASH)
        .union(Capabilities::MIRROR)
        .union(Capabilities::FLIP),
    power_on_level: true,
    power_up_delay_ms: 0,
    min_size: (176, 144),
    max_size: (1600, 1200),
    align_even: false,
    init_table: INIT,
    init_mode: Resolution::Vga,
    init_pixel_format: PixelFormat::Yuyv,
    modes: &[
        ModeTable {
            resolution: Resolution::Qcif,
            regs: QCIF,
        },
        ModeTable {
            resolution: Resolution::Qvga,
            regs: EMPTY,
        },
        ModeTable {
            resolution: Resolution::Cif,
            regs: CIF,
        },
        ModeTable {
            resolution: Resolution::Vga,
            regs: VGA,
        },
        ModeTable {
            resolution: Resolution::Svga,
            regs: SVGA,
        },
        ModeTable {
            resolution: Resolution::Hd720,
            regs: HD720,
        },
        ModeTable {
            resolution: Resolution::Sxga,
            regs: SXGA,
        },
        ModeTable {
            resolution: Resolution::Uxga,
            regs: UXGA,
        },
    ],
    formats: &[
        FormatTable {
            pixel_format: PixelFormat::Yuyv,
            regs: EMPTY,
        },
        FormatTable {
            pixel_format: PixelFormat::Uyvy,
            regs: UYVY,
        },
    ],
    controls: &[
        ControlSpec::new(ControlId::WhiteBalance, 0, 4, 0, WHITE_BALANCE),
        ControlSpec::new(ControlId::Brightness, -3, 2, 0, BRIGHTNESS),
        ControlSpec::new(ControlId::Effect, 0, 5, 0, EFFECT),
        ControlSpec::new(ControlId::Saturation, 0, 2, 0, SATURATION),
        ControlSpec::new(ControlId::Contrast, -3, 3, 0, CONTRAST),
        ControlSpec::new(ControlId::Mirror, 0, 1, 1, MIRROR),
        ControlSpec::new(ControlId::Flip, 0, 1, 1, FLIP),
        ControlSpec::new(ControlId::Scene, 0, 1, 0, SCENE),
        ControlSpec::new(ControlId::ZoomRelative, -1, 1, 0, &[]),
        ControlSpec::new(ControlId::ZoomAbsolute, 0, 3, 0, ZOOM),
        ControlSpec::new(ControlId::FocusRelative, -1, 1, 0, &[]),
        ControlSpec::new(ControlId::FocusAbsolute, 0, 255, 125, &[]),
        ControlSpec::new(ControlId::Flash, 0, 3, 0, &[]),
    ],
    power_down_table: &[op(0x10ff, 0x01)],
    backend: Backend::Generic,
};

/// A bus with only the fake sensor attached, answering with its identity.
pub(crate) fn bus() -> FakeInterface {
    FakeInterface::new().with_registers(ADDR, &[(0x0000, 0x26), (0x0001, 0x56)])
}

pub(crate) fn probed_camera() -> TestCamera {
    probed_camera_with(Config::new())
}

pub(crate) fn probed_camera_with(config: Config) -> TestCamera {
    let mut cam = Camera::with_config(bus(), FakePlatform::new(), config);
    cam.probe_candidates(&[&SENSOR]).unwrap();
    cam
}

pub(crate) fn initialized_camera() -> TestCamera {
    initialized_camera_with(Config::new())
}

pub(crate) fn initialized_camera_with(config: Config) -> TestCamera {
    let mut cam = probed_camera_with(config);
    cam.init().unwrap();
    cam
}
