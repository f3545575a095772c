//! Image controls (white balance, effects, zoom, flash and so on) and the
//! register tables that implement them.

use crate::error::Error;
use crate::interface::Interface;
use crate::platform::{FlashState, Platform};
use crate::programmer;
use crate::registers::RegisterTable;
use crate::Camera;
use core::convert::TryFrom;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Identifies one of the controls a sensor may offer.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum ControlId {
    WhiteBalance = 0,
    Brightness = 1,
    Contrast = 2,
    Saturation = 3,
    Effect = 4,
    Exposure = 5,
    Scene = 6,
    Mirror = 7,
    Flip = 8,
    ZoomAbsolute = 9,
    ZoomRelative = 10,
    FocusAbsolute = 11,
    FocusRelative = 12,
    Flash = 13,
}

impl ControlId {
    pub const COUNT: usize = 14;

    pub const ALL: [ControlId; Self::COUNT] = [
        ControlId::WhiteBalance,
        ControlId::Brightness,
        ControlId::Contrast,
        ControlId::Saturation,
        ControlId::Effect,
        ControlId::Exposure,
        ControlId::Scene,
        ControlId::Mirror,
        ControlId::Flip,
        ControlId::ZoomAbsolute,
        ControlId::ZoomRelative,
        ControlId::FocusAbsolute,
        ControlId::FocusRelative,
        ControlId::Flash,
    ];

    /// The capability bit a sensor must declare for this control to be
    /// offered.
    pub const fn capability(self) -> Capabilities {
        match self {
            ControlId::WhiteBalance => Capabilities::WHITE_BALANCE,
            ControlId::Brightness => Capabilities::BRIGHTNESS,
            ControlId::Contrast => Capabilities::CONTRAST,
            ControlId::Saturation => Capabilities::SATURATION,
            ControlId::Effect => Capabilities::EFFECT,
            ControlId::Exposure => Capabilities::EXPOSURE,
            ControlId::Scene => Capabilities::SCENE,
            ControlId::Mirror => Capabilities::MIRROR,
            ControlId::Flip => Capabilities::FLIP,
            ControlId::ZoomAbsolute | ControlId::ZoomRelative => Capabilities::DIGITAL_ZOOM,
            ControlId::FocusAbsolute | ControlId::FocusRelative => Capabilities::FOCUS,
            ControlId::Flash => Capabilities::FLASH,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ControlId::WhiteBalance => "white_balance",
            ControlId::Brightness => "brightness",
            ControlId::Contrast => "contrast",
            ControlId::Saturation => "saturation",
            ControlId::Effect => "effect",
            ControlId::Exposure => "exposure",
            ControlId::Scene => "scene",
            ControlId::Mirror => "mirror",
            ControlId::Flip => "flip",
            ControlId::ZoomAbsolute => "zoom_absolute",
            ControlId::ZoomRelative => "zoom_relative",
            ControlId::FocusAbsolute => "focus_absolute",
            ControlId::FocusRelative => "focus_relative",
            ControlId::Flash => "flash",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }

    const fn index(self) -> usize {
        self as u8 as usize
    }
}

/// A set of optional controls, as declared by a sensor descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const NONE: Self = Self(0);
    pub const WHITE_BALANCE: Self = Self(1 << 0);
    pub const BRIGHTNESS: Self = Self(1 << 1);
    pub const CONTRAST: Self = Self(1 << 2);
    pub const SATURATION: Self = Self(1 << 3);
    pub const EFFECT: Self = Self(1 << 4);
    pub const SCENE: Self = Self(1 << 5);
    pub const DIGITAL_ZOOM: Self = Self(1 << 6);
    pub const FOCUS: Self = Self(1 << 7);
    pub const EXPOSURE: Self = Self(1 << 8);
    pub const FLASH: Self = Self(1 << 9);
    pub const MIRROR: Self = Self(1 << 10);
    pub const FLIP: Self = Self(1 << 11);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl core::ops::BitOr for Capabilities {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        self.union(other)
    }
}

/// Describes one control a sensor offers: its valid range, its default and,
/// for register-backed controls, one register table per value starting at
/// `min`.
///
/// A control whose tables are all empty is still offered and still tracks
/// its value, but programming it touches no registers.
#[derive(Clone, Copy, Debug)]
pub struct ControlSpec {
    pub id: ControlId,
    pub min: i32,
    pub max: i32,
    pub default: i32,
    pub tables: &'static [RegisterTable],
}

impl ControlSpec {
    pub const fn new(
        id: ControlId,
        min: i32,
        max: i32,
        default: i32,
        tables: &'static [RegisterTable],
    ) -> Self {
        Self {
            id: id,
            min: min,
            max: max,
            default: default,
            tables: tables,
        }
    }

    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    /// The register table for the given value, if there is one.
    pub fn table(&self, value: i32) -> Option<RegisterTable> {
        if !self.contains(value) {
            return None;
        }
        self.tables.get((value - self.min) as usize).copied()
    }
}

/// Values for the flash control.
#[derive(TryFromPrimitive, IntoPrimitive, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FlashMode {
    Off = 0,
    Auto = 1,
    On = 2,
    Torch = 3,
}

impl FlashMode {
    /// Stored in place of a flash mode when the board has no flash wired.
    pub const DISABLED: i32 = 0xff;

    pub fn from_value(v: i32) -> Option<Self> {
        let raw = u8::try_from(v).ok()?;
        Self::try_from(raw).ok()
    }

    /// Whether a still capture should fire the flash.
    pub fn fires_on_capture(self) -> bool {
        match self {
            FlashMode::Auto | FlashMode::On => true,
            FlashMode::Off | FlashMode::Torch => false,
        }
    }
}

/// The current value of every control, whether or not the bound sensor
/// offers it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ControlValues([i32; ControlId::COUNT]);

impl ControlValues {
    pub fn get(&self, id: ControlId) -> i32 {
        self.0[id.index()]
    }

    pub(crate) fn set(&mut self, id: ControlId, v: i32) {
        self.0[id.index()] = v;
    }

    pub fn flash_mode(&self) -> Option<FlashMode> {
        FlashMode::from_value(self.get(ControlId::Flash))
    }
}

pub(crate) fn get_control<I: Interface, P: Platform>(
    cam: &Camera<I, P>,
    id: ControlId,
) -> Result<i32, Error<I, P>> {
    query_control(cam, id)?;
    Ok(cam.state.controls.get(id))
}

pub(crate) fn query_control<I: Interface, P: Platform>(
    cam: &Camera<I, P>,
    id: ControlId,
) -> Result<ControlSpec, Error<I, P>> {
    let desc = cam.bound()?;
    if !cam.capabilities().contains(id.capability()) {
        return Err(Error::Unsupported);
    }
    match desc.control(id) {
        Some(spec) => Ok(*spec),
        None => Err(Error::Unsupported),
    }
}

pub(crate) fn set_control<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    id: ControlId,
    value: i32,
) -> Result<(), Error<I, P>> {
    let spec = query_control(cam, id)?;
    if !spec.contains(value) {
        log::debug!(
            "{} value {} outside {}..={}",
            id.name(),
            value,
            spec.min,
            spec.max
        );
        return Err(Error::InvalidValue);
    }
    if !cam.state.active {
        return Err(Error::NotActive);
    }

    match id {
        ControlId::ZoomRelative => zoom_by(cam, value),
        ControlId::ZoomAbsolute => {
            let delta = value - cam.state.controls.get(ControlId::ZoomAbsolute);
            if delta == 0 {
                return Ok(());
            }
            zoom_by(cam, delta)
        }
        ControlId::FocusAbsolute => {
            cam.state.controls.set(ControlId::FocusAbsolute, value);
            Ok(())
        }
        ControlId::FocusRelative => {
            let abs = query_control(cam, ControlId::FocusAbsolute)?;
            let cur = cam.state.controls.get(ControlId::FocusAbsolute);
            let next = clamp(cur + value, abs.min, abs.max);
            cam.state.controls.set(ControlId::FocusAbsolute, next);
            Ok(())
        }
        ControlId::Flash => {
            if value == cam.state.controls.get(ControlId::Flash) {
                return Ok(());
            }
            // Only torch lights the LED straight away. Auto and on are
            // acted on when switching into a capture mode.
            let state = if value == FlashMode::Torch as i32 {
                FlashState::Torch
            } else {
                FlashState::Off
            };
            set_flash(cam, state)?;
            cam.state.controls.set(ControlId::Flash, value);
            Ok(())
        }
        _ => {
            if value == cam.state.controls.get(id) {
                return Ok(());
            }
            let table = match spec.table(value) {
                Some(table) => table,
                None => return Err(Error::InvalidValue),
            };
            programmer::apply(cam, table)?;
            log::debug!("{} set to {}", id.name(), value);
            cam.state.controls.set(id, value);
            Ok(())
        }
    }
}

/// Programs the table for a control's current value again, whether or not
/// it has changed. Sensors that forget some settings across a mode switch
/// use this to restore them. Controls the sensor doesn't offer are skipped.
pub(crate) fn reapply<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    id: ControlId,
) -> Result<(), Error<I, P>> {
    let spec = match query_control(cam, id) {
        Ok(spec) => spec,
        Err(Error::Unsupported) => return Ok(()),
        Err(err) => return Err(err),
    };
    let value = cam.state.controls.get(id);
    if let Some(table) = spec.table(value) {
        log::trace!("reapplying {} = {}", id.name(), value);
        programmer::apply(cam, table)?;
    }
    Ok(())
}

pub(crate) fn set_flash<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    state: FlashState,
) -> Result<(), Error<I, P>> {
    log::debug!("flash {:?}", state);
    Error::platform_result(cam.platform.flash(state))
}

fn zoom_by<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    delta: i32,
) -> Result<(), Error<I, P>> {
    let abs = query_control(cam, ControlId::ZoomAbsolute)?;
    let cur = cam.state.controls.get(ControlId::ZoomAbsolute);

    if delta > 0 && cur >= abs.max {
        log::debug!("zoom already at maximum {}", cur);
        return Err(Error::InvalidValue);
    }
    if delta < 0 && cur <= abs.min {
        log::debug!("zoom already at minimum {}", cur);
        return Err(Error::InvalidValue);
    }

    let next = clamp(cur + delta, abs.min, abs.max);
    let table = match abs.table(next) {
        Some(table) => table,
        None => return Err(Error::InvalidValue),
    };
    programmer::apply(cam, table)?;
    log::debug!("zoom {} -> {}", cur, next);
    cam.state.controls.set(ControlId::ZoomAbsolute, next);
    Ok(())
}

fn clamp(v: i32, min: i32, max: i32) -> i32 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::models::fake::{self, TestCamera};
    use crate::platform::fake::Event;

    fn camera() -> TestCamera {
        fake::initialized_camera()
    }

    #[test]
    fn test_control_lookup_by_name() {
        assert_eq!(ControlId::from_name("effect"), Some(ControlId::Effect));
        assert_eq!(ControlId::from_name("zoom_relative"), Some(ControlId::ZoomRelative));
        assert_eq!(ControlId::from_name("sharpness"), None);
        assert_eq!(ControlId::try_from(13u8), Ok(ControlId::Flash));
    }

    #[test]
    fn test_capabilities() {
        let caps = Capabilities::WHITE_BALANCE | Capabilities::EFFECT;
        assert!(caps.contains(Capabilities::EFFECT));
        assert!(!caps.contains(Capabilities::FLASH));
        assert!(!caps.without(Capabilities::EFFECT).contains(Capabilities::EFFECT));
    }

    #[test]
    fn test_defaults_loaded_on_init() {
        let cam = camera();
        assert_eq!(cam.get_control(ControlId::WhiteBalance), Ok(0));
        assert_eq!(cam.get_control(ControlId::Mirror), Ok(1));
        assert_eq!(cam.get_control(ControlId::FocusAbsolute), Ok(125));
    }

    #[test]
    fn test_set_applies_table() {
        let mut cam = camera();
        cam.borrow_interface().take_calls();
        cam.set_control(ControlId::Effect, 2).unwrap();
        assert_eq!(cam.get_control(ControlId::Effect), Ok(2));
        assert_eq!(
            cam.borrow_interface().writes(),
            std::vec![(fake::ADDR, 0x2001, 0x02)]
        );
    }

    #[test]
    fn test_set_unchanged_is_noop() {
        let mut cam = camera();
        cam.borrow_interface().take_calls();
        cam.set_control(ControlId::WhiteBalance, 0).unwrap();
        assert!(cam.borrow_interface().calls().is_empty());
    }

    #[test]
    fn test_out_of_range_touches_nothing() {
        let mut cam = camera();
        cam.borrow_interface().take_calls();
        assert_eq!(
            cam.set_control(ControlId::Brightness, 3),
            Err(Error::InvalidValue)
        );
        assert_eq!(
            cam.set_control(ControlId::Brightness, -4),
            Err(Error::InvalidValue)
        );
        assert!(cam.borrow_interface().calls().is_empty());
        assert_eq!(cam.get_control(ControlId::Brightness), Ok(0));
    }

    #[test]
    fn test_failed_apply_keeps_value() {
        let mut cam = camera();
        cam.borrow_interface().fail_when(|_| true);
        assert_eq!(
            cam.set_control(ControlId::Effect, 1),
            Err(Error::ProgrammingFailed)
        );
        assert_eq!(cam.get_control(ControlId::Effect), Ok(0));
    }

    #[test]
    fn test_inert_control() {
        let mut cam = camera();
        cam.borrow_interface().take_calls();
        cam.set_control(ControlId::Contrast, 2).unwrap();
        assert_eq!(cam.get_control(ControlId::Contrast), Ok(2));
        assert!(cam.borrow_interface().calls().is_empty());
    }

    #[test]
    fn test_missing_table_is_invalid() {
        let mut cam = camera();
        // Saturation declares a range wider than its table list.
        assert_eq!(
            cam.set_control(ControlId::Saturation, 2),
            Err(Error::InvalidValue)
        );
        assert_eq!(cam.get_control(ControlId::Saturation), Ok(0));
    }

    #[test]
    fn test_not_offered() {
        let mut cam = camera();
        assert_eq!(cam.get_control(ControlId::Exposure), Err(Error::Unsupported));
        assert_eq!(cam.set_control(ControlId::Exposure, 1), Err(Error::Unsupported));
    }

    #[test]
    fn test_zoom_relative_clamps() {
        let mut cam = camera();
        cam.set_control(ControlId::ZoomAbsolute, 2).unwrap();
        cam.borrow_interface().take_calls();

        cam.set_control(ControlId::ZoomRelative, 1).unwrap();
        assert_eq!(cam.get_control(ControlId::ZoomAbsolute), Ok(3));
        assert_eq!(
            cam.borrow_interface().writes(),
            std::vec![(fake::ADDR, 0x2100, 0x03)]
        );

        // Already at the top, so a further step up is refused.
        assert_eq!(
            cam.set_control(ControlId::ZoomRelative, 1),
            Err(Error::InvalidValue)
        );
        assert_eq!(cam.get_control(ControlId::ZoomAbsolute), Ok(3));
    }

    #[test]
    fn test_zoom_bottom() {
        let mut cam = camera();
        assert_eq!(
            cam.set_control(ControlId::ZoomRelative, -1),
            Err(Error::InvalidValue)
        );
        cam.set_control(ControlId::ZoomAbsolute, 1).unwrap();
        cam.set_control(ControlId::ZoomRelative, -1).unwrap();
        assert_eq!(cam.get_control(ControlId::ZoomAbsolute), Ok(0));
    }

    #[test]
    fn test_focus_state() {
        let mut cam = camera();
        cam.set_control(ControlId::FocusAbsolute, 250).unwrap();
        cam.set_control(ControlId::FocusRelative, 1).unwrap();
        assert_eq!(cam.get_control(ControlId::FocusAbsolute), Ok(251));
        cam.set_control(ControlId::FocusAbsolute, 255).unwrap();
        cam.set_control(ControlId::FocusRelative, 1).unwrap();
        assert_eq!(cam.get_control(ControlId::FocusAbsolute), Ok(255));
        assert_eq!(
            cam.set_control(ControlId::FocusAbsolute, 256),
            Err(Error::InvalidValue)
        );
    }

    #[test]
    fn test_flash_torch_and_off() {
        let mut cam = camera();
        cam.borrow_platform().take_events();
        cam.set_control(ControlId::Flash, 3).unwrap();
        cam.set_control(ControlId::Flash, 1).unwrap();
        assert_eq!(
            cam.borrow_platform().events(),
            &[Event::Flash(FlashState::Torch), Event::Flash(FlashState::Off)]
        );
        assert_eq!(cam.get_control(ControlId::Flash), Ok(1));
    }

    #[test]
    fn test_flash_withdrawn_without_gpio() {
        let mut cam = fake::initialized_camera_with(crate::Config::new().with_flash(false));
        assert_eq!(cam.get_control(ControlId::Flash), Err(Error::Unsupported));
        assert_eq!(cam.set_control(ControlId::Flash, 3), Err(Error::Unsupported));
        assert_eq!(cam.state().controls().get(ControlId::Flash), FlashMode::DISABLED);
    }

    #[test]
    fn test_not_active() {
        let mut cam = fake::probed_camera();
        assert_eq!(cam.set_control(ControlId::Effect, 1), Err(Error::NotActive));
    }
}
