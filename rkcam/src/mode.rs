//! Format negotiation and the transitions between output modes.

use crate::controls::{self, ControlId};
use crate::error::Error;
use crate::format::{Format, PixelFormat, RequestKind};
use crate::interface::Interface;
use crate::models::Operations;
use crate::platform::{FlashState, Platform};
use crate::programmer;
use crate::Camera;

/// Switches the sensor to the smallest populated mode covering the
/// requested size, and to the requested pixel format.
///
/// Requesting the mode that is already programmed writes nothing. When no
/// mode is large enough the sensor is switched to its default mode instead
/// and the result is [`Error::FormatUnsupported`] carrying that mode's
/// format.
pub(crate) fn set_format<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
) -> Result<Format, Error<I, P>> {
    let desc = cam.bound()?;
    if !cam.state.active {
        return Err(Error::NotActive);
    }
    let format_regs = match desc.format_table(pixel_format) {
        Some(regs) => regs,
        None => {
            log::debug!("{} can't produce {:?}", desc.name, pixel_format);
            return Err(Error::InvalidValue);
        }
    };

    if cam.state.pixel_format != Some(pixel_format) {
        programmer::apply(cam, format_regs)?;
        cam.state.pixel_format = Some(pixel_format);
        log::debug!("{} pixel format {:?}", desc.name, pixel_format);
    }

    let (mode, fallback) = match desc.select_mode(width, height) {
        Some(mode) => (mode, false),
        None => {
            log::warn!(
                "{} has no mode covering {}x{}, using {}",
                desc.name,
                width,
                height,
                desc.init_mode.name()
            );
            (desc.init_mode, true)
        }
    };
    let format = Format::from_resolution(mode, pixel_format);

    if cam.state.mode == Some(mode) {
        log::trace!("{} already in {}", desc.name, mode.name());
    } else {
        let kind = RequestKind::classify(width, height);
        let flash_armed = flash_armed(cam);
        if flash_armed {
            let state = match kind {
                RequestKind::Capture => FlashState::On,
                _ => FlashState::Off,
            };
            controls::set_flash(cam, state)?;
        }

        if let Err(err) = programmer::apply(cam, desc.mode_table(mode)) {
            log::error!("{} failed to switch to {}", desc.name, mode.name());
            if flash_armed && kind == RequestKind::Capture {
                let _ = controls::set_flash(cam, FlashState::Off);
            }
            return Err(err);
        }

        // The window is programmed now, whatever happens in the hooks below.
        cam.state.mode = Some(mode);
        cam.state.format = Some(format);
        match kind {
            RequestKind::Capture => cam.state.snap2preview = true,
            RequestKind::Video => cam.state.video2preview = true,
            RequestKind::Preview => {}
        }
        log::debug!("{} switched to {} ({:?})", desc.name, mode.name(), kind);

        let hooks = match desc.backend.mode_changed(cam, mode) {
            Ok(()) => refresh_controls(cam, kind),
            Err(err) => Err(err),
        };
        if let Err(err) = hooks {
            log::error!("{} failed to settle in {}", desc.name, mode.name());
            if flash_armed && kind == RequestKind::Capture {
                let _ = controls::set_flash(cam, FlashState::Off);
            }
            return Err(err);
        }
    }
    cam.state.format = Some(format);

    if fallback {
        Err(Error::FormatUnsupported(format))
    } else {
        Ok(format)
    }
}

/// The format that [`set_format`] would settle on if asked for the same
/// thing, except that the size is only clamped to the sensor's limits
/// rather than snapped to a mode. Touches no hardware.
pub(crate) fn try_format<I: Interface, P: Platform>(
    cam: &Camera<I, P>,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
) -> Result<Format, Error<I, P>> {
    let desc = cam.bound()?;
    let pixel_format = if desc.supports(pixel_format) {
        pixel_format
    } else {
        cam.state.pixel_format.unwrap_or(desc.init_pixel_format)
    };

    let (min_w, min_h) = desc.min_size;
    let (max_w, max_h) = desc.max_size;
    let mut width = clamp(width, min_w, max_w);
    let mut height = clamp(height, min_h, max_h);
    if desc.align_even && pixel_format.is_packed() {
        width = clamp((width + 1) & !1, min_w, max_w);
        height = clamp((height + 1) & !1, min_h, max_h);
    }
    Ok(Format::new(width, height, pixel_format))
}

pub(crate) fn get_format<I: Interface, P: Platform>(
    cam: &Camera<I, P>,
) -> Result<Format, Error<I, P>> {
    let desc = cam.bound()?;
    Ok(cam.state.format.unwrap_or_else(|| desc.init_format()))
}

fn flash_armed<I: Interface, P: Platform>(cam: &Camera<I, P>) -> bool {
    if !cam.capabilities().contains(ControlId::Flash.capability()) {
        return false;
    }
    match cam.state.controls.flash_mode() {
        Some(mode) => mode.fires_on_capture(),
        None => false,
    }
}

/// Some sensors reset their effect and white balance settings when
/// switching in to or out of the large capture and video windows, so those
/// are programmed again after such a switch and once more on the way back
/// to preview. The caller marks the way back as pending before this runs.
fn refresh_controls<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    kind: RequestKind,
) -> Result<(), Error<I, P>> {
    match kind {
        RequestKind::Capture => {
            controls::reapply(cam, ControlId::Effect)?;
            if cam.state.controls.get(ControlId::WhiteBalance) != 0 {
                controls::reapply(cam, ControlId::WhiteBalance)?;
            }
        }
        RequestKind::Video => {
            controls::reapply(cam, ControlId::Effect)?;
            controls::reapply(cam, ControlId::WhiteBalance)?;
        }
        RequestKind::Preview => {
            if cam.state.pending_refresh() {
                controls::reapply(cam, ControlId::Effect)?;
                controls::reapply(cam, ControlId::WhiteBalance)?;
                cam.state.snap2preview = false;
                cam.state.video2preview = false;
            }
        }
    }
    Ok(())
}

fn clamp(v: u32, min: u32, max: u32) -> u32 {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}
