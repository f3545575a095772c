//! Power sequencing and the canonical probe, init and deactivate sequences.

use crate::controls::{ControlId, FlashMode};
use crate::descriptor::SensorDescriptor;
use crate::error::Error;
use crate::interface::Interface;
use crate::low_level::LowLevel;
use crate::models::Operations;
use crate::platform::Platform;
use crate::programmer;
use crate::state::FunModule;
use crate::Camera;

/// Settle time after the powerdown line goes low, before reset is pulsed.
const POWERDOWN_LOW_SETTLE_MS: u32 = 2;

/// Time allowed for the sensor to drain after it is powered down on
/// deactivation.
const DEACTIVATE_SETTLE_MS: u32 = 100;

/// Drives the powerdown line to power the sensor up or down, according to
/// the descriptor's polarity.
///
/// Whenever the line ends up low the sensor's reset is pulsed after a short
/// settle time, whichever direction that represents for this model.
pub(crate) fn power<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    desc: &SensorDescriptor,
    on: bool,
) -> Result<(), Error<I, P>> {
    let level = if on {
        desc.power_on_level
    } else {
        !desc.power_on_level
    };
    log::trace!(
        "{} power {} (powerdown line {})",
        desc.name,
        if on { "on" } else { "off" },
        if level { "high" } else { "low" }
    );
    Error::platform_result(cam.platform.set_powerdown(level))?;
    if !level {
        cam.platform.sleep_ms(POWERDOWN_LOW_SETTLE_MS);
        Error::platform_result(cam.platform.reset())?;
    }
    Ok(())
}

/// Reads the identity registers of the given descriptor and checks them.
fn check_identity<I: Interface, P: Platform>(
    ll: &mut LowLevel<I>,
    desc: &SensorDescriptor,
) -> Result<(), Error<I, P>> {
    let (hi, lo) = desc.id_registers;
    let id = Error::interface_result(ll.rd16_pair(hi, lo))?;
    if id != desc.expected_id {
        log::debug!(
            "{}: identity {:#06x} doesn't match {:#06x}",
            desc.name,
            id,
            desc.expected_id
        );
        return Err(Error::NoDeviceFound);
    }
    log::debug!("{}: identity {:#06x}", desc.name, id);
    Ok(())
}

pub(crate) fn video_probe<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
) -> Result<(), Error<I, P>> {
    let desc = cam.bound()?;
    power(cam, desc, true)?;
    match check_identity(&mut cam.ll, desc) {
        Ok(()) => Ok(()),
        Err(err) => {
            // Power down whatever the reason, but report the original
            // failure rather than any from powering down.
            let _ = power(cam, desc, false);
            Err(err)
        }
    }
}

pub(crate) fn init<I: Interface, P: Platform>(cam: &mut Camera<I, P>) -> Result<(), Error<I, P>> {
    let desc = cam.bound()?;
    match init_sequence(cam, desc) {
        Ok(()) => {
            cam.state.funmodule.insert(FunModule::INIT_OK);
            cam.state.active = true;
            log::info!("{} initialized", desc.name);
            Ok(())
        }
        Err(err) => {
            log::error!("{} initialization failed", desc.name);
            cam.state.funmodule.remove(FunModule::INIT_OK);
            let _ = desc.backend.deactivate(cam);
            Err(err)
        }
    }
}

fn init_sequence<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    desc: &'static SensorDescriptor,
) -> Result<(), Error<I, P>> {
    power(cam, desc, true)?;
    if desc.power_up_delay_ms > 0 {
        cam.platform.sleep_ms(desc.power_up_delay_ms);
    }

    // The identity check and the init table go out as one exclusive
    // section so nothing else on the bus can slip in between.
    let verify = cam.config.write_verify;
    cam.ll.with_exclusive(|ll| {
        check_identity::<I, P>(ll, desc)?;
        programmer::apply_table(ll, desc.init_table, verify)
    })?;

    let state = &mut cam.state;
    state.mode = Some(desc.init_mode);
    state.pixel_format = Some(desc.init_pixel_format);
    state.format = Some(desc.init_format());
    state.snap2preview = false;
    state.video2preview = false;
    state.carry = Default::default();
    for spec in desc.controls {
        state.controls.set(spec.id, spec.default);
    }
    if !cam.config.flash && desc.capabilities.contains(ControlId::Flash.capability()) {
        log::debug!("{}: no flash wired, withdrawing flash control", desc.name);
        state.controls.set(ControlId::Flash, FlashMode::DISABLED);
    }
    Ok(())
}

pub(crate) fn deactivate<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
) -> Result<(), Error<I, P>> {
    let desc = cam.bound()?;
    let result = power(cam, desc, false);
    cam.platform.sleep_ms(DEACTIVATE_SETTLE_MS);

    // The next open negotiates from the default size, so report that even
    // if powering down failed.
    let state = &mut cam.state;
    state.format = Some(desc.init_format());
    state.active = false;
    state.funmodule.remove(FunModule::INIT_OK);
    log::debug!("{} deactivated", desc.name);
    result
}

pub(crate) fn suspend<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
) -> Result<(), Error<I, P>> {
    let desc = cam.bound()?;
    programmer::apply(cam, desc.power_down_table)?;
    power(cam, desc, false)?;
    log::debug!("{} suspended", desc.name);
    Ok(())
}

pub(crate) fn resume<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
) -> Result<(), Error<I, P>> {
    let desc = cam.bound()?;
    power(cam, desc, true)?;
    log::debug!("{} resumed", desc.name);
    Ok(())
}
