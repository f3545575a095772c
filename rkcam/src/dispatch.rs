//! Finding out which sensor is fitted.

use crate::descriptor::SensorDescriptor;
use crate::error::Error;
use crate::interface::Interface;
use crate::models::Operations;
use crate::platform::Platform;
use crate::state::SensorState;
use crate::Camera;

/// Tries each candidate in turn and binds the first whose identity
/// registers hold the expected value. No candidate after the matching one
/// is tried.
///
/// Each candidate's own probe leaves the sensor powered down if it doesn't
/// match, so a failed candidate leaves nothing behind for the next.
pub(crate) fn probe<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    candidates: &[&'static SensorDescriptor],
) -> Result<&'static SensorDescriptor, Error<I, P>> {
    for desc in candidates.iter().copied() {
        cam.ll.set_address(desc.bus_address);
        cam.descriptor = Some(desc);
        cam.state = SensorState::default();

        match desc.backend.video_probe(cam) {
            Ok(()) => {
                log::info!("found {} at {:#04x}", desc.name, desc.bus_address);
                return Ok(desc);
            }
            Err(err) => {
                log::debug!(
                    "{} not found at {:#04x}: {}",
                    desc.name,
                    desc.bus_address,
                    match err {
                        Error::NoDeviceFound => "identity mismatch",
                        _ => "no response",
                    }
                );
            }
        }
    }

    cam.descriptor = None;
    log::info!("no supported sensor found");
    Err(Error::NoDeviceFound)
}
