//! Writes whole register tables to the sensor.

use crate::error::Error;
use crate::interface::Interface;
use crate::low_level::LowLevel;
use crate::platform::Platform;
use crate::registers::RegOp;
use crate::Camera;

/// Maximum number of passes over a table. A pass that fails part way is
/// abandoned and the table is rewritten from its first entry, because the
/// sensor may latch partially-written settings in unpredictable ways.
pub const ATTEMPTS: u32 = 3;

/// Writes the given table to the bound sensor, honoring the camera's
/// read-back verification setting.
pub(crate) fn apply<I: Interface, P: Platform>(
    cam: &mut Camera<I, P>,
    table: &[RegOp],
) -> Result<(), Error<I, P>> {
    let verify = cam.config.write_verify;
    apply_table(&mut cam.ll, table, verify)
}

/// Writes every entry of the table in order, inside a single exclusive
/// section of the bus.
///
/// Each register write is itself retried by [`LowLevel`]. If one still
/// fails, the whole table is started again from the beginning, up to
/// [`ATTEMPTS`] passes in total. After that the result is
/// [`Error::ProgrammingFailed`] and nothing more is written, leaving the
/// sensor holding whatever part of the table it received.
///
/// With `verify` set, each register is read back after it is written and any
/// mismatch is logged. Mismatches and failed read-backs never fail the
/// table: some registers legitimately read back differently from what was
/// written.
pub fn apply_table<I: Interface, P: Platform>(
    ll: &mut LowLevel<I>,
    table: &[RegOp],
    verify: bool,
) -> Result<(), Error<I, P>> {
    if table.is_empty() {
        return Ok(());
    }

    ll.with_exclusive(|ll| {
        let mut attempt = 1;
        let mut i = 0;
        while i < table.len() {
            let op = table[i];
            match ll.wr8(op.reg, op.val) {
                Ok(()) => {
                    if verify {
                        verify_op(ll, op);
                    }
                    i += 1;
                }
                Err(_) => {
                    if attempt >= ATTEMPTS {
                        log::error!(
                            "table write failed at entry {} ({:#06x}) after {} attempts",
                            i,
                            op.reg,
                            attempt
                        );
                        return Err(Error::ProgrammingFailed);
                    }
                    log::warn!(
                        "table write failed at entry {} ({:#06x}), restarting table",
                        i,
                        op.reg
                    );
                    attempt += 1;
                    i = 0;
                }
            }
        }
        Ok(())
    })
}

fn verify_op<I: Interface>(ll: &mut LowLevel<I>, op: RegOp) {
    match ll.rd8(op.reg) {
        Ok(got) if got == op.val => {}
        Ok(got) => log::warn!(
            "register {:#06x} reads back {:#04x}, wrote {:#04x}",
            op.reg,
            got,
            op.val
        ),
        Err(_) => log::warn!("register {:#06x} could not be read back", op.reg),
    }
}
