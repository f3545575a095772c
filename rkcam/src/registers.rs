//! Register write sequences as they are stored in the sensor tables.

/// A single register write: a 16-bit register address and the 8-bit value
/// to store there.
///
/// Sequences of these are always carried as length-bounded slices. Register
/// zero is a real register on some of the supported chips, so there is no
/// terminator entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct RegOp {
    pub reg: u16,
    pub val: u8,
}

impl RegOp {
    pub const fn new(reg: u16, val: u8) -> Self {
        Self { reg: reg, val: val }
    }

    /// Build the three bytes that make up a write transaction for this
    /// operation: the register address, most significant byte first,
    /// followed by the value.
    pub fn build_write_message(self, into: &mut [u8; 3]) {
        into[0] = (self.reg >> 8) as u8;
        into[1] = self.reg as u8;
        into[2] = self.val;
    }
}

/// An ordered, statically-allocated sequence of register writes which
/// together make up one configuration step, such as switching the output
/// window or selecting a white balance preset.
pub type RegisterTable = &'static [RegOp];

/// A table with no writes in it.
///
/// Some chips declare a mode or control but have nothing to program for it.
/// Those use this placeholder so that the entry remains present but inert.
pub const EMPTY: RegisterTable = &[];

/// Splits a 16-bit register address into the two bytes that precede a read
/// on the bus.
pub fn build_read_header(reg: u16, into: &mut [u8; 2]) {
    into[0] = (reg >> 8) as u8;
    into[1] = reg as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_message() {
        let mut got = [0u8; 3];
        RegOp::new(0x3021, 0x62).build_write_message(&mut got);
        assert_eq!(got, [0x30, 0x21, 0x62]);
    }

    #[test]
    fn test_read_header() {
        let mut got = [0u8; 2];
        build_read_header(0x0101, &mut got);
        assert_eq!(got, [0x01, 0x01]);
    }

    #[test]
    fn test_macro_table() {
        let table: RegisterTable = rkcam_macros::register_table!("gt2005/flip_on.regs");
        assert!(!table.is_empty());
        assert_eq!(table[0].reg, 0x0101);
    }
}
