//! Board-level settings for a [`Camera`](crate::Camera).

/// Settings that depend on how the sensor is wired up and how cautious the
/// caller wants the driver to be, rather than on the sensor model.
///
/// This behaves as a "builder" type, with methods that return a modified
/// copy. The default value matches the most common board layout: a flash
/// LED is present and register writes are not read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) write_verify: bool,
    pub(crate) flash: bool,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            write_verify: false,
            flash: true,
        }
    }

    /// Read back every register after writing it and log any mismatch.
    ///
    /// This roughly doubles bus traffic and is intended only for bring-up
    /// of a new board or sensor revision.
    pub const fn with_write_verify(self, v: bool) -> Self {
        Self {
            write_verify: v,
            ..self
        }
    }

    /// Whether the board has a flash LED wired to the platform. When it
    /// doesn't, the flash control is withdrawn even for sensors that would
    /// otherwise offer it.
    pub const fn with_flash(self, v: bool) -> Self {
        Self { flash: v, ..self }
    }

    pub const fn write_verify(&self) -> bool {
        self.write_verify
    }

    pub const fn flash(&self) -> bool {
        self.flash
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
