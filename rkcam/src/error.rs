//! Various error types returned by different components in this crate.

use crate::format::Format;
use crate::interface::Interface;
use crate::platform::Platform;

/// A general error type for errors from the main [`Camera`](crate::Camera)
/// type and the machinery behind it.
#[non_exhaustive]
pub enum Error<I: Interface, P: Platform> {
    /// Errors encountered when sending or receiving data over the control
    /// bus, after the transaction has already been retried.
    ///
    /// The wrapped error type for this variant is the error type for
    /// whichever [`Interface`](crate::interface::Interface) implementation
    /// you are using.
    Interface(I::Error),

    /// Errors reported by the board's [`Platform`](crate::platform::Platform)
    /// implementation while driving power, reset or flash.
    Platform(P::Error),

    /// None of the candidate sensors answered with its expected identity.
    ///
    /// During discovery this is an expected outcome on boards with no camera
    /// fitted. It is fatal only when a sensor is actually required.
    NoDeviceFound,

    /// A register table could not be written even after restarting it from
    /// the beginning the maximum number of times.
    ///
    /// The sensor may have received part of the table, so its configuration
    /// is unknown until a table is next programmed successfully.
    ProgrammingFailed,

    /// A control value, format or console command was outside what the
    /// sensor accepts. No hardware was touched.
    InvalidValue,

    /// The requested resolution is larger than any mode the sensor offers.
    ///
    /// This is not fatal: the sensor has already been programmed with its
    /// default mode, which is described by the wrapped format.
    FormatUnsupported(Format),

    /// The requested operation isn't supported by the bound sensor, or the
    /// control isn't offered by it.
    Unsupported,

    /// The operation needs a sensor which has been probed and initialized.
    NotActive,
}

impl<I: Interface, P: Platform> Error<I, P> {
    pub(crate) fn interface_result<R>(r: Result<R, I::Error>) -> Result<R, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::Interface(e)),
        }
    }

    pub(crate) fn platform_result<R>(r: Result<R, P::Error>) -> Result<R, Self> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::Platform(e)),
        }
    }

    /// Returns `true` if the error only reports a degraded result and the
    /// sensor is nonetheless in a usable state.
    pub fn is_degraded(&self) -> bool {
        match self {
            Error::FormatUnsupported(_) => true,
            _ => false,
        }
    }
}

impl<I, P> core::fmt::Debug for Error<I, P>
where
    I: Interface,
    P: Platform,
    I::Error: core::fmt::Debug,
    P::Error: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Error::Interface(err) => f.debug_tuple("Interface").field(err).finish(),
            Error::Platform(err) => f.debug_tuple("Platform").field(err).finish(),
            Error::NoDeviceFound => f.debug_tuple("NoDeviceFound").finish(),
            Error::ProgrammingFailed => f.debug_tuple("ProgrammingFailed").finish(),
            Error::InvalidValue => f.debug_tuple("InvalidValue").finish(),
            Error::FormatUnsupported(fmt) => {
                f.debug_tuple("FormatUnsupported").field(fmt).finish()
            }
            Error::Unsupported => f.debug_tuple("Unsupported").finish(),
            Error::NotActive => f.debug_tuple("NotActive").finish(),
        }
    }
}

impl<I, P> core::fmt::Display for Error<I, P>
where
    I: Interface,
    P: Platform,
    I::Error: core::fmt::Debug,
    P::Error: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Error::Interface(err) => write!(f, "bus transaction failed: {:?}", err),
            Error::Platform(err) => write!(f, "platform signal failed: {:?}", err),
            Error::NoDeviceFound => write!(f, "no supported sensor found"),
            Error::ProgrammingFailed => write!(f, "failed to program register table"),
            Error::InvalidValue => write!(f, "invalid value"),
            Error::FormatUnsupported(fmt) => write!(
                f,
                "unsupported format, using {}x{} instead",
                fmt.width, fmt.height
            ),
            Error::Unsupported => write!(f, "operation not supported by this sensor"),
            Error::NotActive => write!(f, "sensor is not active"),
        }
    }
}

// Comparisons are mainly for the benefit of tests.
impl<I, P> PartialEq for Error<I, P>
where
    I: Interface,
    P: Platform,
    I::Error: PartialEq,
    P::Error: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Interface(a), Error::Interface(b)) => a == b,
            (Error::Platform(a), Error::Platform(b)) => a == b,
            (Error::NoDeviceFound, Error::NoDeviceFound) => true,
            (Error::ProgrammingFailed, Error::ProgrammingFailed) => true,
            (Error::InvalidValue, Error::InvalidValue) => true,
            (Error::FormatUnsupported(a), Error::FormatUnsupported(b)) => a == b,
            (Error::Unsupported, Error::Unsupported) => true,
            (Error::NotActive, Error::NotActive) => true,
            _ => false,
        }
    }
}

/// Error type for [`Camera::set_controls`](crate::Camera::set_controls),
/// identifying which control in the batch failed.
///
/// Controls before `index` were applied successfully and controls after it
/// were not attempted.
pub struct BatchError<I: Interface, P: Platform> {
    pub index: usize,
    pub error: Error<I, P>,
}

impl<I, P> core::fmt::Debug for BatchError<I, P>
where
    I: Interface,
    P: Platform,
    I::Error: core::fmt::Debug,
    P::Error: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::result::Result<(), core::fmt::Error> {
        f.debug_struct("BatchError")
            .field("index", &self.index)
            .field("error", &self.error)
            .finish()
    }
}
