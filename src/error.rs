use std::ffi::CStr;
use std::fmt;
use std::result;

use libc::c_int;
use libusb1_sys::constants::*;

/// A result of a function that may return an `Error`.
pub type Result<T> = result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A call into `libusb` failed.
    #[error(transparent)]
    Usb(#[from] UsbError),

    /// The connection was already closed.
    #[error("connection is closed")]
    Closed,
}

impl Error {
    /// Returns the native error, if this error came from `libusb`.
    pub fn usb(&self) -> Option<UsbError> {
        match *self {
            Error::Usb(e) => Some(e),
            Error::Closed => None,
        }
    }
}

/// A native `libusb` error code.
///
/// The code is kept verbatim. Its textual form is the name `libusb` itself gives the code,
/// e.g. `LIBUSB_ERROR_ACCESS`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbError {
    code: c_int,
}

impl UsbError {
    /// Returns the native error code. Always negative for errors reported by `libusb`.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the canonical `libusb` name of the error code.
    pub fn name(&self) -> &'static str {
        let name = unsafe { libusb1_sys::libusb_error_name(self.code) };

        if name.is_null() {
            return "**UNKNOWN**";
        }

        unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("**UNKNOWN**")
    }

    /// Classifies the error code.
    pub fn kind(&self) -> ErrorKind {
        match self.code {
            LIBUSB_ERROR_IO => ErrorKind::Io,
            LIBUSB_ERROR_INVALID_PARAM => ErrorKind::InvalidParam,
            LIBUSB_ERROR_ACCESS => ErrorKind::Access,
            LIBUSB_ERROR_NO_DEVICE => ErrorKind::NoDevice,
            LIBUSB_ERROR_NOT_FOUND => ErrorKind::NotFound,
            LIBUSB_ERROR_BUSY => ErrorKind::Busy,
            LIBUSB_ERROR_TIMEOUT => ErrorKind::Timeout,
            LIBUSB_ERROR_OVERFLOW => ErrorKind::Overflow,
            LIBUSB_ERROR_PIPE => ErrorKind::Pipe,
            LIBUSB_ERROR_INTERRUPTED => ErrorKind::Interrupted,
            LIBUSB_ERROR_NO_MEM => ErrorKind::NoMem,
            LIBUSB_ERROR_NOT_SUPPORTED => ErrorKind::NotSupported,
            _ => ErrorKind::Other,
        }
    }
}

impl fmt::Display for UsbError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        fmt.write_str(self.name())
    }
}

impl fmt::Debug for UsbError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        write!(fmt, "UsbError({}, {})", self.code, self.name())
    }
}

impl std::error::Error for UsbError {}

/// Kinds of errors reported by the `libusb` library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input/output error.
    Io,

    /// Invalid parameter.
    InvalidParam,

    /// Access denied (insufficient permissions).
    Access,

    /// No such device (it may have been disconnected).
    NoDevice,

    /// Entity not found.
    NotFound,

    /// Resource busy.
    Busy,

    /// Operation timed out.
    Timeout,

    /// Overflow.
    Overflow,

    /// Pipe error.
    Pipe,

    /// System call interrupted (perhaps due to signal).
    Interrupted,

    /// Insufficient memory.
    NoMem,

    /// Operation not supported or unimplemented on this platform.
    NotSupported,

    /// Other error.
    Other,
}

pub(crate) fn from_libusb(err: c_int) -> Error {
    Error::Usb(UsbError { code: err })
}

#[doc(hidden)]
macro_rules! try_unsafe {
    ($x:expr) => {
        match unsafe { $x } {
            0 => (),
            err => return Err($crate::error::from_libusb(err)),
        }
    };
}

#[cfg(test)]
mod test {
    use super::{from_libusb, Error, ErrorKind, UsbError};
    use libusb1_sys::constants::*;

    fn usb(code: i32) -> UsbError {
        from_libusb(code).usb().unwrap()
    }

    #[test]
    fn it_keeps_native_code() {
        assert_eq!(LIBUSB_ERROR_BUSY, usb(LIBUSB_ERROR_BUSY).code());
        assert_eq!(-1234, usb(-1234).code());
    }

    #[test]
    fn it_displays_libusb_error_names() {
        assert_eq!("LIBUSB_ERROR_NO_DEVICE", usb(LIBUSB_ERROR_NO_DEVICE).to_string());
        assert_eq!("LIBUSB_ERROR_ACCESS", usb(LIBUSB_ERROR_ACCESS).to_string());
        assert_eq!("LIBUSB_ERROR_IO", usb(LIBUSB_ERROR_IO).to_string());
    }

    #[test]
    fn it_displays_usb_errors_transparently() {
        assert_eq!("LIBUSB_ERROR_TIMEOUT", from_libusb(LIBUSB_ERROR_TIMEOUT).to_string());
        assert_eq!("connection is closed", Error::Closed.to_string());
    }

    #[test]
    fn it_classifies_codes() {
        assert_eq!(ErrorKind::Io, usb(LIBUSB_ERROR_IO).kind());
        assert_eq!(ErrorKind::InvalidParam, usb(LIBUSB_ERROR_INVALID_PARAM).kind());
        assert_eq!(ErrorKind::Access, usb(LIBUSB_ERROR_ACCESS).kind());
        assert_eq!(ErrorKind::NoDevice, usb(LIBUSB_ERROR_NO_DEVICE).kind());
        assert_eq!(ErrorKind::NotFound, usb(LIBUSB_ERROR_NOT_FOUND).kind());
        assert_eq!(ErrorKind::Busy, usb(LIBUSB_ERROR_BUSY).kind());
        assert_eq!(ErrorKind::Timeout, usb(LIBUSB_ERROR_TIMEOUT).kind());
        assert_eq!(ErrorKind::Overflow, usb(LIBUSB_ERROR_OVERFLOW).kind());
        assert_eq!(ErrorKind::Pipe, usb(LIBUSB_ERROR_PIPE).kind());
        assert_eq!(ErrorKind::Interrupted, usb(LIBUSB_ERROR_INTERRUPTED).kind());
        assert_eq!(ErrorKind::NoMem, usb(LIBUSB_ERROR_NO_MEM).kind());
        assert_eq!(ErrorKind::NotSupported, usb(LIBUSB_ERROR_NOT_SUPPORTED).kind());
        assert_eq!(ErrorKind::Other, usb(LIBUSB_ERROR_OTHER).kind());
        assert_eq!(ErrorKind::Other, usb(-1234).kind());
    }

    #[test]
    fn it_has_no_native_error_when_closed() {
        assert_eq!(None, Error::Closed.usb());
    }
}
