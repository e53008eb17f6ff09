use libc::c_int;
use libusb1_sys::{constants::*, libusb_context, libusb_set_option};

use crate::context::LogLevel;
use crate::error;

/// A `libusb` runtime option that can be enabled for a context.
///
/// Options are applied in order by [`Context::with_options`](crate::Context::with_options).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbOption {
    inner: OptionInner,
}

impl UsbOption {
    /// Sets the verbosity of the messages `libusb` itself prints to `stderr`.
    pub fn log_level(level: LogLevel) -> Self {
        Self {
            inner: OptionInner::LogLevel(level),
        }
    }

    /// Use the [UsbDk] backend if available.
    ///
    /// **Note**: This method is available on **Windows** only!
    ///
    /// [UsbDk]: https://github.com/daynix/UsbDk
    #[cfg(windows)]
    pub fn use_usbdk() -> Self {
        Self {
            inner: OptionInner::UseUsbdk,
        }
    }

    pub(crate) fn apply(&self, ctx: *mut libusb_context) -> crate::Result<()> {
        let err = match self.inner {
            OptionInner::LogLevel(level) => unsafe {
                libusb_set_option(ctx, LIBUSB_OPTION_LOG_LEVEL, level as c_int)
            },
            OptionInner::UseUsbdk => unsafe { libusb_set_option(ctx, LIBUSB_OPTION_USE_USBDK) },
        };

        if err == LIBUSB_SUCCESS {
            Ok(())
        } else {
            Err(error::from_libusb(err))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionInner {
    LogLevel(LogLevel),
    #[cfg_attr(not(windows), allow(dead_code))] // only constructed on Windows
    UseUsbdk,
}
