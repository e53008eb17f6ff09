use std::mem;
use std::ptr::NonNull;

use libc::c_int;
use libusb1_sys::{constants::*, libusb_context, libusb_device};
use log::debug;

use crate::device::Device;
use crate::device_list::{self, DeviceFilter, DeviceList};
use crate::error;
use crate::options::UsbOption;
use crate::version;

/// Library logging levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// No messages are printed by `libusb` (default).
    None = LIBUSB_LOG_LEVEL_NONE as isize,

    /// Error messages printed to `stderr`.
    Error = LIBUSB_LOG_LEVEL_ERROR as isize,

    /// Warning and error messages are printed to `stderr`.
    Warning = LIBUSB_LOG_LEVEL_WARNING as isize,

    /// Informational messages are printed to `stdout`. Warnings and error messages are printed to
    /// `stderr`.
    Info = LIBUSB_LOG_LEVEL_INFO as isize,

    /// Debug and informational messages are printed to `stdout`. Warnings and error messages are
    /// printed to `stderr`.
    Debug = LIBUSB_LOG_LEVEL_DEBUG as isize,
}

/// A `libusb` context.
///
/// Every [`Device`] found through a context borrows it, so the context always outlives the
/// devices and connections made from it:
///
/// ```compile_fail
/// let devices = {
///     let context = usbscan::Context::new().unwrap();
///     context.find_devices(0x0403, 0x6001).unwrap()
/// };
/// ```
pub struct Context {
    context: NonNull<libusb_context>,
}

// libusb contexts may be used from any thread.
unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl Drop for Context {
    /// Closes the `libusb` context.
    fn drop(&mut self) {
        debug!("closing libusb context");
        unsafe { libusb1_sys::libusb_exit(self.context.as_ptr()) };
    }
}

impl Context {
    /// Opens a new `libusb` context.
    ///
    /// Nothing else in this crate works without a context, but failing to create one is still an
    /// ordinary error; the caller decides whether it is fatal.
    pub fn new() -> crate::Result<Self> {
        let mut context = mem::MaybeUninit::<*mut libusb_context>::uninit();

        try_unsafe!(libusb1_sys::libusb_init(context.as_mut_ptr()));

        let context = match NonNull::new(unsafe { context.assume_init() }) {
            Some(context) => context,
            None => return Err(error::from_libusb(LIBUSB_ERROR_OTHER)),
        };

        debug!("opened libusb {} context", version::version());

        Ok(Context { context })
    }

    /// Opens a new `libusb` context and applies `options` to it, in order.
    pub fn with_options(options: &[UsbOption]) -> crate::Result<Self> {
        let context = Self::new()?;

        for option in options {
            option.apply(context.as_raw())?;
        }

        Ok(context)
    }

    /// Closes the context.
    ///
    /// Equivalent to dropping it. The borrow checker guarantees no device or connection made from
    /// the context is still alive.
    pub fn shutdown(self) {
        drop(self);
    }

    /// Get the raw libusb_context pointer, for advanced use in unsafe code.
    pub fn as_raw(&self) -> *mut libusb_context {
        self.context.as_ptr()
    }

    /// Sets the log level of a `libusb` context.
    pub fn set_log_level(&self, level: LogLevel) -> crate::Result<()> {
        UsbOption::log_level(level).apply(self.as_raw())
    }

    /// Returns a snapshot of the USB devices currently attached.
    ///
    /// Devices attached or removed after the call are not reflected in the list.
    pub fn devices(&self) -> crate::Result<DeviceList<'_>> {
        let mut list = mem::MaybeUninit::<*const *mut libusb_device>::uninit();

        let n = unsafe { libusb1_sys::libusb_get_device_list(self.as_raw(), list.as_mut_ptr()) };

        if n < 0 {
            Err(error::from_libusb(n as c_int))
        } else {
            Ok(device_list::from_libusb(self, unsafe { list.assume_init() }, n as usize))
        }
    }

    /// Returns the attached devices accepted by `filter`, in enumeration order.
    ///
    /// Either every match is returned or none is: if any device descriptor cannot be read, the
    /// whole call fails with that error and the matches seen before it are discarded.
    pub fn find(&self, filter: DeviceFilter) -> crate::Result<Vec<Device<'_>>> {
        let list = self.devices()?;

        let found = device_list::select(list.raw_devices().iter().copied(), filter, |raw| {
            device_list::read_descriptor(*raw)
        })?;

        debug!("{} of {} devices match {}", found.len(), list.len(), filter);

        // The list still holds its own references here, so every pointer is live.
        Ok(found
            .into_iter()
            .map(|(raw, descriptor)| unsafe { Device::from_libusb(self, raw, descriptor) })
            .collect())
    }

    /// Returns the attached devices with the given vendor and product id, in enumeration order.
    ///
    /// An empty vector means no such device is attached.
    pub fn find_devices(&self, vendor_id: u16, product_id: u16) -> crate::Result<Vec<Device<'_>>> {
        self.find(DeviceFilter::new(vendor_id, product_id))
    }
}
