use std::fmt;
use std::mem;
use std::ptr::NonNull;

use libusb1_sys::{libusb_device, libusb_device_handle};
use log::{debug, trace};

use crate::conn::{self, Conn};
use crate::context::Context;
use crate::device_descriptor::DeviceDescriptor;

/// A USB device found by enumeration.
///
/// A `Device` owns one reference on the native device and releases it when dropped. Cloning takes
/// another, independent reference. The descriptor read during enumeration is kept with it.
pub struct Device<'a> {
    context: &'a Context,
    device: NonNull<libusb_device>,
    descriptor: DeviceDescriptor,
}

// libusb device objects are reference counted atomically and may be shared between threads.
unsafe impl Send for Device<'_> {}
unsafe impl Sync for Device<'_> {}

impl Drop for Device<'_> {
    /// Releases the device reference.
    fn drop(&mut self) {
        trace!("releasing reference on device {}", self);
        unsafe {
            libusb1_sys::libusb_unref_device(self.device.as_ptr());
        }
    }
}

impl Clone for Device<'_> {
    fn clone(&self) -> Self {
        unsafe { Self::from_libusb(self.context, self.device.as_ptr(), self.descriptor) }
    }
}

impl fmt::Debug for Device<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Device")
            .field("bus_number", &self.bus_number())
            .field("address", &self.address())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl fmt::Display for Device<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "Bus {:03} Device {:03} ID {:04x}:{:04x}",
            self.bus_number(),
            self.address(),
            self.descriptor.vendor_id(),
            self.descriptor.product_id()
        )
    }
}

impl<'a> Device<'a> {
    /// Takes a new reference on `device`.
    ///
    /// # Safety
    ///
    /// `device` must be a valid, non-null device of `context`.
    pub(crate) unsafe fn from_libusb(
        context: &'a Context,
        device: *mut libusb_device,
        descriptor: DeviceDescriptor,
    ) -> Device<'a> {
        let device = NonNull::new_unchecked(libusb1_sys::libusb_ref_device(device));

        trace!(
            "took reference on device {:04x}:{:04x}",
            descriptor.vendor_id(),
            descriptor.product_id()
        );

        Device {
            context,
            device,
            descriptor,
        }
    }

    /// Get the raw libusb_device pointer, for advanced use in unsafe code.
    pub fn as_raw(&self) -> *mut libusb_device {
        self.device.as_ptr()
    }

    /// Returns the context the device was found through.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// Returns the device descriptor captured when the device was found.
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Returns the device's vendor ID.
    pub fn vendor_id(&self) -> u16 {
        self.descriptor.vendor_id()
    }

    /// Returns the device's product ID.
    pub fn product_id(&self) -> u16 {
        self.descriptor.product_id()
    }

    /// Returns the number of the bus that the device is connected to.
    pub fn bus_number(&self) -> u8 {
        unsafe { libusb1_sys::libusb_get_bus_number(self.device.as_ptr()) }
    }

    /// Returns the device's address on the bus that it's connected to.
    pub fn address(&self) -> u8 {
        unsafe { libusb1_sys::libusb_get_device_address(self.device.as_ptr()) }
    }

    /// Opens the device.
    ///
    /// Each call opens a new, independent handle. On failure the device stays usable, so the
    /// call may be retried. A device that was unplugged fails with
    /// [`ErrorKind::NoDevice`](crate::ErrorKind::NoDevice).
    ///
    /// The connection borrows the device and cannot outlive it:
    ///
    /// ```compile_fail
    /// let context = usbscan::Context::new().unwrap();
    /// let conn = {
    ///     let device = context.find_devices(0x0403, 0x6001).unwrap().remove(0);
    ///     device.connect().unwrap()
    /// };
    /// ```
    pub fn connect(&self) -> crate::Result<Conn<'_>> {
        let mut handle = mem::MaybeUninit::<*mut libusb_device_handle>::uninit();

        try_unsafe!(libusb1_sys::libusb_open(
            self.device.as_ptr(),
            handle.as_mut_ptr()
        ));

        debug!("opened {}", self);

        Ok(unsafe { conn::from_libusb(self, handle.assume_init()) })
    }
}
