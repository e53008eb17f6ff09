use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use libc::c_int;
use libusb1_sys::libusb_device_handle;
use log::debug;

use crate::device::Device;
use crate::error::{self, Error};

/// Capacity of the buffer string descriptors are read into. Longer strings are cut to this
/// length without error.
pub const STRING_BUFFER_LEN: usize = 256;

/// An open connection to a [`Device`].
///
/// The connection borrows the device it was opened from. It is closed by [`close`](Conn::close)
/// or, failing that, when dropped.
pub struct Conn<'a> {
    device: &'a Device<'a>,
    handle: Option<NonNull<libusb_device_handle>>,
    // Operations on one handle are not reentrant.
    _not_sync: PhantomData<Cell<()>>,
}

unsafe impl Send for Conn<'_> {}

impl Drop for Conn<'_> {
    /// Closes the device.
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Conn<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Conn")
            .field("device", &self.device)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<'a> Conn<'a> {
    /// Get the raw libusb_device_handle pointer, for advanced use in unsafe code.
    ///
    /// Returns `None` once the connection is closed.
    pub fn as_raw(&self) -> Option<*mut libusb_device_handle> {
        self.handle.map(NonNull::as_ptr)
    }

    /// Returns the device this connection was opened from.
    pub fn device(&self) -> &'a Device<'a> {
        self.device
    }

    /// Returns true once the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Closes the connection. Closing an already closed connection does nothing.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("closing {}", self.device);
            unsafe { libusb1_sys::libusb_close(handle.as_ptr()) };
        }
    }

    /// Reads the device's product string.
    ///
    /// Uses the product string index captured when the device was found. The string is read as
    /// ASCII and cut at [`STRING_BUFFER_LEN`] bytes.
    pub fn description(&self) -> crate::Result<String> {
        self.read_string_ascii(self.device.descriptor().raw_product_index())
    }

    /// Reads the device's manufacturer string.
    pub fn manufacturer(&self) -> crate::Result<String> {
        let index = self.device.descriptor().manufacturer_string_index();
        self.read_string_ascii(index.unwrap_or(0))
    }

    /// Reads the device's serial number string.
    pub fn serial_number(&self) -> crate::Result<String> {
        let index = self.device.descriptor().serial_number_string_index();
        self.read_string_ascii(index.unwrap_or(0))
    }

    /// Reads the string descriptor at `index` as ASCII, in the device's first language.
    ///
    /// The result ends at the first NUL byte, or holds all [`STRING_BUFFER_LEN`] bytes if there is
    /// none. `libusb` rejects index 0 with `LIBUSB_ERROR_INVALID_PARAM`.
    pub fn read_string_ascii(&self, index: u8) -> crate::Result<String> {
        let handle = self.handle.ok_or(Error::Closed)?;
        let mut buf = [0u8; STRING_BUFFER_LEN];

        let len = unsafe {
            libusb1_sys::libusb_get_string_descriptor_ascii(
                handle.as_ptr(),
                index,
                buf.as_mut_ptr(),
                buf.len() as c_int,
            )
        };

        if len < 0 {
            return Err(error::from_libusb(len));
        }

        Ok(until_nul(&buf))
    }
}

fn until_nul(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// # Safety
///
/// `handle` must be a valid handle opened on `device`.
#[doc(hidden)]
pub(crate) unsafe fn from_libusb<'a>(
    device: &'a Device<'a>,
    handle: *mut libusb_device_handle,
) -> Conn<'a> {
    Conn {
        device,
        handle: NonNull::new(handle),
        _not_sync: PhantomData,
    }
}

#[cfg(test)]
mod test {
    use super::{until_nul, STRING_BUFFER_LEN};

    #[test]
    fn it_stops_at_first_nul() {
        let mut buf = [0u8; STRING_BUFFER_LEN];
        buf[..10].copy_from_slice(b"FT232R USB");
        buf[11..16].copy_from_slice(b"UART\0");

        assert_eq!("FT232R USB", until_nul(&buf));
    }

    #[test]
    fn it_returns_empty_string_for_leading_nul() {
        assert_eq!("", until_nul(&[0u8; STRING_BUFFER_LEN]));
    }

    #[test]
    fn it_keeps_full_buffer_without_nul() {
        let buf = [b'x'; STRING_BUFFER_LEN];

        let s = until_nul(&buf);

        assert_eq!(STRING_BUFFER_LEN, s.len());
        assert!(s.bytes().all(|b| b == b'x'));
    }

    #[test]
    fn it_keeps_last_byte_before_terminator() {
        let mut buf = [b'y'; STRING_BUFFER_LEN];
        buf[STRING_BUFFER_LEN - 1] = 0;

        assert_eq!(STRING_BUFFER_LEN - 1, until_nul(&buf).len());
    }
}
