//! Find USB devices by vendor and product id, open them, and read their string descriptors.
//!
//! This crate is a thin, safe layer over the native `libusb` library. It only discovers devices
//! and manages their native references and handles; transfers, configuration and interface
//! claiming are left to `libusb` itself.
//!
//! ```no_run
//! let context = usbscan::Context::new()?;
//!
//! for device in context.find_devices(0x0403, 0x6001)? {
//!     let conn = device.connect()?;
//!     println!("{}: {}", device, conn.description()?);
//! }
//! # Ok::<(), usbscan::Error>(())
//! ```
//!
//! Native resources are released deterministically: a [`Device`] gives back its reference when
//! dropped, a [`Conn`] closes its handle when closed or dropped, and a [`Context`] shuts `libusb`
//! down when dropped. Lifetimes tie each of them to the object it came from.

pub use libusb1_sys::constants;

pub use crate::error::{Error, ErrorKind, Result, UsbError};
pub use crate::version::{version, LibraryVersion};

pub use crate::context::{Context, LogLevel};
pub use crate::options::UsbOption;

pub use crate::conn::{Conn, STRING_BUFFER_LEN};
pub use crate::device::Device;
pub use crate::device_descriptor::{DeviceDescriptor, Version};
pub use crate::device_list::{DeviceFilter, DeviceList, Devices};

#[cfg(test)]
#[macro_use]
mod test_helpers;

#[macro_use]
mod error;
mod options;
mod version;

mod conn;
mod context;
mod device;
mod device_descriptor;
mod device_list;
