use std::fmt;
use std::mem;
use std::slice;

use libusb1_sys::{libusb_device, libusb_device_descriptor};

use crate::context::Context;
use crate::device::Device;
use crate::device_descriptor::{self, DeviceDescriptor};

/// A list of detected USB devices.
///
/// The list holds its own reference on every device in it until it is dropped. Devices yielded by
/// [`iter`](DeviceList::iter) take a reference of their own and may outlive the list.
pub struct DeviceList<'a> {
    context: &'a Context,
    list: *const *mut libusb_device,
    len: usize,
}

impl<'a> Drop for DeviceList<'a> {
    /// Frees the device list.
    fn drop(&mut self) {
        unsafe {
            libusb1_sys::libusb_free_device_list(self.list, 1);
        }
    }
}

impl<'a> DeviceList<'a> {
    /// Returns the number of devices in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list is empty, else returns false.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over the devices in the list.
    ///
    /// The iterator yields a `Device` for every entry, or the error met reading its descriptor.
    pub fn iter<'b>(&'b self) -> Devices<'a, 'b> {
        Devices {
            context: self.context,
            devices: self.raw_devices(),
            index: 0,
        }
    }

    pub(crate) fn raw_devices(&self) -> &[*mut libusb_device] {
        if self.list.is_null() || self.len == 0 {
            &[]
        } else {
            unsafe { slice::from_raw_parts(self.list, self.len) }
        }
    }
}

impl fmt::Debug for DeviceList<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("DeviceList").field("len", &self.len).finish()
    }
}

/// Iterator over detected USB devices.
pub struct Devices<'a, 'b> {
    context: &'a Context,
    devices: &'b [*mut libusb_device],
    index: usize,
}

impl<'a, 'b> Iterator for Devices<'a, 'b> {
    type Item = crate::Result<Device<'a>>;

    fn next(&mut self) -> Option<crate::Result<Device<'a>>> {
        let device = *self.devices.get(self.index)?;
        self.index += 1;

        // Entries stay referenced by the list, which outlives this iterator.
        Some(read_descriptor(device).map(|descriptor| unsafe {
            Device::from_libusb(self.context, device, descriptor)
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.devices.len() - self.index;
        (remaining, Some(remaining))
    }
}

/// Selects devices by vendor and product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceFilter {
    vendor_id: u16,
    product_id: u16,
}

impl DeviceFilter {
    /// Returns a filter accepting devices with exactly this vendor and product id.
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        DeviceFilter {
            vendor_id,
            product_id,
        }
    }

    /// Returns the vendor id to match.
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// Returns the product id to match.
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// Returns true if both ids of `descriptor` equal the filter's.
    pub fn matches(&self, descriptor: &DeviceDescriptor) -> bool {
        descriptor.vendor_id() == self.vendor_id && descriptor.product_id() == self.product_id
    }
}

impl fmt::Display for DeviceFilter {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

pub(crate) fn read_descriptor(device: *mut libusb_device) -> crate::Result<DeviceDescriptor> {
    let mut descriptor = mem::MaybeUninit::<libusb_device_descriptor>::uninit();

    try_unsafe!(libusb1_sys::libusb_get_device_descriptor(
        device,
        descriptor.as_mut_ptr()
    ));

    Ok(device_descriptor::from_libusb(unsafe {
        descriptor.assume_init()
    }))
}

/// Keeps the candidates whose descriptor `filter` accepts, in order.
///
/// Stops at the first descriptor that cannot be read and returns its error alone.
pub(crate) fn select<T, I, F>(
    candidates: I,
    filter: DeviceFilter,
    mut describe: F,
) -> crate::Result<Vec<(T, DeviceDescriptor)>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> crate::Result<DeviceDescriptor>,
{
    let mut found = Vec::new();

    for candidate in candidates {
        let descriptor = describe(&candidate)?;

        if filter.matches(&descriptor) {
            found.push((candidate, descriptor));
        }
    }

    Ok(found)
}

#[doc(hidden)]
pub(crate) fn from_libusb<'a>(
    context: &'a Context,
    list: *const *mut libusb_device,
    len: usize,
) -> DeviceList<'a> {
    DeviceList { context, list, len }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use libusb1_sys::constants::*;

    use super::{select, DeviceFilter};
    use crate::device_descriptor::{from_libusb, DeviceDescriptor};
    use crate::error;

    const FTDI: DeviceFilter = DeviceFilter {
        vendor_id: 0x0403,
        product_id: 0x6001,
    };

    fn descriptor(vendor_id: u16, product_id: u16) -> DeviceDescriptor {
        from_libusb(device_descriptor!(idVendor: vendor_id, idProduct: product_id))
    }

    #[test]
    fn it_matches_both_ids() {
        assert!(FTDI.matches(&descriptor(0x0403, 0x6001)));
        assert!(!FTDI.matches(&descriptor(0x0403, 0x6010)));
        assert!(!FTDI.matches(&descriptor(0x1234, 0x6001)));
        assert!(!FTDI.matches(&descriptor(0x6001, 0x0403)));
    }

    #[test]
    fn it_formats_as_hex_pair() {
        assert_eq!("0403:6001", FTDI.to_string());
        assert_eq!("0001:00ab", DeviceFilter::new(1, 0xab).to_string());
    }

    #[test]
    fn it_selects_nothing_without_matches() {
        let ids = [(0x1d6b, 0x0002), (0x046d, 0xc52b)];

        let found = select(ids, FTDI, |&(v, p)| Ok(descriptor(v, p))).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn it_selects_nothing_from_empty_list() {
        let ids: [(u16, u16); 0] = [];

        let found = select(ids, FTDI, |&(v, p)| Ok(descriptor(v, p))).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn it_keeps_matches_in_enumeration_order() {
        let ids = [(0x0403, 0x6001), (0x1d6b, 0x0002), (0x0403, 0x6001), (0x0403, 0x6014)];

        let found = select(ids.iter().enumerate(), FTDI, |&(_, &(v, p))| {
            Ok(descriptor(v, p))
        })
        .unwrap();

        let positions: Vec<usize> = found.iter().map(|((i, _), _)| *i).collect();
        assert_eq!(vec![0, 2], positions);

        for (_, descriptor) in &found {
            assert_eq!(0x0403, descriptor.vendor_id());
            assert_eq!(0x6001, descriptor.product_id());
        }
    }

    #[test]
    fn it_discards_earlier_matches_when_a_descriptor_fails() {
        let ids = [(0x0403, 0x6001), (0, 0), (0x0403, 0x6001)];
        let reads = Cell::new(0);

        let result = select(ids, FTDI, |&(v, p)| {
            reads.set(reads.get() + 1);

            if v == 0 {
                Err(error::from_libusb(LIBUSB_ERROR_IO))
            } else {
                Ok(descriptor(v, p))
            }
        });

        assert_eq!(Err(error::from_libusb(LIBUSB_ERROR_IO)), result.map(|found| found.len()));
        assert_eq!(2, reads.get());
    }

    #[test]
    fn it_selects_independently_each_time() {
        let ids = [(0x0403, 0x6001), (0x1d6b, 0x0002), (0x0403, 0x6001)];

        let first = select(ids, FTDI, |&(v, p)| Ok(descriptor(v, p))).unwrap();
        let second = select(ids, FTDI, |&(v, p)| Ok(descriptor(v, p))).unwrap();

        assert_eq!(first.len(), second.len());
        for ((_, a), (_, b)) in first.iter().zip(second.iter()) {
            assert_eq!(a.vendor_id(), b.vendor_id());
            assert_eq!(a.product_id(), b.product_id());
        }
    }
}
