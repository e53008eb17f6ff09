use std::fmt;

use libusb1_sys::libusb_device_descriptor;

/// A device's identifying fields, as read from its device descriptor during enumeration.
///
/// This is a snapshot: it is never re-read, so it does not follow a device that is reconfigured
/// after it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceDescriptor {
    usb_version: u16,
    device_version: u16,
    class_code: u8,
    sub_class_code: u8,
    protocol_code: u8,
    max_packet_size: u8,
    vendor_id: u16,
    product_id: u16,
    manufacturer_index: u8,
    product_index: u8,
    serial_number_index: u8,
}

impl DeviceDescriptor {
    /// Returns the device's maximum supported USB version.
    pub fn usb_version(&self) -> Version {
        Version::from_bcd(self.usb_version)
    }

    /// Returns the manufacturer's version of the device.
    pub fn device_version(&self) -> Version {
        Version::from_bcd(self.device_version)
    }

    /// Returns the index of the string descriptor that contains the manufacturer name.
    pub fn manufacturer_string_index(&self) -> Option<u8> {
        string_index(self.manufacturer_index)
    }

    /// Returns the index of the string descriptor that contains the product name.
    pub fn product_string_index(&self) -> Option<u8> {
        string_index(self.product_index)
    }

    /// Returns the index of the string descriptor that contains the device's serial number.
    pub fn serial_number_string_index(&self) -> Option<u8> {
        string_index(self.serial_number_index)
    }

    /// Returns the device's class code.
    pub fn class_code(&self) -> u8 {
        self.class_code
    }

    /// Returns the device's sub class code.
    pub fn sub_class_code(&self) -> u8 {
        self.sub_class_code
    }

    /// Returns the device's protocol code.
    pub fn protocol_code(&self) -> u8 {
        self.protocol_code
    }

    /// Returns the device's vendor ID.
    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    /// Returns the device's product ID.
    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    /// Returns the maximum packet size of the device's first endpoint.
    pub fn max_packet_size(&self) -> u8 {
        self.max_packet_size
    }

    // Index 0 means "no string"; libusb rejects it on read.
    pub(crate) fn raw_product_index(&self) -> u8 {
        self.product_index
    }
}

fn string_index(index: u8) -> Option<u8> {
    match index {
        0 => None,
        n => Some(n),
    }
}

/// A version number taken from a binary coded decimal (BCD) descriptor field, such as `bcdUSB`
/// or `bcdDevice`. `0x0210` is version 2.1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(pub u8, pub u8, pub u8);

impl Version {
    /// Extracts a version from a BCD field encoded as `0xJJMN`: `JJ` is the major version, `M`
    /// the minor version and `N` the sub minor version.
    pub fn from_bcd(mut raw: u16) -> Self {
        let sub_minor = (raw & 0x000F) as u8;
        raw >>= 4;

        let minor = (raw & 0x000F) as u8;
        raw >>= 4;

        let mut major = (raw & 0x000F) as u8;
        raw >>= 4;

        major += (10 * raw) as u8;

        Version(major, minor, sub_minor)
    }

    /// Returns the major version.
    pub fn major(&self) -> u8 {
        self.0
    }

    /// Returns the minor version.
    pub fn minor(&self) -> u8 {
        self.1
    }

    /// Returns the sub minor version.
    pub fn sub_minor(&self) -> u8 {
        self.2
    }
}

impl fmt::Display for Version {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}.{}.{}", self.0, self.1, self.2)
    }
}

#[doc(hidden)]
pub(crate) fn from_libusb(device: libusb_device_descriptor) -> DeviceDescriptor {
    DeviceDescriptor {
        usb_version: device.bcdUSB,
        device_version: device.bcdDevice,
        class_code: device.bDeviceClass,
        sub_class_code: device.bDeviceSubClass,
        protocol_code: device.bDeviceProtocol,
        max_packet_size: device.bMaxPacketSize0,
        vendor_id: device.idVendor,
        product_id: device.idProduct,
        manufacturer_index: device.iManufacturer,
        product_index: device.iProduct,
        serial_number_index: device.iSerialNumber,
    }
}
