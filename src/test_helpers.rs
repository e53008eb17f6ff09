macro_rules! merge {
    ($default:expr => $($field:ident : $value:expr),*) => {
        {
            let mut x = $default;
            $( x.$field = $value; )*

            x
        }
    }
}

macro_rules! device_descriptor {
    ($($key:ident : $value:expr),*) => {
        merge!(
            libusb1_sys::libusb_device_descriptor {
                bLength:            18,
                bDescriptorType:    0x01,
                bcdUSB:             0x0200,
                bDeviceClass:       0,
                bDeviceSubClass:    0,
                bDeviceProtocol:    0,
                bMaxPacketSize0:    8,
                idVendor:           0x0403,
                idProduct:          0x6001,
                bcdDevice:          0x0600,
                iManufacturer:      1,
                iProduct:           2,
                iSerialNumber:      3,
                bNumConfigurations: 1
            } => $($key: $value),*
        )
    }
}
