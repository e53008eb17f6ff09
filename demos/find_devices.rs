//! Print every attached device with the given ids, and its product string.
//!
//! Usage: cargo run --example find_devices [<vendor-id> <product-id>]
//!
//! Ids default to 0x0403 0x6001 (FTDI FT232R). Set `RUST_LOG=debug` to see the library's logging.

use usbscan::{Context, LogLevel, UsbOption};

fn convert_argument(input: &str) -> u16 {
    if input.starts_with("0x") {
        return u16::from_str_radix(input.trim_start_matches("0x"), 16).unwrap();
    }
    input
        .parse()
        .expect("Invalid input, be sure to add `0x` for hexadecimal values.")
}

fn main() -> usbscan::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    let (vid, pid) = match args.len() {
        1 => (0x0403, 0x6001),
        3 => (convert_argument(&args[1]), convert_argument(&args[2])),
        _ => {
            println!("usage: find_devices [<base-10/0xbase-16> <base-10/0xbase-16>]");
            return Ok(());
        }
    };

    let context = Context::with_options(&[UsbOption::log_level(LogLevel::Warning)])?;
    let devices = context.find_devices(vid, pid)?;

    if devices.is_empty() {
        println!("No {:04x}:{:04x} devices found.", vid, pid);
    }

    for device in &devices {
        match device.connect() {
            Ok(conn) => match conn.description() {
                Ok(description) => println!("{} {}", device, description),
                Err(e) => println!("{} (no description: {})", device, e),
            },
            Err(e) => println!("{} (could not open: {})", device, e),
        }
    }

    Ok(())
}
