//! Conversion of transport records into devices

use dev_detect::{SerialPortRecord, UsbRecord};

use crate::device::{Device, DeviceTransport};

/// Canonical form of a reported serial number
///
/// Some devices prefix the serial number with vendor-specific segments
/// separated by underscores (`SEGGER_J-Link_000683000000`); only the last
/// segment identifies the device.
pub fn canonical_serial_number(raw: &str) -> &str {
    raw.rsplit('_').next().unwrap_or(raw)
}

fn canonical(serial_number: Option<String>) -> Option<String> {
    serial_number.map(|s| canonical_serial_number(&s).to_string())
}

impl From<UsbRecord> for Device {
    fn from(record: UsbRecord) -> Self {
        Self {
            transport: DeviceTransport::Usb {
                bus_number: record.bus_number,
                device_address: record.device_address,
            },
            serial_number: canonical(record.serial_number),
            manufacturer: record.manufacturer,
            product: record.product,
            vendor_id: record.vendor_id,
            product_id: record.product_id,
        }
    }
}

impl From<SerialPortRecord> for Device {
    fn from(record: SerialPortRecord) -> Self {
        Self {
            transport: DeviceTransport::Serial {
                com_name: record.path,
            },
            serial_number: canonical(record.serial_number),
            manufacturer: record.manufacturer,
            product: record.product,
            vendor_id: record.vid,
            product_id: record.pid,
        }
    }
}

/// Merge both listings into one device list
///
/// USB devices come first, then serial devices, each in enumeration order.
/// A physical device seen on both transports appears twice.
pub fn merge_devices(usb: Vec<UsbRecord>, serial: Vec<SerialPortRecord>) -> Vec<Device> {
    usb.into_iter()
        .map(Device::from)
        .chain(serial.into_iter().map(Device::from))
        .collect()
}
