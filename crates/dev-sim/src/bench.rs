//! Canned device sets for running without hardware

use dev_detect::usb_ids::{nordic, segger};
use dev_detect::{SerialPortRecord, UsbRecord};

/// USB devices of a small bench: a J-Link debug probe and a board in DFU
/// bootloader mode
pub fn demo_usb_devices() -> Vec<UsbRecord> {
    vec![
        UsbRecord {
            bus_number: Some(1),
            device_address: Some(4),
            serial_number: Some("000683000000".to_string()),
            manufacturer: Some("SEGGER".to_string()),
            product: Some("J-Link".to_string()),
            vendor_id: Some(segger::VID),
            product_id: Some(segger::JLINK_CDC_MSD.pid),
        },
        UsbRecord {
            bus_number: Some(1),
            device_address: Some(7),
            serial_number: Some("Nordic_Semiconductor_E1A7C7A2F1B3".to_string()),
            manufacturer: Some("Nordic Semiconductor".to_string()),
            product: Some("Open DFU Bootloader".to_string()),
            vendor_id: Some(nordic::VID),
            product_id: Some(nordic::OPEN_DFU_BOOTLOADER.pid),
        },
    ]
}

/// Serial ports of the same bench
pub fn demo_serial_ports() -> Vec<SerialPortRecord> {
    vec![SerialPortRecord {
        path: "/dev/ttyACM0".to_string(),
        vid: Some(segger::VID),
        pid: Some(segger::JLINK_CDC_MSD.pid),
        serial_number: Some("000683000000".to_string()),
        manufacturer: Some("SEGGER".to_string()),
        product: Some("J-Link".to_string()),
    }]
}
