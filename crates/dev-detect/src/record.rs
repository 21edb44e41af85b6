//! Raw transport-level records

use serde::{Deserialize, Serialize};

/// A USB device as read from its descriptors
///
/// Every field is optional: a device whose open or descriptor reads failed
/// is represented by the empty record (`UsbRecord::default()`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsbRecord {
    /// Bus the device is attached to
    pub bus_number: Option<u8>,
    /// Address of the device on its bus
    pub device_address: Option<u8>,
    /// Serial number string descriptor
    pub serial_number: Option<String>,
    /// Manufacturer string descriptor
    pub manufacturer: Option<String>,
    /// Product string descriptor
    pub product: Option<String>,
    /// USB Vendor ID
    pub vendor_id: Option<u16>,
    /// USB Product ID
    pub product_id: Option<u16>,
}

impl UsbRecord {
    /// Whether this is a degraded record with no information
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Information about a serial port
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialPortRecord {
    /// Transport path (e.g., /dev/ttyACM0, COM3)
    pub path: String,
    /// USB Vendor ID (if USB)
    pub vid: Option<u16>,
    /// USB Product ID (if USB)
    pub pid: Option<u16>,
    /// USB serial number (if available)
    pub serial_number: Option<String>,
    /// USB manufacturer string
    pub manufacturer: Option<String>,
    /// USB product string
    pub product: Option<String>,
}

impl SerialPortRecord {
    /// Create a record with only a transport path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}
