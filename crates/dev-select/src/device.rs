//! The device entity handed to the rest of the application

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which transport a device was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Usb,
    Serial,
}

impl DeviceKind {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Usb => "USB",
            Self::Serial => "Serial",
        }
    }
}

/// Transport-specific location of a device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeviceTransport {
    /// Device found by USB descriptor listing
    ///
    /// Bus and address are absent when the device could not be read.
    Usb {
        bus_number: Option<u8>,
        device_address: Option<u8>,
    },
    /// Device found by serial port listing
    Serial {
        /// Transport path used to open a connection
        com_name: String,
    },
}

/// A discovered device
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    #[serde(flatten)]
    pub transport: DeviceTransport,
    /// Canonical serial number, the identity key used for selection
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl Device {
    /// Create a USB device with only its bus location
    pub fn usb(bus_number: u8, device_address: u8) -> Self {
        Self::with_transport(DeviceTransport::Usb {
            bus_number: Some(bus_number),
            device_address: Some(device_address),
        })
    }

    /// Create a serial device with only its transport path
    pub fn serial(com_name: impl Into<String>) -> Self {
        Self::with_transport(DeviceTransport::Serial {
            com_name: com_name.into(),
        })
    }

    fn with_transport(transport: DeviceTransport) -> Self {
        Self {
            transport,
            serial_number: None,
            manufacturer: None,
            product: None,
            vendor_id: None,
            product_id: None,
        }
    }

    /// Set the serial number (builder style, no canonicalization)
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    pub fn kind(&self) -> DeviceKind {
        match self.transport {
            DeviceTransport::Usb { .. } => DeviceKind::Usb,
            DeviceTransport::Serial { .. } => DeviceKind::Serial,
        }
    }

    pub fn is_serial(&self) -> bool {
        self.kind() == DeviceKind::Serial
    }

    /// Transport path, for serial devices
    pub fn com_name(&self) -> Option<&str> {
        match &self.transport {
            DeviceTransport::Serial { com_name } => Some(com_name),
            DeviceTransport::Usb { .. } => None,
        }
    }

    /// Bus number, for USB devices that could be read
    pub fn bus_number(&self) -> Option<u8> {
        match self.transport {
            DeviceTransport::Usb { bus_number, .. } => bus_number,
            DeviceTransport::Serial { .. } => None,
        }
    }

    /// Device address, for USB devices that could be read
    pub fn device_address(&self) -> Option<u8> {
        match self.transport {
            DeviceTransport::Usb { device_address, .. } => device_address,
            DeviceTransport::Serial { .. } => None,
        }
    }

    /// Whether the device has a usable (non-empty) serial number
    pub fn has_serial_number(&self) -> bool {
        self.serial_number.as_deref().is_some_and(|s| !s.is_empty())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(serial_number) = self.serial_number.as_deref().filter(|s| !s.is_empty()) {
            return write!(f, "{}", serial_number);
        }
        match &self.transport {
            DeviceTransport::Serial { com_name } => write!(f, "{}", com_name),
            DeviceTransport::Usb {
                bus_number: Some(bus),
                device_address: Some(address),
            } => write!(f, "USB {}:{}", bus, address),
            DeviceTransport::Usb { .. } => write!(f, "Unknown USB device"),
        }
    }
}
