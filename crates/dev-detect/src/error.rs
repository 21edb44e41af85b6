//! Error types for device detection

use thiserror::Error;

/// Errors that can occur during detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// Failed to enumerate serial ports
    #[error("failed to enumerate ports: {0}")]
    EnumerationFailed(String),

    /// Failed to list attached USB devices
    #[error("Unable to get USB devices: {0}")]
    UsbEnumerationFailed(String),

    /// Failed to read a descriptor from a single USB device
    #[error("failed to read descriptors of USB device {bus}:{address}: {reason}")]
    Descriptor { bus: u8, address: u8, reason: String },

    /// Failed to open serial port
    #[error("failed to open port {port}: {reason}")]
    OpenFailed { port: String, reason: String },

    /// The serial-number facade query failed
    #[error("serial number lookup failed: {0}")]
    SerialNumberLookup(String),

    /// A blocking enumeration task panicked or was cancelled
    #[error("detection task failed: {0}")]
    TaskFailed(String),

    /// USB error
    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    /// Serial port error
    #[error("serial port error: {0}")]
    SerialPort(#[from] serialport::Error),
}

impl From<tokio::task::JoinError> for DetectError {
    fn from(e: tokio::task::JoinError) -> Self {
        DetectError::TaskFailed(e.to_string())
    }
}
