//! Asynchronous transport sources
//!
//! A discovery cycle awaits one USB listing and one serial listing at the
//! same time. Each source fails as a whole batch or succeeds with records.

use std::future::Future;

use crate::error::DetectError;
use crate::record::{SerialPortRecord, UsbRecord};

/// Source of USB device records
pub trait UsbSource: Send + Sync + 'static {
    /// List all attached USB devices
    fn list_usb_devices(&self) -> impl Future<Output = Result<Vec<UsbRecord>, DetectError>> + Send;
}

/// Source of serial port records
pub trait SerialSource: Send + Sync + 'static {
    /// List all OS-visible serial ports
    fn list_serial_ports(
        &self,
    ) -> impl Future<Output = Result<Vec<SerialPortRecord>, DetectError>> + Send;
}
