//! Serial port scanner
//!
//! This module provides serial port enumeration.

use serialport::{available_ports, SerialPortType};
use tracing::info;

use crate::error::DetectError;
use crate::record::SerialPortRecord;
use crate::source::SerialSource;
use crate::usb_ids;

impl SerialPortRecord {
    /// Create from serialport crate's port info
    fn from_serialport(name: String, port_type: &SerialPortType) -> Self {
        match port_type {
            SerialPortType::UsbPort(usb) => Self {
                path: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                serial_number: usb.serial_number.clone(),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
            },
            _ => Self::new(name),
        }
    }
}

/// Serial port scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    /// Skip ports whose path contains any of these patterns
    ///
    /// Empty by default, so every port the OS reports is listed.
    pub skip_patterns: Vec<String>,
}

/// Serial port scanner
#[derive(Debug, Clone, Default)]
pub struct PortScanner {
    config: ScannerConfig,
}

impl PortScanner {
    /// Create a scanner that lists every port
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Enumerate all available serial ports
    pub fn enumerate_ports(&self) -> Result<Vec<SerialPortRecord>, DetectError> {
        info!("Enumerating serial ports...");
        let ports = available_ports().map_err(|e| DetectError::EnumerationFailed(e.to_string()))?;

        let result: Vec<_> = ports
            .into_iter()
            .map(|p| SerialPortRecord::from_serialport(p.port_name, &p.port_type))
            .filter(|p| !self.should_skip_port(p))
            .collect();

        if result.is_empty() {
            info!("No serial ports found");
        } else {
            info!("Found {} serial port(s)", result.len());
            for port in &result {
                let vendor = port
                    .vid
                    .and_then(usb_ids::vendor_name)
                    .or(port.product.as_deref())
                    .unwrap_or("Unknown");
                info!("  {} - {}", port.path, vendor);
            }
        }

        Ok(result)
    }

    /// Check if a port should be skipped
    fn should_skip_port(&self, port: &SerialPortRecord) -> bool {
        self.config
            .skip_patterns
            .iter()
            .any(|pattern| port.path.contains(pattern.as_str()))
    }
}

impl SerialSource for PortScanner {
    async fn list_serial_ports(&self) -> Result<Vec<SerialPortRecord>, DetectError> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.enumerate_ports()).await?
    }
}
