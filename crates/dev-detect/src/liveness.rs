//! Serial port liveness checks
//!
//! Before a serial device is committed as selected, its transport is opened
//! and closed again. Success means the port exists and no other process
//! holds it open. Nothing is written to or read from the port.

use std::future::Future;
use std::time::Duration;

use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, trace};

use crate::error::DetectError;

/// Configuration for liveness probing
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Baud rate passed to the driver when opening the port
    pub baud_rate: u32,
    /// Driver read/write timeout for the transient handle
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Checks whether a serial transport can currently be acquired
pub trait PortProbe: Send + Sync + 'static {
    /// Open `path`, close it again, and report whether that worked
    fn is_port_available(&self, path: &str)
        -> impl Future<Output = Result<(), DetectError>> + Send;
}

/// Liveness probe that opens the real serial port
#[derive(Debug, Clone, Default)]
pub struct SerialPortProbe {
    config: ProbeConfig,
}

impl SerialPortProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }
}

impl PortProbe for SerialPortProbe {
    async fn is_port_available(&self, path: &str) -> Result<(), DetectError> {
        debug!("Checking that {} can be opened", path);

        let stream = tokio_serial::new(path, self.config.baud_rate)
            .timeout(self.config.timeout)
            .open_native_async()
            .map_err(|e| DetectError::OpenFailed {
                port: path.to_string(),
                reason: e.to_string(),
            })?;

        // Closing happens on drop
        drop(stream);

        trace!("{} is available", path);
        Ok(())
    }
}

/// Check a single port with the default probe configuration
///
/// This is a convenience function for one-off checks.
pub async fn is_port_available(path: &str) -> Result<(), DetectError> {
    SerialPortProbe::new().is_port_available(path).await
}
