//! Serial-number resolution for serial ports
//!
//! On Linux and macOS the serial enumerator reports USB serial numbers. On
//! Windows it does not, so the serial numbers of SEGGER ports are looked up
//! through a [`SerialNumberFacade`] and written into the port records.

use std::collections::HashMap;
use std::future::Future;

use tracing::debug;

use crate::error::DetectError;
use crate::platform::Platform;
use crate::record::SerialPortRecord;
use crate::usb_ids;

/// Lookup of serial numbers keyed by transport path
pub trait SerialNumberFacade: Send + Sync + 'static {
    /// Map each of `paths` to its serial number
    ///
    /// Paths that cannot be resolved are reported through `on_warning` and
    /// left out of the map. An error fails the whole lookup.
    fn serial_number_map(
        &self,
        paths: &[String],
        on_warning: &(dyn Fn(&str) + Send + Sync),
    ) -> impl Future<Output = Result<HashMap<String, String>, DetectError>> + Send;
}

/// Decorates serial port records with serial numbers where the platform lacks them
pub struct SerialNumberResolver<F> {
    platform: Platform,
    facade: F,
}

impl<F: SerialNumberFacade> SerialNumberResolver<F> {
    /// Create a resolver for the current platform
    pub fn new(facade: F) -> Self {
        Self::for_platform(Platform::current(), facade)
    }

    /// Create a resolver behaving as on `platform`
    pub fn for_platform(platform: Platform, facade: F) -> Self {
        Self {
            platform,
            facade,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Return `ports` with serial numbers filled in for SEGGER ports
    ///
    /// The result has the same length and order as the input.
    pub async fn decorate(
        &self,
        ports: Vec<SerialPortRecord>,
        on_warning: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<Vec<SerialPortRecord>, DetectError> {
        if self.platform.reports_serial_numbers() {
            return Ok(ports);
        }

        let paths: Vec<String> = ports
            .iter()
            .filter(|p| usb_ids::is_segger(p.vid))
            .map(|p| p.path.clone())
            .collect();

        if paths.is_empty() {
            debug!("No SEGGER ports to look up");
            return Ok(ports);
        }

        debug!("Looking up serial numbers for {:?}", paths);
        let map = self.facade.serial_number_map(&paths, on_warning).await?;

        let mut ports = ports;
        for (path, serial_number) in map {
            match ports.iter_mut().find(|p| p.path == path) {
                Some(port) => port.serial_number = Some(serial_number),
                None => on_warning(&format!(
                    "Serial number {} reported for unknown port {}",
                    serial_number, path
                )),
            }
        }

        Ok(ports)
    }
}
