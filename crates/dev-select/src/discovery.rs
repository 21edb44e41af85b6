//! Discovery orchestration
//!
//! One discovery cycle lists USB devices and serial ports at the same time,
//! resolves missing serial numbers for the serial ports, and merges both
//! lists. The first failing branch fails the cycle.

use dev_detect::{
    PortScanner, RusbBus, ScannerConfig, SerialNumberFacade, SerialNumberResolver,
    SerialPortRecord, SerialSource, SystemFacade, UsbEnumerator, UsbSource,
};
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::error::DiscoveryError;
use crate::normalize::merge_devices;

/// Discovery over the real USB bus, serial ports and platform facade
pub type SystemDiscovery = Discovery<UsbEnumerator<RusbBus>, PortScanner, SystemFacade>;

/// Runs discovery cycles over a USB source and a serial source
pub struct Discovery<U, S, F> {
    usb: U,
    serial: S,
    resolver: SerialNumberResolver<F>,
}

impl<U, S, F> Discovery<U, S, F>
where
    U: UsbSource,
    S: SerialSource,
    F: SerialNumberFacade,
{
    pub fn new(usb: U, serial: S, resolver: SerialNumberResolver<F>) -> Self {
        Self {
            usb,
            serial,
            resolver,
        }
    }

    pub fn resolver(&self) -> &SerialNumberResolver<F> {
        &self.resolver
    }

    /// List serial ports and fill in serial numbers the OS did not report
    pub async fn serial_ports(&self) -> Result<Vec<SerialPortRecord>, DiscoveryError> {
        let ports = self.serial.list_serial_ports().await?;
        let on_warning = |message: &str| warn!("{}", message);
        let ports = self.resolver.decorate(ports, &on_warning).await?;
        Ok(ports)
    }

    /// Run one discovery cycle
    ///
    /// Returns USB devices first, then serial devices.
    pub async fn load_devices(&self) -> Result<Vec<Device>, DiscoveryError> {
        debug!("Starting device discovery");

        let (usb, serial) = tokio::try_join!(
            async { self.usb.list_usb_devices().await.map_err(DiscoveryError::from) },
            self.serial_ports(),
        )?;

        info!(
            "Discovered {} USB device(s) and {} serial port(s)",
            usb.len(),
            serial.len()
        );

        Ok(merge_devices(usb, serial))
    }
}

impl SystemDiscovery {
    /// Discovery over the system USB context and serial ports
    ///
    /// The libusb context is created on the first listing, so a missing USB
    /// stack surfaces as a failed discovery rather than a construction error.
    pub fn system(scanner_config: ScannerConfig) -> Self {
        Self::new(
            UsbEnumerator::system(),
            PortScanner::with_config(scanner_config),
            SerialNumberResolver::new(SystemFacade::new()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dev_detect::{DetectError, Platform, UsbRecord};
    use std::collections::HashMap;

    struct FixedUsb(Result<Vec<UsbRecord>, String>);

    impl UsbSource for FixedUsb {
        async fn list_usb_devices(&self) -> Result<Vec<UsbRecord>, DetectError> {
            self.0.clone().map_err(DetectError::UsbEnumerationFailed)
        }
    }

    struct FixedSerial(Result<Vec<SerialPortRecord>, String>);

    impl SerialSource for FixedSerial {
        async fn list_serial_ports(&self) -> Result<Vec<SerialPortRecord>, DetectError> {
            self.0.clone().map_err(DetectError::EnumerationFailed)
        }
    }

    struct FixedFacade(HashMap<String, String>);

    impl SerialNumberFacade for FixedFacade {
        async fn serial_number_map(
            &self,
            _paths: &[String],
            _on_warning: &(dyn Fn(&str) + Send + Sync),
        ) -> Result<HashMap<String, String>, DetectError> {
            Ok(self.0.clone())
        }
    }

    fn discovery(
        usb: Result<Vec<UsbRecord>, String>,
        serial: Result<Vec<SerialPortRecord>, String>,
        platform: Platform,
        serials: &[(&str, &str)],
    ) -> Discovery<FixedUsb, FixedSerial, FixedFacade> {
        let map = serials
            .iter()
            .map(|(p, s)| (p.to_string(), s.to_string()))
            .collect();
        Discovery::new(
            FixedUsb(usb),
            FixedSerial(serial),
            SerialNumberResolver::for_platform(platform, FixedFacade(map)),
        )
    }

    #[tokio::test]
    async fn test_usb_devices_come_first() {
        let usb = vec![UsbRecord {
            bus_number: Some(1),
            device_address: Some(2),
            serial_number: Some("ABC_654321".to_string()),
            ..Default::default()
        }];
        let serial = vec![SerialPortRecord {
            serial_number: Some("111111".to_string()),
            ..SerialPortRecord::new("/dev/ttyUSB0")
        }];

        let devices = discovery(Ok(usb), Ok(serial), Platform::Linux, &[])
            .load_devices()
            .await
            .unwrap();

        assert_eq!(
            devices,
            vec![
                Device::usb(1, 2).with_serial_number("654321"),
                Device::serial("/dev/ttyUSB0").with_serial_number("111111"),
            ]
        );
    }

    #[tokio::test]
    async fn test_usb_failure_fails_cycle() {
        let err = discovery(Err("access denied".into()), Ok(vec![]), Platform::Linux, &[])
            .load_devices()
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unable to load devices: Unable to get USB devices: access denied"
        );
    }

    #[tokio::test]
    async fn test_serial_failure_fails_cycle() {
        let err = discovery(Ok(vec![]), Err("no ports".into()), Platform::Linux, &[])
            .load_devices()
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("Unable to load devices: "));
        assert!(err.to_string().contains("no ports"));
    }

    #[tokio::test]
    async fn test_windows_serial_numbers_are_resolved() {
        let serial = vec![SerialPortRecord {
            vid: Some(0x1366),
            ..SerialPortRecord::new("COM3")
        }];

        let devices = discovery(
            Ok(vec![]),
            Ok(serial),
            Platform::Windows,
            &[("COM3", "000683000000")],
        )
        .load_devices()
        .await
        .unwrap();

        assert_eq!(devices[0].serial_number.as_deref(), Some("000683000000"));
        assert_eq!(devices[0].com_name(), Some("COM3"));
    }
}
