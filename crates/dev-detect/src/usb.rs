//! USB descriptor enumeration
//!
//! Each attached device is opened only long enough to read its serial
//! number, manufacturer and product string descriptors. A device that cannot
//! be opened or read degrades to an empty [`UsbRecord`]; only a failure to
//! list the bus fails the batch.

use std::sync::{Arc, Mutex};

use rusb::{Context, Device, DeviceHandle, UsbContext};
use tracing::{debug, info};

use crate::error::DetectError;
use crate::record::UsbRecord;
use crate::source::UsbSource;

/// Identifiers and string descriptor indexes from a device descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorSummary {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number_index: Option<u8>,
    pub manufacturer_index: Option<u8>,
    pub product_index: Option<u8>,
}

/// An open device handle that can read string descriptors
///
/// Dropping the handle closes the device.
pub trait DescriptorReader {
    fn read_string(&self, index: u8) -> Result<String, DetectError>;
}

/// A device on the bus, not yet opened
pub trait UsbPeripheral {
    type Handle: DescriptorReader;

    fn bus_number(&self) -> u8;
    fn device_address(&self) -> u8;
    fn descriptor(&self) -> Result<DescriptorSummary, DetectError>;
    fn open(&self) -> Result<Self::Handle, DetectError>;
}

/// A USB bus that can list its attached devices
pub trait UsbBus: Send + Sync + 'static {
    type Device: UsbPeripheral;

    fn attached_devices(&self) -> Result<Vec<Self::Device>, DetectError>;
}

/// Read the full record of one device, closing its handle on every path
///
/// Any failure is reported as [`DetectError::Descriptor`] for that device.
fn read_record<D: UsbPeripheral>(device: &D) -> Result<UsbRecord, DetectError> {
    read_descriptors(device).map_err(|e| DetectError::Descriptor {
        bus: device.bus_number(),
        address: device.device_address(),
        reason: e.to_string(),
    })
}

fn read_descriptors<D: UsbPeripheral>(device: &D) -> Result<UsbRecord, DetectError> {
    let descriptor = device.descriptor()?;
    let handle = device.open()?;
    let read = |index: Option<u8>| index.map(|i| handle.read_string(i)).transpose();

    Ok(UsbRecord {
        bus_number: Some(device.bus_number()),
        device_address: Some(device.device_address()),
        serial_number: read(descriptor.serial_number_index)?,
        manufacturer: read(descriptor.manufacturer_index)?,
        product: read(descriptor.product_index)?,
        vendor_id: Some(descriptor.vendor_id),
        product_id: Some(descriptor.product_id),
    })
}

/// USB enumerator over any [`UsbBus`]
pub struct UsbEnumerator<B> {
    bus: Arc<B>,
}

impl<B: UsbBus> UsbEnumerator<B> {
    pub fn new(bus: B) -> Self {
        Self { bus: Arc::new(bus) }
    }

    /// Enumerate all attached devices (blocking)
    pub fn enumerate(&self) -> Result<Vec<UsbRecord>, DetectError> {
        enumerate_bus(self.bus.as_ref())
    }
}

impl UsbEnumerator<RusbBus> {
    /// Create an enumerator over the system USB bus
    pub fn system() -> Self {
        Self::new(RusbBus::new())
    }
}

impl<B> Clone for UsbEnumerator<B> {
    fn clone(&self) -> Self {
        Self {
            bus: Arc::clone(&self.bus),
        }
    }
}

fn enumerate_bus<B: UsbBus>(bus: &B) -> Result<Vec<UsbRecord>, DetectError> {
    info!("Enumerating USB devices...");
    let devices = bus.attached_devices().map_err(|e| match e {
        DetectError::UsbEnumerationFailed(_) => e,
        other => DetectError::UsbEnumerationFailed(other.to_string()),
    })?;

    let records: Vec<UsbRecord> = devices
        .iter()
        .map(|device| {
            read_record(device).unwrap_or_else(|e| {
                debug!("{}", e);
                UsbRecord::default()
            })
        })
        .collect();

    info!("Found {} USB device(s)", records.len());
    Ok(records)
}

impl<B: UsbBus> UsbSource for UsbEnumerator<B> {
    async fn list_usb_devices(&self) -> Result<Vec<UsbRecord>, DetectError> {
        let bus = Arc::clone(&self.bus);
        tokio::task::spawn_blocking(move || enumerate_bus(bus.as_ref())).await?
    }
}

/// The system USB bus, backed by libusb
///
/// The libusb context is created on first listing and kept afterwards. A
/// failure to create it fails that listing only; the next listing tries
/// again.
pub struct RusbBus {
    context: Mutex<Option<Context>>,
    init: fn() -> rusb::Result<Context>,
}

impl RusbBus {
    pub fn new() -> Self {
        Self::with_init(Context::new)
    }

    /// Bus whose context is created by `init`
    pub fn with_init(init: fn() -> rusb::Result<Context>) -> Self {
        Self {
            context: Mutex::new(None),
            init,
        }
    }

    fn context(&self) -> Result<Context, DetectError> {
        let mut context = self.context.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(context) = context.as_ref() {
            return Ok(context.clone());
        }
        let created = (self.init)().map_err(|e| {
            DetectError::UsbEnumerationFailed(format!("unable to initialize libusb: {}", e))
        })?;
        *context = Some(created.clone());
        Ok(created)
    }
}

impl Default for RusbBus {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbBus for RusbBus {
    type Device = Device<Context>;

    fn attached_devices(&self) -> Result<Vec<Self::Device>, DetectError> {
        let list = self
            .context()?
            .devices()
            .map_err(|e| DetectError::UsbEnumerationFailed(e.to_string()))?;
        Ok(list.iter().collect())
    }
}

impl UsbPeripheral for Device<Context> {
    type Handle = DeviceHandle<Context>;

    fn bus_number(&self) -> u8 {
        Device::bus_number(self)
    }

    fn device_address(&self) -> u8 {
        self.address()
    }

    fn descriptor(&self) -> Result<DescriptorSummary, DetectError> {
        let descriptor = self.device_descriptor()?;
        Ok(DescriptorSummary {
            vendor_id: descriptor.vendor_id(),
            product_id: descriptor.product_id(),
            serial_number_index: descriptor.serial_number_string_index(),
            manufacturer_index: descriptor.manufacturer_string_index(),
            product_index: descriptor.product_string_index(),
        })
    }

    fn open(&self) -> Result<Self::Handle, DetectError> {
        Ok(Device::open(self)?)
    }
}

impl DescriptorReader for DeviceHandle<Context> {
    fn read_string(&self, index: u8) -> Result<String, DetectError> {
        Ok(self.read_string_descriptor_ascii(index)?)
    }
}
