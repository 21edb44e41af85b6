//! USB Vendor/Product ID table for debug probes and development kits

/// USB Vendor ID / Product ID pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsbId {
    pub vid: u16,
    pub pid: u16,
}

impl UsbId {
    pub const fn new(vid: u16, pid: u16) -> Self {
        Self { vid, pid }
    }
}

/// SEGGER (J-Link debug probes)
///
/// Serial ports exposed by J-Link probes are the ones whose serial number
/// must be looked up separately on Windows.
pub mod segger {
    use super::UsbId;

    pub const VID: u16 = 0x1366;

    pub const JLINK: UsbId = UsbId::new(VID, 0x0101);
    pub const JLINK_OB_CDC: UsbId = UsbId::new(VID, 0x0105);
    pub const JLINK_CDC_MSD: UsbId = UsbId::new(VID, 0x1015);
}

/// Nordic Semiconductor
pub mod nordic {
    use super::UsbId;

    pub const VID: u16 = 0x1915;

    /// Open bootloader with DFU over USB CDC
    pub const OPEN_DFU_BOOTLOADER: UsbId = UsbId::new(VID, 0x521F);
}

/// Check whether a vendor ID belongs to SEGGER
pub fn is_segger(vid: Option<u16>) -> bool {
    vid == Some(segger::VID)
}

/// Get a human-readable vendor name for a known vendor ID
pub fn vendor_name(vid: u16) -> Option<&'static str> {
    match vid {
        segger::VID => Some("SEGGER"),
        nordic::VID => Some("Nordic Semiconductor"),
        _ => None,
    }
}
