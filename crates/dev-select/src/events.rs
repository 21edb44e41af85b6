//! Events emitted by the selector actor
//!
//! Observers (the host shell and its plugins) receive every state change and
//! every selection outcome through a single channel.

use crate::device::Device;
use crate::state::DiscoveryState;

/// Selector activity
#[derive(Debug, Clone)]
pub enum SelectorEvent {
    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------
    /// The state changed; carries the new snapshot
    StateChanged(DiscoveryState),

    /// A discovery cycle failed
    DevicesLoadFailed {
        /// Human-readable cause
        message: String,
    },

    // -------------------------------------------------------------------------
    // Selection (consumed by device-specific logic)
    // -------------------------------------------------------------------------
    /// A device became the selection
    DeviceSelected(Device),

    /// The selection was cleared
    DeviceDeselected,

    /// A serial device could not be selected because its port did not open
    SelectionRejected {
        /// The device that was requested
        device: Device,
        /// OS message from the failed open
        message: String,
    },
}
