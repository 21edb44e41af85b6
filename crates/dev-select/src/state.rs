//! Discovery and selection state
//!
//! [`DiscoveryState`] is an immutable snapshot. Every transition goes through
//! [`reduce`], which returns the next snapshot and leaves the previous one
//! untouched.

use serde::Serialize;

use crate::device::Device;

/// Lifecycle phase derived from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No discovery has completed and none is running
    Idle,
    /// A discovery is in flight
    Loading,
    /// At least one discovery has succeeded
    Loaded,
}

/// Snapshot of discovered devices and the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryState {
    is_loading: bool,
    is_selector_expanded: bool,
    devices: Vec<Device>,
    selected_device: Option<Device>,
    has_loaded: bool,
}

impl DiscoveryState {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_selector_expanded(&self) -> bool {
        self.is_selector_expanded
    }

    /// Devices from the last successful discovery
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.selected_device.as_ref()
    }

    /// Whether any discovery has ever succeeded
    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Loading
        } else if self.has_loaded {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }
}

/// Transitions of the selection state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// A discovery was requested
    DiscoveryStarted,
    /// A discovery finished with this (normalized) device list
    DiscoverySucceeded(Vec<Device>),
    /// A discovery failed; the message is surfaced but not stored
    DiscoveryFailed(String),
    /// The selector was expanded or collapsed
    SelectorToggled,
    /// A device became the selection
    DeviceSelected(Device),
    /// The selection was cleared
    DeviceDeselected,
}

/// Apply one transition to a snapshot
///
/// The selection is never checked against the device list.
pub fn reduce(state: &DiscoveryState, event: DeviceEvent) -> DiscoveryState {
    let mut next = state.clone();
    match event {
        DeviceEvent::DiscoveryStarted => {
            next.is_loading = true;
        }
        DeviceEvent::DiscoverySucceeded(devices) => {
            next.is_loading = false;
            next.devices = devices;
            next.has_loaded = true;
        }
        DeviceEvent::DiscoveryFailed(_) => {
            next.is_loading = false;
        }
        DeviceEvent::SelectorToggled => {
            next.is_selector_expanded = !state.is_selector_expanded;
        }
        DeviceEvent::DeviceSelected(device) => {
            next.selected_device = Some(device);
        }
        DeviceEvent::DeviceDeselected => {
            next.selected_device = None;
        }
    }
    next
}
