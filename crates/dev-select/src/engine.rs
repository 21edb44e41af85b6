//! Selection engine
//!
//! The engine owns the current [`DiscoveryState`] and turns user intents into
//! transitions. It performs no I/O: when an intent needs a discovery or a
//! liveness check it says so, and the caller reports the result back.

use tracing::{debug, info};

use crate::device::{Device, DeviceTransport};
use crate::state::{reduce, DeviceEvent, DiscoveryState};

/// What the caller must do to complete a selection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The device is selected
    Selected,
    /// The transport at `path` must be opened before calling
    /// [`DeviceSelector::confirm_selection`]
    NeedsLivenessCheck { path: String },
}

/// The selection engine
#[derive(Debug, Default)]
pub struct DeviceSelector {
    state: DiscoveryState,
    event_buffer: Vec<DeviceEvent>,
}

impl DeviceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot
    pub fn state(&self) -> &DiscoveryState {
        &self.state
    }

    /// Apply a transition and record it
    pub fn apply(&mut self, event: DeviceEvent) {
        self.state = reduce(&self.state, event.clone());
        self.event_buffer.push(event);
    }

    pub fn discovery_started(&mut self) {
        self.apply(DeviceEvent::DiscoveryStarted);
    }

    pub fn discovery_succeeded(&mut self, devices: Vec<Device>) {
        info!("Loaded {} device(s)", devices.len());
        self.apply(DeviceEvent::DiscoverySucceeded(devices));
    }

    pub fn discovery_failed(&mut self, message: impl Into<String>) {
        self.apply(DeviceEvent::DiscoveryFailed(message.into()));
    }

    /// Expand or collapse the selector
    ///
    /// Returns true when a discovery must be launched, which happens only
    /// when a collapsed selector is expanded. Loading is marked started
    /// before the selector flips.
    pub fn toggle_selector(&mut self) -> bool {
        let expanding = !self.state.is_selector_expanded();
        if expanding {
            self.discovery_started();
        }
        self.apply(DeviceEvent::SelectorToggled);
        debug!(
            "Selector {}",
            if expanding { "expanded" } else { "collapsed" }
        );
        expanding
    }

    /// Request that `device` become the selection
    ///
    /// USB devices are selected at once. Serial devices need their transport
    /// checked first.
    pub fn request_selection(&mut self, device: Device) -> SelectionOutcome {
        match &device.transport {
            DeviceTransport::Serial { com_name } => SelectionOutcome::NeedsLivenessCheck {
                path: com_name.clone(),
            },
            DeviceTransport::Usb { .. } => {
                self.confirm_selection(device);
                SelectionOutcome::Selected
            }
        }
    }

    /// Commit a selection after any required check passed
    pub fn confirm_selection(&mut self, device: Device) {
        info!("Selected device {}", device);
        self.apply(DeviceEvent::DeviceSelected(device));
    }

    pub fn deselect(&mut self) {
        if let Some(device) = self.state.selected_device() {
            info!("Deselected device {}", device);
        }
        self.apply(DeviceEvent::DeviceDeselected);
    }

    /// Take the transitions applied since the last call
    pub fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.event_buffer)
    }
}
