//! Presentation-free model of the device selector
//!
//! Rendering is left to the host. This module decides what the selector
//! shows for a given snapshot: which devices are listed, the toggle label,
//! and whether the close entry is offered.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceKind};
use crate::state::DiscoveryState;

/// Default key binding that expands the selector
pub const DEFAULT_HOTKEY_EXPAND: &str = "Alt+P";

/// Toggle label when nothing is selected
pub const SELECT_DEVICE_LABEL: &str = "Select device";

/// Label of the entry that clears the selection
pub const CLOSE_DEVICE_LABEL: &str = "Close device";

/// Kind of selector an application asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    /// Any device with a serial number
    #[default]
    SerialPort,
    /// USB devices with a serial number
    Usb,
}

impl SelectorType {
    pub fn accepts(&self, device: &Device) -> bool {
        if !device.has_serial_number() {
            return false;
        }
        match self {
            Self::SerialPort => true,
            Self::Usb => device.kind() == DeviceKind::Usb,
        }
    }
}

/// Predicate deciding which devices the selector lists
#[derive(Clone)]
pub enum DeviceFilter {
    /// The built-in filter for a selector type
    Selector(SelectorType),
    /// An application-supplied filter replacing the built-in one
    Custom(Arc<dyn Fn(&Device) -> bool + Send + Sync>),
}

impl DeviceFilter {
    pub fn custom(filter: impl Fn(&Device) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(filter))
    }

    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::Selector(selector_type) => selector_type.accepts(device),
            Self::Custom(filter) => filter(device),
        }
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::Selector(SelectorType::default())
    }
}

impl fmt::Debug for DeviceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector_type) => f.debug_tuple("Selector").field(selector_type).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One listed device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceItem {
    pub label: String,
    pub device: Device,
}

/// What the selector shows for one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorView {
    pub is_expanded: bool,
    pub toggle_label: String,
    /// Hover text naming the expand hotkey
    pub tooltip: String,
    pub items: Vec<DeviceItem>,
    /// Whether the "Close device" entry is offered
    pub show_close_item: bool,
}

impl SelectorView {
    /// Build the view with the default hotkey
    pub fn new(state: &DiscoveryState, filter: &DeviceFilter) -> Self {
        Self::with_hotkey(state, filter, DEFAULT_HOTKEY_EXPAND)
    }

    pub fn with_hotkey(state: &DiscoveryState, filter: &DeviceFilter, hotkey: &str) -> Self {
        let items = if state.is_loading() {
            Vec::new()
        } else {
            state
                .devices()
                .iter()
                .filter(|d| filter.matches(d))
                .map(|d| DeviceItem {
                    label: d.to_string(),
                    device: d.clone(),
                })
                .collect()
        };

        let toggle_label = state
            .selected_device()
            .and_then(|d| d.serial_number.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| SELECT_DEVICE_LABEL.to_string());

        Self {
            is_expanded: state.is_selector_expanded(),
            toggle_label,
            tooltip: format!("{} ({})", SELECT_DEVICE_LABEL, hotkey),
            items,
            show_close_item: state.selected_device().is_some() && !state.is_loading(),
        }
    }
}
