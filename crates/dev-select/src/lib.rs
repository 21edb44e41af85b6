//! Device Discovery and Selection
//!
//! This crate turns raw transport records into devices and drives the
//! selection state of the application shell.
//!
//! # Architecture
//!
//! - [`Discovery`] lists USB and serial devices concurrently and merges them
//!   into one normalized [`Device`] list
//! - [`DiscoveryState`] is an immutable snapshot replaced on every
//!   transition by [`reduce`]
//! - [`DeviceSelector`] applies intents (toggle, select, deselect) to the
//!   state and records the transitions it made
//! - [`run_selector_actor`] owns the selector, runs discoveries and liveness
//!   checks in background tasks, and emits [`SelectorEvent`]s
//!
//! # Example
//!
//! ```rust,no_run
//! use dev_select::{run_selector_actor, SelectorHandle, SystemDiscovery};
//! use dev_detect::{ScannerConfig, SerialPortProbe};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner_config = ScannerConfig {
//!     skip_patterns: vec!["Bluetooth".to_string()],
//! };
//! let discovery = Arc::new(SystemDiscovery::system(scanner_config));
//! let probe = Arc::new(SerialPortProbe::new());
//!
//! let (cmd_tx, cmd_rx) = mpsc::channel(64);
//! let (event_tx, mut event_rx) = mpsc::channel(64);
//! tokio::spawn(run_selector_actor(discovery, probe, cmd_rx, event_tx));
//!
//! let selector = SelectorHandle::new(cmd_tx);
//! selector.toggle_selector().await?;
//! while let Some(event) = event_rx.recv().await {
//!     println!("{:?}", event);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod device;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod events;
pub mod normalize;
pub mod state;
pub mod view;

pub use actor::{run_selector_actor, SelectorCommand, SelectorHandle};
pub use device::{Device, DeviceKind, DeviceTransport};
pub use discovery::{Discovery, SystemDiscovery};
pub use engine::{DeviceSelector, SelectionOutcome};
pub use error::{DiscoveryError, SelectorError};
pub use events::SelectorEvent;
pub use normalize::{canonical_serial_number, merge_devices};
pub use state::{reduce, DeviceEvent, DiscoveryState, Phase};
pub use view::{
    DeviceFilter, DeviceItem, SelectorType, SelectorView, CLOSE_DEVICE_LABEL, DEFAULT_HOTKEY_EXPAND,
    SELECT_DEVICE_LABEL,
};
