//! Selector Actor
//!
//! This module provides an async actor that owns the [`DeviceSelector`]. All
//! state transitions happen in this task; discoveries and liveness checks
//! run in spawned tasks and report back through an internal channel, so the
//! actor keeps accepting commands while they are in flight.
//!
//! # Architecture
//!
//! The actor receives commands through a channel and emits events through
//! another. This allows the host to:
//! - Send intents (load, toggle, select, deselect) without waiting on I/O
//! - Observe every state snapshot and selection outcome in one stream

use std::sync::Arc;

use dev_detect::{DetectError, PortProbe, SerialNumberFacade, SerialSource, UsbSource};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::device::Device;
use crate::discovery::Discovery;
use crate::engine::{DeviceSelector, SelectionOutcome};
use crate::error::SelectorError;
use crate::events::SelectorEvent;
use crate::state::{reduce, DeviceEvent, DiscoveryState};

/// Commands sent to the selector actor
#[derive(Debug)]
pub enum SelectorCommand {
    /// Run a discovery cycle
    LoadDevices,

    /// Expand or collapse the selector (expanding runs a discovery)
    ToggleSelector,

    /// Make a device the selection
    SelectDevice(Device),

    /// Clear the selection
    DeselectDevice,

    /// Query the current snapshot
    QueryState {
        /// Channel to send back the snapshot
        response: oneshot::Sender<DiscoveryState>,
    },

    /// Shutdown the actor
    Shutdown,
}

/// Results reported by background tasks
enum TaskResult {
    Discovery(Result<Vec<Device>, String>),
    Liveness {
        device: Device,
        result: Result<(), String>,
    },
}

/// Internal state for the selector actor
struct SelectorActorState<U, S, F, P> {
    selector: DeviceSelector,
    /// Snapshot last sent to observers
    published: DiscoveryState,
    discovery: Arc<Discovery<U, S, F>>,
    probe: Arc<P>,
    task_tx: mpsc::Sender<TaskResult>,
}

impl<U, S, F, P> SelectorActorState<U, S, F, P>
where
    U: UsbSource,
    S: SerialSource,
    F: SerialNumberFacade,
    P: PortProbe,
{
    fn spawn_discovery(&self) {
        let discovery = Arc::clone(&self.discovery);
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = discovery.load_devices().await.map_err(|e| e.to_string());
            let _ = task_tx.send(TaskResult::Discovery(result)).await;
        });
    }

    fn spawn_liveness_check(&self, device: Device, path: String) {
        let probe = Arc::clone(&self.probe);
        let task_tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = probe.is_port_available(&path).await.map_err(|e| match e {
                DetectError::OpenFailed { reason, .. } => reason,
                other => other.to_string(),
            });
            let _ = task_tx
                .send(TaskResult::Liveness { device, result })
                .await;
        });
    }

    /// Emit one snapshot per applied transition, followed by its outcome event
    async fn publish(&mut self, event_tx: &mpsc::Sender<SelectorEvent>) {
        for event in self.selector.drain_events() {
            self.published = reduce(&self.published, event.clone());
            let _ = event_tx
                .send(SelectorEvent::StateChanged(self.published.clone()))
                .await;

            let outcome = match event {
                DeviceEvent::DiscoveryFailed(message) => {
                    Some(SelectorEvent::DevicesLoadFailed { message })
                }
                DeviceEvent::DeviceSelected(device) => Some(SelectorEvent::DeviceSelected(device)),
                DeviceEvent::DeviceDeselected => Some(SelectorEvent::DeviceDeselected),
                _ => None,
            };
            if let Some(outcome) = outcome {
                let _ = event_tx.send(outcome).await;
            }
        }
    }
}

/// Run the selector actor
///
/// This function runs until a [`SelectorCommand::Shutdown`] is received or
/// the command channel is closed.
pub async fn run_selector_actor<U, S, F, P>(
    discovery: Arc<Discovery<U, S, F>>,
    probe: Arc<P>,
    mut cmd_rx: mpsc::Receiver<SelectorCommand>,
    event_tx: mpsc::Sender<SelectorEvent>,
) where
    U: UsbSource,
    S: SerialSource,
    F: SerialNumberFacade,
    P: PortProbe,
{
    let (task_tx, mut task_rx) = mpsc::channel(32);
    let mut state = SelectorActorState {
        selector: DeviceSelector::new(),
        published: DiscoveryState::default(),
        discovery,
        probe,
        task_tx,
    };
    info!("Selector actor started");

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break; };
                match cmd {
                    SelectorCommand::LoadDevices => {
                        state.selector.discovery_started();
                        state.spawn_discovery();
                    }

                    SelectorCommand::ToggleSelector => {
                        if state.selector.toggle_selector() {
                            state.spawn_discovery();
                        }
                    }

                    SelectorCommand::SelectDevice(device) => {
                        match state.selector.request_selection(device.clone()) {
                            SelectionOutcome::Selected => {}
                            SelectionOutcome::NeedsLivenessCheck { path } => {
                                state.spawn_liveness_check(device, path);
                            }
                        }
                    }

                    SelectorCommand::DeselectDevice => {
                        state.selector.deselect();
                    }

                    SelectorCommand::QueryState { response } => {
                        let _ = response.send(state.selector.state().clone());
                    }

                    SelectorCommand::Shutdown => {
                        info!("Selector actor shutting down");
                        break;
                    }
                }
                state.publish(&event_tx).await;
            }

            Some(result) = task_rx.recv() => {
                match result {
                    TaskResult::Discovery(Ok(devices)) => {
                        state.selector.discovery_succeeded(devices);
                    }

                    TaskResult::Discovery(Err(message)) => {
                        warn!("{}", message);
                        state.selector.discovery_failed(message);
                    }

                    TaskResult::Liveness { device, result: Ok(()) } => {
                        state.selector.confirm_selection(device);
                    }

                    TaskResult::Liveness { device, result: Err(message) } => {
                        warn!("Unable to open the port. Please power cycle the device and try again.");
                        debug!("{}", message);
                        let _ = event_tx
                            .send(SelectorEvent::SelectionRejected { device, message })
                            .await;
                    }
                }
                state.publish(&event_tx).await;
            }
        }
    }

    info!("Selector actor stopped");
}

/// Handle for sending commands to a running selector actor
#[derive(Debug, Clone)]
pub struct SelectorHandle {
    cmd_tx: mpsc::Sender<SelectorCommand>,
}

impl SelectorHandle {
    pub fn new(cmd_tx: mpsc::Sender<SelectorCommand>) -> Self {
        Self { cmd_tx }
    }

    async fn send(&self, cmd: SelectorCommand) -> Result<(), SelectorError> {
        self.cmd_tx.send(cmd).await.map_err(|_| SelectorError::Closed)
    }

    /// Run a discovery cycle
    pub async fn load_devices(&self) -> Result<(), SelectorError> {
        self.send(SelectorCommand::LoadDevices).await
    }

    /// Expand or collapse the selector
    pub async fn toggle_selector(&self) -> Result<(), SelectorError> {
        self.send(SelectorCommand::ToggleSelector).await
    }

    /// Request that `device` become the selection
    ///
    /// The outcome arrives as [`SelectorEvent::DeviceSelected`] or
    /// [`SelectorEvent::SelectionRejected`].
    pub async fn select_device(&self, device: Device) -> Result<(), SelectorError> {
        self.send(SelectorCommand::SelectDevice(device)).await
    }

    /// Clear the selection
    pub async fn deselect_device(&self) -> Result<(), SelectorError> {
        self.send(SelectorCommand::DeselectDevice).await
    }

    /// Current snapshot
    pub async fn state(&self) -> Result<DiscoveryState, SelectorError> {
        let (response, rx) = oneshot::channel();
        self.send(SelectorCommand::QueryState { response }).await?;
        rx.await.map_err(|_| SelectorError::Closed)
    }

    /// Stop the actor
    pub async fn shutdown(&self) -> Result<(), SelectorError> {
        self.send(SelectorCommand::Shutdown).await
    }
}
